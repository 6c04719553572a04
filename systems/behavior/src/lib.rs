#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Proximity-driven behaviour selection for NPCs.
//!
//! Every NPC is classified by an ordered rule table. Rules are evaluated top
//! to bottom against the Chebyshev cell distances to the player, the NPC's
//! target and the nearest threat; the first matching rule decides the
//! behaviour. Thresholds are inclusive. Each NPC kind reads its own table
//! from a [`RuleBook`].

use lunk_core::{
    Behavior, CellCoord, Command, EnemyKind, EntityId, EntityKind, EntitySnapshot, EntityView,
    Event, FriendlyKind, LandscapeView, VariantTag,
};

/// Predicate evaluated against a [`ProximityContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// The NPC is a saved friendly.
    Saved,
    /// A target lies within the range but a wall blocks the line toward it.
    Blocked(u32),
    /// The target lies within the range.
    TargetWithin(u32),
    /// The player lies within the range.
    PlayerWithin(u32),
    /// The nearest threat lies within the range.
    ThreatWithin(u32),
    /// The NPC is in the middle of a charge.
    Charging,
    /// Always matches.
    Always,
}

impl Condition {
    /// Reports whether the condition holds for `context`.
    #[must_use]
    pub fn matches(&self, context: &ProximityContext) -> bool {
        match *self {
            Self::Saved => context.saved,
            Self::Blocked(range) => within(context.target_distance, range) && !context.target_visible,
            Self::TargetWithin(range) => within(context.target_distance, range),
            Self::PlayerWithin(range) => within(context.player_distance, range),
            Self::ThreatWithin(range) => within(context.threat_distance, range),
            Self::Charging => context.charging,
            Self::Always => true,
        }
    }
}

fn within(distance: Option<u32>, range: u32) -> bool {
    distance.is_some_and(|distance| distance <= range)
}

/// Single `(condition, behaviour)` entry of a rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    /// Predicate that must hold.
    pub condition: Condition,
    /// Behaviour selected when the predicate holds.
    pub behavior: Behavior,
}

impl Rule {
    /// Creates a new rule.
    #[must_use]
    pub const fn new(condition: Condition, behavior: Behavior) -> Self {
        Self {
            condition,
            behavior,
        }
    }
}

/// Distances and flags describing an NPC's surroundings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProximityContext {
    /// Chebyshev distance to the NPC's target, if it has one.
    pub target_distance: Option<u32>,
    /// Whether the line toward the target is free of walls.
    pub target_visible: bool,
    /// Chebyshev distance to the player, if present.
    pub player_distance: Option<u32>,
    /// Chebyshev distance to the nearest threat, if any.
    pub threat_distance: Option<u32>,
    /// Whether the NPC is a saved friendly.
    pub saved: bool,
    /// Whether the NPC is currently charging.
    pub charging: bool,
}

/// Ordered list of rules; the first match wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Creates a table evaluating `rules` in order.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Behaviour of the first rule matching `context`, or [`Behavior::Idle`].
    #[must_use]
    pub fn select(&self, context: &ProximityContext) -> Behavior {
        self.rules
            .iter()
            .find(|rule| rule.condition.matches(context))
            .map_or(Behavior::Idle, |rule| rule.behavior)
    }
}

/// Rule table driving skeletons.
#[must_use]
pub fn enemy_rules() -> RuleTable {
    RuleTable::new(vec![
        Rule::new(Condition::Blocked(10), Behavior::PursuePlayer),
        Rule::new(Condition::TargetWithin(4), Behavior::PursueFast),
        Rule::new(Condition::TargetWithin(10), Behavior::PursueSlow),
        Rule::new(Condition::PlayerWithin(4), Behavior::Flee),
        Rule::new(Condition::Always, Behavior::Patrol),
    ])
}

/// Rule table driving minotaurs.
///
/// A minotaur shies away from the player, otherwise charges any friendly it
/// spots and keeps charging until the movement system ends the run.
#[must_use]
pub fn minotaur_rules() -> RuleTable {
    RuleTable::new(vec![
        Rule::new(Condition::PlayerWithin(4), Behavior::Flee),
        Rule::new(Condition::Charging, Behavior::Charge),
        Rule::new(Condition::TargetWithin(8), Behavior::Charge),
        Rule::new(Condition::Always, Behavior::Patrol),
    ])
}

/// Rule table driving damsels.
#[must_use]
pub fn friendly_rules() -> RuleTable {
    RuleTable::new(vec![
        Rule::new(Condition::Saved, Behavior::Follow),
        Rule::new(Condition::PlayerWithin(4), Behavior::Follow),
        Rule::new(Condition::ThreatWithin(4), Behavior::Flee),
        Rule::new(Condition::Always, Behavior::Patrol),
    ])
}

/// Rule table driving postmen, who ignore the player entirely.
#[must_use]
pub fn neutral_rules() -> RuleTable {
    RuleTable::new(vec![
        Rule::new(Condition::ThreatWithin(4), Behavior::Flee),
        Rule::new(Condition::Always, Behavior::Patrol),
    ])
}

/// Rule tables for every NPC kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleBook {
    /// Table for skeletons.
    pub skeleton: RuleTable,
    /// Table for minotaurs.
    pub minotaur: RuleTable,
    /// Table for damsels.
    pub damsel: RuleTable,
    /// Table for postmen.
    pub postman: RuleTable,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self {
            skeleton: enemy_rules(),
            minotaur: minotaur_rules(),
            damsel: friendly_rules(),
            postman: neutral_rules(),
        }
    }
}

impl RuleBook {
    /// Table classifying `kind`, or `None` for kinds without behaviour.
    #[must_use]
    pub fn table(&self, kind: EntityKind) -> Option<&RuleTable> {
        match kind {
            EntityKind::Enemy(EnemyKind::Skeleton) => Some(&self.skeleton),
            EntityKind::Enemy(EnemyKind::Minotaur) => Some(&self.minotaur),
            EntityKind::Friendly(FriendlyKind::Damsel) => Some(&self.damsel),
            EntityKind::Friendly(FriendlyKind::Postman) => Some(&self.postman),
            EntityKind::Player | EntityKind::Item(_) => None,
        }
    }
}

/// Tuning knobs of the behaviour selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Chebyshev distance to the player within which friendlies accrue rescue progress.
    pub rescue_radius: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { rescue_radius: 2 }
    }
}

/// Pure system that classifies NPCs and emits behaviour commands.
#[derive(Debug)]
pub struct BehaviorSelector {
    config: SelectorConfig,
    rules: RuleBook,
}

impl Default for BehaviorSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default(), RuleBook::default())
    }
}

impl BehaviorSelector {
    /// Creates a selector from explicit rule tables.
    #[must_use]
    pub fn new(config: SelectorConfig, rules: RuleBook) -> Self {
        Self { config, rules }
    }

    /// Consumes world events and immutable views to emit behaviour commands.
    ///
    /// Commands are only emitted for batches that advanced the clock, and only
    /// for NPCs whose behaviour or target changed.
    pub fn handle(
        &mut self,
        events: &[Event],
        entity_view: &EntityView,
        landscape: LandscapeView<'_>,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let player = entity_view.player();
        for npc in entity_view.iter() {
            let Some(rules) = self.rules.table(npc.kind) else {
                continue;
            };
            let (behavior, target) = match npc.kind {
                EntityKind::Enemy(_) => classify_enemy(rules, npc, player, entity_view, landscape),
                EntityKind::Friendly(kind) => {
                    let player_distance = distance_to(npc, player);
                    if kind.is_rescuable()
                        && !npc.saved
                        && within(player_distance, self.config.rescue_radius)
                    {
                        out.push(Command::AccrueRescue { friendly: npc.id });
                    }
                    classify_friendly(rules, npc, player, entity_view)
                }
                EntityKind::Player | EntityKind::Item(_) => continue,
            };

            if behavior != npc.behavior || target != npc.target {
                out.push(Command::SetBehavior {
                    entity: npc.id,
                    behavior,
                    target,
                });
            }
        }
    }
}

fn classify_enemy(
    rules: &RuleTable,
    enemy: &EntitySnapshot,
    player: Option<&EntitySnapshot>,
    entity_view: &EntityView,
    landscape: LandscapeView<'_>,
) -> (Behavior, Option<EntityId>) {
    let target = nearest(enemy.cell, entity_view, VariantTag::Friendly);
    let context = ProximityContext {
        target_distance: target.map(|target| enemy.cell.chebyshev_distance(target.cell)),
        target_visible: target
            .map_or(true, |target| landscape.line_is_clear(enemy.cell, target.cell)),
        player_distance: distance_to(enemy, player),
        threat_distance: None,
        saved: false,
        charging: enemy.behavior == Behavior::Charge,
    };

    let behavior = rules.select(&context);
    let aim = match behavior {
        Behavior::PursueFast | Behavior::PursueSlow | Behavior::Charge => {
            target.map(|target| target.id)
        }
        Behavior::PursuePlayer | Behavior::Flee => player.map(|player| player.id),
        Behavior::Idle | Behavior::Patrol | Behavior::Follow => None,
    };
    (behavior, aim)
}

fn classify_friendly(
    rules: &RuleTable,
    friendly: &EntitySnapshot,
    player: Option<&EntitySnapshot>,
    entity_view: &EntityView,
) -> (Behavior, Option<EntityId>) {
    let threat = nearest(friendly.cell, entity_view, VariantTag::Enemy);
    let context = ProximityContext {
        target_distance: None,
        target_visible: true,
        player_distance: distance_to(friendly, player),
        threat_distance: threat.map(|threat| friendly.cell.chebyshev_distance(threat.cell)),
        saved: friendly.saved,
        charging: false,
    };

    let behavior = rules.select(&context);
    let aim = match behavior {
        Behavior::Follow | Behavior::PursuePlayer => player.map(|player| player.id),
        Behavior::Flee | Behavior::PursueFast | Behavior::PursueSlow => {
            threat.map(|threat| threat.id)
        }
        Behavior::Idle | Behavior::Patrol | Behavior::Charge => None,
    };
    (behavior, aim)
}

fn distance_to(npc: &EntitySnapshot, other: Option<&EntitySnapshot>) -> Option<u32> {
    other.map(|other| npc.cell.chebyshev_distance(other.cell))
}

/// Nearest entity carrying `tag`; ties resolve to the lowest id.
fn nearest<'a>(
    from: CellCoord,
    entity_view: &'a EntityView,
    tag: VariantTag,
) -> Option<&'a EntitySnapshot> {
    entity_view
        .iter()
        .filter(|candidate| candidate.kind.tag() == tag)
        .min_by_key(|candidate| (from.chebyshev_distance(candidate.cell), candidate.id))
}
