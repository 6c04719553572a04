use lunk_core::{
    Behavior, CellCoord, Edibility, EntityId, EntityKind, EntitySnapshot, Heading, Position,
};

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) position: Position,
    /// Position held before the latest movement step, restored on bounces.
    pub(crate) previous_position: Position,
    pub(crate) heading: Heading,
    pub(crate) cell: CellCoord,
    pub(crate) behavior: Behavior,
    pub(crate) target: Option<EntityId>,
    pub(crate) halted_ticks: u32,
    pub(crate) saved: bool,
    pub(crate) rescue_progress: u32,
    pub(crate) edibility: Option<Edibility>,
    pub(crate) lifetime_ticks: Option<u32>,
}

impl Entity {
    pub(crate) fn spawn(
        id: EntityId,
        kind: EntityKind,
        cell: CellCoord,
        lifetime_ticks: Option<u32>,
    ) -> Self {
        let position = cell.center();
        let (behavior, edibility, lifetime_ticks) = match kind {
            EntityKind::Player => (Behavior::Idle, None, None),
            EntityKind::Enemy(enemy) => (Behavior::Patrol, Some(enemy.edibility()), None),
            EntityKind::Friendly(_) => (Behavior::Patrol, None, None),
            EntityKind::Item(_) => (Behavior::Idle, None, lifetime_ticks),
        };
        Self {
            id,
            kind,
            position,
            previous_position: position,
            heading: Heading::default(),
            cell,
            behavior,
            target: None,
            halted_ticks: 0,
            saved: false,
            rescue_progress: 0,
            edibility,
            lifetime_ticks,
        }
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted_ticks > 0
    }

    pub(crate) fn is_unsaved_friendly(&self) -> bool {
        matches!(self.kind, EntityKind::Friendly(_)) && !self.saved
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            heading: self.heading,
            cell: self.cell,
            behavior: self.behavior,
            target: self.target,
            halted_ticks: self.halted_ticks,
            saved: self.saved,
            rescue_progress: self.rescue_progress,
        }
    }
}
