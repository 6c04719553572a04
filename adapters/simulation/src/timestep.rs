use std::time::Duration;

/// Converts variable frame time into whole simulation ticks.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
}

/// Outcome of feeding one frame into a [`FixedTimestep`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPlan {
    /// Ticks the caller must run this frame.
    pub ticks_to_run: u32,
    /// Time discarded because the per-frame tick cap was reached.
    pub dropped_backlog: Duration,
}

impl FixedTimestep {
    /// Creates an accumulator ticking `target_tps` times per second.
    ///
    /// Zero values fall back to 60 ticks per second, a 250ms frame clamp and
    /// a single tick per frame respectively.
    #[must_use]
    pub fn new(target_tps: u32, max_frame_delta: Duration, max_ticks_per_frame: u32) -> Self {
        let target_tps = if target_tps == 0 { 60 } else { target_tps };
        Self {
            fixed_dt: Duration::from_secs_f64(1.0 / f64::from(target_tps)),
            max_frame_delta: normalize_non_zero_duration(
                max_frame_delta,
                Duration::from_millis(250),
            ),
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            accumulator: Duration::ZERO,
        }
    }

    /// Simulated time covered by a single tick.
    #[must_use]
    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub fn remainder(&self) -> Duration {
        self.accumulator
    }

    /// Accumulates a frame and reports how many ticks are due.
    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let clamped = frame_dt.min(self.max_frame_delta);
        self.accumulator = self.accumulator.saturating_add(clamped);

        let mut ticks_to_run = 0_u32;
        while self.accumulator >= self.fixed_dt && ticks_to_run < self.max_ticks_per_frame {
            self.accumulator = self.accumulator.saturating_sub(self.fixed_dt);
            ticks_to_run = ticks_to_run.saturating_add(1);
        }

        let dropped_backlog = if self.accumulator >= self.fixed_dt {
            std::mem::take(&mut self.accumulator)
        } else {
            Duration::ZERO
        };

        StepPlan {
            ticks_to_run,
            dropped_backlog,
        }
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
