// Proportional alpha convergence for the blinder surface.
//
// Each tick moves the current alpha a fixed fraction of the remaining distance toward the
// target and re-posts itself. Dropped frames only slow the fade down. The loop stops when
// two consecutive ticks see the same remaining distance truncated to hundredths, at which
// point the alpha is snapped onto the target.

use std::time::Duration;

use crate::scheduler::{Task, TaskToken, UiScheduler};

/// Fraction of the remaining distance covered per tick.
pub const GAIN: f32 = 0.2;

/// Delay between two ticks.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub current_alpha: f32,
    pub target_alpha: f32,
    pub last_diff: f32,
    pending: Option<TaskToken>,
}

impl AnimationState {
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }
}

/// What a tick did to the alpha value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Stale or foreign token; nothing changed.
    Ignored,
    /// Moved toward the target; another tick may be pending.
    Stepped(f32),
    /// Snapped onto the target; the loop is over.
    Converged(f32),
}

impl TickOutcome {
    /// Alpha to push to the surface, if the tick changed anything.
    pub fn alpha(self) -> Option<f32> {
        match self {
            TickOutcome::Ignored => None,
            TickOutcome::Stepped(a) | TickOutcome::Converged(a) => Some(a),
        }
    }
}

#[derive(Debug)]
pub struct AlphaAnimator {
    state: AnimationState,
}

fn hundredths(value: f32) -> i32 {
    (value * 100.0) as i32
}

impl AlphaAnimator {
    pub fn new(initial_alpha: f32) -> Self {
        let alpha = initial_alpha.clamp(0.0, 1.0);
        Self {
            state: AnimationState {
                current_alpha: alpha,
                target_alpha: alpha,
                last_diff: 0.0,
                pending: None,
            },
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn current_alpha(&self) -> f32 {
        self.state.current_alpha
    }

    pub fn target_alpha(&self) -> f32 {
        self.state.target_alpha
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.is_scheduled()
    }

    /// Store a new target. Scheduling is left to the caller.
    pub fn set_target(&mut self, value: f32) {
        self.state.target_alpha = value.clamp(0.0, 1.0);
    }

    /// Post the first tick unless one is already pending. Returns true if a tick was posted.
    pub fn ensure_scheduled(&mut self, scheduler: &mut UiScheduler) -> bool {
        if self.state.pending.is_some() {
            return false;
        }
        self.state.pending = Some(scheduler.post(Task::BlinderTick));
        true
    }

    /// Drop the pending tick, if any. Alpha stays where it is.
    pub fn cancel(&mut self, scheduler: &mut UiScheduler) {
        if let Some(token) = self.state.pending.take() {
            scheduler.remove(token);
            tracing::debug!(alpha = self.state.current_alpha, "blinder animation cancelled");
        }
    }

    /// Run one convergence step for the tick identified by `token`.
    pub fn tick(
        &mut self,
        token: TaskToken,
        attached: bool,
        scheduler: &mut UiScheduler,
    ) -> TickOutcome {
        if self.state.pending != Some(token) {
            return TickOutcome::Ignored;
        }
        self.state.pending = None;

        let diff = self.state.target_alpha - self.state.current_alpha;

        if hundredths(diff) == hundredths(self.state.last_diff) {
            self.state.current_alpha = self.state.target_alpha;
            tracing::trace!(alpha = self.state.current_alpha, "blinder alpha converged");
            return TickOutcome::Converged(self.state.current_alpha);
        }

        self.state.current_alpha += diff * GAIN;
        self.state.last_diff = diff;

        if attached {
            self.state.pending = Some(scheduler.post_delayed(Task::BlinderTick, REFRESH_INTERVAL));
        } else {
            tracing::debug!("blinder detached, animation loop ends");
        }
        TickOutcome::Stepped(self.state.current_alpha)
    }
}
