// Overlay lifecycle controller.
//
// Owns both surfaces, the UI scheduler and the platform services. The host creates exactly
// one controller, calls `start` when the blinder feature is switched on and `stop` when it
// is switched off, and feeds it pointer events, configuration changes and due tasks from
// its event loop. All calls happen on the host's UI thread.

use std::time::Instant;

use crate::error::ControllerError;
use crate::gesture::BlinderCommand;
use crate::interaction::PointerEvent;
use crate::overlay::{Compositor, Display};
use crate::scheduler::{Task, TaskToken, UiScheduler};
use crate::surface::{BlinderSurface, TriggerSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Stopped,
    Active,
}

pub struct OverlayController<C: Compositor, D: Display> {
    compositor: C,
    display: D,
    scheduler: UiScheduler,
    state: LifecycleState,
    blinder: Option<BlinderSurface>,
    trigger: Option<TriggerSurface>,
}

impl<C: Compositor, D: Display> OverlayController<C, D> {
    pub fn new(compositor: C, display: D, now: Instant) -> Self {
        Self {
            compositor,
            display,
            scheduler: UiScheduler::new(now),
            state: LifecycleState::Stopped,
            blinder: None,
            trigger: None,
        }
    }

    /// Create both surfaces and put them on screen, blinder first.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        tracing::debug!("start: enter");

        if self.state == LifecycleState::Active {
            tracing::error!("overlay already started");
            return Err(ControllerError::AlreadyStarted);
        }

        let mut blinder = BlinderSurface::new();
        blinder.initialize(&self.display, &mut self.compositor)?;
        blinder.attach(&mut self.compositor)?;

        let mut trigger = TriggerSurface::new(self.scheduler.now());
        if let Err(err) = self.attach_trigger(&mut trigger) {
            tracing::error!(error = %err, "trigger attach failed, rolling back blinder");
            trigger.release(&mut self.scheduler);
            blinder.release(&mut self.scheduler);
            if let Err(detach_err) = blinder.detach(&mut self.compositor) {
                tracing::warn!(error = %detach_err, "blinder rollback failed");
            }
            return Err(err);
        }

        self.blinder = Some(blinder);
        self.trigger = Some(trigger);
        self.state = LifecycleState::Active;

        tracing::info!("overlay started");
        Ok(())
    }

    /// Reserved transition point; surfaces keep their identity.
    pub fn resume(&mut self) {
        tracing::debug!(state = ?self.state, "resume");
    }

    /// Reserved transition point; surfaces keep their identity.
    pub fn pause(&mut self) {
        tracing::debug!(state = ?self.state, "pause");
    }

    /// Tear down input routing first, then the blinder and its animation.
    pub fn stop(&mut self) -> Result<(), ControllerError> {
        tracing::debug!("stop: enter");

        if self.state == LifecycleState::Stopped {
            tracing::error!("overlay already stopped");
            return Err(ControllerError::AlreadyStopped);
        }

        if let Some(mut trigger) = self.trigger.take() {
            trigger.release(&mut self.scheduler);
            if let Err(err) = trigger.detach(&mut self.compositor) {
                tracing::warn!(error = %err, "trigger detach failed");
            }
        }
        if let Some(mut blinder) = self.blinder.take() {
            blinder.release(&mut self.scheduler);
            if let Err(err) = blinder.detach(&mut self.compositor) {
                tracing::warn!(error = %err, "blinder detach failed");
            }
        }
        self.state = LifecycleState::Stopped;

        tracing::info!("overlay stopped");
        Ok(())
    }

    pub fn enable_blinder(&mut self) -> Result<(), ControllerError> {
        let Some(blinder) = self.blinder.as_mut() else {
            tracing::warn!("enable_blinder while stopped ignored");
            return Err(ControllerError::NotActive);
        };
        blinder.enable(&mut self.compositor, &mut self.scheduler)
    }

    pub fn disable_blinder(&mut self) -> Result<(), ControllerError> {
        let Some(blinder) = self.blinder.as_mut() else {
            tracing::warn!("disable_blinder while stopped ignored");
            return Err(ControllerError::NotActive);
        };
        blinder.disable(&mut self.compositor, &mut self.scheduler)
    }

    /// True iff the trigger surface exists.
    pub fn is_active(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Raw pointer input delivered to the trigger surface.
    pub fn on_pointer_event(&mut self, event: PointerEvent, now: Instant) {
        self.scheduler.advance_to(now);
        let Some(trigger) = self.trigger.as_mut() else {
            tracing::trace!("pointer event while stopped dropped");
            return;
        };
        let commands = trigger.on_pointer_event(event, &mut self.scheduler);
        self.apply(commands);
    }

    /// Screen size or rotation changed: cancel the animation and lay both surfaces out again.
    pub fn on_configuration_changed(&mut self, now: Instant) -> Result<(), ControllerError> {
        self.scheduler.advance_to(now);
        if let Some(blinder) = self.blinder.as_mut() {
            blinder.on_configuration_changed(&self.display, &mut self.compositor, &mut self.scheduler)?;
        }
        if let Some(trigger) = self.trigger.as_mut() {
            trigger.on_configuration_changed(&self.display, &mut self.compositor)?;
        }
        tracing::debug!(active = self.is_active(), "configuration changed");
        Ok(())
    }

    /// When the host loop should wake up next, if anything is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Run every task due at `now`.
    pub fn run_due_tasks(&mut self, now: Instant) {
        self.scheduler.advance_to(now);
        while let Some((token, task)) = self.scheduler.pop_due() {
            self.run_task(token, task);
        }
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn scheduler(&self) -> &UiScheduler {
        &self.scheduler
    }

    pub fn blinder(&self) -> Option<&BlinderSurface> {
        self.blinder.as_ref()
    }

    pub fn trigger(&self) -> Option<&TriggerSurface> {
        self.trigger.as_ref()
    }

    fn attach_trigger(&mut self, trigger: &mut TriggerSurface) -> Result<(), ControllerError> {
        trigger.initialize(&self.display, &mut self.compositor)?;
        trigger.attach(&mut self.compositor)
    }

    fn run_task(&mut self, token: TaskToken, task: Task) {
        match task {
            Task::BlinderTick => {
                if let Some(blinder) = self.blinder.as_mut() {
                    blinder.on_tick(token, &mut self.compositor, &mut self.scheduler);
                }
            }
            Task::ShowPress | Task::LongPress => {
                if let Some(trigger) = self.trigger.as_mut() {
                    let commands = trigger.on_task(token, task);
                    self.apply(commands);
                }
            }
        }
    }

    fn apply(&mut self, commands: Vec<BlinderCommand>) {
        for command in commands {
            let result = match command {
                BlinderCommand::Enable => self.enable_blinder(),
                BlinderCommand::Disable => self.disable_blinder(),
            };
            if let Err(err) = result {
                tracing::warn!(?command, error = %err, "blinder command failed");
            }
        }
    }
}
