// The two overlay surfaces: the full-screen blinder and the small trigger.
//
// Each surface owns its layout block and the screen configuration it was laid out for.
// Layout is recomputed on first attach and on every configuration change.

use std::time::Instant;

use crate::animator::AlphaAnimator;
use crate::error::ControllerError;
use crate::geometry::{self, Gravity, ScreenGeometry};
use crate::gesture::{BlinderCommand, GestureRouter};
use crate::interaction::PointerEvent;
use crate::overlay::{
    Compositor, Display, LayoutParams, SurfaceKind, INTERACTIVE_FLAGS, NOT_INTERACTIVE_FLAGS,
    TRIGGER_FLAGS,
};
use crate::scheduler::{Task, TaskToken, UiScheduler};

fn query_screen(display: &dyn Display) -> ScreenGeometry {
    let (width, height) = display.screen_size();
    ScreenGeometry::new(width, height, display.orientation())
}

/// Push `layout` to the compositor if the surface is on screen.
fn push_layout(
    compositor: &mut dyn Compositor,
    kind: SurfaceKind,
    layout: &LayoutParams,
) -> Result<(), ControllerError> {
    if compositor.is_attached(kind) {
        compositor.update_layout(kind, layout)?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct BlinderSurface {
    screen: ScreenGeometry,
    layout: LayoutParams,
    animator: AlphaAnimator,
}

impl Default for BlinderSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl BlinderSurface {
    pub fn new() -> Self {
        Self {
            screen: ScreenGeometry::UNRESOLVED,
            layout: LayoutParams::new(Gravity::TopLeft, NOT_INTERACTIVE_FLAGS),
            animator: AlphaAnimator::new(0.0),
        }
    }

    pub fn screen(&self) -> &ScreenGeometry {
        &self.screen
    }

    pub fn layout(&self) -> &LayoutParams {
        &self.layout
    }

    pub fn animator(&self) -> &AlphaAnimator {
        &self.animator
    }

    pub fn initialize(
        &mut self,
        display: &dyn Display,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        self.update_total_user_interface(display, compositor)
    }

    pub fn attach(&mut self, compositor: &mut dyn Compositor) -> Result<(), ControllerError> {
        self.update_window_params(compositor)?;
        compositor.add_surface(SurfaceKind::Blinder, &self.layout)?;
        compositor.set_alpha(SurfaceKind::Blinder, self.animator.current_alpha());
        tracing::debug!(frame = ?self.layout.frame(), "blinder attached");
        Ok(())
    }

    pub fn detach(&mut self, compositor: &mut dyn Compositor) -> Result<(), ControllerError> {
        compositor.remove_surface(SurfaceKind::Blinder)?;
        tracing::debug!("blinder detached");
        Ok(())
    }

    /// Stop the animation loop. Must run before the surface goes away.
    pub fn release(&mut self, scheduler: &mut UiScheduler) {
        self.animator.cancel(scheduler);
    }

    pub fn on_configuration_changed(
        &mut self,
        display: &dyn Display,
        compositor: &mut dyn Compositor,
        scheduler: &mut UiScheduler,
    ) -> Result<(), ControllerError> {
        self.animator.cancel(scheduler);
        self.update_total_user_interface(display, compositor)
    }

    pub fn enable(
        &mut self,
        compositor: &mut dyn Compositor,
        scheduler: &mut UiScheduler,
    ) -> Result<(), ControllerError> {
        self.animator.set_target(1.0);
        self.animator.ensure_scheduled(scheduler);
        self.layout.flags = INTERACTIVE_FLAGS;
        push_layout(compositor, SurfaceKind::Blinder, &self.layout)
    }

    pub fn disable(
        &mut self,
        compositor: &mut dyn Compositor,
        scheduler: &mut UiScheduler,
    ) -> Result<(), ControllerError> {
        self.animator.set_target(0.0);
        self.animator.ensure_scheduled(scheduler);
        self.layout.flags = NOT_INTERACTIVE_FLAGS;
        push_layout(compositor, SurfaceKind::Blinder, &self.layout)
    }

    pub fn on_tick(
        &mut self,
        token: TaskToken,
        compositor: &mut dyn Compositor,
        scheduler: &mut UiScheduler,
    ) {
        let attached = compositor.is_attached(SurfaceKind::Blinder);
        if let Some(alpha) = self.animator.tick(token, attached, scheduler).alpha() {
            compositor.set_alpha(SurfaceKind::Blinder, alpha);
        }
    }

    fn update_total_user_interface(
        &mut self,
        display: &dyn Display,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        self.screen = query_screen(display);
        self.update_window_params(compositor)
    }

    fn update_window_params(
        &mut self,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        let frame = geometry::resolve_blinder_layout(&self.screen)?;
        self.layout.set_frame(frame);
        push_layout(compositor, SurfaceKind::Blinder, &self.layout)
    }
}

#[derive(Debug)]
pub struct TriggerSurface {
    screen: ScreenGeometry,
    layout: LayoutParams,
    router: GestureRouter,
}

impl TriggerSurface {
    pub fn new(now: Instant) -> Self {
        Self {
            screen: ScreenGeometry::UNRESOLVED,
            layout: LayoutParams::new(Gravity::BottomLeft, TRIGGER_FLAGS),
            router: GestureRouter::new(now),
        }
    }

    pub fn screen(&self) -> &ScreenGeometry {
        &self.screen
    }

    pub fn layout(&self) -> &LayoutParams {
        &self.layout
    }

    pub fn initialize(
        &mut self,
        display: &dyn Display,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        self.update_total_user_interface(display, compositor)
    }

    pub fn attach(&mut self, compositor: &mut dyn Compositor) -> Result<(), ControllerError> {
        self.update_window_params(compositor)?;
        compositor.add_surface(SurfaceKind::Trigger, &self.layout)?;
        tracing::debug!(frame = ?self.layout.frame(), "trigger attached");
        Ok(())
    }

    pub fn detach(&mut self, compositor: &mut dyn Compositor) -> Result<(), ControllerError> {
        compositor.remove_surface(SurfaceKind::Trigger)?;
        tracing::debug!("trigger detached");
        Ok(())
    }

    /// Stop routing input. Safe to call more than once.
    pub fn release(&mut self, scheduler: &mut UiScheduler) {
        self.router.release(scheduler);
    }

    pub fn on_configuration_changed(
        &mut self,
        display: &dyn Display,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        self.update_total_user_interface(display, compositor)
    }

    pub fn on_pointer_event(
        &mut self,
        event: PointerEvent,
        scheduler: &mut UiScheduler,
    ) -> Vec<BlinderCommand> {
        self.router.on_pointer_event(event, scheduler)
    }

    pub fn on_task(&mut self, token: TaskToken, task: Task) -> Vec<BlinderCommand> {
        self.router.on_task(token, task)
    }

    fn update_total_user_interface(
        &mut self,
        display: &dyn Display,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        self.screen = query_screen(display);
        self.update_window_params(compositor)
    }

    fn update_window_params(
        &mut self,
        compositor: &mut dyn Compositor,
    ) -> Result<(), ControllerError> {
        let frame = geometry::resolve_trigger_layout(&self.screen)?;
        self.layout.set_frame(frame);
        push_layout(compositor, SurfaceKind::Trigger, &self.layout)
    }
}
