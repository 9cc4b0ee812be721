// Trigger surface input routing.
//
// Pointer events arriving on the trigger are moved into screen coordinates, fed to the
// recognizer, and the only two gestures that matter are turned into blinder commands:
// tap enables, long press disables. Everything else the recognizer reports is dropped.

use std::time::Instant;

use crate::interaction::{InteractionCallback, InteractionEngine, Point, PointerEvent};
use crate::scheduler::{Task, TaskToken, UiScheduler};

/// Touch slop handed to the recognizer. Zero: any movement cancels the tap.
const TRIGGER_TOUCH_SLOP: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinderCommand {
    Enable,
    Disable,
}

/// Semantic gesture seen on the trigger, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Tap(Point),
    LongPress(Point),
}

impl GestureEvent {
    pub fn command(self) -> BlinderCommand {
        match self {
            GestureEvent::Tap(_) => BlinderCommand::Enable,
            GestureEvent::LongPress(_) => BlinderCommand::Disable,
        }
    }
}

/// Rewrite the primary pointer to absolute screen coordinates.
///
/// The trigger window can move and resize on its own, so surface-local coordinates would
/// pick up spurious deltas whenever the window does.
pub fn to_screen_coordinates(mut event: PointerEvent) -> PointerEvent {
    event.set_location(event.raw_x, event.raw_y);
    event
}

#[derive(Default)]
struct TriggerGestures {
    seen: Vec<GestureEvent>,
}

impl TriggerGestures {
    fn into_commands(self) -> Vec<BlinderCommand> {
        self.seen
            .into_iter()
            .inspect(|g| tracing::debug!(gesture = ?g, "trigger gesture"))
            .map(GestureEvent::command)
            .collect()
    }
}

impl InteractionCallback for TriggerGestures {
    fn on_single_tap_up(&mut self, point: Point) {
        self.seen.push(GestureEvent::Tap(point));
    }

    fn on_long_press(&mut self, point: Point) {
        self.seen.push(GestureEvent::LongPress(point));
    }
}

#[derive(Debug)]
pub struct GestureRouter {
    engine: Option<InteractionEngine>,
}

impl GestureRouter {
    pub fn new(now: Instant) -> Self {
        Self {
            engine: Some(InteractionEngine::new(TRIGGER_TOUCH_SLOP, now)),
        }
    }

    /// False once released.
    pub fn is_attached(&self) -> bool {
        self.engine.is_some()
    }

    pub fn on_pointer_event(
        &mut self,
        event: PointerEvent,
        scheduler: &mut UiScheduler,
    ) -> Vec<BlinderCommand> {
        let Some(engine) = self.engine.as_mut() else {
            tracing::trace!("pointer event after release dropped");
            return Vec::new();
        };
        let event = to_screen_coordinates(event);
        let mut gestures = TriggerGestures::default();
        engine.on_touch_event(&event, scheduler, &mut gestures);
        gestures.into_commands()
    }

    /// Deliver a recognizer timeout.
    pub fn on_task(&mut self, token: TaskToken, task: Task) -> Vec<BlinderCommand> {
        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };
        let mut gestures = TriggerGestures::default();
        engine.on_task(token, task, &mut gestures);
        gestures.into_commands()
    }

    /// Detach the recognizer and drop its pending timeouts. Safe to call twice.
    pub fn release(&mut self, scheduler: &mut UiScheduler) {
        if let Some(mut engine) = self.engine.take() {
            engine.release(scheduler);
            tracing::debug!("gesture router released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{PointerAction, LONG_PRESS_TIMEOUT};
    use std::time::Duration;

    fn touch(action: PointerAction, local: (f32, f32), raw: (f32, f32)) -> PointerEvent {
        PointerEvent::single(
            action,
            Point::new(local.0, local.1),
            Point::new(raw.0, raw.1),
        )
    }

    fn run_due(router: &mut GestureRouter, sched: &mut UiScheduler) -> Vec<BlinderCommand> {
        let mut out = Vec::new();
        while let Some((token, task)) = sched.pop_due() {
            out.extend(router.on_task(token, task));
        }
        out
    }

    #[test]
    fn tap_enables_once() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        let mut router = GestureRouter::new(start);

        let mut cmds = router.on_pointer_event(touch(PointerAction::Down, (5.0, 5.0), (41.0, 951.0)), &mut sched);
        sched.advance_to(start + Duration::from_millis(30));
        cmds.extend(run_due(&mut router, &mut sched));
        cmds.extend(router.on_pointer_event(touch(PointerAction::Up, (5.0, 5.0), (41.0, 951.0)), &mut sched));

        assert_eq!(cmds, vec![BlinderCommand::Enable]);
    }

    #[test]
    fn long_press_disables_once() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        let mut router = GestureRouter::new(start);

        let mut cmds = router.on_pointer_event(touch(PointerAction::Down, (5.0, 5.0), (41.0, 951.0)), &mut sched);
        sched.advance_to(start + LONG_PRESS_TIMEOUT + Duration::from_millis(100));
        cmds.extend(run_due(&mut router, &mut sched));
        cmds.extend(router.on_pointer_event(touch(PointerAction::Up, (5.0, 5.0), (41.0, 951.0)), &mut sched));

        assert_eq!(cmds, vec![BlinderCommand::Disable]);
    }

    #[test]
    fn drag_produces_no_command() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        let mut router = GestureRouter::new(start);

        let mut cmds = router.on_pointer_event(touch(PointerAction::Down, (5.0, 5.0), (41.0, 951.0)), &mut sched);
        sched.advance_to(start + Duration::from_millis(20));
        cmds.extend(router.on_pointer_event(touch(PointerAction::Move, (5.0, 5.0), (141.0, 951.0)), &mut sched));
        sched.advance_to(start + Duration::from_millis(40));
        cmds.extend(router.on_pointer_event(touch(PointerAction::Up, (5.0, 5.0), (241.0, 951.0)), &mut sched));
        sched.advance_to(start + Duration::from_secs(2));
        cmds.extend(run_due(&mut router, &mut sched));

        assert!(cmds.is_empty());
    }

    #[test]
    fn window_local_jitter_does_not_break_a_tap() {
        // The window moved under a still finger: local coordinates change, raw do not.
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        let mut router = GestureRouter::new(start);

        let mut cmds = router.on_pointer_event(touch(PointerAction::Down, (5.0, 5.0), (41.0, 951.0)), &mut sched);
        cmds.extend(router.on_pointer_event(touch(PointerAction::Move, (25.0, 5.0), (41.0, 951.0)), &mut sched));
        cmds.extend(router.on_pointer_event(touch(PointerAction::Up, (25.0, 5.0), (41.0, 951.0)), &mut sched));

        assert_eq!(cmds, vec![BlinderCommand::Enable]);
    }

    #[test]
    fn screen_coordinates_replace_local_ones() {
        let event = to_screen_coordinates(touch(PointerAction::Down, (5.0, 6.0), (100.0, 200.0)));
        assert_eq!(event.position(), Point::new(100.0, 200.0));
        assert_eq!(event.raw_position(), Point::new(100.0, 200.0));
    }

    #[test]
    fn release_is_idempotent_and_stops_routing() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        let mut router = GestureRouter::new(start);

        router.on_pointer_event(touch(PointerAction::Down, (5.0, 5.0), (41.0, 951.0)), &mut sched);
        assert!(!sched.is_empty());

        router.release(&mut sched);
        router.release(&mut sched);
        assert!(!router.is_attached());
        assert!(sched.is_empty());

        let cmds = router.on_pointer_event(touch(PointerAction::Up, (5.0, 5.0), (41.0, 951.0)), &mut sched);
        assert!(cmds.is_empty());
    }
}
