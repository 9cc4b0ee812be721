// Generic multi-touch recognizer.
//
// Turns a raw pointer stream into typed gesture callbacks: single-touch tracking, two-finger
// move/scale/rotate, fling, show-press, long-press and tap. Press timeouts run on the UI
// scheduler, so the host must hand `ShowPress`/`LongPress` tasks back through `on_task`.

use std::time::{Duration, Instant};

use crate::scheduler::{Task, TaskToken, UiScheduler};

/// Hold time before press feedback.
pub const SHOW_PRESS_TIMEOUT: Duration = Duration::from_millis(100);
/// Hold time before a press turns into a long press.
pub const LONG_PRESS_TIMEOUT: Duration = Duration::from_millis(500);
/// Slowest release speed, in units per second, still reported as a fling.
pub const MIN_FLING_VELOCITY: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn degrees_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// First pointer went down.
    Down,
    Move,
    /// Last pointer went up.
    Up,
    Cancel,
    /// An additional pointer went down.
    PointerDown,
    /// A non-last pointer went up.
    PointerUp,
}

/// One raw pointer sample as delivered by the input channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    /// Primary pointer, in coordinates of the receiving surface.
    pub x: f32,
    pub y: f32,
    /// Primary pointer, in absolute screen coordinates.
    pub raw_x: f32,
    pub raw_y: f32,
    pub pointer_count: usize,
    /// Screen positions of the secondary pointers, in pointer-index order.
    pub others: Vec<Point>,
    /// Pointer index the action refers to for `PointerDown`/`PointerUp`.
    pub action_index: usize,
}

impl PointerEvent {
    /// Single-pointer event.
    pub fn single(action: PointerAction, local: Point, raw: Point) -> Self {
        Self {
            action,
            x: local.x,
            y: local.y,
            raw_x: raw.x,
            raw_y: raw.y,
            pointer_count: 1,
            others: Vec::new(),
            action_index: 0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn raw_position(&self) -> Point {
        Point::new(self.raw_x, self.raw_y)
    }

    /// Replace the primary position with the absolute screen position.
    pub fn set_location(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

/// Receiver of recognized gestures. Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait InteractionCallback {
    fn on_single_touched(&mut self, point: Point) {}
    fn on_single_moved(&mut self, current: Point, last: Point, down: Point) {}
    fn on_single_stopped(&mut self, current: Point, last: Point, down: Point) {}
    fn on_single_released(&mut self, point: Point) {}
    fn on_single_canceled(&mut self) {}
    fn on_double_touched(&mut self, point0: Point, point1: Point) {}
    fn on_double_moved(&mut self, point0: Point, point1: Point) {}
    fn on_double_scaled(&mut self, current_len: f32, previous_len: f32, original_len: f32) {}
    fn on_double_rotated(&mut self, degree_vs_origin: f32, degree_vs_last: f32) {}
    fn on_single_released_in_double(&mut self, release: Point, remain: Point) {}
    fn on_double_canceled(&mut self) {}
    fn on_over_triple_canceled(&mut self) {}
    fn on_fling(&mut self, down: Point, up: Point, velocity_x: f32, velocity_y: f32) {}
    fn on_show_press(&mut self, point: Point) {}
    fn on_long_press(&mut self, point: Point) {}
    fn on_single_tap_up(&mut self, point: Point) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Single,
    Double,
    /// Gesture was abandoned; wait for the last pointer to go up.
    Draining,
}

#[derive(Debug, Clone, Copy, Default)]
struct Pinch {
    origin_len: f32,
    last_len: f32,
    origin_deg: f32,
    last_deg: f32,
}

#[derive(Debug)]
pub struct InteractionEngine {
    touch_slop: f32,
    phase: Phase,
    down: Point,
    last: Point,
    down_time: Instant,
    moved: bool,
    long_pressed: bool,
    show_press: Option<TaskToken>,
    long_press: Option<TaskToken>,
    pinch: Pinch,
}

impl InteractionEngine {
    pub fn new(touch_slop: f32, now: Instant) -> Self {
        Self {
            touch_slop: touch_slop.max(0.0),
            phase: Phase::Idle,
            down: Point::default(),
            last: Point::default(),
            down_time: now,
            moved: false,
            long_pressed: false,
            show_press: None,
            long_press: None,
            pinch: Pinch::default(),
        }
    }

    pub fn on_touch_event(
        &mut self,
        event: &PointerEvent,
        scheduler: &mut UiScheduler,
        callback: &mut dyn InteractionCallback,
    ) {
        let pos = event.position();
        match event.action {
            PointerAction::Down => {
                self.cancel_timers(scheduler);
                self.phase = Phase::Single;
                self.down = pos;
                self.last = pos;
                self.down_time = scheduler.now();
                self.moved = false;
                self.long_pressed = false;
                self.show_press = Some(scheduler.post_delayed(Task::ShowPress, SHOW_PRESS_TIMEOUT));
                self.long_press = Some(scheduler.post_delayed(Task::LongPress, LONG_PRESS_TIMEOUT));
                callback.on_single_touched(pos);
            }
            PointerAction::Move => match self.phase {
                Phase::Single => self.single_move(pos, scheduler, callback),
                Phase::Double => {
                    if let Some(&second) = event.others.first() {
                        self.double_move(pos, second, callback);
                    }
                }
                Phase::Idle | Phase::Draining => {}
            },
            PointerAction::PointerDown => self.pointer_down(event, scheduler, callback),
            PointerAction::PointerUp => {
                if self.phase == Phase::Double {
                    let second = event.others.first().copied().unwrap_or(pos);
                    let (release, remain) = if event.action_index == 0 {
                        (pos, second)
                    } else {
                        (second, pos)
                    };
                    callback.on_single_released_in_double(release, remain);
                    self.phase = Phase::Draining;
                }
            }
            PointerAction::Up => {
                if self.phase == Phase::Single {
                    self.single_up(pos, scheduler, callback);
                }
                self.cancel_timers(scheduler);
                self.phase = Phase::Idle;
            }
            PointerAction::Cancel => {
                self.cancel_timers(scheduler);
                match self.phase {
                    Phase::Single => callback.on_single_canceled(),
                    Phase::Double => callback.on_double_canceled(),
                    Phase::Idle | Phase::Draining => {}
                }
                self.phase = Phase::Idle;
            }
        }
    }

    /// Deliver a press timeout posted by this engine. Foreign or stale tokens are ignored.
    pub fn on_task(
        &mut self,
        token: TaskToken,
        task: Task,
        callback: &mut dyn InteractionCallback,
    ) {
        match task {
            Task::ShowPress if self.show_press == Some(token) => {
                self.show_press = None;
                callback.on_show_press(self.down);
            }
            Task::LongPress if self.long_press == Some(token) => {
                self.long_press = None;
                self.long_pressed = true;
                callback.on_long_press(self.down);
            }
            _ => {}
        }
    }

    /// Drop any pending timeouts and forget the current gesture.
    pub fn release(&mut self, scheduler: &mut UiScheduler) {
        self.cancel_timers(scheduler);
        self.phase = Phase::Idle;
    }

    fn cancel_timers(&mut self, scheduler: &mut UiScheduler) {
        if let Some(token) = self.show_press.take() {
            scheduler.remove(token);
        }
        if let Some(token) = self.long_press.take() {
            scheduler.remove(token);
        }
    }

    fn single_move(
        &mut self,
        pos: Point,
        scheduler: &mut UiScheduler,
        callback: &mut dyn InteractionCallback,
    ) {
        if !self.moved && pos.distance(self.down) > self.touch_slop {
            self.moved = true;
            self.cancel_timers(scheduler);
        }
        if self.moved {
            if pos == self.last {
                callback.on_single_stopped(pos, self.last, self.down);
            } else {
                callback.on_single_moved(pos, self.last, self.down);
            }
        }
        self.last = pos;
    }

    fn single_up(
        &mut self,
        pos: Point,
        scheduler: &mut UiScheduler,
        callback: &mut dyn InteractionCallback,
    ) {
        if !self.moved && pos.distance(self.down) > self.touch_slop {
            self.moved = true;
        }
        if !self.moved && !self.long_pressed {
            callback.on_single_tap_up(pos);
        }
        if self.moved {
            let elapsed = scheduler
                .now()
                .saturating_duration_since(self.down_time)
                .as_secs_f32();
            if elapsed > 0.0 {
                let vx = (pos.x - self.down.x) / elapsed;
                let vy = (pos.y - self.down.y) / elapsed;
                if vx.hypot(vy) >= MIN_FLING_VELOCITY {
                    callback.on_fling(self.down, pos, vx, vy);
                }
            }
        }
        callback.on_single_released(pos);
    }

    fn pointer_down(
        &mut self,
        event: &PointerEvent,
        scheduler: &mut UiScheduler,
        callback: &mut dyn InteractionCallback,
    ) {
        self.cancel_timers(scheduler);
        if event.pointer_count >= 3 {
            if self.phase == Phase::Double {
                callback.on_double_canceled();
            }
            self.phase = Phase::Draining;
            callback.on_over_triple_canceled();
            return;
        }
        if self.phase != Phase::Single {
            return;
        }
        let (Some(&second), first) = (event.others.first(), event.position()) else {
            return;
        };
        callback.on_single_canceled();
        let len = first.distance(second);
        let deg = first.degrees_to(second);
        self.pinch = Pinch {
            origin_len: len,
            last_len: len,
            origin_deg: deg,
            last_deg: deg,
        };
        self.phase = Phase::Double;
        callback.on_double_touched(first, second);
    }

    fn double_move(&mut self, first: Point, second: Point, callback: &mut dyn InteractionCallback) {
        callback.on_double_moved(first, second);

        let len = first.distance(second);
        if len != self.pinch.last_len {
            callback.on_double_scaled(len, self.pinch.last_len, self.pinch.origin_len);
            self.pinch.last_len = len;
        }

        let deg = first.degrees_to(second);
        if deg != self.pinch.last_deg {
            callback.on_double_rotated(deg - self.pinch.origin_deg, deg - self.pinch.last_deg);
            self.pinch.last_deg = deg;
        }
    }
}
