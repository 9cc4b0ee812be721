// Overlay windows as the compositor sees them.
//
// A surface is described to the compositor by a `LayoutParams` block: size, anchored
// position, z-layer, flags and pixel format. The compositor and display services are
// traits so the controller can run against the Win32 backend or a test double.

use std::ops::{BitOr, BitOrAssign};

use crate::error::CompositorError;
use crate::geometry::{Gravity, Orientation, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Full-screen dimming rectangle.
    Blinder,
    /// Small square that receives the enable/disable gestures.
    Trigger,
}

/// Compositor window flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowFlags(pub u32);

impl WindowFlags {
    pub const NONE: WindowFlags = WindowFlags(0);
    pub const NOT_FOCUSABLE: WindowFlags = WindowFlags(1 << 0);
    pub const NOT_TOUCHABLE: WindowFlags = WindowFlags(1 << 1);
    pub const NOT_TOUCH_MODAL: WindowFlags = WindowFlags(1 << 2);
    pub const WATCH_OUTSIDE_TOUCH: WindowFlags = WindowFlags(1 << 3);
    pub const LAYOUT_NO_LIMITS: WindowFlags = WindowFlags(1 << 4);
    pub const HARDWARE_ACCELERATED: WindowFlags = WindowFlags(1 << 5);
    pub const FULLSCREEN: WindowFlags = WindowFlags(1 << 6);
    pub const LAYOUT_IN_SCREEN: WindowFlags = WindowFlags(1 << 7);

    pub const fn union(self, other: WindowFlags) -> WindowFlags {
        WindowFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: WindowFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WindowFlags {
    type Output = WindowFlags;

    fn bitor(self, rhs: WindowFlags) -> WindowFlags {
        self.union(rhs)
    }
}

impl BitOrAssign for WindowFlags {
    fn bitor_assign(&mut self, rhs: WindowFlags) {
        *self = self.union(rhs);
    }
}

/// Blinder flags while enabled: it swallows touches so nothing underneath reacts.
pub const INTERACTIVE_FLAGS: WindowFlags = WindowFlags::NOT_FOCUSABLE
    .union(WindowFlags::WATCH_OUTSIDE_TOUCH)
    .union(WindowFlags::LAYOUT_NO_LIMITS)
    .union(WindowFlags::HARDWARE_ACCELERATED)
    .union(WindowFlags::FULLSCREEN)
    .union(WindowFlags::LAYOUT_IN_SCREEN);

/// Blinder flags while disabled: touches fall through.
pub const NOT_INTERACTIVE_FLAGS: WindowFlags = INTERACTIVE_FLAGS.union(WindowFlags::NOT_TOUCHABLE);

pub const TRIGGER_FLAGS: WindowFlags = WindowFlags::NOT_FOCUSABLE
    .union(WindowFlags::NOT_TOUCH_MODAL)
    .union(WindowFlags::WATCH_OUTSIDE_TOUCH)
    .union(WindowFlags::LAYOUT_NO_LIMITS)
    .union(WindowFlags::HARDWARE_ACCELERATED);

/// Z-layer. Overlays always sit in the topmost system-alert band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceType {
    #[default]
    SystemAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Translucent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
    pub gravity: Gravity,
    pub surface_type: SurfaceType,
    pub flags: WindowFlags,
    pub format: PixelFormat,
}

impl LayoutParams {
    pub fn new(gravity: Gravity, flags: WindowFlags) -> Self {
        Self {
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            gravity,
            surface_type: SurfaceType::SystemAlert,
            flags,
            format: PixelFormat::Translucent,
        }
    }

    pub fn set_frame(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Window-compositing service. Everything is called from the UI context only.
pub trait Compositor {
    fn add_surface(&mut self, kind: SurfaceKind, layout: &LayoutParams)
        -> Result<(), CompositorError>;

    /// Only valid while `kind` is attached.
    fn update_layout(
        &mut self,
        kind: SurfaceKind,
        layout: &LayoutParams,
    ) -> Result<(), CompositorError>;

    fn remove_surface(&mut self, kind: SurfaceKind) -> Result<(), CompositorError>;

    fn set_alpha(&mut self, kind: SurfaceKind, alpha: f32);

    fn is_attached(&self, kind: SurfaceKind) -> bool;
}

/// Physical display information.
pub trait Display {
    /// Raw `(width, height)` in the current rotation.
    fn screen_size(&self) -> (u32, u32);

    fn orientation(&self) -> Orientation;
}
