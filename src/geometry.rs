// Window geometry for the two overlay surfaces.
//
// The blinder covers the whole screen in its current orientation. The trigger is a fixed
// square hanging off the bottom-left corner, so only its validity depends on the screen.

use crate::error::GeometryError;

/// Trigger square edge, in logical units.
pub const TRIGGER_SIZE: i32 = 128;
/// Trigger distance from both edges of its anchor corner.
pub const TRIGGER_MARGIN: i32 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Portrait,
    Landscape,
    /// Only valid before the first configuration is resolved.
    #[default]
    Undefined,
}

impl Orientation {
    /// Derive orientation from raw extents (square screens count as portrait).
    pub fn from_extent(width: u32, height: u32) -> Self {
        if height < width {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Screen extents normalised to long/short edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenGeometry {
    pub long_edge: u32,
    pub short_edge: u32,
    pub orientation: Orientation,
}

impl ScreenGeometry {
    pub const UNRESOLVED: ScreenGeometry = ScreenGeometry {
        long_edge: 0,
        short_edge: 0,
        orientation: Orientation::Undefined,
    };

    pub fn new(width: u32, height: u32, orientation: Orientation) -> Self {
        Self {
            long_edge: width.max(height),
            short_edge: width.min(height),
            orientation,
        }
    }

    /// Width and height as laid out in the current orientation.
    pub fn extent(&self) -> Result<(u32, u32), GeometryError> {
        match self.orientation {
            Orientation::Landscape => Ok((self.long_edge, self.short_edge)),
            Orientation::Portrait => Ok((self.short_edge, self.long_edge)),
            Orientation::Undefined => Err(GeometryError::UnsupportedOrientation),
        }
    }
}

/// Corner a surface's offsets are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    TopLeft,
    BottomLeft,
}

impl Gravity {
    /// Top-left screen origin of `rect` once its anchor is resolved against the screen.
    pub fn origin(self, rect: &Rect, screen_height: u32) -> (i32, i32) {
        match self {
            Gravity::TopLeft => (rect.x, rect.y),
            Gravity::BottomLeft => (rect.x, screen_height as i32 - rect.y - rect.height),
        }
    }
}

/// Placement relative to a surface's gravity anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Full-bleed rectangle for the blinder, anchored top-left.
pub fn resolve_blinder_layout(screen: &ScreenGeometry) -> Result<Rect, GeometryError> {
    let (width, height) = screen.extent()?;
    Ok(Rect::new(0, 0, width as i32, height as i32))
}

/// Fixed trigger square, offset from the bottom-left anchor.
pub fn resolve_trigger_layout(screen: &ScreenGeometry) -> Result<Rect, GeometryError> {
    screen.extent()?;
    Ok(Rect::new(
        TRIGGER_MARGIN,
        TRIGGER_MARGIN,
        TRIGGER_SIZE,
        TRIGGER_SIZE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_normalised() {
        let screen = ScreenGeometry::new(1080, 1920, Orientation::Portrait);
        assert_eq!(screen.long_edge, 1920);
        assert_eq!(screen.short_edge, 1080);
    }

    #[test]
    fn landscape_blinder_covers_screen() {
        let screen = ScreenGeometry::new(1920, 1080, Orientation::Landscape);
        assert_eq!(
            resolve_blinder_layout(&screen).unwrap(),
            Rect::new(0, 0, 1920, 1080)
        );
    }

    #[test]
    fn portrait_blinder_swaps_edges() {
        let screen = ScreenGeometry::new(1920, 1080, Orientation::Portrait);
        assert_eq!(
            resolve_blinder_layout(&screen).unwrap(),
            Rect::new(0, 0, 1080, 1920)
        );
    }

    #[test]
    fn trigger_ignores_orientation() {
        let land = ScreenGeometry::new(1920, 1080, Orientation::Landscape);
        let port = ScreenGeometry::new(1920, 1080, Orientation::Portrait);
        let expected = Rect::new(36, 36, 128, 128);
        assert_eq!(resolve_trigger_layout(&land).unwrap(), expected);
        assert_eq!(resolve_trigger_layout(&port).unwrap(), expected);
    }

    #[test]
    fn undefined_orientation_is_rejected() {
        let screen = ScreenGeometry::UNRESOLVED;
        assert_eq!(
            resolve_blinder_layout(&screen),
            Err(GeometryError::UnsupportedOrientation)
        );
        assert_eq!(
            resolve_trigger_layout(&screen),
            Err(GeometryError::UnsupportedOrientation)
        );
    }

    #[test]
    fn bottom_left_gravity_resolves_from_bottom_edge() {
        let rect = Rect::new(36, 36, 128, 128);
        assert_eq!(Gravity::BottomLeft.origin(&rect, 1080), (36, 1080 - 36 - 128));
        assert_eq!(Gravity::TopLeft.origin(&rect, 1080), (36, 36));
    }

    #[test]
    fn orientation_from_extent() {
        assert_eq!(Orientation::from_extent(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::from_extent(1080, 1920), Orientation::Portrait);
        assert_eq!(Orientation::from_extent(800, 800), Orientation::Portrait);
    }
}
