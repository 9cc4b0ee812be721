// Error types shared by the geometry resolver, the compositor seam and the controller.

use thiserror::Error;

use crate::overlay::SurfaceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Layout was requested before the first screen configuration was resolved.
    #[error("unsupported orientation: screen configuration was never resolved")]
    UnsupportedOrientation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositorError {
    #[error("{0:?} surface is already attached")]
    AlreadyAttached(SurfaceKind),
    #[error("{0:?} surface is not attached")]
    NotAttached(SurfaceKind),
    #[error("platform compositor failure: {0}")]
    Platform(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("overlay already started")]
    AlreadyStarted,
    #[error("overlay already stopped")]
    AlreadyStopped,
    #[error("overlay is not active")]
    NotActive,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Compositor(#[from] CompositorError),
}

impl ControllerError {
    /// Fatal errors mean an ordering bug; everything else is a logged no-op.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ControllerError::Geometry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_geometry_errors_are_fatal() {
        assert!(ControllerError::from(GeometryError::UnsupportedOrientation).is_fatal());
        assert!(!ControllerError::AlreadyStarted.is_fatal());
        assert!(!ControllerError::AlreadyStopped.is_fatal());
        assert!(!ControllerError::NotActive.is_fatal());
        assert!(!ControllerError::from(CompositorError::NotAttached(SurfaceKind::Blinder)).is_fatal());
    }
}
