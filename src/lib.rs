//! Tap-to-dim screen blinder.
//!
//! A full-screen translucent blinder surface fades in when the floating trigger surface is
//! tapped and fades out on a long press. [`controller::OverlayController`] ties the pieces
//! together; platform backends live under [`platform`].

pub mod animator;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interaction;
pub mod logging;
pub mod overlay;
pub mod platform;
pub mod scheduler;
pub mod surface;

pub use controller::{LifecycleState, OverlayController};
pub use error::{CompositorError, ControllerError, GeometryError};
