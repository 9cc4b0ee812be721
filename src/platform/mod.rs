// Platform backends for the compositor, display and host event loop.

#[cfg(windows)]
pub mod win32;
