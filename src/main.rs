// Prevents console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use surface_blinder::{config, logging};

fn main() -> anyhow::Result<()> {
    let cfg = config::load_config();
    logging::init(cfg.debug_logging);
    tracing::info!(enabled = cfg.is_enabled, "surface blinder starting");

    run(cfg)
}

#[cfg(windows)]
fn run(cfg: config::AppConfig) -> anyhow::Result<()> {
    surface_blinder::platform::win32::run(cfg)
}

#[cfg(not(windows))]
fn run(_cfg: config::AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("no overlay backend for this platform")
}
