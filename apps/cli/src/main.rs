#![deny(warnings)]

//! Console front-end: accounts, the branch menu and the three game branches.

mod app;
mod console;
mod render;

use anyhow::{Context, Result};
use catalog::Catalog;
use persistence::JsonAchievementStore;
use sim_core::SimConfig;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_args() -> SimConfig {
    let mut cfg = SimConfig::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => cfg.rng_seed = it.next().and_then(|s| s.parse().ok()),
            "--storage" => {
                if let Some(dir) = it.next() {
                    cfg.storage_dir = PathBuf::from(dir);
                }
            }
            "--catalog" => cfg.catalog_path = it.next().map(PathBuf::from),
            _ => {}
        }
    }
    cfg
}

fn main() -> Result<()> {
    // Logs go to stderr and stay quiet unless RUST_LOG asks for more
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cfg = parse_args();
    info!(?cfg, "starting flip tycoon");
    let catalog = Catalog::load_or_default(cfg.catalog_path.as_deref()).context("loading catalog")?;

    println!(
        "Flip Tycoon {} ({} built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_SHA"),
        env!("BUILD_DATE")
    );
    let store = JsonAchievementStore::new(&cfg.storage_dir);
    let mut app = app::App::new(&cfg, catalog, store);
    let mut con = console::Console::new(io::stdin().lock(), io::stdout());
    app.run(&mut con)
}
