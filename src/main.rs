mod budget;
mod config;
mod db;
mod export;
mod models;
mod repo;
mod run;
mod ui;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let paths = get_paths()?;

    let mut config = config::Config::load(&paths.config_file)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    let rest = config.apply_args(&args)?;

    run::as_cli(&rest, &config, &paths)
}

/// Diagnostics go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(config::ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn get_paths() -> Result<run::Paths> {
    let proj_dirs = directories::ProjectDirs::from("com", "catbudget", "catbudget")
        .context("Could not determine config and data directories")?;
    Ok(run::Paths {
        config_file: proj_dirs.config_dir().join("config.json"),
        database: proj_dirs.data_dir().join("catbudget.db"),
    })
}
