//! Command line interface
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply pending storage migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// keyshelf - per-user API key storage behind identity-provider sign-in
#[derive(Parser)]
#[command(name = "keyshelf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Apply pending storage migrations and exit
    Migrate,
}

/// Load `.env`, layered config and install logging
fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
