//! Assetry - serve CSS and JavaScript bundles declared in templates.

mod asset;
mod cli;
mod config;
mod core;
mod freshness;
mod logger;
mod provider;
mod template;
mod utils;
mod web;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProviderConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = ProviderConfig::load(&cli)?;
    let provider = provider::boot(&config)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(&config, provider),
        Commands::Dump { .. } => cli::dump::dump_assets(&config, &provider),
        Commands::Routes { .. } => cli::routes::list_routes(&config, &provider),
    }
}
