//! Practice lab - run HTML/CSS/JS/TS snippets in a sandboxed preview.

mod cli;
mod config;
mod content;
mod core;
mod embed;
mod lab;
mod logger;
mod relay;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{LabConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(LabConfig::load(cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::bind_server()?.run(),
        Commands::Run { args } => cli::run::run_headless(args, &config),
        Commands::Fetch { path, html, pretty } => {
            cli::fetch::fetch_file(path, *html, *pretty, &config)
        }
        Commands::Lookup {
            category,
            topic,
            example,
        } => cli::lookup::lookup(category, topic.as_deref(), example.as_deref(), &config),
    }
}
