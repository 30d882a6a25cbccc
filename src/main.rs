//! hidscope CLI
//!
//! Inspect and exercise HID devices: enumerate them, decode report
//! descriptors, stream input reports, and exchange output/feature reports.

use clap::Parser;

// CLI definitions
mod cli;
use cli::{Cli, Commands, FeatureCommands};

// Command handlers (split from main.rs)
mod commands;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => {
            // Default: list devices
            commands::query::list(cli.json, None, None)?;
        }
        Some(Commands::List { usage_page, usage }) => {
            commands::query::list(cli.json, usage_page.as_deref(), usage.as_deref())?;
        }
        Some(Commands::Info { path }) => {
            commands::query::info(&path, cli.json)?;
        }
        Some(Commands::Descriptor { path, raw }) => {
            commands::query::descriptor(&path, raw, cli.json)?;
        }
        Some(Commands::Read { path, timeout }) => {
            commands::io::read(&path, timeout)?;
        }
        Some(Commands::Write { path, hex }) => {
            commands::io::write(&path, &hex)?;
        }
        Some(Commands::Feature(FeatureCommands::Get {
            path,
            report_id,
            size,
        })) => {
            commands::io::feature_get(&path, &report_id, size, cli.json)?;
        }
        Some(Commands::Feature(FeatureCommands::Set { path, hex })) => {
            commands::io::feature_set(&path, &hex)?;
        }
        Some(Commands::Track {
            path,
            fields,
            min,
            max,
        }) => {
            commands::track::track(&path, &fields, min, max)?;
        }
        Some(Commands::Doctor { target }) => {
            commands::doctor::doctor(target.as_deref(), cli.json)?;
        }
    }

    Ok(())
}
