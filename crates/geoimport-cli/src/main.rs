//! geoimport: command-line interface for geoimport-core
//!
//! Usage examples
//! --------------
//!
//! - Import everything from ./data into the default snapshot
//!   $ geoimport import --force
//!
//! - Re-import cities (and districts) only, with verbose logs
//!   $ geoimport -v import --import city --force
//!
//! - Show what the snapshot holds
//!   $ geoimport stats
mod args;

use crate::args::{split_list, CliArgs, Commands, ImportArgs, LogFormat};
use anyhow::Context;
use clap::Parser;
use geoimport_core::{
    load_plugins, EntityStore, ImportConfig, MemoryStore, Pipeline, PipelineReport, Stage,
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose, args.log_format);

    match args.command {
        Commands::Import(import) => run_import(&args.store, import)?,
        Commands::Stats => {
            let store = MemoryStore::load_or_default(&args.store)
                .with_context(|| format!("loading {}", args.store.display()))?;
            let stats = store.stats();
            println!("Store statistics ({}):", args.store.display());
            println!("  Countries: {}", stats.countries);
            println!("  Regions: {}", stats.regions);
            println!("  Subregions: {}", stats.subregions);
            println!("  Cities: {}", stats.cities);
            println!("  Districts: {}", stats.districts);
            println!("  Alternate names: {}", stats.alt_names);
            println!("  Postal codes: {}", stats.postal_codes);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, format: LogFormat) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn build_config(import: &ImportArgs) -> anyhow::Result<ImportConfig> {
    let mut config = match &import.config {
        Some(path) => ImportConfig::load_from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ImportConfig::default(),
    };

    if let Some(dir) = &import.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(locales) = &import.locales {
        config.locales = split_list(locales).into_iter().collect();
    }
    if let Some(countries) = &import.postal_countries {
        config.postal_countries = split_list(countries).into_iter().collect();
    }
    if !import.plugins.is_empty() {
        config.plugins = import.plugins.clone();
    }
    config.force |= import.force;

    Ok(config.normalized()?)
}

fn run_import(store_path: &Path, import: ImportArgs) -> anyhow::Result<()> {
    let config = build_config(&import)?;
    let stages = Stage::parse_list(&import.import)?;
    let hooks = load_plugins(config.plugins.as_slice(), &config)?;

    let mut store = MemoryStore::load_or_default(store_path)
        .with_context(|| format!("loading {}", store_path.display()))?;

    let mut pipeline = Pipeline::new(&config, &hooks);
    if import.fetch {
        pipeline = with_fetch(pipeline)?;
    }

    // Stages committed before a failure stay; save them either way.
    let outcome = pipeline.run(&mut store, &stages);
    store
        .save_as(store_path)
        .with_context(|| format!("saving {}", store_path.display()))?;
    let report = outcome?;

    print_report(&report);
    info!(store = %store_path.display(), "snapshot saved");
    Ok(())
}

#[cfg(feature = "fetch")]
fn with_fetch(pipeline: Pipeline<'_>) -> anyhow::Result<Pipeline<'_>> {
    Ok(pipeline.with_remote(geoimport_core::HttpSource::new()?))
}

#[cfg(not(feature = "fetch"))]
fn with_fetch(_pipeline: Pipeline<'_>) -> anyhow::Result<Pipeline<'_>> {
    anyhow::bail!("--fetch needs geoimport built with the `fetch` feature")
}

fn print_report(report: &PipelineReport) {
    for stage in &report.stages {
        println!(
            "{:<12} read {:>9}  committed {:>9}  skipped {:>7}  filtered {:>9}",
            stage.stage, stage.read, stage.committed, stage.skipped, stage.filtered
        );
    }
    for stage in &report.up_to_date {
        println!("{stage:<12} up to date");
    }
}
