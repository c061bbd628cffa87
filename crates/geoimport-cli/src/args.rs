use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for geoimport
#[derive(Debug, Parser)]
#[command(
    name = "geoimport",
    version,
    about = "Import GeoNames dumps into a geoimport store snapshot"
)]
pub struct CliArgs {
    /// Store snapshot to load before and save after the run
    #[arg(short = 's', long = "store", global = true, default_value = "geoimport.bin.gz")]
    pub store: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the import pipeline
    Import(ImportArgs),

    /// Show entity counts of the store snapshot
    Stats,
}

#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    /// Comma-separated stages (country,region,subregion,city,district,alt_name,postal_code) or `all`
    #[arg(short = 'i', long = "import", default_value = "all")]
    pub import: String,

    /// Re-import even when sources look unchanged
    #[arg(long)]
    pub force: bool,

    /// Directory holding the GeoNames files
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// JSON configuration file; flags given here override it
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Comma-separated alternate name languages (e.g. en,und)
    #[arg(long)]
    pub locales: Option<String>,

    /// Comma-separated postal code countries (e.g. FR,BE) or ALL
    #[arg(long = "postal-countries")]
    pub postal_countries: Option<String>,

    /// Built-in plugin to enable; repeat to add more, in order
    #[arg(long = "plugin")]
    pub plugins: Vec<String>,

    /// Probe the download server and fetch stale files
    #[arg(long)]
    pub fetch: bool,
}

/// Splits a comma-separated flag value into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
