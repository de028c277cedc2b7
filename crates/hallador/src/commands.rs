//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Hallador: CLI for Hallar - resilient field locator for browser forms
#[derive(Parser, Debug)]
#[command(name = "hallador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and validate a field catalog
    Check(CheckArgs),

    /// Show the ordered candidate chain for one field
    Candidates(CandidatesArgs),

    /// Translate a display label through a field's value map
    Map(MapArgs),

    /// Open a page in Chromium and fill a catalog's fields
    Fill(FillArgs),

    /// Print the effective locator configuration as YAML
    Config(ConfigArgs),
}

/// Which catalog to load: a YAML file or a built-in one
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct CatalogSource {
    /// Path to a catalog YAML file
    pub catalog: Option<PathBuf>,

    /// Use a built-in catalog instead of a file
    #[arg(long, value_enum)]
    pub builtin: Option<BuiltinCatalog>,
}

/// Catalogs compiled into the binary
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinCatalog {
    /// Real-estate new-listing form
    Listing,
    /// Login modal
    Login,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Catalog to validate
    #[command(flatten)]
    pub source: CatalogSource,
}

/// Arguments for the candidates command
#[derive(Parser, Debug)]
pub struct CandidatesArgs {
    /// Catalog holding the field
    #[command(flatten)]
    pub source: CatalogSource,

    /// Field name as declared in the catalog
    #[arg(short, long)]
    pub field: String,

    /// Value the control currently displays
    #[arg(long)]
    pub current: Option<String>,

    /// Locator configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the map command
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Catalog holding the field
    #[command(flatten)]
    pub source: CatalogSource,

    /// Field name as declared in the catalog
    #[arg(short, long)]
    pub field: String,

    /// Display label to translate
    #[arg(short, long)]
    pub label: String,
}

/// Arguments for the fill command
#[derive(Parser, Debug)]
pub struct FillArgs {
    /// Catalog describing the form
    #[command(flatten)]
    pub source: CatalogSource,

    /// Page to open
    #[arg(long)]
    pub url: String,

    /// YAML mapping of field name to label (or list of files)
    #[arg(long)]
    pub values: PathBuf,

    /// Run Chromium without a window
    #[arg(long)]
    pub headless: bool,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Locator configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for failure screenshots (overrides the config file)
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Locator configuration file to load over the defaults
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Fill report format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
