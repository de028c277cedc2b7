//! Hallador: command-line front end for Hallar
//!
//! Validates field catalogs, shows the fallback chain the resolver would
//! walk for a field, translates labels through value maps and, with the
//! `browser` feature, fills a live form in Chromium.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    BuiltinCatalog, CandidatesArgs, CatalogSource, CheckArgs, Cli, ColorArg, Commands,
    ConfigArgs, FillArgs, LogFormatArg, MapArgs, ReportFormat,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{describe_field, ProgressReporter};
