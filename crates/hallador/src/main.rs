//! Hallador CLI: resilient field location from the command line
//!
//! ## Usage
//!
//! ```bash
//! hallador check --builtin listing                        # Validate a catalog
//! hallador candidates form.yaml --field "Loại bất động sản"
//! hallador map --builtin listing -f "Nội thất" -l "Đầy đủ nội thất"
//! hallador fill form.yaml --url http://localhost:3000/post/new --values values.yaml
//! hallador config --file hallar.yaml                      # Effective timeouts
//! ```

use clap::Parser;
use hallador::{handlers, Cli, CliConfig, CliResult, ColorChoice, Commands, LogFormat, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    config.init_logging();

    match cli.command {
        Commands::Check(args) => handlers::execute_check(&config, &args),
        Commands::Candidates(args) => handlers::execute_candidates(&config, &args),
        Commands::Map(args) => handlers::execute_map(&config, &args),
        #[cfg(feature = "browser")]
        Commands::Fill(args) => handlers::execute_fill(&config, &args),
        #[cfg(not(feature = "browser"))]
        Commands::Fill(_) => Err(hallador::CliError::config(
            "fill drives a real browser; rebuild with --features browser",
        )),
        Commands::Config(args) => handlers::execute_config(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();
    let log_format: LogFormat = cli.log_format.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_format(log_format)
}
