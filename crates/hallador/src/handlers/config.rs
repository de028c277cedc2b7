//! Config command handler

use std::path::Path;

use crate::commands::ConfigArgs;
use crate::config::CliConfig;
use crate::error::CliResult;

/// Execute the config command
pub fn execute_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    if config.verbosity.is_verbose() {
        match &args.file {
            Some(path) => eprintln!("# defaults overlaid with {}", path.display()),
            None => eprintln!("# built-in defaults"),
        }
    }
    print!("{}", render_config(args.file.as_deref())?);
    Ok(())
}

/// Effective locator configuration as YAML
pub fn render_config(file: Option<&Path>) -> CliResult<String> {
    Ok(super::load_locator_config(file)?.to_yaml()?)
}
