//! Check command handler

use std::fmt::Write as _;

use hallar::{CandidateGenerator, FailurePolicy, FieldCatalog, LocatorConfig};

use crate::commands::CheckArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;

/// Execute the check command
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    let catalog = super::load_catalog(&args.source)?;
    print!("{}", render_check(&catalog, &LocatorConfig::default()));

    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.success(&format!(
        "catalog '{}' is valid ({} fields)",
        catalog.name,
        catalog.fields.len()
    ));
    Ok(())
}

/// One row per field: kind, declared candidates, full chain length, policy
#[must_use]
pub fn render_check(catalog: &FieldCatalog, config: &LocatorConfig) -> String {
    let generator = CandidateGenerator::new(config.clone());
    let mut out = String::new();

    let _ = writeln!(out, "Catalog: {} (v{})", catalog.name, catalog.version);
    if !catalog.description.is_empty() {
        let _ = writeln!(out, "  {}", catalog.description);
    }
    for (i, field) in catalog.fields.iter().enumerate() {
        let chain = generator.generate(field, None).len();
        let policy = match field.on_failure {
            FailurePolicy::Fatal => "fatal",
            FailurePolicy::Degraded => "degraded",
        };
        let mapped = field
            .value_map
            .as_ref()
            .map(|m| format!(", {} labels", m.len()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>3}. {:<20} {:<16} {} declared, {chain} in chain{mapped}  [{policy}]",
            i + 1,
            field.name,
            field.kind.name(),
            field.candidates.len(),
        );
    }
    out
}
