//! Candidates command handler

use std::fmt::Write as _;

use hallar::{CandidateGenerator, FieldCatalog, LocatorConfig};

use crate::commands::CandidatesArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Execute the candidates command
pub fn execute_candidates(_config: &CliConfig, args: &CandidatesArgs) -> CliResult<()> {
    let catalog = super::load_catalog(&args.source)?;
    let locator_config = super::load_locator_config(args.config.as_deref())?;
    let out = render_candidates(&catalog, &args.field, args.current.as_deref(), &locator_config)?;
    print!("{out}");
    Ok(())
}

/// The chain the resolver would walk for `field`, in order
pub fn render_candidates(
    catalog: &FieldCatalog,
    field: &str,
    current: Option<&str>,
    config: &LocatorConfig,
) -> CliResult<String> {
    let spec = catalog.require(field)?;
    let chain = CandidateGenerator::new(config.clone()).generate(spec, current);
    if chain.is_empty() {
        return Err(CliError::config(format!(
            "field '{field}' declares no candidates and its kind has no fallbacks"
        )));
    }

    let declared = spec.candidates.len();
    let mut out = String::new();
    let _ = writeln!(out, "{field} ({}):", spec.kind.name());
    for (i, candidate) in chain.iter().enumerate() {
        let origin = if i < declared { "declared" } else { "fallback" };
        let _ = writeln!(
            out,
            "{i:>3}  {candidate}  ({}ms, {origin})",
            candidate.timeout_ms
        );
    }
    Ok(out)
}
