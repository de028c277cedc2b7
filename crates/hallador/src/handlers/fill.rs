//! Fill command handler

use std::fmt::Write as _;
use std::path::Path;

use hallar::{FieldValue, FieldValues, SessionReport};

use crate::commands::ReportFormat;
use crate::error::{CliError, CliResult};
use crate::output::describe_field;

/// Read a values file.
///
/// Relative file paths for dropzone fields are taken relative to the
/// values file.
pub fn load_values(path: &Path) -> CliResult<FieldValues> {
    let text = std::fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse_values(&text, base)
}

/// Parse a YAML mapping of field name to label or file list
pub fn parse_values(yaml: &str, base: &Path) -> CliResult<FieldValues> {
    let mut values: FieldValues =
        serde_yaml_ng::from_str(yaml).map_err(|e| CliError::values(e.to_string()))?;
    for value in values.values_mut() {
        if let FieldValue::Files(files) = value {
            for file in files.iter_mut() {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }
    Ok(values)
}

/// Render a fill report for stdout
pub fn render_report(report: &SessionReport, format: ReportFormat) -> CliResult<String> {
    if format == ReportFormat::Json {
        let mut json = serde_json::to_string_pretty(report)?;
        json.push('\n');
        return Ok(json);
    }

    let mut out = String::new();
    for field in &report.fields {
        let _ = writeln!(out, "{}", describe_field(field));
    }
    if let Some(aborted) = &report.aborted {
        let _ = writeln!(out, "{}: ABORTED ({})", aborted.field, aborted.message);
    }
    for shot in &report.screenshots {
        let _ = writeln!(out, "screenshot: {}", shot.display());
    }
    Ok(out)
}

/// Execute the fill command against a freshly launched Chromium
#[cfg(feature = "browser")]
pub fn execute_fill(
    config: &crate::config::CliConfig,
    args: &crate::commands::FillArgs,
) -> CliResult<()> {
    use crate::output::ProgressReporter;
    use std::time::Instant;

    let catalog = super::load_catalog(&args.source)?;
    let values = load_values(&args.values)?;
    let mut locator_config = super::load_locator_config(args.config.as_deref())?;
    if let Some(dir) = &args.artifacts_dir {
        locator_config = locator_config.with_artifacts_dir(dir.clone());
    }

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::browser(format!("Failed to create runtime: {e}")))?;

    let started = Instant::now();
    let report = rt.block_on(fill_in_browser(
        &mut reporter,
        args,
        &catalog,
        &values,
        locator_config,
    ))?;

    print!("{}", render_report(&report, args.format)?);
    for shot in &report.screenshots {
        reporter.warning(&format!("failure screenshot saved to {}", shot.display()));
    }
    reporter.summary(&report, started.elapsed());
    match report.aborted {
        Some(aborted) => Err(CliError::aborted(aborted.field, aborted.message)),
        None => Ok(()),
    }
}

#[cfg(feature = "browser")]
async fn fill_in_browser(
    reporter: &mut crate::output::ProgressReporter,
    args: &crate::commands::FillArgs,
    catalog: &hallar::FieldCatalog,
    values: &FieldValues,
    locator_config: hallar::LocatorConfig,
) -> CliResult<SessionReport> {
    use hallar::{ChromiumConfig, ChromiumDriver, PageSession};

    let mut chromium = ChromiumConfig::default().with_headless(args.headless);
    if args.no_sandbox {
        chromium = chromium.with_no_sandbox();
    }
    if let Some(path) = &args.chromium_path {
        chromium = chromium.with_chromium_path(path.to_string_lossy());
    }

    reporter.start_spinner("launching chromium");
    let driver = match ChromiumDriver::launch(chromium).await {
        Ok(driver) => driver,
        Err(e) => {
            reporter.finish();
            return Err(CliError::browser(e.to_string()));
        }
    };

    reporter.set_message(&format!("opening {}", args.url));
    if let Err(e) = driver.goto(&args.url).await {
        reporter.finish();
        let _ = driver.close().await;
        return Err(CliError::browser(e.to_string()));
    }

    reporter.set_message(&format!("filling {}", catalog.name));
    let mut session = PageSession::open(driver, locator_config);
    let result = session.fill_catalog(catalog, values).await;
    reporter.finish();

    if let Err(e) = session.close().close().await {
        tracing::warn!(error = %e, "browser did not shut down cleanly");
    }
    Ok(result?)
}
