//! Status output and progress reporting

use console::{Style, Term};
use hallar::{FieldOutcome, FieldReport, SessionReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Status reporter writing to stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Start a spinner for a step of unknown length
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    /// Update spinner message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.spinner {
            pb.set_message(message.to_string());
        }
    }

    /// Stop and clear the spinner
    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(self.prefix("✓", "OK", Style::new().green().bold()), message);
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures print even in quiet mode
        self.line(self.prefix("✗", "FAIL", Style::new().red().bold()), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(self.prefix("⚠", "WARN", Style::new().yellow().bold()), message);
    }

    /// Print the closing line of a fill run
    pub fn summary(&self, report: &SessionReport, duration: Duration) {
        if self.quiet && report.is_success() {
            return;
        }

        let set = report.fields.iter().filter(|f| f.outcome.is_set()).count();
        let skipped = report.skipped();
        let secs = duration.as_secs_f64();
        let status = if report.is_success() { "FILLED" } else { "ABORTED" };

        let status = if self.use_color {
            let style = if report.is_success() {
                Style::new().green().bold()
            } else {
                Style::new().red().bold()
            };
            style.apply_to(status).to_string()
        } else {
            status.to_string()
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "{status} {} in {secs:.2}s ({set} set, {skipped} skipped)",
            report.catalog
        ));
        if let Some(aborted) = &report.aborted {
            self.failure(&format!("{}: {}", aborted.field, aborted.message));
        }
    }

    fn prefix(&self, symbol: &str, plain: &str, style: Style) -> String {
        if self.use_color {
            style.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    fn line(&self, prefix: String, message: &str) {
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

/// One-line description of a field outcome
#[must_use]
pub fn describe_field(report: &FieldReport) -> String {
    let name = &report.field;
    match &report.outcome {
        FieldOutcome::Applied {
            candidate,
            selector,
        } => format!("{name}: set via candidate #{candidate} `{selector}`"),
        FieldOutcome::Uploaded { candidate, report } => format!(
            "{name}: {}/{} previews via candidate #{candidate} `{}`",
            report.observed, report.expected, report.selector
        ),
        FieldOutcome::AlreadySet => format!("{name}: already set"),
        FieldOutcome::Skipped { reason } => format!("{name}: skipped ({reason})"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use hallar::{AbortedField, UploadReport};

    fn report(outcome: FieldOutcome) -> FieldReport {
        FieldReport {
            field: "Giá bán".to_string(),
            outcome,
        }
    }

    mod describe_tests {
        use super::*;

        #[test]
        fn test_applied() {
            let line = describe_field(&report(FieldOutcome::Applied {
                candidate: 1,
                selector: "input[placeholder=\"Nhập giá bán\"]".to_string(),
            }));
            assert_eq!(
                line,
                "Giá bán: set via candidate #1 `input[placeholder=\"Nhập giá bán\"]`"
            );
        }

        #[test]
        fn test_already_set() {
            assert_eq!(
                describe_field(&report(FieldOutcome::AlreadySet)),
                "Giá bán: already set"
            );
        }

        #[test]
        fn test_skipped_carries_reason() {
            let line = describe_field(&report(FieldOutcome::Skipped {
                reason: "no candidate matched".to_string(),
            }));
            assert!(line.ends_with("skipped (no candidate matched)"));
        }

        #[test]
        fn test_uploaded_shows_counts() {
            let line = describe_field(&FieldReport {
                field: "Hình ảnh".to_string(),
                outcome: FieldOutcome::Uploaded {
                    candidate: 0,
                    report: UploadReport {
                        expected: 3,
                        observed: 2,
                        shortfall: 1,
                        selector: "img[src*=\"blob:\"]".to_string(),
                    },
                },
            });
            assert!(line.contains("2/3 previews"));
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(false, true);
            assert!(!reporter.use_color);
            assert!(reporter.quiet);
        }

        #[test]
        fn test_default_reporter() {
            let reporter = ProgressReporter::default();
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let reporter = ProgressReporter::new(false, false);
            reporter.success("ok");
            reporter.failure("bad");
            reporter.warning("hmm");
        }

        #[test]
        fn test_spinner_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_spinner("launching chromium");
            reporter.set_message("navigating");
            reporter.finish();
            assert!(reporter.spinner.is_none());
        }

        #[test]
        fn test_quiet_mode_skips_spinner() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_spinner("launching chromium");
            assert!(reporter.spinner.is_none());
        }

        #[test]
        fn test_summary_aborted() {
            let reporter = ProgressReporter::new(false, true);
            let session = SessionReport {
                catalog: "listing_form".to_string(),
                fields: vec![report(FieldOutcome::AlreadySet)],
                aborted: Some(AbortedField {
                    field: "Dự án".to_string(),
                    message: "no candidate matched".to_string(),
                }),
                screenshots: Vec::new(),
            };
            reporter.summary(&session, Duration::from_millis(1500));
        }
    }
}
