//! ui::report
//!
//! Pure functions that render a [`RunReport`].
//!
//! # Example Output
//!
//! ```text
//! Source: https://github.com/kubernetes/kubernetes.git (master @ 1a2b3c4d5e6f)
//! Document: test/compatibility_lifecycle/reference/versioned_feature_list.yaml
//! Digest: 9f86d081884c...
//! Fetched: 2026-10-19T12:00:00+00:00
//!
//! Foo                 1.25  GA     default=true   locked
//! Bar                 1.31  Beta   default=true
//!
//! 2 feature gates, 0 warnings
//! ```

use crate::engine::RunReport;

/// How to render a report.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// The full report as JSON
    Json,
}

/// Render `report` in `format`.
pub fn render(report: &RunReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
    }
}

/// Pretty-printed JSON, newline terminated.
pub fn render_json(report: &RunReport) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    let source = &report.source;

    out.push_str(&format!(
        "Source: {} ({} @ {})\n",
        source.repo_url,
        source.branch,
        source.commit.short(12)
    ));
    out.push_str(&format!("Document: {}\n", source.document_path.display()));
    out.push_str(&format!("Digest: {}\n", report.document_digest));
    out.push_str(&format!("Fetched: {}\n", report.fetched_at));

    if !report.gates.is_empty() {
        out.push('\n');
    }
    let width = report
        .gates
        .iter()
        .map(|gate| gate.name().len())
        .max()
        .unwrap_or(0);

    for gate in &report.gates {
        let line = match gate.latest() {
            Some(spec) => format!(
                "{:<width$}  {:<5} {:<6} default={:<5}{}{}",
                gate.name(),
                spec.version(),
                spec.pre_release().as_str(),
                spec.default(),
                if spec.lock_to_default() { "  locked" } else { "" },
                if spec.release_version().map_or(false, |v| v.is_pre_release()) {
                    "  prerelease"
                } else {
                    ""
                },
                width = width,
            ),
            None => format!("{:<width$}  (no release history)", gate.name(), width = width),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&format!(
        "\n{} feature {}, {} {}\n",
        report.gates.len(),
        plural(report.gates.len(), "gate", "gates"),
        report.warnings.len(),
        plural(report.warnings.len(), "warning", "warnings"),
    ));
    out
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
