use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::AnalysisResult;

pub const REPORT_TITLE: &str = "Resume Analysis Report";
pub const NO_KEYWORDS: &str = "No keywords extracted.";
pub const NO_SUGGESTIONS: &str = "No suggestions.";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("there is no successful analysis to export")]
    NoResult,

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Name used for every exported report.
pub fn file_name() -> &'static str {
    "resume_analysis_report.md"
}

/// Renders a result as a Markdown document. Same input, same bytes.
pub fn format(result: &AnalysisResult) -> String {
    let mut doc = String::new();

    let _ = writeln!(doc, "# {REPORT_TITLE}");
    doc.push('\n');

    doc.push_str("## Summary\n\n");
    let _ = writeln!(doc, "{}", result.summary.trim());
    doc.push('\n');

    doc.push_str("## Keywords\n\n");
    if result.keywords.is_empty() {
        let _ = writeln!(doc, "{NO_KEYWORDS}");
    } else {
        let _ = writeln!(doc, "{}", result.keywords.join(", "));
    }
    doc.push('\n');

    doc.push_str("## Suggestions\n\n");
    if result.suggestions.is_empty() {
        let _ = writeln!(doc, "{NO_SUGGESTIONS}");
    } else {
        for (i, suggestion) in result.suggestions.iter().enumerate() {
            let _ = writeln!(doc, "{}. {}", i + 1, suggestion);
        }
    }

    doc
}

/// Writes the report for `result` into `dir` and returns the file's path.
pub async fn export(result: Option<&AnalysisResult>, dir: &Path) -> Result<PathBuf, ReportError> {
    let result = result.ok_or(ReportError::NoResult)?;
    let path = dir.join(file_name());

    tokio::fs::write(&path, format(result))
        .await
        .map_err(|source| ReportError::Io { path: path.clone(), source })?;

    info!(path = %path.display(), "report exported");
    Ok(path)
}
