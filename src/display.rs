use colored::*;

use crate::analysis::{AnalysisResult, ErrorKind, RequestStatus};
use crate::intake::SelectedFile;
use crate::report::{NO_KEYWORDS, NO_SUGGESTIONS};

const WRAP_WIDTH: usize = 80;

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= KB * KB {
        format!("{:.1} MB", bytes_f / (KB * KB))
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_file(file: &SelectedFile) -> String {
    format!("{} ({})", file.name.bright_white(), format_size(file.size_bytes))
}

pub fn format_status(status: &RequestStatus) -> String {
    match status {
        RequestStatus::Idle => format!("{}", "Ready. Select a file and /submit it.".dimmed()),
        RequestStatus::Pending => format!("{}", "Analysis in progress...".yellow()),
        RequestStatus::Succeeded(result) => {
            format!("{}\n\n{}", "✓ Analysis complete".green().bold(), format_result(result))
        }
        RequestStatus::Failed(kind) => format_error(kind),
    }
}

pub fn format_error(kind: &ErrorKind) -> String {
    let hint = match kind {
        ErrorKind::InputMissing => "Use /select <path> first.",
        ErrorKind::ConfigurationMissing => {
            "Set analysis.endpoint in the config file or RESUME_ANALYZER_ENDPOINT."
        }
        ErrorKind::Timeout => "The service took too long. Try /submit again later.",
        ErrorKind::ServerError { .. }
        | ErrorKind::NetworkError { .. }
        | ErrorKind::UnknownError => "Check the file or try /submit again.",
    };
    format!("{} {}\n{}", "✗".red().bold(), kind.to_string().red(), hint.dimmed())
}

pub fn format_result(result: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Summary".bright_yellow().bold()));
    out.push_str(&textwrap::indent(&textwrap::fill(result.summary.trim(), WRAP_WIDTH - 2), "  "));

    out.push_str(&format!("\n{}\n", "Keywords".bright_yellow().bold()));
    if result.keywords.is_empty() {
        out.push_str(&format!("  {}\n", NO_KEYWORDS.dimmed()));
    } else {
        let tags: Vec<String> = result
            .keywords
            .iter()
            .map(|keyword| format!("[{}]", keyword).bright_blue().to_string())
            .collect();
        out.push_str(&format!("  {}\n", tags.join(" ")));
    }

    out.push_str(&format!("\n{}\n", "Suggestions".bright_yellow().bold()));
    if result.suggestions.is_empty() {
        out.push_str(&format!("  {}\n", NO_SUGGESTIONS.dimmed()));
    } else {
        for (i, suggestion) in result.suggestions.iter().enumerate() {
            let options = textwrap::Options::new(WRAP_WIDTH)
                .initial_indent("")
                .subsequent_indent("     ");
            out.push_str(&format!("  {}. {}\n", i + 1, textwrap::fill(suggestion, options)));
        }
    }

    out
}
