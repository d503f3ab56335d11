use std::future::Future;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use colored::*;
use termimad::MadSkin;

use crate::config::AnalyzerConfig;
use crate::display;
use crate::report;
use crate::session::AnalysisSession;
use crate::thinking;

/// Represents the result of executing a command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl CommandResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
        }
    }
}

/// Trait for handling different types of commands
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;
    fn usage(&self) -> &str;
    fn description(&self) -> &str;
    async fn execute(
        &self,
        arg: &str,
        session: &mut AnalysisSession,
        config: &AnalyzerConfig,
    ) -> Result<CommandResult>;
}

/// Registry for managing all available commands
pub struct CommandRegistry {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: Vec::new(),
        };

        registry.register(Box::new(SelectCommand));
        registry.register(Box::new(PreviewCommand));
        registry.register(Box::new(SubmitCommand));
        registry.register(Box::new(WaitCommand));
        registry.register(Box::new(CancelCommand));
        registry.register(Box::new(StatusCommand));
        registry.register(Box::new(ReportCommand));
        registry.register(Box::new(DownloadCommand));
        registry.register(Box::new(ConfigCommand));

        registry
    }

    pub fn register(&mut self, handler: Box<dyn CommandHandler>) {
        self.handlers.push(handler);
    }

    pub async fn execute(
        &self,
        command: &str,
        arg: &str,
        session: &mut AnalysisSession,
        config: &AnalyzerConfig,
    ) -> Result<Option<CommandResult>> {
        for handler in &self.handlers {
            if handler.name() == command {
                return Ok(Some(handler.execute(arg, session, config).await?));
            }
        }
        Ok(None)
    }

    pub fn get_help(&self) -> String {
        let mut help = format!("{}\n", "Available commands:".bright_white().bold());
        for handler in &self.handlers {
            help.push_str(&format!(
                "  {:<28} {}\n",
                handler.usage().bright_cyan(),
                handler.description()
            ));
        }
        help.push_str(&format!("  {:<28} {}\n", "/help".bright_cyan(), "Show this help"));
        help.push_str(&format!("  {:<28} {}\n", "/quit".bright_cyan(), "Exit"));
        help
    }
}

/// Splits `/cmd rest of line` into the command and its (trimmed) argument.
pub fn split_command(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (input, ""),
    }
}

struct SelectCommand;

#[async_trait]
impl CommandHandler for SelectCommand {
    fn name(&self) -> &str {
        "/select"
    }
    fn usage(&self) -> &str {
        "/select <path>"
    }
    fn description(&self) -> &str {
        "Stage a resume (PDF, DOCX or TXT) for analysis"
    }
    async fn execute(
        &self,
        arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        if arg.is_empty() {
            return Ok(CommandResult::error(format!("Usage: {}", self.usage())));
        }

        match session.select_path(Path::new(arg)).await {
            Ok(file) => {
                let mut output = format!("{} {}", "Selected".green(), display::format_file(file));
                if file.preview_text.is_some() {
                    output.push_str(&format!("\n{}", "Use /preview to check its text.".dimmed()));
                }
                Ok(CommandResult::success(output))
            }
            Err(e) => Ok(CommandResult::error(format!("{:#}", e))),
        }
    }
}

struct PreviewCommand;

#[async_trait]
impl CommandHandler for PreviewCommand {
    fn name(&self) -> &str {
        "/preview"
    }
    fn usage(&self) -> &str {
        "/preview"
    }
    fn description(&self) -> &str {
        "Show the beginning of the selected file"
    }
    async fn execute(
        &self,
        _arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        let Some(file) = session.intake.current() else {
            return Ok(CommandResult::error("No file selected.".to_string()));
        };

        let output = match &file.preview_text {
            Some(preview) => format!("{}\n{}", display::format_file(file), preview),
            None => format!(
                "{}\n{}",
                display::format_file(file),
                "No text preview available for this file.".dimmed()
            ),
        };
        Ok(CommandResult::success(output))
    }
}

struct SubmitCommand;

#[async_trait]
impl CommandHandler for SubmitCommand {
    fn name(&self) -> &str {
        "/submit"
    }
    fn usage(&self) -> &str {
        "/submit [target position]"
    }
    fn description(&self) -> &str {
        "Send the selected file for analysis"
    }
    async fn execute(
        &self,
        arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        let target_position = (!arg.is_empty()).then_some(arg);

        match session.submit(target_position) {
            Ok(attempt) => {
                let name = session
                    .intake
                    .current()
                    .map(|file| file.name.as_str())
                    .unwrap_or_default();
                Ok(CommandResult::success(format!(
                    "{} {} {}\n{}",
                    "Submitted".green(),
                    name.bright_white(),
                    format!("(attempt {})", attempt).dimmed(),
                    "Use /wait to follow it, or keep working.".dimmed()
                )))
            }
            Err(kind) => Ok(CommandResult::error(display::format_error(&kind))),
        }
    }
}

struct WaitCommand;

#[async_trait]
impl CommandHandler for WaitCommand {
    fn name(&self) -> &str {
        "/wait"
    }
    fn usage(&self) -> &str {
        "/wait"
    }
    fn description(&self) -> &str {
        "Wait for the current analysis to finish"
    }
    async fn execute(
        &self,
        _arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        if session.status().is_pending() {
            let name = session.intake.current().map(|file| file.name.clone()).unwrap_or_default();
            let spinner = thinking::show_analyzing(&name);
            let settled = wait_or_interrupt(session, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;
            spinner.finish();

            if !settled {
                return Ok(CommandResult::success(format!(
                    "{}",
                    "Stopped waiting. The analysis is still pending; /wait again or /status later."
                        .dimmed()
                )));
            }
        }
        Ok(CommandResult::success(display::format_status(session.status())))
    }
}

/// Waits for the current attempt to settle unless `interrupt` resolves first.
/// Returns whether the attempt settled.
async fn wait_or_interrupt<F>(session: &mut AnalysisSession, interrupt: F) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = session.controller.wait_settled() => true,
        _ = interrupt => false,
    }
}

struct CancelCommand;

#[async_trait]
impl CommandHandler for CancelCommand {
    fn name(&self) -> &str {
        "/cancel"
    }
    fn usage(&self) -> &str {
        "/cancel"
    }
    fn description(&self) -> &str {
        "Stop the timeout clock for the current analysis"
    }
    async fn execute(
        &self,
        _arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        session.cancel();
        Ok(CommandResult::success(format!(
            "{}",
            "Timeout canceled. A response that still arrives will be shown; \
             /wait now lasts until the transport gives up (Ctrl+C to stop waiting)."
                .dimmed()
        )))
    }
}

struct StatusCommand;

#[async_trait]
impl CommandHandler for StatusCommand {
    fn name(&self) -> &str {
        "/status"
    }
    fn usage(&self) -> &str {
        "/status"
    }
    fn description(&self) -> &str {
        "Show the selected file and the analysis state"
    }
    async fn execute(
        &self,
        _arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        let file = match session.intake.current() {
            Some(file) => display::format_file(file),
            None => "none".dimmed().to_string(),
        };
        Ok(CommandResult::success(format!(
            "{} {}\n{} {}\n{}",
            "File:".dimmed(),
            file,
            "Attempt:".dimmed(),
            session.controller.attempt(),
            display::format_status(session.status())
        )))
    }
}

struct ReportCommand;

#[async_trait]
impl CommandHandler for ReportCommand {
    fn name(&self) -> &str {
        "/report"
    }
    fn usage(&self) -> &str {
        "/report"
    }
    fn description(&self) -> &str {
        "Show the exportable report"
    }
    async fn execute(
        &self,
        _arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        match session.controller.result() {
            Some(result) => {
                let skin = MadSkin::default();
                Ok(CommandResult::success(skin.term_text(&report::format(result)).to_string()))
            }
            None => Ok(CommandResult::error(report::ReportError::NoResult.to_string())),
        }
    }
}

struct DownloadCommand;

#[async_trait]
impl CommandHandler for DownloadCommand {
    fn name(&self) -> &str {
        "/download"
    }
    fn usage(&self) -> &str {
        "/download [dir]"
    }
    fn description(&self) -> &str {
        "Save the report as a file"
    }
    async fn execute(
        &self,
        arg: &str,
        session: &mut AnalysisSession,
        _config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        let dir = (!arg.is_empty()).then(|| Path::new(arg));
        match session.download_report(dir).await {
            Ok(path) => Ok(CommandResult::success(format!(
                "{} {}",
                "✓ Report saved to".green(),
                path.display()
            ))),
            Err(e) => Ok(CommandResult::error(e.to_string())),
        }
    }
}

struct ConfigCommand;

#[async_trait]
impl CommandHandler for ConfigCommand {
    fn name(&self) -> &str {
        "/config"
    }
    fn usage(&self) -> &str {
        "/config"
    }
    fn description(&self) -> &str {
        "Show the active configuration"
    }
    async fn execute(
        &self,
        _arg: &str,
        session: &mut AnalysisSession,
        config: &AnalyzerConfig,
    ) -> Result<CommandResult> {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Resume Analyzer Configuration".bright_white().bold()));
        output.push_str(&format!("{}\n", "─".repeat(30).bright_blue()));

        output.push_str(&format!("{}:\n", "Analysis".bright_yellow().bold()));
        match session.controller.endpoint() {
            Some(url) => output.push_str(&format!("  Endpoint: {}\n", url)),
            None => output.push_str(&format!("  Endpoint: {}\n", "not configured".red())),
        }
        output.push_str(&format!(
            "  Connect timeout: {} seconds\n",
            config.analysis.connect_timeout_seconds
        ));
        output.push_str(&format!(
            "  Transport timeout: {} seconds\n",
            config.analysis.request_timeout_seconds
        ));
        output.push_str(&format!(
            "  Analysis deadline: {} seconds\n",
            crate::analysis::ANALYSIS_TIMEOUT.as_secs()
        ));

        output.push_str(&format!("\n{}:\n", "Report".bright_yellow().bold()));
        output.push_str(&format!("  Output directory: {}\n", session.output_dir().display()));
        output.push_str(&format!("  File name: {}\n", report::file_name()));

        output.push_str(&format!("\n{}:\n", "General".bright_yellow().bold()));
        output.push_str(&format!("  Log level: {}\n", config.general.log_level));

        if let Ok(path) = AnalyzerConfig::default_path() {
            output.push_str(&format!("\nConfig file: {}\n", path.display()));
        }

        Ok(CommandResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ErrorKind, RequestStatus};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("/submit Senior Backend Engineer"),
            ("/submit", "Senior Backend Engineer")
        );
        assert_eq!(split_command("  /wait  "), ("/wait", ""));
        assert_eq!(split_command("/select   cv.pdf "), ("/select", "cv.pdf"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_none() {
        let registry = CommandRegistry::new();
        let mut session = AnalysisSession::new(None, PathBuf::from("."));
        let result = registry
            .execute("/nope", "", &mut session, &AnalyzerConfig::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_submit_without_endpoint_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let cv = temp_dir.path().join("cv.txt");
        std::fs::write(&cv, "Rust, Go").unwrap();

        let registry = CommandRegistry::new();
        let config = AnalyzerConfig::default();
        let mut session = AnalysisSession::new(None, temp_dir.path().to_path_buf());

        let selected = registry
            .execute("/select", cv.to_str().unwrap(), &mut session, &config)
            .await
            .unwrap()
            .unwrap();
        assert!(selected.success);

        let submitted = registry
            .execute("/submit", "", &mut session, &config)
            .await
            .unwrap()
            .unwrap();
        assert!(!submitted.success);
        assert_eq!(
            session.status(),
            &RequestStatus::Failed(ErrorKind::ConfigurationMissing)
        );
    }

    #[tokio::test]
    async fn test_download_without_result_fails() {
        let temp_dir = TempDir::new().unwrap();
        let registry = CommandRegistry::new();
        let mut session = AnalysisSession::new(None, temp_dir.path().to_path_buf());

        let result = registry
            .execute("/download", "", &mut session, &AnalyzerConfig::default())
            .await
            .unwrap()
            .unwrap();
        assert!(!result.success);
    }

    struct SilentTransport;

    #[async_trait]
    impl crate::transport::AnalysisTransport for SilentTransport {
        fn describe(&self) -> String {
            "silent".to_string()
        }

        async fn analyze(
            &self,
            _request: crate::analysis::AnalysisRequest,
        ) -> Result<crate::analysis::AnalysisResult, crate::analysis::RawFailure> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_after_cancel_can_be_interrupted() {
        let mut session = AnalysisSession::new(
            Some(std::sync::Arc::new(SilentTransport)),
            PathBuf::from("."),
        );
        session.select_file(crate::intake::SelectedFile::from_bytes("cv.txt", b"Go".to_vec()));
        session.submit(None).unwrap();
        session.cancel();

        let settled = wait_or_interrupt(&mut session, async {
            tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        })
        .await;

        assert!(!settled);
        assert!(session.status().is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_without_interrupt_reaches_timeout() {
        let mut session = AnalysisSession::new(
            Some(std::sync::Arc::new(SilentTransport)),
            PathBuf::from("."),
        );
        session.select_file(crate::intake::SelectedFile::from_bytes("cv.txt", b"Go".to_vec()));
        session.submit(None).unwrap();

        let settled = wait_or_interrupt(&mut session, std::future::pending()).await;

        assert!(settled);
        assert_eq!(session.status(), &RequestStatus::Failed(ErrorKind::Timeout));
    }

    #[test]
    fn test_help_lists_commands() {
        let help = CommandRegistry::new().get_help();
        for command in ["/select", "/submit", "/wait", "/cancel", "/download", "/quit"] {
            assert!(help.contains(command));
        }
    }
}
