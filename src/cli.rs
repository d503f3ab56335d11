use anyhow::{Context, Result};
use colored::*;

use crate::analysis::{AttemptId, RequestStatus};
use crate::commands::{split_command, CommandRegistry, CommandResult};
use crate::config::{AnalyzerConfig, ENDPOINT_ENV_VAR};
use crate::display;
use crate::input::{self, AnalyzerPrompt};
use crate::session::AnalysisSession;

const HEADER_WIDTH: usize = 60;

/// Runs the interactive command loop until the user quits.
pub async fn run_cli(mut session: AnalysisSession, config: AnalyzerConfig) -> Result<()> {
    println!("{}", "═".repeat(HEADER_WIDTH).bright_blue());
    println!("{}", "Resume Analyzer".bright_white().bold());
    println!("{}", "═".repeat(HEADER_WIDTH).bright_blue());

    let command_registry = CommandRegistry::new();
    show_endpoint_status(&session);

    println!("{}", "─".repeat(HEADER_WIDTH).dimmed());
    println!("{} Type '/help' for available commands", "💡".yellow());
    println!("{} Start with /select <path> then /submit [target position]", "📄".bright_blue());
    println!();

    let mut last_seen = (session.controller.attempt(), session.status().label());

    loop {
        if session.controller.poll_settlements() > 0 {
            announce_settlement(&session, &mut last_seen);
        }

        let prompt = AnalyzerPrompt::new(session.status());
        let line = tokio::task::spawn_blocking(move || input::read_line(prompt))
            .await
            .context("input task failed")??;

        let Some(line) = line else {
            break;
        };
        let trimmed_input = line.trim();
        if trimmed_input.is_empty() {
            continue;
        }

        if !trimmed_input.starts_with('/') {
            println!("Commands start with '/'. Type '/help' for the list.");
            continue;
        }

        let (command, arg) = split_command(trimmed_input);
        match command {
            "/help" => print!("{}", command_registry.get_help()),
            "/quit" | "/exit" => break,
            _ => match command_registry.execute(command, arg, &mut session, &config).await {
                Ok(Some(result)) => display_command_result(result),
                Ok(None) => {
                    println!("Unknown command: {}. Type '/help' for available commands.", command)
                }
                Err(e) => eprintln!("Command error: {:#}", e),
            },
        }

        // `/wait` and failed submits settle inside the command; do not announce them twice
        last_seen = (session.controller.attempt(), session.status().label());
        println!();
    }

    session.cancel();
    println!("{}", "─".repeat(HEADER_WIDTH).dimmed());
    println!("{}", "Goodbye!".bright_white());
    Ok(())
}

fn show_endpoint_status(session: &AnalysisSession) {
    match session.controller.endpoint() {
        Some(url) => println!("{} {}", "Endpoint:".dimmed(), url.cyan()),
        None => {
            println!("{} {}", "Endpoint:".dimmed(), "not configured".yellow());
            println!("{} export {}=http://localhost:8000", "Set with:".dimmed(), ENDPOINT_ENV_VAR);
        }
    }
}

fn announce_settlement(session: &AnalysisSession, last_seen: &mut (AttemptId, &'static str)) {
    let current = (session.controller.attempt(), session.status().label());
    if current == *last_seen {
        return;
    }
    *last_seen = current;

    if let Some(kind) = session.controller.error() {
        tracing::debug!(attempt = %current.0, error = ?kind, "analysis failed in background");
    }
    if !matches!(session.status(), RequestStatus::Idle | RequestStatus::Pending) {
        println!("{}", display::format_status(session.status()));
        println!();
    }
}

fn display_command_result(result: CommandResult) {
    match result {
        CommandResult { success: true, output, .. } => {
            if !output.trim().is_empty() {
                println!("{}", output);
            }
        }
        CommandResult { success: false, error: Some(error), .. } => {
            println!("{} {}", "Error:".red(), error);
        }
        _ => {}
    }
}
