use std::borrow::Cow;

use anyhow::Result;
use colored::*;
use reedline::{
    default_emacs_keybindings, Emacs, KeyCode, KeyModifiers, Prompt, PromptEditMode,
    PromptHistorySearch, PromptHistorySearchStatus, Reedline, ReedlineEvent, Signal,
};

use crate::analysis::RequestStatus;

/// Prompt that shows the request status in front of the cursor.
pub struct AnalyzerPrompt {
    status: String,
}

impl AnalyzerPrompt {
    pub fn new(status: &RequestStatus) -> Self {
        let label = status.label();
        let status = match status {
            RequestStatus::Idle => label.dimmed(),
            RequestStatus::Pending => label.yellow(),
            RequestStatus::Succeeded(_) => label.green(),
            RequestStatus::Failed(_) => label.red(),
        };
        Self { status: format!("[{}] ", status) }
    }
}

impl Prompt for AnalyzerPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed(&self.status)
    }

    fn render_prompt_right(&self) -> Cow<str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        "› ".bright_green().bold().to_string().into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        "... ".dimmed().to_string().into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

/// Reads one line. `None` means the user asked to leave (Ctrl+C / Ctrl+D).
pub fn read_line(prompt: AnalyzerPrompt) -> Result<Option<String>> {
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('l'),
        ReedlineEvent::ClearScreen,
    );

    let mut line_editor = Reedline::create().with_edit_mode(Box::new(Emacs::new(keybindings)));

    match line_editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => Ok(Some(buffer)),
        Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => Ok(None),
        Err(e) => Err(anyhow::anyhow!("Error reading input: {}", e)),
    }
}
