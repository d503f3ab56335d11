use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub const PREVIEW_CHARS: usize = 500;
pub const PREVIEW_MARKER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
    Other,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            Some("txt") => DocumentKind::Txt,
            _ => DocumentKind::Other,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Txt => "text/plain",
            DocumentKind::Other => "application/octet-stream",
        }
    }
}

/// A document the user picked, staged for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub raw_content: Vec<u8>,
    pub preview_text: Option<String>,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, raw_content: Vec<u8>) -> Self {
        let preview_text = preview(&raw_content);
        Self {
            name: name.into(),
            size_bytes: raw_content.len() as u64,
            raw_content,
            preview_text,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_name(&self.name)
    }
}

/// First [`PREVIEW_CHARS`] characters of the content when it is UTF-8 text.
pub fn preview(raw: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(raw).ok()?;
    if text.contains('\0') {
        return None;
    }

    let mut chars = text.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => Some(format!("{}{}", &text[..cut], PREVIEW_MARKER)),
        None => Some(text.to_string()),
    }
}

/// Holds the single currently selected file.
#[derive(Debug, Default)]
pub struct FileIntake {
    current: Option<SelectedFile>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current selection wholesale.
    pub fn select_file(&mut self, file: SelectedFile) -> &SelectedFile {
        if file.kind() == DocumentKind::Other {
            warn!(
                name = %file.name,
                "file type is not pdf, docx or txt; the service may reject it"
            );
        }
        info!(
            name = %file.name,
            size = file.size_bytes,
            preview = file.preview_text.is_some(),
            "file staged"
        );
        self.current.insert(file)
    }

    /// Reads `path` from disk and stages it. The previous selection survives a read failure.
    pub async fn load(&mut self, path: &Path) -> Result<&SelectedFile> {
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(self.select_file(SelectedFile::from_bytes(name, raw)))
    }

    pub fn current(&self) -> Option<&SelectedFile> {
        self.current.as_ref()
    }
}
