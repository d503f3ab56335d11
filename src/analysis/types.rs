use std::fmt;

use serde::{Deserialize, Serialize};

use crate::intake::SelectedFile;

use super::classifier::ErrorKind;

/// Identity of one submission. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AttemptId(pub u64);

impl AttemptId {
    pub fn next(self) -> Self {
        AttemptId(self.0.wrapping_add(1))
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a single network attempt. Lives only as long as that attempt.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub file: SelectedFile,
    pub target_position: Option<String>,
}

impl AnalysisRequest {
    pub fn new(file: SelectedFile, target_position: Option<&str>) -> Self {
        let target_position = target_position
            .map(str::trim)
            .filter(|position| !position.is_empty())
            .map(str::to_string);
        Self { file, target_position }
    }
}

/// The analysis service's answer for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded(AnalysisResult),
    Failed(ErrorKind),
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            RequestStatus::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorKind> {
        match self {
            RequestStatus::Failed(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Pending => "pending",
            RequestStatus::Succeeded(_) => "succeeded",
            RequestStatus::Failed(_) => "failed",
        }
    }
}
