use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::analysis::{AnalysisController, AttemptId, ErrorKind, RequestStatus};
use crate::config::AnalyzerConfig;
use crate::intake::{FileIntake, SelectedFile};
use crate::report::{self, ReportError};
use crate::transport::{AnalysisTransport, HttpTransport};

/// The commands a front end can issue, over one intake and one controller.
pub struct AnalysisSession {
    pub intake: FileIntake,
    pub controller: AnalysisController,
    output_dir: PathBuf,
}

impl AnalysisSession {
    pub fn new(transport: Option<Arc<dyn AnalysisTransport>>, output_dir: PathBuf) -> Self {
        Self {
            intake: FileIntake::new(),
            controller: AnalysisController::new(transport),
            output_dir,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.analysis)?
            .map(|transport| Arc::new(transport) as Arc<dyn AnalysisTransport>);
        Ok(Self::new(transport, config.report.output_dir.clone()))
    }

    /// Stages `file` and drops any result that belonged to the previous one.
    pub fn select_file(&mut self, file: SelectedFile) -> &SelectedFile {
        self.controller.invalidate();
        self.intake.select_file(file)
    }

    pub async fn select_path(&mut self, path: &Path) -> Result<&SelectedFile> {
        let file = self.intake.load(path).await?;
        self.controller.invalidate();
        Ok(file)
    }

    pub fn submit(&mut self, target_position: Option<&str>) -> Result<AttemptId, ErrorKind> {
        self.controller.submit(self.intake.current(), target_position)
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    pub async fn download_report(&self, dir: Option<&Path>) -> Result<PathBuf, ReportError> {
        let dir = dir.unwrap_or(&self.output_dir);
        report::export(self.controller.result(), dir).await
    }

    pub fn status(&self) -> &RequestStatus {
        self.controller.status()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisRequest, AnalysisResult, RawFailure};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedTransport(AnalysisResult);

    #[async_trait]
    impl AnalysisTransport for FixedTransport {
        fn describe(&self) -> String {
            "fixed".to_string()
        }

        async fn analyze(&self, _request: AnalysisRequest) -> Result<AnalysisResult, RawFailure> {
            Ok(self.0.clone())
        }
    }

    fn session(output_dir: &Path) -> AnalysisSession {
        let result = AnalysisResult {
            summary: "S".to_string(),
            keywords: vec!["Go".to_string(), "SQL".to_string()],
            suggestions: vec!["Add metrics".to_string()],
        };
        AnalysisSession::new(Some(Arc::new(FixedTransport(result))), output_dir.to_path_buf())
    }

    #[tokio::test]
    async fn test_submit_before_selection_is_input_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(temp_dir.path());
        assert_eq!(session.submit(None), Err(ErrorKind::InputMissing));
        assert_eq!(session.status(), &RequestStatus::Failed(ErrorKind::InputMissing));
    }

    #[tokio::test]
    async fn test_select_submit_download() {
        let temp_dir = TempDir::new().unwrap();
        let cv = temp_dir.path().join("cv.pdf");
        std::fs::write(&cv, b"%PDF-1.7").unwrap();

        let mut session = session(temp_dir.path());
        session.select_path(&cv).await.unwrap();
        session.submit(Some("Backend Engineer")).unwrap();
        session.controller.wait_settled().await;

        let path = session.download_report(None).await.unwrap();
        let document = std::fs::read_to_string(path).unwrap();
        assert!(document.contains("Go, SQL"));
        assert!(document.contains("1. Add metrics"));
    }

    #[tokio::test]
    async fn test_new_selection_clears_result() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(temp_dir.path());
        session.select_file(SelectedFile::from_bytes("cv.txt", b"first".to_vec()));
        session.submit(None).unwrap();
        session.controller.wait_settled().await;
        assert!(session.controller.result().is_some());

        session.select_file(SelectedFile::from_bytes("cv2.txt", b"second".to_vec()));
        assert_eq!(session.status(), &RequestStatus::Idle);
        assert!(matches!(
            session.download_report(None).await,
            Err(ReportError::NoResult)
        ));
    }
}
