use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::ClientBuilder;
use tracing::debug;

use crate::analysis::{AnalysisRequest, AnalysisResult, RawFailure};
use crate::config::AnalysisConfig;

/// The network boundary: something that can turn a request into a result.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Human-readable target, for status output.
    fn describe(&self) -> String;

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, RawFailure>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(
        url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url: url.into() })
    }

    /// `None` when no endpoint is configured.
    pub fn from_config(config: &AnalysisConfig) -> anyhow::Result<Option<Self>> {
        let Some(url) = config.analyze_url() else {
            return Ok(None);
        };
        let transport = Self::new(
            url,
            Duration::from_secs(config.connect_timeout_seconds),
            Duration::from_secs(config.request_timeout_seconds),
        )?;
        Ok(Some(transport))
    }

    fn build_form(request: AnalysisRequest) -> Result<Form, RawFailure> {
        let AnalysisRequest { file, target_position } = request;
        let mime = file.kind().mime_type();
        let part = Part::bytes(file.raw_content)
            .file_name(file.name)
            .mime_str(mime)
            .map_err(RawFailure::from)?;

        let mut form = Form::new().part("file", part);
        if let Some(position) = target_position {
            form = form.text("target_position", position);
        }
        Ok(form)
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, RawFailure> {
        let form = Self::build_form(request)?;

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        debug!(%status, url = %self.url, "analysis response received");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RawFailure::response(status.as_u16(), text));
        }

        response.json::<AnalysisResult>().await.map_err(|e| {
            if e.is_timeout() {
                RawFailure::from(e)
            } else {
                RawFailure::message(format!("invalid analysis response: {e}"))
            }
        })
    }
}
