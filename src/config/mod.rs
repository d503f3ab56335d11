use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const ENDPOINT_ENV_VAR: &str = "RESUME_ANALYZER_ENDPOINT";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Base address of the analysis service, e.g. `http://localhost:8000`
    pub endpoint: Option<String>,

    pub analyze_path: String,

    pub connect_timeout_seconds: u64,

    /// Transport-level timeout; the client-side deadline is separate and fixed
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory `/download` writes into when no directory is given
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "warn".to_string() }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            analyze_path: "/api/analyze".to_string(),
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from(".") }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            analysis: AnalysisConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Configured base address, ignoring blank values.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
    }

    /// Full URL of the analyze call, if an endpoint is configured.
    pub fn analyze_url(&self) -> Option<String> {
        let base = self.endpoint()?.trim_end_matches('/');
        let path = self.analyze_path.trim();
        if path.is_empty() {
            return Some(base.to_string());
        }
        Some(format!("{}/{}", base, path.trim_start_matches('/')))
    }
}

impl AnalyzerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.load_env_vars();

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".resume-analyzer").join("config.toml"))
    }

    fn load_env_vars(&mut self) {
        self.fill_endpoint(std::env::var(ENDPOINT_ENV_VAR).ok());
    }

    /// Fill the endpoint when the file leaves it unset or blank
    fn fill_endpoint(&mut self, endpoint: Option<String>) {
        if self.analysis.endpoint().is_none() {
            if let Some(endpoint) = endpoint {
                self.analysis.endpoint = Some(endpoint);
            }
        }
    }

    /// Merge with command-line overrides
    pub fn merge_overrides(&mut self, overrides: Vec<(String, String)>) -> Result<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "log_level" => self.general.log_level = value,
                "endpoint" => self.analysis.endpoint = Some(value),
                "output_dir" => self.report.output_dir = PathBuf::from(value),
                _ => bail!("Unknown config key: {}", key),
            }
        }
        Ok(())
    }

    /// Log level as understood by the subscriber, falling back to `warn`.
    pub fn log_level(&self) -> tracing::Level {
        self.general.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

/// Load or create configuration
pub fn load_or_create_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    let config_path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        AnalyzerConfig::default_path()?
    };

    if config_path.exists() {
        AnalyzerConfig::load(&config_path)
    } else {
        let mut config = AnalyzerConfig::default();
        config.save(&config_path)?;
        config.load_env_vars();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.analysis.endpoint, None);
        assert_eq!(config.analysis.analyze_path, "/api/analyze");
        assert_eq!(config.analysis.analyze_url(), None);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AnalyzerConfig::default();
        config.analysis.endpoint = Some("http://localhost:8000".to_string());
        config.save(&config_path).unwrap();

        let loaded = AnalyzerConfig::load(&config_path).unwrap();
        assert_eq!(loaded.analysis, config.analysis);
        assert_eq!(loaded.report.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[analysis]\nendpoint = \"http://svc:9000/\"\n").unwrap();

        let loaded = AnalyzerConfig::load(&config_path).unwrap();
        assert_eq!(loaded.general.log_level, "warn");
        assert_eq!(loaded.analysis.connect_timeout_seconds, 10);
        assert_eq!(loaded.analysis.analyze_url().as_deref(), Some("http://svc:9000/api/analyze"));
    }

    #[test]
    fn test_blank_endpoint_is_absent() {
        let mut config = AnalyzerConfig::default();
        config.analysis.endpoint = Some("   ".to_string());
        assert_eq!(config.analysis.endpoint(), None);
        assert_eq!(config.analysis.analyze_url(), None);
    }

    #[test]
    fn test_merge_overrides() {
        let mut config = AnalyzerConfig::default();

        let overrides = vec![
            ("log_level".to_string(), "debug".to_string()),
            ("endpoint".to_string(), "https://analyzer.example".to_string()),
            ("output_dir".to_string(), "/tmp/reports".to_string()),
        ];

        config.merge_overrides(overrides).unwrap();
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
        assert_eq!(
            config.analysis.analyze_url().as_deref(),
            Some("https://analyzer.example/api/analyze")
        );
        assert_eq!(config.report.output_dir, PathBuf::from("/tmp/reports"));

        assert!(config.merge_overrides(vec![("theme".to_string(), "dark".to_string())]).is_err());
    }

    #[test]
    fn test_env_endpoint_fills_missing_or_blank() {
        let mut config = AnalyzerConfig::default();
        config.fill_endpoint(Some("http://env:1".to_string()));
        assert_eq!(config.analysis.analyze_url().as_deref(), Some("http://env:1/api/analyze"));

        let mut config = AnalyzerConfig::default();
        config.analysis.endpoint = Some("  ".to_string());
        config.fill_endpoint(Some("http://env:1".to_string()));
        assert_eq!(config.analysis.endpoint(), Some("http://env:1"));
    }

    #[test]
    fn test_file_endpoint_wins_over_env() {
        let mut config = AnalyzerConfig::default();
        config.analysis.endpoint = Some("http://file:2".to_string());
        config.fill_endpoint(Some("http://env:1".to_string()));
        assert_eq!(config.analysis.endpoint(), Some("http://file:2"));

        let mut config = AnalyzerConfig::default();
        config.fill_endpoint(None);
        assert_eq!(config.analysis.endpoint(), None);
    }

    // The only test that touches the process environment.
    #[test]
    fn test_load_reads_endpoint_from_environment() {
        let temp_dir = TempDir::new().unwrap();
        let unset_path = temp_dir.path().join("unset.toml");
        let blank_path = temp_dir.path().join("blank.toml");
        let set_path = temp_dir.path().join("set.toml");
        std::fs::write(&blank_path, "[analysis]\nendpoint = \"\"\n").unwrap();
        std::fs::write(&set_path, "[analysis]\nendpoint = \"http://file:2\"\n").unwrap();

        let previous = std::env::var(ENDPOINT_ENV_VAR).ok();
        std::env::set_var(ENDPOINT_ENV_VAR, "http://env:1");

        let created = load_or_create_config(Some(&unset_path));
        let blank = AnalyzerConfig::load(&blank_path);
        let set = AnalyzerConfig::load(&set_path);

        match previous {
            Some(value) => std::env::set_var(ENDPOINT_ENV_VAR, value),
            None => std::env::remove_var(ENDPOINT_ENV_VAR),
        }

        assert_eq!(created.unwrap().analysis.endpoint(), Some("http://env:1"));
        assert_eq!(blank.unwrap().analysis.endpoint(), Some("http://env:1"));
        assert_eq!(set.unwrap().analysis.endpoint(), Some("http://file:2"));

        // the created file keeps the default, unset endpoint
        let on_disk = std::fs::read_to_string(&unset_path).unwrap();
        assert!(!on_disk.contains("http://env:1"));
    }

    #[test]
    fn test_invalid_log_level_falls_back_to_warn() {
        let mut config = AnalyzerConfig::default();
        config.general.log_level = "chatty".to_string();
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }
}
