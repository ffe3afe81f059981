use crate::adapters::credential::{EnvCredential, StaticCredential};
use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECONDS};
use crate::core::remover::DEFAULT_MODEL;
use crate::domain::model::QualityTier;
use crate::domain::ports::{ConfigProvider, CredentialProvider};
use crate::utils::error::{RemovalError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub removal: RemovalConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalConfig {
    #[serde(default)]
    pub quality: QualityTier,
    pub inputs: Vec<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub report: Option<String>,
    pub print_data_url: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RemovalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RemovalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RemovalError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("service.endpoint", &self.service.endpoint)?;
        validation::validate_non_empty_string("service.model", &self.service.model)?;
        if let Some(timeout) = self.service.timeout_seconds {
            validation::validate_range("service.timeout_seconds", timeout, 1, 600)?;
        }

        validation::validate_inputs(
            "removal.inputs",
            &self.removal.inputs,
            self.removal.mime_type.as_deref(),
        )?;

        validation::validate_path("output.output_path", &self.output.output_path)?;
        if let Some(report) = &self.output.report {
            validation::validate_path("output.report", report)?;
        }

        Ok(())
    }

    /// 設定檔中的金鑰；未替換的 ${VAR} 視為未設定
    pub fn configured_api_key(&self) -> Option<&str> {
        self.service
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }

    /// Credential source: the configured key when present, otherwise the environment.
    pub fn credential_provider(&self) -> Box<dyn CredentialProvider> {
        match self.configured_api_key() {
            Some(key) => Box::new(StaticCredential::new(key)),
            None => Box::new(EnvCredential::default()),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn print_data_url(&self) -> bool {
        self.output.print_data_url.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.service.endpoint
    }

    fn model(&self) -> &str {
        &self.service.model
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn quality(&self) -> QualityTier {
        self.removal.quality
    }

    fn timeout_seconds(&self) -> u64 {
        self.service.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[service]
model = "gemini-2.5-flash-image"
timeout_seconds = 60

[removal]
quality = "ultra"
inputs = ["portrait.jpg", "product.png"]

[output]
output_path = "./cutouts"
report = "./cutouts/report.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.service.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.quality(), QualityTier::Ultra);
        assert_eq!(config.removal.inputs.len(), 2);
        assert_eq!(config.timeout_seconds(), 60);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quality_defaults_to_high() {
        let toml_content = r#"
[removal]
inputs = ["a.webp"]

[output]
output_path = "./out"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.quality(), QualityTier::High);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_unknown_quality_is_rejected() {
        let toml_content = r#"
[removal]
quality = "extreme"
inputs = ["a.webp"]

[output]
output_path = "./out"
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(RemovalError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BGR_TOML_TEST_KEY", "key-from-env");

        let toml_content = r#"
[service]
api_key = "${BGR_TOML_TEST_KEY}"

[removal]
inputs = ["a.png"]

[output]
output_path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.configured_api_key(), Some("key-from-env"));
        assert_eq!(
            config.credential_provider().api_key().as_deref(),
            Some("key-from-env")
        );

        std::env::remove_var("BGR_TOML_TEST_KEY");
    }

    #[test]
    fn test_unresolved_api_key_is_ignored() {
        std::env::remove_var("BGR_TOML_UNSET_KEY");

        let toml_content = r#"
[service]
api_key = "${BGR_TOML_UNSET_KEY}"

[removal]
inputs = ["a.png"]

[output]
output_path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.service.api_key.as_deref(), Some("${BGR_TOML_UNSET_KEY}"));
        assert_eq!(config.configured_api_key(), None);
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[service]
endpoint = "invalid-url"

[removal]
inputs = ["a.png"]

[output]
output_path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[removal]
quality = "original"
inputs = ["scan"]
mime_type = "image/tiff"

[output]
output_path = "./out"
print_data_url = true

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.quality(), QualityTier::Original);
        assert!(config.print_data_url());
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }
}
