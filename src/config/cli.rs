use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECONDS};
use crate::core::remover::DEFAULT_MODEL;
use crate::domain::model::QualityTier;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_inputs, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "gemini-bg-remover")]
#[command(about = "Remove image backgrounds with the Gemini image model")]
pub struct CliConfig {
    /// Image files to process
    #[arg(required = true)]
    pub inputs: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = QualityTier::High)]
    pub quality: QualityTier,

    #[arg(short, long, default_value = "./output")]
    pub output_path: String,

    /// Media type of the inputs, when it cannot be guessed from the extension
    #[arg(long)]
    pub mime_type: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub report: Option<String>,

    /// Print each result as a data URL on stdout
    #[arg(long)]
    pub print_data_url: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log memory and timing per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn quality(&self) -> QualityTier {
        self.quality
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_inputs("inputs", &self.inputs, self.mime_type.as_deref())?;
        validate_path("output_path", &self.output_path)?;
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_non_empty_string("model", &self.model)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        if let Some(report) = &self.report {
            validate_path("report", report)?;
        }
        Ok(())
    }
}
