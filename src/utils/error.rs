use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemovalError {
    #[error("Failed to read image '{path}': {message}")]
    EncodingError { path: String, message: String },

    #[error("Invalid base64 content: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Request was blocked: {reason}. Please try a different image.")]
    RequestBlocked { reason: String },

    #[error("No image data found in the API response.")]
    EmptyResponse,

    #[error("Failed to remove background: {detail}")]
    RemovalFailed { detail: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Gemini API returned status {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, RemovalError>;

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Remote,
    Io,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// 缺少 API 金鑰時的固定訊息
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "API key is not set. Export GEMINI_API_KEY (or API_KEY) before running.";

impl RemovalError {
    pub fn encoding(path: impl Into<String>, message: impl ToString) -> Self {
        Self::EncodingError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn missing_credential() -> Self {
        Self::ConfigurationError {
            message: MISSING_CREDENTIAL_MESSAGE.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EncodingError { .. } | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::ConfigurationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::RequestBlocked { .. }
            | Self::EmptyResponse
            | Self::RemovalFailed { .. }
            | Self::HttpError(_)
            | Self::ServiceError { .. } => ErrorCategory::Remote,
            Self::IoError(_) => ErrorCategory::Io,
            Self::DecodeError(_) | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 使用者換一張圖片或稍後重試即可解決
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestBlocked { .. }
                | Self::EmptyResponse
                | Self::RemovalFailed { .. }
                | Self::HttpError(_)
                | Self::ServiceError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EncodingError { path, .. } => format!("Could not read the image file '{}'", path),
            Self::ConfigurationError { message } => message.clone(),
            Self::RequestBlocked { .. } | Self::EmptyResponse | Self::RemovalFailed { .. } => {
                self.to_string()
            }
            Self::HttpError(_) | Self::ServiceError { .. } => {
                format!("Failed to remove background: {}", self)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::EncodingError { .. } => "Check that the file exists and is readable",
            Self::ConfigurationError { .. } => {
                "Set the GEMINI_API_KEY environment variable or service.api_key in the config file"
            }
            Self::RequestBlocked { .. } => "Try a different image",
            Self::EmptyResponse => "Try again, or pick another quality tier",
            Self::RemovalFailed { .. } | Self::HttpError(_) | Self::ServiceError { .. } => {
                "Check your network connection and API key, then try again"
            }
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => "Fix the configuration value and re-run",
            Self::ValidationError { .. } => "Pass --mime-type or use a supported image format",
            Self::IoError(_) => "Check file permissions and free disk space",
            Self::DecodeError(_) | Self::SerializationError(_) => {
                "The service returned unexpected data; please report this"
            }
        }
    }
}
