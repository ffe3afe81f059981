use crate::utils::error::{RemovalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 原始圖片位元組與其 MIME 類型（不驗證兩者是否一致）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageContent {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Base64 text of an image, without any `data:` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedContent(String);

impl EncodedContent {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Accepts either bare base64 or a full data URL and keeps only the payload.
    pub fn from_data_url(text: &str) -> Self {
        Self(crate::core::encoder::strip_envelope(text).to_string())
    }

    pub fn to_data_url(&self, mime_type: &str) -> String {
        format!("data:{};base64,{}", mime_type, self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EncodedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Medium,
    #[default]
    High,
    Ultra,
    Original,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Medium,
        QualityTier::High,
        QualityTier::Ultra,
        QualityTier::Original,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
            QualityTier::Ultra => "ultra",
            QualityTier::Original => "original",
        }
    }

    pub fn instruction(&self) -> &'static str {
        crate::core::prompt::instruction_for(*self)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = RemovalError;

    fn from_str(s: &str) -> Result<Self> {
        QualityTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RemovalError::InvalidConfigValueError {
                field: "quality".to_string(),
                value: s.to_string(),
                reason: "Expected one of: medium, high, ultra, original".to_string(),
            })
    }
}

/// 單次請求的內容，每次呼叫重新建立
#[derive(Debug, Clone)]
pub struct RemovalRequest {
    pub image: EncodedContent,
    pub mime_type: String,
    pub instruction: &'static str,
}

impl RemovalRequest {
    pub fn new(image: &EncodedContent, mime_type: &str, quality: QualityTier) -> Self {
        Self {
            image: image.clone(),
            mime_type: mime_type.to_string(),
            instruction: quality.instruction(),
        }
    }
}

pub type RemovalResult = Result<EncodedContent>;

/// Terminal state of one removal call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStatus {
    Succeeded,
    Blocked,
    Failed,
}

impl RemovalStatus {
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => RemovalStatus::Succeeded,
            Err(RemovalError::RequestBlocked { .. }) => RemovalStatus::Blocked,
            Err(_) => RemovalStatus::Failed,
        }
    }
}
