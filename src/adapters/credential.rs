use crate::domain::ports::CredentialProvider;

/// 預設讀取的環境變數，依序嘗試
pub const DEFAULT_API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Reads the API key from the process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    vars: Vec<String>,
}

impl EnvCredential {
    pub fn new(vars: &[&str]) -> Self {
        Self {
            vars: vars.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_VARS)
    }
}

impl CredentialProvider for EnvCredential {
    fn api_key(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }
}

/// Fixed key, e.g. from a config file.
#[derive(Clone, Default)]
pub struct StaticCredential {
    key: Option<String>,
}

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn none() -> Self {
        Self { key: None }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = if self.key.is_some() { "<redacted>" } else { "<unset>" };
        f.debug_struct("StaticCredential").field("key", &shown).finish()
    }
}

impl CredentialProvider for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.key.clone()
    }
}
