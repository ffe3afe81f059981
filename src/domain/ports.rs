use crate::domain::inference::{GenerateContentRequest, GenerateContentResponse};
use crate::domain::model::QualityTier;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn output_path(&self) -> &str;
    fn quality(&self) -> QualityTier;
    fn timeout_seconds(&self) -> u64;
}

/// 服務金鑰來源，每次呼叫時讀取一次
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

impl CredentialProvider for Box<dyn CredentialProvider> {
    fn api_key(&self) -> Option<String> {
        (**self).api_key()
    }
}

/// The remote image model, seen as an opaque request/response capability.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}
