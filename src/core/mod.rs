pub mod encoder;
pub mod engine;
pub mod prompt;
pub mod remover;
pub mod report;

pub use crate::domain::model::{EncodedContent, ImageContent, QualityTier, RemovalStatus};
pub use crate::domain::ports::{ConfigProvider, CredentialProvider, InferenceTransport, Storage};
pub use crate::utils::error::Result;
