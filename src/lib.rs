pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::adapters::{EnvCredential, GeminiHttpTransport, LocalStorage, StaticCredential};
pub use crate::core::{
    engine::{RemovalEngine, RemovalOutput},
    remover::BackgroundRemover,
    report::BatchReport,
};
pub use crate::domain::model::{EncodedContent, QualityTier, RemovalStatus};
pub use crate::utils::error::{RemovalError, Result};
