// Adapters layer: concrete implementations of the domain ports.

pub mod credential;
pub mod gemini;
pub mod storage;

pub use credential::{EnvCredential, StaticCredential};
pub use gemini::GeminiHttpTransport;
pub use storage::LocalStorage;
