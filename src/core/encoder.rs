use crate::domain::model::{EncodedContent, ImageContent};
use crate::domain::ports::Storage;
use crate::utils::error::{RemovalError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub fn encode(bytes: &[u8]) -> EncodedContent {
    EncodedContent::new(STANDARD.encode(bytes))
}

pub fn decode(encoded: &EncodedContent) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded.as_str().trim())?)
}

/// 去掉 `data:<mime>;base64,` 前綴，只保留內容
pub fn strip_envelope(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.split_once(',') {
        Some((_, payload)) => payload,
        None => text,
    }
}

/// Reads an image through `storage`, tagging it with `mime_type`.
///
/// Any read failure is reported as `EncodingError` with the storage
/// message kept verbatim.
pub async fn read_image<S: Storage>(
    storage: &S,
    path: &str,
    mime_type: &str,
) -> Result<ImageContent> {
    let bytes = storage
        .read_file(path)
        .await
        .map_err(|e| match e {
            RemovalError::IoError(io) => RemovalError::encoding(path, io),
            other => RemovalError::encoding(path, other),
        })?;

    tracing::debug!("📥 Read {} bytes from {}", bytes.len(), path);
    Ok(ImageContent::new(bytes, mime_type))
}

pub fn mime_type_for_path(path: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();

    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}
