use crate::core::encoder::mime_type_for_path;
use crate::utils::error::{RemovalError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Gemini 可接受的輸入圖片副檔名
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "heic", "heif"];

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RemovalError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<String> = allowed_extensions
        .iter()
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(&extension.to_ascii_lowercase()) => {}
            Some(extension) => {
                return Err(RemovalError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(RemovalError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension; pass --mime-type explicitly".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// 輸入檔案必須能推斷出 MIME 類型，除非明確指定
pub fn validate_inputs(field_name: &str, inputs: &[String], mime_override: Option<&str>) -> Result<()> {
    if inputs.is_empty() {
        return Err(RemovalError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for input in inputs {
        validate_path(field_name, input)?;
    }

    match mime_override {
        Some(mime) => validate_mime_type("mime_type", mime),
        None => validate_file_extensions(field_name, inputs, SUPPORTED_EXTENSIONS),
    }
}

pub fn validate_mime_type(field_name: &str, mime: &str) -> Result<()> {
    let valid = mime
        .strip_prefix("image/")
        .map(|subtype| !subtype.is_empty() && !subtype.contains(char::is_whitespace))
        .unwrap_or(false);

    if !valid {
        return Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: mime.to_string(),
            reason: "MIME type must look like image/<subtype>".to_string(),
        });
    }
    Ok(())
}

/// 解析輸入的 MIME 類型：優先使用覆寫值，否則依副檔名推斷
pub fn resolve_mime_type(path: &str, mime_override: Option<&str>) -> Result<String> {
    if let Some(mime) = mime_override {
        return Ok(mime.to_string());
    }

    mime_type_for_path(path)
        .map(str::to_string)
        .ok_or_else(|| RemovalError::ValidationError {
            message: format!("Cannot determine the image type of '{}'", path),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RemovalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_endpoint", "https://example.com").is_ok());
        assert!(validate_url("api_endpoint", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("api_endpoint", "").is_err());
        assert!(validate_url("api_endpoint", "invalid-url").is_err());
        assert!(validate_url("api_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_extensions_case_insensitive() {
        let files = vec!["cat.JPG".to_string(), "dog.webp".to_string()];
        assert!(validate_file_extensions("inputs", &files, SUPPORTED_EXTENSIONS).is_ok());

        let invalid_files = vec!["notes.txt".to_string()];
        assert!(validate_file_extensions("inputs", &invalid_files, SUPPORTED_EXTENSIONS).is_err());
    }

    #[test]
    fn test_validate_inputs_with_override() {
        let inputs = vec!["scan".to_string()];
        assert!(validate_inputs("inputs", &inputs, None).is_err());
        assert!(validate_inputs("inputs", &inputs, Some("image/png")).is_ok());
        assert!(validate_inputs("inputs", &inputs, Some("text/plain")).is_err());
        assert!(validate_inputs("inputs", &[], None).is_err());
    }

    #[test]
    fn test_resolve_mime_type() {
        assert_eq!(resolve_mime_type("a/b/photo.jpeg", None).unwrap(), "image/jpeg");
        assert_eq!(
            resolve_mime_type("photo.bin", Some("image/webp")).unwrap(),
            "image/webp"
        );
        assert!(matches!(
            resolve_mime_type("photo.bin", None),
            Err(RemovalError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("timeout_seconds", 0u64, 1, 600).is_err());
    }
}
