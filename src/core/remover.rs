use crate::domain::inference::{GenerateContentRequest, GenerateContentResponse, Part};
use crate::domain::model::{EncodedContent, QualityTier, RemovalRequest, RemovalResult};
use crate::domain::ports::{CredentialProvider, InferenceTransport};
use crate::utils::error::RemovalError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Sends one image plus a quality-specific instruction to the model and
/// returns the single image it produces.
///
/// Holds no per-call state; concurrent calls on the same remover are
/// independent.
pub struct BackgroundRemover<T: InferenceTransport, K: CredentialProvider> {
    transport: T,
    credentials: K,
    model: String,
}

impl<T: InferenceTransport, K: CredentialProvider> BackgroundRemover<T, K> {
    pub fn new(transport: T, credentials: K) -> Self {
        Self {
            transport,
            credentials,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn remove_background(
        &self,
        image: &EncodedContent,
        mime_type: &str,
        quality: QualityTier,
    ) -> RemovalResult {
        let request: GenerateContentRequest = RemovalRequest::new(image, mime_type, quality).into();

        // 金鑰缺失時不發出任何網路請求
        let api_key = self
            .credentials
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(RemovalError::missing_credential)?;

        tracing::info!(
            "🚀 Requesting background removal (model: {}, quality: {}, type: {}, {} base64 chars)",
            self.model,
            quality,
            mime_type,
            image.len()
        );

        let response = self
            .transport
            .generate_content(&self.model, &api_key, &request)
            .await
            .map_err(|e| {
                tracing::error!("❌ Error calling Gemini API: {}", e);
                RemovalError::RemovalFailed {
                    detail: e.to_string(),
                }
            })?;

        extract_image(&response)
    }
}

/// Picks the result image out of a response.
///
/// Checks run in a fixed order: first inline-data part across all
/// candidates, then the prompt block reason, then a generic empty error.
pub fn extract_image(response: &GenerateContentResponse) -> RemovalResult {
    if let Some(data) = response.parts().find_map(Part::inline_payload) {
        tracing::info!("✅ Received image ({} base64 chars)", data.len());
        return Ok(EncodedContent::new(data));
    }

    if let Some(reason) = response.block_reason() {
        tracing::warn!("⛔ Request was blocked: {}", reason);
        return Err(RemovalError::RequestBlocked {
            reason: reason.to_string(),
        });
    }

    for text in response.parts().filter_map(|part| part.text.as_deref()) {
        tracing::warn!("💬 Model replied with text instead of an image: {}", text);
    }
    for reason in response
        .candidates
        .iter()
        .filter_map(|candidate| candidate.finish_reason.as_deref())
    {
        tracing::warn!("🏁 Candidate finish reason: {}", reason);
    }

    Err(RemovalError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::credential::StaticCredential;
    use crate::domain::inference::{Candidate, Content, PromptFeedback};
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// 記錄呼叫次數與最後一次請求的假傳輸層
    #[derive(Clone)]
    struct MockTransport {
        response: Arc<Mutex<Option<Result<GenerateContentResponse>>>>,
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<(String, String, GenerateContentRequest)>>>,
    }

    impl MockTransport {
        fn returning(response: GenerateContentResponse) -> Self {
            Self::with_result(Ok(response))
        }

        fn with_result(result: Result<GenerateContentResponse>) -> Self {
            Self {
                response: Arc::new(Mutex::new(Some(result))),
                calls: Arc::new(AtomicUsize::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceTransport for MockTransport {
        async fn generate_content(
            &self,
            model: &str,
            api_key: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() =
                Some((model.to_string(), api_key.to_string(), request.clone()));
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(GenerateContentResponse::default()))
        }
    }

    fn response_with_parts(parts: Vec<Part>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts,
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }

    fn remover(transport: MockTransport) -> BackgroundRemover<MockTransport, StaticCredential> {
        BackgroundRemover::new(transport, StaticCredential::new("test-key"))
    }

    #[tokio::test]
    async fn test_jpeg_stub_high_quality_returns_inline_data() {
        let stub = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        let encoded = crate::core::encoder::encode(&stub);
        let transport = MockTransport::returning(response_with_parts(vec![Part::inline(
            "image/png",
            "AAAA",
        )]));
        let remover = remover(transport.clone());

        let result = remover
            .remove_background(&encoded, "image/jpeg", QualityTier::High)
            .await
            .unwrap();

        assert_eq!(result.as_str(), "AAAA");
        assert_eq!(transport.call_count(), 1);

        let (model, key, request) = transport.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(model, DEFAULT_MODEL);
        assert_eq!(key, "test-key");
        let parts = &request.contents[0].parts;
        assert_eq!(parts[0].inline_payload(), Some(encoded.as_str()));
        assert_eq!(
            parts[0].inline_data.as_ref().unwrap().mime_type.as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            parts[1].text.as_deref(),
            Some(QualityTier::High.instruction())
        );
    }

    #[tokio::test]
    async fn test_finds_image_among_other_parts() {
        let transport = MockTransport::returning(response_with_parts(vec![
            Part::text("Here is your image"),
            Part::inline("image/png", "BBBB"),
            Part::text("Anything else?"),
        ]));

        let result = remover(transport)
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::Medium)
            .await
            .unwrap();
        assert_eq!(result.as_str(), "BBBB");
    }

    #[tokio::test]
    async fn test_skips_candidates_without_image() {
        let mut response = response_with_parts(vec![Part::text("no image here")]);
        response.candidates.push(Candidate {
            content: Some(Content {
                role: None,
                parts: vec![Part::inline("image/png", "CCCC")],
            }),
            finish_reason: None,
        });

        let result = remover(MockTransport::returning(response))
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::Ultra)
            .await
            .unwrap();
        assert_eq!(result.as_str(), "CCCC");
    }

    #[tokio::test]
    async fn test_block_reason_is_reported() {
        let response = GenerateContentResponse {
            candidates: vec![],
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
        };

        let err = remover(MockTransport::returning(response))
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::High)
            .await
            .unwrap_err();
        assert!(matches!(err, RemovalError::RequestBlocked { .. }));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_no_image_and_no_reason_is_empty_response() {
        let response = response_with_parts(vec![Part::text("I can't do that")]);

        let err = remover(MockTransport::returning(response))
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::High)
            .await
            .unwrap_err();
        assert!(matches!(err, RemovalError::EmptyResponse));
        assert!(err.to_string().contains("No image data"));
    }

    #[tokio::test]
    async fn test_empty_inline_data_is_not_an_image() {
        let response = response_with_parts(vec![Part::inline("image/png", "")]);

        let err = remover(MockTransport::returning(response))
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::High)
            .await
            .unwrap_err();
        assert!(matches!(err, RemovalError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_transport() {
        for credential in [StaticCredential::none(), StaticCredential::new("   ")] {
            let transport = MockTransport::returning(response_with_parts(vec![Part::inline(
                "image/png",
                "AAAA",
            )]));
            let remover = BackgroundRemover::new(transport.clone(), credential);

            let err = remover
                .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::High)
                .await
                .unwrap_err();

            assert!(matches!(err, RemovalError::ConfigurationError { .. }));
            assert!(err.to_string().contains("API key"));
            assert_eq!(transport.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_removal_failed() {
        let transport = MockTransport::with_result(Err(RemovalError::ServiceError {
            status: 503,
            message: "model overloaded".to_string(),
        }));

        let err = remover(transport.clone())
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::High)
            .await
            .unwrap_err();

        assert!(matches!(err, RemovalError::RemovalFailed { .. }));
        assert!(err.to_string().starts_with("Failed to remove background:"));
        assert!(err.to_string().contains("model overloaded"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_model_is_used() {
        let transport = MockTransport::returning(response_with_parts(vec![Part::inline(
            "image/png",
            "AAAA",
        )]));
        let remover = remover(transport.clone()).with_model("gemini-custom");

        remover
            .remove_background(&EncodedContent::new("AAAA"), "image/png", QualityTier::Original)
            .await
            .unwrap();

        let (model, _, request) = transport.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(model, "gemini-custom");
        assert!(request.contents[0].parts[1]
            .text
            .as_deref()
            .unwrap()
            .contains("resolution and dimensions exactly"));
    }
}
