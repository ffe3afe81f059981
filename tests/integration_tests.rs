use gemini_bg_remover::core::encoder::encode;
use gemini_bg_remover::core::remover::DEFAULT_MODEL;
use gemini_bg_remover::domain::ports::Storage;
use gemini_bg_remover::{
    BackgroundRemover, BatchReport, GeminiHttpTransport, LocalStorage, QualityTier,
    RemovalEngine, RemovalError, RemovalStatus, StaticCredential,
};
use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const RESULT_PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

fn png_response() -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": encode(RESULT_PNG).as_str()}}
            ]},
            "finishReason": "STOP"
        }]
    })
}

fn engine_for(
    server: &MockServer,
    output_dir: &str,
) -> RemovalEngine<LocalStorage, GeminiHttpTransport, StaticCredential> {
    let remover = BackgroundRemover::new(
        GeminiHttpTransport::new(server.base_url()),
        StaticCredential::new("integration-key"),
    );
    RemovalEngine::new(remover, LocalStorage::new(String::new()), output_dir)
}

#[tokio::test]
async fn test_end_to_end_writes_no_bg_png() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input_path = input_dir.path().join("portrait.jpg");
    std::fs::write(&input_path, b"\xff\xd8\xff\xe0\x00\x10JFIF")?;

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/v1beta/models/{}:generateContent", DEFAULT_MODEL))
                .header("x-goog-api-key", "integration-key")
                .body_contains("\"mimeType\":\"image/jpeg\"");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(png_response());
        })
        .await;

    let engine = engine_for(&server, output_dir.path().to_str().unwrap());
    let output = engine
        .process(input_path.to_str().unwrap(), None, QualityTier::High)
        .await?;

    api_mock.assert_async().await;
    assert!(output.output_path.ends_with("portrait_no-bg.png"));
    assert_eq!(output.bytes_written, RESULT_PNG.len());

    let written = std::fs::read(output_dir.path().join("portrait_no-bg.png"))?;
    assert_eq!(written, RESULT_PNG);
    assert!(output
        .image
        .to_data_url("image/png")
        .starts_with("data:image/png;base64,iVBORw0KGgo"));
    Ok(())
}

#[tokio::test]
async fn test_batch_with_mixed_results_and_report() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let good = input_dir.path().join("good.png");
    let blocked = input_dir.path().join("blocked.webp");
    let missing = input_dir.path().join("missing.jpg");
    std::fs::write(&good, b"good-bytes")?;
    std::fs::write(&blocked, b"blocked-bytes")?;

    let server = MockServer::start_async().await;
    let good_mock = server
        .mock_async(|when, then| {
            when.method(POST).body_contains("\"mimeType\":\"image/png\"");
            then.status(200).json_body(png_response());
        })
        .await;
    let blocked_mock = server
        .mock_async(|when, then| {
            when.method(POST).body_contains("\"mimeType\":\"image/webp\"");
            then.status(200)
                .json_body(json!({"promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}}));
        })
        .await;

    let engine = engine_for(&server, output_dir.path().to_str().unwrap());
    let inputs: Vec<String> = [&good, &blocked, &missing]
        .iter()
        .map(|p| p.to_str().unwrap().to_string())
        .collect();

    let mut observed = Vec::new();
    let report = engine
        .run_batch_with(&inputs, None, QualityTier::Original, |input, result| {
            observed.push((input.to_string(), result.is_ok()));
        })
        .await;

    good_mock.assert_hits_async(1).await;
    blocked_mock.assert_hits_async(1).await;

    assert_eq!(observed.len(), 3);
    assert!(observed[0].1);
    assert!(!observed[1].1);

    assert_eq!(report.quality, QualityTier::Original);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.blocked(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.entries[1].status, RemovalStatus::Blocked);
    assert!(report.entries[1]
        .error
        .as_deref()
        .unwrap()
        .contains("PROHIBITED_CONTENT"));
    assert!(report.entries[2]
        .error
        .as_deref()
        .unwrap()
        .contains("missing.jpg"));

    assert!(output_dir.path().join("good_no-bg.png").exists());
    assert!(!output_dir.path().join("blocked_no-bg.png").exists());

    // 報告寫出後可以讀回
    let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());
    report.save(&storage, "report.json").await?;
    let saved = storage.read_file("report.json").await?;
    let parsed: BatchReport = serde_json::from_slice(&saved)?;
    assert_eq!(parsed.total(), 3);
    assert_eq!(parsed.model, DEFAULT_MODEL);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_input_is_encoding_error_without_request() -> Result<()> {
    let output_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(png_response());
        })
        .await;

    let engine = engine_for(&server, output_dir.path().to_str().unwrap());
    let err = engine
        .process("/definitely/not/here.png", None, QualityTier::High)
        .await
        .unwrap_err();

    assert!(matches!(err, RemovalError::EncodingError { .. }));
    api_mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_server_failure_surfaces_as_removal_failed() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input_path = input_dir.path().join("cat.png");
    std::fs::write(&input_path, b"cat")?;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(503).body("upstream unavailable");
        })
        .await;

    let engine = engine_for(&server, output_dir.path().to_str().unwrap());
    let err = engine
        .process(input_path.to_str().unwrap(), None, QualityTier::Medium)
        .await
        .unwrap_err();

    assert!(matches!(err, RemovalError::RemovalFailed { .. }));
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("upstream unavailable"));
    assert!(!output_dir.path().join("cat_no-bg.png").exists());
    Ok(())
}
