use clap::Parser;
use gemini_bg_remover::core::{ConfigProvider, CredentialProvider};
use gemini_bg_remover::utils::error::{ErrorSeverity, RemovalError};
use gemini_bg_remover::utils::{logger, validation::Validate};
use gemini_bg_remover::{
    BackgroundRemover, CliConfig, EnvCredential, GeminiHttpTransport, LocalStorage,
    RemovalEngine,
};
use std::time::Duration;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &RemovalError) -> ! {
    tracing::error!("❌ {} (Category: {:?}, Severity: {:?})", e, e.category(), e.severity());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting gemini-bg-remover CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    // 啟動時先檢查金鑰，請求時仍會再讀一次
    let credentials = EnvCredential::default();
    if credentials.api_key().is_none() {
        fail(&RemovalError::missing_credential());
    }

    let transport = GeminiHttpTransport::new(config.api_endpoint())
        .with_timeout(Duration::from_secs(config.timeout_seconds()));
    let remover = BackgroundRemover::new(transport, credentials).with_model(config.model());
    let engine = RemovalEngine::new_with_monitoring(
        remover,
        LocalStorage::new(String::new()),
        config.output_path(),
        config.monitor,
    );

    let mut worst: Option<ErrorSeverity> = None;
    let report = engine
        .run_batch_with(
            &config.inputs,
            config.mime_type.as_deref(),
            config.quality(),
            |input, result| match result {
                Ok(output) => {
                    println!("✅ {} -> {}", input, output.output_path);
                    if config.print_data_url {
                        println!("{}", output.image.to_data_url("image/png"));
                    }
                }
                Err(e) => {
                    eprintln!("❌ {}: {}", input, e.user_friendly_message());
                    eprintln!("💡 建議: {}", e.recovery_suggestion());
                    worst = worst.max(Some(e.severity()));
                }
            },
        )
        .await;

    if let Some(path) = &config.report {
        if let Err(e) = report.save(&LocalStorage::new(String::new()), path).await {
            tracing::error!("❌ Failed to write report '{}'", path);
            fail(&e);
        }
        println!("📁 Report saved to: {}", path);
    }

    println!(
        "📊 {} succeeded, {} blocked, {} failed",
        report.succeeded(),
        report.blocked(),
        report.failed()
    );

    if let Some(severity) = worst {
        let code = exit_code(severity);
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}
