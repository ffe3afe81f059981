use clap::Parser;
use gemini_bg_remover::core::{ConfigProvider, CredentialProvider, QualityTier};
use gemini_bg_remover::utils::error::ErrorSeverity;
use gemini_bg_remover::utils::{logger, validation::Validate};
use gemini_bg_remover::{
    BackgroundRemover, GeminiHttpTransport, LocalStorage, RemovalEngine, RemovalError, TomlConfig,
};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "toml-remove")]
#[command(about = "Batch background removal driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "bg-remove.toml")]
    config: String,

    /// Override the quality tier from the config
    #[arg(short, long, value_enum)]
    quality: Option<QualityTier>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without calling the API
    #[arg(long)]
    dry_run: bool,
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 遠端錯誤，可重試
        ErrorSeverity::High => 1,     // 輸入或配置錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn fail(e: &RemovalError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(args.verbose, config.json_logs());
    tracing::info!("🚀 Starting TOML-based background removal");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(quality) = args.quality {
        config.removal.quality = quality;
        tracing::info!("🔧 Quality overridden to: {}", quality);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No API calls will be made");
        perform_dry_run(&config);
        return Ok(());
    }

    let credentials = config.credential_provider();
    if credentials.api_key().is_none() {
        fail(&RemovalError::missing_credential());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let transport = GeminiHttpTransport::new(config.api_endpoint())
        .with_timeout(Duration::from_secs(config.timeout_seconds()));
    let remover = BackgroundRemover::new(transport, credentials).with_model(config.model());
    let engine = RemovalEngine::new_with_monitoring(
        remover,
        LocalStorage::new(String::new()),
        config.output_path(),
        monitor_enabled,
    );

    let print_data_url = config.print_data_url();
    let mut worst: Option<ErrorSeverity> = None;
    let report = engine
        .run_batch_with(
            &config.removal.inputs,
            config.removal.mime_type.as_deref(),
            config.quality(),
            |input, result| match result {
                Ok(output) => {
                    println!("✅ {} -> {}", input, output.output_path);
                    if print_data_url {
                        println!("{}", output.image.to_data_url("image/png"));
                    }
                }
                Err(e) => {
                    eprintln!("❌ {}: {}", input, e.user_friendly_message());
                    worst = worst.max(Some(e.severity()));
                }
            },
        )
        .await;

    if let Some(path) = &config.output.report {
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Endpoint: {}", config.api_endpoint());
    println!("  Model: {}", config.model());
    println!("  Quality: {}", config.quality());
    println!("  Inputs: {}", config.removal.inputs.len());
    println!("  Output: {}", config.output_path());
    println!("  Timeout: {}s", config.timeout_seconds());

    if let Some(report) = &config.output.report {
        println!("  Report: {}", report);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("🔑 Credential:");
    if config.configured_api_key().is_some() {
        println!("  From config file (service.api_key)");
    } else {
        println!("  From environment (GEMINI_API_KEY / API_KEY)");
    }

    println!();
    println!("🖼️ Planned Outputs:");
    for input in &config.removal.inputs {
        let output = std::path::Path::new(config.output_path())
            .join(gemini_bg_remover::core::engine::output_file_name(input));
        println!("  {} -> {}", input, output.display());
    }

    println!();
    println!("📝 Instruction ({}):", config.quality());
    println!("  {}", config.quality().instruction());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
