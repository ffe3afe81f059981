use crate::core::encoder::{decode, encode, is_png, read_image};
use crate::core::remover::BackgroundRemover;
use crate::core::report::{BatchReport, ReportEntry};
use crate::domain::model::{EncodedContent, QualityTier, RemovalStatus};
use crate::domain::ports::{CredentialProvider, InferenceTransport, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::RemovalMonitor;
use crate::utils::validation::resolve_mime_type;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

pub const OUTPUT_SUFFIX: &str = "_no-bg.png";

/// 單張圖片處理完成後的結果
#[derive(Debug, Clone)]
pub struct RemovalOutput {
    pub input_path: String,
    pub output_path: String,
    pub mime_type: String,
    pub quality: QualityTier,
    pub bytes_written: usize,
    pub duration: Duration,
    pub image: EncodedContent,
}

/// Output file name for a given input: `{base}_no-bg.png`.
///
/// The base is the file name with its last `.` segment dropped; when
/// nothing is left it falls back to `image`.
pub fn output_file_name(original: &str) -> String {
    format!("{}{}", output_base_name(original), OUTPUT_SUFFIX)
}

/// Same as `output_file_name` with a counter before the extension:
/// `{base}_no-bg-{n}.png`.
pub fn numbered_output_file_name(original: &str, n: usize) -> String {
    let suffix = OUTPUT_SUFFIX.trim_end_matches(".png");
    format!("{}{}-{}.png", output_base_name(original), suffix, n)
}

fn output_base_name(original: &str) -> String {
    let file_name = Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(original);

    let segments: Vec<&str> = file_name.split('.').collect();
    let base = segments[..segments.len() - 1].join(".");
    if base.is_empty() {
        "image".to_string()
    } else {
        base
    }
}

/// File in, transparent PNG out.
pub struct RemovalEngine<S: Storage, T: InferenceTransport, K: CredentialProvider> {
    remover: BackgroundRemover<T, K>,
    storage: S,
    output_dir: String,
    monitor: RemovalMonitor,
}

impl<S: Storage, T: InferenceTransport, K: CredentialProvider> RemovalEngine<S, T, K> {
    pub fn new(remover: BackgroundRemover<T, K>, storage: S, output_dir: impl Into<String>) -> Self {
        Self::new_with_monitoring(remover, storage, output_dir, false)
    }

    pub fn new_with_monitoring(
        remover: BackgroundRemover<T, K>,
        storage: S,
        output_dir: impl Into<String>,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            remover,
            storage,
            output_dir: output_dir.into(),
            monitor: RemovalMonitor::new(monitor_enabled),
        }
    }

    pub fn output_path_for(&self, input: &str) -> String {
        self.join_output(output_file_name(input))
    }

    fn join_output(&self, file_name: String) -> String {
        Path::new(&self.output_dir)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }

    /// 批次中同名輸出不可互相覆蓋，改用 `{base}_no-bg-{n}.png`
    fn unique_output_path(&self, input: &str, taken: &HashSet<String>) -> String {
        let path = self.output_path_for(input);
        if !taken.contains(&path) {
            return path;
        }

        let mut n = 1;
        loop {
            let candidate = self.join_output(numbered_output_file_name(input, n));
            if !taken.contains(&candidate) {
                tracing::warn!(
                    "⚠️ {} would overwrite {}, writing {} instead",
                    input,
                    path,
                    candidate
                );
                return candidate;
            }
            n += 1;
        }
    }

    pub async fn process(
        &self,
        input: &str,
        mime_override: Option<&str>,
        quality: QualityTier,
    ) -> Result<RemovalOutput> {
        let output_path = self.output_path_for(input);
        self.process_to(input, mime_override, quality, output_path).await
    }

    async fn process_to(
        &self,
        input: &str,
        mime_override: Option<&str>,
        quality: QualityTier,
        output_path: String,
    ) -> Result<RemovalOutput> {
        let start = Instant::now();
        tracing::info!("🖼️ Processing {} (quality: {})", input, quality);

        // 讀檔並編碼
        let mime_type = resolve_mime_type(input, mime_override)?;
        let source = read_image(&self.storage, input, &mime_type).await?;
        let encoded = encode(&source.bytes);
        self.monitor.log_phase("Encoded input");

        // 呼叫模型
        let image = self
            .remover
            .remove_background(&encoded, &source.mime_type, quality)
            .await?;
        self.monitor.log_phase("Received result");

        // 解碼並寫出 PNG
        let bytes = decode(&image)?;
        if !is_png(&bytes) {
            tracing::warn!("⚠️ Result for {} does not look like a PNG file", input);
        }

        self.storage.write_file(&output_path, &bytes).await?;
        self.monitor.log_phase("Saved output");

        let duration = start.elapsed();
        tracing::info!(
            "✅ Saved {} ({} bytes) in {:?}",
            output_path,
            bytes.len(),
            duration
        );

        Ok(RemovalOutput {
            input_path: input.to_string(),
            output_path,
            mime_type: source.mime_type,
            quality,
            bytes_written: bytes.len(),
            duration,
            image,
        })
    }

    /// Processes inputs one after another; a failed input is recorded and
    /// the rest still run. Inputs sharing a base name get numbered outputs
    /// so no result in the batch replaces another.
    pub async fn run_batch(
        &self,
        inputs: &[String],
        mime_override: Option<&str>,
        quality: QualityTier,
    ) -> BatchReport {
        self.run_batch_with(inputs, mime_override, quality, |_, _| {}).await
    }

    /// Like `run_batch`, handing every per-input result to `observe`
    /// before it is folded into the report.
    pub async fn run_batch_with<F>(
        &self,
        inputs: &[String],
        mime_override: Option<&str>,
        quality: QualityTier,
        mut observe: F,
    ) -> BatchReport
    where
        F: FnMut(&str, &Result<RemovalOutput>),
    {
        let mut report = BatchReport::start(self.remover.model(), quality);
        tracing::info!("🚀 Starting background removal for {} image(s)", inputs.len());

        let mut written: HashSet<String> = HashSet::new();

        for input in inputs {
            let start = Instant::now();
            let output_path = self.unique_output_path(input, &written);
            let result = self
                .process_to(input, mime_override, quality, output_path)
                .await;
            if let Ok(output) = &result {
                written.insert(output.output_path.clone());
            }
            let status = RemovalStatus::of(&result);
            observe(input.as_str(), &result);

            let entry = match result {
                Ok(output) => ReportEntry::succeeded(input, &output.output_path, output.duration),
                Err(e) => {
                    tracing::error!(
                        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                        input,
                        e,
                        e.category(),
                        e.severity()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    ReportEntry::failed(input, status, e.to_string(), start.elapsed())
                }
            };
            report.push(entry);
        }

        report.finish();
        self.monitor.log_final_stats();
        tracing::info!(
            "📊 Done: {} succeeded, {} blocked, {} failed",
            report.succeeded(),
            report.blocked(),
            report.failed()
        );

        report
    }
}
