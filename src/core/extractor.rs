use crate::config::cli::LocalStorage;
use crate::config::{AppJob, ExtractConfig};
use crate::core::{archive, codec};
use crate::core::session::Session;
use crate::domain::model::{ContainerPath, ExtractReport, PullMode};
use crate::domain::ports::{AutomationClient, Storage};
use crate::utils::error::{ExtractError, Result};
use crate::utils::validation::Validate;
use crate::webdriver::WebDriverClient;
use chrono::Utc;

/// One-shot extraction of an application resource into local storage.
pub struct Extractor<A: AutomationClient, S: Storage> {
    client: A,
    storage: S,
}

impl<A: AutomationClient, S: Storage> Extractor<A, S> {
    pub fn new(client: A, storage: S) -> Self {
        Self { client, storage }
    }

    /// Open session → pull → write → close.
    ///
    /// A failed session open is returned immediately with nothing written
    /// and no teardown. Once the session is open it is always closed, and
    /// a retrieval or write failure is returned only after that.
    pub async fn extract(&self, config: &ExtractConfig) -> Result<ExtractReport> {
        config.validate()?;

        let container = ContainerPath::new(&config.bundle_id, &config.remote_path);
        tracing::info!(
            "🚀 Extracting {} to {}",
            container,
            config.output_path.display()
        );

        let session = Session::open(&self.client, &config.capabilities).await?;
        tracing::debug!(
            "Negotiated capabilities: {}",
            session.handle().capabilities
        );

        let outcome = self.retrieve(&session, &container, config).await;
        if let Err(e) = &outcome {
            tracing::error!("❌ Failed to extract {}: {}", container, e);
        }

        let teardown = session.close().await;

        match (outcome, teardown) {
            (Ok(report), Ok(())) => {
                tracing::info!(
                    "✅ Extracted {} bytes to {}",
                    report.bytes_written,
                    report.output_path.display()
                );
                Ok(report)
            }
            (Ok(_), Err(teardown_err)) => Err(teardown_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(teardown_err)) => {
                tracing::warn!("⚠️ {}", teardown_err);
                Err(e)
            }
        }
    }

    /// Extracts each app in order; one app's failure does not stop the rest.
    pub async fn extract_all(&self, jobs: &[AppJob]) -> Vec<AppOutcome> {
        let mut outcomes = Vec::with_capacity(jobs.len());

        for (index, job) in jobs.iter().enumerate() {
            tracing::info!("📦 [{}/{}] {}", index + 1, jobs.len(), job.name);
            let result = self.extract(&job.config).await;
            outcomes.push(AppOutcome {
                name: job.name.clone(),
                result,
            });
        }

        outcomes
    }

    async fn retrieve(
        &self,
        session: &Session<'_, A>,
        container: &ContainerPath,
        config: &ExtractConfig,
    ) -> Result<ExtractReport> {
        let encoded = session.pull(container, config.pull_mode).await?;
        let bytes = codec::decode_payload(&encoded)?;
        if bytes.is_empty() {
            return Err(ExtractError::EmptyPayload {
                path: container.to_string(),
            });
        }
        tracing::debug!("Decoded {} bytes from {}", bytes.len(), container);

        let unpacked_entries = match config.pull_mode {
            PullMode::Folder if config.unpack => Some(
                self.storage
                    .unpack_archive(&config.output_path, &bytes)
                    .await?,
            ),
            PullMode::Folder => {
                let entries = archive::entry_count(&bytes)?;
                tracing::debug!("Folder archive holds {} entries", entries);
                self.storage.write_file(&config.output_path, &bytes).await?;
                None
            }
            PullMode::File => {
                self.storage.write_file(&config.output_path, &bytes).await?;
                None
            }
        };

        Ok(ExtractReport {
            session_id: session.id().to_string(),
            container_path: container.to_string(),
            output_path: config.output_path.clone(),
            bytes_written: bytes.len(),
            unpacked_entries,
            completed_at: Utc::now(),
        })
    }
}

/// 單一 App 的擷取結果
#[derive(Debug)]
pub struct AppOutcome {
    pub name: String,
    pub result: Result<ExtractReport>,
}

/// Runs an extraction against the configured Appium server, writing to the
/// local filesystem.
pub async fn extract(config: &ExtractConfig) -> Result<ExtractReport> {
    let client = WebDriverClient::new(&config.endpoint, config.timeout_seconds)?;
    let storage = LocalStorage::new(config.output.clone());
    Extractor::new(client, storage).extract(config).await
}

/// Batch form of [`extract`]. Jobs resolved from one config file share the
/// endpoint and output policy, so the first job's settings build the client.
pub async fn extract_apps(jobs: &[AppJob]) -> Result<Vec<AppOutcome>> {
    let Some(first) = jobs.first() else {
        return Ok(Vec::new());
    };

    let client = WebDriverClient::new(&first.config.endpoint, first.config.timeout_seconds)?;
    let storage = LocalStorage::new(first.config.output.clone());
    Ok(Extractor::new(client, storage).extract_all(jobs).await)
}
