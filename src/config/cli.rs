use crate::config::OutputPolicy;
use crate::core::{archive, Storage};
use crate::utils::error::{ExtractError, Result};
use std::path::Path;
use tokio::fs;

/// Local filesystem storage honoring the overwrite / create-dirs policy.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    policy: OutputPolicy,
}

impl LocalStorage {
    pub fn new(policy: OutputPolicy) -> Self {
        Self { policy }
    }

    async fn prepare(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !fs::try_exists(parent).await? {
                if !self.policy.create_dirs {
                    return Err(ExtractError::Output {
                        path: path.display().to_string(),
                        reason: format!("parent directory {} does not exist", parent.display()),
                    });
                }
                tracing::debug!("Creating parent directory {}", parent.display());
                fs::create_dir_all(parent).await?;
            }
        }

        if !self.policy.overwrite && fs::try_exists(path).await? {
            return Err(ExtractError::Output {
                path: path.display().to_string(),
                reason: "destination already exists".to_string(),
            });
        }

        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.prepare(path).await?;
        fs::write(path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    async fn unpack_archive(&self, dest: &Path, payload: &[u8]) -> Result<usize> {
        self.prepare(dest).await?;
        fs::create_dir_all(dest).await?;

        // zip 解壓為同步 IO，移到 blocking 執行緒
        let bytes = payload.to_vec();
        let target = dest.to_path_buf();
        tokio::task::spawn_blocking(move || archive::unpack(&bytes, &target))
            .await
            .map_err(|e| ExtractError::IoError(std::io::Error::other(e)))?
    }
}
