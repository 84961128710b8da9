use crate::domain::model::{Capabilities, ContainerPath, PullMode, ServerStatus, SessionHandle};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Unpacks a zip archive into `dest`, returning the number of entries.
    fn unpack_archive(
        &self,
        dest: &Path,
        archive: &[u8],
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}

/// Remote automation endpoint: session lifecycle plus container file access.
#[async_trait]
pub trait AutomationClient: Send + Sync {
    async fn create_session(&self, capabilities: &Capabilities) -> Result<SessionHandle>;

    /// Returns the resource as base64 text; folder pulls are a zip archive.
    async fn pull(&self, session_id: &str, path: &ContainerPath, mode: PullMode)
        -> Result<String>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    async fn status(&self) -> Result<ServerStatus>;
}
