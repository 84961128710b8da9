use crate::domain::model::{Capabilities, ContainerPath, PullMode, SessionHandle};
use crate::domain::ports::AutomationClient;
use crate::utils::error::{ExtractError, Result};

/// An open automation session.
///
/// `close` consumes the guard, so a session cannot be used after teardown
/// or closed twice. A session dropped without `close` (panic, cancelled
/// future) is logged because the server keeps it alive until it times out.
pub struct Session<'a, A: AutomationClient + ?Sized> {
    client: &'a A,
    handle: SessionHandle,
    closed: bool,
}

impl<'a, A: AutomationClient + ?Sized> Session<'a, A> {
    pub async fn open(client: &'a A, capabilities: &Capabilities) -> Result<Self> {
        tracing::debug!(
            "Requesting session: platform={}, automation={}, udid={:?}",
            capabilities.platform_name,
            capabilities.automation_name,
            capabilities.udid
        );

        let handle = client
            .create_session(capabilities)
            .await
            .map_err(|e| match e {
                ExtractError::Connection { .. } => e,
                other => ExtractError::Connection {
                    message: other.to_string(),
                },
            })?;

        tracing::info!("🔗 Session {} opened", handle.id);
        Ok(Self {
            client,
            handle,
            closed: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.handle.id
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub async fn pull(&self, path: &ContainerPath, mode: PullMode) -> Result<String> {
        tracing::debug!("Pulling {} ({:?}) in session {}", path, mode, self.id());

        self.client
            .pull(self.id(), path, mode)
            .await
            .map_err(|e| match e {
                ExtractError::Retrieval { .. } => e,
                ExtractError::Remote { message, .. } => ExtractError::Retrieval {
                    path: path.to_string(),
                    message,
                },
                other => ExtractError::Retrieval {
                    path: path.to_string(),
                    message: other.to_string(),
                },
            })
    }

    pub async fn close(mut self) -> Result<()> {
        let session_id = self.handle.id.clone();
        let outcome = self.client.delete_session(&session_id).await;
        // 請求完成後才標記，取消中的 close 仍會觸發 Drop 警告
        self.closed = true;

        match outcome {
            Ok(()) => {
                tracing::info!("🔌 Session {} closed", session_id);
                Ok(())
            }
            Err(e) => Err(ExtractError::Teardown {
                session_id,
                message: e.to_string(),
            }),
        }
    }
}

impl<A: AutomationClient + ?Sized> Drop for Session<'_, A> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(
                "⚠️ Session {} dropped without being closed; it stays open on the server until it times out",
                self.handle.id
            );
        }
    }
}
