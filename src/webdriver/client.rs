use crate::domain::model::{
    Capabilities, ContainerPath, EndpointConfig, PullMode, ServerStatus, SessionHandle,
};
use crate::domain::ports::AutomationClient;
use crate::utils::error::{ExtractError, Result};
use crate::webdriver::protocol::{
    Envelope, ErrorValue, NewSessionRequest, NewSessionValue, PullRequest, StatusValue,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("app-extract/", env!("CARGO_PKG_VERSION"));

/// Appium server client over the W3C WebDriver HTTP protocol.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    client: Client,
    base_url: String,
}

impl WebDriverClient {
    /// No request deadline unless `timeout_seconds` is given.
    pub fn new(endpoint: &EndpointConfig, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: endpoint.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Envelope> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Automation server responded {} ({} bytes)", status, body.len());

        let envelope: Option<Envelope> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let (error, message) = match envelope
                .as_ref()
                .and_then(|e| ErrorValue::from_value(&e.value))
            {
                Some(err) => {
                    if let Some(trace) = &err.stacktrace {
                        tracing::debug!("Server stacktrace: {}", trace);
                    }
                    (err.error, err.message)
                }
                None => (
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_lowercase(),
                    body.trim().to_string(),
                ),
            };
            return Err(ExtractError::Remote {
                status: status.as_u16(),
                error,
                message,
            });
        }

        let envelope = envelope.ok_or_else(|| ExtractError::Protocol {
            message: format!("response is not a WebDriver JSON envelope: {}", truncate(&body)),
        })?;

        // 部分舊版伺服器以 200 回傳錯誤物件
        if let Some(err) = ErrorValue::from_value(&envelope.value) {
            return Err(ExtractError::Remote {
                status: status.as_u16(),
                error: err.error,
                message: err.message,
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl AutomationClient for WebDriverClient {
    async fn create_session(&self, capabilities: &Capabilities) -> Result<SessionHandle> {
        tracing::info!("📡 Connecting to automation server at {}", self.base_url);

        let request = NewSessionRequest::new(capabilities.to_w3c());
        let envelope = self
            .send(self.client.post(self.url("/session")).json(&request))
            .await
            .map_err(|e| ExtractError::Connection {
                message: e.to_string(),
            })?;

        let value: NewSessionValue = serde_json::from_value(envelope.value.clone())?;

        // W3C 在 value 內；JSONWP 在頂層
        let id = value
            .session_id
            .or(envelope.session_id)
            .ok_or_else(|| ExtractError::Connection {
                message: "server did not return a session id".to_string(),
            })?;

        Ok(SessionHandle {
            id,
            capabilities: value.capabilities.unwrap_or(envelope.value),
        })
    }

    async fn pull(
        &self,
        session_id: &str,
        path: &ContainerPath,
        mode: PullMode,
    ) -> Result<String> {
        let command = match mode {
            PullMode::File => "pull_file",
            PullMode::Folder => "pull_folder",
        };
        let url = self.url(&format!("/session/{}/appium/device/{}", session_id, command));
        let request = PullRequest {
            path: path.to_string(),
        };

        let envelope = self
            .send(self.client.post(url).json(&request))
            .await
            .map_err(|e| match e {
                ExtractError::Remote { message, .. } => ExtractError::Retrieval {
                    path: path.to_string(),
                    message,
                },
                other => other,
            })?;

        match envelope.value {
            Value::String(encoded) => Ok(encoded),
            other => Err(ExtractError::Protocol {
                message: format!("expected base64 string from {}, got {}", command, other),
            }),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.send(self.client.delete(self.url(&format!("/session/{}", session_id))))
            .await?;
        Ok(())
    }

    async fn status(&self) -> Result<ServerStatus> {
        let envelope = self.send(self.client.get(self.url("/status"))).await?;
        let value: StatusValue = serde_json::from_value(envelope.value)?;

        Ok(ServerStatus {
            // Appium 1.x 不回傳 ready，能回應即視為就緒
            ready: value.ready.unwrap_or(true),
            message: value.message.unwrap_or_default(),
            version: value.build.and_then(|b| b.version),
        })
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.len() <= LIMIT {
        body.to_string()
    } else {
        let mut end = LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}
