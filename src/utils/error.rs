use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to open automation session: {message}")]
    Connection { message: String },

    #[error("Failed to retrieve {path}: {message}")]
    Retrieval { path: String, message: String },

    #[error("Payload decoding failed: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Retrieved payload for {path} is empty")]
    EmptyPayload { path: String },

    #[error("Archive operation failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Cannot write output {path}: {reason}")]
    Output { path: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to close session {session_id}: {message}")]
    Teardown { session_id: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Automation server returned {status} ({error}): {message}")]
    Remote {
        status: u16,
        error: String,
        message: String,
    },

    #[error("Unexpected response from automation server: {message}")]
    Protocol { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Retrieval,
    Io,
    Remote,
    Config,
}

impl ExtractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractError::Connection { .. }
            | ExtractError::Teardown { .. }
            | ExtractError::Http(_) => ErrorCategory::Connection,
            ExtractError::Retrieval { .. }
            | ExtractError::Decode(_)
            | ExtractError::EmptyPayload { .. }
            | ExtractError::Archive(_) => ErrorCategory::Retrieval,
            ExtractError::Output { .. } | ExtractError::IoError(_) => ErrorCategory::Io,
            ExtractError::Remote { .. }
            | ExtractError::Protocol { .. }
            | ExtractError::SerializationError(_) => ErrorCategory::Remote,
            ExtractError::ConfigError { .. }
            | ExtractError::InvalidConfigValueError { .. }
            | ExtractError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    /// 取回或寫入階段的錯誤，session 仍會被關閉
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(self.category(), ErrorCategory::Retrieval | ErrorCategory::Io)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExtractError::Connection { .. } | ExtractError::Http(_) => {
                format!("Could not reach the automation server: {}", self)
            }
            ExtractError::Retrieval { path, message } => {
                format!("The device refused to hand over {}: {}", path, message)
            }
            ExtractError::EmptyPayload { path } => {
                format!("Nothing was returned for {}", path)
            }
            ExtractError::Output { path, reason } => {
                format!("Could not save to {}: {}", path, reason)
            }
            ExtractError::Teardown { session_id, .. } => format!(
                "The extraction finished but session {} could not be closed",
                session_id
            ),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Connection => {
                "Check that the Appium server is running and the device is connected and trusted"
            }
            ErrorCategory::Retrieval => {
                "Verify the bundle id and remote path; arbitrary containers need a jailbroken device or special entitlements"
            }
            ErrorCategory::Io => {
                "Check the output path, or pass --create-dirs / drop --no-clobber"
            }
            ErrorCategory::Remote => "Inspect the Appium server log for details",
            ErrorCategory::Config => "Fix the configuration file or command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
