pub mod cli;
pub mod toml_config;

use crate::domain::model::{Capabilities, EndpointConfig, PullMode};
use crate::utils::error::{ExtractError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use clap::Parser;

/// 應用容器根目錄
pub const DEFAULT_REMOTE_PATH: &str = "app/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPolicy {
    pub overwrite: bool,
    pub create_dirs: bool,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self {
            overwrite: true,
            create_dirs: false,
        }
    }
}

/// Everything one extraction needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub endpoint: EndpointConfig,
    pub capabilities: Capabilities,
    pub bundle_id: String,
    pub remote_path: String,
    pub output_path: PathBuf,
    pub pull_mode: PullMode,
    pub unpack: bool,
    pub output: OutputPolicy,
    pub timeout_seconds: Option<u64>,
}

impl ExtractConfig {
    pub fn new(bundle_id: &str, output_path: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            capabilities: Capabilities::default(),
            bundle_id: bundle_id.to_string(),
            remote_path: DEFAULT_REMOTE_PATH.to_string(),
            output_path: output_path.into(),
            pull_mode: PullMode::default(),
            unpack: false,
            output: OutputPolicy::default(),
            timeout_seconds: None,
        }
    }
}

/// 一個 App 的擷取工作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppJob {
    pub name: String,
    pub config: ExtractConfig,
}

impl Validate for ExtractConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint.base_url())?;
        validation::validate_range("endpoint.port", self.endpoint.port, 1, u16::MAX)?;
        validation::validate_non_empty_string("target.bundle_id", &self.bundle_id)?;
        validation::validate_path("output.path", &self.output_path.to_string_lossy())?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }

        if self.unpack && self.pull_mode != PullMode::Folder {
            return Err(ExtractError::ConfigError {
                message: "unpack only applies to folder pulls (pull_mode = \"folder\")"
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "app-extract")]
#[command(about = "Pull a file out of an installed app's container through an Appium server")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Automation server host
    #[arg(long)]
    pub host: Option<String>,

    /// Automation server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Automation server base path, e.g. /wd/hub
    #[arg(long)]
    pub path: Option<String>,

    /// http or https
    #[arg(long)]
    pub protocol: Option<String>,

    /// Device udid, or "auto" to use the connected device
    #[arg(long)]
    pub udid: Option<String>,

    /// Bundle identifier of the target application
    #[arg(short, long)]
    pub bundle_id: Option<String>,

    /// Path inside the application container
    #[arg(long)]
    pub remote_path: Option<String>,

    /// Local destination
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pull a folder (zip archive) instead of a single file
    #[arg(long)]
    pub folder: bool,

    /// Unpack a folder pull into the output directory
    #[arg(long)]
    pub unpack: bool,

    /// Refuse to overwrite an existing destination
    #[arg(long)]
    pub no_clobber: bool,

    /// Create missing parent directories of the destination
    #[arg(long)]
    pub create_dirs: bool,

    /// Per-request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Also write debug logs to a timestamped file in this directory
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Print the resolved configuration without contacting the server
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file (if any), then applies command-line overrides.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut file);
        Ok(file)
    }

    /// Resolves a single-app configuration.
    pub fn resolve(&self) -> Result<ExtractConfig> {
        self.load()?.into_extract_config()
    }

    fn apply_overrides(&self, file: &mut TomlConfig) {
        if let Some(host) = &self.host {
            file.endpoint.host = host.clone();
        }
        if let Some(port) = self.port {
            file.endpoint.port = port;
        }
        if let Some(path) = &self.path {
            file.endpoint.path = path.clone();
        }
        if let Some(protocol) = &self.protocol {
            file.endpoint.protocol = protocol.clone();
        }
        if let Some(udid) = &self.udid {
            file.capabilities.udid = Some(udid.clone());
        }
        if let Some(bundle_id) = &self.bundle_id {
            // 指定單一 App 時忽略 [[apps]]
            file.target.bundle_id = Some(bundle_id.clone());
            file.apps.clear();
        }
        if let Some(remote_path) = &self.remote_path {
            file.target.remote_path = Some(remote_path.clone());
        }
        if let Some(output) = &self.output {
            file.output.path = Some(output.clone());
        }
        if self.folder {
            file.target.pull_mode = PullMode::Folder;
        }
        if self.unpack {
            file.target.unpack = true;
        }
        if self.no_clobber {
            file.output.overwrite = false;
        }
        if self.create_dirs {
            file.output.create_dirs = true;
        }
        if let Some(timeout) = self.timeout {
            file.timeout_seconds = Some(timeout);
        }
        if let Some(dir) = &self.log_dir {
            file.logging.dir = Some(dir.clone());
        }
    }
}
