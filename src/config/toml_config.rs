use crate::config::{AppJob, ExtractConfig, OutputPolicy, DEFAULT_REMOTE_PATH};
use crate::domain::model::{Capabilities, EndpointConfig, PullMode};
use crate::utils::error::{ExtractError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 多個 App 依序擷取；為空時使用 `[target]`
    #[serde(default)]
    pub apps: Vec<AppTarget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for `appium_<app>_<timestamp>.log` files
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppTarget {
    pub name: String,
    #[serde(alias = "bundleId")]
    pub bundle_id: String,
    #[serde(default)]
    pub remote_path: Option<String>,
    /// Overrides the `<output.path>/<name>` default
    #[serde(default, alias = "ipa_path", alias = "ipaPath")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub bundle_id: Option<String>,
    pub remote_path: Option<String>,
    pub pull_mode: PullMode,
    pub unpack: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub overwrite: bool,
    pub create_dirs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let policy = OutputPolicy::default();
        Self {
            path: None,
            overwrite: policy.overwrite,
            create_dirs: policy.create_dirs,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ExtractError::ConfigError {
            message: format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExtractError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${XCODE_ORG_ID})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExtractError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn into_extract_config(self) -> Result<ExtractConfig> {
        if !self.apps.is_empty() {
            return Err(ExtractError::ConfigError {
                message: format!(
                    "{} [[apps]] entries configured; resolve them as a batch",
                    self.apps.len()
                ),
            });
        }

        let bundle_id = validate_required_field("target.bundle_id", &self.target.bundle_id)?;
        let output_path = validate_required_field("output.path", &self.output.path)?;

        Ok(self.build(
            bundle_id,
            self.target.remote_path.as_deref(),
            PathBuf::from(output_path),
        ))
    }

    /// One job per `[[apps]]` entry, or a single job from `[target]`.
    pub fn into_jobs(self) -> Result<Vec<AppJob>> {
        if self.apps.is_empty() {
            let config = self.into_extract_config()?;
            return Ok(vec![AppJob {
                name: config.bundle_id.clone(),
                config,
            }]);
        }

        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(self.apps.len());

        for app in &self.apps {
            let name = app.name.trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                return Err(ExtractError::InvalidConfigValueError {
                    field: "apps.name".to_string(),
                    value: app.name.clone(),
                    reason: "App names must be non-empty and unique".to_string(),
                });
            }

            let output_path = match &app.output {
                Some(path) => PathBuf::from(path),
                None => {
                    let dir = validate_required_field("output.path", &self.output.path)?;
                    self.default_app_output(Path::new(dir), name)
                }
            };

            let remote_path = app
                .remote_path
                .as_deref()
                .or(self.target.remote_path.as_deref());

            jobs.push(AppJob {
                name: name.to_string(),
                config: self.build(&app.bundle_id, remote_path, output_path),
            });
        }

        Ok(jobs)
    }

    /// `<dir>/<name>.ipa` for file pulls, `<dir>/<name>[.zip]` for folders.
    fn default_app_output(&self, dir: &Path, name: &str) -> PathBuf {
        let file_name = match self.target.pull_mode {
            PullMode::File => format!("{}.ipa", name),
            PullMode::Folder if self.target.unpack => name.to_string(),
            PullMode::Folder => format!("{}.zip", name),
        };
        dir.join(file_name)
    }

    fn build(
        &self,
        bundle_id: &str,
        remote_path: Option<&str>,
        output_path: PathBuf,
    ) -> ExtractConfig {
        ExtractConfig {
            endpoint: self.endpoint.clone(),
            capabilities: self.capabilities.clone(),
            bundle_id: bundle_id.to_string(),
            remote_path: remote_path.unwrap_or(DEFAULT_REMOTE_PATH).to_string(),
            output_path,
            pull_mode: self.target.pull_mode,
            unpack: self.target.unpack,
            output: OutputPolicy {
                overwrite: self.output.overwrite,
                create_dirs: self.output.create_dirs,
            },
            timeout_seconds: self.timeout_seconds,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        for job in self.clone().into_jobs()? {
            job.config.validate()?;
        }
        Ok(())
    }
}
