use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// 自動偵測已連線裝置的 udid 值
pub const AUTO_DETECT_UDID: &str = "auto";

/// W3C 標準 capability，不加 `appium:` 前綴
const W3C_STANDARD_CAPABILITIES: &[&str] = &[
    "browserName",
    "browserVersion",
    "platformName",
    "acceptInsecureCerts",
    "pageLoadStrategy",
    "proxy",
    "setWindowRect",
    "timeouts",
    "strictFileInteractability",
    "unhandledPromptBehavior",
    "webSocketUrl",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 4723,
            path: "/wd/hub".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Base URL of the automation server, without a trailing slash.
    pub fn base_url(&self) -> String {
        let path = self.path.trim_end_matches('/');
        let path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}://{}:{}{}", self.protocol, self.host, self.port, path)
    }
}

/// Capability descriptor for the target device, platform and engine.
///
/// Field values are passed to the server as-is; only the key names are
/// translated into W3C form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub platform_name: String,
    pub device_name: String,
    pub udid: Option<String>,
    pub automation_name: String,
    pub xcode_org_id: Option<String>,
    pub xcode_signing_id: Option<String>,
    pub bundle_id: Option<String>,
    pub no_reset: Option<bool>,
    pub wda_local_port: Option<u16>,
    pub wda_bundle_id: Option<String>,
    pub show_xcode_log: Option<bool>,
    pub extra: BTreeMap<String, Value>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            platform_name: "iOS".to_string(),
            device_name: "iPhone".to_string(),
            udid: Some(AUTO_DETECT_UDID.to_string()),
            automation_name: "XCUITest".to_string(),
            xcode_org_id: None,
            xcode_signing_id: None,
            bundle_id: None,
            no_reset: None,
            wda_local_port: None,
            wda_bundle_id: None,
            show_xcode_log: None,
            extra: BTreeMap::new(),
        }
    }
}

impl Capabilities {
    /// Builds the `alwaysMatch` object sent on session creation.
    pub fn to_w3c(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert(
            "platformName".to_string(),
            Value::String(self.platform_name.clone()),
        );
        caps.insert(
            "appium:deviceName".to_string(),
            Value::String(self.device_name.clone()),
        );
        caps.insert(
            "appium:automationName".to_string(),
            Value::String(self.automation_name.clone()),
        );

        let optional_strings = [
            ("appium:udid", &self.udid),
            ("appium:xcodeOrgId", &self.xcode_org_id),
            ("appium:xcodeSigningId", &self.xcode_signing_id),
            ("appium:bundleId", &self.bundle_id),
            ("appium:wdaBundleId", &self.wda_bundle_id),
        ];
        for (key, value) in optional_strings {
            if let Some(value) = value {
                caps.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        if let Some(no_reset) = self.no_reset {
            caps.insert("appium:noReset".to_string(), Value::Bool(no_reset));
        }
        if let Some(port) = self.wda_local_port {
            caps.insert("appium:wdaLocalPort".to_string(), Value::from(port));
        }
        if let Some(show) = self.show_xcode_log {
            caps.insert("appium:showXcodeLog".to_string(), Value::Bool(show));
        }

        for (key, value) in &self.extra {
            caps.insert(vendor_key(key), value.clone());
        }

        caps
    }
}

fn vendor_key(key: &str) -> String {
    if key.contains(':') || W3C_STANDARD_CAPABILITIES.contains(&key) {
        key.to_string()
    } else {
        format!("appium:{}", key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullMode {
    #[default]
    File,
    Folder,
}

/// Address of a resource inside an application container, `@<bundle>:<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPath {
    pub bundle_id: String,
    pub remote_path: String,
}

impl ContainerPath {
    pub fn new(bundle_id: &str, remote_path: &str) -> Self {
        Self {
            bundle_id: bundle_id.trim().to_string(),
            remote_path: remote_path.trim_start_matches('/').to_string(),
        }
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}", self.bundle_id, self.remote_path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    pub id: String,
    pub capabilities: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub ready: bool,
    pub message: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub session_id: String,
    pub container_path: String,
    pub output_path: PathBuf,
    pub bytes_written: usize,
    /// 僅在解壓資料夾時有值
    pub unpacked_entries: Option<usize>,
    pub completed_at: DateTime<Utc>,
}
