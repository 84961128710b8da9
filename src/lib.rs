pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod webdriver;

pub use crate::config::{cli::LocalStorage, AppJob, ExtractConfig, OutputPolicy};

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::core::extractor::{extract, extract_apps, AppOutcome, Extractor};
pub use crate::domain::model::{Capabilities, EndpointConfig, ExtractReport, PullMode};
pub use crate::utils::error::{ExtractError, Result};
pub use crate::webdriver::WebDriverClient;
