use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 檔案日誌固定記錄 debug 等級
const FILE_LOG_FILTER: &str = "app_extract=debug,info";

/// An opened log file, written alongside the console output.
#[derive(Debug)]
pub struct LogFile {
    pub path: PathBuf,
    file: File,
}

/// `appium_<app>_<YYYYmmdd_HHMMSS>.log`, or `appium_<ts>.log` without an app.
pub fn log_file_name(app_name: Option<&str>, timestamp: &str) -> String {
    match app_name {
        Some(name) => format!("appium_{}_{}.log", name, timestamp),
        None => format!("appium_{}.log", timestamp),
    }
}

/// Creates `dir` if needed and opens a fresh timestamped log file in it.
pub fn open_log_file(dir: &Path, app_name: Option<&str>) -> std::io::Result<LogFile> {
    fs::create_dir_all(dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let path = dir.join(log_file_name(app_name, &timestamp));
    let file = File::create(&path)?;
    Ok(LogFile { path, file })
}

pub fn init_cli_logger(verbose: bool, json: bool, log_file: Option<LogFile>) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("app_extract=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("app_extract=info"))
    };

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .json()
    });
    let compact_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });
    let console = Layer::and_then(json_layer, compact_layer).with_filter(filter);

    let file_layer = log_file.map(|log_file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(log_file.file))
            .with_filter(EnvFilter::new(FILE_LOG_FILTER))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}
