use anyhow::Result;
use app_extract::utils::validation::Validate;
use app_extract::{CliConfig, PullMode};
use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;

/// 命令列參數覆蓋 TOML 檔案中的設定
#[test]
fn test_cli_overrides_file_values() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("extract.toml");

    std::fs::write(
        &config_path,
        r#"
[endpoint]
host = "mac-mini.local"
port = 4723

[capabilities]
udid = "00008120-001608CE3C72201E"
xcode_org_id = "TEAM123456"
xcode_signing_id = "iPhone Developer"

[target]
bundle_id = "com.example.app"

[output]
path = "./from-file.ipa"
"#,
    )?;

    let cli = CliConfig::parse_from([
        "app-extract",
        "--config",
        config_path.to_str().unwrap(),
        "--host",
        "127.0.0.1",
        "--output",
        "./from-cli.ipa",
        "--timeout",
        "45",
        "--create-dirs",
    ]);

    let config = cli.resolve()?;
    config.validate()?;

    assert_eq!(config.endpoint.base_url(), "http://127.0.0.1:4723/wd/hub");
    assert_eq!(config.output_path, PathBuf::from("./from-cli.ipa"));
    assert_eq!(config.timeout_seconds, Some(45));
    assert!(config.output.create_dirs);
    assert_eq!(config.bundle_id, "com.example.app");
    assert_eq!(
        config.capabilities.xcode_org_id.as_deref(),
        Some("TEAM123456")
    );
    Ok(())
}

#[test]
fn test_folder_flags() -> Result<()> {
    let cli = CliConfig::parse_from([
        "app-extract",
        "--bundle-id",
        "com.example.app",
        "--remote-path",
        "data/Library/",
        "--output",
        "./library",
        "--folder",
        "--unpack",
    ]);

    let config = cli.resolve()?;
    config.validate()?;

    assert_eq!(config.pull_mode, PullMode::Folder);
    assert!(config.unpack);
    assert_eq!(config.remote_path, "data/Library/");
    Ok(())
}

#[test]
fn test_unpack_without_folder_fails_validation() -> Result<()> {
    let cli = CliConfig::parse_from([
        "app-extract",
        "--bundle-id",
        "com.example.app",
        "--output",
        "./app",
        "--unpack",
    ]);

    let config = cli.resolve()?;
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_missing_config_file_is_reported() {
    let cli = CliConfig::parse_from([
        "app-extract",
        "--config",
        "/nonexistent/extract.toml",
    ]);

    let err = cli.resolve().unwrap_err();
    assert!(err.to_string().contains("/nonexistent/extract.toml"));
}

/// [[apps]] 批次：--bundle-id 改為單一 App，--log-dir 覆蓋 [logging]
#[test]
fn test_apps_file_with_cli_overrides() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("apps.toml");

    std::fs::write(
        &config_path,
        r#"
[output]
path = "./ipas"

[logging]
dir = "./logs"

[[apps]]
name = "solflare"
bundleId = "com.solflare.mobile"

[[apps]]
name = "galxe"
bundleId = "com.galxe.app"
"#,
    )?;
    let config_arg = config_path.to_str().unwrap();

    let batch = CliConfig::parse_from(["app-extract", "--config", config_arg]).load()?;
    assert_eq!(batch.logging.dir.as_deref(), Some("./logs"));
    let names: Vec<String> = batch.into_jobs()?.into_iter().map(|job| job.name).collect();
    assert_eq!(names, vec!["solflare", "galxe"]);

    // 批次設定不能當作單一 App 解析
    let cli = CliConfig::parse_from(["app-extract", "--config", config_arg]);
    assert!(cli.resolve().is_err());

    let single = CliConfig::parse_from([
        "app-extract",
        "--config",
        config_arg,
        "--bundle-id",
        "com.example.app",
        "--output",
        "./app.ipa",
        "--log-dir",
        "/var/log/app-extract",
    ])
    .load()?;
    assert_eq!(single.logging.dir.as_deref(), Some("/var/log/app-extract"));

    let jobs = single.into_jobs()?;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].config.bundle_id, "com.example.app");
    assert_eq!(jobs[0].config.output_path, PathBuf::from("./app.ipa"));
    Ok(())
}
