use anyhow::Result;
use app_extract::core::codec::encode_payload;
use app_extract::{extract, EndpointConfig, ExtractConfig, ExtractError, PullMode};
use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::TempDir;

const SESSION_ID: &str = "8d6d5f4e-session";

fn config_for(server: &MockServer, output: &std::path::Path) -> ExtractConfig {
    let mut config = ExtractConfig::new("com.example.app", output);
    config.endpoint = EndpointConfig {
        host: server.host(),
        port: server.port(),
        ..EndpointConfig::default()
    };
    config.timeout_seconds = Some(10);
    config
}

fn mock_session(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
    let create = server.mock(|when, then| {
        when.method(POST).path("/wd/hub/session");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "value": {
                    "sessionId": SESSION_ID,
                    "capabilities": {"platformName": "iOS", "automationName": "XCUITest"}
                }
            }));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path(format!("/wd/hub/session/{}", SESSION_ID));
        then.status(200).json_body(json!({"value": null}));
    });
    (create, delete)
}

#[tokio::test]
async fn test_extract_writes_zip_header_bytes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("app.ipa");

    let server = MockServer::start();
    let (create, delete) = mock_session(&server);
    let pull = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/wd/hub/session/{}/appium/device/pull_file", SESSION_ID))
            .json_body(json!({"path": "@com.example.app:app/"}));
        then.status(200)
            .json_body(json!({"value": encode_payload(&[0x50, 0x4B, 0x03, 0x04])}));
    });

    let report = extract(&config_for(&server, &output)).await?;

    create.assert();
    pull.assert();
    delete.assert();
    assert_eq!(std::fs::read(&output)?, vec![0x50, 0x4B, 0x03, 0x04]);
    assert_eq!(report.bytes_written, 4);
    assert_eq!(report.session_id, SESSION_ID);
    assert_eq!(report.output_path, output);
    Ok(())
}

#[tokio::test]
async fn test_privilege_error_is_reported_and_session_closed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("app.ipa");

    let server = MockServer::start();
    let (_create, delete) = mock_session(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path(format!("/wd/hub/session/{}/appium/device/pull_file", SESSION_ID));
        then.status(500).json_body(json!({
            "value": {"error": "unknown error", "message": "privilege denied"}
        }));
    });

    let err = extract(&config_for(&server, &output)).await.unwrap_err();

    assert!(err.is_retrieval_failure());
    assert!(err.to_string().contains("privilege denied"));
    delete.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_session_open_failure_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("app.ipa");

    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/wd/hub/session");
        then.status(500).json_body(json!({
            "value": {
                "error": "session not created",
                "message": "Could not find a connected device"
            }
        }));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE);
        then.status(200).json_body(json!({"value": null}));
    });

    let err = extract(&config_for(&server, &output)).await.unwrap_err();

    create.assert();
    delete.assert_hits(0);
    assert!(matches!(err, ExtractError::Connection { .. }));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("app.ipa");

    // 取得一個沒有人監聽的埠
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };

    let mut config = ExtractConfig::new("com.example.app", &output);
    config.endpoint.host = "127.0.0.1".to_string();
    config.endpoint.port = port;
    config.timeout_seconds = Some(5);

    let err = extract(&config).await.unwrap_err();

    assert!(matches!(err, ExtractError::Connection { .. }));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_folder_pull_unpacks_into_directory() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("Documents");

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("wallet.db", zip::write::SimpleFileOptions::default())?;
    zip.write_all(b"SQLite format 3\0")?;
    let archive = zip.finish()?.into_inner();

    let server = MockServer::start();
    let (_create, delete) = mock_session(&server);
    let pull = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/wd/hub/session/{}/appium/device/pull_folder", SESSION_ID))
            .json_body(json!({"path": "@com.example.app:data/Documents/"}));
        then.status(200).json_body(json!({"value": encode_payload(&archive)}));
    });

    let mut config = config_for(&server, &output);
    config.remote_path = "data/Documents/".to_string();
    config.pull_mode = PullMode::Folder;
    config.unpack = true;

    let report = extract(&config).await?;

    pull.assert();
    delete.assert();
    assert_eq!(report.unpacked_entries, Some(1));
    assert_eq!(std::fs::read(output.join("wallet.db"))?, b"SQLite format 3\0");
    Ok(())
}

#[tokio::test]
async fn test_no_clobber_keeps_existing_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("app.ipa");
    std::fs::write(&output, b"previous run")?;

    let server = MockServer::start();
    let (_create, delete) = mock_session(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path(format!("/wd/hub/session/{}/appium/device/pull_file", SESSION_ID));
        then.status(200).json_body(json!({"value": encode_payload(b"fresh bytes")}));
    });

    let mut config = config_for(&server, &output);
    config.output.overwrite = false;

    let err = extract(&config).await.unwrap_err();

    assert!(matches!(err, ExtractError::Output { .. }));
    delete.assert_hits(1);
    assert_eq!(std::fs::read(&output)?, b"previous run");
    Ok(())
}

#[tokio::test]
async fn test_apps_table_extracts_each_app() -> Result<()> {
    use app_extract::config::toml_config::TomlConfig;
    use app_extract::extract_apps;

    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let (create, delete) = mock_session(&server);
    let pull_solflare = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/wd/hub/session/{}/appium/device/pull_file", SESSION_ID))
            .json_body(json!({"path": "@com.solflare.mobile:app/"}));
        then.status(200)
            .json_body(json!({"value": encode_payload(b"solflare-ipa")}));
    });
    let pull_galxe = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/wd/hub/session/{}/appium/device/pull_file", SESSION_ID))
            .json_body(json!({"path": "@com.galxe.app:app/"}));
        then.status(500).json_body(json!({
            "value": {"error": "unknown error", "message": "privilege denied"}
        }));
    });

    let toml_content = format!(
        r#"
timeout_seconds = 10

[endpoint]
host = "{host}"
port = {port}

[output]
path = '{dir}'

[[apps]]
name = "solflare"
bundle_id = "com.solflare.mobile"

[[apps]]
name = "galxe"
bundle_id = "com.galxe.app"
"#,
        host = server.host(),
        port = server.port(),
        dir = temp_dir.path().display(),
    );
    let jobs = TomlConfig::from_toml_str(&toml_content)?.into_jobs()?;

    let outcomes = extract_apps(&jobs).await?;

    create.assert_hits(2);
    delete.assert_hits(2);
    pull_solflare.assert();
    pull_galxe.assert();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].name, "solflare");
    assert!(outcomes[0].result.is_ok());
    assert_eq!(
        std::fs::read(temp_dir.path().join("solflare.ipa"))?,
        b"solflare-ipa"
    );

    assert_eq!(outcomes[1].name, "galxe");
    assert!(matches!(
        outcomes[1].result,
        Err(ExtractError::Retrieval { .. })
    ));
    assert!(!temp_dir.path().join("galxe.ipa").exists());
    Ok(())
}
