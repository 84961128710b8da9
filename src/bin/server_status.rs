use app_extract::config::toml_config::TomlConfig;
use app_extract::core::AutomationClient;
use app_extract::utils::logger;
use app_extract::{EndpointConfig, WebDriverClient};

/// 檢查 Appium 伺服器是否可以接受新的 session
#[tokio::main]
async fn main() {
    logger::init_cli_logger(false, false, None);

    // 可選參數：TOML 配置檔路徑
    let endpoint = match std::env::args().nth(1) {
        Some(path) => match TomlConfig::from_file(&path) {
            Ok(config) => config.endpoint,
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        },
        None => EndpointConfig::default(),
    };

    let client = match WebDriverClient::new(&endpoint, Some(10)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!("📡 Checking {}", client.base_url());

    match client.status().await {
        Ok(status) if status.ready => {
            println!(
                "✅ Server ready{}",
                status
                    .version
                    .map(|v| format!(" (Appium {})", v))
                    .unwrap_or_default()
            );
            if !status.message.is_empty() {
                println!("   {}", status.message);
            }
        }
        Ok(status) => {
            eprintln!("⚠️ Server is up but not ready: {}", status.message);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
