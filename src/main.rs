use anyhow::Context;
use app_extract::utils::{logger, validation::Validate};
use app_extract::{extract_apps, AppJob, CliConfig, ExtractConfig, PullMode};
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 先讀配置，才知道日誌目錄與 App 名稱
    let file_config = cli.load();
    let log_dir = match &file_config {
        Ok(config) => config.logging.dir.clone(),
        Err(_) => cli.log_dir.clone(),
    };
    let jobs = file_config.and_then(|config| {
        let jobs = config.into_jobs()?;
        for job in &jobs {
            job.config.validate()?;
        }
        Ok(jobs)
    });

    // 初始化日誌
    let app_name = match &jobs {
        Ok(jobs) if jobs.len() == 1 => Some(jobs[0].name.as_str()),
        _ => None,
    };
    let log_file = match &log_dir {
        Some(dir) => match logger::open_log_file(Path::new(dir), app_name) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("⚠️ Cannot open log file in {}: {}", dir, e);
                None
            }
        },
        None => None,
    };
    let log_path = log_file.as_ref().map(|file| file.path.clone());
    logger::init_cli_logger(cli.verbose, cli.log_json, log_file);

    tracing::info!("Starting app-extract");
    if let Some(path) = &log_path {
        tracing::info!("📝 Logging initialized. Log file: {}", path.display());
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let jobs = match jobs {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    for job in &jobs {
        display_config_summary(job);
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the automation server will not be contacted");
        if let Some(job) = jobs.first() {
            let caps = serde_json::to_string_pretty(&job.config.capabilities.to_w3c())
                .context("failed to render capabilities")?;
            println!("📡 Session capabilities (alwaysMatch):");
            println!("{}", caps);
        }
        return Ok(());
    }

    let outcomes = match extract_apps(&jobs).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            tracing::error!("❌ Cannot build automation client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                println!("✅ [{}] App data extracted successfully!", outcome.name);
                println!("📁 Output saved to: {}", report.output_path.display());
                if let Some(entries) = report.unpacked_entries {
                    println!("📦 Unpacked {} entries", entries);
                }
                if cli.verbose {
                    let json = serde_json::to_string_pretty(report)
                        .context("failed to render extraction report")?;
                    println!("{}", json);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::error!(
                    "❌ [{}] Extraction failed: {} (Category: {:?})",
                    outcome.name,
                    e,
                    e.category()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

                eprintln!(
                    "❌ [{}] Failed to extract app: {}",
                    outcome.name,
                    e.user_friendly_message()
                );
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            }
        }
    }

    if outcomes.len() > 1 {
        println!();
        println!(
            "📊 {} succeeded, {} failed",
            outcomes.len() - failed,
            failed
        );
    }
    if let Some(path) = &log_path {
        println!("📝 Log file: {}", path.display());
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn display_config_summary(job: &AppJob) {
    let config: &ExtractConfig = &job.config;
    println!("📋 Configuration Summary ({}):", job.name);
    println!("  Server: {}", config.endpoint.base_url());
    println!(
        "  Device: {} / {} (udid: {})",
        config.capabilities.platform_name,
        config.capabilities.automation_name,
        config.capabilities.udid.as_deref().unwrap_or("unset")
    );
    println!("  Bundle: {}", config.bundle_id);
    println!("  Remote path: {}", config.remote_path);
    match config.pull_mode {
        PullMode::File => println!("  Mode: file"),
        PullMode::Folder if config.unpack => println!("  Mode: folder (unpacked)"),
        PullMode::Folder => println!("  Mode: folder (zip)"),
    }
    println!("  Output: {}", config.output_path.display());
    if !config.output.overwrite {
        println!("  Overwrite: disabled");
    }
    if let Some(timeout) = config.timeout_seconds {
        println!("  Timeout: {}s", timeout);
    }
    println!();
}
