use anyhow::Context;
use clap::Parser;
use serial_csv_logger::config::Command;
use serial_csv_logger::utils::error::ErrorSeverity;
use serial_csv_logger::utils::validation::{validate_required_field, Validate};
use serial_csv_logger::utils::logger;
use serial_csv_logger::{
    AppConfig, CaptureEngine, CaptureTarget, CliConfig, LocalStorage, LoggerError, SerialPortApi,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => AppConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    if cli.log_json || config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli, &config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            command_name(&cli.command),
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Listen { .. } => "listen",
        Command::Record(_) => "record",
        Command::Write { .. } => "write",
        Command::Read { .. } => "read",
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn target(config: &AppConfig) -> serial_csv_logger::Result<CaptureTarget> {
    Ok(CaptureTarget {
        uri: validate_required_field("output.directory", &config.output.directory)?.clone(),
        file_name: validate_required_field("output.file_name", &config.output.file_name)?.clone(),
    })
}

async fn run(cli: &CliConfig, config: &AppConfig) -> Result<(), LoggerError> {
    let api = SerialPortApi::with_settings(LocalStorage::new(), config.reader.settings);

    match &cli.command {
        Command::Listen { .. } => {
            let device = validate_required_field("reader.device", &config.reader.device)?;

            api.on_data_received(|event| match serde_json::to_string(event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to serialize event: {}", e),
            });
            api.start_reading(device)?;

            tokio::select! {
                _ = shutdown_signal() => api.stop_reading(),
                stats = api.join_reader() => {
                    if let Some(stats) = stats? {
                        tracing::info!("📊 Reader finished: {:?}", stats);
                    }
                }
            }
            api.remove_all_listeners();
        }
        Command::Record(_) => {
            let device = validate_required_field("reader.device", &config.reader.device)?;
            let target = target(config)?;

            let engine = CaptureEngine::new(api, config.capture.clone());
            let summary = engine.run(device, &target, shutdown_signal()).await?;

            println!("✅ Capture completed!");
            println!("📁 Output saved to: {}", summary.output);
            println!(
                "📊 {} events received, {} records written, {} skipped",
                summary.events_received, summary.records_written, summary.skipped_events
            );
        }
        Command::Write { data, .. } => {
            let target = target(config)?;
            let message = api.write_to_csv(&target.uri, &target.file_name, data).await?;
            println!("✅ {}", message);
        }
        Command::Read { .. } => {
            let target = target(config)?;
            let records = api.read_from_csv(&target.uri, &target.file_name).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
