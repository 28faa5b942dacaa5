use crate::config::toml_config::AppConfig;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "serial-csv-logger")]
#[command(about = "Read JSON messages from a serial device and log them to CSV")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every onDataReceived event as a JSON line
    Listen {
        #[arg(long)]
        device: Option<String>,
    },

    /// Capture device data into a CSV document
    Record(RecordArgs),

    /// Append one JSON object to a CSV document
    Write {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(long)]
        data: String,
    },

    /// Print a CSV document as a JSON array
    Read {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Directory path or file:// URI
    #[arg(long)]
    pub dir: Option<String>,

    #[arg(long)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RecordArgs {
    #[arg(long)]
    pub device: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub flush_ms: Option<u64>,

    #[arg(long)]
    pub max_records: Option<usize>,

    #[arg(long)]
    pub timestamp_column: Option<String>,
}

impl CliConfig {
    /// 命令列參數覆蓋檔案中的設定
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        match &self.command {
            Command::Listen { device } => {
                if let Some(device) = device {
                    config.reader.device = Some(device.clone());
                }
            }
            Command::Record(args) => {
                if let Some(device) = &args.device {
                    config.reader.device = Some(device.clone());
                }
                args.target.apply(config);
                if let Some(batch_size) = args.batch_size {
                    config.capture.batch_size = batch_size;
                }
                if let Some(flush_ms) = args.flush_ms {
                    config.capture.flush_interval_ms = flush_ms;
                }
                if let Some(max_records) = args.max_records {
                    config.capture.max_records = Some(max_records);
                }
                if let Some(column) = &args.timestamp_column {
                    config.capture.timestamp_column = Some(column.clone());
                }
            }
            Command::Write { target, .. } | Command::Read { target } => target.apply(config),
        }
    }
}

impl TargetArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.dir {
            config.output.directory = Some(dir.clone());
        }
        if let Some(file) = &self.file {
            config.output.file_name = Some(file.clone());
        }
    }
}
