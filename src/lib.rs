pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::LocalStorage;
pub use self::core::{
    api::SerialPortApi,
    capture::{CaptureEngine, CaptureSettings, CaptureTarget},
    events::{EventEmitter, ListenerId, Subscription, DATA_RECEIVED},
    reader::{ReaderSettings, SerialReader},
};
pub use domain::model::{CaptureSummary, DataEvent, ReadStats, Record, StopReason};
pub use utils::error::{LoggerError, Result};
