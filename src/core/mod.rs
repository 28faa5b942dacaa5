pub mod api;
pub mod capture;
pub mod cleaner;
pub mod csv_store;
pub mod events;
pub mod reader;

pub use crate::domain::model::{CaptureSummary, DataEvent, ReadStats, Record, StopReason};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
