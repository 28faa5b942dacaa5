use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `onDataReceived` 事件的內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEvent {
    /// 區塊中最後一個完整的 JSON 物件；找不到時為 None
    pub data: Option<String>,
    pub received_at: DateTime<Utc>,
    /// 原始區塊的位元組數
    pub bytes: usize,
}

impl DataEvent {
    pub fn new(data: Option<String>, bytes: usize) -> Self {
        Self {
            data,
            received_at: Utc::now(),
            bytes,
        }
    }
}

/// A CSV row keyed by column name, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// stop_reading() 被呼叫
    Stopped,
    EndOfStream,
    ReadError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    pub chunks_read: u64,
    pub bytes_read: u64,
    pub events_emitted: u64,
    pub ignored_chunks: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureSummary {
    pub events_received: usize,
    pub records_written: usize,
    pub skipped_events: usize,
    pub batches_flushed: usize,
    pub output: String,
}
