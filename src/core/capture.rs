use crate::core::api::SerialPortApi;
use crate::core::csv_store::parse_object;
use crate::domain::model::{CaptureSummary, DataEvent, Record};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// 緩衝多少筆後寫入
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub max_records: Option<usize>,
    /// 設定後每列會多一欄接收時間 (RFC 3339)
    pub timestamp_column: Option<String>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            batch_size: 1,
            flush_interval_ms: 1000,
            max_records: None,
            timestamp_column: None,
        }
    }
}

/// Destination document of a capture run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    pub uri: String,
    pub file_name: String,
}

/// Serial-to-CSV logging pipeline: listens on `onDataReceived`, buffers the
/// cleaned payloads and appends them to a CSV document in batches.
pub struct CaptureEngine<S: Storage> {
    api: SerialPortApi<S>,
    settings: CaptureSettings,
}

struct CaptureState {
    buffer: Vec<Record>,
    summary: CaptureSummary,
}

impl<S: Storage> CaptureEngine<S> {
    pub fn new(api: SerialPortApi<S>, settings: CaptureSettings) -> Self {
        Self { api, settings }
    }

    pub fn api(&self) -> &SerialPortApi<S> {
        &self.api
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// 執行擷取直到 shutdown、達到 max_records 或讀取器停止
    pub async fn run<F>(
        &self,
        device: &str,
        target: &CaptureTarget,
        shutdown: F,
    ) -> Result<CaptureSummary>
    where
        F: Future<Output = ()>,
    {
        let output = self.api.storage().locate(&target.uri, &target.file_name)?;
        tracing::info!("🚀 Capturing {} -> {}", device, output);

        let (tx, mut rx) = mpsc::unbounded_channel::<DataEvent>();
        let subscription = self.api.on_data_received(move |event| {
            let _ = tx.send(event.clone());
        });

        if let Err(e) = self.api.start_reading(device) {
            subscription.remove();
            return Err(e);
        }

        let mut state = CaptureState {
            buffer: Vec::with_capacity(self.settings.batch_size.max(1)),
            summary: CaptureSummary {
                output,
                ..Default::default()
            },
        };

        let outcome = self.capture_loop(&mut rx, &mut state, target, shutdown).await;

        self.api.stop_reading();
        subscription.remove();
        outcome?;

        // 停止後仍在通道中的事件
        while let Ok(event) = rx.try_recv() {
            self.accept(event, &mut state);
        }
        self.flush(&mut state, target).await?;

        let summary = state.summary;
        tracing::info!(
            "✅ Capture finished: {} events, {} records written in {} batches, {} skipped",
            summary.events_received,
            summary.records_written,
            summary.batches_flushed,
            summary.skipped_events
        );
        Ok(summary)
    }

    async fn capture_loop<F>(
        &self,
        rx: &mut mpsc::UnboundedReceiver<DataEvent>,
        state: &mut CaptureState,
        target: &CaptureTarget,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let batch_size = self.settings.batch_size.max(1);
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.settings.flush_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("🛑 Shutdown requested");
                    return Ok(());
                }
                Some(event) = rx.recv() => {
                    self.accept(event, state);
                    if state.buffer.len() >= batch_size {
                        self.flush(state, target).await?;
                    }
                }
                _ = ticker.tick() => {
                    if !self.api.is_reading() {
                        tracing::info!("Reader stopped, finishing capture");
                        return Ok(());
                    }
                    self.flush(state, target).await?;
                }
            }

            if self.limit_reached(state) {
                tracing::info!("Reached max_records limit");
                return Ok(());
            }
        }
    }

    fn limit_reached(&self, state: &CaptureState) -> bool {
        match self.settings.max_records {
            Some(max) => state.summary.records_written + state.buffer.len() >= max,
            None => false,
        }
    }

    fn accept(&self, event: DataEvent, state: &mut CaptureState) {
        state.summary.events_received += 1;

        if self.limit_reached(state) {
            state.summary.skipped_events += 1;
            return;
        }

        let Some(payload) = event.data.as_deref() else {
            tracing::debug!("Chunk of {} bytes had no JSON object", event.bytes);
            state.summary.skipped_events += 1;
            return;
        };

        match parse_object(payload) {
            Ok(record) => state.buffer.push(self.stamp(record, &event)),
            Err(e) => {
                tracing::warn!("⚠️ Skipping payload {}: {}", payload, e);
                state.summary.skipped_events += 1;
            }
        }
    }

    fn stamp(&self, record: Record, event: &DataEvent) -> Record {
        let Some(column) = &self.settings.timestamp_column else {
            return record;
        };

        let mut data = serde_json::Map::with_capacity(record.data.len() + 1);
        data.insert(
            column.clone(),
            serde_json::Value::String(event.received_at.to_rfc3339()),
        );
        for (key, value) in record.data {
            // 同名欄位以裝置資料為準
            data.insert(key, value);
        }
        Record::new(data)
    }

    async fn flush(&self, state: &mut CaptureState, target: &CaptureTarget) -> Result<()> {
        if state.buffer.is_empty() {
            return Ok(());
        }

        let written = self
            .api
            .csv()
            .append_records(&target.uri, &target.file_name, &state.buffer)
            .await?;
        state.summary.records_written += written;
        state.summary.batches_flushed += 1;
        state.buffer.clear();

        tracing::debug!("Flushed {} record(s) to {}", written, state.summary.output);
        Ok(())
    }
}
