use crate::core::csv_store::CsvStore;
use crate::core::events::{EventEmitter, ListenerId, Subscription, DATA_RECEIVED};
use crate::core::reader::{ReaderSettings, SerialReader};
use crate::domain::model::{DataEvent, ReadStats, Record};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Entry point for applications: serial reading, CSV persistence and the
/// `onDataReceived` event channel behind one handle.
pub struct SerialPortApi<S: Storage> {
    emitter: EventEmitter,
    reader: SerialReader,
    csv: CsvStore<S>,
}

impl<S: Storage> SerialPortApi<S> {
    pub fn new(storage: S) -> Self {
        Self::with_settings(storage, ReaderSettings::default())
    }

    pub fn with_settings(storage: S, settings: ReaderSettings) -> Self {
        let emitter = EventEmitter::new();
        Self {
            reader: SerialReader::new(emitter.clone(), settings),
            csv: CsvStore::new(storage),
            emitter,
        }
    }

    pub fn start_reading(&self, file_path: &str) -> Result<()> {
        tracing::info!("Start reading from {}...", file_path);
        self.reader.start_reading(file_path)
    }

    pub fn stop_reading(&self) {
        tracing::info!("Stop reading...");
        self.reader.stop_reading();
    }

    pub fn is_reading(&self) -> bool {
        self.reader.is_reading()
    }

    /// 等待讀取執行緒結束
    pub async fn join_reader(&self) -> Result<Option<ReadStats>> {
        self.reader.join().await
    }

    pub async fn write_to_csv(&self, uri: &str, file_name: &str, data: &str) -> Result<String> {
        tracing::info!("Writing to file...");
        let message = self.csv.write_to_csv(uri, file_name, data).await?;
        tracing::info!("Successfully written to file...");
        Ok(message)
    }

    pub async fn read_from_csv(&self, uri: &str, file_name: &str) -> Result<Vec<Record>> {
        tracing::info!("Reading from CSV...");
        let records = self.csv.read_from_csv(uri, file_name).await?;
        tracing::info!("Successfully read from CSV...");
        Ok(records)
    }

    pub fn on_data_received<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DataEvent) + Send + Sync + 'static,
    {
        self.emitter.add_listener(DATA_RECEIVED, listener)
    }

    pub fn remove_listener(&self, subscription: &Subscription) -> bool {
        self.remove_listener_id(subscription.id())
    }

    pub fn remove_listener_id(&self, id: ListenerId) -> bool {
        self.emitter.remove_listener(DATA_RECEIVED, id)
    }

    pub fn remove_all_listeners(&self) -> usize {
        self.emitter.remove_all_listeners(DATA_RECEIVED)
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub fn csv(&self) -> &CsvStore<S> {
        &self.csv
    }

    pub fn storage(&self) -> &S {
        self.csv.storage()
    }
}
