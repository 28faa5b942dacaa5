use crate::core::cleaner::clean_data;
use crate::core::events::{EventEmitter, DATA_RECEIVED};
use crate::domain::model::{DataEvent, ReadStats, StopReason};
use crate::utils::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// 每次 read 的緩衝區大小
    pub buffer_size: usize,
    /// 小於或等於此長度的區塊視為雜訊並忽略
    pub min_chunk_len: usize,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            min_chunk_len: 10,
        }
    }
}

// 執行緒結束前一直保留，start_reading 以此判斷是否仍在讀取
struct ActiveRead {
    path: String,
    handle: JoinHandle<()>,
    finished: watch::Receiver<Option<ReadStats>>,
}

/// Reads a serial device file on a dedicated thread and emits
/// `onDataReceived` for every chunk large enough to carry a message.
pub struct SerialReader {
    emitter: EventEmitter,
    settings: ReaderSettings,
    keep_reading: Arc<AtomicBool>,
    active: Mutex<Option<ActiveRead>>,
}

impl SerialReader {
    pub fn new(emitter: EventEmitter, settings: ReaderSettings) -> Self {
        Self {
            emitter,
            settings,
            keep_reading: Arc::new(AtomicBool::new(false)),
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> ReaderSettings {
        self.settings
    }

    pub fn is_reading(&self) -> bool {
        self.keep_reading.load(Ordering::SeqCst)
    }

    pub fn start_reading(&self, file_path: &str) -> Result<()> {
        let device = Path::new(file_path);
        if !device.exists() {
            tracing::warn!("Device file not found: {}", file_path);
            return Err(LoggerError::DeviceNotFound {
                path: file_path.to_string(),
            });
        }

        let mut active = self.active.lock().map_err(|e| LoggerError::ReaderError {
            message: format!("Failed to lock reader state: {}", e),
        })?;

        if let Some(current) = active.as_ref() {
            let finished =
                current.finished.borrow().is_some() || current.handle.is_finished();
            if !finished {
                return Err(LoggerError::AlreadyReading {
                    path: current.path.clone(),
                });
            }
        }
        // 上一次的讀取已結束，回收執行緒
        if let Some(previous) = active.take() {
            let _ = previous.handle.join();
        }

        let file = File::open(device)?;
        self.keep_reading.store(true, Ordering::SeqCst);

        let keep_reading = self.keep_reading.clone();
        let emitter = self.emitter.clone();
        let settings = self.settings;
        let path = file_path.to_string();
        let (finished_tx, finished) = watch::channel(None);

        let handle = std::thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || {
                let stats = run_read_loop(file, path, settings, keep_reading, emitter);
                finished_tx.send_replace(Some(stats));
            })
            .map_err(|e| {
                self.keep_reading.store(false, Ordering::SeqCst);
                LoggerError::ReaderError {
                    message: format!("Failed to spawn reader thread: {}", e),
                }
            })?;

        tracing::info!("📡 Reading from {}", file_path);
        *active = Some(ActiveRead {
            path: file_path.to_string(),
            handle,
            finished,
        });
        Ok(())
    }

    /// 停止旗標；執行緒在目前的 read 返回後結束
    pub fn stop_reading(&self) {
        self.keep_reading.store(false, Ordering::SeqCst);
    }

    /// Waits for the read loop to finish and returns its stats. `None` when
    /// nothing was started. Dropping the future leaves the reader untouched.
    pub async fn join(&self) -> Result<Option<ReadStats>> {
        let mut finished = {
            let guard = self.active.lock().map_err(|e| LoggerError::ReaderError {
                message: format!("Failed to lock reader state: {}", e),
            })?;
            match guard.as_ref() {
                Some(active) => active.finished.clone(),
                None => return Ok(None),
            }
        };

        // sender 在送出結果前被丟棄代表執行緒 panic
        let stats = finished
            .wait_for(Option::is_some)
            .await
            .map_err(|_| LoggerError::ReaderError {
                message: "Reader thread panicked".to_string(),
            })?;

        Ok((*stats).clone())
    }
}

fn run_read_loop<R: Read>(
    mut source: R,
    path: String,
    settings: ReaderSettings,
    keep_reading: Arc<AtomicBool>,
    emitter: EventEmitter,
) -> ReadStats {
    let mut buffer = vec![0u8; settings.buffer_size.max(1)];
    let mut stats = ReadStats {
        chunks_read: 0,
        bytes_read: 0,
        events_emitted: 0,
        ignored_chunks: 0,
        stop_reason: StopReason::Stopped,
    };

    while keep_reading.load(Ordering::SeqCst) {
        match source.read(&mut buffer) {
            Ok(0) => {
                tracing::info!("End of stream reached on {}, stopping reader", path);
                stats.stop_reason = StopReason::EndOfStream;
                keep_reading.store(false, Ordering::SeqCst);
            }
            Ok(n) => {
                stats.chunks_read += 1;
                stats.bytes_read += n as u64;

                if n <= settings.min_chunk_len {
                    stats.ignored_chunks += 1;
                    continue;
                }

                let received = String::from_utf8_lossy(&buffer[..n]);
                tracing::debug!("Received: {}", received);

                let event = DataEvent::new(clean_data(&received), n);
                emitter.emit(DATA_RECEIVED, &event);
                stats.events_emitted += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::error!("Error reading serial data from {}: {}", path, e);
                stats.stop_reason = StopReason::ReadError(e.to_string());
                keep_reading.store(false, Ordering::SeqCst);
            }
        }
    }

    tracing::info!(
        "Stopped reading from {} ({} chunks, {} events, {} ignored)",
        path,
        stats.chunks_read,
        stats.events_emitted,
        stats.ignored_chunks
    );
    stats
}
