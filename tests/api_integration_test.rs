use anyhow::Result;
use serial_csv_logger::{
    DataEvent, LocalStorage, LoggerError, ReaderSettings, SerialPortApi, StopReason,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_test::assert_ok;

fn collect_events(api: &SerialPortApi<LocalStorage>) -> Arc<Mutex<Vec<DataEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    api.on_data_received(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

/// 測試寫入後讀回，使用 file:// URI
#[tokio::test]
async fn test_write_then_read_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let uri = format!("file://{}", temp_dir.path().display());
    let api = SerialPortApi::new(LocalStorage::new());

    let message = api
        .write_to_csv(&uri, "readings.csv", r#"{"sensor":"t1","temp":21.5}"#)
        .await?;
    assert_eq!(message, format!("CSV written successfully to: {}", uri));

    assert_ok!(
        api.write_to_csv(&uri, "readings.csv", r#"{"sensor":"t2","temp":19}"#)
            .await
    );

    let on_disk = std::fs::read_to_string(temp_dir.path().join("readings.csv"))?;
    assert_eq!(on_disk, "sensor,temp\nt1,21.5\nt2,19\n");

    let records = api.read_from_csv(&uri, "readings.csv").await?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get_str("sensor"), Some("t2"));
    assert_eq!(records[1].get_str("temp"), Some("19"));

    Ok(())
}

/// 測試讀取不存在的文件回傳空陣列，且不會建立文件
#[tokio::test]
async fn test_read_missing_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let uri = temp_dir.path().display().to_string();
    let api = SerialPortApi::new(LocalStorage::new());

    let records = api.read_from_csv(&uri, "missing.csv").await?;
    assert!(records.is_empty());
    assert!(!temp_dir.path().join("missing.csv").exists());

    Ok(())
}

#[tokio::test]
async fn test_write_rejects_non_object() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let uri = temp_dir.path().display().to_string();
    let api = SerialPortApi::new(LocalStorage::new());

    let err = api.write_to_csv(&uri, "readings.csv", "42").await.unwrap_err();
    assert!(matches!(err, LoggerError::InvalidPayload { .. }));
    assert!(!temp_dir.path().join("readings.csv").exists());

    Ok(())
}

/// 測試從裝置檔讀取直到 EOF
#[tokio::test]
async fn test_reading_device_file_until_eof() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let device = temp_dir.path().join("ttyFAKE0");
    std::fs::write(&device, "boot\r\n{\"seq\":1}\r\n{\"seq\":2,\"temp\":20.25}\r\n")?;

    let api = SerialPortApi::new(LocalStorage::new());
    let events = collect_events(&api);

    api.start_reading(&device.display().to_string())?;
    let stats = api.join_reader().await?.expect("reader was started");

    assert_eq!(stats.stop_reason, StopReason::EndOfStream);
    assert!(!api.is_reading());

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data.as_deref(), Some("{\"seq\":2,\"temp\":20.25}"));

    Ok(())
}

#[tokio::test]
async fn test_small_chunks_are_ignored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let device = temp_dir.path().join("ttyFAKE1");
    std::fs::write(&device, "{\"a\":1}")?;

    let api = SerialPortApi::new(LocalStorage::new());
    let events = collect_events(&api);

    api.start_reading(&device.display().to_string())?;
    let stats = api.join_reader().await?.expect("reader was started");

    assert_eq!(stats.ignored_chunks, 1);
    assert_eq!(stats.events_emitted, 0);
    assert!(events.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_start_reading_missing_device() {
    let api = SerialPortApi::new(LocalStorage::new());

    let err = api.start_reading("/no/such/ttyUSB7").unwrap_err();
    assert!(matches!(err, LoggerError::DeviceNotFound { .. }));
    assert!(api.join_reader().await.unwrap().is_none());
}

#[tokio::test]
async fn test_removed_listeners_receive_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let device = temp_dir.path().join("ttyFAKE2");
    std::fs::write(&device, "{\"seq\":1,\"temp\":20}")?;

    let api = SerialPortApi::new(LocalStorage::new());
    let kept = collect_events(&api);

    let dropped = Arc::new(Mutex::new(Vec::new()));
    let sink = dropped.clone();
    let subscription =
        api.on_data_received(move |event: &DataEvent| sink.lock().unwrap().push(event.clone()));
    assert!(api.remove_listener(&subscription));

    api.start_reading(&device.display().to_string())?;
    api.join_reader().await?;

    assert_eq!(kept.lock().unwrap().len(), 1);
    assert!(dropped.lock().unwrap().is_empty());
    assert_eq!(api.remove_all_listeners(), 1);

    Ok(())
}

/// /dev/zero 永遠有資料，可用來測試停止與重複啟動
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_stop_reading_endless_device() -> Result<()> {
    let api = SerialPortApi::with_settings(LocalStorage::new(), ReaderSettings::default());
    let events = collect_events(&api);

    api.start_reading("/dev/zero")?;
    let err = api.start_reading("/dev/zero").unwrap_err();
    assert!(matches!(err, LoggerError::AlreadyReading { .. }));

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    api.stop_reading();
    let stats = api.join_reader().await?.expect("reader was started");

    assert_eq!(stats.stop_reason, StopReason::Stopped);
    assert!(stats.events_emitted > 0);
    assert!(events.lock().unwrap().iter().all(|e| e.data.is_none()));

    // 停止後可以再次啟動
    api.start_reading("/dev/zero")?;
    api.stop_reading();
    assert!(api.join_reader().await?.is_some());

    Ok(())
}

/// 讀取執行緒阻塞在 read 時，被取消的 join 不可讓第二個讀取迴圈啟動
#[cfg(unix)]
#[tokio::test]
async fn test_cancelled_join_keeps_reader_exclusive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fifo = temp_dir.path().join("ttyFIFO0");
    let status = std::process::Command::new("mkfifo").arg(&fifo).status()?;
    assert!(status.success());

    // 寫端在讀端開啟前會阻塞，所以在另一個執行緒開啟
    let writer_path = fifo.clone();
    let writer = std::thread::spawn(move || {
        std::fs::OpenOptions::new().write(true).open(writer_path)
    });

    let api = SerialPortApi::new(LocalStorage::new());
    let device = fifo.display().to_string();
    api.start_reading(&device)?;
    let writer = writer.join().expect("writer thread")?;

    assert!(matches!(
        api.start_reading(&device),
        Err(LoggerError::AlreadyReading { .. })
    ));

    let waited =
        tokio::time::timeout(std::time::Duration::from_millis(50), api.join_reader()).await;
    assert!(waited.is_err());
    assert!(matches!(
        api.start_reading(&device),
        Err(LoggerError::AlreadyReading { .. })
    ));

    // 關閉寫端讓 read 回傳 EOF
    api.stop_reading();
    drop(writer);
    let stats = api.join_reader().await?.expect("reader was started");
    assert_eq!(stats.chunks_read, 0);
    assert!(!api.is_reading());

    // join 可重複呼叫，結果相同
    assert_eq!(api.join_reader().await?, Some(stats));

    Ok(())
}
