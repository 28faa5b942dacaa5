use crate::domain::model::Record;
use crate::domain::ports::Storage;
use crate::utils::error::{LoggerError, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// Appends JSON objects to CSV documents and reads them back.
pub struct CsvStore<S: Storage> {
    storage: S,
    // 已知的表頭，以文件路徑為鍵；同時序列化所有寫入
    headers: Mutex<HashMap<String, Vec<String>>>,
}

impl<S: Storage> CsvStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            headers: Mutex::new(HashMap::new()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 將單一 JSON 物件寫成一列，新檔案會先寫入表頭
    pub async fn write_to_csv(&self, uri: &str, file_name: &str, data: &str) -> Result<String> {
        let record = parse_object(data)?;
        self.append_records(uri, file_name, std::slice::from_ref(&record))
            .await?;
        Ok(format!("CSV written successfully to: {}", uri))
    }

    pub async fn append_records(
        &self,
        uri: &str,
        file_name: &str,
        records: &[Record],
    ) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let location = self.storage.locate(uri, file_name)?;
        let mut headers = self.headers.lock().await;

        let is_new_file = matches!(self.storage.file_size(uri, file_name).await?, None | Some(0));
        if is_new_file {
            headers.remove(&location);
        } else if !headers.contains_key(&location) {
            let existing = self.storage.read_file(uri, file_name).await?;
            headers.insert(location.clone(), read_header(&existing)?);
        }

        let header: Vec<String> = match headers.get(&location) {
            Some(header) if !header.is_empty() => header.clone(),
            _ => records[0].keys().cloned().collect(),
        };
        if header.is_empty() {
            return Err(LoggerError::InvalidPayload {
                reason: format!("cannot start {} with a record that has no columns", location),
            });
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());

        if is_new_file {
            writer.write_record(&header)?;
        }

        let header_set: HashSet<&str> = header.iter().map(String::as_str).collect();
        for record in records {
            let matches_header = record.data.len() == header.len()
                && record.keys().all(|k| header_set.contains(k.as_str()));

            let row: Vec<String> = if matches_header {
                header
                    .iter()
                    .map(|column| record.data.get(column).map(render_cell).unwrap_or_default())
                    .collect()
            } else {
                tracing::warn!(
                    "⚠️ Columns of record do not match header of {} ({:?}), writing in record order",
                    location,
                    header
                );
                record.data.values().map(render_cell).collect()
            };
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| LoggerError::ProcessingError {
                message: format!("Failed to flush CSV buffer: {}", e),
            })?;

        self.storage.append_file(uri, file_name, &bytes).await?;
        headers.insert(location.clone(), header);

        tracing::debug!("Appended {} row(s) to {}", records.len(), location);
        Ok(records.len())
    }

    /// 以第一列為表頭讀取 CSV；文件不存在時回傳空陣列
    pub async fn read_from_csv(&self, uri: &str, file_name: &str) -> Result<Vec<Record>> {
        if self.storage.file_size(uri, file_name).await?.unwrap_or(0) == 0 {
            return Ok(Vec::new());
        }

        let content = self.storage.read_file(uri, file_name).await?;
        parse_records(&content)
    }
}

/// Parses `data` as a single JSON object.
pub fn parse_object(data: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(map) if map.is_empty() => Err(LoggerError::InvalidPayload {
            reason: "expected at least one field, got an empty object".to_string(),
        }),
        Value::Object(map) => Ok(Record::new(map)),
        other => Err(LoggerError::InvalidPayload {
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// 字串原樣寫入，其餘使用 JSON 表示
fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_header(content: &[u8]) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

fn parse_records(content: &[u8]) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let mut data = serde_json::Map::new();
        for (index, column) in headers.iter().enumerate() {
            let cell = row.get(index).unwrap_or("");
            data.insert(column.to_string(), Value::String(cell.to_string()));
        }
        records.push(Record::new(data));
    }

    Ok(records)
}
