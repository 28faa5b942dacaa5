use crate::domain::ports::Storage;
use crate::utils::error::{LoggerError, Result};
use crate::utils::validation::validate_file_name;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Storage over the local filesystem. `uri` is a directory path or a
/// `file://` URL; documents are created under it on first write.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// 相對路徑的 uri 會以 base_path 為根
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    pub fn resolve(&self, uri: &str, file_name: &str) -> Result<PathBuf> {
        let document_error = |reason: String| LoggerError::DocumentError {
            uri: uri.to_string(),
            file_name: file_name.to_string(),
            reason,
        };

        validate_file_name("file_name", file_name).map_err(|e| document_error(e.to_string()))?;

        if uri.trim().is_empty() {
            return Err(document_error("directory URI cannot be empty".to_string()));
        }

        let directory = match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| document_error("file URL has no local path".to_string()))?,
            // Windows 磁碟代號會被解析成單字母 scheme
            Ok(url) if url.scheme().len() > 1 => {
                return Err(document_error(format!(
                    "Unsupported URI scheme: {}",
                    url.scheme()
                )))
            }
            _ => PathBuf::from(uri),
        };

        let directory = match &self.base_path {
            Some(base) if directory.is_relative() => base.join(directory),
            _ => directory,
        };

        Ok(directory.join(file_name))
    }
}

impl Storage for LocalStorage {
    fn locate(&self, uri: &str, file_name: &str) -> Result<String> {
        Ok(self.resolve(uri, file_name)?.display().to_string())
    }

    async fn file_size(&self, uri: &str, file_name: &str) -> Result<Option<u64>> {
        let path = self.resolve(uri, file_name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_file(&self, uri: &str, file_name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(uri, file_name)?;
        let data = tokio::fs::read(path).await?;
        Ok(data)
    }

    async fn append_file(&self, uri: &str, file_name: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(uri, file_name)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}
