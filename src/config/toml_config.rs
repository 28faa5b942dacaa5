use crate::core::capture::CaptureSettings;
use crate::core::reader::ReaderSettings;
use crate::utils::error::{LoggerError, Result};
use crate::utils::validation::{
    validate_file_name, validate_path, validate_positive_number, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reader: ReaderConfig,
    pub output: OutputConfig,
    pub capture: CaptureSettings,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub device: Option<String>,
    #[serde(flatten)]
    pub settings: ReaderSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 目錄路徑或 file:// URI
    pub directory: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| LoggerError::ConfigError {
                message: format!("Cannot read config file {}: {}", path.display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LoggerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SERIAL_DEVICE})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn device(&self) -> Option<&str> {
        self.reader.device.as_deref()
    }

    pub fn output_directory(&self) -> Option<&str> {
        self.output.directory.as_deref()
    }

    pub fn output_file_name(&self) -> Option<&str> {
        self.output.file_name.as_deref()
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(device) = &self.reader.device {
            validate_path("reader.device", device)?;
        }

        let settings = &self.reader.settings;
        validate_positive_number(
            "reader.buffer_size",
            settings.buffer_size,
            settings.min_chunk_len + 1,
        )?;

        if let Some(directory) = &self.output.directory {
            validate_path("output.directory", directory)?;
        }
        if let Some(file_name) = &self.output.file_name {
            validate_file_name("output.file_name", file_name)?;
        }

        validate_positive_number("capture.batch_size", self.capture.batch_size, 1)?;
        validate_range(
            "capture.flush_interval_ms",
            self.capture.flush_interval_ms,
            10,
            600_000,
        )?;
        if let Some(max_records) = self.capture.max_records {
            validate_positive_number("capture.max_records", max_records, 1)?;
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(LoggerError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
