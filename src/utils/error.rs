use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Device file not found: {path}")]
    DeviceNotFound { path: String },

    #[error("Reader is already running on {path}")]
    AlreadyReading { path: String },

    #[error("Serial reader error: {message}")]
    ReaderError { message: String },

    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Cannot resolve document '{file_name}' under '{uri}': {reason}")]
    DocumentError {
        uri: String,
        file_name: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤類別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Device,
    Storage,
    Data,
    Configuration,
    System,
}

/// 錯誤嚴重程度，用於決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl LoggerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LoggerError::DeviceNotFound { .. }
            | LoggerError::AlreadyReading { .. }
            | LoggerError::ReaderError { .. } => ErrorCategory::Device,
            LoggerError::IoError(_) | LoggerError::DocumentError { .. } => ErrorCategory::Storage,
            LoggerError::CsvError(_)
            | LoggerError::SerializationError(_)
            | LoggerError::InvalidPayload { .. } => ErrorCategory::Data,
            LoggerError::ProcessingError { .. } => ErrorCategory::System,
            LoggerError::ConfigError { .. }
            | LoggerError::ConfigValidationError { .. }
            | LoggerError::InvalidConfigValueError { .. }
            | LoggerError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 讀取器已在運行，重試 stop 後再 start 即可
            LoggerError::AlreadyReading { .. } => ErrorSeverity::Medium,
            LoggerError::InvalidPayload { .. } | LoggerError::CsvError(_) => ErrorSeverity::Medium,
            LoggerError::ReaderError { .. } | LoggerError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LoggerError::DeviceNotFound { path } => format!(
                "Check that the device {} is connected and that the path is correct",
                path
            ),
            LoggerError::AlreadyReading { .. } => {
                "Call stop_reading() and wait for the reader to finish before starting again"
                    .to_string()
            }
            LoggerError::ReaderError { .. } => {
                "Reconnect the device and restart the reader".to_string()
            }
            LoggerError::InvalidPayload { .. } | LoggerError::SerializationError(_) => {
                "Pass a single JSON object, e.g. {\"temperature\": 21.5}".to_string()
            }
            LoggerError::CsvError(_) => {
                "Inspect the CSV file for malformed rows or a mismatched header".to_string()
            }
            LoggerError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            LoggerError::DocumentError { .. } => {
                "Use a directory path or file:// URI and a plain file name".to_string()
            }
            LoggerError::ConfigError { .. }
            | LoggerError::ConfigValidationError { .. }
            | LoggerError::InvalidConfigValueError { .. }
            | LoggerError::MissingConfigError { .. } => {
                "Review the configuration file and command line arguments".to_string()
            }
            LoggerError::ProcessingError { .. } => "Check the logs for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Device => format!("Serial device problem: {}", self),
            ErrorCategory::Storage => format!("Could not access the CSV file: {}", self),
            ErrorCategory::Data => format!("Received data could not be processed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("Unexpected error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = LoggerError::DeviceNotFound {
            path: "/dev/ttyUSB9".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Device);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("/dev/ttyUSB9"));

        let err = LoggerError::InvalidPayload {
            reason: "not an object".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LoggerError = io.into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.user_friendly_message().starts_with("Could not access"));
    }

    #[test]
    fn test_config_and_system_errors() {
        let err = LoggerError::ConfigError {
            message: "cannot read logger.toml".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = LoggerError::ProcessingError {
            message: "buffer flush failed".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::System);
        assert!(err.user_friendly_message().starts_with("Unexpected error"));
    }
}
