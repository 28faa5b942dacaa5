use crate::utils::error::{LoggerError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| LoggerError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 文件名稱不可包含路徑分隔符
pub fn validate_file_name(field_name: &str, file_name: &str) -> Result<()> {
    validate_non_empty_string(field_name, file_name)?;

    if file_name == "." || file_name == ".." {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file_name.to_string(),
            reason: "File name cannot refer to a directory".to_string(),
        });
    }

    if file_name.contains(['/', '\\', '\0']) {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file_name.to_string(),
            reason: "File name cannot contain path separators or null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("reader.device", "/dev/ttyUSB0").is_ok());
        assert!(validate_path("reader.device", "").is_err());
        assert!(validate_path("reader.device", "/dev/tty\0").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("capture.batch_size", 5, 1).is_ok());
        assert!(validate_positive_number("capture.batch_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("output.file_name", "readings.csv").is_ok());
        assert!(validate_file_name("output.file_name", "  ").is_err());
        assert!(validate_file_name("output.file_name", "..").is_err());
        assert!(validate_file_name("output.file_name", "logs/readings.csv").is_err());
        assert!(validate_file_name("output.file_name", "logs\\readings.csv").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("capture.flush_interval_ms", 1000u64, 10, 600_000).is_ok());
        assert!(validate_range("capture.flush_interval_ms", 5u64, 10, 600_000).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let device: Option<String> = None;
        assert!(matches!(
            validate_required_field("reader.device", &device),
            Err(LoggerError::MissingConfigError { .. })
        ));
    }
}
