use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 未設定時使用的過濾規則；verbose 優先於配置的等級
fn default_filter(verbose: bool, level: &str) -> String {
    if verbose {
        "serial_csv_logger=debug,info".to_string()
    } else {
        format!("serial_csv_logger={}", level)
    }
}

pub fn init_cli_logger(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON 格式日誌，方便交給日誌收集器處理
pub fn init_json_logger(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_follows_level() {
        assert_eq!(default_filter(false, "warn"), "serial_csv_logger=warn");
        assert_eq!(default_filter(false, "trace"), "serial_csv_logger=trace");
        assert_eq!(default_filter(false, "error"), "serial_csv_logger=error");
        assert_eq!(default_filter(true, "error"), "serial_csv_logger=debug,info");
    }
}
