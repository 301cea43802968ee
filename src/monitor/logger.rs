// monitor/logger.rs - 日誌初始化模組

use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, Validator};
use crate::monitor::{MonitorError, MonitorResult};

/// 日誌輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 多行、易讀的格式
    Pretty,
    /// 單行格式
    Compact,
}

impl LogFormat {
    pub fn parse(format: &str) -> Self {
        match format.to_lowercase().as_str() {
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// 將配置中的級別字串轉為 tracing 級別
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // 默認為INFO
    }
}

/// 建立過濾器，`RUST_LOG` 優先於配置
pub fn build_filter(log_config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mtf_features={}",
            parse_level(&log_config.level).as_str().to_lowercase()
        ))
    })
}

/// 初始化日誌系統
///
/// 已有全域 subscriber 時返回 `Ok(false)`，不會覆蓋。
pub fn init_logging(log_config: &LogConfig) -> MonitorResult<bool> {
    log_config
        .validate()
        .map_err(|e| MonitorError::InitializationError(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(log_config));
    let installed = match LogFormat::parse(&log_config.format) {
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
    };

    if installed {
        info!(level = %log_config.level, format = %log_config.format, "日誌系統初始化完成");
    }
    Ok(installed)
}
