//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `error` - 错误类型定义
//! - `time` - 帧时钟（时间源）
//! - `macros` - 配置样板宏

pub mod error;
pub mod time;
#[macro_use]
pub mod macros;

use crate::config::{LogLevel, LoggingConfig};

// 重新导出错误类型
pub use error::{RainError, RainResult, RenderError, RenderResult};
pub use time::FrameClock;

/// 初始化日志系统
///
/// 配置tracing日志框架。`RUST_LOG` 环境变量优先于配置中的日志级别。
/// 重复调用是安全的（后续调用不会替换已安装的订阅者）。
pub fn init_logging(config: &LoggingConfig) {
    if !config.log_to_console {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level_directive(config.level)));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    tracing::info!(target: "engine", level = ?config.level, "Logging initialized");
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive(LogLevel::Trace), "trace");
        assert_eq!(level_directive(LogLevel::Warn), "warn");
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        let config = LoggingConfig::default();
        init_logging(&config);
        init_logging(&config);
    }
}
