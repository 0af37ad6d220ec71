//! 统一错误处理模块
//!
//! 提供引擎范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **图形错误** (`RenderError`, 经 `RainError::Render` 上抛): 图形上下文缺失、
//!   设备请求失败等，只在构造阶段出现，属于致命错误
//! - **窗口错误** (`RainError::Window` / `RainError::EventLoop`): 仅演示程序使用
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析与验证
//!
//! 每帧的 `update` / `draw` 是全函数，不返回错误：退化输入（`dt <= 0`、
//! 生成数超过空闲槽位数）由策略处理，而不是作为错误上报。

use thiserror::Error;

use crate::config::ConfigError;

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum RainError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Window creation failed: {0}")]
    Window(String),

    #[error("Event loop error: {0}")]
    EventLoop(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 渲染系统错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),

    #[error("Failed to request adapter: no compatible GPU found")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    DeviceRequest(String),

    #[error("Instance buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: u64, actual: u64 },

    #[error("Upload out of bounds: offset {offset} + {len} bytes exceeds capacity {capacity}")]
    UploadOutOfBounds { offset: u64, len: u64, capacity: u64 },

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Invalid render state: {0}")]
    InvalidState(String),
}

/// 引擎结果类型别名
pub type RainResult<T> = Result<T, RainError>;
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let render_err = RenderError::NoAdapter;
        let rain_err: RainError = render_err.into();
        assert!(matches!(rain_err, RainError::Render(RenderError::NoAdapter)));

        let config_err = ConfigError::ValidationError("capacity".to_string());
        let rain_err: RainError = config_err.into();
        assert!(matches!(rain_err, RainError::Config(_)));
    }

    #[test]
    fn test_construction_failures_keep_their_source() {
        // 构造失败总是带着具体来源上抛，没有笼统的初始化变体
        let errors = [
            RainError::from(RenderError::NoAdapter),
            RainError::from(ConfigError::ValidationError("capacity".to_string())),
            RainError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "rain.toml")),
            RainError::Window("no display".to_string()),
            RainError::EventLoop("closed".to_string()),
        ];
        for err in &errors {
            let typed = match err {
                RainError::Render(_) | RainError::Config(_) | RainError::Io(_) => true,
                RainError::Window(_) | RainError::EventLoop(_) => false,
            };
            assert_eq!(typed, std::error::Error::source(err).is_some(), "{err}");
        }
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::NoAdapter;
        assert_eq!(
            err.to_string(),
            "Failed to request adapter: no compatible GPU found"
        );

        let err = RenderError::BufferSize {
            expected: 64,
            actual: 48,
        };
        assert_eq!(
            err.to_string(),
            "Instance buffer size mismatch: expected 64 bytes, got 48"
        );
    }
}
