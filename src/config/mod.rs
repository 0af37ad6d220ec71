//! 统一配置系统
//!
//! 提供TOML/JSON配置文件、环境变量覆盖和配置验证

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod render;
pub mod simulation;

pub use render::RenderConfig;
pub use simulation::{FallModel, GroundPolicy, PopulationMode, SimulationConfig, SpawnConfig};

use crate::impl_default;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 雨效主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RainConfig {
    /// 模拟配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 生成/回收配置
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// 渲染配置
    #[serde(default)]
    pub render: RenderConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RainConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 按扩展名加载配置文件（`.json` 走JSON，其余走TOML），并应用环境变量覆盖后验证
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let mut config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.apply_env_overrides();
        config.validate()?;
        tracing::info!(target: "config", path = %path.display(), "Loaded rain config");
        Ok(config)
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("KINETIC_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                self.simulation.capacity = capacity;
            }
        }
        if let Ok(val) = env::var("KINETIC_SPAWN_PER_FRAME") {
            if let Ok(count) = val.parse() {
                self.simulation.spawn_per_frame = count;
            }
        }
        if let Ok(val) = env::var("KINETIC_SPAWN_RADIUS") {
            if let Ok(radius) = val.parse() {
                self.spawn.radius = radius;
            }
        }
        if let Ok(val) = env::var("KINETIC_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    ///
    /// 除各分区自身的检查外，生成高度带必须整体位于回收线之上，
    /// 否则新生成的雨滴会在第一帧立即被回收。
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;
        self.spawn.validate()?;
        self.render.validate()?;

        let (line, name) = match self.simulation.ground_policy {
            GroundPolicy::Splash => (self.simulation.ground_level, "ground_level"),
            GroundPolicy::Teleport => (self.simulation.teleport_depth, "teleport_depth"),
        };
        if self.spawn.altitude_min <= line {
            return Err(ConfigError::ValidationError(format!(
                "spawn altitude_min ({}) must be above {} ({})",
                self.spawn.altitude_min, name, line
            )));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 解析日志级别（不区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RainConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_altitude_band_must_clear_ground() {
        let mut config = RainConfig::default();
        config.simulation.ground_level = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.simulation.ground_level = config.spawn.altitude_min;
        assert!(config.validate().is_err());

        config.simulation.ground_level = config.spawn.altitude_min - 0.1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_altitude_band_must_clear_teleport_depth() {
        let mut config = RainConfig::default();
        config.simulation.ground_policy = GroundPolicy::Teleport;
        config.spawn.altitude_min = -2.0;
        config.spawn.altitude_max = 5.0;
        config.simulation.teleport_depth = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        // ground_level 只约束 Splash 策略
        config.simulation.teleport_depth = -3.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = RainConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: RainConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.simulation.capacity, parsed.simulation.capacity);
        assert_eq!(config.spawn.color, parsed.spawn.color);
    }

    #[test]
    fn test_json_serialization() {
        let config = RainConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: RainConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config.simulation.capacity, parsed.simulation.capacity);
        assert_eq!(config.simulation.ground_policy, parsed.simulation.ground_policy);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RainConfig::from_toml_str(
            r#"
            [simulation]
            capacity = 256
            ground_policy = "Teleport"

            [spawn]
            radius = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.capacity, 256);
        assert_eq!(config.simulation.ground_policy, GroundPolicy::Teleport);
        assert_eq!(config.spawn.radius, 5.0);
        assert_eq!(config.spawn.altitude_min, SpawnConfig::default().altitude_min);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = RainConfig::from_toml_str("[simulation\ncapacity = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = RainConfig::default();
        config.simulation.capacity = 1234;
        config.spawn.radius = 7.5;

        let toml_path = dir.path().join("rain.toml");
        config.save_toml(&toml_path).unwrap();
        let loaded = RainConfig::from_toml_file(&toml_path).unwrap();
        assert_eq!(loaded.simulation.capacity, 1234);
        assert_eq!(loaded.spawn.radius, 7.5);

        let json_path = dir.path().join("rain.json");
        config.save_json(&json_path).unwrap();
        let loaded = RainConfig::from_json_file(&json_path).unwrap();
        assert_eq!(loaded.simulation.capacity, 1234);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = RainConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" warning "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
