use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 模拟配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 粒子池容量 N（构造后不可变）
    pub capacity: usize,

    /// 每帧激活的粒子数
    pub spawn_per_frame: u32,

    /// 初始填充方式
    pub population: PopulationMode,

    /// 落地策略
    pub ground_policy: GroundPolicy,

    /// 下落模型
    pub fall_model: FallModel,

    /// 重力加速度（仅 `FallModel::Gravity` 使用）
    pub gravity: f32,

    /// 地面高度
    pub ground_level: f32,

    /// 溅射时抬离地面的微小偏移，避免 z-fighting
    pub ground_epsilon: f32,

    /// `Teleport` 策略下的回收深度
    pub teleport_depth: f32,

    /// 溅射持续时间（秒）
    pub splash_duration: f32,

    /// 溅射期间颜色 alpha 每秒衰减量
    pub splash_fade_rate: f32,

    /// 下落状态的寿命哨兵值（下落期间不递减）
    pub alive_life: f32,

    /// 单帧 dt 上限（秒），用于帧时钟
    pub max_dt: f32,
}

impl_default!(SimulationConfig {
    capacity: 10_000,
    spawn_per_frame: 40,
    population: PopulationMode::Progressive,
    ground_policy: GroundPolicy::Splash,
    fall_model: FallModel::Terminal,
    gravity: 9.81,
    ground_level: 0.0,
    ground_epsilon: 0.001,
    teleport_depth: -0.5,
    splash_duration: 0.15,
    splash_fade_rate: 3.0,
    alive_life: 999.0,
    max_dt: 0.25,
});

impl SimulationConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "capacity must be at least 1".to_string(),
            ));
        }
        if !(self.splash_duration > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "splash_duration must be positive, was given: {}",
                self.splash_duration
            )));
        }
        if !(self.alive_life > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "alive_life must be positive, was given: {}",
                self.alive_life
            )));
        }
        if !(self.max_dt > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "max_dt must be positive, was given: {}",
                self.max_dt
            )));
        }
        if self.ground_epsilon < 0.0 || self.splash_fade_rate < 0.0 || self.gravity < 0.0 {
            return Err(ConfigError::ValidationError(
                "ground_epsilon, splash_fade_rate and gravity must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// 初始填充方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationMode {
    /// 所有槽位初始休眠，由生成策略逐帧激活
    Progressive,
    /// 构造时即激活全部槽位
    Prefilled,
}

/// 落地策略，每个粒子池构造时固定一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundPolicy {
    /// 下落 -> 溅射 -> 下落 状态机
    Splash,
    /// 越过回收深度后直接瞬移回天空，不进入溅射状态
    Teleport,
}

/// 下落模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallModel {
    /// 恒定终端速度
    Terminal,
    /// 每帧 `velocity.y -= gravity * dt`
    Gravity,
}

/// 生成/回收配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// 以锚点为圆心的水平生成半径
    pub radius: f32,

    /// 生成高度下限
    pub altitude_min: f32,

    /// 生成高度上限
    pub altitude_max: f32,

    /// 下落速度大小下限
    pub speed_min: f32,

    /// 下落速度大小上限
    pub speed_max: f32,

    /// 雨滴缩放下限
    pub scale_min: f32,

    /// 雨滴缩放上限
    pub scale_max: f32,

    /// 新生粒子颜色 (r, g, b, a)
    pub color: [f32; 4],
}

impl_default!(SpawnConfig {
    radius: 20.0,
    altitude_min: 15.0,
    altitude_max: 25.0,
    speed_min: 12.0,
    speed_max: 18.0,
    scale_min: 0.6,
    scale_max: 1.4,
    color: [0.8, 0.85, 1.0, 0.5],
});

impl SpawnConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.radius >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "spawn radius must not be negative, was given: {}",
                self.radius
            )));
        }
        check_band("altitude", self.altitude_min, self.altitude_max)?;
        check_band("speed", self.speed_min, self.speed_max)?;
        check_band("scale", self.scale_min, self.scale_max)?;
        if self.speed_min < 0.0 {
            return Err(ConfigError::ValidationError(
                "speed band is a magnitude and must not be negative".to_string(),
            ));
        }
        // 缩放值编码在 w 的符号位上，必须严格为正
        if !(self.scale_min > 0.0) {
            return Err(ConfigError::ValidationError(
                "scale band must be strictly positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_band(name: &str, min: f32, max: f32) -> ConfigResult<()> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} band is invalid: min {min} must not exceed max {max}"
        )))
    }
}
