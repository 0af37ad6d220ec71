//! 粒子状态机
//!
//! 每个槽位只有两种物理状态，用显式枚举标签加共享的 `life` 字段表示：
//!
//! | 状态 | `life` 的含义 | 渲染向量 `w` |
//! |------|---------------|--------------|
//! | 休眠 (`life <= 0`) | 可被回收 | `0.0` |
//! | `Falling` | 存活哨兵值，下落期间不递减 | `+scale` |
//! | `Splashing` | 剩余溅射时间，每帧递减 | `-life` |

use glam::{Vec3, Vec4};

/// 槽位的物理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ParticleState {
    /// 下落中
    #[default]
    Falling,
    /// 落地溅射中
    Splashing,
}

/// 由渲染向量 `w` 解码出的槽位外观
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    /// 休眠槽位，着色器不绘制
    Dormant,
    /// 下落雨滴，携带缩放值
    Falling { scale: f32 },
    /// 溅射，携带剩余寿命
    Splashing { remaining: f32 },
}

impl RenderMode {
    /// 解码 `w` 分量
    #[inline]
    pub fn decode(w: f32) -> Self {
        if w > 0.0 {
            Self::Falling { scale: w }
        } else if w < 0.0 {
            Self::Splashing { remaining: -w }
        } else {
            Self::Dormant
        }
    }
}

/// 编码下落雨滴的 `w`
#[inline]
pub fn encode_falling(scale: f32) -> f32 {
    scale
}

/// 编码溅射的 `w`
#[inline]
pub fn encode_splashing(remaining: f32) -> f32 {
    -remaining
}

/// 单个槽位的只读快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    /// 槽位编号
    pub slot: usize,
    /// 世界坐标
    pub position: Vec3,
    /// 速度（仅CPU）
    pub velocity: Vec3,
    /// 剩余寿命
    pub life: f32,
    /// 颜色
    pub color: Vec4,
    /// 状态
    pub state: ParticleState,
    /// 打包后的渲染向量
    pub render: Vec4,
}

impl ParticleView {
    /// 槽位是否存活
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// 直接写入槽位的初始状态（脚本化雨滴、测试场景）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSeed {
    pub position: Vec3,
    pub velocity: Vec3,
    pub state: ParticleState,
    /// `None` 时按状态取默认值：下落取存活哨兵值，溅射取溅射持续时间
    pub life: Option<f32>,
}

impl ParticleSeed {
    /// 下落中的雨滴
    pub fn falling(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            state: ParticleState::Falling,
            life: None,
        }
    }

    /// 溅射中的雨滴，剩余寿命为 `life`
    pub fn splashing(position: Vec3, life: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            state: ParticleState::Splashing,
            life: Some(life),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_sign_encoding() {
        assert_eq!(RenderMode::decode(0.0), RenderMode::Dormant);
        assert_eq!(
            RenderMode::decode(encode_falling(1.25)),
            RenderMode::Falling { scale: 1.25 }
        );
        assert_eq!(
            RenderMode::decode(encode_splashing(0.1)),
            RenderMode::Splashing { remaining: 0.1 }
        );
    }

    #[test]
    fn test_default_state_is_falling() {
        assert_eq!(ParticleState::default(), ParticleState::Falling);
    }
}
