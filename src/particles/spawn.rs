//! 生成/回收策略
//!
//! - [`SlotCursor`]: "上次使用" 游标的空闲槽位查找，稳态下摊还 O(1)
//! - [`SpawnPolicy`]: 以锚点为中心的重生分布

use glam::{Vec2, Vec3, Vec4};
use rand::Rng;

use super::state::encode_falling;
use crate::config::SpawnConfig;

/// 空闲槽位查找结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChoice {
    /// 找到空闲槽位
    Free(usize),
    /// 池已饱和，回退为覆盖槽位 0
    Saturated,
}

impl SlotChoice {
    /// 最终使用的槽位
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Free(index) => index,
            Self::Saturated => 0,
        }
    }

    pub fn is_saturated(self) -> bool {
        matches!(self, Self::Saturated)
    }
}

/// 上次使用游标
///
/// 从上次返回槽位的下一个位置开始向后查找 `life <= 0` 的槽位，尾段耗尽后回绕到 0。
/// 全部存活时返回 [`SlotChoice::Saturated`]，宁可覆盖一个存活粒子也不拒绝生成。
#[derive(Debug, Clone, Default)]
pub struct SlotCursor {
    last: Option<usize>,
}

impl SlotCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 上次返回的槽位
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// 查找下一个可用槽位
    pub fn find_available_slot(&mut self, life: &[f32]) -> SlotChoice {
        let count = life.len();
        if count == 0 {
            return SlotChoice::Saturated;
        }

        let start = self.last.map_or(0, |last| (last + 1) % count);

        // 1. 从游标位置往后找
        // 2. 后面满了，从头找到游标位置
        let found = (start..count)
            .chain(0..start)
            .find(|&i| life[i] <= 0.0);

        match found {
            Some(index) => {
                self.last = Some(index);
                SlotChoice::Free(index)
            }
            None => {
                // 3. 全满：覆盖第 0 个
                self.last = Some(0);
                SlotChoice::Saturated
            }
        }
    }

    /// 重置游标
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// 一次重生采样的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub position: Vec3,
    pub velocity: Vec3,
    /// 已编码的渲染 `w`（正值缩放）
    pub render_w: f32,
    pub color: Vec4,
}

/// 重生分布
///
/// 水平位置在以锚点为圆心、半径 `radius` 的圆盘内均匀分布，高度在固定高空带内均匀分布，
/// 速度竖直向下，大小在速度带内均匀分布。
#[derive(Debug, Clone)]
pub struct SpawnPolicy {
    radius: f32,
    altitude: (f32, f32),
    speed: (f32, f32),
    scale: (f32, f32),
    color: Vec4,
}

impl SpawnPolicy {
    pub fn new(config: &SpawnConfig) -> Self {
        Self {
            radius: config.radius.max(0.0),
            altitude: ordered(config.altitude_min, config.altitude_max),
            speed: ordered(config.speed_min.abs(), config.speed_max.abs()),
            scale: ordered(config.scale_min, config.scale_max),
            color: Vec4::from_array(config.color),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// 高空带 (下限, 上限)
    pub fn altitude_band(&self) -> (f32, f32) {
        self.altitude
    }

    /// 新生粒子颜色
    pub fn fresh_color(&self) -> Vec4 {
        self.color
    }

    /// 以 `anchor`（观察者的 XZ 平面坐标）为中心采样一个新粒子
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, anchor: Vec2) -> Spawn {
        let offset = self.sample_disk(rng);
        let altitude = rng.gen_range(self.altitude.0..=self.altitude.1);
        let speed = rng.gen_range(self.speed.0..=self.speed.1);
        // 缩放值必须严格为正，否则会被当作休眠槽位
        let scale = rng
            .gen_range(self.scale.0..=self.scale.1)
            .max(f32::MIN_POSITIVE);

        Spawn {
            position: Vec3::new(anchor.x + offset.x, altitude, anchor.y + offset.y),
            velocity: Vec3::new(0.0, -speed, 0.0),
            render_w: encode_falling(scale),
            color: self.color,
        }
    }

    fn sample_disk<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        if self.radius <= 0.0 {
            return Vec2::ZERO;
        }
        // sqrt 使点在圆盘面积上均匀
        let r = self.radius * rng.gen::<f32>().sqrt();
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        Vec2::new(r * theta.cos(), r * theta.sin())
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self::new(&SpawnConfig::default())
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
