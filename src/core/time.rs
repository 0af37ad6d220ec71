//! 帧时钟
//!
//! 驱动方每帧调用一次 [`FrameClock::tick`]，得到本帧的 `dt`，再显式传给
//! `update` / `draw`。核心不持有任何全局时间状态。

use std::time::{Duration, Instant};

/// 默认的最大帧间隔（秒），防止断点调试或窗口拖动后出现巨大的 `dt`
pub const DEFAULT_MAX_DT: f32 = 0.25;

/// 帧时钟（时间源）
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// 上一帧的时刻
    last_frame: Instant,
    /// 本帧间隔（秒）
    delta_seconds: f32,
    /// 累计运行时间（秒）
    elapsed_seconds: f64,
    /// `dt` 上限
    max_dt: f32,
    /// 已计帧数
    frame_count: u64,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self::starting_at(Instant::now(), max_dt)
    }

    /// 以指定时刻作为起点创建时钟（用于确定性步进）
    pub fn starting_at(start: Instant, max_dt: f32) -> Self {
        Self {
            last_frame: start,
            delta_seconds: 0.0,
            elapsed_seconds: 0.0,
            max_dt: max_dt.max(0.0),
            frame_count: 0,
        }
    }

    /// 推进到当前时刻，返回本帧 `dt`
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// 推进到指定时刻，返回本帧 `dt`
    ///
    /// 时刻早于上一帧时 `dt` 为 0（时钟不会倒退）。
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let raw = now
            .checked_duration_since(self.last_frame)
            .unwrap_or(Duration::ZERO)
            .as_secs_f32();
        if now > self.last_frame {
            self.last_frame = now;
        }

        self.delta_seconds = raw.min(self.max_dt);
        self.elapsed_seconds += f64::from(self.delta_seconds);
        self.frame_count += 1;
        self.delta_seconds
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DT)
    }
}
