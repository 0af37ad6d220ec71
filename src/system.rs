//! 雨滴系统
//!
//! 面向驱动的门面，只暴露三个操作：
//!
//! - [`RainSystem::construct`]: 分配粒子池与 GPU 缓冲区
//! - [`RainSystem::update`]: 推进模拟
//! - [`RainSystem::draw`]: 提交渲染
//!
//! `update` 与 `draw` 相互独立，驱动每帧在同一线程上先后调用。
//!
//! ```
//! use kinetic_core::config::RainConfig;
//! use kinetic_core::render::ObserverContext;
//! use kinetic_core::system::RainSystem;
//!
//! let mut config = RainConfig::default();
//! config.simulation.capacity = 64;
//!
//! let mut rain = RainSystem::headless(&config).unwrap();
//! let observer = ObserverContext::default();
//! rain.update(1.0 / 60.0, 8, observer.anchor());
//! rain.draw(&observer, &mut ()).unwrap();
//! assert_eq!(rain.pool().active_count(), 8);
//! ```

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RainConfig;
use crate::core::error::{RainResult, RenderResult};
use crate::particles::ParticlePool;
use crate::render::{
    HeadlessBackend, HeadlessShader, InstanceBackend, ObserverContext, RenderSubmitter,
    ShaderProgram,
};

/// 雨滴系统
pub struct RainSystem<B: InstanceBackend, S: ShaderProgram, R: Rng = StdRng> {
    pool: ParticlePool<R>,
    submitter: RenderSubmitter<B>,
    shader: S,
    spawn_per_frame: u32,
}

impl<B: InstanceBackend, S: ShaderProgram, R: Rng> RainSystem<B, S, R> {
    /// 构造系统
    ///
    /// 配置非法或 GPU 缓冲区分配失败时返回错误，这是唯一可能失败的步骤。
    pub fn construct(config: &RainConfig, backend: B, shader: S, rng: R) -> RainResult<Self> {
        let pool = ParticlePool::from_config(config, rng)?;
        let submitter = RenderSubmitter::new(backend, pool.capacity(), &config.render)?;

        tracing::info!(
            target: "engine",
            capacity = pool.capacity(),
            spawn_per_frame = config.simulation.spawn_per_frame,
            "Rain system constructed"
        );

        Ok(Self {
            pool,
            submitter,
            shader,
            spawn_per_frame: config.simulation.spawn_per_frame,
        })
    }

    /// 推进一帧，激活最多 `spawn_count` 个粒子
    pub fn update(&mut self, dt: f32, spawn_count: u32, anchor: Vec2) {
        self.pool.update(dt, spawn_count, anchor);
    }

    /// 按配置的每帧生成数推进一帧
    pub fn step(&mut self, dt: f32, anchor: Vec2) {
        self.pool.update(dt, self.spawn_per_frame, anchor);
    }

    /// 提交当前粒子状态，一次实例化绘制
    pub fn draw(&mut self, observer: &ObserverContext, target: &mut B::Target<'_>) -> RenderResult<()> {
        self.submitter
            .draw(self.pool.render_data(), observer, &mut self.shader, target)
    }

    pub fn pool(&self) -> &ParticlePool<R> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool<R> {
        &mut self.pool
    }

    pub fn submitter(&self) -> &RenderSubmitter<B> {
        &self.submitter
    }

    pub fn shader(&self) -> &S {
        &self.shader
    }

    pub fn spawn_per_frame(&self) -> u32 {
        self.spawn_per_frame
    }

    pub fn set_spawn_per_frame(&mut self, spawn_per_frame: u32) {
        self.spawn_per_frame = spawn_per_frame;
    }
}

impl RainSystem<HeadlessBackend, HeadlessShader, StdRng> {
    /// 使用 CPU 后端构造（测试、基准、离线模拟）
    pub fn headless(config: &RainConfig) -> RainResult<Self> {
        Self::construct(
            config,
            HeadlessBackend::new(),
            HeadlessShader::new(),
            StdRng::from_entropy(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RainError;
    use crate::particles::ParticleState;

    fn config(capacity: usize) -> RainConfig {
        let mut config = RainConfig::default();
        config.simulation.capacity = capacity;
        config.simulation.spawn_per_frame = 4;
        config
    }

    fn system(capacity: usize) -> RainSystem<HeadlessBackend, HeadlessShader> {
        RainSystem::construct(
            &config(capacity),
            HeadlessBackend::new(),
            HeadlessShader::new(),
            StdRng::seed_from_u64(3),
        )
        .unwrap()
    }

    #[test]
    fn test_construct_allocates_once() {
        let rain = system(32);
        assert_eq!(rain.pool().capacity(), 32);
        assert_eq!(rain.submitter().capacity(), 32);
        assert_eq!(rain.submitter().backend().allocations(), 1);
        assert_eq!(rain.submitter().backend().contents().len(), 32 * 16);
    }

    #[test]
    fn test_construct_rejects_invalid_config() {
        let result = RainSystem::headless(&config(0));
        assert!(matches!(result, Err(RainError::Config(_))));
    }

    #[test]
    fn test_step_uses_configured_spawn_rate() {
        let mut rain = system(32);
        rain.step(1.0 / 60.0, Vec2::ZERO);
        assert_eq!(rain.pool().active_count(), 4);
        rain.set_spawn_per_frame(0);
        rain.step(1.0 / 60.0, Vec2::ZERO);
        assert_eq!(rain.pool().active_count(), 4);
    }

    #[test]
    fn test_draw_uploads_pool_snapshot() {
        let mut rain = system(16);
        rain.update(1.0 / 60.0, 16, Vec2::new(5.0, 5.0));
        rain.draw(&ObserverContext::default(), &mut ()).unwrap();

        let expected: &[u8] = bytemuck::cast_slice(rain.pool().render_data());
        assert_eq!(rain.submitter().backend().contents(), expected);
        assert!(rain
            .pool()
            .states()
            .iter()
            .all(|state| *state == ParticleState::Falling));
    }
}
