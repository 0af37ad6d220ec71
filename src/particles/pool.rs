//! 固定容量粒子池
//!
//! 所有逐粒子数据以 SoA 布局存放在 N 长度的并行数组中，按槽位编号对齐，构造后不再分配。
//!
//! - `render`: GPU 渲染数据，`xyz` = 世界坐标，`w` = 状态编码标量。
//!   位置只存在这里，提交时直接把整个数组按字节交给 GPU，零拷贝。
//! - `velocities`: 仅用于 CPU 物理积分，从不上传。
//! - `life` / `states` / `colors`: 生命周期与状态机数据。

use std::num::NonZeroUsize;

use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::spawn::{SlotChoice, SlotCursor, SpawnPolicy};
use super::state::{encode_splashing, ParticleSeed, ParticleState, ParticleView};
use crate::config::{
    ConfigError, ConfigResult, FallModel, GroundPolicy, PopulationMode, RainConfig,
    SimulationConfig, SpawnConfig,
};

/// 单帧统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// 本帧激活的粒子数
    pub spawned: u32,
    /// 因池饱和而覆盖存活粒子的生成请求数
    pub overwritten: u32,
    /// 本帧落地进入溅射的粒子数
    pub splashed: u32,
    /// 本帧因落地/溅射结束而就地重生的粒子数
    pub respawned: u32,
    /// 帧末存活槽位数
    pub active: u32,
}

/// 物理参数（从 [`SimulationConfig`] 拷贝，构造后固定）
#[derive(Debug, Clone, Copy)]
struct PhysicsParams {
    ground_policy: GroundPolicy,
    fall_model: FallModel,
    gravity: f32,
    ground_level: f32,
    ground_epsilon: f32,
    teleport_depth: f32,
    splash_duration: f32,
    splash_fade_rate: f32,
    alive_life: f32,
}

impl From<&SimulationConfig> for PhysicsParams {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            ground_policy: config.ground_policy,
            fall_model: config.fall_model,
            gravity: config.gravity,
            ground_level: config.ground_level,
            ground_epsilon: config.ground_epsilon,
            teleport_depth: config.teleport_depth,
            splash_duration: config.splash_duration,
            splash_fade_rate: config.splash_fade_rate,
            alive_life: config.alive_life,
        }
    }
}

/// 粒子池
pub struct ParticlePool<R = StdRng> {
    render: Vec<Vec4>,
    velocities: Vec<Vec3>,
    life: Vec<f32>,
    colors: Vec<Vec4>,
    states: Vec<ParticleState>,
    cursor: SlotCursor,
    policy: SpawnPolicy,
    physics: PhysicsParams,
    rng: R,
    stats: FrameStats,
}

impl ParticlePool<StdRng> {
    /// 使用系统熵初始化随机源
    pub fn with_entropy(
        capacity: NonZeroUsize,
        simulation: &SimulationConfig,
        spawn: &SpawnConfig,
    ) -> Self {
        Self::new(capacity, simulation, spawn, StdRng::from_entropy())
    }
}

impl<R: Rng> ParticlePool<R> {
    /// 创建粒子池
    ///
    /// 一次性分配 N 长度的并行数组。`Prefilled` 模式下所有槽位立即以原点为锚点激活，
    /// `Progressive` 模式下所有槽位休眠，等待 [`update`](Self::update) 逐帧激活。
    pub fn new(
        capacity: NonZeroUsize,
        simulation: &SimulationConfig,
        spawn: &SpawnConfig,
        rng: R,
    ) -> Self {
        let n = capacity.get();
        let mut pool = Self {
            render: vec![Vec4::ZERO; n],
            velocities: vec![Vec3::ZERO; n],
            life: vec![0.0; n],
            colors: vec![Vec4::from_array(spawn.color); n],
            states: vec![ParticleState::Falling; n],
            cursor: SlotCursor::new(),
            policy: SpawnPolicy::new(spawn),
            physics: PhysicsParams::from(simulation),
            rng,
            stats: FrameStats::default(),
        };

        if simulation.population == PopulationMode::Prefilled {
            pool.prefill(Vec2::ZERO);
        }

        tracing::info!(
            target: "particles",
            capacity = n,
            population = ?simulation.population,
            ground_policy = ?simulation.ground_policy,
            "Particle pool created"
        );
        pool
    }

    /// 从完整配置创建粒子池，容量取 `simulation.capacity`
    pub fn from_config(config: &RainConfig, rng: R) -> ConfigResult<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.simulation.capacity).ok_or_else(|| {
            ConfigError::ValidationError("capacity must be at least 1".to_string())
        })?;
        Ok(Self::new(capacity, &config.simulation, &config.spawn, rng))
    }

    /// 以 `anchor` 为中心重生全部槽位
    pub fn prefill(&mut self, anchor: Vec2) {
        for slot in 0..self.capacity() {
            self.respawn(slot, anchor);
        }
        self.cursor.reset();
    }

    /// 推进一帧
    ///
    /// 1. 通过回收策略激活最多 `spawn_count` 个休眠槽位
    /// 2. 对每个槽位按其状态恰好执行一次物理规则
    ///
    /// `dt` 为 0、负数或非有限值时物理步为空操作。本函数不分配内存。
    pub fn update(&mut self, dt: f32, spawn_count: u32, anchor: Vec2) {
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            if dt != 0.0 {
                tracing::trace!(target: "particles", dt, "Ignoring degenerate frame delta");
            }
            0.0
        };

        self.stats = FrameStats::default();
        self.spawn(spawn_count, anchor);

        let mut active = 0;
        for slot in 0..self.capacity() {
            if dt > 0.0 {
                self.step_slot(slot, dt, anchor);
            }
            if self.life[slot] > 0.0 {
                active += 1;
            }
        }
        self.stats.active = active;
    }

    fn spawn(&mut self, spawn_count: u32, anchor: Vec2) {
        for requested in 0..spawn_count {
            let choice = self.cursor.find_available_slot(&self.life);
            self.respawn(choice.index(), anchor);
            self.stats.spawned += 1;

            if let SlotChoice::Saturated = choice {
                // 饱和后同一帧剩余的请求都会落在槽位 0 上，只重生一次
                self.stats.overwritten = spawn_count - requested;
                tracing::trace!(
                    target: "particles",
                    overwritten = self.stats.overwritten,
                    "Pool saturated, overwriting slot 0"
                );
                break;
            }
        }
    }

    fn step_slot(&mut self, slot: usize, dt: f32, anchor: Vec2) {
        if self.life[slot] <= 0.0 {
            return;
        }

        match self.states[slot] {
            ParticleState::Falling => self.step_falling(slot, dt, anchor),
            ParticleState::Splashing => self.step_splashing(slot, dt, anchor),
        }
    }

    fn step_falling(&mut self, slot: usize, dt: f32, anchor: Vec2) {
        let physics = self.physics;

        if physics.fall_model == FallModel::Gravity {
            self.velocities[slot].y -= physics.gravity * dt;
        }
        let position = self.render[slot].truncate() + self.velocities[slot] * dt;
        self.set_position(slot, position);

        match physics.ground_policy {
            GroundPolicy::Splash if position.y <= physics.ground_level => {
                self.set_position(
                    slot,
                    Vec3::new(
                        position.x,
                        physics.ground_level + physics.ground_epsilon,
                        position.z,
                    ),
                );
                self.velocities[slot] = Vec3::ZERO;
                self.life[slot] = physics.splash_duration;
                self.states[slot] = ParticleState::Splashing;
                self.render[slot].w = encode_splashing(physics.splash_duration);
                self.stats.splashed += 1;
            }
            GroundPolicy::Teleport if position.y < physics.teleport_depth => {
                self.respawn(slot, anchor);
                self.stats.respawned += 1;
            }
            _ => {}
        }
    }

    fn step_splashing(&mut self, slot: usize, dt: f32, anchor: Vec2) {
        self.life[slot] -= dt;
        let color = &mut self.colors[slot];
        color.w = (color.w - self.physics.splash_fade_rate * dt).max(0.0);

        if self.life[slot] <= 0.0 {
            self.respawn(slot, anchor);
            self.stats.respawned += 1;
        } else {
            self.render[slot].w = encode_splashing(self.life[slot]);
        }
    }

    /// 查找下一个可用槽位（见 [`SlotCursor`]）
    pub fn find_available_slot(&mut self) -> SlotChoice {
        self.cursor.find_available_slot(&self.life)
    }

    /// 以 `anchor` 为中心就地重生 `slot`，状态重置为 `Falling`
    ///
    /// 越界槽位被忽略。
    pub fn respawn(&mut self, slot: usize, anchor: Vec2) {
        if slot >= self.capacity() {
            return;
        }
        let spawn = self.policy.sample(&mut self.rng, anchor);
        self.render[slot] = spawn.position.extend(spawn.render_w);
        self.velocities[slot] = spawn.velocity;
        self.colors[slot] = spawn.color;
        self.life[slot] = self.physics.alive_life;
        self.states[slot] = ParticleState::Falling;
    }

    /// 直接写入槽位状态，返回槽位是否存在
    pub fn seed_slot(&mut self, slot: usize, seed: ParticleSeed) -> bool {
        if slot >= self.capacity() {
            return false;
        }

        let (life, w) = match seed.state {
            ParticleState::Falling => {
                let life = seed.life.unwrap_or(self.physics.alive_life);
                // 保留已有缩放；休眠槽位没有缩放时取 1
                let scale = if self.render[slot].w > 0.0 {
                    self.render[slot].w
                } else {
                    1.0
                };
                (life, if life > 0.0 { scale } else { 0.0 })
            }
            ParticleState::Splashing => {
                let life = seed.life.unwrap_or(self.physics.splash_duration);
                (life, if life > 0.0 { encode_splashing(life) } else { 0.0 })
            }
        };

        self.render[slot] = seed.position.extend(w);
        self.velocities[slot] = seed.velocity;
        self.colors[slot] = self.policy.fresh_color();
        self.life[slot] = life;
        self.states[slot] = seed.state;
        true
    }

    /// 让所有槽位回到休眠状态
    pub fn clear(&mut self) {
        self.render.fill(Vec4::ZERO);
        self.velocities.fill(Vec3::ZERO);
        self.life.fill(0.0);
        self.colors.fill(self.policy.fresh_color());
        self.states.fill(ParticleState::Falling);
        self.cursor.reset();
        self.stats = FrameStats::default();
    }

    #[inline]
    fn set_position(&mut self, slot: usize, position: Vec3) {
        let w = self.render[slot].w;
        self.render[slot] = position.extend(w);
    }

    /// 容量 N
    #[inline]
    pub fn capacity(&self) -> usize {
        self.render.len()
    }

    /// 打包的渲染数组，与物理数组按槽位对齐
    #[inline]
    pub fn render_data(&self) -> &[Vec4] {
        &self.render
    }

    /// 槽位位置
    pub fn position(&self, slot: usize) -> Option<Vec3> {
        self.render.get(slot).map(|v| v.truncate())
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn life(&self) -> &[f32] {
        &self.life
    }

    pub fn states(&self) -> &[ParticleState] {
        &self.states
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// 单个槽位的快照
    pub fn view(&self, slot: usize) -> Option<ParticleView> {
        let render = *self.render.get(slot)?;
        Some(ParticleView {
            slot,
            position: render.truncate(),
            velocity: self.velocities[slot],
            life: self.life[slot],
            color: self.colors[slot],
            state: self.states[slot],
            render,
        })
    }

    /// 当前存活槽位数
    pub fn active_count(&self) -> usize {
        self.life.iter().filter(|&&life| life > 0.0).count()
    }

    /// 上一帧统计
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// 上次回收策略返回的槽位
    pub fn last_spawned(&self) -> Option<usize> {
        self.cursor.last()
    }

    /// 重生分布
    pub fn spawn_policy(&self) -> &SpawnPolicy {
        &self.policy
    }

    pub fn splash_duration(&self) -> f32 {
        self.physics.splash_duration
    }

    pub fn ground_policy(&self) -> GroundPolicy {
        self.physics.ground_policy
    }
}
