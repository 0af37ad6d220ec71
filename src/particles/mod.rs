//! 雨滴粒子模拟
//!
//! - [`pool`]: 固定容量 SoA 粒子池与逐帧物理
//! - [`spawn`]: 槽位回收与以观察者为中心的重生分布
//! - [`state`]: 下落/溅射状态机与渲染 `w` 编码
//!
//! 粒子池只做 CPU 模拟，不接触 GPU。渲染侧通过 [`ParticlePool::render_data`]
//! 拿到与槽位对齐的 `Vec4` 数组，整块上传。

pub mod pool;
pub mod spawn;
pub mod state;

pub use pool::{FrameStats, ParticlePool};
pub use spawn::{SlotChoice, SlotCursor, Spawn, SpawnPolicy};
pub use state::{
    encode_falling, encode_splashing, ParticleSeed, ParticleState, ParticleView, RenderMode,
};
