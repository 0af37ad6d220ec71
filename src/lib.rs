//! # Kinetic Core
//!
//! 固定容量的雨滴粒子系统：CPU 端 SoA 模拟 + 每帧一次实例化绘制。
//!
//! ## Features
//!
//! - **Fixed-capacity pool**: N slots allocated once, recycled with a last-used cursor
//! - **Falling / Splashing FSM**: raindrops splash on the ground and respawn in the sky
//! - **Observer-anchored spawning**: new drops appear around the camera footprint
//! - **Instanced submission**: one `vec4` per particle, one draw call per frame
//! - **Pluggable backends**: wgpu for real rendering, headless for tests and benchmarks
//!
//! ## Frame loop
//!
//! ```ignore
//! let mut clock = FrameClock::new(config.simulation.max_dt);
//! loop {
//!     let dt = clock.tick();
//!     rain.step(dt, observer.anchor());
//!     rain.draw(&observer, &mut target)?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: errors, logging, frame clock
//! - [`config`]: configuration loading and validation
//! - [`particles`]: particle pool, spawn policy, state machine
//! - [`render`]: render submitter and GPU backends
//! - [`system`]: the `construct` / `update` / `draw` facade

/// Errors, logging and the frame clock
#[macro_use]
pub mod core;
/// Configuration system
pub mod config;
/// Particle simulation
pub mod particles;
/// Instanced rendering
pub mod render;
/// Driver-facing facade
pub mod system;

pub use config::RainConfig;
pub use crate::core::error::{RainError, RainResult, RenderError, RenderResult};
pub use crate::core::FrameClock;
pub use particles::{FrameStats, ParticlePool, ParticleState};
pub use render::ObserverContext;
pub use system::RainSystem;
