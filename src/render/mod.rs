//! 雨滴渲染
//!
//! - [`backend`]: 实例缓冲区与着色程序的抽象，以及 CPU 端的 Headless 实现
//! - [`submitter`]: 每帧一次整块上传 + 一次实例化绘制
//! - [`wgpu_modules`]: wgpu 实现

pub mod backend;
pub mod submitter;
pub mod wgpu_modules;

pub use backend::{
    DrawCall, HeadlessBackend, HeadlessShader, InstanceBackend, ShaderProgram, UniformValue,
    INSTANCE_STRIDE,
};
pub use submitter::{ObserverContext, RenderSubmitter, SubmitStats};
pub use wgpu_modules::{FrameTarget, GpuContext, WgpuInstanceBackend, WgpuShader};
