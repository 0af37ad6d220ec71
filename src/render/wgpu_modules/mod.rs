//! WGPU 渲染模块
//!
//! ## 模块结构
//!
//! - `types`: 四边形模板、实例布局与 uniform 块
//! - `context`: 设备与队列（图形上下文）
//! - `shader`: 着色程序与 uniform 上传
//! - `pipeline`: 雨滴渲染管线与 WGSL 源码
//! - `buffer`: 实例缓冲区与实例化绘制
//!
//! ## 使用方式
//!
//! ```ignore
//! use kinetic_core::render::wgpu_modules::{GpuContext, WgpuInstanceBackend, WgpuShader};
//!
//! let context = GpuContext::headless_blocking()?;
//! let shader = WgpuShader::new(&context);
//! let backend = WgpuInstanceBackend::new(&context, &shader, format, None, &render_config);
//! ```

pub mod buffer;
pub mod context;
pub mod pipeline;
pub mod shader;
pub mod types;

// 重导出主要类型
pub use buffer::{FrameTarget, WgpuInstanceBackend};
pub use context::GpuContext;
pub use pipeline::{PipelineBuilder, ADDITIVE_BLENDING, RAIN_SHADER};
pub use shader::WgpuShader;
pub use types::{instance_buffer_layout, QuadVertex, RainUniforms, QUAD_VERTEX_COUNT};
