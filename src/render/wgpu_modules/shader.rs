//! wgpu 着色程序
//!
//! 持有 WGSL 模块和 uniform 缓冲区。`set_*` 只写 CPU 端的 [`RainUniforms`]，
//! `activate()` 时整块上传。

use std::collections::HashSet;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::context::GpuContext;
use super::pipeline::{PipelineBuilder, RAIN_SHADER};
use super::types::RainUniforms;
use crate::render::backend::ShaderProgram;

/// 雨滴着色程序
pub struct WgpuShader {
    context: GpuContext,
    module: wgpu::ShaderModule,
    uniforms: RainUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Arc<wgpu::BindGroup>,
    unknown: HashSet<String>,
}

impl WgpuShader {
    pub fn new(context: &GpuContext) -> Self {
        let device = context.device();
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rain Shader"),
            source: wgpu::ShaderSource::Wgsl(RAIN_SHADER.into()),
        });

        let uniforms = RainUniforms::default();
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Rain Uniform Buffer"),
            size: std::mem::size_of::<RainUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = PipelineBuilder::create_uniform_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Rain Uniform Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            context: context.clone(),
            module,
            uniforms,
            uniform_buffer,
            bind_group_layout,
            bind_group: Arc::new(bind_group),
            unknown: HashSet::new(),
        }
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// 与实例后端共享的 uniform 绑定组
    pub fn bind_group(&self) -> Arc<wgpu::BindGroup> {
        Arc::clone(&self.bind_group)
    }

    pub fn uniforms(&self) -> &RainUniforms {
        &self.uniforms
    }

    fn unknown_uniform(&mut self, name: &str) {
        if self.unknown.insert(name.to_string()) {
            tracing::warn!(target: "render", uniform = name, "Unknown uniform ignored");
        }
    }
}

impl ShaderProgram for WgpuShader {
    fn activate(&mut self) {
        self.context.queue().write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );
    }

    fn set_float(&mut self, name: &str, value: f32) {
        match name {
            "time" => self.uniforms.time = value,
            _ => self.unknown_uniform(name),
        }
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        match name {
            "quad_size" => self.uniforms.quad_size = value.to_array(),
            _ => self.unknown_uniform(name),
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        match name {
            "camera_position" => self.uniforms.camera_position = value.to_array(),
            _ => self.unknown_uniform(name),
        }
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        match name {
            "tint" => self.uniforms.tint = value.to_array(),
            _ => self.unknown_uniform(name),
        }
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        match name {
            "view_projection" => self.uniforms.view_projection = value.to_cols_array_2d(),
            _ => self.unknown_uniform(name),
        }
    }
}

impl Drop for WgpuShader {
    fn drop(&mut self) {
        self.uniform_buffer.destroy();
        tracing::debug!(target: "render", "Rain uniform buffer released");
    }
}
