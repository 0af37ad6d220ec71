//! WGPU 管线创建
//!
//! 雨滴管线：顶点缓冲区 0 为四边形模板，顶点缓冲区 1 为每实例 `vec4`。

use super::types::{instance_buffer_layout, QuadVertex, RainUniforms};
use crate::config::RenderConfig;

/// 加法混合：颜色按 alpha 叠加到背景上
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// 管线构建器
pub struct PipelineBuilder;

impl PipelineBuilder {
    /// 创建雨滴实例化渲染管线
    pub fn create_rain_pipeline(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        module: &wgpu::ShaderModule,
        uniform_bgl: &wgpu::BindGroupLayout,
        config: &RenderConfig,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Rain Pipeline Layout"),
            bind_group_layouts: &[uniform_bgl],
            push_constant_ranges: &[],
        });

        let blend = if config.additive_blend {
            ADDITIVE_BLENDING
        } else {
            wgpu::BlendState::ALPHA_BLENDING
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rain Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: "vs",
                buffers: &[QuadVertex::vertex_buffer_layout(), instance_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: "fs",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: config.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    /// 创建 Uniform 绑定组布局
    pub fn create_uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Rain Uniform BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<RainUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        })
    }
}

/// 雨滴着色器
///
/// `w > 0` 画成竖直细长条，长度乘以缩放；`w < 0` 画成贴地的扁平溅射，
/// 随剩余寿命淡出；`w == 0` 的休眠槽位所有顶点重合，不产生片元。
pub const RAIN_SHADER: &str = r#"
struct Uniforms {
    view_projection: mat4x4<f32>,
    camera_position: vec3<f32>,
    time: f32,
    tint: vec4<f32>,
    quad_size: vec2<f32>,
    _pad: vec2<f32>,
};
@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) fade: f32,
};

@vertex
fn vs(@location(0) corner: vec2<f32>, @location(1) packed: vec4<f32>) -> VsOut {
    var out: VsOut;
    let w = packed.w;

    if (w == 0.0) {
        out.clip = vec4<f32>(0.0, 0.0, 2.0, 1.0);
        out.corner = vec2<f32>(0.0, 0.0);
        out.fade = 0.0;
        return out;
    }

    // 绕 Y 轴朝向相机的柱状公告板
    let to_camera = u.camera_position - packed.xyz;
    var right = vec3<f32>(to_camera.z, 0.0, -to_camera.x);
    if (dot(right, right) < 1e-8) {
        right = vec3<f32>(1.0, 0.0, 0.0);
    }
    right = normalize(right);

    var size = vec2<f32>(u.quad_size.x, u.quad_size.y * w);
    var up = vec3<f32>(0.0, 1.0, 0.0);
    var fade = 1.0;
    if (w < 0.0) {
        let remaining = -w;
        size = vec2<f32>(u.quad_size.y * 0.25, u.quad_size.x * 2.0);
        up = normalize(cross(right, vec3<f32>(0.0, 1.0, 0.0)));
        fade = clamp(remaining * 8.0, 0.0, 1.0);
    }

    let world = packed.xyz + right * corner.x * size.x + up * corner.y * size.y;
    out.clip = u.view_projection * vec4<f32>(world, 1.0);
    out.corner = corner;
    out.fade = fade;
    return out;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
    let edge = 1.0 - abs(in.corner.x);
    let alpha = u.tint.a * edge * in.fade;
    return vec4<f32>(u.tint.rgb, alpha);
}
"#;
