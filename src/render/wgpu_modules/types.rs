//! WGPU 公共类型定义
//!
//! 顶点模板、实例属性布局与 uniform 块。

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::render::backend::INSTANCE_STRIDE;

/// 四边形模板的顶点数（两个三角形）
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// 四边形模板顶点
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// 角点 (-1..1)，在着色器中乘以 `quad_size`
    pub corner: [f32; 2],
}

impl QuadVertex {
    /// 获取顶点缓冲区布局
    pub fn vertex_buffer_layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }

    /// 创建四边形顶点数据
    pub fn quad() -> [QuadVertex; QUAD_VERTEX_COUNT as usize] {
        [
            QuadVertex { corner: [-1.0, -1.0] },
            QuadVertex { corner: [1.0, -1.0] },
            QuadVertex { corner: [1.0, 1.0] },
            QuadVertex { corner: [-1.0, -1.0] },
            QuadVertex { corner: [1.0, 1.0] },
            QuadVertex { corner: [-1.0, 1.0] },
        ]
    }
}

/// 每实例属性布局：一个 `Float32x4`，每实例前进一次
pub fn instance_buffer_layout<'a>() -> wgpu::VertexBufferLayout<'a> {
    wgpu::VertexBufferLayout {
        array_stride: INSTANCE_STRIDE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4,
        }],
    }
}

/// 雨滴 uniform 块
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RainUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub time: f32,
    pub tint: [f32; 4],
    pub quad_size: [f32; 2],
    /// 填充对齐
    pub _pad: [f32; 2],
}

impl Default for RainUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: Vec3::ZERO.to_array(),
            time: 0.0,
            tint: Vec4::ONE.to_array(),
            quad_size: Vec2::ONE.to_array(),
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<RainUniforms>(), 112);
        assert_eq!(std::mem::size_of::<RainUniforms>() % 16, 0);
    }

    #[test]
    fn test_quad_covers_unit_square() {
        let quad = QuadVertex::quad();
        assert_eq!(quad.len(), QUAD_VERTEX_COUNT as usize);
        assert!(quad.iter().all(|v| v.corner[0].abs() == 1.0 && v.corner[1].abs() == 1.0));
    }

    #[test]
    fn test_instance_stride_is_one_vec4() {
        let layout = instance_buffer_layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(std::mem::size_of::<Vec4>() as u64, layout.array_stride);
    }
}
