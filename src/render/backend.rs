//! 渲染后端抽象
//!
//! 粒子核心只依赖两个外部协作者：
//!
//! - [`InstanceBackend`]: GPU 缓冲区与实例化绘制（创建、整块/局部上传、实例化绘制）
//! - [`ShaderProgram`]: 着色程序句柄（激活、按名称设置 uniform）
//!
//! 提供 `HeadlessBackend` / `HeadlessShader` 两个 CPU 实现，用于测试与基准，
//! wgpu 实现位于 [`crate::render::wgpu_modules`]。

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::core::error::{RenderError, RenderResult};

/// 每实例属性步长：一个 vec4
pub const INSTANCE_STRIDE: u64 = 16;

/// GPU 实例缓冲区与实例化绘制
pub trait InstanceBackend {
    /// 绘制目标（wgpu 为命令编码器 + 纹理视图，Headless 为 `()`）
    type Target<'a>;

    /// 分配可容纳 `capacity` 个实例的缓冲区，正好 `capacity * 16` 字节
    fn allocate(&mut self, capacity: usize) -> RenderResult<()>;

    /// 已分配的实例容量
    fn capacity(&self) -> usize;

    /// 替换整个缓冲区内容，`bytes` 长度必须等于缓冲区大小
    fn upload_full(&mut self, bytes: &[u8]) -> RenderResult<()>;

    /// 局部更新
    fn upload_partial(&mut self, offset: u64, bytes: &[u8]) -> RenderResult<()>;

    /// 一次实例化绘制，每实例属性除数为 1
    fn draw_instanced(&mut self, target: &mut Self::Target<'_>, vertex_count: u32, instance_count: u32);
}

/// 着色程序句柄
pub trait ShaderProgram {
    fn activate(&mut self);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_vec2(&mut self, name: &str, value: Vec2);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_vec4(&mut self, name: &str, value: Vec4);
    fn set_mat4(&mut self, name: &str, value: Mat4);
}

/// 缓冲区大小（字节）
#[inline]
pub fn buffer_size(capacity: usize) -> u64 {
    capacity as u64 * INSTANCE_STRIDE
}

pub(crate) fn check_full_upload(capacity: usize, bytes: &[u8]) -> RenderResult<()> {
    let expected = buffer_size(capacity);
    if bytes.len() as u64 != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: bytes.len() as u64,
        });
    }
    Ok(())
}

pub(crate) fn check_partial_upload(capacity: usize, offset: u64, bytes: &[u8]) -> RenderResult<()> {
    let total = buffer_size(capacity);
    let len = bytes.len() as u64;
    if offset.checked_add(len).map_or(true, |end| end > total) {
        return Err(RenderError::UploadOutOfBounds {
            offset,
            len,
            capacity: total,
        });
    }
    Ok(())
}

/// 一次绘制调用的记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_count: u32,
    pub instance_count: u32,
    /// 每实例属性除数
    pub divisor: u32,
    pub stride: u64,
}

/// CPU 端的 GPU 缓冲区镜像
///
/// 记录上传内容、绘制次数与最近一次绘制调用，不访问任何图形 API。
/// 占用内存与运行帧数无关。
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    buffer: Vec<u8>,
    capacity: usize,
    allocations: u32,
    uploads: u64,
    draw_count: u64,
    last_draw: Option<DrawCall>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前缓冲区内容
    pub fn contents(&self) -> &[u8] {
        &self.buffer
    }

    /// 累计绘制调用次数
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// 最近一次绘制调用
    pub fn last_draw(&self) -> Option<DrawCall> {
        self.last_draw
    }

    pub fn allocations(&self) -> u32 {
        self.allocations
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

impl InstanceBackend for HeadlessBackend {
    type Target<'a> = ();

    fn allocate(&mut self, capacity: usize) -> RenderResult<()> {
        self.buffer = vec![0; buffer_size(capacity) as usize];
        self.capacity = capacity;
        self.allocations += 1;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn upload_full(&mut self, bytes: &[u8]) -> RenderResult<()> {
        check_full_upload(self.capacity, bytes)?;
        self.buffer.copy_from_slice(bytes);
        self.uploads += 1;
        Ok(())
    }

    fn upload_partial(&mut self, offset: u64, bytes: &[u8]) -> RenderResult<()> {
        check_partial_upload(self.capacity, offset, bytes)?;
        let start = offset as usize;
        self.buffer[start..start + bytes.len()].copy_from_slice(bytes);
        self.uploads += 1;
        Ok(())
    }

    fn draw_instanced(&mut self, _target: &mut (), vertex_count: u32, instance_count: u32) {
        self.draw_count += 1;
        self.last_draw = Some(DrawCall {
            vertex_count,
            instance_count,
            divisor: 1,
            stride: INSTANCE_STRIDE,
        });
    }
}

/// uniform 值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// 记录 uniform 的着色程序
#[derive(Debug, Default)]
pub struct HeadlessShader {
    uniforms: HashMap<String, UniformValue>,
    activations: u32,
}

impl HeadlessShader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        // 已有名称原地覆盖，只有首次出现时分配键
        match self.uniforms.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.uniforms.insert(name.to_string(), value);
            }
        }
    }
}

impl ShaderProgram for HeadlessShader {
    fn activate(&mut self) {
        self.activations += 1;
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set(name, UniformValue::Mat4(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sizes_buffer_exactly() {
        let mut backend = HeadlessBackend::new();
        backend.allocate(100).unwrap();
        assert_eq!(backend.contents().len(), 1600);
        assert_eq!(backend.capacity(), 100);
    }

    #[test]
    fn test_full_upload_size_mismatch() {
        let mut backend = HeadlessBackend::new();
        backend.allocate(2).unwrap();
        let err = backend.upload_full(&[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            RenderError::BufferSize {
                expected: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn test_partial_upload_bounds() {
        let mut backend = HeadlessBackend::new();
        backend.allocate(2).unwrap();
        backend.upload_partial(16, &[7u8; 16]).unwrap();
        assert_eq!(&backend.contents()[16..], &[7u8; 16]);
        assert!(matches!(
            backend.upload_partial(24, &[0u8; 16]),
            Err(RenderError::UploadOutOfBounds { .. })
        ));
        assert!(backend.upload_partial(u64::MAX, &[0u8; 1]).is_err());
    }

    #[test]
    fn test_draw_log_is_bounded() {
        let mut backend = HeadlessBackend::new();
        backend.allocate(4).unwrap();
        for frame in 0..100_000u32 {
            backend.draw_instanced(&mut (), 6, frame % 4 + 1);
        }
        assert_eq!(backend.draw_count(), 100_000);
        assert_eq!(
            backend.last_draw(),
            Some(DrawCall {
                vertex_count: 6,
                instance_count: 4,
                divisor: 1,
                stride: INSTANCE_STRIDE,
            })
        );
    }

    #[test]
    fn test_headless_shader_overwrites_in_place() {
        let mut shader = HeadlessShader::new();
        for frame in 0..1000 {
            shader.set_float("time", frame as f32);
            shader.set_vec2("quad_size", Vec2::ONE);
        }
        assert_eq!(shader.uniforms.len(), 2);
        assert_eq!(shader.uniform("time"), Some(UniformValue::Float(999.0)));
    }

    #[test]
    fn test_headless_shader_records_uniforms() {
        let mut shader = HeadlessShader::new();
        shader.activate();
        shader.set_float("time", 1.5);
        shader.set_mat4("view_projection", Mat4::IDENTITY);
        assert_eq!(shader.activations(), 1);
        assert_eq!(shader.uniform("time"), Some(UniformValue::Float(1.5)));
        assert_eq!(
            shader.uniform("view_projection"),
            Some(UniformValue::Mat4(Mat4::IDENTITY))
        );
        assert_eq!(shader.uniform("missing"), None);
    }
}
