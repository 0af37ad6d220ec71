//! 渲染提交器
//!
//! 每帧把粒子池的打包渲染数组整块上传到 GPU，然后对固定的两三角形四边形模板
//! 发出恰好一次实例化绘制，实例数 = N。
//!
//! 粒子池已经以 SoA 形式直接存放 `Vec4` 渲染数组，所以这里没有提取过程：
//! `bytemuck::cast_slice` 把 `&[Vec4]` 视为 `&[u8]` 直接交给后端。

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::backend::{buffer_size, InstanceBackend, ShaderProgram};
use super::wgpu_modules::types::QUAD_VERTEX_COUNT;
use crate::config::RenderConfig;
use crate::core::error::RenderResult;

/// 观察者上下文，由驱动每帧提供
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverContext {
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    /// 颜色调制（alpha 用于整体透明度）
    pub tint: Vec4,
    /// 累计时间（秒）
    pub time: f32,
}

impl Default for ObserverContext {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            tint: Vec4::ONE,
            time: 0.0,
        }
    }
}

impl ObserverContext {
    /// 观察者在水平面上的投影，即生成锚点
    pub fn anchor(&self) -> Vec2 {
        Vec2::new(self.camera_position.x, self.camera_position.z)
    }
}

/// 提交统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubmitStats {
    pub frames: u64,
    pub bytes_uploaded: u64,
    pub instances_drawn: u64,
}

/// 渲染提交器
pub struct RenderSubmitter<B: InstanceBackend> {
    backend: B,
    capacity: usize,
    quad_size: Vec2,
    stats: SubmitStats,
}

impl<B: InstanceBackend> RenderSubmitter<B> {
    /// 创建提交器，一次性分配 `capacity * 16` 字节的实例缓冲区
    pub fn new(mut backend: B, capacity: usize, config: &RenderConfig) -> RenderResult<Self> {
        backend.allocate(capacity)?;
        tracing::info!(
            target: "render",
            capacity,
            bytes = buffer_size(capacity),
            "Instance buffer allocated"
        );
        Ok(Self {
            backend,
            capacity,
            quad_size: Vec2::from_array(config.quad_size()),
            stats: SubmitStats::default(),
        })
    }

    /// 提交一帧
    ///
    /// 只读取 `render_data`，不修改任何 CPU 端状态（统计除外）。
    pub fn draw<S: ShaderProgram>(
        &mut self,
        render_data: &[Vec4],
        observer: &ObserverContext,
        shader: &mut S,
        target: &mut B::Target<'_>,
    ) -> RenderResult<()> {
        shader.set_mat4("view_projection", observer.view_projection);
        shader.set_vec3("camera_position", observer.camera_position);
        shader.set_vec4("tint", observer.tint);
        shader.set_vec2("quad_size", self.quad_size);
        shader.set_float("time", observer.time);
        shader.activate();

        let bytes: &[u8] = bytemuck::cast_slice(render_data);
        self.backend.upload_full(bytes)?;

        let instances = render_data.len() as u32;
        self.backend
            .draw_instanced(target, QUAD_VERTEX_COUNT, instances);

        self.stats.frames += 1;
        self.stats.bytes_uploaded += bytes.len() as u64;
        self.stats.instances_drawn += u64::from(instances);
        tracing::trace!(target: "render", instances, "Rain instances submitted");
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> SubmitStats {
        self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RenderError;
    use crate::render::backend::{HeadlessBackend, HeadlessShader, UniformValue};

    fn submitter(capacity: usize) -> RenderSubmitter<HeadlessBackend> {
        RenderSubmitter::new(HeadlessBackend::new(), capacity, &RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_single_instanced_draw_per_frame() {
        let mut submitter = submitter(8);
        let mut shader = HeadlessShader::new();
        let data = vec![Vec4::new(1.0, 2.0, 3.0, 1.0); 8];

        submitter
            .draw(&data, &ObserverContext::default(), &mut shader, &mut ())
            .unwrap();

        assert_eq!(submitter.backend().draw_count(), 1);
        let call = submitter.backend().last_draw().unwrap();
        assert_eq!(call.instance_count, 8);
        assert_eq!(call.vertex_count, QUAD_VERTEX_COUNT);
        assert_eq!(call.divisor, 1);
        assert_eq!(call.stride, 16);
        assert_eq!(submitter.backend().allocations(), 1);
    }

    #[test]
    fn test_upload_matches_render_data_bytes() {
        let mut submitter = submitter(3);
        let mut shader = HeadlessShader::new();
        let data = [
            Vec4::new(1.0, 2.0, 3.0, 0.5),
            Vec4::ZERO,
            Vec4::new(-1.0, 0.001, 4.0, -0.1),
        ];

        submitter
            .draw(&data, &ObserverContext::default(), &mut shader, &mut ())
            .unwrap();

        let expected: &[u8] = bytemuck::cast_slice(&data);
        assert_eq!(submitter.backend().contents(), expected);
        assert_eq!(submitter.stats().bytes_uploaded, 48);
    }

    #[test]
    fn test_repeated_draw_is_byte_identical() {
        let mut submitter = submitter(4);
        let mut shader = HeadlessShader::new();
        let data = vec![Vec4::new(0.5, 10.0, -2.0, 1.2); 4];
        let observer = ObserverContext::default();

        submitter.draw(&data, &observer, &mut shader, &mut ()).unwrap();
        let first = submitter.backend().contents().to_vec();
        submitter.draw(&data, &observer, &mut shader, &mut ()).unwrap();

        assert_eq!(submitter.backend().contents(), first.as_slice());
        assert_eq!(submitter.stats().frames, 2);
        assert_eq!(submitter.backend().allocations(), 1);
    }

    #[test]
    fn test_uniforms_set_before_draw() {
        let mut submitter = submitter(1);
        let mut shader = HeadlessShader::new();
        let observer = ObserverContext {
            camera_position: Vec3::new(1.0, 2.0, 3.0),
            time: 4.0,
            ..Default::default()
        };

        submitter
            .draw(&[Vec4::ZERO], &observer, &mut shader, &mut ())
            .unwrap();

        assert_eq!(shader.activations(), 1);
        assert_eq!(
            shader.uniform("camera_position"),
            Some(UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(shader.uniform("time"), Some(UniformValue::Float(4.0)));
        assert_eq!(
            shader.uniform("quad_size"),
            Some(UniformValue::Vec2(Vec2::new(0.015, 0.3)))
        );
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let mut submitter = submitter(4);
        let mut shader = HeadlessShader::new();
        let err = submitter
            .draw(&[Vec4::ZERO; 2], &ObserverContext::default(), &mut shader, &mut ())
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::BufferSize {
                expected: 64,
                actual: 32
            }
        );
        assert_eq!(submitter.backend().draw_count(), 0);
        assert!(submitter.backend().last_draw().is_none());
    }

    #[test]
    fn test_observer_anchor_is_horizontal_footprint() {
        let observer = ObserverContext {
            camera_position: Vec3::new(3.0, 50.0, -7.0),
            ..Default::default()
        };
        assert_eq!(observer.anchor(), Vec2::new(3.0, -7.0));
    }
}
