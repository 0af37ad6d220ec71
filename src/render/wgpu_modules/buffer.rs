//! WGPU 实例缓冲区
//!
//! [`WgpuInstanceBackend`] 持有静态的四边形顶点缓冲区、N × 16 字节的实例缓冲区和雨滴管线。
//! 实例数据每帧整体替换，用 `Queue::write_buffer` 上传。

use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::context::GpuContext;
use super::pipeline::PipelineBuilder;
use super::shader::WgpuShader;
use super::types::QuadVertex;
use crate::config::RenderConfig;
use crate::core::error::{RenderError, RenderResult};
use crate::render::backend::{
    buffer_size, check_full_upload, check_partial_upload, InstanceBackend,
};

/// 一帧的绘制目标
pub struct FrameTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
    pub depth_view: Option<&'a wgpu::TextureView>,
    /// `Some` 时先清屏
    pub clear: Option<wgpu::Color>,
}

/// wgpu 实例化后端
pub struct WgpuInstanceBackend {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    bind_group: Arc<wgpu::BindGroup>,
    vertex_buffer: wgpu::Buffer,
    instance_buffer: Option<wgpu::Buffer>,
    capacity: usize,
}

impl WgpuInstanceBackend {
    pub fn new(
        context: &GpuContext,
        shader: &WgpuShader,
        format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        config: &RenderConfig,
    ) -> Self {
        let device = context.device();
        let pipeline = PipelineBuilder::create_rain_pipeline(
            device,
            format,
            depth_format,
            shader.module(),
            shader.bind_group_layout(),
            config,
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rain Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QuadVertex::quad()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            context: context.clone(),
            pipeline,
            bind_group: shader.bind_group(),
            vertex_buffer,
            instance_buffer: None,
            capacity: 0,
        }
    }

    fn instance_buffer(&self) -> RenderResult<&wgpu::Buffer> {
        self.instance_buffer
            .as_ref()
            .ok_or_else(|| RenderError::InvalidState("instance buffer not allocated".to_string()))
    }
}

impl InstanceBackend for WgpuInstanceBackend {
    type Target<'a> = FrameTarget<'a>;

    fn allocate(&mut self, capacity: usize) -> RenderResult<()> {
        let size = buffer_size(capacity);
        let max = self.context.device().limits().max_buffer_size;
        if size > max {
            return Err(RenderError::BufferSize {
                expected: size,
                actual: max,
            });
        }

        if let Some(old) = self.instance_buffer.take() {
            old.destroy();
        }
        self.instance_buffer = Some(self.context.device().create_buffer(
            &wgpu::BufferDescriptor {
                label: Some("Rain Instance Buffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        ));
        self.capacity = capacity;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn upload_full(&mut self, bytes: &[u8]) -> RenderResult<()> {
        check_full_upload(self.capacity, bytes)?;
        let buffer = self.instance_buffer()?;
        if !bytes.is_empty() {
            self.context.queue().write_buffer(buffer, 0, bytes);
        }
        Ok(())
    }

    fn upload_partial(&mut self, offset: u64, bytes: &[u8]) -> RenderResult<()> {
        check_partial_upload(self.capacity, offset, bytes)?;
        // write_buffer 要求偏移和长度都是 4 字节对齐
        if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0
            || bytes.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT != 0
        {
            return Err(RenderError::InvalidState(format!(
                "partial upload must be {}-byte aligned",
                wgpu::COPY_BUFFER_ALIGNMENT
            )));
        }
        let buffer = self.instance_buffer()?;
        if !bytes.is_empty() {
            self.context.queue().write_buffer(buffer, offset, bytes);
        }
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        target: &mut FrameTarget<'_>,
        vertex_count: u32,
        instance_count: u32,
    ) {
        let Some(instance_buffer) = self.instance_buffer.as_ref() else {
            tracing::debug!(target: "render", "Draw skipped: instance buffer not allocated");
            return;
        };
        let load = match target.clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Rain Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: target.depth_view.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, instance_buffer.slice(..));
        rpass.draw(0..vertex_count, 0..instance_count);
    }
}

impl Drop for WgpuInstanceBackend {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        if let Some(buffer) = self.instance_buffer.take() {
            buffer.destroy();
        }
        tracing::debug!(
            target: "render",
            capacity = self.capacity,
            "Rain GPU buffers released"
        );
    }
}
