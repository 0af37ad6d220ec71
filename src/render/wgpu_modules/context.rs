//! GPU 上下文
//!
//! 任何 wgpu 后端的构造都需要一个 [`GpuContext`]，因此"图形上下文已就绪"
//! 这一前置条件由类型保证。获取上下文是唯一可能失败的图形步骤。

use std::sync::Arc;

use crate::core::error::{RenderError, RenderResult};

/// 设备与队列
#[derive(Clone)]
pub struct GpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// 为指定适配器请求设备
    pub async fn from_adapter(adapter: &wgpu::Adapter) -> RenderResult<Self> {
        let info = adapter.get_info();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    label: Some("Rain Device"),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::DeviceRequest(e.to_string()))?;

        tracing::info!(
            target: "render",
            adapter = %info.name,
            backend = ?info.backend,
            "GPU device acquired"
        );
        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    /// 不依赖窗口创建上下文（离屏渲染、测试）
    pub async fn headless() -> RenderResult<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        Self::from_adapter(&adapter).await
    }

    /// [`headless`](Self::headless) 的阻塞版本
    pub fn headless_blocking() -> RenderResult<Self> {
        pollster::block_on(Self::headless())
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
