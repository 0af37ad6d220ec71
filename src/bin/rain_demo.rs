//! 雨滴演示
//!
//! 用法: `rain_demo [config.toml|config.json]`
//!
//! 相机绕一个缓慢前移的中心点旋转，雨滴始终在相机脚下生成。Esc 退出。

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use kinetic_core::config::{ConfigResult, RainConfig};
use kinetic_core::core::{init_logging, FrameClock, RainError, RainResult, RenderError};
use kinetic_core::render::{FrameTarget, GpuContext, ObserverContext, WgpuInstanceBackend, WgpuShader};
use kinetic_core::RainSystem;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const ORBIT_RADIUS: f32 = 12.0;
const ORBIT_SPEED: f32 = 0.15;
const DRIFT_SPEED: f32 = 2.0;
const EYE_HEIGHT: f32 = 4.0;

fn main() {
    if let Err(e) = run() {
        eprintln!("Rain demo failed to start: {}", e);
        std::process::exit(1);
    }
}

fn load_config() -> ConfigResult<RainConfig> {
    match std::env::args().nth(1) {
        Some(path) => RainConfig::load(path),
        None => {
            let mut config = RainConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

fn run() -> RainResult<()> {
    let config = load_config()?;
    init_logging(&config.logging);

    let event_loop = EventLoop::new()
        .map_err(|e| RainError::EventLoop(format!("Failed to create event loop: {}", e)))?;
    let window = WindowBuilder::new()
        .with_title("Kinetic Rain")
        .with_inner_size(LogicalSize::new(1280.0, 720.0))
        .build(&event_loop)
        .map_err(|e| RainError::Window(e.to_string()))?;

    let mut demo = pollster::block_on(RainDemo::new(Arc::new(window), &config))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => elwt.exit(),
            WindowEvent::Resized(size) => demo.resize(size),
            WindowEvent::RedrawRequested => {
                demo.frame();
                if let Err(e) = demo.render() {
                    tracing::error!(target: "engine", "Render failed: {}", e);
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => demo.window.request_redraw(),
        _ => {}
    });

    result.map_err(|e| RainError::EventLoop(format!("Event loop error: {}", e)))?;
    tracing::info!(target: "engine", "Rain demo shutting down");
    Ok(())
}

struct RainDemo {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    context: GpuContext,
    depth_view: wgpu::TextureView,
    rain: RainSystem<WgpuInstanceBackend, WgpuShader>,
    clock: FrameClock,
    observer: ObserverContext,
    clear: wgpu::Color,
}

impl RainDemo {
    async fn new(window: Arc<Window>, config: &RainConfig) -> RainResult<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let context = GpuContext::from_adapter(&adapter).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RenderError::SurfaceCreation("no supported surface format".to_string()))?;
        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(context.device(), &surface_config);
        let depth_view = create_depth_view(context.device(), &surface_config);

        let shader = WgpuShader::new(&context);
        let backend =
            WgpuInstanceBackend::new(&context, &shader, format, Some(DEPTH_FORMAT), &config.render);
        let rain = RainSystem::construct(config, backend, shader, StdRng::from_entropy())?;

        let [r, g, b, a] = config.render.clear_color;
        let spawn = config.spawn.color;
        Ok(Self {
            window,
            surface,
            surface_config,
            context,
            depth_view,
            rain,
            clock: FrameClock::new(config.simulation.max_dt),
            observer: ObserverContext {
                tint: Vec4::from_array(spawn),
                ..Default::default()
            },
            clear: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: f64::from(a),
            },
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(self.context.device(), &self.surface_config);
        self.depth_view = create_depth_view(self.context.device(), &self.surface_config);
        tracing::debug!(target: "engine", width = size.width, height = size.height, "Surface resized");
    }

    /// 推进相机与模拟
    fn frame(&mut self) {
        let dt = self.clock.tick();
        let t = self.clock.elapsed_seconds() as f32;

        let center = Vec3::new(t * DRIFT_SPEED, 0.0, 0.0);
        let angle = t * ORBIT_SPEED;
        let eye = center + Vec3::new(angle.cos() * ORBIT_RADIUS, EYE_HEIGHT, angle.sin() * ORBIT_RADIUS);
        let aspect = self.surface_config.width as f32 / self.surface_config.height as f32;
        let view = Mat4::look_at_rh(eye, center + Vec3::Y * 2.0, Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), aspect, 0.1, 200.0);

        self.observer.view_projection = projection * view;
        self.observer.camera_position = eye;
        self.observer.time = t;

        self.rain.step(dt, self.observer.anchor());

        if self.clock.frame_count() % 600 == 0 {
            let stats = self.rain.pool().stats();
            tracing::debug!(
                target: "engine",
                active = stats.active,
                splashed = stats.splashed,
                overwritten = stats.overwritten,
                "Rain frame stats"
            );
        }
    }

    fn render(&mut self) -> RainResult<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(self.context.device(), &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(RenderError::Surface(e.to_string()).into()),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Rain Encoder"),
            });

        {
            let mut target = FrameTarget {
                encoder: &mut encoder,
                view: &view,
                depth_view: Some(&self.depth_view),
                clear: Some(self.clear),
            };
            self.rain.draw(&self.observer, &mut target)?;
        }

        self.context.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
