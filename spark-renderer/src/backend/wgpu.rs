//! wgpu point-cloud backend.
//!
//! The high-fidelity ambient path: particle vertices are uploaded once per
//! pool change and displaced per frame in the vertex stage by a sinusoidal
//! drift driven by a clock uniform. Renders into an offscreen target owned
//! by this backend; the hosting surface composites it.

use wgpu::util::DeviceExt;

use crate::particle::{ParticleField, ParticleVertex};
use crate::{RenderError, RenderResult};

use super::{AmbientBackend, BackendKind};

/// Per-frame uniforms: clock plus scene rotation, padded to 16 bytes.
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct FrameUniforms {
    clock: f32,
    rotation_x: f32,
    rotation_y: f32,
    _pad: f32,
}

const SHADER: &str = r"
struct FrameUniforms {
    clock: f32,
    rotation_x: f32,
    rotation_y: f32,
    pad: f32,
};

@group(0) @binding(0) var<uniform> frame: FrameUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
    @location(3) phase: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    // Sinusoidal drift in the vertex stage.
    var pos = in.position;
    let t = frame.clock + in.phase;
    pos.y = pos.y + sin(t * 0.8) * 0.2;
    pos.x = pos.x + cos(t * 0.6) * 0.1;

    // Scene rotation from the smoothed pointer.
    let cx = cos(frame.rotation_x);
    let sx = sin(frame.rotation_x);
    let cy = cos(frame.rotation_y);
    let sy = sin(frame.rotation_y);
    let rotated = vec3<f32>(
        cy * pos.x + sy * pos.z,
        cx * pos.y - sx * (-sy * pos.x + cy * pos.z),
        sx * pos.y + cx * (-sy * pos.x + cy * pos.z),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(rotated.xy * 0.12, rotated.z * 0.05 + 0.5, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 0.85);
}
";

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    target: wgpu::Texture,
}

/// wgpu-based ambient point-cloud renderer.
pub struct WgpuBackend {
    gpu: Option<GpuState>,
    live_buffers: usize,
}

impl WgpuBackend {
    /// Create and fully initialize the GPU backend.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::GpuInit`] if no adapter or device is
    /// available; the caller falls back to the static path.
    pub fn new() -> RenderResult<Self> {
        let gpu = pollster::block_on(Self::init_gpu(800, 600))?;
        Ok(Self {
            gpu: Some(gpu),
            live_buffers: 2, // vertex + uniform
        })
    }

    async fn init_gpu(width: u32, height: u32) -> RenderResult<GpuState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::GpuInit("No suitable GPU adapter found".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Spark Ambient Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::GpuInit(e.to_string()))?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms {
                clock: 0.0,
                rotation_x: 0.0,
                rotation_y: 0.0,
                _pad: 0.0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("frame_uniforms_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_uniforms_bind"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline = Self::build_pipeline(&device, &bind_group_layout);

        // Grown on demand when the pool outgrows it.
        let vertex_capacity = 1024;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_vertices"),
            size: (vertex_capacity * std::mem::size_of::<ParticleVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let target = Self::create_target(&device, width, height);

        tracing::info!("wgpu ambient backend initialized: {:?}", adapter.get_info());

        Ok(GpuState {
            device,
            queue,
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            vertex_capacity,
            target,
        })
    }

    fn build_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ambient_drift"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ambient_pipeline_layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x3, 3 => Float32],
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ambient_points"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ambient_target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    fn ensure_vertex_capacity(gpu: &mut GpuState, needed: usize) {
        if needed <= gpu.vertex_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        gpu.vertex_buffer.destroy();
        gpu.vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_vertices"),
            size: (capacity * std::mem::size_of::<ParticleVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        gpu.vertex_capacity = capacity;
    }
}

impl AmbientBackend for WgpuBackend {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render(&mut self, field: &ParticleField) -> RenderResult<()> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Err(RenderError::Disposed);
        };

        let vertices = field.vertices();
        Self::ensure_vertex_capacity(gpu, vertices.len());

        let [rotation_x, rotation_y] = field.rotation();
        gpu.queue.write_buffer(
            &gpu.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                clock: field.clock(),
                rotation_x,
                rotation_y,
                _pad: 0.0,
            }),
        );
        if !vertices.is_empty() {
            gpu.queue
                .write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }

        let view = gpu.target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ambient_frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ambient_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&gpu.pipeline);
            pass.set_bind_group(0, &gpu.bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.draw(0..vertices.len() as u32, 0..1);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.target.destroy();
            gpu.target = Self::create_target(&gpu.device, width, height);
        }
        tracing::debug!("wgpu ambient target resized to {width}x{height}");
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.vertex_buffer.destroy();
            gpu.uniform_buffer.destroy();
            gpu.target.destroy();
            self.live_buffers = 0;
            tracing::debug!("wgpu ambient backend disposed");
        }
    }

    fn live_buffers(&self) -> usize {
        self.live_buffers
    }
}

impl Drop for WgpuBackend {
    fn drop(&mut self) {
        self.dispose();
    }
}
