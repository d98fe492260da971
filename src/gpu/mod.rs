//! wgpu renderer.
//!
//! Draw order per frame:
//!
//! 1. starfield billboards (depth test, no depth write)
//! 2. opaque spheres: star, planets, asteroids
//! 3. translucent rings: orbit paths and body rings (double sided)
//! 4. translucent halos (depth test, no depth write)
//! 5. egui overlay
//!
//! Instance data comes from [`crate::scene`]; this module only uploads and
//! draws it.

pub mod camera;
pub mod egui_integration;
pub mod mesh;
pub mod shaders;

use std::sync::Arc;

use bytemuck::Pod;
use glam::Vec3;
use tracing::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::bodies::hex_to_rgb;
use crate::error::GpuError;
use crate::scene::{BodyInstances, Instance, StarInstance, StaticScene};

pub use camera::Camera;
pub use egui_integration::{EguiFrameOutput, EguiIntegration};
pub use shaders::SceneUniforms;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Point light at the star.
pub const LIGHT_INTENSITY: f32 = 1.5;
pub const AMBIENT_COLOR: u32 = 0x333333;

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
    7 => Float32x4,
];
const SPHERE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const RING_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32];
const STAR_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

/// Per-frame values that feed the uniform block.
pub fn scene_uniforms(camera: &Camera, aspect: f32, background: u32, fog_density: f32) -> SceneUniforms {
    let view = camera.view_matrix();
    let right = view.row(0).truncate();
    let up = view.row(1).truncate();
    let [fr, fg, fb] = hex_to_rgb(background);
    let [ar, ag, ab] = hex_to_rgb(AMBIENT_COLOR);

    SceneUniforms {
        view_proj: camera.view_projection(aspect).to_cols_array_2d(),
        camera_pos: camera.position().extend(1.0).to_array(),
        camera_right: right.extend(0.0).to_array(),
        camera_up: up.extend(0.0).to_array(),
        light: Vec3::ZERO.extend(LIGHT_INTENSITY).to_array(),
        ambient: [ar, ag, ab, 1.0],
        fog: [fr, fg, fb, fog_density],
    }
}

/// Background color for the clear pass.
pub fn clear_color(background: u32) -> wgpu::Color {
    let [r, g, b] = hex_to_rgb(background);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// Instance buffer that grows to fit.
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
    label: &'static str,
}

impl InstanceBuffer {
    fn new<T: Pod>(device: &wgpu::Device, label: &'static str, data: &[T]) -> Self {
        let buffer = if data.is_empty() {
            Self::allocate::<T>(device, label, 1)
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        };
        Self {
            buffer,
            capacity: data.len().max(1),
            len: data.len() as u32,
            label,
        }
    }

    fn allocate<T: Pod>(device: &wgpu::Device, label: &'static str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<T>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.len() > self.capacity {
            self.capacity = data.len().next_power_of_two();
            debug!(label = self.label, capacity = self.capacity, "growing instance buffer");
            self.buffer = Self::allocate::<T>(device, self.label, self.capacity);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.len = data.len() as u32;
    }
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new<V: Pod>(device: &wgpu::Device, label: &str, mesh: &mesh::Mesh<V>) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw<'a>(&self, pass: &mut wgpu::RenderPass<'a>, instances: &InstanceBuffer) {
        if instances.len == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_vertex_buffer(1, instances.buffer.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..instances.len);
    }
}

/// Everything that varies per frame.
pub struct FrameData<'a> {
    pub uniforms: SceneUniforms,
    pub background: u32,
    pub bodies: &'a BodyInstances,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    opaque_pipeline: wgpu::RenderPipeline,
    halo_pipeline: wgpu::RenderPipeline,
    ring_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,

    sphere: MeshBuffers,
    annulus: MeshBuffers,

    stars: InstanceBuffer,
    asteroids: InstanceBuffer,
    orbit_paths: InstanceBuffer,
    solid: InstanceBuffer,
    halos: InstanceBuffer,
    rings: InstanceBuffer,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        scene: &StaticScene,
        sphere_segments: u32,
        ring_segments: u32,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        info!(adapter = ?adapter.get_info().name, backend = ?adapter.get_info().backend, "using adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // egui expects a non-sRGB target; colors are authored in display space
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniforms = scene_uniforms(&Camera::default(), 1.0, 0, 0.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        };
        let sphere_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<mesh::SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &SPHERE_ATTRIBUTES,
        };
        let ring_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<mesh::RingVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &RING_ATTRIBUTES,
        };
        let star_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &STAR_ATTRIBUTES,
        };

        let sphere_shader = create_shader(&device, "Sphere Shader", &shaders::sphere_shader());
        let ring_shader = create_shader(&device, "Ring Shader", &shaders::ring_shader());
        let star_shader = create_shader(&device, "Star Shader", &shaders::star_shader());

        let format = config.format;
        let opaque_pipeline = create_pipeline(
            &device,
            &layout,
            "Opaque Sphere Pipeline",
            &sphere_shader,
            &[sphere_layout.clone(), instance_layout.clone()],
            format,
            PipelineStyle::OPAQUE,
        );
        let halo_pipeline = create_pipeline(
            &device,
            &layout,
            "Halo Pipeline",
            &sphere_shader,
            &[sphere_layout, instance_layout.clone()],
            format,
            PipelineStyle::TRANSLUCENT,
        );
        let ring_pipeline = create_pipeline(
            &device,
            &layout,
            "Ring Pipeline",
            &ring_shader,
            &[ring_layout, instance_layout],
            format,
            PipelineStyle::TRANSLUCENT,
        );
        let star_pipeline = create_pipeline(
            &device,
            &layout,
            "Star Pipeline",
            &star_shader,
            &[star_layout],
            format,
            PipelineStyle::TRANSLUCENT,
        );

        let sphere = MeshBuffers::new(&device, "Sphere", &mesh::uv_sphere(sphere_segments));
        let annulus = MeshBuffers::new(&device, "Annulus", &mesh::annulus(ring_segments));

        let stars = InstanceBuffer::new(&device, "Star Instances", &scene.stars);
        let asteroids = InstanceBuffer::new(&device, "Asteroid Instances", &scene.asteroids);
        let orbit_paths = InstanceBuffer::new(&device, "Orbit Path Instances", &scene.orbit_paths);
        let solid = InstanceBuffer::new::<Instance>(&device, "Body Instances", &[]);
        let halos = InstanceBuffer::new::<Instance>(&device, "Halo Instances", &[]);
        let rings = InstanceBuffer::new::<Instance>(&device, "Ring Instances", &[]);

        info!(
            format = ?config.format,
            width = config.width,
            height = config.height,
            stars = stars.len,
            asteroids = asteroids.len,
            "renderer ready"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            uniform_buffer,
            uniform_bind_group,
            opaque_pipeline,
            halo_pipeline,
            ring_pipeline,
            star_pipeline,
            sphere,
            annulus,
            stars,
            asteroids,
            orbit_paths,
            solid,
            halos,
            rings,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(
        &mut self,
        frame: &FrameData<'_>,
        egui: &mut EguiIntegration,
        egui_output: &EguiFrameOutput,
    ) -> Result<(), wgpu::SurfaceError> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&frame.uniforms));
        self.solid.write(&self.device, &self.queue, &frame.bodies.solid);
        self.halos.write(&self.device, &self.queue, &frame.bodies.halos);
        self.rings.write(&self.device, &self.queue, &frame.bodies.rings);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: egui_output.pixels_per_point,
        };
        let egui_commands = egui.prepare(
            &self.device,
            &self.queue,
            &mut encoder,
            egui_output,
            &screen_descriptor,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(frame.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if self.stars.len > 0 {
                pass.set_pipeline(&self.star_pipeline);
                pass.set_vertex_buffer(0, self.stars.buffer.slice(..));
                pass.draw(0..6, 0..self.stars.len);
            }

            pass.set_pipeline(&self.opaque_pipeline);
            self.sphere.draw(&mut pass, &self.solid);
            self.sphere.draw(&mut pass, &self.asteroids);

            pass.set_pipeline(&self.ring_pipeline);
            self.annulus.draw(&mut pass, &self.orbit_paths);
            self.annulus.draw(&mut pass, &self.rings);

            pass.set_pipeline(&self.halo_pipeline);
            self.sphere.draw(&mut pass, &self.halos);
        }

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            egui.render(&mut pass.forget_lifetime(), egui_output, &screen_descriptor);
        }

        self.queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        egui.cleanup(egui_output);

        Ok(())
    }
}

/// Blend and depth behavior of a pipeline.
#[derive(Clone, Copy)]
struct PipelineStyle {
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    cull_mode: Option<wgpu::Face>,
}

impl PipelineStyle {
    const OPAQUE: Self = Self {
        blend: None,
        depth_write: true,
        cull_mode: Some(wgpu::Face::Back),
    };
    const TRANSLUCENT: Self = Self {
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        depth_write: false,
        cull_mode: None,
    };
}

fn create_shader(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout],
    format: wgpu::TextureFormat,
    style: PipelineStyle,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: style.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: style.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: style.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
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
