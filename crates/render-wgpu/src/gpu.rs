use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use morphsphere_common::ShaderUniforms;
use morphsphere_render::{PerspectiveCamera, Renderer};
use morphsphere_scene::{BlendMode, Geometry, Material, Mesh};
use wgpu::util::DeviceExt;

/// Uniform block shared by both stages. Layout matches `Uniforms` in the
/// WGSL source.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    motion: [f32; 4],
    tint: [f32; 4],
    brightness: [f32; 4],
}

impl GpuUniforms {
    pub fn new(view_proj: Mat4, model: Mat4, values: &ShaderUniforms) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            motion: [
                values.frequency,
                values.amplitude,
                values.density,
                values.strength,
            ],
            tint: [values.deep_purple, values.opacity, 0.0, 0.0],
            brightness: values.brightness.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

fn vertices_of(geometry: &Geometry) -> Vec<Vertex> {
    geometry
        .vertices()
        .map(|v| Vertex {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            uv: v.uv.to_array(),
        })
        .collect()
}

/// `src * src_alpha + dst` on both colour and alpha.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

fn blend_state(blend: BlendMode) -> wgpu::BlendState {
    match blend {
        BlendMode::Additive => ADDITIVE_BLEND,
        BlendMode::Normal => wgpu::BlendState::ALPHA_BLENDING,
    }
}

/// One pipeline per topology and blend mode.
struct Pipelines {
    lines_additive: wgpu::RenderPipeline,
    lines_normal: wgpu::RenderPipeline,
    triangles_additive: wgpu::RenderPipeline,
    triangles_normal: wgpu::RenderPipeline,
}

impl Pipelines {
    fn select(&self, material: &Material) -> &wgpu::RenderPipeline {
        match (material.wireframe, material.blend) {
            (true, BlendMode::Additive) => &self.lines_additive,
            (true, BlendMode::Normal) => &self.lines_normal,
            (false, BlendMode::Additive) => &self.triangles_additive,
            (false, BlendMode::Normal) => &self.triangles_normal,
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    blend: BlendMode,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("morph_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(blend_state(blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            // Back faces stay visible.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

/// wgpu renderer for the displaced sphere.
///
/// Geometry is uploaded once; each frame only rewrites the uniform block.
pub struct WgpuRenderer {
    pipelines: Pipelines,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    line_index_buffer: wgpu::Buffer,
    line_index_count: u32,
    depth_texture: wgpu::TextureView,
    /// Multisampled colour target, resolved into the surface. `None` at 1x.
    msaa_target: Option<wgpu::TextureView>,
    sample_count: u32,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    /// `sample_count` must be supported by the adapter for both the surface
    /// format and `Depth32Float`; see [`supported_sample_count`].
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        geometry: &Geometry,
        clear_color: [f32; 4],
        sample_count: u32,
    ) -> Self {
        let sample_count = sample_count.max(1);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&GpuUniforms::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                &ShaderUniforms::material_initial(),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("morph_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MORPH_SHADER.into()),
        });

        let make = |topology, blend| {
            create_pipeline(
                device,
                &pipeline_layout,
                &shader,
                surface_format,
                topology,
                blend,
                sample_count,
            )
        };
        let pipelines = Pipelines {
            lines_additive: make(wgpu::PrimitiveTopology::LineList, BlendMode::Additive),
            lines_normal: make(wgpu::PrimitiveTopology::LineList, BlendMode::Normal),
            triangles_additive: make(wgpu::PrimitiveTopology::TriangleList, BlendMode::Additive),
            triangles_normal: make(wgpu::PrimitiveTopology::TriangleList, BlendMode::Normal),
        };

        let vertices = vertices_of(geometry);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_index_buffer"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let line_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_line_index_buffer"),
            contents: bytemuck::cast_slice(geometry.line_indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(
            vertices = vertices.len(),
            triangles = geometry.triangle_count(),
            lines = geometry.line_indices().len() / 2,
            sample_count,
            "sphere geometry uploaded"
        );

        let [r, g, b, a] = clear_color.map(f64::from);
        Self {
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices().len() as u32,
            line_index_buffer,
            line_index_count: geometry.line_indices().len() as u32,
            depth_texture: Self::create_depth_texture(device, width, height, sample_count),
            msaa_target: Self::create_msaa_target(
                device,
                surface_format,
                width,
                height,
                sample_count,
            ),
            sample_count,
            surface_format,
            clear_color: wgpu::Color { r, g, b, a },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height, self.sample_count);
        self.msaa_target = Self::create_msaa_target(
            device,
            self.surface_format,
            width,
            height,
            self.sample_count,
        );
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame of `mesh` into `view` and submit it.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        camera: &PerspectiveCamera,
    ) {
        let material = mesh.material();
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&GpuUniforms::new(
                camera.view_projection(),
                mesh.transform.model_matrix(),
                material.uniforms().values(),
            )),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let (target, resolve_target) = match &self.msaa_target {
            Some(msaa) => (msaa, Some(view)),
            None => (view, None),
        };
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
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
                ..Default::default()
            });

            pass.set_pipeline(self.pipelines.select(material));
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            if material.wireframe {
                pass.set_index_buffer(self.line_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.line_index_count, 0, 0..1);
            } else {
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn create_msaa_target(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_color_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&Default::default()))
    }
}

/// Largest count not above `requested` that the adapter supports for both
/// `surface_format` and the depth buffer. Falls back to 1.
pub fn supported_sample_count(
    adapter: &wgpu::Adapter,
    surface_format: wgpu::TextureFormat,
    requested: u32,
) -> u32 {
    let color = adapter.get_texture_format_features(surface_format).flags;
    let depth = adapter
        .get_texture_format_features(wgpu::TextureFormat::Depth32Float)
        .flags;
    pick_sample_count(requested, |count| {
        color.sample_count_supported(count) && depth.sample_count_supported(count)
    })
}

fn pick_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    [16, 8, 4, 2]
        .into_iter()
        .filter(|&count| count <= requested)
        .find(|&count| supported(count))
        .unwrap_or(1)
}

/// Binds a [`WgpuRenderer`] to one acquired surface texture so the render
/// loop can draw through the [`Renderer`] trait.
pub struct GpuFrame<'a> {
    pub renderer: &'a WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for GpuFrame<'_> {
    type Output = ();

    fn draw(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) {
        self.renderer
            .render(self.device, self.queue, self.view, mesh, camera);
    }
}
