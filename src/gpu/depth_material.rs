//! Depth-displacement material pipeline.
//!
//! One shader module, two pipelines: a triangle list for solid rendering
//! and a line list over the same vertex buffer for wireframe. Both share
//! the vertex stage, so the displaced geometry is identical.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::context::GpuContext;
use super::texture::{DEPTH_FORMAT, GpuTexturePair, SCENE_FORMAT};
use crate::catalog::CATALOG;
use crate::geometry::{PlaneGeometry, Vertex};
use crate::scene::{FillMode, MeshCommand};

/// Uniform data for the depth material shader
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub displacement: f32,
    pub _padding: [f32; 3],
}

/// Textures and bind group for one catalog entry
struct EntryBinding {
    _textures: GpuTexturePair,
    bind_group: wgpu::BindGroup,
}

pub struct DepthMaterialPipeline {
    solid_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    wire_index_buffer: wgpu::Buffer,
    wire_index_count: u32,

    // Uploaded on first use, kept for the process lifetime
    entries: HashMap<usize, EntryBinding>,
}

impl DepthMaterialPipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Depth Material Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/depth_material.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Depth Material Bind Group Layout"),
            entries: &[
                // uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // color map
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // depth map
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Material Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: SCENE_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // plane is visible from behind when orbiting past the side
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let solid_pipeline = make_pipeline("Depth Material Pipeline (Solid)", wgpu::PrimitiveTopology::TriangleList);
        let wire_pipeline = make_pipeline("Depth Material Pipeline (Wireframe)", wgpu::PrimitiveTopology::LineList);

        // Clamp to edge: uv outside [0, 1] reuses the border texels
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Depth Material Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Depth Material Uniform Buffer"),
            size: std::mem::size_of::<MaterialUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let plane = PlaneGeometry::standard();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Vertex Buffer"),
            contents: bytemuck::cast_slice(&plane.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Index Buffer"),
            contents: bytemuck::cast_slice(&plane.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Wireframe Index Buffer"),
            contents: bytemuck::cast_slice(&plane.wire_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            solid_pipeline,
            wire_pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: plane.indices.len() as u32,
            wire_index_buffer,
            wire_index_count: plane.wire_indices.len() as u32,
            entries: HashMap::new(),
        }
    }

    /// Upload the entry's textures if needed and write this frame's uniforms.
    pub fn prepare(&mut self, ctx: &GpuContext, mesh: &MeshCommand, view_proj: glam::Mat4) {
        if !self.entries.contains_key(&mesh.entry_index) {
            let name = CATALOG.get(mesh.entry_index).map_or("Unknown", |e| e.name);
            log::debug!("Uploading textures for '{}'", name);
            let textures = GpuTexturePair::upload(ctx, &mesh.textures, name);
            let bind_group = self.create_bind_group(ctx, &textures);
            self.entries.insert(
                mesh.entry_index,
                EntryBinding {
                    _textures: textures,
                    bind_group,
                },
            );
        }

        let uniforms = MaterialUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            displacement: mesh.displacement,
            _padding: [0.0; 3],
        };
        ctx.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    fn create_bind_group(&self, ctx: &GpuContext, textures: &GpuTexturePair) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Depth Material Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&textures.color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&textures.depth.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Draw the plane. `prepare` must have run for this mesh first.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, mesh: &MeshCommand) {
        let Some(entry) = self.entries.get(&mesh.entry_index) else {
            return;
        };

        render_pass.set_bind_group(0, &entry.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match mesh.fill {
            FillMode::Solid => {
                render_pass.set_pipeline(&self.solid_pipeline);
                render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
            FillMode::Wireframe => {
                render_pass.set_pipeline(&self.wire_pipeline);
                render_pass.set_index_buffer(self.wire_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.wire_index_count, 0, 0..1);
            }
        }
    }
}
