//! Post-processing: bloom (bright pass + dual-Kawase blur) and the final
//! composite with vignette.
//!
//! The scene is rendered into a float target at the clamped pixel ratio.
//! Bloom runs as compute passes:
//! 1. Bright pass: scene -> half resolution, luminance threshold
//! 2. Downsample half -> quarter with a 5-tap X pattern
//! 3. Upsample quarter -> half with an 8-tap circle pattern
//!
//! The composite pass draws a full-screen triangle onto the surface.

use super::context::GpuContext;
use super::texture::{DEPTH_FORMAT, SCENE_FORMAT, Texture};
use crate::scene::PostChain;

/// Offscreen color + depth targets the mesh is drawn into
pub struct SceneTargets {
    pub color: Texture,
    pub depth: Texture,
    pub size: (u32, u32),
}

impl SceneTargets {
    pub fn new(ctx: &GpuContext, size: (u32, u32)) -> Self {
        let color = Texture::render_target(
            ctx,
            size,
            SCENE_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            "Scene Color Target",
        );
        let depth = Texture::render_target(
            ctx,
            size,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            "Scene Depth Target",
        );
        Self { color, depth, size }
    }
}

/// Uniform data for the bloom compute shader
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniforms {
    pub output_size: [u32; 2],
    pub source_pixel_size: [f32; 2],
    pub threshold: f32,
    pub smoothing: f32,
    pub radius: f32,
    pub _padding: f32,
}

/// Uniform data for the composite shader
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniforms {
    pub bloom_intensity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    pub vignette_enabled: u32,
}

impl CompositeUniforms {
    /// Pass-through when the post chain is off
    pub fn from_chain(post: Option<&PostChain>) -> Self {
        match post {
            Some(chain) => Self {
                bloom_intensity: chain.bloom.intensity,
                vignette_offset: chain.vignette.offset,
                vignette_darkness: chain.vignette.darkness,
                vignette_enabled: 1,
            },
            None => Self {
                bloom_intensity: 0.0,
                vignette_offset: 0.0,
                vignette_darkness: 0.0,
                vignette_enabled: 0,
            },
        }
    }
}

/// One compute stage: pipeline entry point plus its per-size bind group
struct BloomStage {
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
    output_size: (u32, u32),
}

pub struct BloomPass {
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    bright_stage: BloomStage,
    downsample_stage: BloomStage,
    upsample_stage: BloomStage,

    // Half-resolution bright texture (final bloom result lives here)
    bright: Texture,
    // Quarter-resolution blur intermediate
    blur: Texture,
}

impl BloomPass {
    pub fn new(ctx: &GpuContext, scene: &SceneTargets) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bloom.wgsl").into()),
        });

        // Linear for smooth interpolation between taps
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Every stage reads a sampled texture and writes a storage texture
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[
                // input_texture (sampled)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // output_texture (storage)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: SCENE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                // uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_stage = |label: &str, entry_point: &str| {
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            });
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<BloomUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            BloomStage {
                pipeline,
                uniform_buffer,
                bind_group: None,
                output_size: (1, 1),
            }
        };

        let bright_stage = make_stage("Bloom Bright Pass", "bright_pass_main");
        let downsample_stage = make_stage("Bloom Downsample", "downsample_main");
        let upsample_stage = make_stage("Bloom Upsample", "upsample_main");

        let (bright, blur) = Self::create_textures(ctx, scene.size);

        let mut pass = Self {
            bind_group_layout,
            sampler,
            bright_stage,
            downsample_stage,
            upsample_stage,
            bright,
            blur,
        };
        pass.bind(ctx, scene);
        pass
    }

    fn create_textures(ctx: &GpuContext, (width, height): (u32, u32)) -> (Texture, Texture) {
        let usage = wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING;
        let bright = Texture::render_target(ctx, half(width, height), SCENE_FORMAT, usage, "Bloom Half-Res Texture");
        let (hw, hh) = half(width, height);
        let blur = Texture::render_target(ctx, half(hw, hh), SCENE_FORMAT, usage, "Bloom Quarter-Res Texture");
        (bright, blur)
    }

    /// Recreate intermediate textures after the scene target changed size
    pub fn resize(&mut self, ctx: &GpuContext, scene: &SceneTargets) {
        let (bright, blur) = Self::create_textures(ctx, scene.size);
        self.bright = bright;
        self.blur = blur;
        self.bind(ctx, scene);
    }

    /// Half-resolution bloom result sampled by the composite pass
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.bright.view
    }

    fn bind(&mut self, ctx: &GpuContext, scene: &SceneTargets) {
        let (w, h) = scene.size;
        let half_size = half(w, h);
        let quarter_size = half(half_size.0, half_size.1);

        let bright_bg = self.create_bind_group(ctx, "Bloom Bright Bind Group", &scene.color.view, &self.bright.view, &self.bright_stage.uniform_buffer);
        self.bright_stage.bind_group = Some(bright_bg);
        self.bright_stage.output_size = half_size;

        let down_bg = self.create_bind_group(ctx, "Bloom Downsample Bind Group", &self.bright.view, &self.blur.view, &self.downsample_stage.uniform_buffer);
        self.downsample_stage.bind_group = Some(down_bg);
        self.downsample_stage.output_size = quarter_size;

        let up_bg = self.create_bind_group(ctx, "Bloom Upsample Bind Group", &self.blur.view, &self.bright.view, &self.upsample_stage.uniform_buffer);
        self.upsample_stage.bind_group = Some(up_bg);
        self.upsample_stage.output_size = half_size;
    }

    fn create_bind_group(
        &self,
        ctx: &GpuContext,
        label: &str,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
        uniforms: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(output),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Upload this frame's settings
    pub fn prepare(&self, ctx: &GpuContext, chain: &PostChain, scene_size: (u32, u32)) {
        let bloom = &chain.bloom;
        let half_size = self.bright_stage.output_size;
        let sources = [
            (&self.bright_stage, scene_size),
            (&self.downsample_stage, half_size),
            (&self.upsample_stage, self.downsample_stage.output_size),
        ];
        for (stage, (sw, sh)) in sources {
            let uniforms = BloomUniforms {
                output_size: [stage.output_size.0, stage.output_size.1],
                source_pixel_size: [1.0 / sw.max(1) as f32, 1.0 / sh.max(1) as f32],
                threshold: bloom.luminance_threshold,
                smoothing: bloom.luminance_smoothing,
                radius: bloom.radius,
                _padding: 0.0,
            };
            ctx.queue.write_buffer(&stage.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }
    }

    /// Record bright pass, downsample and upsample into `encoder`
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        for (label, stage) in [
            ("Bloom Bright Pass", &self.bright_stage),
            ("Bloom Downsample Pass", &self.downsample_stage),
            ("Bloom Upsample Pass", &self.upsample_stage),
        ] {
            let Some(bind_group) = &stage.bind_group else {
                return;
            };
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(&stage.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            let (w, h) = stage.output_size;
            pass.dispatch_workgroups(w.div_ceil(8), h.div_ceil(8), 1);
        }
    }
}

fn half(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Full-screen composite onto the surface
pub struct CompositePipeline {
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
}

impl CompositePipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                // scene
                texture_entry(0),
                // bloom
                texture_entry(1),
                // sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Composite Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - we generate coords in shader
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Composite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Uniform Buffer"),
            size: std::mem::size_of::<CompositeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            render_pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            bind_group: None,
        }
    }

    /// Point the composite at the current scene and bloom textures
    pub fn bind(&mut self, ctx: &GpuContext, scene: &wgpu::TextureView, bloom: &wgpu::TextureView) {
        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        }));
    }

    pub fn prepare(&self, ctx: &GpuContext, post: Option<&PostChain>) {
        let uniforms = CompositeUniforms::from_chain(post);
        ctx.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if let Some(bind_group) = &self.bind_group {
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Full-screen triangle
        }
    }
}
