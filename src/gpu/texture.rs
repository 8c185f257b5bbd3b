//! Texture creation helpers

use super::context::GpuContext;
use crate::loading::{DecodedImage, TexturePair};

/// Float format of the offscreen scene and bloom targets
pub const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A texture together with its default view. The texture is only held so
/// the view stays valid.
pub struct Texture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Upload an RGBA8 image. Color images use an sRGB format so sampling
    /// returns linear values; depth maps stay linear.
    pub fn from_image(ctx: &GpuContext, image: &DecodedImage, format: wgpu::TextureFormat, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if image.width > 0 && image.height > 0 {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &image.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(image.width * 4),
                    rows_per_image: Some(image.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }

    /// Offscreen render target (optionally also usable as a storage texture)
    pub fn render_target(ctx: &GpuContext, (width, height): (u32, u32), format: wgpu::TextureFormat, usage: wgpu::TextureUsages, label: &str) -> Self {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }
}

/// GPU copy of one catalog entry's textures
pub struct GpuTexturePair {
    pub color: Texture,
    pub depth: Texture,
}

impl GpuTexturePair {
    pub fn upload(ctx: &GpuContext, pair: &TexturePair, name: &str) -> Self {
        Self {
            color: Texture::from_image(
                ctx,
                &pair.color,
                wgpu::TextureFormat::Rgba8UnormSrgb,
                &format!("{} Color Texture", name),
            ),
            depth: Texture::from_image(
                ctx,
                &pair.depth,
                wgpu::TextureFormat::Rgba8Unorm,
                &format!("{} Depth Texture", name),
            ),
        }
    }
}
