//! CPU reference of the depth-displacement vertex stage.
//!
//! Mirrors `gpu/shaders/depth_material.wgsl`: a linearly filtered,
//! clamp-to-edge lookup of the depth map's red channel, then
//! `P' = P + N * depth * k`. Used by `--inspect` and by the tests to pin the
//! shader math down.

use glam::Vec3;
use rayon::prelude::*;

use crate::geometry::PlaneGeometry;
use crate::loading::DecodedImage;

/// Offset a position along its normal by the sampled depth.
#[inline]
pub fn displace(position: Vec3, normal: Vec3, depth: f32, displacement: f32) -> Vec3 {
    position + normal * depth * displacement
}

/// Bilinear sample of the red channel at `uv`, normalized to [0, 1].
/// Coordinates outside [0, 1] clamp to the edge texels.
pub fn sample_depth(image: &DecodedImage, uv: [f32; 2]) -> f32 {
    if image.width == 0 || image.height == 0 {
        return 0.0;
    }
    let (w, h) = (image.width as f32, image.height as f32);

    // Texel centers sit at (i + 0.5) / size
    let x = (uv[0] * w - 0.5).clamp(0.0, w - 1.0);
    let y = (uv[1] * h - 0.5).clamp(0.0, h - 1.0);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let r = |px: u32, py: u32| image.red(px, py) as f32 / 255.0;

    let top = r(x0, y0) * (1.0 - fx) + r(x1, y0) * fx;
    let bottom = r(x0, y1) * (1.0 - fx) + r(x1, y1) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Displace every vertex of `plane` against `depth`.
pub fn displace_plane(plane: &PlaneGeometry, depth: &DecodedImage, displacement: f32) -> Vec<Vec3> {
    plane
        .vertices
        .par_iter()
        .map(|v| {
            let d = sample_depth(depth, v.uv);
            displace(Vec3::from(v.position), Vec3::from(v.normal), d, displacement)
        })
        .collect()
}

/// Summary printed by `--inspect`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementStats {
    pub depth_min: f32,
    pub depth_max: f32,
    pub depth_mean: f32,
    pub z_min: f32,
    pub z_max: f32,
}

pub fn displacement_stats(plane: &PlaneGeometry, depth: &DecodedImage, displacement: f32) -> DisplacementStats {
    let samples: Vec<f32> = plane
        .vertices
        .par_iter()
        .map(|v| sample_depth(depth, v.uv))
        .collect();

    let depth_min = samples.iter().copied().fold(f32::INFINITY, f32::min);
    let depth_max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let depth_mean = samples.iter().sum::<f32>() / samples.len().max(1) as f32;

    let displaced = displace_plane(plane, depth, displacement);
    let z_min = displaced.iter().map(|p| p.z).fold(f32::INFINITY, f32::min);
    let z_max = displaced.iter().map(|p| p.z).fold(f32::NEG_INFINITY, f32::max);

    DisplacementStats {
        depth_min,
        depth_max,
        depth_mean,
        z_min,
        z_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        // red ramps left to right: 0 .. 255
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _y in 0..height {
            for x in 0..width {
                let r = (x * 255 / (width - 1)) as u8;
                pixels.extend_from_slice(&[r, 0, 0, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn displace_moves_along_normal() {
        let p = displace(Vec3::new(1.0, 2.0, 0.0), Vec3::Z, 0.5, 2.5);
        assert_eq!(p, Vec3::new(1.0, 2.0, 1.25));
    }

    #[test]
    fn zero_depth_keeps_plane_flat() {
        let black = DecodedImage::new(4, 4, vec![0; 64]);
        let plane = PlaneGeometry::new(5.0, 5.0, 8, 8);
        let displaced = displace_plane(&plane, &black, 5.0);
        assert!(displaced.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn sampling_clamps_outside_unit_square() {
        let img = gradient(5, 2);
        assert_eq!(sample_depth(&img, [-3.0, 0.5]), 0.0);
        assert_eq!(sample_depth(&img, [7.0, 0.5]), 1.0);
        assert_eq!(sample_depth(&img, [0.0, 0.5]), sample_depth(&img, [-1.0, 0.5]));
    }

    #[test]
    fn sampling_interpolates_between_texels() {
        let img = gradient(2, 1);
        let mid = sample_depth(&img, [0.5, 0.5]);
        assert!((mid - 0.5).abs() < 1e-3, "mid = {}", mid);
    }

    #[test]
    fn only_red_channel_counts() {
        let img = DecodedImage::new(1, 1, vec![0, 255, 255, 255]);
        assert_eq!(sample_depth(&img, [0.5, 0.5]), 0.0);
    }

    #[test]
    fn stats_follow_displacement_scale() {
        let img = gradient(16, 16);
        let plane = PlaneGeometry::new(5.0, 5.0, 16, 16);
        let stats = displacement_stats(&plane, &img, 2.5);
        assert_eq!(stats.depth_min, 0.0);
        assert_eq!(stats.depth_max, 1.0);
        assert_eq!(stats.z_min, 0.0);
        assert!((stats.z_max - 2.5).abs() < 1e-5);
    }
}
