//! Viewer configuration

use std::path::PathBuf;

use crate::camera::Camera;

/// Environment variable overriding the asset directory
pub const ASSETS_ENV: &str = "PHANTOM_ASSETS";

/// Configuration for the viewer window and scene
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window size in logical pixels
    pub window_size: (u32, u32),
    /// Directory the catalog's "/name.ext" paths are resolved against
    pub asset_root: PathBuf,
    /// Catalog entry shown first
    pub initial_selection: usize,
    /// Starting camera placement
    pub camera: Camera,
    /// Device pixel ratio is clamped into this range for the scene target
    pub pixel_ratio_range: (f32, f32),
    /// Background color (sRGB)
    pub clear_color: [u8; 3],
    /// Edge length of sidebar thumbnails in pixels
    pub thumbnail_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Phantom Viewer".to_string(),
            window_size: (1280, 800),
            asset_root: PathBuf::from("public"),
            initial_selection: 0,
            camera: Camera::default(),
            pixel_ratio_range: (1.0, 2.0),
            clear_color: [0x05, 0x05, 0x05],
            thumbnail_size: 96,
        }
    }
}

impl ViewerConfig {
    /// Apply `PHANTOM_ASSETS` if it is set
    pub fn with_env(mut self) -> Self {
        if let Some(root) = std::env::var_os(ASSETS_ENV).filter(|v| !v.is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
        self
    }

    pub fn clamp_pixel_ratio(&self, scale_factor: f64) -> f32 {
        let (min, max) = self.pixel_ratio_range;
        (scale_factor as f32).clamp(min, max)
    }

    /// Resolution of the offscreen scene target for a surface of
    /// `physical` pixels at `scale_factor`.
    pub fn scene_resolution(&self, physical: (u32, u32), scale_factor: f64) -> (u32, u32) {
        let scale = scale_factor.max(1e-3) as f32;
        let ratio = self.clamp_pixel_ratio(scale_factor);
        let w = (physical.0 as f32 / scale * ratio).round() as u32;
        let h = (physical.1 as f32 / scale * ratio).round() as u32;
        (w.max(1), h.max(1))
    }

    /// Background as linear RGB for the float scene target
    pub fn clear_color_linear(&self) -> [f32; 3] {
        self.clear_color.map(|c| srgb_to_linear(c as f32 / 255.0))
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_clamped() {
        let config = ViewerConfig::default();
        assert_eq!(config.clamp_pixel_ratio(0.5), 1.0);
        assert_eq!(config.clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(config.clamp_pixel_ratio(3.0), 2.0);
    }

    #[test]
    fn scene_resolution_follows_clamped_ratio() {
        let config = ViewerConfig::default();
        // 3x display: 1000x600 logical rendered at 2x
        assert_eq!(config.scene_resolution((3000, 1800), 3.0), (2000, 1200));
        // low-dpi display is rendered at 1x, not below
        assert_eq!(config.scene_resolution((500, 300), 0.5), (1000, 600));
        assert_eq!(config.scene_resolution((1280, 800), 1.0), (1280, 800));
    }

    #[test]
    fn background_is_near_black() {
        let [r, g, b] = ViewerConfig::default().clear_color_linear();
        assert!(r > 0.0 && r < 0.002);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }
}
