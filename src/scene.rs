//! Scene composition.
//!
//! [`compose`] turns the current viewer state, shader controls and the
//! active entry's load state into a [`FrameDescription`]: everything the
//! renderer needs for one frame. The renderer never looks at
//! [`ViewerState`] or the loader directly.
//!
//! While the active entry's textures are not ready the frame is
//! "suspended": mesh and post chain are left out and a loading overlay is
//! described instead.

use std::sync::Arc;

use glam::Mat4;

use crate::camera::Camera;
use crate::controls::ShaderControls;
use crate::loading::{LoadState, TexturePair};
use crate::state::ViewerState;

/// Luminance-threshold bloom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub luminance_threshold: f32,
    pub luminance_smoothing: f32,
    pub intensity: f32,
    /// Blur spread, scales the Kawase tap offsets
    pub radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            luminance_threshold: 0.1,
            luminance_smoothing: 0.03,
            intensity: 0.01,
            radius: 0.5,
        }
    }
}

impl BloomSettings {
    /// How much of a pixel with `luminance` passes the bright-pass filter.
    /// Same curve as `bright_pass` in `bloom.wgsl`.
    pub fn bright_pass(&self, luminance: f32) -> f32 {
        smoothstep(
            self.luminance_threshold,
            self.luminance_threshold + self.luminance_smoothing,
            luminance,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteSettings {
    pub offset: f32,
    pub darkness: f32,
}

impl Default for VignetteSettings {
    fn default() -> Self {
        Self {
            offset: 0.5,
            darkness: 0.6,
        }
    }
}

impl VignetteSettings {
    /// Multiplier applied to a pixel at `uv`. Same curve as `vignette` in
    /// `composite.wgsl`.
    pub fn factor(&self, uv: [f32; 2]) -> f32 {
        let dx = uv[0] - 0.5;
        let dy = uv[1] - 0.5;
        let d = (dx * dx + dy * dy).sqrt();
        smoothstep(0.8, self.offset * 0.799, d * (self.darkness + self.offset))
    }
}

/// Hermite step, well defined for `edge0 > edge1` as well
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fixed post-processing chain
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PostChain {
    pub bloom: BloomSettings,
    pub vignette: VignetteSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Solid,
    /// Triangle edges only; vertices and displacement unchanged
    Wireframe,
}

/// Draw the displaced plane with one entry's textures
#[derive(Debug, Clone)]
pub struct MeshCommand {
    pub entry_index: usize,
    pub textures: Arc<TexturePair>,
    pub displacement: f32,
    pub fill: FillMode,
}

/// Shown instead of the scene while the active entry is not ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingOverlay {
    Progress { percent: u8 },
    Failed { reason: String },
}

impl LoadingOverlay {
    pub fn text(&self) -> String {
        match self {
            LoadingOverlay::Progress { percent } => format!("LOADING_ASSETS... [{}%]", percent),
            LoadingOverlay::Failed { reason } => format!("LOAD_FAILED // {}", reason),
        }
    }
}

/// Everything the renderer draws for one frame
#[derive(Debug, Clone)]
pub struct FrameDescription {
    /// Linear RGB
    pub clear_color: [f32; 3],
    pub view_proj: Mat4,
    pub mesh: Option<MeshCommand>,
    pub post: Option<PostChain>,
    pub overlay: Option<LoadingOverlay>,
}

/// Build the frame for the active catalog entry.
///
/// `load` must be the load state of `state.selected_index()`.
pub fn compose(
    state: &ViewerState,
    controls: &ShaderControls,
    load: &LoadState,
    camera: &Camera,
    clear_color: [f32; 3],
) -> FrameDescription {
    let view_proj = camera.view_proj();

    let (mesh, post, overlay) = match load {
        LoadState::Ready(textures) => {
            let fill = if controls.wireframe {
                FillMode::Wireframe
            } else {
                FillMode::Solid
            };
            let mesh = MeshCommand {
                entry_index: state.selected_index(),
                textures: Arc::clone(textures),
                displacement: controls.displacement(),
                fill,
            };
            (Some(mesh), Some(PostChain::default()), None)
        }
        LoadState::Failed(reason) => (
            None,
            None,
            Some(LoadingOverlay::Failed {
                reason: reason.clone(),
            }),
        ),
        LoadState::NotRequested | LoadState::Loading { .. } => (
            None,
            None,
            Some(LoadingOverlay::Progress {
                percent: load.percent(),
            }),
        ),
    };

    FrameDescription {
        clear_color,
        view_proj,
        mesh,
        post,
        overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vignette_darkens_towards_corners() {
        let v = VignetteSettings::default();
        assert!((v.factor([0.5, 0.5]) - 1.0).abs() < 1e-6);
        let edge = v.factor([1.0, 0.5]);
        let corner = v.factor([1.0, 1.0]);
        assert!(edge < 1.0);
        assert!(corner < edge);
        assert!(corner >= 0.0);
    }

    #[test]
    fn bright_pass_cuts_dark_pixels() {
        let b = BloomSettings::default();
        assert_eq!(b.bright_pass(0.05), 0.0);
        assert_eq!(b.bright_pass(0.5), 1.0);
        let mid = b.bright_pass(0.1125);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn bloom_defaults() {
        let b = BloomSettings::default();
        assert_eq!(b.luminance_threshold, 0.1);
        assert_eq!(b.luminance_smoothing, 0.03);
        assert_eq!(b.intensity, 0.01);
        // the knee spans 0.1 .. 0.13
        assert!(b.bright_pass(0.125) < 1.0);
        assert_eq!(b.bright_pass(0.14), 1.0);
    }

    #[test]
    fn overlay_text() {
        assert_eq!(
            LoadingOverlay::Progress { percent: 50 }.text(),
            "LOADING_ASSETS... [50%]"
        );
    }
}
