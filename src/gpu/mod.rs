//! GPU rendering module using wgpu
//!
//! Owns the device/surface, the depth-displacement material, the bloom and
//! vignette post chain, and the per-frame renderer that strings them
//! together.

pub mod context;
pub mod depth_material;
pub mod post;
pub mod renderer;
pub mod texture;

pub use context::GpuContext;
pub use renderer::Renderer;
