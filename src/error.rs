//! Error types for the viewer.
//!
//! Everything fallible in the crate returns [`Result<T>`]. Texture loading
//! failures are not propagated through here once the viewer is running; the
//! loader folds them into [`LoadState::Failed`](crate::loading::LoadState).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    // ------------------------------------------------------------------
    // GPU & window
    // ------------------------------------------------------------------
    /// No adapter compatible with the window surface.
    #[error("Failed to find suitable GPU adapter")]
    AdapterNotFound,

    #[error("Failed to create device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to create window: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------
    #[error("Failed to read {path}: {source}")]
    AssetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} is {width}x{height}, exceeds max texture size {max}")]
    TextureTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("Catalog index out of bounds: {index} (catalog has {len} entries)")]
    IndexOutOfBounds { index: usize, len: usize },

    // ------------------------------------------------------------------
    // Command line
    // ------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
