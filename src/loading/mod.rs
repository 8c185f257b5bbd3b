//! Background texture loading with a per-entry state machine.
//!
//! Each catalog entry moves through
//! `NotRequested -> Loading -> Ready | Failed`. Decoding happens on the
//! rayon pool; results come back over a channel and are folded into the
//! state table when the main thread calls [`TextureLoader::poll`]. Results
//! are stored under the index they were requested for, so a slow load for
//! a previous selection can never be shown for the current one.

pub mod decode;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::catalog::{self, CATALOG};
use crate::error::Result;

pub use decode::{DecodedImage, TexturePair, decode_file, decode_texture, decode_thumbnail};

/// Images per catalog entry (color + depth)
const ITEMS_PER_PAIR: u32 = 2;

#[derive(Debug, Clone)]
pub enum LoadState {
    NotRequested,
    Loading { loaded: u32, total: u32 },
    Ready(Arc<TexturePair>),
    Failed(String),
}

impl LoadState {
    /// Loading-manager style percentage: items done over items requested.
    pub fn percent(&self) -> u8 {
        match self {
            LoadState::NotRequested => 0,
            LoadState::Loading { loaded, total } => {
                if *total == 0 {
                    0
                } else {
                    ((*loaded as f32 / *total as f32) * 100.0).round().min(100.0) as u8
                }
            }
            LoadState::Ready(_) => 100,
            LoadState::Failed(_) => 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }
}

/// Messages sent from loading jobs back to the main thread. Errors cross
/// the channel already rendered to text.
enum LoadMessage {
    ItemLoaded { index: usize },
    Finished { index: usize, result: std::result::Result<TexturePair, String> },
    Thumbnail { index: usize, result: std::result::Result<DecodedImage, String> },
}

/// What changed during one [`TextureLoader::poll`]
#[derive(Debug)]
pub enum LoaderEvent {
    Progress(usize),
    Thumbnail(usize, DecodedImage),
}

pub struct TextureLoader {
    root: PathBuf,
    /// Largest width/height the device accepts for a 2D texture
    max_texture_dimension: u32,
    states: Vec<LoadState>,
    sender: Sender<LoadMessage>,
    receiver: Receiver<LoadMessage>,
}

impl TextureLoader {
    /// Images larger than `max_texture_dimension` on either axis fail to
    /// load instead of reaching the GPU.
    pub fn new(root: impl Into<PathBuf>, max_texture_dimension: u32) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            root: root.into(),
            max_texture_dimension,
            states: vec![LoadState::NotRequested; CATALOG.len()],
            sender,
            receiver,
        }
    }

    pub fn state(&self, index: usize) -> &LoadState {
        static NOT_REQUESTED: LoadState = LoadState::NotRequested;
        self.states.get(index).unwrap_or(&NOT_REQUESTED)
    }

    /// Start loading an entry's pair. No-op while it is loading or loaded;
    /// a failed entry is retried. Returns whether a job was started.
    pub fn request(&mut self, index: usize) -> bool {
        let Ok(entry) = catalog::entry(index) else {
            log::warn!("Ignoring load request for index {}", index);
            return false;
        };
        match self.states[index] {
            LoadState::Loading { .. } | LoadState::Ready(_) => return false,
            LoadState::NotRequested | LoadState::Failed(_) => {}
        }

        log::info!("Loading '{}' ({}, {})", entry.name, entry.image_path, entry.depth_path);
        self.states[index] = LoadState::Loading {
            loaded: 0,
            total: ITEMS_PER_PAIR,
        };

        let color_path = entry.image_file(&self.root);
        let depth_path = entry.depth_file(&self.root);
        let max = self.max_texture_dimension;
        let sender = self.sender.clone();
        rayon::spawn(move || {
            let (color, depth) = rayon::join(
                || {
                    let r = decode_texture(&color_path, max);
                    let _ = sender.send(LoadMessage::ItemLoaded { index });
                    r
                },
                || {
                    let r = decode_texture(&depth_path, max);
                    let _ = sender.send(LoadMessage::ItemLoaded { index });
                    r
                },
            );
            let result = color
                .and_then(|color| depth.map(|depth| TexturePair { color, depth }))
                .map_err(|e| e.to_string());
            let _ = sender.send(LoadMessage::Finished { index, result });
        });
        true
    }

    /// Decode a small square preview of every entry's color image.
    pub fn request_thumbnails(&self, size: u32) {
        for (index, entry) in CATALOG.iter().enumerate() {
            let path = entry.image_file(&self.root);
            let sender = self.sender.clone();
            rayon::spawn(move || {
                let result = decode_thumbnail(&path, size).map_err(|e| e.to_string());
                let _ = sender.send(LoadMessage::Thumbnail { index, result });
            });
        }
    }

    /// Drain finished work without blocking.
    pub fn poll(&mut self) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                LoadMessage::ItemLoaded { index } => {
                    if let LoadState::Loading { loaded, total } = &mut self.states[index] {
                        *loaded = (*loaded + 1).min(*total);
                        events.push(LoaderEvent::Progress(index));
                    }
                }
                LoadMessage::Finished { index, result } => match result {
                    Ok(pair) => {
                        log::info!(
                            "Loaded '{}' ({}x{} color, {}x{} depth)",
                            CATALOG[index].name,
                            pair.color.width,
                            pair.color.height,
                            pair.depth.width,
                            pair.depth.height
                        );
                        self.states[index] = LoadState::Ready(Arc::new(pair));
                    }
                    Err(e) => {
                        log::error!("Failed to load '{}': {}", CATALOG[index].name, e);
                        self.states[index] = LoadState::Failed(e);
                    }
                },
                LoadMessage::Thumbnail { index, result } => match result {
                    Ok(image) => events.push(LoaderEvent::Thumbnail(index, image)),
                    Err(e) => log::warn!("No thumbnail for '{}': {}", CATALOG[index].name, e),
                },
            }
        }
        events
    }
}

/// Load an entry's pair on the calling thread.
pub fn load_pair_blocking(root: &Path, index: usize) -> Result<TexturePair> {
    let entry = catalog::entry(index)?;
    let color = decode_file(&entry.image_file(root))?;
    let depth = decode_file(&entry.depth_file(root))?;
    Ok(TexturePair { color, depth })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_items() {
        assert_eq!(LoadState::NotRequested.percent(), 0);
        assert_eq!(LoadState::Loading { loaded: 0, total: 2 }.percent(), 0);
        assert_eq!(LoadState::Loading { loaded: 1, total: 2 }.percent(), 50);
        assert_eq!(LoadState::Loading { loaded: 1, total: 3 }.percent(), 33);
        assert_eq!(LoadState::Loading { loaded: 0, total: 0 }.percent(), 0);
    }

    #[test]
    fn out_of_range_request_is_ignored() {
        let mut loader = TextureLoader::new("does-not-matter", 8192);
        assert!(!loader.request(CATALOG.len()));
        assert!(matches!(loader.state(CATALOG.len()), LoadState::NotRequested));
    }
}
