//! Static catalog of image / depth-map pairs shown in the sidebar.

use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

/// One gallery entry. Paths are rooted at the asset directory ("/alien.webp").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub image_path: &'static str,
    pub depth_path: &'static str,
}

impl CatalogEntry {
    const fn new(name: &'static str, image_path: &'static str, depth_path: &'static str) -> Self {
        Self { name, image_path, depth_path }
    }

    /// Absolute location of the color image under `root`
    pub fn image_file(&self, root: &Path) -> PathBuf {
        resolve_asset(root, self.image_path)
    }

    /// Absolute location of the depth map under `root`
    pub fn depth_file(&self, root: &Path) -> PathBuf {
        resolve_asset(root, self.depth_path)
    }
}

pub const CATALOG: [CatalogEntry; 9] = [
    CatalogEntry::new("Alien", "/alien.webp", "/alien-depth.png"),
    CatalogEntry::new("Gun", "/handgun.webp", "/handgun-depth.png"),
    CatalogEntry::new("Timer Relic", "/relic.webp", "/relic-depth.png"),
    CatalogEntry::new("New Dawn Relic", "/relic2.webp", "/relic2-depth.png"),
    CatalogEntry::new("Sword", "/sword.webp", "/sword-depth.png"),
    CatalogEntry::new("Book", "/book.webp", "/book-depth.png"),
    CatalogEntry::new("Island", "/island.webp", "/island-depth.png"),
    CatalogEntry::new("Tunnel", "/tunnel.webp", "/tunnel-depth.png"),
    CatalogEntry::new("Grenade", "/grenade.webp", "/grenade-depth.png"),
];

/// Look up an entry, failing on an index past the end of the catalog.
pub fn entry(index: usize) -> Result<&'static CatalogEntry> {
    CATALOG.get(index).ok_or(ViewerError::IndexOutOfBounds {
        index,
        len: CATALOG.len(),
    })
}

/// Join a "/name.ext" style asset path onto the asset root.
pub fn resolve_asset(root: &Path, asset_path: &str) -> PathBuf {
    root.join(asset_path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_gallery() {
        let names: Vec<_> = CATALOG.iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            [
                "Alien",
                "Gun",
                "Timer Relic",
                "New Dawn Relic",
                "Sword",
                "Book",
                "Island",
                "Tunnel",
                "Grenade"
            ]
        );
    }

    #[test]
    fn every_entry_has_a_depth_map_beside_its_image() {
        for e in &CATALOG {
            let stem = e.image_path.trim_end_matches(".webp");
            assert_eq!(e.depth_path, format!("{}-depth.png", stem));
        }
    }

    #[test]
    fn resolve_strips_leading_slash() {
        let root = Path::new("assets");
        assert_eq!(CATALOG[2].image_file(root), Path::new("assets/relic.webp"));
        assert_eq!(CATALOG[2].depth_file(root), Path::new("assets/relic-depth.png"));
    }

    #[test]
    fn entry_rejects_out_of_range() {
        assert!(entry(8).is_ok());
        assert!(matches!(
            entry(9),
            Err(ViewerError::IndexOutOfBounds { index: 9, len: 9 })
        ));
    }
}
