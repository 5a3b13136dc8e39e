//! Texture assets and where to read them from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Every texture the scenes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureAsset {
    /// Full-screen galaxy backdrop.
    Galaxy,
    /// The drifting black hole sprite.
    BlackHole,
    /// The sun.
    Sun,
    /// Mercury.
    Mercury,
    /// Venus.
    Venus,
    /// Earth.
    Earth,
    /// Mars.
    Mars,
    /// Jupiter.
    Jupiter,
    /// Saturn.
    Saturn,
    /// Uranus.
    Uranus,
    /// Neptune.
    Neptune,
    /// Earth's moon.
    Moon,
    /// Ocean surface used by the detail view.
    Water,
}

impl TextureAsset {
    /// Planet textures, innermost first.
    pub const PLANETS: [Self; 8] = [
        Self::Mercury,
        Self::Venus,
        Self::Earth,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
        Self::Uranus,
        Self::Neptune,
    ];

    /// Every asset.
    pub const ALL: [Self; 13] = [
        Self::Galaxy,
        Self::BlackHole,
        Self::Sun,
        Self::Mercury,
        Self::Venus,
        Self::Earth,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
        Self::Uranus,
        Self::Neptune,
        Self::Moon,
        Self::Water,
    ];

    /// File name inside an asset directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Galaxy => "galaxy.png",
            Self::BlackHole => "black_hole.png",
            Self::Sun => "sun.png",
            Self::Mercury => "mercury.png",
            Self::Venus => "venus.png",
            Self::Earth => "earth.png",
            Self::Mars => "mars.png",
            Self::Jupiter => "jupiter.png",
            Self::Saturn => "saturn.png",
            Self::Uranus => "uranus.png",
            Self::Neptune => "neptune.png",
            Self::Moon => "moon.png",
            Self::Water => "water.png",
        }
    }

    /// Texture of the `index`-th planet, if there is one.
    pub fn planet(index: usize) -> Option<Self> {
        Self::PLANETS.get(index).copied()
    }
}

/// Somewhere texture bytes can be read from.
pub trait AssetSource {
    /// Read the encoded bytes of `asset`, or `None` if unavailable.
    fn read(&self, asset: TextureAsset) -> Option<Vec<u8>>;
}

/// Reads assets from files in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Read assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory being read.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of `asset`.
    pub fn path(&self, asset: TextureAsset) -> PathBuf {
        self.root.join(asset.file_name())
    }
}

impl AssetSource for DirectoryAssets {
    fn read(&self, asset: TextureAsset) -> Option<Vec<u8>> {
        let path = self.path(asset);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("Cannot read {}: {err}", path.display());
                None
            }
        }
    }
}

/// Assets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<TextureAsset, Vec<u8>>,
}

impl MemoryAssets {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bytes of `asset`.
    pub fn insert(&mut self, asset: TextureAsset, bytes: Vec<u8>) {
        self.files.insert(asset, bytes);
    }
}

impl AssetSource for MemoryAssets {
    fn read(&self, asset: TextureAsset) -> Option<Vec<u8>> {
        self.files.get(&asset).cloned()
    }
}

/// An empty source; every texture falls back to white.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn read(&self, _asset: TextureAsset) -> Option<Vec<u8>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_unique() {
        let mut names: Vec<_> = TextureAsset::ALL.iter().map(|a| a.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TextureAsset::ALL.len());
    }

    #[test]
    fn test_planet_lookup() {
        assert_eq!(TextureAsset::planet(2), Some(TextureAsset::Earth));
        assert_eq!(TextureAsset::planet(8), None);
    }

    #[test]
    fn test_directory_assets() {
        let dir = std::env::temp_dir().join(format!("orrery-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("moon.png"), b"moon").unwrap();

        let assets = DirectoryAssets::new(&dir);
        assert_eq!(assets.read(TextureAsset::Moon), Some(b"moon".to_vec()));
        assert_eq!(assets.read(TextureAsset::Sun), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
