use std::io::{self, ErrorKind};
use std::path::PathBuf;

/// Provides the bytes behind a route's locator.
pub trait AssetSource: Send + Sync {
    fn load(&self, locator: &str) -> io::Result<Vec<u8>>;
}

/// Reads assets from the filesystem. Relative locators are resolved
/// against `root`.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssets {
    fn load(&self, locator: &str) -> io::Result<Vec<u8>> {
        if locator.is_empty() {
            return Err(io::Error::new(ErrorKind::NotFound, "route has no backing file"));
        }
        std::fs::read(self.root.join(locator))
    }
}
