//! Image loading and decoding.
//!
//! Byte access goes through the `ImageSource` seam so tests and embedders
//! can substitute their own resolution; decoding and caching live here.
//! Whole manifests load as one concurrent task set whose results keep
//! manifest order, so attach order never depends on which decode finished
//! first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rayon::prelude::*;
use tracing::error;

use crate::error::EngineError;

/// Resolves a path to raw encoded image bytes.
pub trait ImageSource: Send + Sync {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reads paths from the filesystem.
pub struct DiskSource;

impl ImageSource for DiskSource {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

/// A decoded image ready for texture upload.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Tightly packed RGBA8, row-major.
    pub rgba: Arc<Vec<u8>>,
}

impl LoadedImage {
    /// Width over height; > 1 for landscape images.
    pub fn aspect(&self) -> f32 {
        self.pixel_width as f32 / self.pixel_height as f32
    }
}

/// Decodes and caches images behind a byte source.
#[derive(Clone)]
pub struct ImageStore {
    source: Arc<dyn ImageSource>,
    cache: Arc<Mutex<HashMap<String, LoadedImage>>>,
}

impl ImageStore {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Loads one image, consulting the cache first.
    pub fn load(&self, path: &str) -> Result<LoadedImage, EngineError> {
        // 1. Check cache
        {
            let cache = self.cache.lock().unwrap();
            if let Some(hit) = cache.get(path) {
                return Ok(hit.clone());
            }
        }

        // 2. Load bytes
        let bytes = self.source.load_bytes(path).map_err(|source| {
            error!(path, %source, "image load failed");
            EngineError::ImageLoad {
                path: path.to_string(),
                source,
            }
        })?;

        // 3. Decode
        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            error!(path, source = %e, "image decode failed");
            EngineError::ImageLoad {
                path: path.to_string(),
                source: e.into(),
            }
        })?;
        let rgba = decoded.to_rgba8();
        let (pixel_width, pixel_height) = rgba.dimensions();
        let loaded = LoadedImage {
            pixel_width,
            pixel_height,
            rgba: Arc::new(rgba.into_raw()),
        };

        // 4. Cache
        let mut cache = self.cache.lock().unwrap();
        cache.insert(path.to_string(), loaded.clone());
        Ok(loaded)
    }

    /// Loads a whole manifest concurrently.
    ///
    /// Results come back in manifest order regardless of which decode
    /// finished first; the first failure aborts the set and names the
    /// offending path. Nothing is retried.
    pub fn load_all(&self, paths: &[String]) -> Result<Vec<LoadedImage>, EngineError> {
        paths.par_iter().map(|path| self.load(path)).collect()
    }
}
