//! Image-load failures must abort the owning load set with a descriptive
//! error and leave everything else untouched.

use std::sync::Arc;

use anyhow::Result;
use mosaic_engine::{DiskSource, EngineError, ImageSource, ImageStore};

struct MockSource;

impl ImageSource for MockSource {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        if path == "missing.png" {
            anyhow::bail!("File not found");
        }
        let mut bytes = Vec::new();
        let img = image::RgbaImage::new(4, 4);
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        Ok(bytes)
    }
}

#[test]
fn missing_image_error_names_the_path() {
    let store = ImageStore::new(Arc::new(MockSource));
    let manifest: Vec<String> = vec!["ok.png".into(), "missing.png".into(), "ok2.png".into()];

    let result = store.load_all(&manifest);
    let err = result.err().expect("load set must abort");
    let message = err.to_string();
    assert!(
        message.contains("Failed to load image asset: missing.png"),
        "{message}"
    );
    assert!(message.contains("File not found"), "{message}");
}

#[test]
fn error_is_the_image_load_variant() {
    let store = ImageStore::new(Arc::new(MockSource));
    let err = store.load("missing.png").unwrap_err();
    assert!(matches!(err, EngineError::ImageLoad { ref path, .. } if path == "missing.png"));
}

#[test]
fn a_failing_path_does_not_poison_the_store() {
    let store = ImageStore::new(Arc::new(MockSource));
    assert!(store.load("missing.png").is_err());

    // Other paths still load and cache normally after the failure.
    let ok = store.load("ok.png").unwrap();
    assert_eq!((ok.pixel_width, ok.pixel_height), (4, 4));
}

#[test]
fn nonexistent_file_on_disk_propagates_through_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-there.png");

    let store = ImageStore::new(Arc::new(DiskSource));
    let err = store.load(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("not-there.png"));
}
