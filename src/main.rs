//! Headless demo driver.
//!
//! Loads a scene manifest (JSON path as the first argument, built-in
//! defaults otherwise), decodes the images, then drives a few seconds of
//! frames with a synthetic 60 fps clock: a fit transition, a close, and
//! continuous scroll drift in between. Everything the engine does runs
//! here; only the draw calls are missing.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mosaic_engine::{
    DiskSource, ImageStore, Scene, SceneConfig, SceneEvent, TransitionMode,
};

const FRAME_MS: f64 = 1000.0 / 60.0;
const TOTAL_FRAMES: u64 = 300;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            SceneConfig::from_json(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => SceneConfig::default(),
    };

    let store = ImageStore::new(Arc::new(DiskSource));
    let images = store
        .load_all(&config.images)
        .context("loading scene manifest")?;
    info!(count = images.len(), "images decoded");

    let (events, subscription) = crossbeam_channel::unbounded();
    let mut scene = Scene::new(config, 1280.0, 720.0);
    scene.attach(images)?;
    scene.subscribe(subscription);

    for frame in 0..TOTAL_FRAMES {
        match frame {
            60 => events.send(SceneEvent::Transition(TransitionMode::Fit))?,
            180 => events.send(SceneEvent::Transition(TransitionMode::Close))?,
            _ => {}
        }
        scene.frame(frame as f64 * FRAME_MS)?;
    }

    let scroll = scene.scroll();
    info!(
        target = scroll.target,
        current = scroll.current,
        "run complete"
    );
    scene.teardown();
    Ok(())
}
