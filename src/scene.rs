//! # Scene Driver
//!
//! Owns the stage, the tiles, the scroll state and the frame queue, and
//! fixes the per-frame ordering the rest of the engine relies on.
//!
//! ## Frame tick order
//! 1. Drain the event subscription (resize, transitions).
//! 2. Advance the scroll state.
//! 3. `on_frame` every tile, in insertion order, with the scroll snapshot.
//! 4. Run the frame queue so active tween callbacks fire.
//!
//! Teardown cancels every outstanding tween and clears the frame queue
//! before freeing stage nodes, so no callback ever touches a destroyed
//! plane.

use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;
use tracing::{debug, info};

use crate::assets::LoadedImage;
use crate::config::{CameraConfig, SceneConfig};
use crate::error::EngineError;
use crate::frame::FrameQueue;
use crate::mode::TransitionMode;
use crate::scroll::ScrollState;
use crate::stage::{PlaneHandle, PlaneId, Stage};
use crate::tile::{Tile, TileLayout};

/// World-space rectangle visible through the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Host notifications delivered over the scene's subscription.
#[derive(Clone, Debug)]
pub enum SceneEvent {
    /// The host surface changed size, in screen pixels.
    Resized { width: f32, height: f32 },
    /// Run the given transition on every tile.
    Transition(TransitionMode),
}

pub struct Scene {
    config: SceneConfig,
    stage: Arc<Mutex<Stage>>,
    frames: Arc<FrameQueue>,
    scroll: ScrollState,
    tiles: Vec<Tile>,
    root: PlaneId,
    viewport: Viewport,
    events: Option<Receiver<SceneEvent>>,
    torn_down: bool,
}

impl Scene {
    pub fn new(config: SceneConfig, screen_width: f32, screen_height: f32) -> Self {
        let mut stage = Stage::new();
        let root = stage.add_plane();

        let viewport = compute_viewport(&config.camera, screen_width / screen_height);
        let scroll = ScrollState::new(config.scroll_ease);

        info!(
            viewport_width = viewport.width,
            viewport_height = viewport.height,
            "scene created"
        );

        Self {
            scroll,
            config,
            stage: Arc::new(Mutex::new(stage)),
            frames: Arc::new(FrameQueue::new()),
            tiles: Vec::new(),
            root,
            viewport,
            events: None,
            torn_down: false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames(&self) -> &Arc<FrameQueue> {
        &self.frames
    }

    pub fn stage(&self) -> Arc<Mutex<Stage>> {
        Arc::clone(&self.stage)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Attaches one tile per decoded image, in manifest order, parented
    /// under the scene root. All loads are collected before the first frame
    /// runs; nothing attaches mid-animation.
    pub fn attach(&mut self, images: Vec<LoadedImage>) -> Result<(), EngineError> {
        let layout = TileLayout {
            columns: self.config.columns,
            direction: self.config.direction,
            middle_column_offset: self.config.middle_column_offset,
        };

        for image in images {
            let index = self.tiles.len();
            let id = {
                let mut stage = self.stage.lock().unwrap();
                let id = stage.add_plane();
                stage.try_set_parent(self.root, id);
                id
            };
            let handle = PlaneHandle::new(Arc::clone(&self.stage), id);
            let tile = Tile::new(index, &image, handle, self.viewport, layout)?;
            self.tiles.push(tile);
        }

        debug!(tiles = self.tiles.len(), "tiles attached");
        Ok(())
    }

    /// Hands the scene its event subscription. Replaces any previous one.
    pub fn subscribe(&mut self, events: Receiver<SceneEvent>) {
        self.events = Some(events);
    }

    /// Runs one macro-frame at the given timestamp (milliseconds).
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<(), EngineError> {
        if self.torn_down {
            return Ok(());
        }

        self.drain_events()?;

        self.scroll.advance(timestamp_ms, self.config.scroll_speed);
        let snapshot = self.scroll;

        for tile in &mut self.tiles {
            tile.on_frame(snapshot)?;
        }

        self.frames.run(timestamp_ms);
        Ok(())
    }

    fn drain_events(&mut self) -> Result<(), EngineError> {
        let drained: Vec<SceneEvent> = match &self.events {
            Some(receiver) => receiver.try_iter().collect(),
            None => return Ok(()),
        };

        for event in drained {
            match event {
                SceneEvent::Resized { width, height } => self.resize(width, height)?,
                SceneEvent::Transition(mode) => self.transition_all(mode)?,
            }
        }
        Ok(())
    }

    /// Recomputes the viewport for a new surface size and replays fit and
    /// placement on every tile.
    pub fn resize(&mut self, screen_width: f32, screen_height: f32) -> Result<(), EngineError> {
        self.viewport = compute_viewport(&self.config.camera, screen_width / screen_height);
        debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            "viewport resized"
        );
        for tile in &mut self.tiles {
            tile.start(self.viewport)?;
        }
        Ok(())
    }

    /// Starts the given transition on every tile.
    pub fn transition_all(&mut self, mode: TransitionMode) -> Result<(), EngineError> {
        debug!(%mode, "transition requested");
        for tile in &mut self.tiles {
            tile.begin_transition(mode, &self.frames)?;
        }
        Ok(())
    }

    /// Cancels outstanding tweens, drops the event subscription and frees
    /// every stage node. Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        for tile in &mut self.tiles {
            tile.cancel_transition();
        }
        self.frames.clear();
        self.events = None;
        self.tiles.clear();
        self.stage.lock().unwrap().reset();

        info!("scene torn down");
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Projects the camera onto the world-space rectangle it can see: the
/// standard perspective relation between vertical field of view, distance
/// and visible height.
fn compute_viewport(camera: &CameraConfig, aspect: f32) -> Viewport {
    let vfov = camera.fov_deg.to_radians();
    let height = 2.0 * (vfov / 2.0).tan() * camera.z;
    Viewport {
        width: height * aspect,
        height,
    }
}
