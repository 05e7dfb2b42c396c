//! # Tile
//!
//! One grid object: placement, aspect fit, per-frame drift and mode
//! transitions.
//!
//! ## Responsibilities
//! - **Placement**: column midpoints and the three row bands.
//! - **Aspect Fit**: keep the displayed image aspect-correct as the
//!   container morphs.
//! - **Drift**: seamless vertical wrap plus per-frame advance from the
//!   scroll snapshot.
//! - **Transitions**: ease-driven lerp tweens over a captured baseline.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::assets::LoadedImage;
use crate::error::EngineError;
use crate::frame::FrameQueue;
use crate::math::lerp;
use crate::mode::TransitionMode;
use crate::scene::Viewport;
use crate::scroll::ScrollState;
use crate::stage::{
    PlaneHandle, PlaneNode, UniformValue, U_IMAGE_SIZES, U_PLANE_SIZES, U_STRENGTH,
    U_VIEWPORT_SIZES,
};
use crate::tween::{Tween, TweenHandle, TweenTick};

/// Margin added past the wrap boundary so a reset tile never re-triggers
/// the boundary check on the same frame.
const WRAP_MARGIN: f32 = 0.05;

/// Layout settings shared by every tile of a scene.
#[derive(Copy, Clone, Debug)]
pub struct TileLayout {
    pub columns: usize,
    /// Drift direction along y; -1 scrolls tiles downward.
    pub direction: f32,
    /// Extra vertical offset applied to middle-column tiles.
    pub middle_column_offset: Option<f32>,
}

pub struct Tile {
    index: usize,
    layout: TileLayout,
    viewport: Viewport,
    /// Natural pixel dimensions of the loaded image.
    image_size: Vec2,
    mode: TransitionMode,
    plane: PlaneHandle,
    transition: Option<TweenHandle>,
}

impl Tile {
    /// Binds a decoded image to a stage plane and runs the initial fit and
    /// placement.
    pub fn new(
        index: usize,
        image: &LoadedImage,
        plane: PlaneHandle,
        viewport: Viewport,
        layout: TileLayout,
    ) -> Result<Self, EngineError> {
        let image_size = Vec2::new(image.pixel_width as f32, image.pixel_height as f32);

        plane.with_mut(|node| {
            node.scale = Vec2::splat(2.0);
            node.set_uniform(
                U_IMAGE_SIZES,
                UniformValue::Vec2([image_size.x, image_size.y]),
            );
            node.set_uniform(U_STRENGTH, UniformValue::Scalar(0.0));
        })?;

        let mut tile = Self {
            index,
            layout,
            viewport,
            image_size,
            mode: TransitionMode::Contain,
            plane,
            transition: None,
        };
        tile.start(viewport)?;
        Ok(tile)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    pub fn plane(&self) -> &PlaneHandle {
        &self.plane
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|tween| !tween.is_finished())
    }

    /// Re-applies fit and placement for a (possibly new) viewport.
    pub fn start(&mut self, viewport: Viewport) -> Result<(), EngineError> {
        self.viewport = viewport;
        self.fit()?;
        self.place()?;
        self.plane.with_mut(|node| {
            node.set_uniform(
                U_VIEWPORT_SIZES,
                UniformValue::Vec2([viewport.width, viewport.height]),
            );
        })
    }

    /// Derives the dependent scale axis from the image aspect and syncs the
    /// plane-size uniform.
    pub fn fit(&self) -> Result<(), EngineError> {
        let image_size = self.image_size;
        self.plane.with_mut(|node| aspect_fit(node, image_size))
    }

    /// Centers the tile in its grid cell: column midpoint horizontally, one
    /// of three half-viewport bands vertically.
    pub fn place(&self) -> Result<(), EngineError> {
        let columns = self.layout.columns.max(1);
        let section_width = self.viewport.width / columns as f32;

        let row = self.index / columns;
        let col = self.index % columns;

        let center_x = -self.viewport.width / 2.0 + col as f32 * section_width + section_width / 2.0;

        let mut center_y = match row {
            0 => self.viewport.height / 2.0,
            1 => 0.0,
            _ => -self.viewport.height / 2.0,
        };
        if col == columns / 2 {
            if let Some(offset) = self.layout.middle_column_offset {
                center_y += offset;
            }
        }

        self.plane
            .with_mut(|node| node.position = Vec3::new(center_x, center_y, 0.0))
    }

    /// Advances one frame from the driver's scroll snapshot.
    ///
    /// Drift is suspended while a transition tween is in flight so the
    /// tween stays the sole writer of the animated fields; the shading
    /// strength uniform updates unconditionally.
    pub fn on_frame(&mut self, scroll: ScrollState) -> Result<(), EngineError> {
        if self.transition.as_ref().is_some_and(TweenHandle::is_finished) {
            self.transition = None;
        }
        let drifting = self.transition.is_none();

        let direction = self.layout.direction;
        let half = self.viewport.height * 0.5;

        self.plane.with_mut(|node| {
            if drifting {
                let exited = if direction < 0.0 {
                    node.position.y <= half * direction - node.scale.y / 2.0
                } else {
                    node.position.y >= half * direction + node.scale.y / 2.0
                };
                if exited {
                    // Re-enter from the opposite boundary.
                    node.position.y = -half * direction - (node.scale.y / 2.0 + WRAP_MARGIN) * direction;
                }
                node.position.y += scroll.ease * direction;
            }

            let strength = (scroll.last * 0.001).sin() as f32 * 0.25;
            node.set_uniform(U_STRENGTH, UniformValue::Scalar(strength));
        })
    }

    /// Starts a mode transition from the current transform.
    ///
    /// Any in-flight transition is cancelled first; the latest request
    /// wins. Update functions interpolate with the *eased* progress as the
    /// lerp factor over the baseline captured here.
    pub fn begin_transition(
        &mut self,
        mode: TransitionMode,
        frames: &Arc<FrameQueue>,
    ) -> Result<(), EngineError> {
        if let Some(active) = self.transition.take() {
            active.cancel();
        }

        let spec = mode.spec();
        let (scale, position_y) = self.plane.with(|node| (node.scale, node.position.y))?;
        let plane = self.plane.clone();
        let image_size = self.image_size;

        debug!(index = self.index, mode = %mode, "transition start");

        let update: Box<dyn FnMut(TweenTick) + Send> = match mode {
            TransitionMode::Up | TransitionMode::Down => {
                let nudge = if mode == TransitionMode::Up { 1.0 } else { -1.0 };
                let target = position_y + nudge * scale.y * 0.5;
                Box::new(move |tick: TweenTick| {
                    // Stage may already be torn down; the tween is moot then.
                    let _ = plane.with_mut(|node| {
                        node.position.y = lerp(position_y, target, tick.eased as f32);
                    });
                })
            }
            TransitionMode::Open => Box::new(move |tick: TweenTick| {
                let _ = plane.with_mut(|node| {
                    node.scale.y = lerp(0.0, scale.y, tick.eased as f32);
                    sync_plane_sizes(node);
                });
            }),
            TransitionMode::Close => Box::new(move |tick: TweenTick| {
                let _ = plane.with_mut(|node| {
                    node.scale.y = lerp(scale.y, 0.0, tick.eased as f32);
                    sync_plane_sizes(node);
                });
            }),
            TransitionMode::Fit => Box::new(move |tick: TweenTick| {
                let _ = plane.with_mut(|node| {
                    node.scale.x = lerp(scale.x, scale.x * 2.0, tick.eased as f32);
                    sync_plane_sizes(node);
                    if tick.progress >= 1.0 {
                        aspect_fit(node, image_size);
                    }
                });
            }),
            TransitionMode::Contain => Box::new(move |tick: TweenTick| {
                let _ = plane.with_mut(|node| {
                    node.scale.x = lerp(scale.x, scale.x * 2.0, tick.eased as f32);
                });
            }),
        };

        self.transition = Some(Tween::schedule(frames, spec.duration_ms, spec.easing, update)?);
        self.mode = mode;
        Ok(())
    }

    /// Cancels any in-flight transition. Safe to call repeatedly.
    pub fn cancel_transition(&mut self) {
        if let Some(active) = self.transition.take() {
            active.cancel();
        }
    }
}

/// Keeps the displayed image aspect-correct inside the plane.
///
/// Landscape images keep their width and derive the height; portrait and
/// square images keep their height and derive the width.
fn aspect_fit(node: &mut PlaneNode, image_size: Vec2) {
    let ratio = image_size.x / image_size.y;
    if ratio > 1.0 {
        node.scale.y = node.scale.x / ratio;
    } else {
        node.scale.x = node.scale.y * ratio;
    }
    sync_plane_sizes(node);
}

fn sync_plane_sizes(node: &mut PlaneNode) {
    node.set_uniform(
        U_PLANE_SIZES,
        UniformValue::Vec2([node.scale.x, node.scale.y]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use std::sync::Mutex;

    fn landscape_image() -> LoadedImage {
        LoadedImage {
            pixel_width: 1920,
            pixel_height: 1080,
            rgba: Arc::new(Vec::new()),
        }
    }

    fn portrait_image() -> LoadedImage {
        LoadedImage {
            pixel_width: 1080,
            pixel_height: 1920,
            rgba: Arc::new(Vec::new()),
        }
    }

    fn layout() -> TileLayout {
        TileLayout {
            columns: 3,
            direction: -1.0,
            middle_column_offset: None,
        }
    }

    fn tile_with(
        index: usize,
        image: &LoadedImage,
        viewport: Viewport,
        layout: TileLayout,
    ) -> (Tile, PlaneHandle) {
        let stage = Arc::new(Mutex::new(Stage::new()));
        let id = stage.lock().unwrap().add_plane();
        let handle = PlaneHandle::new(stage, id);
        let tile = Tile::new(index, image, handle.clone(), viewport, layout).unwrap();
        (tile, handle)
    }

    #[test]
    fn center_cell_sits_at_the_origin() {
        let viewport = Viewport {
            width: 12.0,
            height: 9.0,
        };
        let (_tile, plane) = tile_with(4, &landscape_image(), viewport, layout());

        let position = plane.with(|node| node.position).unwrap();
        assert!(position.x.abs() < 1e-6);
        assert!(position.y.abs() < 1e-6);
    }

    #[test]
    fn middle_column_offset_staggers_the_center_cell() {
        let viewport = Viewport {
            width: 12.0,
            height: 9.0,
        };
        let mut staggered = layout();
        staggered.middle_column_offset = Some(1.2);
        let (_tile, plane) = tile_with(4, &landscape_image(), viewport, staggered);

        let position = plane.with(|node| node.position).unwrap();
        assert!((position.y - 1.2).abs() < 1e-6);
    }

    #[test]
    fn rows_map_to_the_three_bands() {
        let viewport = Viewport {
            width: 12.0,
            height: 8.0,
        };
        for (index, expected_y) in [(0, 4.0), (4, 0.0), (8, -4.0)] {
            let (_tile, plane) = tile_with(index, &landscape_image(), viewport, layout());
            let y = plane.with(|node| node.position.y).unwrap();
            assert!((y - expected_y).abs() < 1e-6, "index {index}");
        }
    }

    #[test]
    fn aspect_fit_landscape_derives_height() {
        let viewport = Viewport {
            width: 12.0,
            height: 9.0,
        };
        let (_tile, plane) = tile_with(0, &landscape_image(), viewport, layout());

        let scale = plane.with(|node| node.scale).unwrap();
        assert_eq!(scale.x, 2.0);
        assert!((scale.y - 2.0 * 1080.0 / 1920.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_fit_portrait_derives_width() {
        let viewport = Viewport {
            width: 12.0,
            height: 9.0,
        };
        let (_tile, plane) = tile_with(0, &portrait_image(), viewport, layout());

        let scale = plane.with(|node| node.scale).unwrap();
        assert_eq!(scale.y, 2.0);
        assert!((scale.x - 2.0 * 1080.0 / 1920.0).abs() < 1e-6);
    }

    #[test]
    fn plane_sizes_uniform_tracks_the_fit() {
        let viewport = Viewport {
            width: 12.0,
            height: 9.0,
        };
        let (_tile, plane) = tile_with(0, &landscape_image(), viewport, layout());

        let (scale, uniform) = plane
            .with(|node| (node.scale, node.uniform(U_PLANE_SIZES)))
            .unwrap();
        assert_eq!(uniform, Some(UniformValue::Vec2([scale.x, scale.y])));
    }

    #[test]
    fn wrap_resets_past_the_exit_boundary() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(0, &landscape_image(), viewport, layout());
        plane
            .with_mut(|node| {
                node.scale = Vec2::new(2.0, 2.0);
                node.position.y = -6.0;
            })
            .unwrap();

        // Drift increment zeroed so the reset position is observable as-is.
        tile.on_frame(ScrollState::new(0.0)).unwrap();
        let y = plane.with(|node| node.position.y).unwrap();
        assert!((y - 6.05).abs() < 1e-6, "got {y}");
    }

    #[test]
    fn drift_advances_by_ease_times_direction() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());

        let before = plane.with(|node| node.position.y).unwrap();
        tile.on_frame(ScrollState::new(0.1)).unwrap();
        let after = plane.with(|node| node.position.y).unwrap();
        assert!((after - (before - 0.1)).abs() < 1e-6);
    }

    #[test]
    fn strength_uniform_follows_the_frame_timestamp() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());

        let mut scroll = ScrollState::new(0.0);
        scroll.last = std::f64::consts::FRAC_PI_2 * 1000.0;
        tile.on_frame(scroll).unwrap();

        let strength = plane.with(|node| node.uniform(U_STRENGTH)).unwrap();
        let Some(UniformValue::Scalar(value)) = strength else {
            panic!("strength uniform missing");
        };
        assert!((value - 0.25).abs() < 1e-5);
    }

    #[test]
    fn drift_is_suspended_while_transitioning() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());
        let frames = Arc::new(FrameQueue::new());

        tile.begin_transition(TransitionMode::Fit, &frames).unwrap();
        assert!(tile.is_transitioning());

        let before = plane.with(|node| node.position.y).unwrap();
        tile.on_frame(ScrollState::new(0.5)).unwrap();
        let after = plane.with(|node| node.position.y).unwrap();
        assert_eq!(before, after, "drift must pause during a transition");

        // The strength uniform still updates.
        assert!(plane
            .with(|node| node.uniform(U_STRENGTH))
            .unwrap()
            .is_some());
    }

    #[test]
    fn drift_resumes_after_the_transition_completes() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());
        let frames = Arc::new(FrameQueue::new());

        tile.begin_transition(TransitionMode::Contain, &frames)
            .unwrap();
        frames.run(0.0);
        frames.run(2000.0); // past the 1500ms duration
        assert!(!tile.is_transitioning());

        let before = plane.with(|node| node.position.y).unwrap();
        tile.on_frame(ScrollState::new(0.5)).unwrap();
        let after = plane.with(|node| node.position.y).unwrap();
        assert!((after - (before - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn a_new_transition_supersedes_the_active_one() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, _plane) = tile_with(4, &landscape_image(), viewport, layout());
        let frames = Arc::new(FrameQueue::new());

        tile.begin_transition(TransitionMode::Fit, &frames).unwrap();
        let first = tile.transition.clone().unwrap();
        tile.begin_transition(TransitionMode::Close, &frames).unwrap();

        assert!(first.is_finished(), "superseded tween must be cancelled");
        assert_eq!(tile.mode(), TransitionMode::Close);
    }

    #[test]
    fn fit_transition_doubles_width_and_refits_on_completion() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());
        let frames = Arc::new(FrameQueue::new());

        let start = plane.with(|node| node.scale).unwrap();
        tile.begin_transition(TransitionMode::Fit, &frames).unwrap();
        frames.run(0.0);
        frames.run(750.0);
        frames.run(1500.0);

        let scale = plane.with(|node| node.scale).unwrap();
        let ratio = 1920.0 / 1080.0;
        assert!((scale.x - start.x * 2.0).abs() < 1e-5);
        assert!(
            (scale.y - scale.x / ratio).abs() < 1e-5,
            "completion must re-fit the aspect"
        );
    }

    #[test]
    fn close_transition_collapses_height_to_zero() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());
        let frames = Arc::new(FrameQueue::new());

        tile.begin_transition(TransitionMode::Close, &frames).unwrap();
        frames.run(0.0);
        frames.run(1500.0);

        let scale = plane.with(|node| node.scale).unwrap();
        assert!(scale.y.abs() < 1e-6);
    }

    #[test]
    fn contain_transition_leaves_the_plane_sizes_uniform_alone() {
        let viewport = Viewport {
            width: 12.0,
            height: 10.0,
        };
        let (mut tile, plane) = tile_with(4, &landscape_image(), viewport, layout());
        let frames = Arc::new(FrameQueue::new());

        let synced_before = plane.with(|node| node.uniform(U_PLANE_SIZES)).unwrap();
        tile.begin_transition(TransitionMode::Contain, &frames)
            .unwrap();
        frames.run(0.0);
        frames.run(1500.0);

        let (scale, synced_after) = plane
            .with(|node| (node.scale, node.uniform(U_PLANE_SIZES)))
            .unwrap();
        assert!((scale.x - 4.0).abs() < 1e-5);
        assert_eq!(synced_before, synced_after);
    }
}
