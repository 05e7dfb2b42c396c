//! # mosaic-engine
//!
//! A renderer-agnostic animation core for scroll-driven image grids.
//!
//! The engine arranges decoded images on planes in a grid, drifts them
//! vertically with seamless wrap-around from a shared scroll state, and
//! runs ease-driven mode transitions (open/close, fit/contain, nudges)
//! through a cooperative tween scheduler. A host renderer walks the stage
//! graph once per frame and binds the uniform slots; the host loop supplies
//! timestamps and drives [`scene::Scene::frame`].

pub mod assets;
pub mod config;
pub mod easing;
pub mod error;
pub mod frame;
pub mod math;
pub mod mode;
pub mod scene;
pub mod scroll;
pub mod stage;
pub mod tile;
pub mod tween;

pub use assets::{DiskSource, ImageSource, ImageStore, LoadedImage};
pub use config::{CameraConfig, SceneConfig};
pub use easing::{CubicBezier, Easing};
pub use error::EngineError;
pub use frame::{FrameQueue, FrameToken};
pub use mode::{ModeSpec, TransitionMode};
pub use scene::{Scene, SceneEvent, Viewport};
pub use scroll::ScrollState;
pub use stage::{PlaneHandle, PlaneId, PlaneNode, Stage, UniformValue};
pub use tile::{Tile, TileLayout};
pub use tween::{Tween, TweenHandle, TweenTick};
