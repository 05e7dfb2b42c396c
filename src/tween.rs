//! # Tween Scheduler
//!
//! Self-scheduling, time-bounded interpolations.
//!
//! ## Responsibilities
//! - **Ticking**: one update per frame with `{elapsed, progress, eased}`.
//! - **Termination**: exactly one final tick at `progress == 1`, nothing after.
//! - **Cancellation**: idempotent, effective at any point in the lifetime.
//!
//! A scheduled tween keeps at most one frame request outstanding and re-arms
//! itself until it completes or is cancelled.

use std::sync::{Arc, Mutex};

use keyframe::EasingFunction;

use crate::easing::Easing;
use crate::error::EngineError;
use crate::frame::{FrameQueue, FrameToken};

/// Snapshot handed to the update callback once per frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TweenTick {
    /// Milliseconds since the tween's first tick.
    pub elapsed: f64,
    /// Raw progress, clamped to [0,1] and non-decreasing.
    pub progress: f64,
    /// `progress` passed through the easing curve.
    pub eased: f64,
}

type UpdateCallback = Box<dyn FnMut(TweenTick) + Send>;

struct TweenState {
    duration_ms: f64,
    easing: Easing,
    update: Option<UpdateCallback>,
    start: Option<f64>,
    last_progress: f64,
    frame: Option<FrameToken>,
    done: bool,
}

/// Handle to a scheduled tween.
///
/// Cloneable so the owner can stash one copy and hand another to teardown
/// paths; all clones observe the same lifetime.
#[derive(Clone)]
pub struct TweenHandle {
    queue: Arc<FrameQueue>,
    state: Arc<Mutex<TweenState>>,
}

impl TweenHandle {
    /// Stops the tween. No update callback runs after this returns, no
    /// matter where in its lifetime the tween was; calling it again (or
    /// after natural completion) is a no-op.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some(token) = state.frame.take() {
            self.queue.cancel(token);
        }
        state.done = true;
        state.update = None;
    }

    /// True once the tween has completed naturally or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.state.lock().unwrap().done
    }
}

pub struct Tween;

impl Tween {
    /// Schedules `update` to run once per frame until progress reaches 1.
    ///
    /// The first tick observes `elapsed == 0` (the start timestamp is
    /// captured when the first frame fires, not when the tween is
    /// scheduled). Progress clamps to [0,1], never decreases, and the tick
    /// where it reaches 1 is the last invocation.
    pub fn schedule(
        queue: &Arc<FrameQueue>,
        duration_ms: f64,
        easing: Easing,
        update: impl FnMut(TweenTick) + Send + 'static,
    ) -> Result<TweenHandle, EngineError> {
        if !(duration_ms > 0.0) {
            return Err(EngineError::InvalidDuration(duration_ms));
        }

        let state = Arc::new(Mutex::new(TweenState {
            duration_ms,
            easing,
            update: Some(Box::new(update)),
            start: None,
            last_progress: 0.0,
            frame: None,
            done: false,
        }));

        arm(queue, &state);

        Ok(TweenHandle {
            queue: Arc::clone(queue),
            state,
        })
    }
}

fn arm(queue: &Arc<FrameQueue>, state: &Arc<Mutex<TweenState>>) {
    let queue_for_step = Arc::clone(queue);
    let state_for_step = Arc::clone(state);
    let token = queue.request(move |now| step(&queue_for_step, &state_for_step, now));
    state.lock().unwrap().frame = Some(token);
}

fn step(queue: &Arc<FrameQueue>, state: &Arc<Mutex<TweenState>>, now: f64) {
    // Compute the tick under the lock, invoke the callback outside it so
    // the callback may cancel this or any other tween.
    let (tick, mut update) = {
        let mut locked = state.lock().unwrap();
        if locked.done {
            return;
        }
        locked.frame = None;

        let start = *locked.start.get_or_insert(now);
        let elapsed = now - start;
        let progress = (elapsed / locked.duration_ms)
            .clamp(0.0, 1.0)
            .max(locked.last_progress);
        locked.last_progress = progress;

        if progress >= 1.0 {
            locked.done = true;
        }

        let tick = TweenTick {
            elapsed,
            progress,
            eased: locked.easing.y(progress),
        };
        (tick, locked.update.take())
    };

    if let Some(callback) = update.as_mut() {
        callback(tick);
    }

    let mut locked = state.lock().unwrap();
    if locked.done {
        // Finished on this tick, or cancelled from inside the callback.
        locked.update = None;
        return;
    }
    locked.update = update;
    drop(locked);
    arm(queue, state);
}
