//! Shared scroll state.
//!
//! One accumulator per scene, advanced exactly once per frame by the driver.
//! Tiles receive the state by value and never write it back; the driver is
//! the only owner.

use crate::math::lerp;

/// Per-scene scroll accumulator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollState {
    /// Smoothing factor in (0,1]; the fraction of the remaining distance to
    /// `target` covered each frame. Tiles also use it as the per-frame
    /// drift increment.
    pub ease: f32,
    /// Smoothed value chasing `target`.
    pub current: f32,
    /// Accumulated scroll destination.
    pub target: f32,
    /// Timestamp of the frame that produced this snapshot, in milliseconds.
    pub last: f64,
}

impl ScrollState {
    pub fn new(ease: f32) -> Self {
        Self {
            ease,
            current: 0.0,
            target: 0.0,
            last: 0.0,
        }
    }

    /// Advances the accumulator by one frame: `target` grows by `speed` and
    /// `current` chases it exponentially.
    pub fn advance(&mut self, timestamp_ms: f64, speed: f32) {
        self.target += speed;
        self.current = lerp(self.current, self.target, self.ease);
        self.last = timestamp_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_accumulates_speed() {
        let mut scroll = ScrollState::new(0.1);
        scroll.advance(0.0, 0.5);
        scroll.advance(16.0, 0.5);
        assert_eq!(scroll.target, 1.0);
        assert_eq!(scroll.last, 16.0);
    }

    #[test]
    fn current_converges_geometrically_toward_target() {
        let mut scroll = ScrollState::new(0.5);
        scroll.target = 8.0;

        let mut gap = scroll.target - scroll.current;
        for frame in 0..20 {
            scroll.advance(frame as f64 * 16.0, 0.0);
            let next_gap = scroll.target - scroll.current;
            assert!(next_gap <= gap * 0.5 + 1e-6, "frame {frame}");
            gap = next_gap;
        }
        assert!((scroll.current - scroll.target).abs() < 1e-3);
    }
}
