//! Cooperative per-frame callback queue.
//!
//! Stand-in for the host's animation-frame facility: callbacks registered
//! during one frame run on the next `run`, and requests made while a frame
//! drains are deferred to the frame after. Single-threaded cooperative
//! scheduling; the host render loop owns the clock and calls `run` once per
//! frame with the current timestamp.

use std::sync::Mutex;

/// Identifies one pending frame request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameToken(u64);

type FrameCallback = Box<dyn FnMut(f64) + Send>;

#[derive(Default)]
struct QueueInner {
    next_token: u64,
    pending: Vec<(FrameToken, FrameCallback)>,
}

/// Frame scheduler shared by the scene driver and every active tween.
#[derive(Default)]
pub struct FrameQueue {
    inner: Mutex<QueueInner>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run on the next frame.
    pub fn request(&self, callback: impl FnMut(f64) + Send + 'static) -> FrameToken {
        let mut inner = self.inner.lock().unwrap();
        inner.next_token += 1;
        let token = FrameToken(inner.next_token);
        inner.pending.push((token, Box::new(callback)));
        token
    }

    /// Drops a pending request. Unknown or already-run tokens are ignored.
    pub fn cancel(&self, token: FrameToken) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending.retain(|(pending, _)| *pending != token);
    }

    /// Runs every callback registered before this call, passing the frame
    /// timestamp in milliseconds. Requests made by a running callback land
    /// in the next frame.
    pub fn run(&self, timestamp_ms: f64) {
        // Swap the queue out first so callbacks can re-arm without
        // deadlocking or running twice in one frame.
        let drained = {
            let mut inner = self.inner.lock().unwrap();
            std::mem::take(&mut inner.pending)
        };
        for (_, mut callback) in drained {
            callback(timestamp_ms);
        }
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    /// Drops every pending request. Used on scene teardown.
    pub fn clear(&self) {
        self.inner.lock().unwrap().pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn run_invokes_with_timestamp() {
        let queue = FrameQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        queue.request(move |ts| sink.lock().unwrap().push(ts));

        queue.run(16.7);
        assert_eq!(*seen.lock().unwrap(), vec![16.7]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn requests_during_drain_defer_to_next_frame() {
        let queue = Arc::new(FrameQueue::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let queue2 = Arc::clone(&queue);
        let hits2 = Arc::clone(&hits);
        queue.request(move |_| {
            hits2.fetch_add(1, Ordering::SeqCst);
            let hits3 = Arc::clone(&hits2);
            queue2.request(move |_| {
                hits3.fetch_add(1, Ordering::SeqCst);
            });
        });

        queue.run(0.0);
        assert_eq!(hits.load(Ordering::SeqCst), 1, "re-arm must not run this frame");
        assert_eq!(queue.pending(), 1);

        queue.run(16.0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_removes_pending_request() {
        let queue = FrameQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits2 = Arc::clone(&hits);
        let token = queue.request(move |_| {
            hits2.fetch_add(1, Ordering::SeqCst);
        });
        queue.cancel(token);
        queue.run(0.0);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        // Cancelling a consumed token is a no-op.
        queue.cancel(token);
    }

    #[test]
    fn clear_drops_everything() {
        let queue = FrameQueue::new();
        queue.request(|_| {});
        queue.request(|_| {});
        queue.clear();
        assert_eq!(queue.pending(), 0);
    }
}
