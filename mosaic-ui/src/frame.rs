//! Frame scheduling.
//!
//! Input handlers never apply work directly. They park it and ask a
//! [`FrameScheduler`] for the next frame, and the host calls back into the
//! owner once per frame. Any number of requests between two frames collapse
//! into a single callback.
//!
//! Browsers back this with `requestAnimationFrame`, native hosts with their
//! redraw request. [`ManualFrameClock`] is a host-less implementation driven
//! explicitly, used by the headless demo and by tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Something that can be asked to deliver one frame callback soon.
pub trait FrameScheduler: Send + Sync {
    /// Requests a frame. Requests made before the frame is delivered are
    /// coalesced.
    fn request_frame(&self);
}

/// A frame clock advanced by hand.
///
/// ```
/// use mosaic_ui::frame::{FrameScheduler, ManualFrameClock};
///
/// let clock = ManualFrameClock::new();
/// assert_eq!(clock.advance(), None);
///
/// clock.request_frame();
/// clock.request_frame();
/// assert_eq!(clock.advance(), Some(1));
/// assert_eq!(clock.advance(), None);
/// ```
#[derive(Debug, Default)]
pub struct ManualFrameClock {
    requested: AtomicBool,
    frame: AtomicU64,
    request_count: AtomicU64,
}

impl ManualFrameClock {
    /// Creates an idle clock at frame zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame has been requested since the last [`advance`].
    ///
    /// [`advance`]: ManualFrameClock::advance
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Total number of `request_frame` calls, coalesced or not.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Index of the last delivered frame.
    pub fn current_frame(&self) -> u64 {
        self.frame.load(Ordering::Acquire)
    }

    /// Delivers a frame if one was requested, returning its index.
    pub fn advance(&self) -> Option<u64> {
        if self.requested.swap(false, Ordering::AcqRel) {
            Some(self.frame.fetch_add(1, Ordering::AcqRel) + 1)
        } else {
            None
        }
    }
}

impl FrameScheduler for ManualFrameClock {
    fn request_frame(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.requested.store(true, Ordering::Release);
    }
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for std::sync::Arc<T> {
    fn request_frame(&self) {
        (**self).request_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce_into_one_frame() {
        let clock = ManualFrameClock::new();
        for _ in 0..5 {
            clock.request_frame();
        }
        assert_eq!(clock.request_count(), 5);
        assert!(clock.is_requested());
        assert_eq!(clock.advance(), Some(1));
        assert!(!clock.is_requested());
        assert_eq!(clock.advance(), None);
        assert_eq!(clock.current_frame(), 1);
    }
}
