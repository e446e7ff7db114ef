//! Pan tracking for the canvas.
//!
//! Drag and wheel input never move the canvas directly. Each event parks an
//! update in a single pending slot and the first one into an empty slot asks
//! the [`FrameScheduler`] for a frame. When the frame arrives,
//! [`ViewportTracker::on_frame`] applies whatever is in the slot. Events that
//! arrive in between overwrite the slot rather than queue behind it, so at
//! most one offset change happens per frame and the newest input wins.
//!
//! Wheel deltas arrive in fractional pixels. The part that does not add up to
//! a whole pixel is carried into the next wheel event, so a trackpad sending
//! many sub-pixel deltas still moves the canvas by their sum.

use std::sync::Arc;

use mosaic_ui::{CursorEvent, CursorEventContent, FrameScheduler, Px, PxPosition, PxSize};
use tracing::trace;

use crate::visible::ViewportState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingUpdate {
    /// Move to an absolute offset (drag).
    MoveTo(PxPosition),
    /// Move the current offset by a delta (wheel).
    ScrollBy(PxPosition),
}

/// Tracks the pan offset and viewport size of a canvas.
///
/// All methods take `&mut self`; the tracker lives on the UI thread that
/// delivers its events and frames.
pub struct ViewportTracker {
    offset: PxPosition,
    viewport_size: PxSize,
    /// Pointer position minus offset, captured on press.
    drag_anchor: Option<PxPosition>,
    pending: Option<PendingUpdate>,
    wheel_multiplier: f32,
    /// Sub-pixel wheel motion not yet applied, always in `(-1, 1)`.
    wheel_remainder: [f64; 2],
    scheduler: Arc<dyn FrameScheduler>,
}

impl ViewportTracker {
    /// Creates a tracker at offset zero with an empty viewport.
    pub fn new(scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            offset: PxPosition::ZERO,
            viewport_size: PxSize::ZERO,
            drag_anchor: None,
            pending: None,
            wheel_multiplier: 1.0,
            wheel_remainder: [0.0; 2],
            scheduler,
        }
    }

    /// Scales wheel deltas by `multiplier`.
    pub fn with_wheel_multiplier(mut self, multiplier: f32) -> Self {
        self.wheel_multiplier = multiplier;
        self
    }

    /// Current pan offset.
    pub fn state(&self) -> ViewportState {
        ViewportState::from(self.offset)
    }

    /// Current viewport size.
    pub fn viewport_size(&self) -> PxSize {
        self.viewport_size
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Whether an update is waiting for the next frame.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a container resize. Takes effect immediately.
    ///
    /// Returns `true` if the size changed.
    pub fn resize(&mut self, size: PxSize) -> bool {
        if self.viewport_size == size {
            return false;
        }
        self.viewport_size = size;
        true
    }

    /// Jumps to `offset` immediately, discarding any pending update.
    pub fn set_offset(&mut self, offset: PxPosition) {
        self.pending = None;
        self.wheel_remainder = [0.0; 2];
        self.offset = offset;
    }

    /// Feeds one input event. Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &CursorEvent) -> bool {
        match event.content {
            CursorEventContent::Pressed(position) => {
                self.drag_anchor = Some(position.saturating_sub(self.offset));
                true
            }
            CursorEventContent::Moved(position) => {
                let Some(anchor) = self.drag_anchor else {
                    return false;
                };
                self.park(PendingUpdate::MoveTo(position.saturating_sub(anchor)));
                true
            }
            CursorEventContent::Released | CursorEventContent::Left => {
                self.drag_anchor.take().is_some()
            }
            CursorEventContent::Scroll(scroll) => {
                let [dx, dy] = scroll.scaled_delta(self.wheel_multiplier);
                if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
                    return false;
                }
                let delta = self.accumulate_wheel([dx, dy]);
                if delta != PxPosition::ZERO {
                    self.park(PendingUpdate::ScrollBy(delta));
                }
                true
            }
        }
    }

    /// Applies the pending update, if any. Returns `true` if the offset
    /// changed.
    pub fn on_frame(&mut self) -> bool {
        let Some(update) = self.pending.take() else {
            return false;
        };
        let next = match update {
            PendingUpdate::MoveTo(target) => target,
            PendingUpdate::ScrollBy(delta) => self.offset.saturating_sub(delta),
        };
        let changed = next != self.offset;
        trace!(?update, from = ?self.offset, to = ?next, "applying viewport update");
        self.offset = next;
        changed
    }

    /// Adds `delta` to the carried remainder and takes out the whole pixels.
    fn accumulate_wheel(&mut self, delta: [f32; 2]) -> PxPosition {
        let mut whole = [Px::ZERO; 2];
        for axis in 0..2 {
            let total = self.wheel_remainder[axis] + f64::from(delta[axis]);
            let pixels = total.trunc();
            self.wheel_remainder[axis] = total - pixels;
            whole[axis] = Px::saturating_from_f32(pixels as f32);
        }
        PxPosition::new(whole[0], whole[1])
    }

    fn park(&mut self, update: PendingUpdate) {
        if self.pending.replace(update).is_none() {
            self.scheduler.request_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use mosaic_ui::ManualFrameClock;

    use super::*;

    fn tracker() -> (ViewportTracker, Arc<ManualFrameClock>) {
        let clock = Arc::new(ManualFrameClock::new());
        (ViewportTracker::new(clock.clone()), clock)
    }

    fn pos(x: i32, y: i32) -> PxPosition {
        PxPosition::new(Px(x), Px(y))
    }

    #[test]
    fn drag_moves_by_pointer_delta() {
        let (mut tracker, clock) = tracker();
        tracker.set_offset(pos(10, 20));
        assert!(tracker.handle_event(&CursorEvent::pressed(pos(100, 100))));
        assert!(tracker.is_dragging());
        assert!(tracker.handle_event(&CursorEvent::moved(pos(150, 90))));
        assert_eq!(tracker.state().offset(), pos(10, 20));

        assert!(clock.advance().is_some());
        assert!(tracker.on_frame());
        assert_eq!(tracker.state().offset(), pos(60, 10));
    }

    #[test]
    fn moves_within_one_frame_coalesce() {
        let (mut tracker, clock) = tracker();
        tracker.handle_event(&CursorEvent::pressed(pos(0, 0)));
        tracker.handle_event(&CursorEvent::moved(pos(5, 5)));
        tracker.handle_event(&CursorEvent::moved(pos(9, 9)));
        tracker.handle_event(&CursorEvent::moved(pos(30, -4)));
        assert_eq!(clock.request_count(), 1);

        assert!(tracker.on_frame());
        assert_eq!(tracker.state().offset(), pos(30, -4));
        assert!(!tracker.on_frame());
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let (mut tracker, clock) = tracker();
        assert!(!tracker.handle_event(&CursorEvent::moved(pos(5, 5))));
        assert!(!tracker.has_pending());
        assert_eq!(clock.request_count(), 0);
    }

    #[test]
    fn release_ends_drag_but_keeps_pending_move() {
        let (mut tracker, _clock) = tracker();
        tracker.handle_event(&CursorEvent::pressed(pos(0, 0)));
        tracker.handle_event(&CursorEvent::moved(pos(-40, 0)));
        assert!(tracker.handle_event(&CursorEvent::left()));
        assert!(!tracker.is_dragging());
        assert!(!tracker.handle_event(&CursorEvent::released()));
        assert!(tracker.on_frame());
        assert_eq!(tracker.state().offset(), pos(-40, 0));
    }

    #[test]
    fn wheel_scrolls_against_delta_last_write_wins() {
        let (mut tracker, clock) = tracker();
        tracker.handle_event(&CursorEvent::scroll(0.0, 100.0));
        tracker.handle_event(&CursorEvent::scroll(10.0, 40.0));
        assert_eq!(clock.request_count(), 1);
        assert!(tracker.on_frame());
        assert_eq!(tracker.state().offset(), pos(-10, -40));

        tracker.handle_event(&CursorEvent::scroll(0.0, 100.0));
        assert_eq!(clock.request_count(), 2);
        tracker.on_frame();
        assert_eq!(tracker.state().offset(), pos(-10, -140));
    }

    #[test]
    fn fractional_wheel_deltas_accumulate() {
        let (mut tracker, clock) = tracker();
        for _ in 0..100 {
            assert!(tracker.handle_event(&CursorEvent::scroll(0.0, 0.8)));
            if clock.advance().is_some() {
                tracker.on_frame();
            }
        }
        assert_eq!(tracker.state().offset(), pos(0, -80));

        for _ in 0..10 {
            tracker.handle_event(&CursorEvent::scroll(-1.5, 0.0));
            if clock.advance().is_some() {
                tracker.on_frame();
            }
        }
        assert_eq!(tracker.state().offset(), pos(15, -80));
    }

    #[test]
    fn sub_pixel_wheel_delta_waits_for_more() {
        let (mut tracker, clock) = tracker();
        assert!(tracker.handle_event(&CursorEvent::scroll(0.2, -0.4)));
        assert!(!tracker.has_pending());
        assert_eq!(clock.request_count(), 0);
        assert!(tracker.handle_event(&CursorEvent::scroll(0.0, -0.7)));
        assert!(tracker.has_pending());
        tracker.on_frame();
        assert_eq!(tracker.state().offset(), pos(0, 1));
    }

    #[test]
    fn empty_wheel_event_is_not_consumed() {
        let (mut tracker, _clock) = tracker();
        assert!(!tracker.handle_event(&CursorEvent::scroll(0.0, 0.0)));
        assert!(!tracker.handle_event(&CursorEvent::scroll(f32::NAN, 1.0)));
        assert!(!tracker.has_pending());
    }

    #[test]
    fn resize_reports_changes() {
        let (mut tracker, _clock) = tracker();
        let size = PxSize::new(Px(1000), Px(800));
        assert!(tracker.resize(size));
        assert!(!tracker.resize(size));
        assert_eq!(tracker.viewport_size(), size);
    }
}
