//! Pointer and wheel events delivered to the canvas.
//!
//! Hosts translate whatever their windowing layer produces into
//! [`CursorEvent`]s. Positions are relative to the canvas container's top-left
//! corner.

use crate::px::{Px, PxPosition};

/// Pixels per line when a wheel reports line deltas.
pub const LINE_SCROLL_PX: f32 = 16.0;

/// A single pointer or wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorEvent {
    /// What happened.
    pub content: CursorEventContent,
}

impl CursorEvent {
    /// Primary button pressed at `position`.
    pub fn pressed(position: PxPosition) -> Self {
        Self {
            content: CursorEventContent::Pressed(position),
        }
    }

    /// Pointer moved to `position`.
    pub fn moved(position: PxPosition) -> Self {
        Self {
            content: CursorEventContent::Moved(position),
        }
    }

    /// Primary button released.
    pub fn released() -> Self {
        Self {
            content: CursorEventContent::Released,
        }
    }

    /// Pointer left the container.
    pub fn left() -> Self {
        Self {
            content: CursorEventContent::Left,
        }
    }

    /// Wheel scrolled by a pixel delta.
    pub fn scroll(delta_x: f32, delta_y: f32) -> Self {
        Self {
            content: CursorEventContent::Scroll(ScrollEventContent {
                delta_x,
                delta_y,
                unit: ScrollUnit::Pixels,
            }),
        }
    }
}

/// The payload of a [`CursorEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorEventContent {
    /// Primary button went down.
    Pressed(PxPosition),
    /// Pointer moved, with or without a button held.
    Moved(PxPosition),
    /// Primary button went up.
    Released,
    /// Pointer left the container; treated like a release.
    Left,
    /// Wheel or trackpad scroll.
    Scroll(ScrollEventContent),
}

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollUnit {
    /// Deltas are already in pixels (trackpads, most browsers).
    #[default]
    Pixels,
    /// Deltas count lines (classic mouse wheels).
    Lines,
}

/// Wheel delta as reported by the host.
///
/// Positive `delta_y` means the content should move up, matching the DOM
/// `WheelEvent` convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEventContent {
    /// Horizontal delta.
    pub delta_x: f32,
    /// Vertical delta.
    pub delta_y: f32,
    /// Unit of both deltas.
    pub unit: ScrollUnit,
}

impl ScrollEventContent {
    /// Returns the delta in fractional pixels, scaled by `multiplier`.
    pub fn scaled_delta(&self, multiplier: f32) -> [f32; 2] {
        let scale = match self.unit {
            ScrollUnit::Pixels => multiplier,
            ScrollUnit::Lines => multiplier * LINE_SCROLL_PX,
        };
        [self.delta_x * scale, self.delta_y * scale]
    }

    /// Returns the delta in whole pixels, scaled by `multiplier`. Fractions
    /// are truncated; callers that see many small deltas should accumulate
    /// [`scaled_delta`](Self::scaled_delta) instead.
    pub fn pixel_delta(&self, multiplier: f32) -> PxPosition {
        let [dx, dy] = self.scaled_delta(multiplier);
        PxPosition::new(Px::saturating_from_f32(dx), Px::saturating_from_f32(dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_deltas_scale_to_pixels() {
        let event = ScrollEventContent {
            delta_x: 0.0,
            delta_y: 3.0,
            unit: ScrollUnit::Lines,
        };
        assert_eq!(event.pixel_delta(1.0), PxPosition::new(Px(0), Px(48)));
    }

    #[test]
    fn pixel_deltas_respect_multiplier() {
        let event = ScrollEventContent {
            delta_x: 10.5,
            delta_y: -4.0,
            unit: ScrollUnit::Pixels,
        };
        assert_eq!(event.pixel_delta(2.0), PxPosition::new(Px(21), Px(-8)));
    }
}
