//! Canvas configuration.

use derive_setters::Setters;
use mosaic_ui::Px;

/// Geometry and behaviour knobs for a [`MasonryCanvas`].
///
/// Values are sanitised when the canvas is built, so out-of-range input (a
/// negative gap, a zero card width) degrades to the nearest usable value
/// instead of failing.
///
/// [`MasonryCanvas`]: crate::MasonryCanvas
///
/// ```
/// use mosaic_canvas::CanvasConfig;
/// use mosaic_ui::Px;
///
/// let config = CanvasConfig::default().card_width(Px(300)).gap(Px(24));
/// assert_eq!(config.column_width(), Px(324));
/// ```
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct CanvasConfig {
    /// Fixed width of every card.
    pub card_width: Px,
    /// Space between columns and between cards within a column.
    pub gap: Px,
    /// Vertical shift applied to odd columns.
    pub stagger_offset: Px,
    /// Card height used until a real size is known.
    pub estimated_card_height: Px,
    /// Extra margin around the viewport that is still laid out.
    pub buffer: Px,
    /// How far the item sequence advances from one column to the next.
    pub column_item_stride: i32,
    /// Iteration cap for each column walk, in either direction.
    pub max_walk_steps: usize,
    /// Scale applied to wheel deltas.
    pub wheel_multiplier: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            card_width: Px(240),
            gap: Px(48),
            stagger_offset: Px(120),
            estimated_card_height: Px(320),
            buffer: Px(200),
            column_item_stride: 3,
            max_walk_steps: 1000,
            wheel_multiplier: 1.0,
        }
    }
}

impl CanvasConfig {
    /// Horizontal distance between the left edges of adjacent columns.
    pub fn column_width(&self) -> Px {
        self.card_width.saturating_add(self.gap)
    }

    /// Returns a copy with every value clamped into its usable range.
    pub fn sanitized(&self) -> Self {
        Self {
            card_width: ensure_positive_px(self.card_width),
            gap: sanitize_spacing(self.gap),
            stagger_offset: sanitize_spacing(self.stagger_offset),
            estimated_card_height: ensure_positive_px(self.estimated_card_height),
            buffer: sanitize_spacing(self.buffer),
            column_item_stride: self.column_item_stride,
            max_walk_steps: self.max_walk_steps.max(1),
            wheel_multiplier: if self.wheel_multiplier.is_finite() {
                self.wheel_multiplier
            } else {
                1.0
            },
        }
    }
}

pub(crate) fn ensure_positive_px(px: Px) -> Px {
    if px <= Px::ZERO { Px(1) } else { px }
}

pub(crate) fn sanitize_spacing(px: Px) -> Px {
    if px < Px::ZERO { Px::ZERO } else { px }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_column_width_matches_card_plus_gap() {
        assert_eq!(CanvasConfig::default().column_width(), Px(288));
    }

    #[test]
    fn sanitized_clamps_degenerate_values() {
        let config = CanvasConfig::default()
            .card_width(Px(0))
            .gap(Px(-4))
            .estimated_card_height(Px(-10))
            .buffer(Px(-1))
            .max_walk_steps(0)
            .wheel_multiplier(f32::NAN)
            .sanitized();
        assert_eq!(config.card_width, Px(1));
        assert_eq!(config.gap, Px::ZERO);
        assert_eq!(config.estimated_card_height, Px(1));
        assert_eq!(config.buffer, Px::ZERO);
        assert_eq!(config.max_walk_steps, 1);
        assert_eq!(config.wheel_multiplier, 1.0);
    }
}
