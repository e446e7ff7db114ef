//! Column layout: which item sits where, and how tall it is.
//!
//! The canvas is an infinite grid of fixed-width columns. Column `c` starts at
//! `x = c * (card_width + gap)`; odd columns start `stagger_offset` lower than
//! even ones, giving the brick-like look. Within a column, ordinal `0` sits at
//! the stagger origin, positive ordinals stack downward and negative ordinals
//! stack upward, every pair separated by exactly `gap`.
//!
//! Item choice is pure modulo arithmetic over the portfolio, so the same
//! `(column, ordinal)` always shows the same item and layout never fails for
//! a non-empty portfolio.

use std::sync::Arc;

use mosaic_ui::Px;

use crate::{
    config::CanvasConfig,
    dimensions::DimensionCache,
    item::{Portfolio, PortfolioItem},
    measurement::{CellId, Measure},
};

/// Where a cell's height came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightSource {
    /// The host reported the rendered height.
    Measured,
    /// Derived from the cover image's cached aspect ratio.
    AspectRatio,
    /// Nothing known yet; the configured estimate.
    Estimated,
}

/// A resolved cell before it has a vertical position.
#[derive(Debug, Clone)]
pub struct CellSpec {
    /// The item shown.
    pub item: Arc<PortfolioItem>,
    /// The cell's identity.
    pub id: CellId,
    /// Height of the card, never negative.
    pub height: Px,
    /// How `height` was determined.
    pub source: HeightSource,
}

/// Maps `(column, ordinal)` to items and heights.
///
/// Borrowing everything keeps a layout pass a pure function of its inputs:
/// two passes over the same portfolio, cache contents and measurements give
/// identical results.
pub struct ColumnLayout<'a, M: Measure + ?Sized> {
    config: &'a CanvasConfig,
    portfolio: &'a Portfolio,
    dimensions: &'a DimensionCache,
    measurements: &'a M,
}

impl<'a, M: Measure + ?Sized> ColumnLayout<'a, M> {
    /// Creates a layout over already sanitised configuration.
    pub fn new(
        config: &'a CanvasConfig,
        portfolio: &'a Portfolio,
        dimensions: &'a DimensionCache,
        measurements: &'a M,
    ) -> Self {
        Self {
            config,
            portfolio,
            dimensions,
            measurements,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &CanvasConfig {
        self.config
    }

    /// Whether there is anything to lay out.
    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty()
    }

    /// Distance between adjacent column origins.
    pub fn column_width(&self) -> Px {
        self.config.column_width()
    }

    /// Left edge of `column`.
    pub fn column_x(&self, column: i32) -> Px {
        self.column_width().saturating_mul(i64::from(column))
    }

    /// Top edge of ordinal `0` in `column`.
    pub fn stagger_origin(&self, column: i32) -> Px {
        if column.rem_euclid(2) == 1 {
            self.config.stagger_offset
        } else {
            Px::ZERO
        }
    }

    /// The item shown at `(column, ordinal)`.
    pub fn item_at(&self, column: i32, ordinal: i32) -> Option<&Arc<PortfolioItem>> {
        let index = i64::from(column) * i64::from(self.config.column_item_stride)
            + i64::from(ordinal);
        self.portfolio.wrapped(index)
    }

    /// Resolves the item, identity and height of `(column, ordinal)`.
    ///
    /// Heights are taken from the host's measurement if there is one, else
    /// from the cover image's aspect ratio at card width, else the estimate.
    pub fn cell(&self, column: i32, ordinal: i32) -> Option<CellSpec> {
        let item = self.item_at(column, ordinal)?;
        let id = CellId::new(item.id.clone(), column, ordinal);
        let (height, source) = self.height_of(item, &id);
        Some(CellSpec {
            item: item.clone(),
            id,
            height: height.max(Px::ZERO),
            source,
        })
    }

    fn height_of(&self, item: &PortfolioItem, id: &CellId) -> (Px, HeightSource) {
        if let Some(size) = self.measurements.measure(id) {
            return (size.height, HeightSource::Measured);
        }
        if let Some(height) = item
            .cover_image()
            .and_then(|url| self.dimensions.height_for_width(url, self.config.card_width))
        {
            return (height, HeightSource::AspectRatio);
        }
        (self.config.estimated_card_height, HeightSource::Estimated)
    }
}
