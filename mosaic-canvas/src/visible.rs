//! Visible set calculation.
//!
//! Only the cells that intersect the viewport, grown by a buffer margin, are
//! produced. Nothing from previous passes is kept. The work per column is the
//! number of cards between the stagger origin and the far edge of the
//! viewport, capped by `max_walk_steps`; past the cap the set is marked
//! [`VisibleSet::truncated`].

use std::{ops::RangeInclusive, sync::Arc};

use mosaic_ui::{Px, PxPosition, PxRect, PxSize};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::{
    item::PortfolioItem,
    layout::{ColumnLayout, HeightSource},
    measurement::{CellId, Measure},
};

/// The pan offset of the canvas.
///
/// World point `p` appears on screen at `p + offset`; dragging the content to
/// the right makes `offset_x` grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewportState {
    /// Horizontal pan offset.
    pub offset_x: Px,
    /// Vertical pan offset.
    pub offset_y: Px,
}

impl ViewportState {
    /// Creates a state from an offset.
    pub const fn new(offset_x: Px, offset_y: Px) -> Self {
        Self { offset_x, offset_y }
    }

    /// The offset as a position.
    pub fn offset(&self) -> PxPosition {
        PxPosition::new(self.offset_x, self.offset_y)
    }

    /// World-space rectangle covered by a viewport of `size` at this offset.
    pub fn world_rect(&self, size: PxSize) -> PxRect {
        PxRect::new(
            -self.offset_x,
            -self.offset_y,
            size.width.max(Px::ZERO),
            size.height.max(Px::ZERO),
        )
    }
}

impl From<PxPosition> for ViewportState {
    fn from(offset: PxPosition) -> Self {
        Self::new(offset.x, offset.y)
    }
}

/// One positioned card, in world coordinates.
#[derive(Debug, Clone)]
pub struct LayoutCell {
    /// The item shown.
    pub item: Arc<PortfolioItem>,
    /// Unique identity within the tiling.
    pub id: CellId,
    /// Left edge.
    pub x: Px,
    /// Top edge.
    pub y: Px,
    /// Card width.
    pub width: Px,
    /// Card height.
    pub height: Px,
    /// How the height was determined.
    pub height_source: HeightSource,
}

impl LayoutCell {
    /// The composite render key, `"{item_id}-{column}-{ordinal}"`.
    pub fn unique_id(&self) -> String {
        self.id.to_string()
    }

    /// Column index.
    pub fn column(&self) -> i32 {
        self.id.column
    }

    /// Ordinal within the column.
    pub fn ordinal(&self) -> i32 {
        self.id.ordinal
    }

    /// The cell's world rectangle.
    pub fn rect(&self) -> PxRect {
        PxRect::new(self.x, self.y, self.width, self.height)
    }

    /// Screen position under `viewport`.
    pub fn screen_position(&self, viewport: &ViewportState) -> PxPosition {
        PxPosition::new(
            self.x.saturating_add(viewport.offset_x),
            self.y.saturating_add(viewport.offset_y),
        )
    }
}

/// Result of one visible set pass.
#[derive(Debug, Clone, Default)]
pub struct VisibleSet {
    /// Cells ordered by column, then by ordinal.
    pub cells: Vec<LayoutCell>,
    /// Columns that were walked, `None` for an empty portfolio.
    pub columns: Option<RangeInclusive<i32>>,
    /// The buffered world rectangle cells were tested against.
    pub bounds: PxRect,
    /// Whether any walk stopped at the iteration cap before reaching the edge
    /// of `bounds`. When set, some cells that should be visible are missing.
    pub truncated: bool,
}

impl VisibleSet {
    /// Whether no cells are visible.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of visible cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Cells of a single column, in ordinal order.
    pub fn column(&self, column: i32) -> impl Iterator<Item = &LayoutCell> {
        self.cells.iter().filter(move |cell| cell.id.column == column)
    }

    /// Looks up a cell by identity.
    pub fn find(&self, id: &CellId) -> Option<&LayoutCell> {
        self.cells.iter().find(|cell| &cell.id == id)
    }
}

/// Inclusive range of columns whose horizontal extent `[x, x + card_width)`
/// overlaps `[left, right)`.
pub fn column_range(left: Px, right: Px, card_width: Px, column_width: Px) -> RangeInclusive<i64> {
    let card_width = i64::from(card_width.raw().max(1));
    let column_width = i64::from(column_width.raw()).max(card_width);
    let left = i64::from(left.raw());
    let right = i64::from(right.raw());
    // x + card_width > left  <=>  c > (left - card_width) / column_width
    let first = (left - card_width).div_euclid(column_width) + 1;
    // x < right  <=>  c < right / column_width
    let last = (right - 1).div_euclid(column_width);
    first..=last
}

/// Computes every cell intersecting the viewport grown by `buffer`.
///
/// Each column is walked downward from its stagger origin until the bottom
/// bound is passed, then upward from the same origin until the top bound is
/// passed. Both walks stop after `max_walk_steps` iterations regardless, which
/// keeps zero-height cells with a zero gap from spinning forever.
pub fn compute_visible_set<M: Measure + ?Sized>(
    layout: &ColumnLayout<'_, M>,
    viewport: ViewportState,
    viewport_size: PxSize,
    buffer: Px,
) -> VisibleSet {
    let bounds = viewport.world_rect(viewport_size).inflate(buffer.max(Px::ZERO));
    if layout.is_empty() {
        return VisibleSet {
            bounds,
            ..Default::default()
        };
    }

    let config = layout.config();
    let max_steps = config.max_walk_steps.clamp(1, i32::MAX as usize);
    let span = column_range(bounds.x, bounds.right(), config.card_width, layout.column_width());
    let first = clamp_column(*span.start());
    let mut last = clamp_column(*span.end());
    let mut truncated = false;
    if i64::from(last) - i64::from(first) >= max_steps as i64 {
        last = first.saturating_add(max_steps as i32 - 1);
        truncated = true;
    }

    let mut cells = Vec::new();
    for column in first..=last {
        let x = layout.column_x(column);
        if !bounds.overlaps_x(x, config.card_width) {
            continue;
        }
        truncated |= walk_up(layout, column, x, &bounds, max_steps, &mut cells);
        truncated |= walk_down(layout, column, x, &bounds, max_steps, &mut cells);
    }

    if truncated {
        warn!(
            columns = ?(first..=last),
            max_steps,
            "visible set truncated at walk cap; some cells are not laid out"
        );
    }
    trace!(cells = cells.len(), ?bounds, "computed visible set");

    VisibleSet {
        cells,
        columns: Some(first..=last),
        bounds,
        truncated,
    }
}

fn clamp_column(column: i64) -> i32 {
    column.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Walks ordinals 0, 1, 2, ... Returns `true` if the cap was hit.
fn walk_down<M: Measure + ?Sized>(
    layout: &ColumnLayout<'_, M>,
    column: i32,
    x: Px,
    bounds: &PxRect,
    max_steps: usize,
    cells: &mut Vec<LayoutCell>,
) -> bool {
    let config = layout.config();
    let mut y = layout.stagger_origin(column);
    for step in 0..max_steps {
        if y >= bounds.bottom() {
            return false;
        }
        let Some(spec) = layout.cell(column, step as i32) else {
            return false;
        };
        if bounds.overlaps_y(y, spec.height) {
            cells.push(LayoutCell {
                item: spec.item,
                id: spec.id,
                x,
                y,
                width: config.card_width,
                height: spec.height,
                height_source: spec.source,
            });
        }
        y = y.saturating_add(spec.height).saturating_add(config.gap);
    }
    y < bounds.bottom()
}

/// Walks ordinals -1, -2, ... and appends them in ascending ordinal order.
/// Returns `true` if the cap was hit.
fn walk_up<M: Measure + ?Sized>(
    layout: &ColumnLayout<'_, M>,
    column: i32,
    x: Px,
    bounds: &PxRect,
    max_steps: usize,
    cells: &mut Vec<LayoutCell>,
) -> bool {
    let config = layout.config();
    let mut above: SmallVec<[LayoutCell; 8]> = SmallVec::new();
    // Bottom edge of the next cell up.
    let mut edge = layout.stagger_origin(column).saturating_sub(config.gap);
    let mut capped = true;
    for step in 0..max_steps {
        if edge <= bounds.y {
            capped = false;
            break;
        }
        let ordinal = -(step as i32) - 1;
        let Some(spec) = layout.cell(column, ordinal) else {
            capped = false;
            break;
        };
        let y = edge.saturating_sub(spec.height);
        if bounds.overlaps_y(y, spec.height) {
            above.push(LayoutCell {
                item: spec.item,
                id: spec.id,
                x,
                y,
                width: config.card_width,
                height: spec.height,
                height_source: spec.source,
            });
        }
        edge = y.saturating_sub(config.gap);
    }
    if capped && edge <= bounds.y {
        capped = false;
    }
    cells.extend(above.into_iter().rev());
    capped
}
