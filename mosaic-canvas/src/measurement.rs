//! Rendered size feedback from the host.
//!
//! Once a card's media has loaded, the host reports the card's real height.
//! Layout prefers that over anything derived from image metadata, because the
//! rendered card may carry captions or padding the image size knows nothing
//! about.

use std::fmt;

use mosaic_ui::{Px, PxSize};
use rustc_hash::FxHashMap as HashMap;

/// Identity of one cell in the infinite tiling.
///
/// The same item repeats across columns and ordinals, so the item id alone is
/// not unique. The `Display` form, `"{item_id}-{column}-{ordinal}"`, is what
/// hosts should use as a render key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    /// Id of the item shown in this cell.
    pub item_id: String,
    /// Column index, negative to the left of the origin.
    pub column: i32,
    /// Position within the column, negative above the stagger origin.
    pub ordinal: i32,
}

impl CellId {
    /// Creates a cell id.
    pub fn new(item_id: impl Into<String>, column: i32, ordinal: i32) -> Self {
        Self {
            item_id: item_id.into(),
            column,
            ordinal,
        }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.item_id, self.column, self.ordinal)
    }
}

/// Source of rendered sizes, queried synchronously during layout.
pub trait Measure {
    /// The last rendered size of `id`, if it has been measured.
    fn measure(&self, id: &CellId) -> Option<PxSize>;
}

impl<F> Measure for F
where
    F: Fn(&CellId) -> Option<PxSize>,
{
    fn measure(&self, id: &CellId) -> Option<PxSize> {
        self(id)
    }
}

/// A measurement source that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmeasured;

impl Measure for Unmeasured {
    fn measure(&self, _id: &CellId) -> Option<PxSize> {
        None
    }
}

/// Rendered sizes reported by the host, keyed by cell.
#[derive(Debug, Default, Clone)]
pub struct MeasurementStore {
    sizes: HashMap<CellId, PxSize>,
}

impl MeasurementStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rendered size. Returns `true` if it differs from what was
    /// stored, i.e. if layout needs to run again.
    pub fn record(&mut self, id: CellId, size: PxSize) -> bool {
        let size = PxSize::new(size.width.max(Px::ZERO), size.height.max(Px::ZERO));
        match self.sizes.insert(id, size) {
            Some(previous) => previous != size,
            None => true,
        }
    }

    /// Records a rendered height for a card of `card_width`.
    pub fn record_height(&mut self, id: CellId, card_width: Px, height: Px) -> bool {
        self.record(id, PxSize::new(card_width, height))
    }

    /// Drops every measurement, e.g. after the portfolio changed.
    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    /// Number of measured cells.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether nothing has been measured.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Measure for MeasurementStore {
    fn measure(&self, id: &CellId) -> Option<PxSize> {
        self.sizes.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_composite_key() {
        assert_eq!(CellId::new("42", -3, -1).to_string(), "42--3--1");
        assert_eq!(CellId::new("a", 0, 2).to_string(), "a-0-2");
    }

    #[test]
    fn record_reports_changes_only() {
        let mut store = MeasurementStore::new();
        let id = CellId::new("a", 1, 0);
        assert!(store.record_height(id.clone(), Px(240), Px(300)));
        assert!(!store.record_height(id.clone(), Px(240), Px(300)));
        assert!(store.record_height(id.clone(), Px(240), Px(310)));
        assert_eq!(store.measure(&id), Some(PxSize::new(Px(240), Px(310))));
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let mut store = MeasurementStore::new();
        let id = CellId::new("a", 0, 0);
        store.record_height(id.clone(), Px(240), Px(-5));
        assert_eq!(store.measure(&id).map(|size| size.height), Some(Px::ZERO));
    }

    #[test]
    fn closures_act_as_measure_sources() {
        let source = |id: &CellId| (id.ordinal == 0).then_some(PxSize::new(Px(1), Px(2)));
        assert!(source.measure(&CellId::new("x", 0, 0)).is_some());
        assert!(source.measure(&CellId::new("x", 0, 1)).is_none());
        assert!(Unmeasured.measure(&CellId::new("x", 0, 0)).is_none());
    }
}
