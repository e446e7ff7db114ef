//! A virtualized, infinitely tiling masonry canvas.
//!
//! Portfolio items repeat across an unbounded grid of staggered columns that
//! the user pans by dragging or scrolling. Only the cells intersecting the
//! viewport (plus a buffer) are produced, and the number of items does not
//! matter. Every column is walked from its stagger origin, though, so a pass
//! costs roughly one step per card between the origin and the far edge of the
//! viewport. Panning horizontally is free; panning vertically grows the walk.
//! Each walk stops at [`CanvasConfig::max_walk_steps`], and once that happens
//! the cells beyond it are missing and [`VisibleSet::truncated`] is set.
//!
//! The pieces, bottom up:
//!
//! - [`DimensionCache`] holds natural image sizes, filled in the background by
//!   an [`ImagePreloader`] through a [`DimensionLoader`].
//! - [`ColumnLayout`] decides which item sits at a `(column, ordinal)` slot and
//!   how tall it is.
//! - [`compute_visible_set`] walks the columns that overlap the viewport and
//!   positions the cells that are visible.
//! - [`ViewportTracker`] turns drag and wheel input into at most one pan
//!   update per frame.
//! - [`MasonryCanvas`] owns all of the above for a host.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod canvas;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod item;
pub mod layout;
pub mod measurement;
pub mod preloader;
pub mod viewport;
pub mod visible;

pub use crate::{
    canvas::MasonryCanvas,
    config::CanvasConfig,
    dimensions::{
        DimensionCache, DimensionLoader, FsDimensionLoader, ImageSize, StaticDimensionLoader,
    },
    error::DimensionError,
    item::{Portfolio, PortfolioItem},
    layout::{CellSpec, ColumnLayout, HeightSource},
    measurement::{CellId, Measure, MeasurementStore, Unmeasured},
    preloader::{ImagePreloader, PreloadOutcome},
    viewport::ViewportTracker,
    visible::{LayoutCell, ViewportState, VisibleSet, column_range, compute_visible_set},
};
