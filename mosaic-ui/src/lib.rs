//! Foundation types for the mosaic infinite canvas.
//!
//! This crate knows nothing about portfolios or masonry. It provides the
//! integer pixel geometry, the input event vocabulary and the frame scheduling
//! seam that `mosaic-canvas` builds on, so the layout engine stays independent
//! of any particular UI framework's lifecycle.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod cursor;
pub mod frame;
pub mod logging;
pub mod px;

pub use crate::{
    cursor::{CursorEvent, CursorEventContent, ScrollEventContent, ScrollUnit},
    frame::{FrameScheduler, ManualFrameClock},
    logging::init_tracing,
    px::{Px, PxPosition, PxRect, PxSize},
};
