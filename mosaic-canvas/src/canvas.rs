//! The canvas controller.
//!
//! [`MasonryCanvas`] ties the pieces together for a host: it owns the
//! configuration, the portfolio, the viewport tracker and the measurement
//! store, shares the dimension cache, and drives the preloader. The host feeds
//! it input and frames and asks it for the visible set whenever
//! [`needs_layout`](MasonryCanvas::needs_layout) says so.

use std::{sync::Arc, time::Duration};

use mosaic_ui::{CursorEvent, FrameScheduler, Px, PxPosition, PxSize};
use tracing::{debug, trace};

use crate::{
    config::CanvasConfig,
    dimensions::{DimensionCache, DimensionLoader},
    item::Portfolio,
    layout::{ColumnLayout, HeightSource},
    measurement::{CellId, MeasurementStore},
    preloader::ImagePreloader,
    viewport::ViewportTracker,
    visible::{VisibleSet, ViewportState, compute_visible_set},
};

/// An infinite, pannable masonry canvas.
///
/// ```
/// use std::sync::Arc;
///
/// use mosaic_canvas::{CanvasConfig, DimensionCache, MasonryCanvas, Portfolio, PortfolioItem};
/// use mosaic_ui::{ManualFrameClock, Px, PxSize};
///
/// let clock = Arc::new(ManualFrameClock::new());
/// let mut canvas = MasonryCanvas::new(
///     CanvasConfig::default(),
///     clock,
///     Arc::new(DimensionCache::new()),
/// );
/// canvas.set_items(Portfolio::new([PortfolioItem::new("1", ["/uploads/1.jpg"])]));
/// canvas.resize(PxSize::new(Px(1000), Px(800)));
///
/// let visible = canvas.layout();
/// assert!(!visible.is_empty());
/// ```
pub struct MasonryCanvas {
    config: CanvasConfig,
    portfolio: Portfolio,
    tracker: ViewportTracker,
    dimensions: Arc<DimensionCache>,
    measurements: MeasurementStore,
    preloader: Option<ImagePreloader>,
    scheduler: Arc<dyn FrameScheduler>,
    needs_layout: bool,
}

impl MasonryCanvas {
    /// Creates an empty canvas.
    ///
    /// `config` is sanitised. `scheduler` receives frame requests from input
    /// handling, height changes and finished preloads.
    pub fn new(
        config: CanvasConfig,
        scheduler: Arc<dyn FrameScheduler>,
        dimensions: Arc<DimensionCache>,
    ) -> Self {
        let config = config.sanitized();
        let tracker =
            ViewportTracker::new(scheduler.clone()).with_wheel_multiplier(config.wheel_multiplier);
        Self {
            config,
            portfolio: Portfolio::default(),
            tracker,
            dimensions,
            measurements: MeasurementStore::new(),
            preloader: None,
            scheduler,
            needs_layout: true,
        }
    }

    /// Loads unknown image sizes through `loader` in the background.
    ///
    /// Without a loader the canvas only uses what is already in the cache.
    pub fn with_loader(mut self, loader: Arc<dyn DimensionLoader>) -> Self {
        self.preloader = Some(
            ImagePreloader::new(self.dimensions.clone(), loader)
                .with_scheduler(self.scheduler.clone()),
        );
        self
    }

    /// The sanitised configuration.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The items being tiled.
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// The shared dimension cache.
    pub fn dimensions(&self) -> &Arc<DimensionCache> {
        &self.dimensions
    }

    /// Rendered sizes reported so far.
    pub fn measurements(&self) -> &MeasurementStore {
        &self.measurements
    }

    /// Current pan offset.
    pub fn viewport(&self) -> ViewportState {
        self.tracker.state()
    }

    /// Current viewport size.
    pub fn viewport_size(&self) -> PxSize {
        self.tracker.viewport_size()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    /// Whether the last visible set is stale.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Number of background loads not yet applied.
    pub fn pending_preloads(&self) -> usize {
        self.preloader.as_ref().map_or(0, ImagePreloader::in_flight)
    }

    /// Replaces the portfolio. Measurements belong to cells of the old
    /// portfolio and are dropped.
    pub fn set_items(&mut self, portfolio: Portfolio) {
        debug!(items = portfolio.len(), "portfolio replaced");
        self.portfolio = portfolio;
        self.measurements.clear();
        self.invalidate();
    }

    /// Records a container resize and requests a frame to lay out at the
    /// new size.
    pub fn resize(&mut self, size: PxSize) -> bool {
        let changed = self.tracker.resize(size);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Jumps to `offset` without waiting for input, and requests a frame to
    /// lay out there.
    pub fn set_offset(&mut self, offset: PxPosition) {
        self.tracker.set_offset(offset);
        self.invalidate();
    }

    /// Feeds one input event. Returns `true` if it was consumed.
    pub fn handle_event(&mut self, event: &CursorEvent) -> bool {
        self.tracker.handle_event(event)
    }

    /// Frame callback. Applies pending input and finished preloads.
    ///
    /// Returns [`needs_layout`](Self::needs_layout).
    pub fn on_frame(&mut self) -> bool {
        if self.tracker.on_frame() {
            self.needs_layout = true;
        }
        if self.drain_preloads() {
            self.needs_layout = true;
        }
        self.needs_layout
    }

    /// Records the rendered height of a card.
    ///
    /// Returns `true` if the height changed, in which case a frame is
    /// requested so the column below the card can be re-laid out.
    pub fn on_height_change(&mut self, id: &CellId, height: Px) -> bool {
        let changed = self
            .measurements
            .record_height(id.clone(), self.config.card_width, height);
        if changed {
            trace!(cell = %id, ?height, "card height changed");
            self.invalidate();
        }
        changed
    }

    /// Blocks until every background load has been applied or `timeout`
    /// elapses. Returns the number of loads applied.
    pub fn wait_for_preloads(&mut self, timeout: Duration) -> usize {
        let Some(preloader) = self.preloader.as_mut() else {
            return 0;
        };
        let outcomes = preloader.wait(timeout);
        if outcomes.iter().any(|outcome| outcome.result.is_ok()) {
            self.needs_layout = true;
        }
        outcomes.len()
    }

    /// Computes the visible set for the current state without side effects.
    pub fn visible_set(&self) -> VisibleSet {
        let layout = ColumnLayout::new(
            &self.config,
            &self.portfolio,
            &self.dimensions,
            &self.measurements,
        );
        compute_visible_set(
            &layout,
            self.tracker.state(),
            self.tracker.viewport_size(),
            self.config.buffer,
        )
    }

    /// Computes the visible set, clears [`needs_layout`](Self::needs_layout)
    /// and starts loading the cover image of every cell still on an
    /// estimated height.
    pub fn layout(&mut self) -> VisibleSet {
        let visible = self.visible_set();
        self.needs_layout = false;
        if let Some(preloader) = self.preloader.as_mut() {
            let dispatched = visible
                .cells
                .iter()
                .filter(|cell| cell.height_source == HeightSource::Estimated)
                .filter_map(|cell| cell.item.cover_image())
                .filter(|url| preloader.request(url))
                .count();
            if dispatched > 0 {
                debug!(dispatched, "requested image dimensions for visible cells");
            }
        }
        visible
    }

    fn drain_preloads(&mut self) -> bool {
        let Some(preloader) = self.preloader.as_mut() else {
            return false;
        };
        preloader
            .poll()
            .iter()
            .any(|outcome| outcome.result.is_ok())
    }

    fn invalidate(&mut self) {
        if !self.needs_layout {
            self.needs_layout = true;
            self.scheduler.request_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use mosaic_ui::ManualFrameClock;

    use super::*;
    use crate::{
        dimensions::{ImageSize, StaticDimensionLoader},
        item::PortfolioItem,
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn canvas() -> (MasonryCanvas, Arc<ManualFrameClock>) {
        let clock = Arc::new(ManualFrameClock::new());
        let loader = StaticDimensionLoader::new().with("/uploads/solo.jpg", ImageSize::new(480, 600));
        let mut canvas = MasonryCanvas::new(
            CanvasConfig::default(),
            clock.clone(),
            Arc::new(DimensionCache::new()),
        )
        .with_loader(Arc::new(loader));
        canvas.set_items(Portfolio::new([PortfolioItem::new("solo", ["/uploads/solo.jpg"])]));
        canvas.resize(PxSize::new(Px(1000), Px(800)));
        (canvas, clock)
    }

    #[test]
    fn late_dimensions_replace_estimates() {
        let (mut canvas, _clock) = canvas();
        let first = canvas.layout();
        assert!(!canvas.needs_layout());
        assert!(first.cells.iter().all(|c| c.height_source == HeightSource::Estimated));
        assert_eq!(canvas.pending_preloads(), 1);

        assert_eq!(canvas.wait_for_preloads(WAIT), 1);
        assert!(canvas.needs_layout());
        let second = canvas.layout();
        let cell = second.find(&CellId::new("solo", 0, 0)).expect("origin cell");
        assert_eq!(cell.height, Px(300));
        assert_eq!(cell.height_source, HeightSource::AspectRatio);
        let next = second.find(&CellId::new("solo", 0, 1)).expect("second cell");
        assert_eq!(next.y, Px(348));
    }

    #[test]
    fn drag_applies_on_next_frame() {
        let (mut canvas, clock) = canvas();
        canvas.layout();
        canvas.handle_event(&CursorEvent::pressed(PxPosition::new(Px(500), Px(400))));
        canvas.handle_event(&CursorEvent::moved(PxPosition::new(Px(400), Px(400))));
        assert_eq!(canvas.viewport().offset_x, Px::ZERO);
        assert!(clock.advance().is_some());
        assert!(canvas.on_frame());
        assert_eq!(canvas.viewport().offset_x, Px(-100));
    }

    #[test]
    fn height_change_requests_layout_once() {
        let (mut canvas, clock) = canvas();
        canvas.layout();
        clock.advance();
        let id = CellId::new("solo", 0, 0);
        assert!(canvas.on_height_change(&id, Px(410)));
        assert!(!canvas.on_height_change(&id, Px(410)));
        assert!(canvas.needs_layout());
        assert!(clock.advance().is_some());

        let visible = canvas.layout();
        let cell = visible.find(&id).expect("measured cell");
        assert_eq!(cell.height, Px(410));
        assert_eq!(cell.height_source, HeightSource::Measured);
    }

    #[test]
    fn resize_and_jump_request_a_frame() {
        // No loader, so no background completion can request a frame.
        let clock = Arc::new(ManualFrameClock::new());
        let mut canvas = MasonryCanvas::new(
            CanvasConfig::default(),
            clock.clone(),
            Arc::new(DimensionCache::new()),
        );
        canvas.set_items(Portfolio::new([PortfolioItem::new("solo", ["/uploads/solo.jpg"])]));
        canvas.resize(PxSize::new(Px(1000), Px(800)));
        canvas.layout();
        while clock.advance().is_some() {}

        assert!(canvas.resize(PxSize::new(Px(500), Px(500))));
        assert!(canvas.needs_layout());
        assert!(clock.is_requested());
        assert_eq!(canvas.layout().bounds.width, Px(900));

        while clock.advance().is_some() {}
        assert!(!canvas.resize(PxSize::new(Px(500), Px(500))));
        assert!(!clock.is_requested());

        canvas.set_offset(PxPosition::new(Px(-2000), Px(0)));
        assert!(canvas.needs_layout());
        assert!(clock.is_requested());
        assert_eq!(canvas.layout().bounds.x, Px(1800));
    }

    #[test]
    fn replacing_items_drops_measurements() {
        let (mut canvas, _clock) = canvas();
        canvas.on_height_change(&CellId::new("solo", 0, 0), Px(50));
        canvas.set_items(Portfolio::default());
        assert!(canvas.measurements().is_empty());
        assert!(canvas.layout().is_empty());
    }
}
