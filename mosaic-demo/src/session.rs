use std::{sync::Arc, time::Duration};

use mosaic_canvas::{HeightSource, MasonryCanvas, VisibleSet};
use mosaic_ui::{
    CursorEvent, CursorEventContent, ManualFrameClock, Px, PxPosition, PxSize,
    ScrollEventContent, ScrollUnit,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::script::Step;

/// Drives a canvas the way a host would, with a hand-cranked frame clock.
pub struct Session {
    canvas: MasonryCanvas,
    clock: Arc<ManualFrameClock>,
    preload_timeout: Duration,
    last: VisibleSet,
}

impl Session {
    pub fn new(canvas: MasonryCanvas, clock: Arc<ManualFrameClock>, preload_timeout: Duration) -> Self {
        Self {
            canvas,
            clock,
            preload_timeout,
            last: VisibleSet::default(),
        }
    }

    /// Lays out until nothing is pending: no frame requested and no image
    /// size still loading.
    pub fn settle(&mut self) -> &VisibleSet {
        self.last = self.frame();
        while self.canvas.pending_preloads() > 0 {
            if self.canvas.wait_for_preloads(self.preload_timeout) == 0 {
                warn!(
                    pending = self.canvas.pending_preloads(),
                    "gave up waiting for image sizes"
                );
                break;
            }
            self.last = self.frame();
        }
        &self.last
    }

    pub fn apply(&mut self, step: &Step) {
        match *step {
            Step::Drag { dx, dy, moves } => self.drag(dx, dy, moves.max(1)),
            Step::Wheel { dx, dy, lines } => {
                let unit = if lines { ScrollUnit::Lines } else { ScrollUnit::Pixels };
                self.canvas.handle_event(&CursorEvent {
                    content: CursorEventContent::Scroll(ScrollEventContent {
                        delta_x: dx,
                        delta_y: dy,
                        unit,
                    }),
                });
            }
            Step::Resize { width, height } => {
                self.canvas.resize(PxSize::new(Px(width), Px(height)));
            }
            Step::ReportHeight {
                column,
                ordinal,
                height,
            } => {
                let Some(id) = self
                    .last
                    .cells
                    .iter()
                    .find(|cell| cell.column() == column && cell.ordinal() == ordinal)
                    .map(|cell| cell.id.clone())
                else {
                    warn!(column, ordinal, "no visible cell to report a height for");
                    return;
                };
                if self.canvas.on_height_change(&id, Px(height)) {
                    info!(cell = %id, height, "reported rendered height");
                }
            }
        }
    }

    pub fn report(&self, step: usize) -> StepReport {
        let visible = &self.last;
        let viewport = self.canvas.viewport();
        let count = |source: HeightSource| {
            visible
                .cells
                .iter()
                .filter(|cell| cell.height_source == source)
                .count()
        };
        StepReport {
            step,
            offset: viewport.offset(),
            columns: visible
                .columns
                .as_ref()
                .map(|range| [*range.start(), *range.end()]),
            cells: visible.len(),
            measured: count(HeightSource::Measured),
            aspect_ratio: count(HeightSource::AspectRatio),
            estimated: count(HeightSource::Estimated),
            truncated: visible.truncated,
            frames: self.clock.current_frame(),
            visible: visible
                .cells
                .iter()
                .map(|cell| CellReport {
                    id: cell.unique_id(),
                    title: cell.item.title.clone(),
                    screen: cell.screen_position(&viewport),
                    height: cell.height,
                })
                .collect(),
        }
    }

    fn drag(&mut self, dx: i32, dy: i32, moves: u32) {
        let size = self.canvas.viewport_size();
        let start = PxPosition::new(size.width / 2, size.height / 2);
        self.canvas.handle_event(&CursorEvent::pressed(start));
        let moves = moves as i32;
        for i in 1..=moves {
            let along = start.saturating_offset(Px(dx / moves * i), Px(dy / moves * i));
            self.canvas.handle_event(&CursorEvent::moved(along));
        }
        // Integer steps may fall short; the last move lands exactly.
        self.canvas
            .handle_event(&CursorEvent::moved(start.saturating_offset(Px(dx), Px(dy))));
        self.canvas.handle_event(&CursorEvent::released());
    }

    fn frame(&mut self) -> VisibleSet {
        while self.clock.advance().is_some() {
            self.canvas.on_frame();
        }
        self.canvas.layout()
    }
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub offset: PxPosition,
    pub columns: Option<[i32; 2]>,
    pub cells: usize,
    pub measured: usize,
    pub aspect_ratio: usize,
    pub estimated: usize,
    pub truncated: bool,
    pub frames: u64,
    pub visible: Vec<CellReport>,
}

#[derive(Debug, Serialize)]
pub struct CellReport {
    pub id: String,
    pub title: String,
    pub screen: PxPosition,
    pub height: Px,
}

#[cfg(test)]
mod tests {
    use mosaic_canvas::{
        CanvasConfig, DimensionCache, ImageSize, Portfolio, PortfolioItem, StaticDimensionLoader,
    };

    use super::*;

    fn session() -> Session {
        let clock = Arc::new(ManualFrameClock::new());
        let loader = StaticDimensionLoader::new().with("/uploads/a.jpg", ImageSize::new(240, 120));
        let mut canvas = MasonryCanvas::new(
            CanvasConfig::default(),
            clock.clone(),
            Arc::new(DimensionCache::new()),
        )
        .with_loader(Arc::new(loader));
        canvas.set_items(Portfolio::new([PortfolioItem::new("a", ["/uploads/a.jpg"])]));
        canvas.resize(PxSize::new(Px(1000), Px(800)));
        Session::new(canvas, clock, Duration::from_secs(5))
    }

    #[test]
    fn settle_applies_loaded_sizes() {
        let mut session = session();
        session.settle();
        let report = session.report(0);
        assert_eq!(report.estimated, 0);
        assert_eq!(report.aspect_ratio, report.cells);
        assert!(report.visible.iter().all(|cell| cell.height == Px(120)));
    }

    #[test]
    fn drag_lands_on_exact_offset() {
        let mut session = session();
        let shows = |report: &StepReport, id: &str| report.visible.iter().any(|cell| cell.id == id);
        session.settle();
        assert!(!shows(&session.report(0), "a--4-0"));
        session.apply(&Step::Drag {
            dx: 1001,
            dy: -7,
            moves: 3,
        });
        session.settle();
        let report = session.report(1);
        assert_eq!(report.offset, PxPosition::new(Px(1001), Px(-7)));
        assert!(shows(&report, "a--4-0"));
    }

    #[test]
    fn reported_height_is_measured() {
        let mut session = session();
        session.settle();
        session.apply(&Step::ReportHeight {
            column: 0,
            ordinal: 0,
            height: 300,
        });
        session.settle();
        assert_eq!(session.report(1).measured, 1);
    }
}
