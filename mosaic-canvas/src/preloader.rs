//! Background image dimension loading.
//!
//! Loads run on the rayon pool. Results come back over a channel and are only
//! written into the [`DimensionCache`] when the owner drains them with
//! [`ImagePreloader::poll`], so every cache write a canvas observes happens on
//! its own thread between frames.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use mosaic_ui::FrameScheduler;
use rustc_hash::FxHashSet as HashSet;
use tracing::{debug, warn};

use crate::{
    dimensions::{DimensionCache, DimensionLoader, ImageSize, validate},
    error::DimensionError,
};

/// The result of one background load.
#[derive(Debug)]
pub struct PreloadOutcome {
    /// URL that was loaded.
    pub url: String,
    /// Loaded size, or why it could not be determined.
    pub result: Result<ImageSize, DimensionError>,
}

/// Dispatches dimension loads and collects their results.
///
/// - A URL already cached or already in flight is not dispatched again.
/// - A URL that failed is not retried automatically; call
///   [`retry`](Self::retry) to try again.
/// - Dropping the preloader marks it dead. Loads that have not started yet are
///   skipped and finished ones are discarded, so nothing reaches the cache
///   after the owner is gone.
pub struct ImagePreloader {
    cache: Arc<DimensionCache>,
    loader: Arc<dyn DimensionLoader>,
    scheduler: Option<Arc<dyn FrameScheduler>>,
    pool: Option<Arc<rayon::ThreadPool>>,
    in_flight: HashSet<String>,
    failed: HashSet<String>,
    sender: mpsc::Sender<PreloadOutcome>,
    receiver: mpsc::Receiver<PreloadOutcome>,
    alive: Arc<AtomicBool>,
}

impl ImagePreloader {
    /// Creates a preloader writing into `cache`.
    pub fn new(cache: Arc<DimensionCache>, loader: Arc<dyn DimensionLoader>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            cache,
            loader,
            scheduler: None,
            pool: None,
            in_flight: HashSet::default(),
            failed: HashSet::default(),
            sender,
            receiver,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Requests a frame from `scheduler` whenever a load completes, so the
    /// owner gets a chance to [`poll`](Self::poll).
    pub fn with_scheduler(mut self, scheduler: Arc<dyn FrameScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Runs loads on `pool` instead of the global rayon pool.
    pub fn with_pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// The cache results are written into.
    pub fn cache(&self) -> &Arc<DimensionCache> {
        &self.cache
    }

    /// Number of loads dispatched but not yet polled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether `url` failed and is waiting for an explicit retry.
    pub fn has_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    /// Starts loading `url` in the background.
    ///
    /// Returns `true` if a load was dispatched.
    pub fn request(&mut self, url: &str) -> bool {
        if self.cache.contains(url) || self.in_flight.contains(url) || self.failed.contains(url) {
            return false;
        }
        self.in_flight.insert(url.to_owned());
        debug!(%url, "dispatching dimension load");

        let url = url.to_owned();
        let loader = self.loader.clone();
        let sender = self.sender.clone();
        let alive = self.alive.clone();
        let scheduler = self.scheduler.clone();
        let job = move || {
            if !alive.load(Ordering::Acquire) {
                return;
            }
            let result = loader
                .load_dimensions(&url)
                .and_then(|size| validate(&url, size));
            if !alive.load(Ordering::Acquire) {
                debug!(%url, "discarding dimension load for dropped preloader");
                return;
            }
            if sender.send(PreloadOutcome { url, result }).is_ok()
                && let Some(scheduler) = scheduler
            {
                scheduler.request_frame();
            }
        };
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
        true
    }

    /// Clears a previous failure for `url` and dispatches it again.
    pub fn retry(&mut self, url: &str) -> bool {
        self.failed.remove(url);
        self.request(url)
    }

    /// Applies every finished load to the cache and returns the outcomes.
    pub fn poll(&mut self) -> Vec<PreloadOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            self.apply(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Like [`poll`](Self::poll), but blocks until nothing is in flight or
    /// `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Vec<PreloadOutcome> {
        let deadline = Instant::now() + timeout;
        let mut outcomes = self.poll();
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply(&outcome);
                    outcomes.push(outcome);
                }
                Err(_) => break,
            }
        }
        outcomes
    }

    fn apply(&mut self, outcome: &PreloadOutcome) {
        self.in_flight.remove(&outcome.url);
        match &outcome.result {
            Ok(size) => {
                self.cache.insert(outcome.url.clone(), *size);
            }
            Err(err) => {
                warn!(url = %outcome.url, "image size unavailable, keeping estimated height: {err}");
                self.failed.insert(outcome.url.clone());
            }
        }
    }
}

impl Drop for ImagePreloader {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
