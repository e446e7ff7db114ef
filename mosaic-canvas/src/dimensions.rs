//! Natural image sizes, keyed by URL.
//!
//! The cache is filled as images finish loading and read synchronously during
//! layout. Entries are written once per URL and never evicted; the set of
//! distinct images in a portfolio is small.

use std::path::{Component, Path, PathBuf};

use mosaic_ui::Px;
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, trace};

use crate::error::DimensionError;

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height when scaled proportionally to `target_width`, rounded to the
    /// nearest pixel. `None` for a zero-width image.
    ///
    /// ```
    /// use mosaic_canvas::ImageSize;
    /// use mosaic_ui::Px;
    ///
    /// assert_eq!(ImageSize::new(800, 1200).height_for_width(Px(240)), Some(Px(360)));
    /// assert_eq!(ImageSize::new(0, 10).height_for_width(Px(240)), None);
    /// ```
    pub fn height_for_width(&self, target_width: Px) -> Option<Px> {
        if self.width == 0 {
            return None;
        }
        let width = i64::from(self.width);
        let scaled = i64::from(target_width.raw()) * i64::from(self.height);
        // Round half away from zero.
        let rounded = if scaled >= 0 {
            (scaled * 2 + width) / (width * 2)
        } else {
            (scaled * 2 - width) / (width * 2)
        };
        Some(Px::saturating_from_i64(rounded))
    }
}

/// Resolves an image URL to its natural size.
///
/// Implementations block; [`ImagePreloader`] runs them off the UI thread.
///
/// [`ImagePreloader`]: crate::ImagePreloader
pub trait DimensionLoader: Send + Sync {
    /// Loads the size of the image at `url`.
    fn load_dimensions(&self, url: &str) -> Result<ImageSize, DimensionError>;
}

/// Shared URL → size map.
///
/// This is an explicit object rather than a process-wide global so that two
/// canvases, or two tests, never observe each other's entries unless they are
/// handed the same `Arc<DimensionCache>`.
#[derive(Debug, Default)]
pub struct DimensionCache {
    entries: RwLock<HashMap<String, ImageSize>>,
}

impl DimensionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached size for `url`, if any.
    pub fn get(&self, url: &str) -> Option<ImageSize> {
        self.entries.read().get(url).copied()
    }

    /// Whether `url` has a cached size.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.read().contains_key(url)
    }

    /// Number of cached URLs.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Records the size of `url`.
    ///
    /// The first write wins; returns `false` if the URL was already cached.
    pub fn insert(&self, url: impl Into<String>, size: ImageSize) -> bool {
        let url = url.into();
        let mut entries = self.entries.write();
        if entries.contains_key(&url) {
            return false;
        }
        trace!(%url, width = size.width, height = size.height, "cached image size");
        entries.insert(url, size);
        true
    }

    /// Scaled height of `url` at `target_width`, or `None` when the size is not
    /// known yet.
    pub fn height_for_width(&self, url: &str, target_width: Px) -> Option<Px> {
        self.get(url)
            .and_then(|size| size.height_for_width(target_width))
    }

    /// Returns the cached size of `url`, loading and caching it first if
    /// needed.
    ///
    /// A failed load is returned to the caller and leaves no entry behind, so
    /// a later call tries again.
    pub fn preload(
        &self,
        url: &str,
        loader: &dyn DimensionLoader,
    ) -> Result<ImageSize, DimensionError> {
        if let Some(size) = self.get(url) {
            return Ok(size);
        }
        let size = validate(url, loader.load_dimensions(url)?)?;
        self.insert(url, size);
        Ok(size)
    }
}

pub(crate) fn validate(url: &str, size: ImageSize) -> Result<ImageSize, DimensionError> {
    if size.width == 0 || size.height == 0 {
        return Err(DimensionError::EmptyImage(url.to_owned()));
    }
    Ok(size)
}

/// Reads image headers from a local uploads directory.
///
/// Uploaded files are served under a URL path that mirrors their location on
/// disk, e.g. `/uploads/life/team.jpg` lives at `<root>/uploads/life/team.jpg`.
/// Query strings and fragments are ignored. Absolute URLs with a scheme and
/// paths escaping the root are rejected.
#[derive(Debug, Clone)]
pub struct FsDimensionLoader {
    root: PathBuf,
}

impl FsDimensionLoader {
    /// Creates a loader resolving URL paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory URL paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a URL path to a file below the root.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, DimensionError> {
        if url.contains("://") {
            return Err(DimensionError::UnsupportedUrl(url.to_owned()));
        }
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');
        if path.is_empty() {
            return Err(DimensionError::UnsupportedUrl(url.to_owned()));
        }

        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(DimensionError::UnsupportedUrl(url.to_owned())),
            }
        }
        Ok(resolved)
    }
}

impl DimensionLoader for FsDimensionLoader {
    fn load_dimensions(&self, url: &str) -> Result<ImageSize, DimensionError> {
        let path = self.resolve(url)?;
        debug!(%url, path = %path.display(), "reading image header");
        match image::image_dimensions(&path) {
            Ok((width, height)) => Ok(ImageSize { width, height }),
            Err(image::ImageError::IoError(source)) => Err(DimensionError::Io {
                url: url.to_owned(),
                source,
            }),
            Err(source) => Err(DimensionError::Decode {
                url: url.to_owned(),
                source,
            }),
        }
    }
}

/// Serves sizes from a fixed table. Unknown URLs fail with
/// [`DimensionError::UnsupportedUrl`].
#[derive(Debug, Clone, Default)]
pub struct StaticDimensionLoader {
    sizes: HashMap<String, ImageSize>,
}

impl StaticDimensionLoader {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn with(mut self, url: impl Into<String>, size: ImageSize) -> Self {
        self.sizes.insert(url.into(), size);
        self
    }
}

impl DimensionLoader for StaticDimensionLoader {
    fn load_dimensions(&self, url: &str) -> Result<ImageSize, DimensionError> {
        self.sizes
            .get(url)
            .copied()
            .ok_or_else(|| DimensionError::UnsupportedUrl(url.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingLoader {
        calls: AtomicUsize,
        fail: bool,
    }

    impl DimensionLoader for CountingLoader {
        fn load_dimensions(&self, url: &str) -> Result<ImageSize, DimensionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DimensionError::UnsupportedUrl(url.to_owned()))
            } else {
                Ok(ImageSize::new(400, 300))
            }
        }
    }

    #[test]
    fn height_for_width_is_none_until_cached() {
        let cache = DimensionCache::new();
        assert_eq!(cache.height_for_width("/uploads/a.jpg", Px(240)), None);
        cache.insert("/uploads/a.jpg", ImageSize::new(400, 300));
        assert_eq!(cache.height_for_width("/uploads/a.jpg", Px(240)), Some(Px(180)));
    }

    #[test]
    fn first_insert_wins() {
        let cache = DimensionCache::new();
        assert!(cache.insert("u", ImageSize::new(1, 2)));
        assert!(!cache.insert("u", ImageSize::new(3, 4)));
        assert_eq!(cache.get("u"), Some(ImageSize::new(1, 2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn preload_hits_cache_after_first_load() {
        let cache = DimensionCache::new();
        let loader = CountingLoader {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        assert_eq!(cache.preload("u", &loader).ok(), Some(ImageSize::new(400, 300)));
        assert_eq!(cache.preload("u", &loader).ok(), Some(ImageSize::new(400, 300)));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_preload_is_not_cached_and_can_retry() {
        let cache = DimensionCache::new();
        let loader = CountingLoader {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        assert!(cache.preload("u", &loader).is_err());
        assert!(cache.preload("u", &loader).is_err());
        assert!(!cache.contains("u"));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_area_images_are_rejected() {
        let cache = DimensionCache::new();
        let loader = StaticDimensionLoader::new().with("flat", ImageSize::new(10, 0));
        assert!(matches!(
            cache.preload("flat", &loader),
            Err(DimensionError::EmptyImage(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn fs_loader_resolves_url_paths_under_root() {
        let loader = FsDimensionLoader::new("/srv/site");
        let path = loader.resolve("/uploads/life/team.jpg?v=3");
        assert_eq!(path.ok(), Some(PathBuf::from("/srv/site/uploads/life/team.jpg")));
    }

    #[test]
    fn fs_loader_rejects_escapes_and_absolute_urls() {
        let loader = FsDimensionLoader::new("/srv/site");
        assert!(loader.resolve("/uploads/../../etc/passwd").is_err());
        assert!(loader.resolve("https://cdn.example.com/a.jpg").is_err());
        assert!(loader.resolve("/").is_err());
    }

    #[test]
    fn fs_loader_reads_png_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploads = dir.path().join("uploads");
        std::fs::create_dir_all(&uploads).expect("create uploads");
        image::RgbaImage::new(6, 4)
            .save(uploads.join("tile.png"))
            .expect("write png");

        let loader = FsDimensionLoader::new(dir.path());
        let size = loader.load_dimensions("/uploads/tile.png").expect("load");
        assert_eq!(size, ImageSize::new(6, 4));
        assert!(matches!(
            loader.load_dimensions("/uploads/missing.png"),
            Err(DimensionError::Io { .. })
        ));
    }
}
