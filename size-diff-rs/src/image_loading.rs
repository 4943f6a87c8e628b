//! Character image loading with a shared, size-bounded cache.
//!
//! Concurrent requests for the same path share one load. Failed loads are not
//! cached, so a later request retries. Decoded images are evicted least
//! recently used first once the cache exceeds its byte budget.

use crate::character::Character;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, error, info, warn};
use size_diff_canvas2d::CanvasImage;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::task;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageLoadError {
    #[error("failed to read image {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("timed out after {millis}ms loading image {path}")]
    Timeout { path: String, millis: u128 },

    #[error("image path {path} is outside the asset root {root}")]
    AccessDenied { path: String, root: String },

    #[error("image load task for {path} failed: {reason}")]
    Task { path: String, reason: String },

    #[error("{reason}; placeholder {placeholder} also failed: {placeholder_reason}")]
    Unresolved {
        path: String,
        reason: String,
        placeholder: String,
        placeholder_reason: String,
    },
}

impl ImageLoadError {
    /// The path that was requested.
    pub fn path(&self) -> &str {
        match self {
            ImageLoadError::Io { path, .. }
            | ImageLoadError::Decode { path, .. }
            | ImageLoadError::Timeout { path, .. }
            | ImageLoadError::AccessDenied { path, .. }
            | ImageLoadError::Task { path, .. }
            | ImageLoadError::Unresolved { path, .. } => path,
        }
    }
}

/// Where image bytes come from.
pub trait ImageSource: Send + Sync {
    fn load(&self, path: &Path) -> BoxFuture<'static, Result<CanvasImage, ImageLoadError>>;
}

/// Reads images from the local filesystem and decodes them off the async runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn load(&self, path: &Path) -> BoxFuture<'static, Result<CanvasImage, ImageLoadError>> {
        let path = path.to_path_buf();
        async move {
            let display = path.display().to_string();
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| ImageLoadError::Io {
                    path: display.clone(),
                    reason: e.to_string(),
                })?;
            let task_path = display.clone();
            task::spawn_blocking(move || decode_image(&task_path, &bytes))
                .await
                .map_err(|e| ImageLoadError::Task {
                    path: display,
                    reason: e.to_string(),
                })?
        }
        .boxed()
    }
}

/// Decode PNG or JPEG bytes into a drawable image.
pub fn decode_image(path: &str, bytes: &[u8]) -> Result<CanvasImage, ImageLoadError> {
    let decode_error = |reason: String| ImageLoadError::Decode {
        path: path.to_string(),
        reason,
    };
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| decode_error(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    CanvasImage::from_rgba8(width, height, rgba.into_raw()).map_err(|e| decode_error(e.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageProviderConfig {
    /// Directory that image names are resolved against.
    pub root: PathBuf,
    /// Image used when a character's own image cannot be loaded.
    pub placeholder: String,
    /// Decoded bytes kept in memory before evicting.
    pub cache_budget_bytes: usize,
    /// Limit on a single load, including decoding.
    pub load_timeout: Duration,
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("species_data"),
            placeholder: "missing.png".to_string(),
            cache_budget_bytes: 256 * 1024 * 1024,
            load_timeout: Duration::from_secs(30),
        }
    }
}

/// An image and the path it was actually loaded from.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub image: Arc<CanvasImage>,
    pub path: PathBuf,
    /// The placeholder stands in for the requested image.
    pub fallback: bool,
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<CanvasImage>, ImageLoadError>>>;

enum CacheEntry {
    /// An in-flight load, tagged with the tick it started at.
    Pending { id: u64, load: SharedLoad },
    Ready { image: Arc<CanvasImage>, last_used: u64 },
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PathBuf, CacheEntry>,
    tick: u64,
    total_bytes: usize,
}

impl CacheState {
    fn evict_to_budget(&mut self, budget: usize, keep: &Path) {
        while self.total_bytes > budget {
            let oldest = self
                .entries
                .iter()
                .filter(|(path, _)| path.as_path() != keep)
                .filter_map(|(path, entry)| match entry {
                    CacheEntry::Ready { last_used, .. } => Some((*last_used, path.clone())),
                    CacheEntry::Pending { .. } => None,
                })
                .min();
            let Some((_, path)) = oldest else {
                break;
            };
            if let Some(CacheEntry::Ready { image, .. }) = self.entries.remove(&path) {
                self.total_bytes -= image.byte_len();
                debug!("evicted {} from image cache", path.display());
            }
        }
    }
}

pub struct ImageProvider {
    source: Arc<dyn ImageSource>,
    config: ImageProviderConfig,
    cache: Mutex<CacheState>,
}

impl ImageProvider {
    /// Provider reading from the filesystem.
    pub fn new(config: ImageProviderConfig) -> Self {
        Self::with_source(config, Arc::new(FsImageSource))
    }

    pub fn with_source(config: ImageProviderConfig, source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            config,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &ImageProviderConfig {
        &self.config
    }

    /// Full path for an image name, rejecting names that escape the root.
    pub fn asset_path(&self, image: &str) -> Result<PathBuf, ImageLoadError> {
        let relative = Path::new(image);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if image.is_empty() || escapes {
            return Err(ImageLoadError::AccessDenied {
                path: image.to_string(),
                root: self.config.root.display().to_string(),
            });
        }
        Ok(self.config.root.join(relative))
    }

    /// Full path of a character's image.
    pub fn asset_path_for(&self, character: &Character) -> Result<PathBuf, ImageLoadError> {
        self.asset_path(&character.image)
    }

    pub fn placeholder_path(&self) -> PathBuf {
        self.config.root.join(&self.config.placeholder)
    }

    /// Bytes held by decoded images in the cache.
    pub fn cached_bytes(&self) -> usize {
        self.lock().total_bytes
    }

    pub fn clear_cache(&self) {
        let mut cache = self.lock();
        cache.entries.retain(|_, entry| matches!(entry, CacheEntry::Pending { .. }));
        cache.total_bytes = 0;
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load an image, sharing in-flight and cached results.
    pub async fn get(&self, path: &Path) -> Result<Arc<CanvasImage>, ImageLoadError> {
        let (id, load) = {
            let mut cache = self.lock();
            cache.tick += 1;
            let tick = cache.tick;
            match cache.entries.get_mut(path) {
                Some(CacheEntry::Ready { image, last_used }) => {
                    *last_used = tick;
                    debug!("image cache hit for {}", path.display());
                    return Ok(image.clone());
                }
                Some(CacheEntry::Pending { id, load }) => (*id, load.clone()),
                None => {
                    let load = self.start_load(path);
                    cache.entries.insert(
                        path.to_path_buf(),
                        CacheEntry::Pending {
                            id: tick,
                            load: load.clone(),
                        },
                    );
                    (tick, load)
                }
            }
        };

        let result = load.await;
        self.settle(path, id, &result);
        result
    }

    fn start_load(&self, path: &Path) -> SharedLoad {
        let source = self.source.clone();
        let owned = path.to_path_buf();
        let timeout = self.config.load_timeout;
        async move {
            match tokio::time::timeout(timeout, source.load(&owned)).await {
                Ok(result) => result.map(Arc::new),
                Err(_) => Err(ImageLoadError::Timeout {
                    path: owned.display().to_string(),
                    millis: timeout.as_millis(),
                }),
            }
        }
        .boxed()
        .shared()
    }

    /// Record the outcome of load `id`. Only the waiter that finds its own load
    /// still pending updates the entry; later loads of the same path are left alone.
    fn settle(&self, path: &Path, id: u64, result: &Result<Arc<CanvasImage>, ImageLoadError>) {
        let mut cache = self.lock();
        match cache.entries.get(path) {
            Some(CacheEntry::Pending { id: pending, .. }) if *pending == id => {}
            _ => return,
        }
        match result {
            Ok(image) => {
                cache.tick += 1;
                let last_used = cache.tick;
                cache.total_bytes += image.byte_len();
                cache.entries.insert(
                    path.to_path_buf(),
                    CacheEntry::Ready {
                        image: image.clone(),
                        last_used,
                    },
                );
                let budget = self.config.cache_budget_bytes;
                cache.evict_to_budget(budget, path);
            }
            Err(_) => {
                cache.entries.remove(path);
            }
        }
    }

    /// Load `path`, falling back once to the placeholder image.
    pub async fn resolve(&self, path: &Path) -> Result<ResolvedImage, ImageLoadError> {
        info!("Resolving image: {}", path.display());
        let err = match self.get(path).await {
            Ok(image) => {
                return Ok(ResolvedImage {
                    image,
                    path: path.to_path_buf(),
                    fallback: false,
                })
            }
            Err(err) => err,
        };

        let placeholder = self.placeholder_path();
        if placeholder == path {
            error!("Failed to load placeholder image: {}", err);
            return Err(err);
        }
        warn!(
            "Failed to load image {}: {}. Using placeholder {}",
            path.display(),
            err,
            placeholder.display()
        );

        match self.get(&placeholder).await {
            Ok(image) => Ok(ResolvedImage {
                image,
                path: placeholder,
                fallback: true,
            }),
            Err(placeholder_err) => {
                error!(
                    "Failed to load image {} and placeholder {}: {}",
                    path.display(),
                    placeholder.display(),
                    placeholder_err
                );
                Err(ImageLoadError::Unresolved {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                    placeholder: placeholder.display().to_string(),
                    placeholder_reason: placeholder_err.to_string(),
                })
            }
        }
    }

    /// Resolve every distinct path concurrently.
    pub async fn prefetch<I>(&self, paths: I) -> HashMap<PathBuf, Result<ResolvedImage, ImageLoadError>>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut seen = HashSet::new();
        let distinct: Vec<PathBuf> = paths
            .into_iter()
            .filter(|path| seen.insert(path.clone()))
            .collect();
        debug!("prefetching {} distinct images", distinct.len());

        let results =
            futures::future::join_all(distinct.iter().map(|path| self.resolve(path))).await;
        distinct.into_iter().zip(results).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        sizes: HashMap<PathBuf, (u32, u32)>,
        calls: AtomicUsize,
        delay: Duration,
        hang: Option<PathBuf>,
    }

    impl FakeSource {
        fn new(entries: &[(&str, (u32, u32))]) -> Self {
            Self {
                sizes: entries
                    .iter()
                    .map(|(name, size)| (Path::new("root").join(name), *size))
                    .collect(),
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(10),
                hang: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageSource for FakeSource {
        fn load(&self, path: &Path) -> BoxFuture<'static, Result<CanvasImage, ImageLoadError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let found = self.sizes.get(path).copied();
            let hang = self.hang.as_deref() == Some(path);
            let delay = self.delay;
            let display = path.display().to_string();
            async move {
                if hang {
                    futures::future::pending::<()>().await;
                }
                tokio::time::sleep(delay).await;
                match found {
                    Some((w, h)) => Ok(CanvasImage::from_rgba8(w, h, vec![255; (w * h * 4) as usize]).unwrap()),
                    None => Err(ImageLoadError::Io {
                        path: display,
                        reason: "not found".to_string(),
                    }),
                }
            }
            .boxed()
        }
    }

    fn provider(source: Arc<FakeSource>) -> ImageProvider {
        let config = ImageProviderConfig {
            root: PathBuf::from("root"),
            ..ImageProviderConfig::default()
        };
        ImageProvider::with_source(config, source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_share_one_load() {
        let source = Arc::new(FakeSource::new(&[("a.png", (2, 2))]));
        let provider = provider(source.clone());
        let path = provider.asset_path("a.png").unwrap();

        let (first, second) = tokio::join!(provider.get(&path), provider.get(&path));
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(source.calls(), 1);

        provider.get(&path).await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(provider.cached_bytes(), 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let source = Arc::new(FakeSource::new(&[]));
        let provider = provider(source.clone());
        let path = provider.asset_path("gone.png").unwrap();

        assert!(provider.get(&path).await.is_err());
        assert!(provider.get(&path).await.is_err());
        assert_eq!(source.calls(), 2);
        assert_eq!(provider.cached_bytes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_waiter_keeps_newer_load() {
        let source = Arc::new(FakeSource::new(&[]));
        let provider = provider(source.clone());
        let path = provider.asset_path("flaky.png").unwrap();

        // Two waiters on the first load, which fails
        let mut first = Box::pin(provider.get(&path));
        let mut second = Box::pin(provider.get(&path));
        assert!(futures::poll!(&mut first).is_pending());
        assert!(futures::poll!(&mut second).is_pending());
        assert_eq!(source.calls(), 1);
        assert!(first.await.is_err());

        // A retry starts a second load
        let mut retry = Box::pin(provider.get(&path));
        assert!(futures::poll!(&mut retry).is_pending());
        assert_eq!(source.calls(), 2);

        // The slow waiter of the first load settles late
        assert!(second.await.is_err());

        let mut joiner = Box::pin(provider.get(&path));
        assert!(futures::poll!(&mut joiner).is_pending());
        assert_eq!(source.calls(), 2);

        assert!(retry.await.is_err());
        assert!(joiner.await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_image_falls_back_to_placeholder() {
        let source = Arc::new(FakeSource::new(&[("missing.png", (3, 1))]));
        let provider = provider(source.clone());
        let path = provider.asset_path("wolf_male.png").unwrap();

        let resolved = provider.resolve(&path).await.unwrap();
        assert!(resolved.fallback);
        assert_eq!(resolved.path, PathBuf::from("root/missing.png"));
        assert_eq!(resolved.image.width(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_placeholder_is_an_error() {
        let source = Arc::new(FakeSource::new(&[]));
        let provider = provider(source);
        let path = provider.asset_path("wolf_male.png").unwrap();

        let err = provider.resolve(&path).await.unwrap_err();
        assert!(matches!(err, ImageLoadError::Unresolved { .. }));
        assert_eq!(err.path(), Path::new("root/wolf_male.png").display().to_string());

        // The placeholder itself is not retried
        let placeholder = provider.placeholder_path();
        let err = provider.resolve(&placeholder).await.unwrap_err();
        assert!(matches!(err, ImageLoadError::Io { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_least_recently_used_is_evicted() {
        let source = Arc::new(FakeSource::new(&[
            ("a.png", (2, 2)),
            ("b.png", (2, 2)),
            ("c.png", (2, 2)),
        ]));
        let config = ImageProviderConfig {
            root: PathBuf::from("root"),
            cache_budget_bytes: 32,
            ..ImageProviderConfig::default()
        };
        let provider = ImageProvider::with_source(config, source.clone());
        let a = provider.asset_path("a.png").unwrap();
        let b = provider.asset_path("b.png").unwrap();
        let c = provider.asset_path("c.png").unwrap();

        provider.get(&a).await.unwrap();
        provider.get(&b).await.unwrap();
        provider.get(&a).await.unwrap();
        provider.get(&c).await.unwrap();
        assert_eq!(source.calls(), 3);
        assert_eq!(provider.cached_bytes(), 32);

        // b was least recently used
        provider.get(&a).await.unwrap();
        assert_eq!(source.calls(), 3);
        provider.get(&b).await.unwrap();
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout() {
        let mut fake = FakeSource::new(&[("slow.png", (1, 1))]);
        fake.hang = Some(PathBuf::from("root/slow.png"));
        let source = Arc::new(fake);
        let config = ImageProviderConfig {
            root: PathBuf::from("root"),
            load_timeout: Duration::from_secs(1),
            ..ImageProviderConfig::default()
        };
        let provider = ImageProvider::with_source(config, source);
        let path = provider.asset_path("slow.png").unwrap();

        let err = provider.get(&path).await.unwrap_err();
        assert!(matches!(err, ImageLoadError::Timeout { millis: 1000, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_dedupes_paths() {
        let source = Arc::new(FakeSource::new(&[("a.png", (1, 1)), ("missing.png", (1, 1))]));
        let provider = provider(source.clone());
        let a = provider.asset_path("a.png").unwrap();
        let b = provider.asset_path("b.png").unwrap();

        let results = provider.prefetch(vec![a.clone(), b.clone(), a.clone()]).await;
        assert_eq!(results.len(), 2);
        assert!(!results[&a].as_ref().unwrap().fallback);
        assert!(results[&b].as_ref().unwrap().fallback);
        // a, b, and the placeholder
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn test_asset_path_stays_under_root() {
        let provider = ImageProvider::new(ImageProviderConfig::default());
        assert_eq!(
            provider.asset_path("fox_female.png").unwrap(),
            PathBuf::from("species_data/fox_female.png")
        );
        for bad in ["../secret.png", "/etc/passwd", "a/../../b.png", ""] {
            assert!(
                matches!(provider.asset_path(bad), Err(ImageLoadError::AccessDenied { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_fs_source_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let decoded = FsImageSource.load(&path).await.unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(&decoded.to_rgba8()[0..4], &[10, 20, 30, 255]);
    }

    #[tokio::test]
    async fn test_fs_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FsImageSource.load(&dir.path().join("nope.png")).await;
        assert!(matches!(missing, Err(ImageLoadError::Io { .. })));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not an image").unwrap();
        let err = FsImageSource.load(&corrupt).await;
        assert!(matches!(err, Err(ImageLoadError::Decode { .. })));
    }
}
