//! Bitmap cache and the caching resource decorator.
//!
//! [`BitmapCache`] is an LRU map from [`CacheKey`] (content hash plus device
//! pixel size) to rendered bitmaps. It is injected where needed as a
//! [`SharedBitmapCache`]; several clock faces may share one instance, in which
//! case its capacity should cover all of them.
//!
//! [`CachedResource`] rasterizes its inner resource once per key and blits the
//! stored bitmap on every later draw.

use std::{cell::RefCell, fmt, num::NonZeroUsize, rc::Rc};

use log::{debug, warn};
use lru::LruCache;

use crate::{
    draw::{Painter, Pixmap, device_extent},
    error::RenderError,
    geometry::{Rect, Transform},
    hash::ContentHash,
    resource::{Resource, ResourceRef},
};

/// Identifies one rendered bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    content: ContentHash,
    width: u32,
    height: u32,
}

impl CacheKey {
    pub fn new(content: ContentHash, width: u32, height: u32) -> Self {
        Self {
            content,
            width,
            height,
        }
    }

    pub fn content(&self) -> ContentHash {
        self.content
    }

    /// Bitmap width in device pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Bitmap height in device pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Lookup and render counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    renders: u64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Off-screen renders performed on behalf of the cache
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

/// Capacity-bounded map of rendered bitmaps.
///
/// A capacity of zero disables caching: lookups always miss and inserts are
/// dropped.
pub struct BitmapCache {
    entries: Option<LruCache<CacheKey, Rc<Pixmap>>>,
    stats: CacheStats,
}

/// Cache handle shared between resources of one or more clock faces.
pub type SharedBitmapCache = Rc<RefCell<BitmapCache>>;

impl BitmapCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            stats: CacheStats::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Creates a cache wrapped for sharing.
    pub fn shared(capacity: usize) -> SharedBitmapCache {
        Rc::new(RefCell::new(Self::new(capacity)))
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.cap().get())
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a bitmap, marking it as most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<Rc<Pixmap>> {
        let found = self
            .entries
            .as_mut()
            .and_then(|entries| entries.get(key).cloned());
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.contains(key))
    }

    pub fn insert(&mut self, key: CacheKey, bitmap: Rc<Pixmap>) {
        if let Some(entries) = self.entries.as_mut() {
            entries.put(key, bitmap);
        }
    }

    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn record_render(&mut self) {
        self.stats.renders += 1;
    }
}

impl fmt::Debug for BitmapCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Draws its inner resource through the bitmap cache.
///
/// The bitmap is rasterized at the painter's axis scales and blitted with the
/// rest of the current transform, so rotations and translations never force a
/// new render. Resources with an invalid key, or an empty rect, are drawn
/// directly.
#[derive(Debug, Clone)]
pub struct CachedResource {
    inner: ResourceRef,
    cache: SharedBitmapCache,
}

impl CachedResource {
    pub fn new(inner: ResourceRef, cache: SharedBitmapCache) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &ResourceRef {
        &self.inner
    }

    fn render(
        &self,
        rect: Rect,
        key: CacheKey,
        scale: (f32, f32),
        device_pixel_ratio: f32,
    ) -> Result<Rc<Pixmap>, RenderError> {
        let (sx, sy) = scale;
        let transform =
            Transform::translation(-rect.x(), -rect.y()).then(Transform::scale(sx, sy));
        let mut offscreen =
            Painter::with_transform(key.width(), key.height(), transform, device_pixel_ratio)?;
        // The cache is not borrowed here: the inner resource may hold cached
        // children of its own.
        self.inner.draw(&mut offscreen);
        Ok(Rc::new(offscreen.into_pixmap()))
    }
}

impl Resource for CachedResource {
    fn rect(&self) -> Rect {
        self.inner.rect()
    }

    fn advance_x(&self) -> f32 {
        self.inner.advance_x()
    }

    fn advance_y(&self) -> f32 {
        self.inner.advance_y()
    }

    fn cache_key(&self) -> ContentHash {
        self.inner.cache_key()
    }

    fn draw(&self, painter: &mut Painter) {
        let content = self.inner.cache_key();
        let rect = self.inner.rect();
        let (sx, sy) = painter.transform().axis_scales();
        let cacheable = content.is_valid()
            && !rect.is_empty()
            && sx > 0.0
            && sy > 0.0
            && self.cache.borrow().is_enabled();
        if !cacheable {
            self.inner.draw(painter);
            return;
        }

        let key = CacheKey::new(
            content,
            device_extent(rect.width() * sx),
            device_extent(rect.height() * sy),
        );
        let cached = self.cache.borrow_mut().get(&key);
        let bitmap = match cached {
            Some(bitmap) => bitmap,
            None => {
                debug!(
                    content = key.content().raw(),
                    width = key.width(),
                    height = key.height();
                    "Bitmap cache miss"
                );
                match self.render(rect, key, (sx, sy), painter.device_pixel_ratio()) {
                    Ok(bitmap) => {
                        let mut cache = self.cache.borrow_mut();
                        cache.record_render();
                        cache.insert(key, bitmap.clone());
                        bitmap
                    }
                    Err(err) => {
                        warn!(err:%; "Cannot render cached bitmap, drawing directly");
                        self.inner.draw(painter);
                        return;
                    }
                }
            }
        };

        let blit = Transform::scale(1.0 / sx, 1.0 / sy)
            .then(Transform::translation(rect.x(), rect.y()));
        painter.draw_pixmap(&bitmap, blit);
    }
}
