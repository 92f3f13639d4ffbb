//! URL-keyed sticker image cache.
//!
//! Each URL is requested from the loader at most once and decoded at most
//! once; every decoration that references the URL reuses the slot. There is
//! no eviction and no invalidation: URLs are treated as immutable content
//! references, and the sticker catalog is bounded.
//!
//! A failed load is remembered as failed, so the fallback circle is drawn on
//! every subsequent frame instead of flickering between retries.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

use std::collections::HashMap;

use tracing::{debug, warn};

/// State of one cached URL.
#[derive(Debug, Clone)]
pub enum ImageSlot<I> {
    Pending,
    Ready(I),
    Failed,
}

/// What a paint call should do with a sticker URL right now.
#[derive(Debug)]
pub enum ImageLookup<'a, I> {
    Ready(&'a I),
    Pending,
    Failed,
}

/// Cache of decoded images of type `I` (the surface's image handle).
#[derive(Debug)]
pub struct ImageCache<I> {
    slots: HashMap<String, ImageSlot<I>>,
    requests: Vec<String>,
    resolved: Vec<String>,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self { slots: HashMap::new(), requests: Vec::new(), resolved: Vec::new() }
    }
}

impl<I> ImageCache<I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `url`, queueing a load request the first time it is seen.
    pub fn lookup(&mut self, url: &str) -> ImageLookup<'_, I> {
        if !self.slots.contains_key(url) {
            debug!(url = short_url(url), "image load requested");
            self.slots.insert(url.to_owned(), ImageSlot::Pending);
            self.requests.push(url.to_owned());
        }
        match self.slots.get(url) {
            Some(ImageSlot::Ready(img)) => ImageLookup::Ready(img),
            Some(ImageSlot::Failed) => ImageLookup::Failed,
            Some(ImageSlot::Pending) | None => ImageLookup::Pending,
        }
    }

    /// Store a decoded image for `url`.
    pub fn resolve(&mut self, url: &str, image: I) {
        self.slots.insert(url.to_owned(), ImageSlot::Ready(image));
        self.resolved.push(url.to_owned());
    }

    /// Record that `url` could not be loaded; stickers fall back to their color.
    pub fn fail(&mut self, url: &str, reason: &str) {
        warn!(url = short_url(url), reason, "sticker image failed to load; using fallback");
        self.slots.insert(url.to_owned(), ImageSlot::Failed);
        self.resolved.push(url.to_owned());
    }

    /// URLs the host still has to start loading.
    pub fn take_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests)
    }

    /// URLs that finished (either way) since the last call.
    pub fn take_resolved(&mut self) -> Vec<String> {
        std::mem::take(&mut self.resolved)
    }

    /// Whether any resolution is waiting to be repainted.
    #[must_use]
    pub fn has_resolved(&self) -> bool {
        !self.resolved.is_empty()
    }

    #[must_use]
    pub fn slot(&self, url: &str) -> Option<&ImageSlot<I>> {
        self.slots.get(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Data URIs are long; keep log lines readable.
fn short_url(url: &str) -> &str {
    match url.char_indices().nth(64) {
        Some((idx, _)) => &url[..idx],
        None => url,
    }
}
