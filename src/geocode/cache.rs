use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Coordinates, GeocodeError, Geocoder};
use crate::utils::fmt_duration;

/// Outcome of one prefetch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchStats {
    pub fetched: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Thread-safe location → coordinates cache.
///
/// Every upstream lookup, on-demand or prefetch, passes through one shared
/// rate limiter. Entries are never replaced once cached.
pub struct CoordinateCache {
    entries: DashMap<String, Coordinates>,
    geocoder: Arc<dyn Geocoder>,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl CoordinateCache {
    /// `min_interval` is the minimum spacing between upstream requests. Zero
    /// disables spacing.
    pub fn new(geocoder: Arc<dyn Geocoder>, min_interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            geocoder,
            limiter: Quota::with_period(min_interval).map(RateLimiter::direct),
        }
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Cached coordinates, fetching and caching them on a miss.
    ///
    /// A not-found or malformed result is returned as an error and not cached.
    pub async fn get(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        if let Some(hit) = self.cached(location) {
            return Ok(hit);
        }
        self.throttle().await;
        // Another caller may have filled it while we waited
        if let Some(hit) = self.cached(location) {
            return Ok(hit);
        }
        self.fetch(location).await
    }

    async fn fetch(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        let coordinates = self.geocoder.geocode(location).await?;
        Ok(self
            .entries
            .entry(location.to_string())
            .or_insert(coordinates)
            .clone())
    }

    pub fn cached(&self, location: &str) -> Option<Coordinates> {
        self.entries.get(location).map(|entry| entry.clone())
    }

    pub fn has(&self, location: &str) -> bool {
        self.entries.contains_key(location)
    }

    pub fn cache_size(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Copy entries from `other` that this cache lacks. Existing entries are
    /// kept as they are. Returns the number imported.
    pub fn import_from(&self, other: &CoordinateCache) -> usize {
        if std::ptr::eq(self, other) {
            return 0;
        }
        let mut imported = 0;
        for entry in other.entries.iter() {
            if !self.has(entry.key()) {
                self.entries
                    .entry(entry.key().clone())
                    .or_insert_with(|| entry.value().clone());
                imported += 1;
            }
        }
        imported
    }

    /// Geocode `locations` in the background, one rate-limited request at a
    /// time. Failures are logged and skipped.
    pub fn prefetch_locations(
        self: &Arc<Self>,
        locations: Vec<String>,
        cancel: CancellationToken,
    ) -> JoinHandle<PrefetchStats> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let start = Instant::now();
            let total = locations.len();
            let mut stats = PrefetchStats::default();
            debug!(total, "Coordinate prefetch started");

            for location in locations {
                if cache.has(&location) {
                    stats.skipped += 1;
                    continue;
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        stats.cancelled = true;
                        break;
                    }
                    _ = cache.throttle() => {}
                }
                if cache.has(&location) {
                    stats.skipped += 1;
                    continue;
                }
                match cache.fetch(&location).await {
                    Ok(_) => stats.fetched += 1,
                    Err(e) => {
                        stats.failed += 1;
                        warn!(location = %location, error = %e, "Failed to geocode location");
                    }
                }
            }

            info!(
                total,
                fetched = stats.fetched,
                skipped = stats.skipped,
                failed = stats.failed,
                cancelled = stats.cancelled,
                cached = cache.cache_size(),
                duration = fmt_duration(start.elapsed()),
                "Coordinate prefetch finished"
            );
            stats
        })
    }
}
