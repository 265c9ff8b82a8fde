//! Dataset lifecycle: initial load, periodic refresh and hot-swap.
//!
//! The live repository sits behind a `watch` channel. A refresh builds a new
//! repository off to the side and replaces the live one only when the load
//! succeeded, so readers keep the previous dataset through any failure.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::UpstreamSource;
use crate::data::filter::{self, FilterParams};
use crate::data::search::{self, SearchResult};
use crate::data::{
    Artist, ArtistRepository, Catalog, EnrichmentMode, LoadError, NotFoundError, ValidationError,
};
use crate::geocode::{CoordinateCache, Coordinates, PrefetchStats};
use crate::utils::fmt_duration;

/// Differences between the replaced dataset and its successor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    /// Locations queued for geocoding.
    pub new_locations: usize,
}

impl RefreshSummary {
    fn between(old: &Catalog, new: &Catalog) -> Self {
        let mut summary = RefreshSummary::default();
        for artist in new.artists() {
            match old.get(artist.id) {
                None => summary.added += 1,
                Some(previous) if previous.as_ref() == artist.as_ref() => summary.unchanged += 1,
                Some(_) => summary.updated += 1,
            }
        }
        summary.removed = old
            .artists()
            .iter()
            .filter(|artist| new.get(artist.id).is_none())
            .count();
        summary
    }
}

/// Clears the singleflight flag even if the refresh future is dropped.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the live dataset and the coordinate cache. Handlers only read.
pub struct DataStore {
    source: Arc<dyn UpstreamSource>,
    mode: EnrichmentMode,
    repository: watch::Sender<Arc<ArtistRepository>>,
    coordinates: Arc<CoordinateCache>,
    ready: AtomicBool,
    refreshing: AtomicBool,
    cancel: CancellationToken,
}

impl DataStore {
    pub fn new(
        source: Arc<dyn UpstreamSource>,
        coordinates: Arc<CoordinateCache>,
        mode: EnrichmentMode,
        cancel: CancellationToken,
    ) -> Self {
        let (repository, _) = watch::channel(Arc::new(ArtistRepository::new()));
        Self {
            source,
            mode,
            repository,
            coordinates,
            ready: AtomicBool::new(false),
            refreshing: AtomicBool::new(false),
            cancel,
        }
    }

    /// First load. On success the store is ready and every known location is
    /// queued for geocoding in the background.
    pub async fn initialize(&self) -> Result<JoinHandle<PrefetchStats>, LoadError> {
        let start = Instant::now();
        let repository = self.build_repository().await?;
        let locations = repository.get_unique_locations();
        self.swap_data(repository);
        self.ready.store(true, Ordering::Release);

        info!(
            artists = self.snapshot().len(),
            locations = locations.len(),
            duration = fmt_duration(start.elapsed()),
            "Data store initialized"
        );
        Ok(self.prefetch(locations))
    }

    /// Load a fresh dataset and swap it in.
    ///
    /// Returns `Ok(None)` when another refresh is already in flight. On error
    /// the live dataset is left untouched.
    pub async fn refresh(&self) -> Result<Option<RefreshSummary>, LoadError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in progress, skipping");
            return Ok(None);
        }
        let _guard = RefreshGuard(&self.refreshing);

        let repository = self.build_repository().await?;
        let previous = self.swap_data(repository);
        self.ready.store(true, Ordering::Release);

        let current = self.snapshot();
        let mut summary = RefreshSummary::between(&previous.snapshot(), &current);

        let delta: Vec<String> = current
            .unique_locations()
            .iter()
            .filter(|location| !self.coordinates.has(location))
            .cloned()
            .collect();
        summary.new_locations = delta.len();
        if !delta.is_empty() {
            self.prefetch(delta);
        }

        Ok(Some(summary))
    }

    async fn build_repository(&self) -> Result<ArtistRepository, LoadError> {
        let index = self.source.api_index().await.map_err(LoadError::Index)?;
        let repository = ArtistRepository::new();
        repository.load_data(&self.source, &index, self.mode).await?;
        Ok(repository)
    }

    /// Publish `repository` and return the one it replaced. Readers holding the
    /// old repository keep a complete view of it.
    pub fn swap_data(&self, repository: ArtistRepository) -> Arc<ArtistRepository> {
        self.repository.send_replace(Arc::new(repository))
    }

    fn prefetch(&self, locations: Vec<String>) -> JoinHandle<PrefetchStats> {
        self.coordinates
            .prefetch_locations(locations, self.cancel.child_token())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn repository(&self) -> Arc<ArtistRepository> {
        Arc::clone(&self.repository.borrow())
    }

    /// A consistent view of the current dataset.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.repository.borrow().snapshot()
    }

    pub fn coordinates(&self) -> &Arc<CoordinateCache> {
        &self.coordinates
    }

    pub fn artist(&self, id: i32) -> Result<Arc<Artist>, NotFoundError> {
        self.repository().get_artist_by_id(id)
    }

    pub fn filter(&self, params: &FilterParams) -> Result<Vec<Arc<Artist>>, ValidationError> {
        params.validate()?;
        Ok(filter::filter_catalog(&self.snapshot(), params))
    }

    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        search::search(self.snapshot().artists(), query)
    }

    /// Coordinates of every location the artist played, in listing order.
    /// Locations that fail to geocode are left out.
    pub async fn artist_coordinates(&self, id: i32) -> Result<Vec<Coordinates>, NotFoundError> {
        let artist = self.artist(id)?;
        let mut seen = HashSet::new();
        let mut coordinates = Vec::with_capacity(artist.locations.len());
        for location in &artist.locations {
            if !seen.insert(location.as_str()) {
                continue;
            }
            match self.coordinates.get(location).await {
                Ok(found) => coordinates.push(found),
                Err(e) => warn!(artist_id = id, location = %location, error = %e, "Skipping location"),
            }
        }
        Ok(coordinates)
    }

    /// Refresh every `interval` until cancelled. Failures are logged and the
    /// previous dataset keeps serving.
    pub fn spawn_refresh_task(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial load already ran
            ticker.tick().await;
            info!(interval = fmt_duration(interval), "Refresh task started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let start = Instant::now();
                let result = tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = store.refresh() => result,
                };
                match result {
                    Ok(Some(summary)) => info!(
                        added = summary.added,
                        updated = summary.updated,
                        unchanged = summary.unchanged,
                        removed = summary.removed,
                        new_locations = summary.new_locations,
                        duration = fmt_duration(start.elapsed()),
                        "Data refreshed"
                    ),
                    Ok(None) => {}
                    Err(e) => error!(
                        error = ?e,
                        duration = fmt_duration(start.elapsed()),
                        "Refresh failed, keeping previous data"
                    ),
                }
            }

            info!("Refresh task stopped");
        })
    }
}
