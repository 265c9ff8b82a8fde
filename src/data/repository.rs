//! Artist repository: loads the upstream dataset and serves indexed reads.
//!
//! A load builds a complete [`Catalog`] off to the side and publishes it with
//! a single pointer swap, so readers see either the previous catalog or the
//! new one, never a mix.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::api::{ApiIndex, FetchError, RawArtist, UpstreamSource};
use crate::data::artist::Artist;
use crate::data::errors::{LoadError, NotFoundError, ValidationError};
use crate::data::filter::YearRange;
use crate::utils::fmt_duration;

/// Lower bound used for year filters when the dataset has no usable years.
pub const DEFAULT_MIN_YEAR: i32 = 1950;

/// How enrichment data is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentMode {
    /// Three requests per artist, all artists concurrently.
    #[default]
    PerArtist,
    /// Three bulk requests, joined to artists by id.
    Bulk,
}

/// Immutable, fully indexed view of one load.
///
/// Index values are positions into `artists`, kept ascending so any union of
/// buckets can be restored to dataset order by sorting.
#[derive(Debug, Default)]
pub struct Catalog {
    artists: Vec<Arc<Artist>>,
    by_id: HashMap<i32, usize>,
    by_location: HashMap<String, Vec<usize>>,
    by_state: HashMap<String, Vec<usize>>,
    by_member_count: HashMap<usize, Vec<usize>>,
    by_creation_year: HashMap<i32, Vec<usize>>,
    by_album_year: HashMap<i32, Vec<usize>>,
    unique_locations: Vec<String>,
    min_creation_year: Option<i32>,
    min_album_year: Option<i32>,
    loaded_at: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Index a dataset. Artists keep the order given.
    pub fn build(artists: Vec<Artist>) -> Self {
        let mut catalog = Catalog {
            artists: Vec::with_capacity(artists.len()),
            loaded_at: Some(Utc::now()),
            ..Default::default()
        };
        let mut unique: BTreeSet<String> = BTreeSet::new();

        for (pos, artist) in artists.into_iter().enumerate() {
            catalog.by_id.insert(artist.id, pos);

            for location in artist.distinct_locations() {
                unique.insert(location.to_string());
                catalog
                    .by_location
                    .entry(location.to_lowercase())
                    .or_default()
                    .push(pos);
            }
            for state in artist.location_states.keys() {
                catalog
                    .by_state
                    .entry(state.to_lowercase())
                    .or_default()
                    .push(pos);
            }

            catalog
                .by_member_count
                .entry(artist.member_bucket())
                .or_default()
                .push(pos);

            catalog
                .by_creation_year
                .entry(artist.creation_date)
                .or_default()
                .push(pos);
            catalog.min_creation_year = Some(
                catalog
                    .min_creation_year
                    .map_or(artist.creation_date, |m| m.min(artist.creation_date)),
            );

            if let Some(year) = artist.first_album_year() {
                catalog.by_album_year.entry(year).or_default().push(pos);
                catalog.min_album_year =
                    Some(catalog.min_album_year.map_or(year, |m| m.min(year)));
            }

            catalog.artists.push(Arc::new(artist));
        }

        catalog.unique_locations = unique.into_iter().collect();
        catalog
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// All artists in upstream order.
    pub fn artists(&self) -> &[Arc<Artist>] {
        &self.artists
    }

    pub fn get(&self, id: i32) -> Option<&Arc<Artist>> {
        self.by_id.get(&id).map(|&pos| &self.artists[pos])
    }

    /// Sorted, deduplicated formatted locations.
    pub fn unique_locations(&self) -> &[String] {
        &self.unique_locations
    }

    /// `(creation, first album)` minimums, falling back to [`DEFAULT_MIN_YEAR`].
    pub fn min_years(&self) -> (i32, i32) {
        (
            self.min_creation_year.unwrap_or(DEFAULT_MIN_YEAR),
            self.min_album_year.unwrap_or(DEFAULT_MIN_YEAR),
        )
    }

    pub fn by_location(&self, location: &str) -> Vec<Arc<Artist>> {
        self.resolve(self.location_positions(location))
    }

    pub fn by_state(&self, state: &str) -> Vec<Arc<Artist>> {
        self.resolve(self.state_positions(state))
    }

    /// `count` is clamped into the same buckets used by [`Artist::member_bucket`].
    pub fn by_member_count(&self, count: usize) -> Vec<Arc<Artist>> {
        self.resolve(self.member_positions(count))
    }

    pub fn by_creation_year(&self, year: i32) -> Vec<Arc<Artist>> {
        self.resolve(self.by_creation_year.get(&year).map_or(&[][..], Vec::as_slice))
    }

    pub fn by_album_year(&self, year: i32) -> Vec<Arc<Artist>> {
        self.resolve(self.by_album_year.get(&year).map_or(&[][..], Vec::as_slice))
    }

    pub(crate) fn location_positions(&self, location: &str) -> &[usize] {
        self.by_location
            .get(&location.trim().to_lowercase())
            .map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn state_positions(&self, state: &str) -> &[usize] {
        self.by_state
            .get(&state.trim().to_lowercase())
            .map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn member_positions(&self, count: usize) -> &[usize] {
        let bucket = count.min(crate::data::artist::MAX_MEMBER_BUCKET);
        self.by_member_count
            .get(&bucket)
            .map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn creation_positions(&self, range: YearRange) -> Vec<usize> {
        Self::range_positions(&self.by_creation_year, range)
    }

    pub(crate) fn album_positions(&self, range: YearRange) -> Vec<usize> {
        Self::range_positions(&self.by_album_year, range)
    }

    fn range_positions(index: &HashMap<i32, Vec<usize>>, range: YearRange) -> Vec<usize> {
        index
            .iter()
            .filter(|(year, _)| range.contains(**year))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect()
    }

    pub(crate) fn resolve(&self, positions: &[usize]) -> Vec<Arc<Artist>> {
        positions
            .iter()
            .filter_map(|&pos| self.artists.get(pos).cloned())
            .collect()
    }
}

/// Holder of the current catalog.
#[derive(Debug, Default)]
pub struct ArtistRepository {
    catalog: RwLock<Arc<Catalog>>,
}

impl ArtistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository serving a prebuilt dataset.
    pub fn with_artists(artists: Vec<Artist>) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(Catalog::build(artists))),
        }
    }

    /// Fetch every artist, enrich it, index the result and publish it.
    ///
    /// Any failure leaves the current catalog untouched.
    pub async fn load_data(
        &self,
        source: &Arc<dyn UpstreamSource>,
        index: &ApiIndex,
        mode: EnrichmentMode,
    ) -> Result<(), LoadError> {
        let start = Instant::now();
        index.validate()?;

        let raws = source
            .artists(&index.artists)
            .await
            .map_err(|source| LoadError::Resource {
                resource: "artists",
                source,
            })?;
        validate_artists(&raws)?;
        debug!(count = raws.len(), ?mode, "Fetched artist list");

        let artists = match mode {
            EnrichmentMode::PerArtist => enrich_per_artist(source, raws).await?,
            EnrichmentMode::Bulk => enrich_bulk(source, index, raws).await?,
        };

        let catalog = Arc::new(Catalog::build(artists));
        let (artist_count, location_count) = (catalog.len(), catalog.unique_locations().len());
        self.publish(catalog);

        info!(
            artists = artist_count,
            locations = location_count,
            duration = fmt_duration(start.elapsed()),
            "Artist data loaded"
        );
        Ok(())
    }

    fn publish(&self, catalog: Arc<Catalog>) {
        // A poisoned lock still holds a complete catalog; replace it anyway.
        let mut guard = self.catalog.write().unwrap_or_else(|e| e.into_inner());
        *guard = catalog;
    }

    /// The catalog at this instant. Holding it keeps a consistent view across
    /// several reads.
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.catalog.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn get_artist_by_id(&self, id: i32) -> Result<Arc<Artist>, NotFoundError> {
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| NotFoundError::artist(id))
    }

    pub fn get_all_artists(&self) -> Vec<Arc<Artist>> {
        self.snapshot().artists().to_vec()
    }

    pub fn get_artists_by_location(&self, location: &str) -> Vec<Arc<Artist>> {
        self.snapshot().by_location(location)
    }

    pub fn get_artists_by_member_count(&self, count: usize) -> Vec<Arc<Artist>> {
        self.snapshot().by_member_count(count)
    }

    pub fn get_artists_by_creation_year(&self, year: i32) -> Vec<Arc<Artist>> {
        self.snapshot().by_creation_year(year)
    }

    pub fn get_artists_by_album_year(&self, year: i32) -> Vec<Arc<Artist>> {
        self.snapshot().by_album_year(year)
    }

    pub fn get_unique_locations(&self) -> Vec<String> {
        self.snapshot().unique_locations().to_vec()
    }

    pub fn get_min_years(&self) -> (i32, i32) {
        self.snapshot().min_years()
    }
}

fn validate_artists(raws: &[RawArtist]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(raws.len());
    for raw in raws {
        raw.validate()?;
        if !seen.insert(raw.id) {
            return Err(ValidationError::DuplicateArtist(raw.id));
        }
    }
    Ok(())
}

/// One task per artist, each issuing its three fetches concurrently. The
/// first failure ends the load; dropping the set aborts the remaining tasks.
async fn enrich_per_artist(
    source: &Arc<dyn UpstreamSource>,
    raws: Vec<RawArtist>,
) -> Result<Vec<Artist>, LoadError> {
    let mut slots: Vec<Option<Artist>> = (0..raws.len()).map(|_| None).collect();
    let mut tasks = JoinSet::new();

    for (pos, raw) in raws.into_iter().enumerate() {
        let source = Arc::clone(source);
        tasks.spawn(async move {
            let id = raw.id;
            let artist_error = |resource: &'static str| {
                move |source: FetchError| LoadError::Artist {
                    artist_id: id,
                    resource,
                    source,
                }
            };
            let (locations, dates, relations) = tokio::try_join!(
                async {
                    source
                        .locations(&raw.locations)
                        .await
                        .map_err(artist_error("locations"))
                },
                async {
                    source
                        .dates(&raw.concert_dates)
                        .await
                        .map_err(artist_error("dates"))
                },
                async {
                    source
                        .relations(&raw.relations)
                        .await
                        .map_err(artist_error("relations"))
                },
            )?;
            let artist = Artist::enrich(
                raw,
                &locations.locations,
                &dates.dates,
                &relations.dates_locations,
            );
            Ok::<_, LoadError>((pos, artist))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (pos, artist) = joined??;
        slots[pos] = Some(artist);
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Three bulk requests, matched to artists by id. Artists absent from a bulk
/// resource get empty enrichment.
async fn enrich_bulk(
    source: &Arc<dyn UpstreamSource>,
    index: &ApiIndex,
    raws: Vec<RawArtist>,
) -> Result<Vec<Artist>, LoadError> {
    let resource_error = |resource: &'static str| {
        move |source: FetchError| LoadError::Resource { resource, source }
    };
    let (locations, dates, relations) = tokio::try_join!(
        async {
            source
                .location_index(&index.locations)
                .await
                .map_err(resource_error("locations"))
        },
        async {
            source
                .date_index(&index.dates)
                .await
                .map_err(resource_error("dates"))
        },
        async {
            source
                .relation_index(&index.relation)
                .await
                .map_err(resource_error("relation"))
        },
    )?;

    let mut locations: HashMap<i32, Vec<String>> =
        locations.into_iter().map(|r| (r.id, r.locations)).collect();
    let mut dates: HashMap<i32, Vec<String>> = dates.into_iter().map(|r| (r.id, r.dates)).collect();
    let mut relations: HashMap<i32, _> = relations
        .into_iter()
        .map(|r| (r.id, r.dates_locations))
        .collect();

    Ok(raws
        .into_iter()
        .map(|raw| {
            let id = raw.id;
            Artist::enrich(
                raw,
                &locations.remove(&id).unwrap_or_default(),
                &dates.remove(&id).unwrap_or_default(),
                &relations.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}
