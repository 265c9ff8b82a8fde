//! In-memory upstream and geocoder used by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use groupie_tracker::api::{
    ApiIndex, DateRecord, FetchError, LocationRecord, RawArtist, RelationRecord, UpstreamSource,
};
use groupie_tracker::data::EnrichmentMode;
use groupie_tracker::geocode::{CoordinateCache, Coordinates, GeocodeError, Geocoder};
use groupie_tracker::store::DataStore;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

/// One upstream artist with its raw enrichment data.
#[derive(Clone)]
pub struct Fixture {
    pub id: i32,
    pub name: &'static str,
    pub members: &'static [&'static str],
    pub creation_date: i32,
    pub first_album: &'static str,
    /// Raw upstream form, e.g. `"los_angeles-usa"`.
    pub locations: &'static [&'static str],
}

impl Fixture {
    fn raw(&self) -> RawArtist {
        RawArtist {
            id: self.id,
            image: format!("https://img.example/{}.jpeg", self.id),
            name: self.name.to_string(),
            members: self.members.iter().map(|m| m.to_string()).collect(),
            creation_date: self.creation_date,
            first_album: self.first_album.to_string(),
            locations: format!("mem://locations/{}", self.id),
            concert_dates: format!("mem://dates/{}", self.id),
            relations: format!("mem://relation/{}", self.id),
        }
    }

    fn dates(&self) -> Vec<String> {
        (0..self.locations.len())
            .map(|i| format!("*{:02}-06-2019", i + 1))
            .collect()
    }

    fn relations(&self) -> IndexMap<String, Vec<String>> {
        self.locations
            .iter()
            .zip(self.dates())
            .map(|(location, date)| (location.to_string(), vec![date.trim_start_matches('*').to_string()]))
            .collect()
    }
}

pub fn queen() -> Fixture {
    Fixture {
        id: 1,
        name: "Queen",
        members: &["Freddie Mercury", "Brian May", "Roger Taylor", "John Deacon"],
        creation_date: 1970,
        first_album: "14-12-1973",
        locations: &["london-uk", "los_angeles-usa"],
    }
}

pub fn gorillaz() -> Fixture {
    Fixture {
        id: 2,
        name: "Gorillaz",
        members: &["Damon Albarn", "Jamie Hewlett"],
        creation_date: 1998,
        first_album: "26-03-2001",
        locations: &["seattle-usa", "los_angeles-usa"],
    }
}

pub fn pink_floyd() -> Fixture {
    Fixture {
        id: 7,
        name: "Pink Floyd",
        members: &["Syd Barrett", "Nick Mason", "Roger Waters", "Richard Wright", "David Gilmour"],
        creation_date: 1965,
        first_album: "05-08-1967",
        locations: &["paris-france"],
    }
}

/// Upstream whose dataset and failures can be changed between loads.
pub struct FakeUpstream {
    fixtures: Mutex<Vec<Fixture>>,
    failing_relations: Mutex<Option<i32>>,
    failing_index: Mutex<bool>,
    pub requests: AtomicUsize,
}

impl FakeUpstream {
    pub fn new(fixtures: Vec<Fixture>) -> Arc<Self> {
        Arc::new(Self {
            fixtures: Mutex::new(fixtures),
            failing_relations: Mutex::new(None),
            failing_index: Mutex::new(false),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn set_fixtures(&self, fixtures: Vec<Fixture>) {
        *self.fixtures.lock().unwrap() = fixtures;
    }

    pub fn fail_relations_for(&self, id: Option<i32>) {
        *self.failing_relations.lock().unwrap() = id;
    }

    pub fn fail_index(&self, fail: bool) {
        *self.failing_index.lock().unwrap() = fail;
    }

    fn fixture(&self, url: &str) -> Result<Fixture, FetchError> {
        let id: i32 = url
            .rsplit('/')
            .next()
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| not_found(url))?;
        self.fixtures
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| not_found(url))
    }

    fn all(&self) -> Vec<Fixture> {
        self.fixtures.lock().unwrap().clone()
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn not_found(url: &str) -> FetchError {
    FetchError::BadStatus {
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn api_index(&self) -> Result<ApiIndex, FetchError> {
        self.hit();
        if *self.failing_index.lock().unwrap() {
            return Err(FetchError::BadStatus {
                url: "mem://api".into(),
                status: 503,
            });
        }
        Ok(ApiIndex {
            artists: "mem://artists".into(),
            locations: "mem://locations".into(),
            dates: "mem://dates".into(),
            relation: "mem://relation".into(),
        })
    }

    async fn artists(&self, _url: &str) -> Result<Vec<RawArtist>, FetchError> {
        self.hit();
        Ok(self.all().iter().map(Fixture::raw).collect())
    }

    async fn locations(&self, url: &str) -> Result<LocationRecord, FetchError> {
        self.hit();
        let fixture = self.fixture(url)?;
        Ok(LocationRecord {
            id: fixture.id,
            locations: fixture.locations.iter().map(|l| l.to_string()).collect(),
        })
    }

    async fn dates(&self, url: &str) -> Result<DateRecord, FetchError> {
        self.hit();
        let fixture = self.fixture(url)?;
        Ok(DateRecord {
            id: fixture.id,
            dates: fixture.dates(),
        })
    }

    async fn relations(&self, url: &str) -> Result<RelationRecord, FetchError> {
        self.hit();
        let fixture = self.fixture(url)?;
        if *self.failing_relations.lock().unwrap() == Some(fixture.id) {
            // Slow enough that sibling fetches are still running
            tokio::time::sleep(Duration::from_millis(5)).await;
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(RelationRecord {
            id: fixture.id,
            dates_locations: fixture.relations(),
        })
    }

    async fn location_index(&self, _url: &str) -> Result<Vec<LocationRecord>, FetchError> {
        self.hit();
        Ok(self
            .all()
            .iter()
            .map(|f| LocationRecord {
                id: f.id,
                locations: f.locations.iter().map(|l| l.to_string()).collect(),
            })
            .collect())
    }

    async fn date_index(&self, _url: &str) -> Result<Vec<DateRecord>, FetchError> {
        self.hit();
        Ok(self
            .all()
            .iter()
            .map(|f| DateRecord {
                id: f.id,
                dates: f.dates(),
            })
            .collect())
    }

    async fn relation_index(&self, _url: &str) -> Result<Vec<RelationRecord>, FetchError> {
        self.hit();
        Ok(self
            .all()
            .iter()
            .map(|f| RelationRecord {
                id: f.id,
                dates_locations: f.relations(),
            })
            .collect())
    }
}

/// Geocoder that resolves every location except those containing "Nowhere".
#[derive(Default)]
pub struct FakeGeocoder {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(location.to_string());
        if location.contains("Nowhere") {
            return Err(GeocodeError::NotFound(location.to_string()));
        }
        let seed = location.len() as f64;
        Coordinates::new(seed, -seed, location)
    }
}

pub struct Harness {
    pub upstream: Arc<FakeUpstream>,
    pub geocoder: Arc<FakeGeocoder>,
    pub store: Arc<DataStore>,
    pub cancel: CancellationToken,
}

pub fn harness(fixtures: Vec<Fixture>, mode: EnrichmentMode) -> Harness {
    let upstream = FakeUpstream::new(fixtures);
    let geocoder = Arc::new(FakeGeocoder::default());
    let coordinates = Arc::new(CoordinateCache::new(geocoder.clone(), Duration::ZERO));
    let cancel = CancellationToken::new();
    let store = Arc::new(DataStore::new(
        upstream.clone(),
        coordinates,
        mode,
        cancel.clone(),
    ));
    Harness {
        upstream,
        geocoder,
        store,
        cancel,
    }
}
