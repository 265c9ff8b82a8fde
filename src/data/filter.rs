//! Conjunctive multi-criteria filtering over a catalog.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::data::artist::{Artist, MAX_MEMBER_BUCKET};
use crate::data::errors::ValidationError;
use crate::data::gazetteer;
use crate::data::repository::Catalog;

/// Inclusive year range, `start <= end` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(field: &'static str, start: i32, end: i32) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange { field, start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// Filter criteria. An empty dimension does not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Member buckets, `1..=8` where 8 means "8 or more".
    pub member_counts: BTreeSet<usize>,
    /// Formatted locations or state names, matched case-insensitively.
    pub locations: Vec<String>,
    pub creation_years: Option<YearRange>,
    pub album_years: Option<YearRange>,
}

impl FilterParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(bad) = self
            .member_counts
            .iter()
            .find(|&&c| !(1..=MAX_MEMBER_BUCKET).contains(&c))
        {
            return Err(ValidationError::InvalidValue {
                field: "members",
                value: bad.to_string(),
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.active_dimensions() == 0
    }

    fn active_dimensions(&self) -> usize {
        [
            !self.member_counts.is_empty(),
            !self.locations.is_empty(),
            self.creation_years.is_some(),
            self.album_years.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Whether an artist satisfies every active dimension.
    pub fn matches(&self, artist: &Artist) -> bool {
        (self.member_counts.is_empty() || self.member_counts.contains(&artist.member_bucket()))
            && (self.locations.is_empty() || self.locations.iter().any(|l| location_matches(artist, l)))
            && self
                .creation_years
                .is_none_or(|range| range.contains(artist.creation_date))
            && self.album_years.is_none_or(|range| {
                artist
                    .first_album_year()
                    .is_some_and(|year| range.contains(year))
            })
    }
}

fn location_matches(artist: &Artist, wanted: &str) -> bool {
    artist.played_at(wanted)
        || (gazetteer::canonical_state(wanted).is_some() && artist.played_in_state(wanted))
}

/// Linear scan preserving input order.
pub fn filter(artists: &[Arc<Artist>], params: &FilterParams) -> Vec<Arc<Artist>> {
    artists
        .iter()
        .filter(|artist| params.matches(artist))
        .cloned()
        .collect()
}

/// Filter a catalog, answering single-dimension queries from its indexes.
///
/// Both paths return artists in catalog order.
pub fn filter_catalog(catalog: &Catalog, params: &FilterParams) -> Vec<Arc<Artist>> {
    match params.active_dimensions() {
        0 => catalog.artists().to_vec(),
        1 => catalog.resolve(&indexed_positions(catalog, params)),
        _ => filter(catalog.artists(), params),
    }
}

fn indexed_positions(catalog: &Catalog, params: &FilterParams) -> Vec<usize> {
    let mut positions: Vec<usize> = if !params.member_counts.is_empty() {
        params
            .member_counts
            .iter()
            .flat_map(|&count| catalog.member_positions(count).iter().copied())
            .collect()
    } else if !params.locations.is_empty() {
        params
            .locations
            .iter()
            .flat_map(|location| {
                catalog
                    .location_positions(location)
                    .iter()
                    .chain(catalog.state_positions(location))
                    .copied()
            })
            .collect()
    } else if let Some(range) = params.creation_years {
        catalog.creation_positions(range)
    } else if let Some(range) = params.album_years {
        catalog.album_positions(range)
    } else {
        Vec::new()
    };
    positions.sort_unstable();
    positions.dedup();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::artist::tests::artist;

    fn dataset() -> Vec<Artist> {
        vec![
            artist(
                1,
                "Queen",
                &["a", "b", "c", "d"],
                1970,
                "14-12-1973",
                &["London, Uk", "Los Angeles, Usa"],
            ),
            artist(2, "Pink Floyd", &["a", "b", "c", "d", "e"], 1965, "05-08-1967", &["Paris, France"]),
            artist(3, "Duo", &["a", "b"], 1998, "26-03-2001", &["Seattle, Usa"]),
            artist(
                4,
                "Orchestra",
                &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
                1980,
                "unknown",
                &["Sydney, Australia"],
            ),
        ]
    }

    fn ids(artists: &[Arc<Artist>]) -> Vec<i32> {
        artists.iter().map(|a| a.id).collect()
    }

    fn both_paths(params: &FilterParams) -> Vec<i32> {
        let catalog = Catalog::build(dataset());
        let fast = ids(&filter_catalog(&catalog, params));
        let scan = ids(&filter(catalog.artists(), params));
        assert_eq!(fast, scan, "index path disagrees with scan for {params:?}");
        fast
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            YearRange::new("creation", 2000, 1990),
            Err(ValidationError::InvertedRange {
                field: "creation",
                start: 2000,
                end: 1990
            })
        );
    }

    #[test]
    fn empty_params_return_everything() {
        assert_eq!(both_paths(&FilterParams::default()), [1, 2, 3, 4]);
    }

    #[test]
    fn member_buckets_union() {
        let params = FilterParams {
            member_counts: BTreeSet::from([4, 5]),
            ..Default::default()
        };
        assert_eq!(both_paths(&params), [1, 2]);
    }

    #[test]
    fn eight_bucket_includes_larger_bands() {
        let params = FilterParams {
            member_counts: BTreeSet::from([8]),
            ..Default::default()
        };
        assert_eq!(both_paths(&params), [4]);
    }

    #[test]
    fn locations_match_exactly_or_by_state() {
        let params = FilterParams {
            locations: vec!["seattle, usa".into(), "California".into()],
            ..Default::default()
        };
        assert_eq!(both_paths(&params), [1, 3]);

        let partial = FilterParams {
            locations: vec!["Seattle".into()],
            ..Default::default()
        };
        assert!(both_paths(&partial).is_empty());
    }

    #[test]
    fn album_range_skips_unparseable_dates() {
        let params = FilterParams {
            album_years: Some(YearRange::new("album", 1900, 2100).unwrap()),
            ..Default::default()
        };
        assert_eq!(both_paths(&params), [1, 2, 3]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let params = FilterParams {
            member_counts: BTreeSet::from([2, 4]),
            creation_years: Some(YearRange::new("creation", 1990, 2000).unwrap()),
            ..Default::default()
        };
        assert_eq!(both_paths(&params), [3]);
    }

    #[test]
    fn single_point_range_is_inclusive() {
        let params = FilterParams {
            creation_years: Some(YearRange::new("creation", 1970, 1970).unwrap()),
            ..Default::default()
        };
        assert_eq!(both_paths(&params), [1]);
    }

    #[test]
    fn out_of_range_member_count_fails_validation() {
        let params = FilterParams {
            member_counts: BTreeSet::from([0]),
            ..Default::default()
        };
        assert!(params.validate().is_err());
        assert!(FilterParams::default().validate().is_ok());
    }
}
