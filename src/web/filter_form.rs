//! Decoding of the filter form into [`FilterParams`].
//!
//! Accepted fields: `creation_start`, `creation_end`, `album_start`,
//! `album_end`, `members_1`..`members_8` (presence flags), `members` or
//! `members[]`, and `location` or `location[]`. Blank values are ignored.

use std::collections::BTreeSet;

use crate::data::{FilterParams, MAX_MEMBER_BUCKET, ValidationError, YearRange};

/// Year slider bounds the form is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min_creation: i32,
    pub min_album: i32,
    pub max_year: i32,
}

/// The submitted form, kept for re-rendering the controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub creation_start: Option<i32>,
    pub creation_end: Option<i32>,
    pub album_start: Option<i32>,
    pub album_end: Option<i32>,
    pub members: BTreeSet<usize>,
    pub locations: Vec<String>,
}

impl FilterForm {
    /// Decode an `application/x-www-form-urlencoded` body or query string.
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        let mut form = FilterForm::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let value = value.trim();
            match &*key {
                "creation_start" => form.creation_start = parse_year("creation_start", value)?,
                "creation_end" => form.creation_end = parse_year("creation_end", value)?,
                "album_start" => form.album_start = parse_year("album_start", value)?,
                "album_end" => form.album_end = parse_year("album_end", value)?,
                "members" | "members[]" if !value.is_empty() => {
                    let count = value.parse::<usize>().map_err(|_| invalid("members", value))?;
                    form.members.insert(count);
                }
                "location" | "location[]" if !value.is_empty() => {
                    if !form.locations.iter().any(|l| l.eq_ignore_ascii_case(value)) {
                        form.locations.push(value.to_string());
                    }
                }
                flag => {
                    if let Some(count) = flag
                        .strip_prefix("members_")
                        .and_then(|n| n.parse::<usize>().ok())
                        .filter(|n| (1..=MAX_MEMBER_BUCKET).contains(n))
                    {
                        form.members.insert(count);
                    }
                }
            }
        }
        Ok(form)
    }

    /// Build filter criteria. A range spanning the full slider bounds does not
    /// constrain the result.
    pub fn to_params(&self, bounds: YearBounds) -> Result<FilterParams, ValidationError> {
        let params = FilterParams {
            member_counts: self.members.clone(),
            locations: self.locations.clone(),
            creation_years: range(
                "creation",
                self.creation_start,
                self.creation_end,
                bounds.min_creation,
                bounds.max_year,
            )?,
            album_years: range(
                "album",
                self.album_start,
                self.album_end,
                bounds.min_album,
                bounds.max_year,
            )?,
        };
        params.validate()?;
        Ok(params)
    }
}

fn range(
    field: &'static str,
    start: Option<i32>,
    end: Option<i32>,
    min: i32,
    max: i32,
) -> Result<Option<YearRange>, ValidationError> {
    // A lone bound outside the slider span still makes a valid, if empty, range.
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, max.max(start)),
        (None, Some(end)) => (min.min(end), end),
        (None, None) => return Ok(None),
    };
    let range = YearRange::new(field, start, end)?;
    if range.start() <= min && range.end() >= max {
        return Ok(None);
    }
    Ok(Some(range))
}

fn parse_year(field: &'static str, value: &str) -> Result<Option<i32>, ValidationError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
    }
}
