//! Per-operation option sets and their wire query mapping.
//!
//! Each filter is a closed struct listing exactly the options its endpoint
//! accepts. Options the caller leaves unset are omitted from the query. The
//! filters also deserialize from a loose snake_case JSON object, in which case
//! unrecognized keys are dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::http::ApiRequest;

/// Options for `GET /rides`. At least one of `club_id`, `athlete_id`,
/// `start_date`, `end_date` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideFilter {
    #[serde(default)]
    pub club_id: Option<u64>,
    #[serde(default)]
    pub athlete_id: Option<u64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl RideFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn club(mut self, club_id: u64) -> Self {
        self.club_id = Some(club_id);
        self
    }

    pub fn athlete(mut self, athlete_id: u64) -> Self {
        self.athlete_id = Some(athlete_id);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build a filter from a caller-supplied options object such as
    /// `{"athlete_id": 779, "start_date": "2010-09-21"}`.
    pub fn from_options(options: serde_json::Value) -> Result<Self, CommandError> {
        from_options(options)
    }

    /// `offset` alone does not select any rides.
    pub fn has_selector(&self) -> bool {
        self.club_id.is_some()
            || self.athlete_id.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .with_optional_query("clubId", self.club_id)
            .with_optional_query("athleteId", self.athlete_id)
            .with_optional_query("startDate", self.start_date)
            .with_optional_query("endDate", self.end_date)
            .with_optional_query("offset", self.offset)
    }
}

/// Options for `GET /segments/{id}/efforts`. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentEffortFilter {
    #[serde(default)]
    pub athlete_id: Option<u64>,
    #[serde(default)]
    pub club_id: Option<u64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Keep only each athlete's fastest effort.
    #[serde(default)]
    pub best: Option<bool>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl SegmentEffortFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn athlete(mut self, athlete_id: u64) -> Self {
        self.athlete_id = Some(athlete_id);
        self
    }

    pub fn club(mut self, club_id: u64) -> Self {
        self.club_id = Some(club_id);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn best(mut self, best: bool) -> Self {
        self.best = Some(best);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn from_options(options: serde_json::Value) -> Result<Self, CommandError> {
        from_options(options)
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .with_optional_query("athleteId", self.athlete_id)
            .with_optional_query("clubId", self.club_id)
            .with_optional_query("startDate", self.start_date)
            .with_optional_query("best", self.best)
            .with_optional_query("offset", self.offset)
    }
}

/// Options must be a JSON object; serde would otherwise accept an array as
/// positional fields.
fn from_options<T: for<'de> Deserialize<'de>>(options: serde_json::Value) -> Result<T, CommandError> {
    if !options.is_object() {
        return Err(CommandError::InvalidOption(format!(
            "expected an options object, got {options}"
        )));
    }
    serde_json::from_value(options).map_err(|e| CommandError::InvalidOption(e.to_string()))
}
