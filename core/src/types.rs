//! Domain entities materialized from Strava v1 payloads.
//!
//! # Design
//! Each struct's serde attributes are its wire table: `rename` gives the
//! camelCase name the API sends, `alias` accepts the snake_case spelling a few
//! endpoints use instead (ride efforts send `elapsed_time`). Unknown keys are
//! ignored so new API fields never break mapping. Everything except `id` is
//! optional because field presence depends on the endpoint; a stub embedded in
//! another payload simply has most fields set to `None`.
//!
//! Values are taken as the JSON provides them. Dates stay strings.

use serde::{Deserialize, Serialize};

/// A club, from `/clubs` (stub) or `/clubs/{id}` (with location and description).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Club {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A club member or an effort/ride athlete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Only present in athlete payloads embedded in rides and efforts.
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bike {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A ride. Index listings and effort payloads only carry `id` and `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ride {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, rename = "startDateLocal", alias = "start_date_local")]
    pub start_date_local: Option<String>,
    #[serde(default, rename = "timeZoneOffset", alias = "time_zone_offset")]
    pub time_zone_offset: Option<f64>,
    #[serde(default, rename = "elevationGain", alias = "elevation_gain")]
    pub elevation_gain: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default, rename = "elapsedTime", alias = "elapsed_time")]
    pub elapsed_time: Option<u64>,
    #[serde(default, rename = "movingTime", alias = "moving_time")]
    pub moving_time: Option<u64>,
    #[serde(default, rename = "averageSpeed", alias = "average_speed")]
    pub average_speed: Option<f64>,
    #[serde(default, rename = "maximumSpeed", alias = "maximum_speed")]
    pub maximum_speed: Option<f64>,
    #[serde(default, rename = "averageWatts", alias = "average_watts")]
    pub average_watts: Option<f64>,
    #[serde(default)]
    pub athlete: Option<Member>,
    #[serde(default)]
    pub bike: Option<Bike>,
}

/// A segment. Index listings and effort payloads only carry `id` and `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "averageGrade", alias = "average_grade")]
    pub average_grade: Option<f64>,
    /// Sent as a string by the API (`"4"`, `"HC"`).
    #[serde(default, rename = "climbCategory", alias = "climb_category")]
    pub climb_category: Option<String>,
    #[serde(default, rename = "elevationGain", alias = "elevation_gain")]
    pub elevation_gain: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default, rename = "elevationHigh", alias = "elevation_high")]
    pub elevation_high: Option<f64>,
    #[serde(default, rename = "elevationLow", alias = "elevation_low")]
    pub elevation_low: Option<f64>,
}

/// One athlete's time over one segment during one ride.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Effort {
    pub id: u64,
    /// Id of the ride the effort belongs to, sent by the segment efforts index.
    #[serde(default, rename = "activityId", alias = "activity_id")]
    pub activity_id: Option<u64>,
    #[serde(default, rename = "elapsedTime", alias = "elapsed_time")]
    pub elapsed_time: Option<u64>,
    #[serde(default, rename = "movingTime", alias = "moving_time")]
    pub moving_time: Option<u64>,
    #[serde(default, rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, rename = "startDateLocal", alias = "start_date_local")]
    pub start_date_local: Option<String>,
    #[serde(default, rename = "timeZoneOffset", alias = "time_zone_offset")]
    pub time_zone_offset: Option<f64>,
    #[serde(default, rename = "averageSpeed", alias = "average_speed")]
    pub average_speed: Option<f64>,
    #[serde(default, rename = "maximumSpeed", alias = "maximum_speed")]
    pub maximum_speed: Option<f64>,
    #[serde(default, rename = "averageWatts", alias = "average_watts")]
    pub average_watts: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default, rename = "elevationGain", alias = "elevation_gain")]
    pub elevation_gain: Option<f64>,
    #[serde(default)]
    pub athlete: Option<Member>,
    #[serde(default)]
    pub ride: Option<Ride>,
    #[serde(default)]
    pub segment: Option<Segment>,
}
