//! Fixture-backed stand-in for the Strava v1 API.
//!
//! Serves the same paths and payload shapes as the real service: stubs
//! (`name` + `id`) in index listings, full records on show endpoints, and
//! `{"error": "..."}` bodies for unknown ids or unusable query parameters.
//! The dataset is read-only and embedded at compile time.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 50;

const FIXTURE: &str = include_str!("../fixtures/strava.json");

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    pub id: u64,
    pub name: String,
    pub username: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: u64,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Bike {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: u64,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start_date: String,
    pub start_date_local: Option<String>,
    pub time_zone_offset: Option<f64>,
    pub elevation_gain: Option<f64>,
    pub distance: Option<f64>,
    pub elapsed_time: Option<u64>,
    pub moving_time: Option<u64>,
    pub average_speed: Option<f64>,
    pub maximum_speed: Option<f64>,
    pub average_watts: Option<f64>,
    pub athlete_id: u64,
    pub bike_id: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: u64,
    pub name: String,
    pub average_grade: Option<f64>,
    pub climb_category: Option<String>,
    pub elevation_gain: Option<f64>,
    pub distance: Option<f64>,
    pub elevation_high: Option<f64>,
    pub elevation_low: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effort {
    pub id: u64,
    pub ride_id: u64,
    pub segment_id: u64,
    pub athlete_id: u64,
    pub start_date: String,
    pub start_date_local: Option<String>,
    pub time_zone_offset: Option<f64>,
    pub elapsed_time: u64,
    pub moving_time: Option<u64>,
    pub average_speed: Option<f64>,
    pub maximum_speed: Option<f64>,
    pub average_watts: Option<f64>,
    pub distance: Option<f64>,
    pub elevation_gain: Option<f64>,
}

/// Everything the server knows, keyed by id on lookup.
#[derive(Clone, Debug, Deserialize)]
pub struct Dataset {
    pub athletes: Vec<Athlete>,
    pub clubs: Vec<Club>,
    pub bikes: Vec<Bike>,
    pub rides: Vec<Ride>,
    pub segments: Vec<Segment>,
    pub efforts: Vec<Effort>,
}

impl Dataset {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The bundled fixture. Its validity is checked by the crate's tests.
    pub fn fixture() -> Self {
        Self::from_json(FIXTURE).expect("bundled fixture must parse")
    }

    pub fn athlete(&self, id: u64) -> Option<&Athlete> {
        self.athletes.iter().find(|a| a.id == id)
    }

    pub fn club(&self, id: u64) -> Option<&Club> {
        self.clubs.iter().find(|c| c.id == id)
    }

    pub fn bike(&self, id: u64) -> Option<&Bike> {
        self.bikes.iter().find(|b| b.id == id)
    }

    pub fn ride(&self, id: u64) -> Option<&Ride> {
        self.rides.iter().find(|r| r.id == id)
    }

    pub fn segment(&self, id: u64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn effort(&self, id: u64) -> Option<&Effort> {
        self.efforts.iter().find(|e| e.id == id)
    }
}

#[derive(Clone)]
struct AppState {
    data: Arc<Dataset>,
    page_size: usize,
}

type Reply = (StatusCode, Json<Value>);
type Params = HashMap<String, String>;

pub fn app() -> Router {
    app_with(Dataset::fixture(), DEFAULT_PAGE_SIZE)
}

pub fn app_with(data: Dataset, page_size: usize) -> Router {
    let state = AppState {
        data: Arc::new(data),
        page_size: page_size.max(1),
    };
    Router::new()
        .route("/clubs", get(list_clubs))
        .route("/clubs/{id}", get(show_club))
        .route("/clubs/{id}/members", get(club_members))
        .route("/rides", get(list_rides))
        .route("/rides/{id}", get(show_ride))
        .route("/rides/{id}/efforts", get(ride_efforts))
        .route("/segments", get(list_segments))
        .route("/segments/{id}", get(show_segment))
        .route("/segments/{id}/efforts", get(segment_efforts))
        .route("/efforts/{id}", get(show_effort))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

// --- clubs ---

async fn list_clubs(State(state): State<AppState>, Query(params): Query<Params>) -> Reply {
    reply(name_search(&params).map(|needle| {
        let clubs: Vec<Value> = state
            .data
            .clubs
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .map(|c| stub(c.id, &c.name))
            .collect();
        json!({ "clubs": clubs })
    }))
}

async fn show_club(State(state): State<AppState>, Path(raw): Path<String>) -> Reply {
    match parse_id(&raw).and_then(|id| state.data.club(id)) {
        Some(club) => ok(json!({ "club": club_full(club) })),
        None => not_found("clubs", &raw),
    }
}

async fn club_members(State(state): State<AppState>, Path(raw): Path<String>) -> Reply {
    let Some(club) = parse_id(&raw).and_then(|id| state.data.club(id)) else {
        return not_found("clubs", &raw);
    };
    let members: Vec<Value> = club
        .member_ids
        .iter()
        .filter_map(|id| state.data.athlete(*id))
        .map(|a| stub(a.id, &a.name))
        .collect();
    ok(json!({ "club": stub(club.id, &club.name), "members": members }))
}

// --- rides ---

async fn list_rides(State(state): State<AppState>, Query(params): Query<Params>) -> Reply {
    reply(rides_index(&state, &params))
}

fn rides_index(state: &AppState, params: &Params) -> Result<Value, Reply> {
    let club_id = numeric_param(params, "clubId")?;
    let athlete_id = numeric_param(params, "athleteId")?;
    let start = date_param(params, "startDate")?;
    let end = date_param(params, "endDate")?;
    let offset = numeric_param(params, "offset")?.unwrap_or(0) as usize;

    if club_id.is_none() && athlete_id.is_none() && start.is_none() && end.is_none() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "One of clubId, athleteId, startDate or endDate is required",
        ));
    }
    let members = club_filter(&state.data, club_id)?;

    let mut rides: Vec<&Ride> = state
        .data
        .rides
        .iter()
        .filter(|r| athlete_id.map_or(true, |a| r.athlete_id == a))
        .filter(|r| members.map_or(true, |m| m.contains(&r.athlete_id)))
        .filter(|r| start.map_or(true, |d| day(&r.start_date).is_some_and(|t| t >= d)))
        .filter(|r| end.map_or(true, |d| day(&r.start_date).is_some_and(|t| t <= d)))
        .collect();
    rides.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));

    let rides: Vec<Value> = paginate(rides, offset, state.page_size)
        .into_iter()
        .map(|r| stub(r.id, &r.name))
        .collect();
    Ok(json!({ "rides": rides }))
}

async fn show_ride(State(state): State<AppState>, Path(raw): Path<String>) -> Reply {
    match parse_id(&raw).and_then(|id| state.data.ride(id)) {
        Some(ride) => ok(json!({ "ride": ride_full(&state.data, ride) })),
        None => not_found("rides", &raw),
    }
}

async fn ride_efforts(State(state): State<AppState>, Path(raw): Path<String>) -> Reply {
    let Some(ride) = parse_id(&raw).and_then(|id| state.data.ride(id)) else {
        return not_found("rides", &raw);
    };
    let mut efforts: Vec<&Effort> = state.data.efforts.iter().filter(|e| e.ride_id == ride.id).collect();
    efforts.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    // This endpoint spells elapsed_time in snake case.
    let efforts: Vec<Value> = efforts
        .into_iter()
        .map(|e| {
            let mut m = Map::new();
            m.insert("elapsed_time".into(), json!(e.elapsed_time));
            if let Some(segment) = state.data.segment(e.segment_id) {
                m.insert("segment".into(), stub(segment.id, &segment.name));
            }
            m.insert("id".into(), json!(e.id));
            Value::Object(m)
        })
        .collect();
    ok(json!({ "ride": stub(ride.id, &ride.name), "efforts": efforts }))
}

// --- segments ---

async fn list_segments(State(state): State<AppState>, Query(params): Query<Params>) -> Reply {
    reply(name_search(&params).map(|needle| {
        let segments: Vec<Value> = state
            .data
            .segments
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .map(|s| stub(s.id, &s.name))
            .collect();
        json!({ "segments": segments })
    }))
}

async fn show_segment(State(state): State<AppState>, Path(raw): Path<String>) -> Reply {
    match parse_id(&raw).and_then(|id| state.data.segment(id)) {
        Some(segment) => ok(json!({ "segment": segment_full(segment) })),
        None => not_found("segments", &raw),
    }
}

async fn segment_efforts(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Query<Params>,
) -> Reply {
    reply(segment_efforts_index(&state, &raw, &params))
}

fn segment_efforts_index(state: &AppState, raw: &str, params: &Params) -> Result<Value, Reply> {
    let segment = parse_id(raw)
        .and_then(|id| state.data.segment(id))
        .ok_or_else(|| not_found("segments", raw))?;
    let athlete_id = numeric_param(params, "athleteId")?;
    let club_id = numeric_param(params, "clubId")?;
    let start = date_param(params, "startDate")?;
    let best = bool_param(params, "best")?.unwrap_or(false);
    let offset = numeric_param(params, "offset")?.unwrap_or(0) as usize;
    let members = club_filter(&state.data, club_id)?;

    let mut efforts: Vec<&Effort> = state
        .data
        .efforts
        .iter()
        .filter(|e| e.segment_id == segment.id)
        .filter(|e| athlete_id.map_or(true, |a| e.athlete_id == a))
        .filter(|e| members.map_or(true, |m| m.contains(&e.athlete_id)))
        .filter(|e| start.map_or(true, |d| day(&e.start_date).is_some_and(|t| t >= d)))
        .collect();
    efforts.sort_by(|a, b| a.elapsed_time.cmp(&b.elapsed_time).then(a.id.cmp(&b.id)));

    if best {
        let mut seen = HashSet::new();
        efforts.retain(|e| seen.insert(e.athlete_id));
    }

    let efforts: Vec<Value> = paginate(efforts, offset, state.page_size)
        .into_iter()
        .map(|e| {
            let mut m = Map::new();
            m.insert("startDate".into(), json!(e.start_date));
            insert_opt(&mut m, "startDateLocal", &e.start_date_local);
            m.insert("activityId".into(), json!(e.ride_id));
            insert_opt(&mut m, "timeZoneOffset", &e.time_zone_offset);
            if let Some(athlete) = state.data.athlete(e.athlete_id) {
                m.insert("athlete".into(), athlete_full(athlete));
            }
            if let Some(ride) = state.data.ride(e.ride_id) {
                m.insert("ride".into(), stub(ride.id, &ride.name));
            }
            m.insert("elapsedTime".into(), json!(e.elapsed_time));
            m.insert("id".into(), json!(e.id));
            Value::Object(m)
        })
        .collect();
    Ok(json!({ "efforts": efforts, "segment": stub(segment.id, &segment.name) }))
}

// --- efforts ---

async fn show_effort(State(state): State<AppState>, Path(raw): Path<String>) -> Reply {
    match parse_id(&raw).and_then(|id| state.data.effort(id)) {
        Some(effort) => ok(json!({ "effort": effort_full(&state.data, effort) })),
        None => not_found("efforts", &raw),
    }
}

// --- projections ---

fn stub(id: u64, name: &str) -> Value {
    json!({ "name": name, "id": id })
}

fn athlete_full(athlete: &Athlete) -> Value {
    json!({ "username": athlete.username, "name": athlete.name, "id": athlete.id })
}

fn club_full(club: &Club) -> Value {
    let mut m = Map::new();
    insert_opt(&mut m, "location", &club.location);
    insert_opt(&mut m, "description", &club.description);
    m.insert("name".into(), json!(club.name));
    m.insert("id".into(), json!(club.id));
    Value::Object(m)
}

fn ride_full(data: &Dataset, ride: &Ride) -> Value {
    let mut m = Map::new();
    m.insert("id".into(), json!(ride.id));
    m.insert("name".into(), json!(ride.name));
    insert_opt(&mut m, "location", &ride.location);
    // Shows always carry a description, null when the rider left it blank.
    m.insert("description".into(), json!(ride.description));
    m.insert("startDate".into(), json!(ride.start_date));
    insert_opt(&mut m, "startDateLocal", &ride.start_date_local);
    insert_opt(&mut m, "timeZoneOffset", &ride.time_zone_offset);
    insert_opt(&mut m, "elevationGain", &ride.elevation_gain);
    insert_opt(&mut m, "distance", &ride.distance);
    insert_opt(&mut m, "elapsedTime", &ride.elapsed_time);
    insert_opt(&mut m, "movingTime", &ride.moving_time);
    insert_opt(&mut m, "averageSpeed", &ride.average_speed);
    insert_opt(&mut m, "maximumSpeed", &ride.maximum_speed);
    insert_opt(&mut m, "averageWatts", &ride.average_watts);
    if let Some(athlete) = data.athlete(ride.athlete_id) {
        m.insert("athlete".into(), athlete_full(athlete));
    }
    if let Some(bike) = ride.bike_id.and_then(|id| data.bike(id)) {
        m.insert("bike".into(), stub(bike.id, &bike.name));
    }
    Value::Object(m)
}

fn segment_full(segment: &Segment) -> Value {
    let mut m = Map::new();
    m.insert("id".into(), json!(segment.id));
    m.insert("name".into(), json!(segment.name));
    insert_opt(&mut m, "averageGrade", &segment.average_grade);
    insert_opt(&mut m, "climbCategory", &segment.climb_category);
    insert_opt(&mut m, "elevationGain", &segment.elevation_gain);
    insert_opt(&mut m, "distance", &segment.distance);
    insert_opt(&mut m, "elevationHigh", &segment.elevation_high);
    insert_opt(&mut m, "elevationLow", &segment.elevation_low);
    Value::Object(m)
}

fn effort_full(data: &Dataset, effort: &Effort) -> Value {
    let mut m = Map::new();
    m.insert("id".into(), json!(effort.id));
    if let Some(ride) = data.ride(effort.ride_id) {
        m.insert("ride".into(), stub(ride.id, &ride.name));
    }
    if let Some(segment) = data.segment(effort.segment_id) {
        m.insert("segment".into(), stub(segment.id, &segment.name));
    }
    if let Some(athlete) = data.athlete(effort.athlete_id) {
        m.insert("athlete".into(), athlete_full(athlete));
    }
    m.insert("startDate".into(), json!(effort.start_date));
    insert_opt(&mut m, "startDateLocal", &effort.start_date_local);
    insert_opt(&mut m, "timeZoneOffset", &effort.time_zone_offset);
    m.insert("elapsedTime".into(), json!(effort.elapsed_time));
    insert_opt(&mut m, "movingTime", &effort.moving_time);
    insert_opt(&mut m, "averageSpeed", &effort.average_speed);
    insert_opt(&mut m, "maximumSpeed", &effort.maximum_speed);
    insert_opt(&mut m, "averageWatts", &effort.average_watts);
    insert_opt(&mut m, "distance", &effort.distance);
    insert_opt(&mut m, "elevationGain", &effort.elevation_gain);
    Value::Object(m)
}

fn insert_opt<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), json!(value));
    }
}

// --- request helpers ---

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn reply(result: Result<Value, Reply>) -> Reply {
    result.map(ok).unwrap_or_else(|err| err)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Reply {
    let message = message.into();
    debug!(%status, %message, "rejecting request");
    (status, Json(json!({ "error": message })))
}

fn not_found(resource: &str, raw: &str) -> Reply {
    api_error(StatusCode::NOT_FOUND, format!("Invalid {resource}/{raw}"))
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

/// Lower-cased `name` parameter, required and non-blank.
fn name_search(params: &Params) -> Result<String, Reply> {
    match params.get("name") {
        Some(name) if !name.trim().is_empty() => Ok(name.to_lowercase()),
        _ => Err(api_error(StatusCode::BAD_REQUEST, "name is required")),
    }
}

fn numeric_param(params: &Params, key: &str) -> Result<Option<u64>, Reply> {
    params
        .get(key)
        .map(|raw| raw.parse::<u64>())
        .transpose()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, format!("Invalid {key}")))
}

fn date_param(params: &Params, key: &str) -> Result<Option<NaiveDate>, Reply> {
    params
        .get(key)
        .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, format!("Invalid {key}")))
}

fn bool_param(params: &Params, key: &str) -> Result<Option<bool>, Reply> {
    params
        .get(key)
        .map(|raw| raw.parse::<bool>())
        .transpose()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, format!("Invalid {key}")))
}

/// Member ids of the club named by `clubId`, or `None` when unfiltered.
fn club_filter(data: &Dataset, club_id: Option<u64>) -> Result<Option<&[u64]>, Reply> {
    match club_id {
        None => Ok(None),
        Some(id) => data
            .club(id)
            .map(|club| Some(club.member_ids.as_slice()))
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid clubId")),
    }
}

/// Calendar day of an RFC 3339 timestamp, in the timestamp's own offset.
fn day(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp).ok().map(|t| t.date_naive())
}

fn paginate<T>(items: Vec<T>, offset: usize, page_size: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(page_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_parses() {
        let data = Dataset::fixture();
        assert!(!data.clubs.is_empty());
        assert!(!data.efforts.is_empty());
    }

    #[test]
    fn fixture_references_resolve() {
        let data = Dataset::fixture();
        for ride in &data.rides {
            assert!(data.athlete(ride.athlete_id).is_some(), "ride {} athlete", ride.id);
            if let Some(bike_id) = ride.bike_id {
                assert!(data.bike(bike_id).is_some(), "ride {} bike", ride.id);
            }
        }
        for effort in &data.efforts {
            assert!(data.ride(effort.ride_id).is_some(), "effort {} ride", effort.id);
            assert!(data.segment(effort.segment_id).is_some(), "effort {} segment", effort.id);
            assert!(data.athlete(effort.athlete_id).is_some(), "effort {} athlete", effort.id);
        }
        for club in &data.clubs {
            for id in &club.member_ids {
                assert!(data.athlete(*id).is_some(), "club {} member {id}", club.id);
            }
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn date_param_accepts_calendar_days_only() {
        let parsed = date_param(&params(&[("startDate", "2010-07-01")]), "startDate").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2010, 7, 1));
        assert_eq!(date_param(&params(&[]), "startDate").unwrap(), None);
        for raw in ["2010-13-45", "2010-02-30", "2010/07/01", "21-09-2010", ""] {
            assert!(date_param(&params(&[("endDate", raw)]), "endDate").is_err(), "{raw}");
        }
    }

    #[test]
    fn day_reads_rfc3339_timestamps() {
        assert_eq!(day("2010-02-28T16:31:35Z"), NaiveDate::from_ymd_opt(2010, 2, 28));
        assert_eq!(day("2010-02-28T23:31:35-08:00"), NaiveDate::from_ymd_opt(2010, 2, 28));
        assert_eq!(day("2010-02-28"), None);
    }

    #[test]
    fn fixture_timestamps_are_rfc3339() {
        let data = Dataset::fixture();
        for ride in &data.rides {
            assert!(day(&ride.start_date).is_some(), "ride {}", ride.id);
        }
        for effort in &data.efforts {
            assert!(day(&effort.start_date).is_some(), "effort {}", effort.id);
        }
    }

    #[test]
    fn paginate_skips_then_takes() {
        assert_eq!(paginate(vec![1, 2, 3, 4, 5], 2, 2), vec![3, 4]);
        assert!(paginate(vec![1, 2], 5, 2).is_empty());
    }

    #[test]
    fn club_full_omits_absent_location() {
        let data = Dataset::fixture();
        let club = club_full(data.club(31).unwrap());
        assert!(club.get("location").is_none());
        assert_eq!(club["description"], "");
    }

    #[test]
    fn ride_full_sends_null_description() {
        let data = Dataset::fixture();
        let ride = ride_full(&data, data.ride(77563).unwrap());
        assert!(ride["description"].is_null());
        assert_eq!(ride["athlete"]["username"], "julianbill");
        assert_eq!(ride["bike"]["name"], "Serotta Legend Ti");
    }
}
