//! Request builder, dispatcher and response mapper for the Strava v1 API.
//!
//! # Design
//! Every operation is split into a pure `build_*` method that validates the
//! arguments and produces an `ApiRequest`, and a `parse_*` method that turns
//! the parsed payload into entities. The operation method itself (`clubs`,
//! `ride_show`, ...) runs build, hands the request to the `Transport`, then
//! parses. Callers that execute requests themselves can use the two halves
//! directly.
//!
//! The only state is the error log: every `InvalidResponse` message is
//! appended to it before the error is returned, so callers can inspect what
//! the API complained about after the fact.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, CommandError};
use crate::http::{ApiRequest, Transport};
use crate::params::{RideFilter, SegmentEffortFilter};
use crate::types::{Club, Effort, Member, Ride, Segment};

const RIDE_SELECTORS: &str = "club_id, athlete_id, start_date, end_date";

/// Synchronous client for the read-only Strava v1 API.
#[derive(Debug)]
pub struct StravaClient<T> {
    transport: T,
    errors: Mutex<Vec<String>>,
}

impl<T: Transport> StravaClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Every error message recorded by this client, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.log().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.log().last().cloned()
    }

    // --- clubs ---

    /// Search clubs by name.
    pub fn clubs(&self, query: &str) -> Result<Vec<Club>, ClientError> {
        let req = self.build_clubs(query)?;
        self.parse_clubs(self.dispatch(&req)?)
    }

    pub fn club_show(&self, id: u64) -> Result<Club, ClientError> {
        let req = self.build_club_show(id);
        self.parse_club_show(self.dispatch(&req)?)
    }

    pub fn club_members(&self, id: u64) -> Result<Vec<Member>, ClientError> {
        let req = self.build_club_members(id);
        self.parse_club_members(self.dispatch(&req)?)
    }

    /// Like `club_members`, also returning the club stub the endpoint sends
    /// next to the list.
    pub fn club_members_with_club(&self, id: u64) -> Result<(Option<Club>, Vec<Member>), ClientError> {
        let req = self.build_club_members(id);
        let payload = self.dispatch(&req)?;
        self.parse_with_parent(payload, "club", "members")
    }

    // --- rides ---

    pub fn rides(&self, filter: &RideFilter) -> Result<Vec<Ride>, ClientError> {
        let req = self.build_rides(filter)?;
        self.parse_rides(self.dispatch(&req)?)
    }

    pub fn ride_show(&self, id: u64) -> Result<Ride, ClientError> {
        let req = self.build_ride_show(id);
        self.parse_ride_show(self.dispatch(&req)?)
    }

    pub fn ride_efforts(&self, id: u64) -> Result<Vec<Effort>, ClientError> {
        let req = self.build_ride_efforts(id);
        self.parse_ride_efforts(self.dispatch(&req)?)
    }

    /// Like `ride_efforts`, also returning the parent ride stub.
    pub fn ride_efforts_with_ride(&self, id: u64) -> Result<(Option<Ride>, Vec<Effort>), ClientError> {
        let req = self.build_ride_efforts(id);
        let payload = self.dispatch(&req)?;
        self.parse_with_parent(payload, "ride", "efforts")
    }

    // --- segments ---

    /// Search segments by name.
    pub fn segments(&self, query: &str) -> Result<Vec<Segment>, ClientError> {
        let req = self.build_segments(query)?;
        self.parse_segments(self.dispatch(&req)?)
    }

    pub fn segment_show(&self, id: u64) -> Result<Segment, ClientError> {
        let req = self.build_segment_show(id);
        self.parse_segment_show(self.dispatch(&req)?)
    }

    pub fn segment_efforts(&self, id: u64, filter: &SegmentEffortFilter) -> Result<Vec<Effort>, ClientError> {
        let req = self.build_segment_efforts(id, filter);
        self.parse_segment_efforts(self.dispatch(&req)?)
    }

    /// Like `segment_efforts`, also returning the segment stub.
    pub fn segment_efforts_with_segment(
        &self,
        id: u64,
        filter: &SegmentEffortFilter,
    ) -> Result<(Option<Segment>, Vec<Effort>), ClientError> {
        let req = self.build_segment_efforts(id, filter);
        let payload = self.dispatch(&req)?;
        self.parse_with_parent(payload, "segment", "efforts")
    }

    // --- efforts ---

    pub fn effort_show(&self, id: u64) -> Result<Effort, ClientError> {
        let req = self.build_effort_show(id);
        self.parse_effort_show(self.dispatch(&req)?)
    }

    // --- request builders ---

    pub fn build_clubs(&self, query: &str) -> Result<ApiRequest, ClientError> {
        let name = require_query("clubs", query)?;
        Ok(ApiRequest::get("/clubs").with_query("name", name))
    }

    pub fn build_club_show(&self, id: u64) -> ApiRequest {
        ApiRequest::get(format!("/clubs/{id}"))
    }

    pub fn build_club_members(&self, id: u64) -> ApiRequest {
        ApiRequest::get(format!("/clubs/{id}/members"))
    }

    pub fn build_rides(&self, filter: &RideFilter) -> Result<ApiRequest, ClientError> {
        if !filter.has_selector() {
            return Err(CommandError::MissingFilter {
                operation: "rides",
                expected: RIDE_SELECTORS,
            }
            .into());
        }
        Ok(filter.apply(ApiRequest::get("/rides")))
    }

    pub fn build_ride_show(&self, id: u64) -> ApiRequest {
        ApiRequest::get(format!("/rides/{id}"))
    }

    pub fn build_ride_efforts(&self, id: u64) -> ApiRequest {
        ApiRequest::get(format!("/rides/{id}/efforts"))
    }

    pub fn build_segments(&self, query: &str) -> Result<ApiRequest, ClientError> {
        let name = require_query("segments", query)?;
        Ok(ApiRequest::get("/segments").with_query("name", name))
    }

    pub fn build_segment_show(&self, id: u64) -> ApiRequest {
        ApiRequest::get(format!("/segments/{id}"))
    }

    pub fn build_segment_efforts(&self, id: u64, filter: &SegmentEffortFilter) -> ApiRequest {
        filter.apply(ApiRequest::get(format!("/segments/{id}/efforts")))
    }

    pub fn build_effort_show(&self, id: u64) -> ApiRequest {
        ApiRequest::get(format!("/efforts/{id}"))
    }

    // --- response parsers ---

    pub fn parse_clubs(&self, payload: Value) -> Result<Vec<Club>, ClientError> {
        self.extract(payload, "clubs")
    }

    pub fn parse_club_show(&self, payload: Value) -> Result<Club, ClientError> {
        self.extract(payload, "club")
    }

    pub fn parse_club_members(&self, payload: Value) -> Result<Vec<Member>, ClientError> {
        self.extract(payload, "members")
    }

    pub fn parse_rides(&self, payload: Value) -> Result<Vec<Ride>, ClientError> {
        self.extract(payload, "rides")
    }

    pub fn parse_ride_show(&self, payload: Value) -> Result<Ride, ClientError> {
        self.extract(payload, "ride")
    }

    pub fn parse_ride_efforts(&self, payload: Value) -> Result<Vec<Effort>, ClientError> {
        self.extract(payload, "efforts")
    }

    pub fn parse_segments(&self, payload: Value) -> Result<Vec<Segment>, ClientError> {
        self.extract(payload, "segments")
    }

    pub fn parse_segment_show(&self, payload: Value) -> Result<Segment, ClientError> {
        self.extract(payload, "segment")
    }

    pub fn parse_segment_efforts(&self, payload: Value) -> Result<Vec<Effort>, ClientError> {
        self.extract(payload, "efforts")
    }

    pub fn parse_effort_show(&self, payload: Value) -> Result<Effort, ClientError> {
        self.extract(payload, "effort")
    }

    // --- internals ---

    fn dispatch(&self, request: &ApiRequest) -> Result<Value, ClientError> {
        debug!(
            path = %request.path,
            query = ?request.query.keys().collect::<Vec<_>>(),
            "dispatching request"
        );
        self.transport.get(request).map_err(|e| {
            warn!(path = %request.path, error = %e, "transport failed");
            ClientError::from(CommandError::Transport(e))
        })
    }

    /// Fail on an API `error` field, then map the subtree under `key`.
    fn extract<E: DeserializeOwned>(&self, mut payload: Value, key: &str) -> Result<E, ClientError> {
        self.check_api_error(&payload)?;
        match payload.get_mut(key).map(Value::take) {
            Some(subtree) => {
                self.check_unique_ids(&subtree, key)?;
                self.map_subtree(subtree, key)
            }
            None => Err(self.reject(format!("missing `{key}` in response"))),
        }
    }

    fn parse_with_parent<P, E>(&self, mut payload: Value, parent_key: &str, key: &str) -> Result<(Option<P>, E), ClientError>
    where
        P: DeserializeOwned,
        E: DeserializeOwned,
    {
        self.check_api_error(&payload)?;
        let parent = match payload.get_mut(parent_key).map(Value::take) {
            Some(subtree) => Some(self.map_subtree(subtree, parent_key)?),
            None => None,
        };
        let items = self.extract(payload, key)?;
        Ok((parent, items))
    }

    fn check_api_error(&self, payload: &Value) -> Result<(), ClientError> {
        match payload.get("error") {
            None | Some(Value::Null) => Ok(()),
            Some(Value::String(message)) => Err(self.reject(message.clone())),
            Some(other) => Err(self.reject(other.to_string())),
        }
    }

    /// Ids must not repeat within one list.
    fn check_unique_ids(&self, subtree: &Value, key: &str) -> Result<(), ClientError> {
        let Some(items) = subtree.as_array() else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        for id in items.iter().filter_map(|item| item.get("id").and_then(Value::as_u64)) {
            if !seen.insert(id) {
                return Err(self.reject(format!("duplicate id {id} in `{key}`")));
            }
        }
        Ok(())
    }

    fn map_subtree<E: DeserializeOwned>(&self, subtree: Value, key: &str) -> Result<E, ClientError> {
        serde_json::from_value(subtree).map_err(|e| self.reject(format!("malformed `{key}` in response: {e}")))
    }

    /// Record `message` in the error log and wrap it as `InvalidResponse`.
    fn reject(&self, message: String) -> ClientError {
        warn!(error = %message, "invalid response");
        self.log().push(message.clone());
        ClientError::InvalidResponse(message)
    }

    fn log(&self) -> MutexGuard<'_, Vec<String>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn require_query<'a>(operation: &'static str, query: &'a str) -> Result<&'a str, CommandError> {
    if query.trim().is_empty() {
        return Err(CommandError::BlankQuery { operation });
    }
    Ok(query)
}
