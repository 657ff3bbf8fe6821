//! Synchronous client core for the read-only Strava v1 API.
//!
//! # Overview
//! Turns caller arguments into validated GET requests against the v1
//! endpoints (clubs, rides, segments, efforts), dispatches them through a
//! `Transport`, and maps the JSON payloads into typed entities with their
//! embedded athletes, bikes, rides and segments.
//!
//! # Design
//! - `StravaClient` owns a transport and an append-only error log; nothing
//!   else is kept between calls.
//! - Each operation is split into `build_*` (arguments to `ApiRequest`) and
//!   `parse_*` (payload to entities), so the I/O boundary stays explicit and
//!   either half can be driven on its own.
//! - API failures arrive as an `error` field in the body, not as status codes;
//!   they become `ClientError::InvalidResponse` and are logged on the client.
//! - `UreqTransport` is the bundled blocking transport. Anything implementing
//!   `Transport` can replace it.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;
pub mod types;

pub use client::StravaClient;
pub use config::ClientConfig;
pub use error::{ClientError, CommandError, ConfigError};
pub use http::{ApiRequest, HttpMethod, QueryParams, QueryValue, Transport, TransportError};
pub use params::{RideFilter, SegmentEffortFilter};
pub use transport::UreqTransport;
pub use types::{Bike, Club, Effort, Member, Ride, Segment};
