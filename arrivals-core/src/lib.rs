//! Core library for the `arrivals` CLI.
//!
//! This crate defines:
//! - The flight data API client and its error taxonomy
//! - Projection of the API's nested responses into typed records
//! - Country name normalization and METAR decoding
//! - Query dispatch with optional session scoping
//!
//! It is used by `arrivals-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod country;
pub mod dispatch;
pub mod metar;
pub mod model;
pub mod units;
pub mod wire;

pub use client::{ApiError, Fetched, FlightDataApi, FlightRadarClient};
pub use dispatch::{Report, dispatch, with_session};
pub use metar::DecodedMetar;
pub use model::{
    AirportListing, AirportRecord, Credentials, DebugLevel, FlightRecord, Query, QueryMode,
    Visibility, VisibilityUnit, WeatherRecord,
};
