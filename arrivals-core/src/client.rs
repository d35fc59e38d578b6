//! HTTP client for the flight data aggregation service.
//!
//! The service exposes one airport endpoint whose `pluginData` subtree
//! carries schedules, details and weather, a search endpoint for direct
//! flights, and a flat airport index. Everything is fetched as raw
//! JSON first (the debug dump wants it verbatim) and projected into typed
//! records through [`crate::wire`].

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::model::{AirportListing, AirportRecord, Credentials, FlightRecord, WeatherRecord};
use crate::wire::{Direction, FrAirportDetails, FrAirportRow, FrAirportWeather, FrFlight, FrScheduleEntry};

const AIRPORT_URL: &str = "https://api.flightradar24.com/common/v1/airport.json";
const SEARCH_URL: &str = "https://api.flightradar24.com/common/v1/search.json";
const AIRPORT_INDEX_URL: &str = "https://www.flightradar24.com/_json/airports.php";
const LOGIN_URL: &str = "https://www.flightradar24.com/user/login";
const LOGOUT_URL: &str = "https://www.flightradar24.com/user/logout";

// The API refuses requests without a browser-looking user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Classified failures of the flight data API. Every variant is terminal:
/// the caller prints the message and exits, nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(
        "Airport IATA code '{0}' not found! Check your spelling!\n\
         NOTE: Airports need international network services to be found."
    )]
    AirportNotFound(String),

    #[error(
        "Country '{0}' not found! Check your spelling!\n\
         NOTE: Use double quotes for multi-word names and try one of:\n      \
         https://www.listofcountriesoftheworld.com/"
    )]
    CountryNotFound(String),

    #[error("No direct flights found between {0} and {1}.")]
    NoDirectFlights(String, String),

    /// The response arrived but did not have the shape the projection
    /// expects. The message carries both the generic API warning and the
    /// not-found guidance, since either cause produces this failure.
    #[error(
        "Unknown response shape from the flight data API: {0}\n\
         Check the API code and/or JSON response.\n\
         The queried airport or country may also be unknown to the service."
    )]
    UnexpectedShape(String),

    #[error("Request to the flight data API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Flight data API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Login to the flight data API was rejected. Check your credentials.")]
    LoginRejected,
}

/// A raw response subtree together with its typed projection. The raw value
/// is what the `-j` debug dump prints.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub raw: Value,
    pub data: T,
}

/// The capability set this tool consumes from the flight data service.
/// Production uses [`FlightRadarClient`]; tests substitute a mock.
#[async_trait]
pub trait FlightDataApi: Send + Sync {
    async fn airport_arrivals(
        &self,
        code: &str,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError>;

    async fn airport_departures(
        &self,
        code: &str,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError>;

    async fn airports(&self, country: &str) -> Result<Fetched<Vec<AirportListing>>, ApiError>;

    async fn airport_details(&self, code: &str) -> Result<Fetched<AirportRecord>, ApiError>;

    async fn airport_weather(&self, code: &str) -> Result<Fetched<WeatherRecord>, ApiError>;

    async fn flights_between(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct FlightRadarClient {
    http: Client,
}

impl FlightRadarClient {
    pub fn new() -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(Self { http })
    }

    async fn fetch_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        debug!("GET {url} {query:?}");

        let res = self.http.get(url).query(query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
    }

    /// Fetch the airport endpoint and return the list under
    /// `pluginData.schedule.<mode>.data`, projected into flight records.
    async fn schedule(
        &self,
        code: &str,
        mode: &str,
        direction: Direction,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
        let mut query = vec![
            ("code", code.to_lowercase()),
            ("plugin[]", "schedule".to_string()),
            ("plugin-setting[schedule][mode]", mode.to_string()),
            ("page", "1".to_string()),
        ];
        if let Some(n) = limit {
            query.push(("limit", n.to_string()));
        }

        let response = self.fetch_json(AIRPORT_URL, &query).await?;

        let pointer = format!("/result/response/airport/pluginData/schedule/{mode}/data");
        let raw = response
            .pointer(&pointer)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::AirportNotFound(code.to_string()))?
            .clone();

        let entries: Vec<FrScheduleEntry> = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;

        if entries.is_empty() {
            return Err(ApiError::AirportNotFound(code.to_string()));
        }

        Ok(Fetched { raw, data: project_schedule(entries, direction, limit) })
    }

    /// Fetch a single `pluginData` plugin subtree of the airport endpoint.
    async fn airport_plugin(&self, code: &str, plugin: &str) -> Result<Value, ApiError> {
        let query = vec![("code", code.to_lowercase()), ("plugin[]", plugin.to_string())];
        let response = self.fetch_json(AIRPORT_URL, &query).await?;

        let pointer = format!("/result/response/airport/pluginData/{plugin}");
        response
            .pointer(&pointer)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| ApiError::AirportNotFound(code.to_string()))
    }
}

#[async_trait]
impl FlightDataApi for FlightRadarClient {
    async fn airport_arrivals(
        &self,
        code: &str,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
        self.schedule(code, "arrivals", Direction::Arrival, limit).await
    }

    async fn airport_departures(
        &self,
        code: &str,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
        self.schedule(code, "departures", Direction::Departure, limit).await
    }

    async fn airports(&self, country: &str) -> Result<Fetched<Vec<AirportListing>>, ApiError> {
        let response = self.fetch_json(AIRPORT_INDEX_URL, &[]).await?;

        let raw = response
            .pointer("/rows")
            .filter(|v| v.is_array())
            .cloned()
            .ok_or_else(|| ApiError::UnexpectedShape("airport index has no rows".to_string()))?;

        filter_airport_rows(raw, country)
    }

    async fn airport_details(&self, code: &str) -> Result<Fetched<AirportRecord>, ApiError> {
        let raw = self.airport_plugin(code, "details").await?;
        let details: FrAirportDetails = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;
        Ok(Fetched { raw, data: details.into_record() })
    }

    async fn airport_weather(&self, code: &str) -> Result<Fetched<WeatherRecord>, ApiError> {
        let raw = self.airport_plugin(code, "weather").await?;
        let weather: FrAirportWeather = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;
        Ok(Fetched { raw, data: weather.into_record() })
    }

    async fn flights_between(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
        let query = vec![
            ("query", "default".to_string()),
            ("origin", from.to_uppercase()),
            ("destination", to.to_uppercase()),
        ];
        let response = self.fetch_json(SEARCH_URL, &query).await?;

        let raw = response
            .pointer("/result/response/flight/data")
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| ApiError::NoDirectFlights(from.to_string(), to.to_string()))?;

        let flights: Vec<FrFlight> = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;

        if flights.is_empty() {
            return Err(ApiError::NoDirectFlights(from.to_string(), to.to_string()));
        }

        let records =
            flights.into_iter().map(|f| f.into_record(Direction::Departure)).collect();

        Ok(Fetched { raw, data: records })
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        debug!("POST {LOGIN_URL}");

        let form = [
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
            ("remember", "true"),
            ("type", "web"),
        ];
        let res = self.http.post(LOGIN_URL).form(&form).send().await?;

        if !res.status().is_success() {
            return Err(ApiError::LoginRejected);
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        debug!("GET {LOGOUT_URL}");

        let res = self.http.get(LOGOUT_URL).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, body: String::new() });
        }
        Ok(())
    }
}

/// Project schedule entries into flight records, capped at `limit`. The API
/// does not always honor its `limit` parameter, so the cap is enforced here.
fn project_schedule(
    entries: Vec<FrScheduleEntry>,
    direction: Direction,
    limit: Option<u32>,
) -> Vec<FlightRecord> {
    let mut records: Vec<FlightRecord> =
        entries.into_iter().map(|e| e.into_record(direction)).collect();
    if let Some(n) = limit {
        records.truncate(n as usize);
    }
    records
}

/// Narrow the global airport index down to one country. The kept raw rows
/// mirror the listings one-to-one, so the debug dump shows only the rows the
/// report was built from.
fn filter_airport_rows(
    raw: Value,
    country: &str,
) -> Result<Fetched<Vec<AirportListing>>, ApiError> {
    let rows: Vec<FrAirportRow> = serde_json::from_value(raw.clone())
        .map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;

    let Value::Array(values) = raw else {
        return Err(ApiError::UnexpectedShape("airport index rows are not an array".to_string()));
    };

    let mut kept = Vec::new();
    let mut listings = Vec::new();
    for (value, row) in values.into_iter().zip(rows) {
        if let Some(listing) = row.into_listing(country) {
            kept.push(value);
            listings.push(listing);
        }
    }

    if listings.is_empty() {
        return Err(ApiError::CountryNotFound(country.to_string()));
    }

    Ok(Fetched { raw: Value::Array(kept), data: listings })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
