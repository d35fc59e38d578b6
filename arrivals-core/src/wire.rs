//! Serde shapes for the flight data API payloads and their projection into
//! the domain records of [`crate::model`].
//!
//! The upstream service represents absent linked entities as the literal
//! string `"None"` rather than JSON null. [`none_sentinel`] erases both forms
//! into `Option::None` here, at the decode boundary, so nothing downstream
//! ever compares against a string sentinel.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{AirportListing, AirportRecord, FlightRecord, Visibility, WeatherRecord};

/// Decode a field that may be a real value, JSON null, or the string `"None"`.
pub(crate) fn none_sentinel<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s == "None" => Ok(None),
        other => serde_json::from_value(other).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Which side of a schedule row carries the interesting airport and times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Arrival,
    Departure,
}

/// One entry of `pluginData.schedule.{arrivals,departures}.data`.
#[derive(Debug, Deserialize)]
pub struct FrScheduleEntry {
    pub flight: FrFlight,
}

impl FrScheduleEntry {
    pub fn into_record(self, direction: Direction) -> FlightRecord {
        self.flight.into_record(direction)
    }
}

/// Flight body shared by schedule entries and direct-flight search results
/// (the latter come without the `flight` wrapper but with `aircraft`).
#[derive(Debug, Deserialize)]
pub struct FrFlight {
    #[serde(default)]
    pub identification: FrIdentification,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub airline: Option<FrAirline>,
    #[serde(default)]
    pub airport: FrEndpoints,
    #[serde(default)]
    pub status: FrStatus,
    #[serde(default)]
    pub time: FrTimes,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub aircraft: Option<FrAircraft>,
}

impl FrFlight {
    pub fn into_record(self, direction: Direction) -> FlightRecord {
        let counterpart = match direction {
            Direction::Arrival => self.airport.origin,
            Direction::Departure => self.airport.destination,
        }
        .and_then(|a| a.code)
        .and_then(|c| c.iata);

        let (scheduled, estimated) = match direction {
            Direction::Arrival => (self.time.scheduled.arrival, self.time.estimated.arrival),
            Direction::Departure => (self.time.scheduled.departure, self.time.estimated.departure),
        };

        FlightRecord {
            callsign: self.identification.callsign,
            flight_number: self.identification.number.and_then(|n| n.default),
            counterpart,
            scheduled,
            estimated,
            airline: self.airline.and_then(|a| a.name),
            status: self.status.text.unwrap_or_else(|| "-".to_string()),
            aircraft: self.aircraft.and_then(|a| a.model).and_then(|m| m.text),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FrIdentification {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub callsign: Option<String>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub number: Option<FrNumber>,
}

#[derive(Debug, Deserialize)]
pub struct FrNumber {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FrAirline {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrEndpoints {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub origin: Option<FrAirportRef>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub destination: Option<FrAirportRef>,
}

#[derive(Debug, Deserialize)]
pub struct FrAirportRef {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub code: Option<FrIataCode>,
}

#[derive(Debug, Deserialize)]
pub struct FrIataCode {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub iata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrStatus {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrTimes {
    #[serde(default)]
    pub scheduled: FrTimePair,
    #[serde(default)]
    pub estimated: FrTimePair,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrTimePair {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub arrival: Option<i64>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub departure: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FrAircraft {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub model: Option<FrAircraftModel>,
}

#[derive(Debug, Deserialize)]
pub struct FrAircraftModel {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub text: Option<String>,
}

/// `pluginData.details` of the airport endpoint.
#[derive(Debug, Deserialize)]
pub struct FrAirportDetails {
    pub code: FrCodePair,
    pub name: String,
    pub position: FrPosition,
    pub timezone: FrTimezone,
    #[serde(default, rename = "delayIndex")]
    pub delay_index: FrDelayIndex,
    #[serde(default)]
    pub url: FrUrls,
}

#[derive(Debug, Deserialize)]
pub struct FrCodePair {
    pub icao: String,
}

#[derive(Debug, Deserialize)]
pub struct FrPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub country: FrCountry,
    pub region: FrRegion,
}

#[derive(Debug, Deserialize)]
pub struct FrCountry {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct FrRegion {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct FrTimezone {
    pub name: String,
    pub abbr: String,
    pub offset: i64,
    #[serde(rename = "isDst")]
    pub is_dst: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrDelayIndex {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub arrivals: Option<f64>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub departures: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrUrls {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub homepage: Option<String>,
}

impl FrAirportDetails {
    pub fn into_record(self) -> AirportRecord {
        AirportRecord {
            icao: self.code.icao,
            name: self.name,
            latitude: self.position.latitude,
            longitude: self.position.longitude,
            // Reported in feet by this endpoint; the weather payload carries
            // the meters reading, merged in at dispatch.
            elevation_m: None,
            country: self.position.country.name,
            country_code: self.position.country.code,
            city: self.position.region.city,
            timezone_name: self.timezone.name,
            timezone_abbr: self.timezone.abbr,
            timezone_offset: self.timezone.offset,
            is_dst: self.timezone.is_dst,
            arrival_delay_index: self.delay_index.arrivals,
            departure_delay_index: self.delay_index.departures,
            homepage: self.url.homepage,
        }
    }
}

/// `pluginData.weather` of the airport endpoint.
#[derive(Debug, Deserialize)]
pub struct FrAirportWeather {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub metar: Option<String>,
    #[serde(default)]
    pub flight: FrFlightCategory,
    #[serde(default)]
    pub sky: FrSky,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub time: Option<i64>,
    #[serde(default)]
    pub wind: FrWind,
    #[serde(default)]
    pub temp: FrCelsius,
    #[serde(default)]
    pub dewpoint: FrCelsius,
    #[serde(default)]
    pub pressure: FrPressure,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub humidity: Option<i64>,
    #[serde(default)]
    pub elevation: FrElevation,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrFlightCategory {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrSky {
    #[serde(default)]
    pub condition: FrSkyCondition,
    #[serde(default)]
    pub visibility: FrVisibility,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrSkyCondition {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrVisibility {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub km: Option<f64>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub nmi: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrWind {
    #[serde(default)]
    pub speed: FrWindSpeed,
    #[serde(default)]
    pub direction: FrWindDirection,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrWindSpeed {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub kmh: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrWindDirection {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub degree: Option<i64>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrCelsius {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub celsius: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrPressure {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub hpa: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrElevation {
    #[serde(default, deserialize_with = "none_sentinel")]
    pub m: Option<f64>,
}

impl FrAirportWeather {
    pub fn into_record(self) -> WeatherRecord {
        WeatherRecord {
            flight_category: self.flight.category,
            metar: self.metar,
            sky_condition: self.sky.condition.text,
            visibility: Visibility::normalize(self.sky.visibility.km, self.sky.visibility.nmi),
            observed: self.time,
            wind_speed_kmh: self.wind.speed.kmh,
            wind_direction_deg: self.wind.direction.degree,
            wind_direction: self.wind.direction.text,
            temperature_c: self.temp.celsius,
            dewpoint_c: self.dewpoint.celsius,
            pressure_hpa: self.pressure.hpa,
            humidity_pct: self.humidity,
            elevation_m: self.elevation.m,
        }
    }
}

/// One row of the global airport index.
#[derive(Debug, Deserialize)]
pub struct FrAirportRow {
    pub name: String,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub iata: Option<String>,
    #[serde(default, deserialize_with = "none_sentinel")]
    pub country: Option<String>,
}

impl FrAirportRow {
    /// Project into a listing if the row belongs to `country`. Rows without
    /// an IATA code are skipped; they cannot be queried with this tool.
    pub fn into_listing(self, country: &str) -> Option<AirportListing> {
        if self.country.as_deref() != Some(country) {
            return None;
        }
        self.iata.map(|iata| AirportListing { iata, name: self.name })
    }
}
