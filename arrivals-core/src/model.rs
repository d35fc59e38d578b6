//! Shared domain models: the query built from the command line and the
//! request-scoped records projected out of the flight data API responses.
//!
//! Absence is always `Option`; the collaborator's `"None"` string sentinel is
//! decoded away at the wire boundary and never reaches these types.

use serde::{Deserialize, Serialize};

/// What the invocation asked for. One variant per query mode, each carrying
/// the parameters that mode requires, so dispatch cannot be reached with a
/// missing airport or country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    Arrivals { airport: String },
    Departures { airport: String },
    AirportList { country: String },
    AirportInfo { airport: String },
    Metar { airport: String },
    DirectFlights { from: String, to: String },
}

/// Debug dump level selected with `-j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Off,
    /// Print the first raw record of the primary response, then stop.
    FirstRecord,
    /// Print the entire raw response, then render normally.
    FullResponse,
}

/// API credentials for the optional scoped session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Immutable query value, constructed once from the argument vector.
/// Country names inside the mode are already normalized.
#[derive(Debug, Clone)]
pub struct Query {
    pub mode: QueryMode,
    /// Result cap, applies to Arrivals/Departures.
    pub limit: Option<u32>,
    pub debug: DebugLevel,
}

/// One row of an Arrivals/Departures/DirectFlights table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    pub callsign: Option<String>,
    pub flight_number: Option<String>,
    /// Origin (arrivals) or destination (departures, direct flights) IATA code.
    pub counterpart: Option<String>,
    /// Scheduled time, epoch seconds.
    pub scheduled: Option<i64>,
    /// Estimated time, epoch seconds.
    pub estimated: Option<i64>,
    pub airline: Option<String>,
    pub status: String,
    /// Aircraft model, populated for direct flights only.
    pub aircraft: Option<String>,
}

/// One `{iata, name}` pair of the AirportList mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportListing {
    pub iata: String,
    pub name: String,
}

/// Airport metadata of the AirportInfo mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportRecord {
    pub icao: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level. Filled in from the weather payload, which
    /// reports it in meters rather than feet.
    pub elevation_m: Option<f64>,
    pub country: String,
    pub country_code: String,
    pub city: String,
    pub timezone_name: String,
    pub timezone_abbr: String,
    /// Signed offset from UTC in seconds.
    pub timezone_offset: i64,
    pub is_dst: bool,
    pub arrival_delay_index: Option<f64>,
    pub departure_delay_index: Option<f64>,
    pub homepage: Option<String>,
}

/// Visibility reading with the unit fallback already applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    Known { value: f64, unit: VisibilityUnit },
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityUnit {
    Kilometers,
    NauticalMiles,
}

impl VisibilityUnit {
    pub fn label(&self) -> &'static str {
        match self {
            VisibilityUnit::Kilometers => "km",
            VisibilityUnit::NauticalMiles => "nmi",
        }
    }
}

impl Visibility {
    /// The API sometimes reports an absent km reading, and sometimes an
    /// overflowed one (a statute-mile conversion artifact). Anything above
    /// 100000 km is treated as invalid and the nautical-mile reading is used
    /// instead.
    pub fn normalize(km: Option<f64>, nmi: Option<f64>) -> Self {
        match km {
            None => Visibility::Unknown,
            Some(v) if v > 100_000.0 => match nmi {
                Some(n) => Visibility::Known { value: n, unit: VisibilityUnit::NauticalMiles },
                None => Visibility::Unknown,
            },
            Some(v) => Visibility::Known { value: v, unit: VisibilityUnit::Kilometers },
        }
    }
}

/// Decoded weather observation for an airport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Aviation flight category, e.g. "VFR".
    pub flight_category: Option<String>,
    /// Raw METAR text as reported by the airport.
    pub metar: Option<String>,
    pub sky_condition: Option<String>,
    pub visibility: Visibility,
    /// Observation time, epoch seconds.
    pub observed: Option<i64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<i64>,
    pub wind_direction: Option<String>,
    pub temperature_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub humidity_pct: Option<i64>,
    pub elevation_m: Option<f64>,
}
