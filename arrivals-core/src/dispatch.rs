//! Query dispatch: one API call per mode (two for AirportInfo), wrapped in an
//! optional login/logout session.

use log::warn;

use crate::client::{ApiError, Fetched, FlightDataApi};
use crate::model::{
    AirportListing, AirportRecord, Credentials, FlightRecord, Query, QueryMode, WeatherRecord,
};

/// Mode-shaped result of a dispatched query, matched exhaustively by the
/// renderer.
#[derive(Debug)]
pub enum Report {
    Flights(Vec<FlightRecord>),
    Airports(Vec<AirportListing>),
    AirportInfo { airport: Box<AirportRecord>, weather: Box<WeatherRecord> },
    Weather(Box<WeatherRecord>),
}

/// Issue the API call(s) for `query`. Control flows strictly forward: no
/// retries, every error is terminal for the invocation.
pub async fn dispatch(
    api: &dyn FlightDataApi,
    query: &Query,
) -> Result<Fetched<Report>, ApiError> {
    match &query.mode {
        QueryMode::Arrivals { airport } => {
            let fetched = api.airport_arrivals(airport, query.limit).await?;
            Ok(Fetched { raw: fetched.raw, data: Report::Flights(fetched.data) })
        }
        QueryMode::Departures { airport } => {
            let fetched = api.airport_departures(airport, query.limit).await?;
            Ok(Fetched { raw: fetched.raw, data: Report::Flights(fetched.data) })
        }
        QueryMode::AirportList { country } => {
            let fetched = api.airports(country).await?;
            Ok(Fetched { raw: fetched.raw, data: Report::Airports(fetched.data) })
        }
        QueryMode::AirportInfo { airport } => {
            let details = api.airport_details(airport).await?;
            let weather = api.airport_weather(airport).await?;

            // The details endpoint reports elevation in feet; the weather
            // payload has the meters reading the report shows.
            let mut record = details.data;
            record.elevation_m = weather.data.elevation_m;

            Ok(Fetched {
                raw: details.raw,
                data: Report::AirportInfo {
                    airport: Box::new(record),
                    weather: Box::new(weather.data),
                },
            })
        }
        QueryMode::Metar { airport } => {
            let fetched = api.airport_weather(airport).await?;
            Ok(Fetched { raw: fetched.raw, data: Report::Weather(Box::new(fetched.data)) })
        }
        QueryMode::DirectFlights { from, to } => {
            let fetched = api.flights_between(from, to).await?;
            Ok(Fetched { raw: fetched.raw, data: Report::Flights(fetched.data) })
        }
    }
}

/// Run `dispatch` inside a scoped session when credentials are supplied:
/// login first, logout afterwards even when the query failed. A failed
/// logout is logged and never masks the query result.
pub async fn with_session(
    api: &dyn FlightDataApi,
    credentials: Option<&Credentials>,
    query: &Query,
) -> Result<Fetched<Report>, ApiError> {
    if let Some(creds) = credentials {
        api.login(creds).await?;
    }

    let result = dispatch(api, query).await;

    if credentials.is_some() {
        if let Err(e) = api.logout().await {
            warn!("logout after query failed: {e}");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DebugLevel, Visibility};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn flight(callsign: &str) -> FlightRecord {
        FlightRecord {
            callsign: Some(callsign.to_string()),
            flight_number: Some(callsign.to_string()),
            counterpart: Some("WAW".to_string()),
            scheduled: Some(1_515_331_200),
            estimated: Some(1_515_330_560),
            airline: Some("Nordica".to_string()),
            status: "Scheduled".to_string(),
            aircraft: None,
        }
    }

    fn weather(elevation_m: Option<f64>) -> WeatherRecord {
        WeatherRecord {
            flight_category: Some("VFR".to_string()),
            metar: Some("ENGM 211550Z 18009KT 9999 BKN032 01/M02 Q1013".to_string()),
            sky_condition: Some("Broken clouds".to_string()),
            visibility: Visibility::Unknown,
            observed: Some(1_515_331_200),
            wind_speed_kmh: Some(16.7),
            wind_direction_deg: Some(180),
            wind_direction: Some("South".to_string()),
            temperature_c: Some(1.0),
            dewpoint_c: Some(-2.0),
            pressure_hpa: Some(1013.0),
            humidity_pct: Some(80),
            elevation_m,
        }
    }

    fn airport() -> AirportRecord {
        AirportRecord {
            icao: "ENGM".to_string(),
            name: "Oslo Gardermoen Airport".to_string(),
            latitude: 60.193901,
            longitude: 11.1004,
            elevation_m: None,
            country: "Norway".to_string(),
            country_code: "NO".to_string(),
            city: "Oslo".to_string(),
            timezone_name: "Europe/Oslo".to_string(),
            timezone_abbr: "CET".to_string(),
            timezone_offset: 3600,
            is_dst: false,
            arrival_delay_index: Some(1.2),
            departure_delay_index: None,
            homepage: None,
        }
    }

    /// Records every call; optionally fails the details lookup.
    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<String>>,
        details_not_found: bool,
    }

    impl MockApi {
        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FlightDataApi for MockApi {
        async fn airport_arrivals(
            &self,
            code: &str,
            limit: Option<u32>,
        ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
            self.log(format!("arrivals:{code}:{limit:?}"));
            Ok(Fetched {
                raw: json!([{}, {}, {}]),
                data: vec![flight("LOT779"), flight("SAS4012"), flight("DY1054")],
            })
        }

        async fn airport_departures(
            &self,
            code: &str,
            limit: Option<u32>,
        ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
            self.log(format!("departures:{code}:{limit:?}"));
            Ok(Fetched { raw: json!([{}]), data: vec![flight("SAS4012")] })
        }

        async fn airports(
            &self,
            country: &str,
        ) -> Result<Fetched<Vec<AirportListing>>, ApiError> {
            self.log(format!("airports:{country}"));
            Ok(Fetched {
                raw: json!([{}]),
                data: vec![AirportListing {
                    iata: "OSL".to_string(),
                    name: "Oslo Gardermoen Airport".to_string(),
                }],
            })
        }

        async fn airport_details(&self, code: &str) -> Result<Fetched<AirportRecord>, ApiError> {
            self.log(format!("details:{code}"));
            if self.details_not_found {
                return Err(ApiError::AirportNotFound(code.to_string()));
            }
            Ok(Fetched { raw: json!({}), data: airport() })
        }

        async fn airport_weather(&self, code: &str) -> Result<Fetched<WeatherRecord>, ApiError> {
            self.log(format!("weather:{code}"));
            Ok(Fetched { raw: json!({}), data: weather(Some(208.0)) })
        }

        async fn flights_between(
            &self,
            from: &str,
            to: &str,
        ) -> Result<Fetched<Vec<FlightRecord>>, ApiError> {
            self.log(format!("between:{from}:{to}"));
            Ok(Fetched { raw: json!([{}]), data: vec![flight("DY1054")] })
        }

        async fn login(&self, _credentials: &Credentials) -> Result<(), ApiError> {
            self.log("login");
            Ok(())
        }

        async fn logout(&self) -> Result<(), ApiError> {
            self.log("logout");
            Ok(())
        }
    }

    fn query(mode: QueryMode) -> Query {
        Query { mode, limit: None, debug: DebugLevel::Off }
    }

    #[tokio::test]
    async fn arrivals_keep_api_order() {
        let api = MockApi::default();
        let q = query(QueryMode::Arrivals { airport: "OSL".to_string() });

        let fetched = dispatch(&api, &q).await.unwrap();
        match fetched.data {
            Report::Flights(rows) => {
                let ids: Vec<_> =
                    rows.iter().map(|r| r.callsign.as_deref().unwrap()).collect();
                assert_eq!(ids, ["LOT779", "SAS4012", "DY1054"]);
            }
            other => panic!("expected flights, got {other:?}"),
        }
        assert_eq!(api.calls(), ["arrivals:OSL:None"]);
    }

    #[tokio::test]
    async fn limit_is_forwarded_to_the_api() {
        let api = MockApi::default();
        let q = Query {
            mode: QueryMode::Departures { airport: "CPH".to_string() },
            limit: Some(5),
            debug: DebugLevel::Off,
        };

        dispatch(&api, &q).await.unwrap();
        assert_eq!(api.calls(), ["departures:CPH:Some(5)"]);
    }

    #[tokio::test]
    async fn airport_info_issues_both_calls_and_merges_elevation() {
        let api = MockApi::default();
        let q = query(QueryMode::AirportInfo { airport: "OSL".to_string() });

        let fetched = dispatch(&api, &q).await.unwrap();
        match fetched.data {
            Report::AirportInfo { airport, weather } => {
                assert_eq!(airport.elevation_m, Some(208.0));
                assert_eq!(weather.flight_category.as_deref(), Some("VFR"));
            }
            other => panic!("expected airport info, got {other:?}"),
        }
        assert_eq!(api.calls(), ["details:OSL", "weather:OSL"]);
    }

    #[tokio::test]
    async fn airport_info_not_found_skips_weather() {
        let api = MockApi { details_not_found: true, ..Default::default() };
        let q = query(QueryMode::AirportInfo { airport: "XXX".to_string() });

        let err = dispatch(&api, &q).await.unwrap_err();
        assert!(matches!(err, ApiError::AirportNotFound(_)));
        assert_eq!(api.calls(), ["details:XXX"]);
    }

    #[tokio::test]
    async fn session_brackets_the_query() {
        let api = MockApi::default();
        let q = query(QueryMode::Metar { airport: "OSL".to_string() });
        let creds = Credentials { email: "a@b.c".to_string(), password: "pw".to_string() };

        with_session(&api, Some(&creds), &q).await.unwrap();
        assert_eq!(api.calls(), ["login", "weather:OSL", "logout"]);
    }

    #[tokio::test]
    async fn session_logs_out_even_on_error() {
        let api = MockApi { details_not_found: true, ..Default::default() };
        let q = query(QueryMode::AirportInfo { airport: "XXX".to_string() });
        let creds = Credentials { email: "a@b.c".to_string(), password: "pw".to_string() };

        let err = with_session(&api, Some(&creds), &q).await.unwrap_err();
        assert!(matches!(err, ApiError::AirportNotFound(_)));
        assert_eq!(api.calls(), ["login", "details:XXX", "logout"]);
    }

    #[tokio::test]
    async fn no_session_calls_without_credentials() {
        let api = MockApi::default();
        let q = query(QueryMode::AirportList { country: "Norway".to_string() });

        with_session(&api, None, &q).await.unwrap();
        assert_eq!(api.calls(), ["airports:Norway"]);
    }
}
