//! Terminal rendering: columnar tables for list modes, label/value reports
//! for airport info and METAR, with ANSI colorization of status fields.

use std::io::Write;

use anyhow::bail;
use serde_json::Value;

use arrivals_core::{
    AirportListing, AirportRecord, DecodedMetar, FlightRecord, Query, QueryMode, Report,
    Visibility, WeatherRecord, units,
};

const AIRLINE_WIDTH: usize = 24;
const SCHEDULE_STATUS_WIDTH: usize = 15;
const DIRECT_STATUS_WIDTH: usize = 19;
const AIRCRAFT_WIDTH: usize = 20;
const NAME_WIDTH: usize = 50;

/// ANSI styling with one switch for the whole report. Detection honors
/// NO_COLOR and dumb terminals; tests construct the explicit variants.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    colors: bool,
}

impl Style {
    pub fn detect() -> Self {
        let colors = std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").map(|t| !t.eq_ignore_ascii_case("dumb")).unwrap_or(true);
        Self { colors }
    }

    pub fn colored() -> Self {
        Self { colors: true }
    }

    pub fn plain() -> Self {
        Self { colors: false }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(text, "31")
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(text, "32")
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint(text, "33")
    }

    /// Colorize a flight status, truncated to `width` FIRST so the escape
    /// sequence can never be cut apart. "Scheduled" collapses to a dash.
    pub fn status(&self, status: &str, width: usize) -> String {
        let truncated: String = status.chars().take(width).collect();
        if truncated == "Scheduled" {
            return "-".to_string();
        }

        let lower = truncated.to_lowercase();
        if lower.contains("delayed") {
            self.yellow(&truncated)
        } else if lower.contains("canceled") {
            self.red(&truncated)
        } else if lower.contains("landed") {
            self.green(&truncated)
        } else {
            truncated
        }
    }
}

/// Placeholder for linked entities the API reported as absent.
fn dash(field: Option<&str>) -> &str {
    field.unwrap_or("---")
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", clip(text, width))
}

/// Render the report for the mode that produced it. The dispatcher
/// guarantees the shapes agree; a mismatch is a bug, not user error.
pub fn render(
    out: &mut impl Write,
    style: &Style,
    query: &Query,
    report: &Report,
) -> anyhow::Result<()> {
    match (&query.mode, report) {
        (QueryMode::Arrivals { airport }, Report::Flights(rows)) => {
            schedule_table(out, style, airport, "ARRIVALS", "From", rows)?;
        }
        (QueryMode::Departures { airport }, Report::Flights(rows)) => {
            schedule_table(out, style, airport, "DEPARTURES", "To", rows)?;
        }
        (QueryMode::AirportList { country }, Report::Airports(rows)) => {
            airport_table(out, country, rows)?;
        }
        (QueryMode::AirportInfo { airport }, Report::AirportInfo { airport: rec, weather }) => {
            info_report(out, style, airport, rec, weather)?;
        }
        (QueryMode::Metar { airport }, Report::Weather(weather)) => {
            metar_report(out, style, airport, weather)?;
        }
        (QueryMode::DirectFlights { from, to }, Report::Flights(rows)) => {
            direct_table(out, style, from, to, rows)?;
        }
        (mode, report) => bail!("query mode {mode:?} and report shape {report:?} disagree"),
    }
    Ok(())
}

fn schedule_table(
    out: &mut impl Write,
    style: &Style,
    airport: &str,
    title: &str,
    counterpart_label: &str,
    rows: &[FlightRecord],
) -> anyhow::Result<()> {
    let header = format!(
        "ID\t Flight\t {counterpart_label}\t Sched\t ETA\t {}\t {}",
        pad("Airline", AIRLINE_WIDTH),
        pad("Status", SCHEDULE_STATUS_WIDTH)
    );
    // Tabs expand to four spaces on the typical terminal.
    let width = header.len() + 6 * 4;

    writeln!(out, "\nNOTE: All times shown are in the timezone of your computer!\n")?;
    writeln!(out, "{airport} {title}:")?;
    writeln!(out, "{}", "-".repeat(width))?;
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(width))?;

    for row in rows {
        writeln!(
            out,
            "{}\t {}\t {}\t {}\t {}\t {}\t {}",
            dash(row.callsign.as_deref()),
            dash(row.flight_number.as_deref()),
            dash(row.counterpart.as_deref()),
            units::short_time(row.scheduled),
            units::short_time(row.estimated),
            pad(dash(row.airline.as_deref()), AIRLINE_WIDTH),
            style.status(&row.status, SCHEDULE_STATUS_WIDTH),
        )?;
    }
    writeln!(out, "{}", "-".repeat(width))?;

    Ok(())
}

fn airport_table(
    out: &mut impl Write,
    country: &str,
    rows: &[AirportListing],
) -> anyhow::Result<()> {
    let header = format!("IATA\t {}", pad("Airport Name", NAME_WIDTH));
    let width = header.len() + 4;

    writeln!(out, "\nAIRPORTS in {country}")?;
    writeln!(out, "{}", "-".repeat(width))?;
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(width))?;

    for row in rows {
        writeln!(out, "{}\t {}", row.iata, pad(&row.name, NAME_WIDTH))?;
    }
    writeln!(out, "{}", "-".repeat(width))?;

    Ok(())
}

fn opt_num(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn info_report(
    out: &mut impl Write,
    style: &Style,
    airport: &str,
    rec: &AirportRecord,
    weather: &WeatherRecord,
) -> anyhow::Result<()> {
    let width = 76;

    writeln!(out, "\nAIRPORT INFO for {airport}")?;
    writeln!(out, "{}", "-".repeat(width))?;

    writeln!(out, "Name:\t\t\t{}", style.yellow(&pad(&rec.name, NAME_WIDTH)))?;
    writeln!(out, "ICAO:\t\t\t{}", rec.icao)?;
    writeln!(out, "(Lat,Lon) [degrees]:\t{},{}", rec.latitude, rec.longitude)?;
    writeln!(
        out,
        "Map URL:\t\thttps://www.latlong.net/c/?lat={}&long={}",
        rec.latitude, rec.longitude
    )?;
    writeln!(out, "Elevation [meters]:\t{}", opt_num(rec.elevation_m))?;
    writeln!(out, "Country (code):\t\t{} ({})", rec.country, rec.country_code)?;
    writeln!(out, "City:\t\t\t{}", rec.city)?;
    writeln!(out, "Delay Index Arrivals:\t{}", opt_num(rec.arrival_delay_index))?;
    writeln!(out, "Delay Index Departures:\t{}", opt_num(rec.departure_delay_index))?;
    writeln!(out, "TimeZone [name]:\t{}", rec.timezone_name)?;
    writeln!(out, "TimeZone [short]:\t{}", rec.timezone_abbr)?;
    writeln!(out, "TimeZone [offset]:\t{}", units::utc_offset(rec.timezone_offset))?;
    writeln!(out, "Daylight Saving Time:\t{}", rec.is_dst)?;
    writeln!(out, "Airport URL:\t\t{}", dash(rec.homepage.as_deref()))?;

    writeln!(out, "{}", "-".repeat(width))?;
    writeln!(out, "Weather Report @ {}", units::short_time(weather.observed))?;
    writeln!(out, "{}", "-".repeat(width))?;

    writeln!(out, "METAR:\t{}", style.green(dash(weather.metar.as_deref())))?;
    writeln!(out, "Nav Category:\t\t{}", dash(weather.flight_category.as_deref()))?;
    writeln!(out, "Sky Condition:\t\t{}", dash(weather.sky_condition.as_deref()))?;
    match weather.visibility {
        Visibility::Known { value, unit } => {
            writeln!(out, "Visibility [{}]:\t{:.1}", unit.label(), value)?;
        }
        Visibility::Unknown => writeln!(out, "Visibility [km]:\t-")?,
    }
    writeln!(
        out,
        "Wind:\t\t\t{} [km/h] {} ({}\u{00b0})",
        style.yellow(&opt_num(weather.wind_speed_kmh)),
        dash(weather.wind_direction.as_deref()),
        weather.wind_direction_deg.map_or_else(|| "-".to_string(), |d| d.to_string()),
    )?;
    writeln!(out, "Temperature [\u{00b0}C]:\t{}", opt_num(weather.temperature_c))?;
    writeln!(out, "Dew Point [\u{00b0}C]:\t\t{}", opt_num(weather.dewpoint_c))?;
    writeln!(out, "Pressure [mbar=hPa]:\t{}", opt_num(weather.pressure_hpa))?;
    writeln!(
        out,
        "Humidity [%]:\t\t{}",
        weather.humidity_pct.map_or_else(|| "-".to_string(), |h| h.to_string()),
    )?;
    writeln!(out, "{}", "-".repeat(width))?;

    Ok(())
}

fn metar_report(
    out: &mut impl Write,
    style: &Style,
    airport: &str,
    weather: &WeatherRecord,
) -> anyhow::Result<()> {
    let width = 80;

    writeln!(out, "\nMETAR INFO for {}", style.yellow(airport))?;
    writeln!(out, "{}", "-".repeat(width))?;

    let Some(raw) = weather.metar.as_deref() else {
        writeln!(out, "No METAR reported for {airport}.")?;
        writeln!(out, "{}", "-".repeat(width))?;
        return Ok(());
    };

    writeln!(out, "METAR: {}\n", style.green(raw))?;
    match DecodedMetar::parse(raw) {
        Ok(decoded) => writeln!(out, "{}", decoded.summary())?,
        Err(e) => writeln!(out, "Could not decode this METAR: {e}")?,
    }
    writeln!(out, "{}", "-".repeat(width))?;

    Ok(())
}

fn direct_table(
    out: &mut impl Write,
    style: &Style,
    from: &str,
    to: &str,
    rows: &[FlightRecord],
) -> anyhow::Result<()> {
    let header = format!(
        "{:<8}  {:<8} {:<16}  {:<5}  {} {} {}",
        "ID",
        "Flight",
        "Scheduled",
        "ETD",
        pad("Airline", AIRLINE_WIDTH),
        pad("Aircraft", AIRCRAFT_WIDTH),
        pad("Status", DIRECT_STATUS_WIDTH)
    );
    let width = header.len();

    writeln!(out, "\nNOTE: All times shown are in the timezone of your computer!\n")?;
    writeln!(out, "DEPARTURES from {} to {}", style.yellow(from), style.yellow(to))?;
    writeln!(out, "{}", "-".repeat(width))?;
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(width))?;

    for row in rows {
        writeln!(
            out,
            "{:<8}  {:<8} {:<16}  {:<5}  {} {} {}",
            dash(row.callsign.as_deref()),
            dash(row.flight_number.as_deref()),
            units::long_time(row.scheduled),
            units::short_time(row.estimated),
            pad(dash(row.airline.as_deref()), AIRLINE_WIDTH),
            pad(dash(row.aircraft.as_deref()), AIRCRAFT_WIDTH),
            style.status(&row.status, DIRECT_STATUS_WIDTH),
        )?;
    }
    writeln!(out, "{}", "-".repeat(width))?;

    Ok(())
}

/// `-j 1`: the first raw record of the primary response.
pub fn dump_first_record(out: &mut impl Write, raw: &Value) -> anyhow::Result<()> {
    let first = match raw {
        Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };
    writeln!(out, "Debug record:")?;
    writeln!(out, "{}", serde_json::to_string_pretty(&first)?)?;
    Ok(())
}

/// `-j 2`: the entire raw response, pretty-printed.
pub fn dump_response(out: &mut impl Write, raw: &Value) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(raw)?)?;
    Ok(())
}
