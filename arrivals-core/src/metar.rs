//! METAR decoding: turn a raw routine weather observation into a structured
//! report with a human-readable summary.
//!
//! The decoder is deliberately forgiving. METARs in the wild carry national
//! quirks and trailing remark sections; anything this parser does not
//! recognize lands verbatim in `remarks` instead of failing the report.
//!
//! Not for operational use; the upstream observation may be stale.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetarError {
    #[error("empty METAR report")]
    Empty,
    #[error("METAR report has no station identifier")]
    NoStation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    Degrees(u32),
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    Knots,
    MetersPerSecond,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub direction: WindDirection,
    pub speed: u32,
    pub gust: Option<u32>,
    pub unit: SpeedUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetarVisibility {
    Meters(u32),
    StatuteMiles(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
    Vicinity,
}

impl Intensity {
    fn label(&self) -> &'static str {
        match self {
            Intensity::Light => "Light",
            Intensity::Moderate => "Moderate",
            Intensity::Heavy => "Heavy",
            Intensity::Vicinity => "In vicinity:",
        }
    }
}

/// A decoded present-weather group, e.g. `-SHRA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phenomenon {
    pub intensity: Intensity,
    pub description: String,
}

impl fmt::Display for Phenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.intensity.label(), self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudCover {
    Few,
    Scattered,
    Broken,
    Overcast,
    VerticalVisibility,
    Clear,
}

impl CloudCover {
    fn label(&self) -> &'static str {
        match self {
            CloudCover::Few => "Few",
            CloudCover::Scattered => "Scattered",
            CloudCover::Broken => "Broken",
            CloudCover::Overcast => "Overcast",
            CloudCover::VerticalVisibility => "Vertical visibility",
            CloudCover::Clear => "Clear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudLayer {
    pub cover: CloudCover,
    /// Base in feet above the field, absent for sky-clear groups.
    pub base_ft: Option<u32>,
    /// Convective suffix, `CB` or `TCU`.
    pub convective: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pressure {
    Hectopascals(u32),
    InchesOfMercury(f64),
}

/// Structured decoded METAR.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMetar {
    pub station: String,
    /// Day of month of the observation.
    pub day: Option<u32>,
    /// Observation time (hour, minute), UTC.
    pub time: Option<(u32, u32)>,
    pub wind: Option<Wind>,
    pub visibility: Option<MetarVisibility>,
    pub cavok: bool,
    pub weather: Vec<Phenomenon>,
    pub clouds: Vec<CloudLayer>,
    pub temperature_c: Option<i32>,
    pub dewpoint_c: Option<i32>,
    pub pressure: Option<Pressure>,
    /// Everything the decoder did not recognize, in report order.
    pub remarks: Vec<String>,
}

const DESCRIPTORS: &[(&str, &str)] = &[
    ("MI", "Shallow"),
    ("BC", "Patches of"),
    ("PR", "Partial"),
    ("DR", "Drifting"),
    ("BL", "Blowing"),
    ("SH", "Showers of"),
    ("TS", "Thunderstorm with"),
    ("FZ", "Freezing"),
];

const PHENOMENA: &[(&str, &str)] = &[
    ("DZ", "Drizzle"),
    ("RA", "Rain"),
    ("SN", "Snow"),
    ("SG", "Snow Grains"),
    ("IC", "Ice Crystals"),
    ("PL", "Ice Pellets"),
    ("GR", "Hail"),
    ("GS", "Small Hail"),
    ("UP", "Unknown Precipitation"),
    ("BR", "Mist"),
    ("FG", "Fog"),
    ("FU", "Smoke"),
    ("VA", "Volcanic Ash"),
    ("DU", "Widespread Dust"),
    ("SA", "Sand"),
    ("HZ", "Haze"),
    ("PY", "Spray"),
    ("PO", "Dust Whirls"),
    ("SQ", "Squall"),
    ("FC", "Funnel Cloud"),
    ("SS", "Sandstorm"),
    ("DS", "Duststorm"),
];

impl DecodedMetar {
    pub fn parse(raw: &str) -> Result<Self, MetarError> {
        let mut tokens = raw.split_whitespace().peekable();

        // Optional report-type prefix.
        while matches!(tokens.peek(), Some(&"METAR") | Some(&"SPECI")) {
            tokens.next();
        }

        let station = tokens
            .next()
            .filter(|t| t.len() == 4 && t.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or(if raw.trim().is_empty() { MetarError::Empty } else { MetarError::NoStation })?
            .to_string();

        let mut decoded = DecodedMetar {
            station,
            day: None,
            time: None,
            wind: None,
            visibility: None,
            cavok: false,
            weather: Vec::new(),
            clouds: Vec::new(),
            temperature_c: None,
            dewpoint_c: None,
            pressure: None,
            remarks: Vec::new(),
        };

        let mut in_remarks = false;
        for token in tokens {
            if in_remarks || token == "RMK" {
                in_remarks = true;
                if token != "RMK" {
                    decoded.remarks.push(token.to_string());
                }
                continue;
            }
            if token == "AUTO" || token == "COR" || token == "NIL" {
                continue;
            }
            if token == "CAVOK" {
                decoded.cavok = true;
                continue;
            }
            if let Some((day, hh, mm)) = parse_day_time(token) {
                decoded.day = Some(day);
                decoded.time = Some((hh, mm));
            } else if let Some(wind) = parse_wind(token) {
                decoded.wind = Some(wind);
            } else if let Some(vis) = parse_visibility(token) {
                decoded.visibility = Some(vis);
            } else if let Some(layer) = parse_cloud(token) {
                decoded.clouds.push(layer);
            } else if let Some(wx) = parse_weather(token) {
                decoded.weather.push(wx);
            } else if let Some((t, d)) = parse_temp_dew(token) {
                decoded.temperature_c = t;
                decoded.dewpoint_c = d;
            } else if let Some(p) = parse_pressure(token) {
                decoded.pressure = Some(p);
            } else {
                decoded.remarks.push(token.to_string());
            }
        }

        Ok(decoded)
    }

    /// Multi-line human-readable report, one labeled line per decoded group.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Station:      {}", self.station)];

        if let (Some(day), Some((hh, mm))) = (self.day, self.time) {
            lines.push(format!("Observed:     day {day}, {hh:02}:{mm:02} UTC"));
        }

        if let Some(wind) = &self.wind {
            let unit = match wind.unit {
                SpeedUnit::Knots => "kt",
                SpeedUnit::MetersPerSecond => "m/s",
            };
            let dir = match wind.direction {
                WindDirection::Degrees(d) => format!("{d}\u{00b0}"),
                WindDirection::Variable => "variable".to_string(),
            };
            let gust = match wind.gust {
                Some(g) => format!(", gusting {g} {unit}"),
                None => String::new(),
            };
            lines.push(format!("Wind:         {dir} at {} {unit}{gust}", wind.speed));
        }

        if self.cavok {
            lines.push("Visibility:   10 km or more, ceiling and visibility OK".to_string());
        } else if let Some(vis) = self.visibility {
            let text = match vis {
                MetarVisibility::Meters(9999) => "10 km or more".to_string(),
                MetarVisibility::Meters(m) => format!("{m} m"),
                MetarVisibility::StatuteMiles(sm) => format!("{sm} SM"),
            };
            lines.push(format!("Visibility:   {text}"));
        }

        for wx in &self.weather {
            lines.push(format!("Weather:      {wx}"));
        }

        for layer in &self.clouds {
            let mut text = layer.cover.label().to_string();
            if let Some(base) = layer.base_ft {
                text.push_str(&format!(" at {base} ft"));
            }
            if let Some(conv) = &layer.convective {
                let kind = if conv == "CB" { "cumulonimbus" } else { "towering cumulus" };
                text.push_str(&format!(" ({kind})"));
            }
            lines.push(format!("Clouds:       {text}"));
        }

        if let Some(t) = self.temperature_c {
            lines.push(format!("Temperature:  {t}\u{00b0}C"));
        }
        if let Some(d) = self.dewpoint_c {
            lines.push(format!("Dew point:    {d}\u{00b0}C"));
        }

        if let Some(p) = self.pressure {
            let text = match p {
                Pressure::Hectopascals(hpa) => format!("{hpa} hPa"),
                Pressure::InchesOfMercury(inhg) => format!("{inhg:.2} inHg"),
            };
            lines.push(format!("Pressure:     {text}"));
        }

        if !self.remarks.is_empty() {
            lines.push(format!("Remarks:      {}", self.remarks.join(" ")));
        }

        lines.join("\n")
    }
}

/// `DDHHMMZ` observation group.
fn parse_day_time(token: &str) -> Option<(u32, u32, u32)> {
    let digits = token.strip_suffix('Z')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits[0..2].parse().ok()?;
    let hh: u32 = digits[2..4].parse().ok()?;
    let mm: u32 = digits[4..6].parse().ok()?;
    ((1..=31).contains(&day) && hh < 24 && mm < 60).then_some((day, hh, mm))
}

/// `dddff(Gff)KT` or `VRBff(Gff)MPS`.
fn parse_wind(token: &str) -> Option<Wind> {
    let (body, unit) = if let Some(b) = token.strip_suffix("KT") {
        (b, SpeedUnit::Knots)
    } else if let Some(b) = token.strip_suffix("MPS") {
        (b, SpeedUnit::MetersPerSecond)
    } else {
        return None;
    };

    let (dir_part, rest) = body.split_at_checked(3)?;
    let direction = if dir_part == "VRB" {
        WindDirection::Variable
    } else {
        let deg: u32 = dir_part.parse().ok()?;
        if deg > 360 {
            return None;
        }
        WindDirection::Degrees(deg)
    };

    let (speed_part, gust_part) = match rest.split_once('G') {
        Some((s, g)) => (s, Some(g)),
        None => (rest, None),
    };
    let speed: u32 = speed_part.parse().ok()?;
    let gust = match gust_part {
        Some(g) => Some(g.parse().ok()?),
        None => None,
    };

    Some(Wind { direction, speed, gust, unit })
}

/// Four-digit meters, or `NNSM` / `N/MSM` statute miles.
fn parse_visibility(token: &str) -> Option<MetarVisibility> {
    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        return Some(MetarVisibility::Meters(token.parse().ok()?));
    }

    let body = token.strip_suffix("SM")?;
    let body = body.strip_prefix('M').unwrap_or(body); // "less than" prefix
    let miles = match body.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            num / den
        }
        None => body.parse().ok()?,
    };
    Some(MetarVisibility::StatuteMiles(miles))
}

fn parse_cloud(token: &str) -> Option<CloudLayer> {
    match token {
        "SKC" | "CLR" | "NSC" | "NCD" => {
            return Some(CloudLayer { cover: CloudCover::Clear, base_ft: None, convective: None });
        }
        _ => {}
    }

    let (cover, rest) = if let Some(r) = token.strip_prefix("FEW") {
        (CloudCover::Few, r)
    } else if let Some(r) = token.strip_prefix("SCT") {
        (CloudCover::Scattered, r)
    } else if let Some(r) = token.strip_prefix("BKN") {
        (CloudCover::Broken, r)
    } else if let Some(r) = token.strip_prefix("OVC") {
        (CloudCover::Overcast, r)
    } else if let Some(r) = token.strip_prefix("VV") {
        (CloudCover::VerticalVisibility, r)
    } else {
        return None;
    };

    let (height, convective) = rest.split_at_checked(3)?;
    if !height.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let convective = match convective {
        "" => None,
        "CB" | "TCU" => Some(convective.to_string()),
        _ => return None,
    };
    let base_ft = height.parse::<u32>().ok()? * 100;

    Some(CloudLayer { cover, base_ft: Some(base_ft), convective })
}

fn parse_weather(token: &str) -> Option<Phenomenon> {
    let (intensity, mut rest) = if let Some(r) = token.strip_prefix('+') {
        (Intensity::Heavy, r)
    } else if let Some(r) = token.strip_prefix('-') {
        (Intensity::Light, r)
    } else if let Some(r) = token.strip_prefix("VC") {
        (Intensity::Vicinity, r)
    } else {
        (Intensity::Moderate, token)
    };

    let mut parts: Vec<&'static str> = Vec::new();

    if let Some(&(_, text)) = DESCRIPTORS.iter().find(|(code, _)| rest.starts_with(code)) {
        parts.push(text);
        rest = &rest[2..];
    }

    while !rest.is_empty() {
        let &(code, text) = PHENOMENA.iter().find(|(code, _)| rest.starts_with(code))?;
        parts.push(text);
        rest = &rest[code.len()..];
    }

    // A lone descriptor ("TS", "SH") is not a weather group here.
    if !parts.iter().any(|p| PHENOMENA.iter().any(|&(_, t)| t == *p)) {
        return None;
    }

    Some(Phenomenon { intensity, description: parts.join(" ") })
}

/// `TT/DD` with `M` marking negatives; either side may be missing.
fn parse_temp_dew(token: &str) -> Option<(Option<i32>, Option<i32>)> {
    let (t, d) = token.split_once('/')?;

    fn side(s: &str) -> Option<Option<i32>> {
        if s.is_empty() {
            return Some(None);
        }
        let (neg, digits) = match s.strip_prefix('M') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let v: i32 = digits.parse().ok()?;
        Some(Some(if neg { -v } else { v }))
    }

    Some((side(t)?, side(d)?))
}

/// `Qhhhh` hectopascals or `Annnn` hundredths of inHg.
fn parse_pressure(token: &str) -> Option<Pressure> {
    if let Some(digits) = token.strip_prefix('Q') {
        if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(Pressure::Hectopascals(digits.parse().ok()?));
        }
    }
    if let Some(digits) = token.strip_prefix('A') {
        if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
            let hundredths: f64 = digits.parse().ok()?;
            return Some(Pressure::InchesOfMercury(hundredths / 100.0));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_european_report() {
        let m = DecodedMetar::parse("ENGM 211550Z 18009KT 9999 BKN032 01/M02 Q1013").unwrap();

        assert_eq!(m.station, "ENGM");
        assert_eq!(m.day, Some(21));
        assert_eq!(m.time, Some((15, 50)));
        assert_eq!(
            m.wind,
            Some(Wind {
                direction: WindDirection::Degrees(180),
                speed: 9,
                gust: None,
                unit: SpeedUnit::Knots
            })
        );
        assert_eq!(m.visibility, Some(MetarVisibility::Meters(9999)));
        assert_eq!(m.clouds.len(), 1);
        assert_eq!(m.clouds[0].cover, CloudCover::Broken);
        assert_eq!(m.clouds[0].base_ft, Some(3200));
        assert_eq!(m.temperature_c, Some(1));
        assert_eq!(m.dewpoint_c, Some(-2));
        assert_eq!(m.pressure, Some(Pressure::Hectopascals(1013)));
        assert!(m.remarks.is_empty());
    }

    #[test]
    fn decodes_a_us_report_with_remarks() {
        let m = DecodedMetar::parse(
            "METAR KJFK 161251Z 24008G18KT 10SM FEW250 28/17 A2992 RMK AO2 SLP132",
        )
        .unwrap();

        assert_eq!(m.station, "KJFK");
        assert_eq!(m.wind.unwrap().gust, Some(18));
        assert_eq!(m.visibility, Some(MetarVisibility::StatuteMiles(10.0)));
        assert_eq!(m.pressure, Some(Pressure::InchesOfMercury(29.92)));
        assert_eq!(m.remarks, ["AO2", "SLP132"]);
    }

    #[test]
    fn decodes_weather_groups() {
        let m = DecodedMetar::parse("EKCH 120950Z VRB03KT 2000 -SHRA BR OVC008 07/06 Q0998")
            .unwrap();

        assert_eq!(m.wind.unwrap().direction, WindDirection::Variable);
        assert_eq!(m.visibility, Some(MetarVisibility::Meters(2000)));
        assert_eq!(m.weather.len(), 2);
        assert_eq!(m.weather[0].intensity, Intensity::Light);
        assert_eq!(m.weather[0].description, "Showers of Rain");
        assert_eq!(m.weather[1].description, "Mist");
    }

    #[test]
    fn cavok_sets_the_flag() {
        let m = DecodedMetar::parse("LOWW 211550Z 27012KT CAVOK 15/08 Q1020").unwrap();
        assert!(m.cavok);
        assert_eq!(m.visibility, None);
        assert!(m.summary().contains("ceiling and visibility OK"));
    }

    #[test]
    fn fractional_statute_miles() {
        let m = DecodedMetar::parse("KSFO 040556Z 00000KT M1/4SM FG VV002 12/12 A3001").unwrap();
        assert_eq!(m.visibility, Some(MetarVisibility::StatuteMiles(0.25)));
        assert_eq!(m.clouds[0].cover, CloudCover::VerticalVisibility);
        assert_eq!(m.weather[0].description, "Fog");
    }

    #[test]
    fn unknown_tokens_go_to_remarks_not_errors() {
        let m = DecodedMetar::parse("ENGM 211550Z 18009KT 9999 WS12/RWY19R Q1013").unwrap();
        assert_eq!(m.remarks, ["WS12/RWY19R"]);
    }

    #[test]
    fn empty_and_garbage_reports_fail() {
        assert_eq!(DecodedMetar::parse(""), Err(MetarError::Empty));
        assert_eq!(
            DecodedMetar::parse("not a metar at all"),
            Err(MetarError::NoStation)
        );
    }

    #[test]
    fn summary_lists_decoded_groups() {
        let m = DecodedMetar::parse("ENGM 211550Z 18009KT 9999 BKN032CB 01/M02 Q1013").unwrap();
        let s = m.summary();

        assert!(s.contains("Station:      ENGM"));
        assert!(s.contains("180\u{00b0} at 9 kt"));
        assert!(s.contains("10 km or more"));
        assert!(s.contains("Broken at 3200 ft (cumulonimbus)"));
        assert!(s.contains("Temperature:  1\u{00b0}C"));
        assert!(s.contains("Dew point:    -2\u{00b0}C"));
        assert!(s.contains("1013 hPa"));
    }
}
