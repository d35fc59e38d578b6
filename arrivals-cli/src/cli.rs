use std::io::{self, Write};

use anyhow::bail;
use clap::{ArgAction, ArgGroup, Parser};

use arrivals_core::{
    Credentials, DebugLevel, FlightRadarClient, Query, QueryMode, country, with_session,
};

use crate::report::{self, Style};

const SELF_THROTTLE_NOTE: &str = "\
 --- IMPORTANT! -----------------------------------------------
   \u{2022} All times shown are in the timezone of your computer!
   \u{2022} Do not attempt to run these queries in rapid succession,
     as your IP might get blocked by the API providers.
 --------------------------------------------------------------";

/// Top-level CLI struct. At most one query flag may be given; a bare
/// positional IATA code means arrivals.
#[derive(Debug, Parser)]
#[command(
    name = "arrivals",
    version,
    about = "Show current arrivals and departures for an airport given its IATA code",
    disable_version_flag = true,
    after_help = SELF_THROTTLE_NOTE,
    group = ArgGroup::new("query")
        .args(["airport", "departures", "info", "list", "metar", "direct"]),
)]
pub struct Cli {
    /// Airport IATA code; shows arrivals (the default mode)
    #[arg(value_name = "IATA")]
    pub airport: Option<String>,

    /// Show departures instead of arrivals
    #[arg(short = 'd', value_name = "IATA")]
    pub departures: Option<String>,

    /// Only show N flights (arrivals/departures)
    #[arg(short = 'n', value_name = "N")]
    pub limit: Option<u32>,

    /// Show detailed information and a weather report for an airport
    #[arg(short = 'i', value_name = "IATA")]
    pub info: Option<String>,

    /// Debug level: 1 prints the first raw record, 2 the full JSON response
    #[arg(short = 'j', value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(1..=2))]
    pub debug: Option<u8>,

    /// List all available airport IATA codes for a country
    #[arg(short = 'l', value_name = "COUNTRY")]
    pub list: Option<String>,

    /// Show the last hour's METAR report for an airport
    #[arg(short = 'm', value_name = "IATA")]
    pub metar: Option<String>,

    /// Show direct flights between two airports
    #[arg(short = 'x', value_names = ["IATA1", "IATA2"], num_args = 2)]
    pub direct: Option<Vec<String>>,

    /// Use API credentials
    #[arg(short = 'a', value_names = ["EMAIL", "PASSWORD"], num_args = 2)]
    pub credentials: Option<Vec<String>>,

    /// Print license and maintenance URL, then exit
    #[arg(short = 'c')]
    pub copyright: bool,

    /// Print program version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    /// Build the immutable query value. Country short forms are normalized
    /// here, so an ambiguous name never reaches dispatch.
    pub fn to_query(&self) -> anyhow::Result<Query> {
        let debug = match self.debug {
            None => DebugLevel::Off,
            Some(1) => DebugLevel::FirstRecord,
            Some(_) => DebugLevel::FullResponse,
        };

        let mode = if let Some(pair) = &self.direct {
            QueryMode::DirectFlights { from: pair[0].to_uppercase(), to: pair[1].to_uppercase() }
        } else if let Some(code) = &self.metar {
            QueryMode::Metar { airport: code.to_uppercase() }
        } else if let Some(name) = &self.list {
            QueryMode::AirportList { country: country::normalize(name)? }
        } else if let Some(code) = &self.info {
            QueryMode::AirportInfo { airport: code.clone() }
        } else if let Some(code) = &self.departures {
            QueryMode::Departures { airport: code.clone() }
        } else if let Some(code) = &self.airport {
            QueryMode::Arrivals { airport: code.clone() }
        } else {
            bail!(
                "No airport IATA code or country name given.\n\
                 Run `arrivals --help` for usage."
            );
        };

        Ok(Query { mode, limit: self.limit, debug })
    }

    fn session_credentials(&self) -> Option<Credentials> {
        self.credentials
            .as_ref()
            .map(|pair| Credentials { email: pair[0].clone(), password: pair[1].clone() })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if self.copyright {
            println!("\nProgram License:  GPLv3");
            println!("Maintenance URL:  https://github.com/E3V3A/iata-arrivals-cli");
            return Ok(());
        }

        let query = self.to_query()?;
        let credentials = self.session_credentials();

        let client = FlightRadarClient::new()?;
        let fetched = with_session(&client, credentials.as_ref(), &query).await?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        let style = Style::detect();

        match query.debug {
            DebugLevel::FirstRecord => {
                // Dump the first raw record and stop; nothing is rendered.
                report::dump_first_record(&mut out, &fetched.raw)?;
                return Ok(());
            }
            DebugLevel::FullResponse => report::dump_response(&mut out, &fetched.raw)?,
            DebugLevel::Off => {}
        }

        report::render(&mut out, &style, &query, &fetched.data)?;
        writeln!(out, "\nDone!")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).expect("arguments should parse")
    }

    #[test]
    fn bare_code_means_arrivals() {
        let query = parse(&["arrivals", "OSL"]).to_query().unwrap();
        assert_eq!(query.mode, QueryMode::Arrivals { airport: "OSL".to_string() });
        assert_eq!(query.limit, None);
        assert_eq!(query.debug, DebugLevel::Off);
    }

    #[test]
    fn departures_with_limit() {
        let query = parse(&["arrivals", "-d", "CPH", "-n", "5"]).to_query().unwrap();
        assert_eq!(query.mode, QueryMode::Departures { airport: "CPH".to_string() });
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn metar_code_is_uppercased() {
        let query = parse(&["arrivals", "-m", "osl"]).to_query().unwrap();
        assert_eq!(query.mode, QueryMode::Metar { airport: "OSL".to_string() });
    }

    #[test]
    fn direct_flights_take_two_codes() {
        let query = parse(&["arrivals", "-x", "OSL", "IST"]).to_query().unwrap();
        assert_eq!(
            query.mode,
            QueryMode::DirectFlights { from: "OSL".to_string(), to: "IST".to_string() }
        );
    }

    #[test]
    fn direct_codes_are_uppercased() {
        let query = parse(&["arrivals", "-x", "osl", "agp"]).to_query().unwrap();
        assert_eq!(
            query.mode,
            QueryMode::DirectFlights { from: "OSL".to_string(), to: "AGP".to_string() }
        );
    }

    #[test]
    fn country_short_form_is_normalized_before_dispatch() {
        let query = parse(&["arrivals", "-l", "US"]).to_query().unwrap();
        assert_eq!(query.mode, QueryMode::AirportList { country: "United States".to_string() });
    }

    #[test]
    fn ambiguous_country_never_becomes_a_query() {
        let err = parse(&["arrivals", "-l", "United"]).to_query().unwrap_err();
        assert!(err.to_string().contains("United What?"));
    }

    #[test]
    fn debug_levels_map() {
        let q1 = parse(&["arrivals", "-j", "1", "OSL"]).to_query().unwrap();
        assert_eq!(q1.debug, DebugLevel::FirstRecord);
        let q2 = parse(&["arrivals", "-j", "2", "OSL"]).to_query().unwrap();
        assert_eq!(q2.debug, DebugLevel::FullResponse);
    }

    #[test]
    fn debug_level_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["arrivals", "-j", "3", "OSL"]).is_err());
    }

    #[test]
    fn two_query_flags_conflict() {
        assert!(Cli::try_parse_from(["arrivals", "-d", "CPH", "-m", "OSL"]).is_err());
        assert!(Cli::try_parse_from(["arrivals", "OSL", "-i", "CPH"]).is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["arrivals", "-z", "OSL"]).is_err());
    }

    #[test]
    fn flag_only_invocation_errors_instead_of_panicking() {
        let err = parse(&["arrivals", "-j", "1"]).to_query().unwrap_err();
        assert!(err.to_string().contains("No airport IATA code"));
    }

    #[test]
    fn credentials_pair_builds_a_session() {
        let cli = parse(&["arrivals", "-a", "me@example.com", "hunter2", "OSL"]);
        let creds = cli.session_credentials().unwrap();
        assert_eq!(creds.email, "me@example.com");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn no_credentials_means_no_session() {
        assert!(parse(&["arrivals", "OSL"]).session_credentials().is_none());
    }
}
