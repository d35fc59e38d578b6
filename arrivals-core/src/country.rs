//! Country name normalization.
//!
//! The flight data API indexes airports by full English country name. A few
//! common short forms are rewritten before dispatch; the bare token "United"
//! is ambiguous and rejected outright.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountryError {
    #[error("United What? You can also use: US, USA, UK, UAE")]
    Ambiguous,
}

/// Rewrite known ambiguous short forms to the canonical country name.
/// Everything else passes through unchanged; matching against the API's
/// country vocabulary (including case) is the caller's problem.
pub fn normalize(name: &str) -> Result<String, CountryError> {
    match name {
        "US" | "USA" => Ok("United States".to_string()),
        "UK" => Ok("United Kingdom".to_string()),
        "UAE" => Ok("United Arab Emirates".to_string()),
        "United" => Err(CountryError::Ambiguous),
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_forms_expand() {
        assert_eq!(normalize("US").unwrap(), "United States");
        assert_eq!(normalize("USA").unwrap(), "United States");
        assert_eq!(normalize("UK").unwrap(), "United Kingdom");
        assert_eq!(normalize("UAE").unwrap(), "United Arab Emirates");
    }

    #[test]
    fn united_alone_is_ambiguous() {
        assert_eq!(normalize("United"), Err(CountryError::Ambiguous));
    }

    #[test]
    fn other_names_pass_through() {
        assert_eq!(normalize("Norway").unwrap(), "Norway");
        assert_eq!(normalize("United States").unwrap(), "United States");
        // Case is not corrected here.
        assert_eq!(normalize("norway").unwrap(), "norway");
    }
}
