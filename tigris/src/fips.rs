//! FIPS code resolution for states and counties.
//!
//! States resolve against a bundled table of FIPS codes, postal
//! abbreviations and names. Counties have no bundled table; their names
//! are matched against the cartographic boundary counties layer for the
//! requested state, which the disk cache makes cheap after the first call.

use std::sync::OnceLock;

use tracing::info;

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::tiger::{TigerClient, TigerOptions};

const FIPS_TABLE: &str = include_str!("../internals/fips_codes.csv");

/// One state row from the bundled FIPS table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    /// Two-letter postal abbreviation, e.g. `TX`.
    pub abbrev: &'static str,
    /// Two-digit FIPS code, e.g. `48`.
    pub code: &'static str,
    /// Full name, e.g. `Texas`.
    pub name: &'static str,
}

/// All states, DC and the island territories, in FIPS order.
pub fn states() -> &'static [StateEntry] {
    static STATES: OnceLock<Vec<StateEntry>> = OnceLock::new();
    STATES.get_or_init(|| {
        FIPS_TABLE
            .lines()
            .skip(1)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut parts = line.splitn(3, ',');
                StateEntry {
                    abbrev: parts.next().unwrap_or(""),
                    code: parts.next().unwrap_or(""),
                    name: parts.next().unwrap_or(""),
                }
            })
            .collect()
    })
}

/// Resolves a state name, postal abbreviation, or FIPS code to the
/// two-digit FIPS code.
///
/// Numeric input is zero-padded and passed through unchecked, matching
/// how the Census Bureau's own tooling treats explicit codes.
pub fn validate_state(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::UnknownState(input.to_string()));
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format!("{:0>2}", trimmed));
    }

    if trimmed.len() == 2 {
        let upper = trimmed.to_ascii_uppercase();
        if let Some(entry) = states().iter().find(|s| s.abbrev == upper) {
            info!(state = entry.name, code = entry.code, "resolved state");
            return Ok(entry.code.to_string());
        }
    }

    if let Some(entry) = states()
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(trimmed))
    {
        info!(state = entry.name, code = entry.code, "resolved state");
        return Ok(entry.code.to_string());
    }

    Err(Error::UnknownState(input.to_string()))
}

/// Looks up the full name for a two-digit state FIPS code.
pub fn state_name(code: &str) -> Option<&'static str> {
    states().iter().find(|s| s.code == code).map(|s| s.name)
}

impl<C: HttpClient> TigerClient<C> {
    /// Resolves a county name or FIPS code to the three-digit county code.
    ///
    /// Numeric input is zero-padded and passed through. Names are matched
    /// as case-insensitive substrings against the state's counties layer;
    /// a name matching several counties is an error, so `"Collin"` works
    /// for Texas but `"Washington"` does not for Arkansas.
    pub fn validate_county(&self, state: &str, county: &str) -> Result<String> {
        let trimmed = county.trim();
        if trimmed.chars().all(|c| c.is_ascii_digit()) && !trimmed.is_empty() {
            return Ok(format!("{:0>3}", trimmed));
        }

        let state_code = validate_state(state)?;
        let counties = self.counties(Some(state), &TigerOptions::new().cb(true))?;

        let needle = trimmed.to_ascii_lowercase();
        let mut matches: Vec<(String, String)> = Vec::new();
        for row in 0..counties.len() {
            let name = counties.str_value(row, "NAME").unwrap_or("");
            if name.to_ascii_lowercase().contains(&needle) {
                let code = counties.str_value(row, "COUNTYFP").unwrap_or("").to_string();
                matches.push((code, name.to_string()));
            }
        }

        match matches.len() {
            0 => Err(Error::UnknownCounty {
                input: county.to_string(),
                state: state_code,
            }),
            1 => {
                let (code, name) = &matches[0];
                info!(county = %name, code = %code, "resolved county");
                Ok(code.clone())
            }
            _ => Err(Error::AmbiguousCounty {
                input: county.to_string(),
                matches: matches
                    .iter()
                    .map(|(_, name)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DiskCache;
    use crate::http::tests::MockHttpClient;
    use crate::shp::tests::character_archive;

    #[test]
    fn test_validate_state_postal() {
        assert_eq!(validate_state("TX").unwrap(), "48");
        assert_eq!(validate_state("tx").unwrap(), "48");
        assert_eq!(validate_state("DC").unwrap(), "11");
    }

    #[test]
    fn test_validate_state_name() {
        assert_eq!(validate_state("Texas").unwrap(), "48");
        assert_eq!(validate_state("new mexico").unwrap(), "35");
        assert_eq!(validate_state("Puerto Rico").unwrap(), "72");
    }

    #[test]
    fn test_validate_state_numeric_pads() {
        assert_eq!(validate_state("48").unwrap(), "48");
        assert_eq!(validate_state("8").unwrap(), "08");
    }

    #[test]
    fn test_validate_state_unknown() {
        assert!(matches!(
            validate_state("Atlantis"),
            Err(Error::UnknownState(_))
        ));
        assert!(matches!(validate_state(""), Err(Error::UnknownState(_))));
    }

    #[test]
    fn test_state_name() {
        assert_eq!(state_name("48"), Some("Texas"));
        assert_eq!(state_name("99"), None);
    }

    #[test]
    fn test_states_table_complete() {
        assert_eq!(states().len(), 57);
        assert_eq!(states()[0].abbrev, "AL");
        assert_eq!(states()[0].code, "01");
    }

    fn county_client() -> (tempfile::TempDir, TigerClient<MockHttpClient>) {
        let archive = character_archive(
            &["STATEFP", "COUNTYFP", "NAME"],
            &[
                (vec!["48", "453", "Travis"], (-97.7, 30.3)),
                (vec!["48", "201", "Harris"], (-95.4, 29.8)),
                (vec!["48", "021", "Bastrop"], (-97.3, 30.1)),
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let client = TigerClient::with_parts(
            MockHttpClient::with_routes(vec![("_county_".to_string(), archive)]),
            DiskCache::new(dir.path().join("cache")),
        );
        (dir, client)
    }

    #[test]
    fn test_validate_county_numeric_pads() {
        let (_dir, client) = county_client();
        assert_eq!(client.validate_county("TX", "21").unwrap(), "021");
        assert_eq!(client.validate_county("TX", "453").unwrap(), "453");
    }

    #[test]
    fn test_validate_county_by_name() {
        let (_dir, client) = county_client();
        assert_eq!(client.validate_county("TX", "Travis").unwrap(), "453");
        assert_eq!(client.validate_county("Texas", "harr").unwrap(), "201");
    }

    #[test]
    fn test_validate_county_ambiguous() {
        let (_dir, client) = county_client();
        // "a" is a substring of several county names.
        assert!(matches!(
            client.validate_county("TX", "a"),
            Err(Error::AmbiguousCounty { .. })
        ));
    }

    #[test]
    fn test_validate_county_unknown() {
        let (_dir, client) = county_client();
        assert!(matches!(
            client.validate_county("TX", "Narnia"),
            Err(Error::UnknownCounty { .. })
        ));
    }
}
