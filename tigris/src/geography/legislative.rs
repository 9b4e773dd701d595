//! Congressional, state legislative, and voting district layers.

use crate::error::{Error, Result};
use crate::fips::validate_state;
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{Resolution, TigerClient, TigerOptions, BASE_URL};

/// Chamber of a state legislature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum House {
    /// The upper chamber (the only one in unicameral Nebraska).
    #[default]
    Upper,
    /// The lower chamber.
    Lower,
}

impl House {
    fn token(self) -> &'static str {
        match self {
            House::Upper => "sldu",
            House::Lower => "sldl",
        }
    }
}

/// The Congress number whose districts a file year carries.
pub fn congress_for_year(year: u16) -> Result<&'static str> {
    match year {
        2010 => Ok("111"),
        2011 | 2012 => Ok("112"),
        2013 => Ok("113"),
        2014 | 2015 => Ok("114"),
        2016 | 2017 => Ok("115"),
        2018..=2022 => Ok("116"),
        2023 => Ok("118"),
        2024.. => Ok("119"),
        _ => Err(Error::Unavailable {
            dataset: "congressional districts",
            year,
        }),
    }
}

/// URL of the nationwide congressional districts file.
pub fn congressional_districts_url(year: u16, cb: bool, resolution: Resolution) -> Result<String> {
    if cb && year < 2013 {
        return Err(Error::Unavailable {
            dataset: "cartographic boundary congressional districts",
            year,
        });
    }
    let congress = congress_for_year(year)?;

    let url = if cb {
        if year == 2013 {
            format!(
                "{BASE_URL}/GENZ{year}/cb_{year}_us_cd{congress}_{}.zip",
                resolution.as_str()
            )
        } else {
            format!(
                "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_cd{congress}_{}.zip",
                resolution.as_str()
            )
        }
    } else {
        format!("{BASE_URL}/TIGER{year}/CD/tl_{year}_us_cd{congress}.zip")
    };
    Ok(url)
}

/// URL of a state legislative districts file for one state (`us` for the
/// nationwide cartographic boundary file).
pub fn state_legislative_districts_url(year: u16, cb: bool, state: &str, house: House) -> String {
    let token = house.token();
    if cb {
        match year {
            2010 => match house {
                House::Upper => format!("{BASE_URL}/GENZ2010/gz_2010_{state}_610_u2_500k.zip"),
                House::Lower => format!("{BASE_URL}/GENZ2010/gz_2010_{state}_620_l2_500k.zip"),
            },
            2013 => format!("{BASE_URL}/GENZ{year}/cb_{year}_{state}_{token}_500k.zip"),
            _ => format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_{state}_{token}_500k.zip"),
        }
    } else {
        match year {
            2000 | 2010 => format!(
                "{BASE_URL}/TIGER2010/{}/{year}/tl_2010_{state}_{token}{:02}.zip",
                token.to_ascii_uppercase(),
                year % 100
            ),
            _ => format!(
                "{BASE_URL}/TIGER{year}/{}/tl_{year}_{state}_{token}.zip",
                token.to_ascii_uppercase()
            ),
        }
    }
}

/// URL of a voting districts file.
///
/// Voting districts exist for 2020 (the 2020 redistricting data) and
/// 2012 (the 2010 districts); 2020 TIGER/Line files live under the
/// TIGER2020PL tree and are also published per county.
pub fn voting_districts_url(
    year: u16,
    cb: bool,
    state: &str,
    county: Option<&str>,
) -> Result<String> {
    if cb {
        if year != 2020 {
            return Err(Error::Unavailable {
                dataset: "cartographic boundary voting districts",
                year,
            });
        }
        return Ok(format!("{BASE_URL}/GENZ2020/shp/cb_2020_{state}_vtd_500k.zip"));
    }

    match year {
        2012 => Ok(format!("{BASE_URL}/TIGER2012/VTD/tl_2012_{state}_vtd10.zip")),
        2020 => match county {
            Some(county) => Ok(format!(
                "{BASE_URL}/TIGER2020PL/LAYER/VTD/2020/tl_2020_{state}{county}_vtd20.zip"
            )),
            None => Ok(format!(
                "{BASE_URL}/TIGER2020PL/LAYER/VTD/2020/tl_2020_{state}_vtd20.zip"
            )),
        },
        _ => Err(Error::Unavailable {
            dataset: "voting districts",
            year,
        }),
    }
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches congressional districts, optionally filtered to one state.
    pub fn congressional_districts(
        &self,
        state: Option<&str>,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let url =
            congressional_districts_url(options.resolved_year(), options.cb, options.resolution)?;
        let table = self.load(&url, options)?;

        match state {
            Some(state) => table.filter_in("STATEFP", &[validate_state(state)?]),
            None => Ok(table),
        }
    }

    /// Fetches state legislative districts for one chamber.
    pub fn state_legislative_districts(
        &self,
        state: Option<&str>,
        house: House,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = match state {
            Some(state) => validate_state(state)?,
            None if year > 2018 && options.cb => "us".to_string(),
            None => {
                return Err(Error::InvalidArgument(
                    "a state is required for this year and dataset combination".to_string(),
                ))
            }
        };

        let url = state_legislative_districts_url(year, options.cb, &state, house);
        self.load(&url, options)
    }

    /// Fetches voting districts, optionally narrowed to a county.
    ///
    /// When the caller does not pick a year, 2020 is assumed; 2024
    /// voting district files do not exist.
    pub fn voting_districts(
        &self,
        state: Option<&str>,
        county: Option<&str>,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.year.unwrap_or(2020);
        let state = match state {
            Some(state) => validate_state(state)?,
            None if year >= 2020 && options.cb => "us".to_string(),
            None => {
                return Err(Error::InvalidArgument(
                    "a state is required for this year and dataset combination".to_string(),
                ))
            }
        };

        if options.cb {
            let url = voting_districts_url(year, true, &state, None)?;
            let table = self.load(&url, options)?;
            return match county {
                Some(county) => {
                    let code = self.validate_county(&state, county)?;
                    table.filter_in("COUNTYFP20", &[code])
                }
                None => Ok(table),
            };
        }

        let county = match county {
            Some(county) if year == 2020 => Some(self.validate_county(&state, county)?),
            _ => None,
        };
        let url = voting_districts_url(year, false, &state, county.as_deref())?;
        self.load(&url, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DiskCache;
    use crate::http::tests::MockHttpClient;
    use crate::shp::tests::character_archive;

    #[test]
    fn test_congress_for_year() {
        assert_eq!(congress_for_year(2010).unwrap(), "111");
        assert_eq!(congress_for_year(2013).unwrap(), "113");
        assert_eq!(congress_for_year(2020).unwrap(), "116");
        assert_eq!(congress_for_year(2023).unwrap(), "118");
        assert_eq!(congress_for_year(2024).unwrap(), "119");
        assert!(congress_for_year(2005).is_err());
    }

    #[test]
    fn test_congressional_districts_url() {
        assert_eq!(
            congressional_districts_url(2024, false, Resolution::R500k).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2024/CD/tl_2024_us_cd119.zip"
        );
        assert_eq!(
            congressional_districts_url(2024, true, Resolution::R20m).unwrap(),
            "https://www2.census.gov/geo/tiger/GENZ2024/shp/cb_2024_us_cd119_20m.zip"
        );
        assert_eq!(
            congressional_districts_url(2013, true, Resolution::R500k).unwrap(),
            "https://www2.census.gov/geo/tiger/GENZ2013/cb_2013_us_cd113_500k.zip"
        );
        assert!(congressional_districts_url(2012, true, Resolution::R500k).is_err());
    }

    #[test]
    fn test_state_legislative_districts_url() {
        assert_eq!(
            state_legislative_districts_url(2024, false, "48", House::Upper),
            "https://www2.census.gov/geo/tiger/TIGER2024/SLDU/tl_2024_48_sldu.zip"
        );
        assert_eq!(
            state_legislative_districts_url(2024, true, "48", House::Lower),
            "https://www2.census.gov/geo/tiger/GENZ2024/shp/cb_2024_48_sldl_500k.zip"
        );
        assert_eq!(
            state_legislative_districts_url(2010, true, "48", House::Upper),
            "https://www2.census.gov/geo/tiger/GENZ2010/gz_2010_48_610_u2_500k.zip"
        );
        assert_eq!(
            state_legislative_districts_url(2010, true, "48", House::Lower),
            "https://www2.census.gov/geo/tiger/GENZ2010/gz_2010_48_620_l2_500k.zip"
        );
        assert_eq!(
            state_legislative_districts_url(2010, false, "48", House::Upper),
            "https://www2.census.gov/geo/tiger/TIGER2010/SLDU/2010/tl_2010_48_sldu10.zip"
        );
    }

    #[test]
    fn test_voting_districts_url() {
        assert_eq!(
            voting_districts_url(2020, true, "us", None).unwrap(),
            "https://www2.census.gov/geo/tiger/GENZ2020/shp/cb_2020_us_vtd_500k.zip"
        );
        assert_eq!(
            voting_districts_url(2020, false, "48", None).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2020PL/LAYER/VTD/2020/tl_2020_48_vtd20.zip"
        );
        assert_eq!(
            voting_districts_url(2020, false, "48", Some("453")).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2020PL/LAYER/VTD/2020/tl_2020_48453_vtd20.zip"
        );
        assert_eq!(
            voting_districts_url(2012, false, "48", None).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2012/VTD/tl_2012_48_vtd10.zip"
        );
        assert!(voting_districts_url(2012, true, "48", None).is_err());
        assert!(voting_districts_url(2016, false, "48", None).is_err());
    }

    #[test]
    fn test_congressional_districts_filters_by_state() {
        let archive = character_archive(
            &["STATEFP", "CD119FP"],
            &[
                (vec!["48", "10"], (-97.7, 30.3)),
                (vec!["06", "12"], (-118.2, 34.0)),
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let client = TigerClient::with_parts(
            MockHttpClient::with_routes(vec![("cd119".to_string(), archive)]),
            DiskCache::new(dir.path().join("cache")),
        );

        let table = client
            .congressional_districts(Some("TX"), &TigerOptions::new())
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.str_value(0, "CD119FP"), Some("10"));
    }
}
