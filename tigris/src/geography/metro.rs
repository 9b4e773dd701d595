//! Metropolitan area layers: CBSAs, CSAs, urban areas, metro divisions
//! and the New England city and town areas.

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{Resolution, TigerClient, TigerOptions, BASE_URL};

/// New England city and town area variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NectaKind {
    /// NECTAs proper.
    #[default]
    Necta,
    /// Combined NECTAs.
    Combined,
    /// NECTA divisions.
    Divisions,
}

/// URL of the nationwide core-based statistical areas file.
///
/// 2022 CBSAs were never delineated because of the Connecticut county
/// reorganization; requesting them is an error rather than a 404.
pub fn core_based_statistical_areas_url(
    year: u16,
    cb: bool,
    resolution: Resolution,
) -> Result<String> {
    if year == 2022 {
        return Err(Error::Unavailable {
            dataset: "core-based statistical areas",
            year,
        });
    }

    let url = if cb {
        match year {
            2010 => {
                if resolution == Resolution::R5m {
                    return Err(Error::InvalidArgument(
                        "the 5m resolution is unavailable for 2010 CBSAs".to_string(),
                    ));
                }
                format!(
                    "{BASE_URL}/GENZ2010/gz_2010_us_310_m1_{}.zip",
                    resolution.as_str()
                )
            }
            2013 => format!(
                "{BASE_URL}/GENZ{year}/cb_{year}_us_cbsa_{}.zip",
                resolution.as_str()
            ),
            _ => format!(
                "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_cbsa_{}.zip",
                resolution.as_str()
            ),
        }
    } else {
        match year {
            2010 => format!("{BASE_URL}/TIGER2010/CBSA/2010/tl_2010_us_cbsa10.zip"),
            _ => format!("{BASE_URL}/TIGER{year}/CBSA/tl_{year}_us_cbsa.zip"),
        }
    };
    Ok(url)
}

/// URL of the nationwide combined statistical areas file.
pub fn combined_statistical_areas_url(year: u16, cb: bool, resolution: Resolution) -> String {
    if cb {
        if year == 2013 {
            format!(
                "{BASE_URL}/GENZ{year}/cb_{year}_us_csa_{}.zip",
                resolution.as_str()
            )
        } else {
            format!(
                "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_csa_{}.zip",
                resolution.as_str()
            )
        }
    } else {
        format!("{BASE_URL}/TIGER{year}/CSA/tl_{year}_us_csa.zip")
    }
}

/// URL of the nationwide urban areas file (2010 delineations).
pub fn urban_areas_url(year: u16, cb: bool) -> String {
    if cb {
        if year == 2013 {
            format!("{BASE_URL}/GENZ{year}/cb_{year}_us_ua10_500k.zip")
        } else {
            format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_ua10_500k.zip")
        }
    } else {
        format!("{BASE_URL}/TIGER{year}/UAC/tl_{year}_us_uac10.zip")
    }
}

/// URL of the nationwide metropolitan divisions file.
pub fn metro_divisions_url(year: u16, cb: bool, resolution: Resolution) -> Result<String> {
    if year == 2022 {
        return Err(Error::Unavailable {
            dataset: "metropolitan divisions",
            year,
        });
    }

    let url = if cb {
        if year == 2013 {
            format!(
                "{BASE_URL}/GENZ{year}/cb_{year}_us_metdiv_{}.zip",
                resolution.as_str()
            )
        } else {
            format!(
                "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_metdiv_{}.zip",
                resolution.as_str()
            )
        }
    } else {
        format!("{BASE_URL}/TIGER{year}/CBSA/tl_{year}_us_metdiv.zip")
    };
    Ok(url)
}

/// URL of a New England city and town area file.
///
/// Only the NECTAs proper have a cartographic boundary version.
pub fn new_england_url(year: u16, cb: bool, kind: NectaKind) -> String {
    match kind {
        NectaKind::Necta => {
            if cb {
                format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_necta_500k.zip")
            } else {
                format!("{BASE_URL}/TIGER{year}/NECTA/tl_{year}_us_necta.zip")
            }
        }
        NectaKind::Combined => format!("{BASE_URL}/TIGER{year}/CNECTA/tl_{year}_us_cnecta.zip"),
        NectaKind::Divisions => {
            format!("{BASE_URL}/TIGER{year}/NECTADIV/tl_{year}_us_nectadiv.zip")
        }
    }
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches metropolitan and micropolitan statistical areas.
    pub fn core_based_statistical_areas(&self, options: &TigerOptions) -> Result<GeoTable> {
        let url = core_based_statistical_areas_url(
            options.resolved_year(),
            options.cb,
            options.resolution,
        )?;
        self.load(&url, options)
    }

    /// Fetches combined statistical areas.
    pub fn combined_statistical_areas(&self, options: &TigerOptions) -> Result<GeoTable> {
        let url = combined_statistical_areas_url(
            options.resolved_year(),
            options.cb,
            options.resolution,
        );
        self.load(&url, options)
    }

    /// Fetches urban areas.
    pub fn urban_areas(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(&urban_areas_url(options.resolved_year(), options.cb), options)
    }

    /// Fetches metropolitan divisions.
    pub fn metro_divisions(&self, options: &TigerOptions) -> Result<GeoTable> {
        let url = metro_divisions_url(options.resolved_year(), options.cb, options.resolution)?;
        self.load(&url, options)
    }

    /// Fetches New England city and town areas.
    pub fn new_england(&self, kind: NectaKind, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &new_england_url(options.resolved_year(), options.cb, kind),
            options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_based_statistical_areas_url() {
        assert_eq!(
            core_based_statistical_areas_url(2024, false, Resolution::R500k).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2024/CBSA/tl_2024_us_cbsa.zip"
        );
        assert_eq!(
            core_based_statistical_areas_url(2024, true, Resolution::R20m).unwrap(),
            "https://www2.census.gov/geo/tiger/GENZ2024/shp/cb_2024_us_cbsa_20m.zip"
        );
        assert_eq!(
            core_based_statistical_areas_url(2010, true, Resolution::R500k).unwrap(),
            "https://www2.census.gov/geo/tiger/GENZ2010/gz_2010_us_310_m1_500k.zip"
        );
        assert_eq!(
            core_based_statistical_areas_url(2010, false, Resolution::R500k).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2010/CBSA/2010/tl_2010_us_cbsa10.zip"
        );
        assert!(core_based_statistical_areas_url(2022, false, Resolution::R500k).is_err());
        assert!(core_based_statistical_areas_url(2010, true, Resolution::R5m).is_err());
    }

    #[test]
    fn test_combined_statistical_areas_url() {
        assert_eq!(
            combined_statistical_areas_url(2024, false, Resolution::R500k),
            "https://www2.census.gov/geo/tiger/TIGER2024/CSA/tl_2024_us_csa.zip"
        );
        assert_eq!(
            combined_statistical_areas_url(2013, true, Resolution::R5m),
            "https://www2.census.gov/geo/tiger/GENZ2013/cb_2013_us_csa_5m.zip"
        );
    }

    #[test]
    fn test_urban_areas_url() {
        assert_eq!(
            urban_areas_url(2021, false),
            "https://www2.census.gov/geo/tiger/TIGER2021/UAC/tl_2021_us_uac10.zip"
        );
        assert_eq!(
            urban_areas_url(2021, true),
            "https://www2.census.gov/geo/tiger/GENZ2021/shp/cb_2021_us_ua10_500k.zip"
        );
    }

    #[test]
    fn test_metro_divisions_url() {
        assert_eq!(
            metro_divisions_url(2024, false, Resolution::R500k).unwrap(),
            "https://www2.census.gov/geo/tiger/TIGER2024/CBSA/tl_2024_us_metdiv.zip"
        );
        assert!(metro_divisions_url(2022, false, Resolution::R500k).is_err());
    }

    #[test]
    fn test_new_england_url() {
        assert_eq!(
            new_england_url(2021, false, NectaKind::Necta),
            "https://www2.census.gov/geo/tiger/TIGER2021/NECTA/tl_2021_us_necta.zip"
        );
        assert_eq!(
            new_england_url(2021, true, NectaKind::Necta),
            "https://www2.census.gov/geo/tiger/GENZ2021/shp/cb_2021_us_necta_500k.zip"
        );
        assert_eq!(
            new_england_url(2021, false, NectaKind::Combined),
            "https://www2.census.gov/geo/tiger/TIGER2021/CNECTA/tl_2021_us_cnecta.zip"
        );
        assert_eq!(
            new_england_url(2021, false, NectaKind::Divisions),
            "https://www2.census.gov/geo/tiger/TIGER2021/NECTADIV/tl_2021_us_nectadiv.zip"
        );
    }
}
