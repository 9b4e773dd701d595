//! National-level cartographic boundary layers.
//!
//! These only exist as cartographic boundary files, so the `cb` flag is
//! ignored here.

use crate::error::Result;
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{Resolution, TigerClient, TigerOptions, BASE_URL};

/// URL of the Census regions file.
pub fn regions_url(year: u16, resolution: Resolution) -> String {
    format!(
        "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_region_{}.zip",
        resolution.as_str()
    )
}

/// URL of the Census divisions file.
pub fn divisions_url(year: u16, resolution: Resolution) -> String {
    format!(
        "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_division_{}.zip",
        resolution.as_str()
    )
}

/// URL of the national boundary file.
pub fn nation_url(year: u16, resolution: Resolution) -> String {
    format!(
        "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_nation_{}.zip",
        resolution.as_str()
    )
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches the four Census regions.
    pub fn regions(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &regions_url(options.resolved_year(), options.resolution),
            options,
        )
    }

    /// Fetches the nine Census divisions.
    pub fn divisions(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &divisions_url(options.resolved_year(), options.resolution),
            options,
        )
    }

    /// Fetches the national boundary.
    ///
    /// The 5m resolution is the sensible default here; 500k is very
    /// large for a single nationwide outline.
    pub fn nation(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &nation_url(options.resolved_year(), options.resolution),
            options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_urls() {
        assert_eq!(
            regions_url(2024, Resolution::R500k),
            "https://www2.census.gov/geo/tiger/GENZ2024/shp/cb_2024_us_region_500k.zip"
        );
        assert_eq!(
            divisions_url(2024, Resolution::R20m),
            "https://www2.census.gov/geo/tiger/GENZ2024/shp/cb_2024_us_division_20m.zip"
        );
        assert_eq!(
            nation_url(2024, Resolution::R5m),
            "https://www2.census.gov/geo/tiger/GENZ2024/shp/cb_2024_us_nation_5m.zip"
        );
    }
}
