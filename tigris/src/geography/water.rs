//! Water layers: area water, linear water, and the coastline.

use crate::error::Result;
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{TigerClient, TigerOptions, BASE_URL};

/// URL of the area water file for one county.
pub fn area_water_url(year: u16, state: &str, county: &str) -> String {
    format!("{BASE_URL}/TIGER{year}/AREAWATER/tl_{year}_{state}{county}_areawater.zip")
}

/// URL of the linear water file for one county.
pub fn linear_water_url(year: u16, state: &str, county: &str) -> String {
    format!("{BASE_URL}/TIGER{year}/LINEARWATER/tl_{year}_{state}{county}_linearwater.zip")
}

/// URL of the nationwide coastline file.
///
/// The directory was renamed from COAST to COASTLINE in 2017.
pub fn coastline_url(year: u16) -> String {
    if year > 2016 {
        format!("{BASE_URL}/TIGER{year}/COASTLINE/tl_{year}_us_coastline.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/COAST/tl_{year}_us_coastline.zip")
    }
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches water bodies (lakes, reservoirs, wide rivers) for one or
    /// more counties.
    pub fn area_water(
        &self,
        state: &str,
        counties: &[&str],
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let urls = self.county_urls(state, counties, |s, c| area_water_url(year, s, c))?;
        self.load_many(&urls, options)
    }

    /// Fetches linear water features (streams, canals) for one or more
    /// counties.
    pub fn linear_water(
        &self,
        state: &str,
        counties: &[&str],
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let urls = self.county_urls(state, counties, |s, c| linear_water_url(year, s, c))?;
        self.load_many(&urls, options)
    }

    /// Fetches the national coastline.
    pub fn coastline(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(&coastline_url(options.resolved_year()), options)
    }
}
