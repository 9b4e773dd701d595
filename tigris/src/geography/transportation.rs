//! Transportation layers: roads, rails, and address ranges.
//!
//! County-level layers (roads, address ranges) are published one archive
//! per county; requests for several counties fetch each archive and
//! concatenate the tables.

use crate::error::Result;
use crate::fips::validate_state;
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{TigerClient, TigerOptions, BASE_URL};

/// URL of the all-roads file for one county.
pub fn roads_url(year: u16, state: &str, county: &str) -> String {
    format!("{BASE_URL}/TIGER{year}/ROADS/tl_{year}_{state}{county}_roads.zip")
}

/// URL of the nationwide primary roads file.
pub fn primary_roads_url(year: u16) -> String {
    format!("{BASE_URL}/TIGER{year}/PRIMARYROADS/tl_{year}_us_primaryroads.zip")
}

/// URL of the primary and secondary roads file for one state.
pub fn primary_secondary_roads_url(year: u16, state: &str) -> String {
    format!("{BASE_URL}/TIGER{year}/PRISECROADS/tl_{year}_{state}_prisecroads.zip")
}

/// URL of the nationwide rails file.
pub fn rails_url(year: u16) -> String {
    format!("{BASE_URL}/TIGER{year}/RAILS/tl_{year}_us_rails.zip")
}

/// URL of the address ranges file for one county.
pub fn address_ranges_url(year: u16, state: &str, county: &str) -> String {
    format!("{BASE_URL}/TIGER{year}/ADDRFEAT/tl_{year}_{state}{county}_addrfeat.zip")
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches all roads for one or more counties.
    pub fn roads(
        &self,
        state: &str,
        counties: &[&str],
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let urls = self.county_urls(state, counties, |s, c| roads_url(year, s, c))?;
        self.load_many(&urls, options)
    }

    /// Fetches the nationwide primary roads layer.
    pub fn primary_roads(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(&primary_roads_url(options.resolved_year()), options)
    }

    /// Fetches primary and secondary roads for one state.
    pub fn primary_secondary_roads(
        &self,
        state: &str,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let state = validate_state(state)?;
        self.load(
            &primary_secondary_roads_url(options.resolved_year(), &state),
            options,
        )
    }

    /// Fetches the nationwide rails layer.
    pub fn rails(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(&rails_url(options.resolved_year()), options)
    }

    /// Fetches address range features for one or more counties.
    pub fn address_ranges(
        &self,
        state: &str,
        counties: &[&str],
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let urls = self.county_urls(state, counties, |s, c| address_ranges_url(year, s, c))?;
        self.load_many(&urls, options)
    }
}
