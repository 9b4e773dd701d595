//! American Indian, Alaska Native, and Native Hawaiian area layers.

use crate::error::Result;
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{TigerClient, TigerOptions, BASE_URL};

/// URL of the nationwide AIANNH areas file.
pub fn native_areas_url(year: u16, cb: bool) -> String {
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_aiannh_500k.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/AIANNH/tl_{year}_us_aiannh.zip")
    }
}

/// URL of the nationwide tribal subdivisions file.
///
/// The TIGER directory was renamed from AITS to AITSN in 2015.
pub fn tribal_subdivisions_url(year: u16, cb: bool) -> String {
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_aitsn_500k.zip")
    } else if year < 2015 {
        format!("{BASE_URL}/TIGER{year}/AITS/tl_{year}_us_aitsn.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/AITSN/tl_{year}_us_aitsn.zip")
    }
}

/// URL of the Alaska Native regional corporations file (always Alaska,
/// FIPS 02).
pub fn alaska_native_regional_corporations_url(year: u16, cb: bool) -> String {
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_02_anrc_500k.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/ANRC/tl_{year}_02_anrc.zip")
    }
}

/// URL of the nationwide tribal block groups file.
pub fn tribal_block_groups_url(year: u16, cb: bool) -> String {
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_tbg_500k.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/TBG/tl_{year}_us_tbg.zip")
    }
}

/// URL of the nationwide tribal tracts file.
pub fn tribal_tracts_url(year: u16, cb: bool) -> String {
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_ttract_500k.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/TTRACT/tl_{year}_us_ttract.zip")
    }
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches American Indian/Alaska Native/Native Hawaiian areas.
    pub fn native_areas(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(&native_areas_url(options.resolved_year(), options.cb), options)
    }

    /// Fetches tribal subdivisions.
    pub fn tribal_subdivisions(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &tribal_subdivisions_url(options.resolved_year(), options.cb),
            options,
        )
    }

    /// Fetches Alaska Native regional corporations.
    pub fn alaska_native_regional_corporations(
        &self,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        self.load(
            &alaska_native_regional_corporations_url(options.resolved_year(), options.cb),
            options,
        )
    }

    /// Fetches tribal block groups.
    pub fn tribal_block_groups(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &tribal_block_groups_url(options.resolved_year(), options.cb),
            options,
        )
    }

    /// Fetches tribal Census tracts.
    pub fn tribal_tracts(&self, options: &TigerOptions) -> Result<GeoTable> {
        self.load(
            &tribal_tracts_url(options.resolved_year(), options.cb),
            options,
        )
    }
}
