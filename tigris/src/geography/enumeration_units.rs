//! Core enumeration units: states, counties, tracts, block groups,
//! blocks, places, PUMAs, ZCTAs and school districts.

use crate::error::{Error, Result};
use crate::fips::validate_state;
use crate::http::HttpClient;
use crate::table::GeoTable;
use crate::tiger::{Resolution, TigerClient, TigerOptions, BASE_URL};

/// School district layer variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchoolDistrictKind {
    #[default]
    Unified,
    Elementary,
    Secondary,
}

impl SchoolDistrictKind {
    fn token(self) -> &'static str {
        match self {
            SchoolDistrictKind::Unified => "unsd",
            SchoolDistrictKind::Elementary => "elsd",
            SchoolDistrictKind::Secondary => "scsd",
        }
    }
}

/// URL of the nationwide counties file for a year.
pub fn counties_url(year: u16, cb: bool, resolution: Resolution) -> Result<String> {
    let url = if cb {
        match year {
            1990 | 2000 => {
                let yr = year % 100;
                format!("{BASE_URL}/PREVGENZ/co/co{yr:02}shp/co99_d{yr:02}_shp.zip")
            }
            2010 => format!(
                "{BASE_URL}/GENZ2010/gz_2010_us_050_00_{}.zip",
                resolution.as_str()
            ),
            2011 | 2012 => format!(
                "{BASE_URL}/GENZ{year}/cb_{year}_us_county_{}.zip",
                resolution.as_str()
            ),
            _ => format!(
                "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_county_{}.zip",
                resolution.as_str()
            ),
        }
    } else {
        match year {
            1990 => {
                return Err(Error::Unavailable {
                    dataset: "TIGER/Line counties",
                    year,
                })
            }
            2000 | 2010 => {
                let yr = year % 100;
                format!("{BASE_URL}/TIGER2010/COUNTY/{year}/tl_2010_us_county{yr:02}.zip")
            }
            _ => format!("{BASE_URL}/TIGER{year}/COUNTY/tl_{year}_us_county.zip"),
        }
    };
    Ok(url)
}

/// URL of the states file for a year.
pub fn states_url(year: u16, cb: bool, resolution: Resolution) -> Result<String> {
    let url = if cb {
        match year {
            1990 | 2000 => {
                let yr = year % 100;
                format!("{BASE_URL}/PREVGENZ/st/st{yr:02}shp/st99_d{yr:02}_shp.zip")
            }
            2010 => format!(
                "{BASE_URL}/GENZ2010/gz_2010_us_040_00_{}.zip",
                resolution.as_str()
            ),
            y if y > 2013 => format!(
                "{BASE_URL}/GENZ{year}/shp/cb_{year}_us_state_{}.zip",
                resolution.as_str()
            ),
            _ => format!(
                "{BASE_URL}/GENZ{year}/cb_{year}_us_state_{}.zip",
                resolution.as_str()
            ),
        }
    } else {
        match year {
            1990 => {
                return Err(Error::Unavailable {
                    dataset: "TIGER/Line states",
                    year,
                })
            }
            2000 | 2010 => {
                let yr = year % 100;
                format!("{BASE_URL}/TIGER2010/STATE/{year}/tl_2010_us_state{yr:02}.zip")
            }
            _ => format!("{BASE_URL}/TIGER{year}/STATE/tl_{year}_us_state.zip"),
        }
    };
    Ok(url)
}

/// URL of a tracts file for one state (`us` for nationwide).
pub fn tracts_url(year: u16, cb: bool, state: &str) -> Result<String> {
    let url = if cb {
        match year {
            1990 | 2000 => {
                let yr = year % 100;
                format!("{BASE_URL}/PREVGENZ/tr/tr{yr:02}shp/tr{state}_d{yr:02}_shp.zip")
            }
            2010 => format!("{BASE_URL}/GENZ2010/gz_2010_{state}_140_00_500k.zip"),
            y if y > 2013 => format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_{state}_tract_500k.zip"),
            _ => format!("{BASE_URL}/GENZ{year}/cb_{year}_{state}_tract_500k.zip"),
        }
    } else {
        match year {
            1990 => {
                return Err(Error::Unavailable {
                    dataset: "TIGER/Line tracts",
                    year,
                })
            }
            2000 | 2010 => {
                let yr = year % 100;
                format!("{BASE_URL}/TIGER2010/TRACT/{year}/tl_2010_{state}_tract{yr:02}.zip")
            }
            _ => format!("{BASE_URL}/TIGER{year}/TRACT/tl_{year}_{state}_tract.zip"),
        }
    };
    Ok(url)
}

/// URL of a block groups file for one state (`us` for nationwide).
pub fn block_groups_url(year: u16, cb: bool, state: &str) -> Result<String> {
    let url = if cb {
        match year {
            1990 | 2000 => {
                let yr = year % 100;
                format!("{BASE_URL}/PREVGENZ/bg/bg{yr:02}shp/bg{state}_d{yr:02}_shp.zip")
            }
            2010 => format!("{BASE_URL}/GENZ2010/gz_2010_{state}_150_00_500k.zip"),
            y if y > 2013 => format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_{state}_bg_500k.zip"),
            _ => format!("{BASE_URL}/GENZ{year}/cb_{year}_{state}_bg_500k.zip"),
        }
    } else {
        match year {
            1990 => {
                return Err(Error::Unavailable {
                    dataset: "TIGER/Line block groups",
                    year,
                })
            }
            2000 | 2010 => {
                let yr = year % 100;
                format!("{BASE_URL}/TIGER2010/BG/{year}/tl_2010_{state}_bg{yr:02}.zip")
            }
            _ => format!("{BASE_URL}/TIGER{year}/BG/tl_{year}_{state}_bg.zip"),
        }
    };
    Ok(url)
}

/// URL of a blocks file for one state, optionally narrowed to one county
/// (2000/2010 only serve per-county files).
pub fn blocks_url(year: u16, state: &str, county: Option<&str>) -> Result<String> {
    let url = match year {
        1990 => {
            return Err(Error::Unavailable {
                dataset: "blocks",
                year,
            })
        }
        2000 | 2010 => {
            let yr = year % 100;
            match county {
                Some(county) => format!(
                    "{BASE_URL}/TIGER2010/TABBLOCK/{year}/tl_2010_{state}{county}_tabblock{yr:02}.zip"
                ),
                None => format!(
                    "{BASE_URL}/TIGER2010/TABBLOCK/{year}/tl_2010_{state}_tabblock{yr:02}.zip"
                ),
            }
        }
        2011..=2013 => format!("{BASE_URL}/TIGER{year}/TABBLOCK/tl_{year}_{state}_tabblock.zip"),
        2014..=2019 => format!("{BASE_URL}/TIGER{year}/TABBLOCK/tl_{year}_{state}_tabblock10.zip"),
        _ => format!("{BASE_URL}/TIGER{year}/TABBLOCK20/tl_{year}_{state}_tabblock20.zip"),
    };
    Ok(url)
}

/// URL of a places file for one state (`us` for nationwide).
pub fn places_url(year: u16, cb: bool, state: &str) -> String {
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_{state}_place_500k.zip")
    } else {
        format!("{BASE_URL}/TIGER{year}/PLACE/tl_{year}_{state}_place.zip")
    }
}

/// URL of a PUMA file for one state.
///
/// 2020 PUMAs appear with `year >= 2022`; earlier years serve 2010 PUMAs.
pub fn pumas_url(year: u16, cb: bool, state: &str) -> Result<String> {
    let suf = if year > 2021 { "20" } else { "10" };
    let url = if cb {
        match year {
            2020 | 2021 => {
                return Err(Error::Unavailable {
                    dataset: "cartographic boundary PUMAs",
                    year,
                })
            }
            2013 => format!("{BASE_URL}/GENZ{year}/cb_{year}_{state}_puma{suf}_500k.zip"),
            _ => format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_{state}_puma{suf}_500k.zip"),
        }
    } else {
        format!("{BASE_URL}/TIGER{year}/PUMA/tl_{year}_{state}_puma{suf}.zip")
    };
    Ok(url)
}

/// URL of a ZCTA file; by-state files exist only for 2000 and 2010.
pub fn zctas_url(year: u16, cb: bool, state: Option<&str>) -> Result<String> {
    if year == 1990 {
        return Err(Error::Unavailable {
            dataset: "ZCTAs",
            year,
        });
    }
    if state.is_some() && year > 2010 {
        return Err(Error::InvalidArgument(
            "ZCTAs are only available by state for 2000 and 2010".to_string(),
        ));
    }
    if state.is_some() && year == 2010 && cb {
        return Err(Error::InvalidArgument(
            "2010 ZCTAs are only available by state from the TIGER/Line files".to_string(),
        ));
    }

    let url = if cb {
        match year {
            2000 => match state {
                Some(state) => format!("{BASE_URL}/PREVGENZ/zt/z500shp/zt{state}_d00_shp.zip"),
                None => format!("{BASE_URL}/PREVGENZ/zt/z500shp/zt99_d00_shp.zip"),
            },
            2010 => format!("{BASE_URL}/GENZ2010/gz_2010_us_860_00_500k.zip"),
            y if y >= 2020 => format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_zcta520_500k.zip"),
            2013 => format!("{BASE_URL}/GENZ{year}/cb_{year}_us_zcta510_500k.zip"),
            _ => format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_us_zcta510_500k.zip"),
        }
    } else {
        match year {
            y if y >= 2020 => format!("{BASE_URL}/TIGER{year}/ZCTA520/tl_{year}_us_zcta520.zip"),
            2000 | 2010 => {
                let yr = year % 100;
                match state {
                    Some(state) => {
                        format!("{BASE_URL}/TIGER2010/ZCTA5/{year}/tl_2010_{state}_zcta5{yr:02}.zip")
                    }
                    None => {
                        format!("{BASE_URL}/TIGER2010/ZCTA5/{year}/tl_2010_us_zcta5{yr:02}.zip")
                    }
                }
            }
            _ => format!("{BASE_URL}/TIGER{year}/ZCTA5/tl_{year}_us_zcta510.zip"),
        }
    };
    Ok(url)
}

/// URL of a school districts file for one state (`us` for nationwide).
pub fn school_districts_url(year: u16, cb: bool, state: &str, kind: SchoolDistrictKind) -> String {
    let token = kind.token();
    if cb {
        format!("{BASE_URL}/GENZ{year}/shp/cb_{year}_{state}_{token}_500k.zip")
    } else {
        format!(
            "{BASE_URL}/TIGER{year}/{}/tl_{year}_{state}_{token}.zip",
            token.to_ascii_uppercase()
        )
    }
}

/// Resolves an optional state to its FIPS code, falling back to the
/// nationwide `us` file where the year and variant support one.
fn state_or_us(state: Option<&str>, year: u16, cb: bool) -> Result<String> {
    match state {
        Some(state) => validate_state(state),
        None if year > 2018 && cb => Ok("us".to_string()),
        None => Err(Error::InvalidArgument(
            "a state is required for this year and dataset combination".to_string(),
        )),
    }
}

impl<C: HttpClient> TigerClient<C> {
    /// Fetches the counties layer, optionally filtered to one state.
    pub fn counties(&self, state: Option<&str>, options: &TigerOptions) -> Result<GeoTable> {
        let url = counties_url(options.resolved_year(), options.cb, options.resolution)?;
        let table = self.load(&url, options)?;

        match state {
            Some(state) => table.filter_in("STATEFP", &[validate_state(state)?]),
            None => Ok(table),
        }
    }

    /// Fetches the states layer.
    pub fn states(&self, options: &TigerOptions) -> Result<GeoTable> {
        let url = states_url(options.resolved_year(), options.cb, options.resolution)?;
        self.load(&url, options)
    }

    /// Fetches Census tracts for a state, optionally narrowed to a county.
    ///
    /// With no state, the nationwide cartographic boundary file is used
    /// where one exists (`cb` and a year after 2018).
    pub fn tracts(
        &self,
        state: Option<&str>,
        county: Option<&str>,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = state_or_us(state, year, options.cb)?;
        let url = tracts_url(year, options.cb, &state)?;
        let table = self.load(&url, options)?;

        match county {
            Some(county) => {
                let code = self.validate_county(&state, county)?;
                table.filter_in("COUNTYFP", &[code])
            }
            None => Ok(table),
        }
    }

    /// Fetches block groups for a state, optionally narrowed to a county.
    pub fn block_groups(
        &self,
        state: Option<&str>,
        county: Option<&str>,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = state_or_us(state, year, options.cb)?;
        let url = block_groups_url(year, options.cb, &state)?;
        let table = self.load(&url, options)?;

        match county {
            Some(county) => {
                let code = self.validate_county(&state, county)?;
                table.filter_in("COUNTYFP", &[code])
            }
            None => Ok(table),
        }
    }

    /// Fetches Census blocks for a state, optionally narrowed to counties.
    ///
    /// Block files are large; prefer a persistent cache.
    pub fn blocks(
        &self,
        state: &str,
        counties: &[&str],
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = validate_state(state)?;

        // 2000/2010 blocks are published per county.
        if matches!(year, 2000 | 2010) && !counties.is_empty() {
            let mut urls = Vec::new();
            for county in counties {
                let code = self.validate_county(&state, county)?;
                urls.push(blocks_url(year, &state, Some(&code))?);
            }
            return self.load_many(&urls, options);
        }

        let url = blocks_url(year, &state, None)?;
        let table = self.load(&url, options)?;

        if counties.is_empty() || year <= 2010 {
            return Ok(table);
        }

        let column = if year > 2019 { "COUNTYFP20" } else { "COUNTYFP10" };
        let codes = counties
            .iter()
            .map(|county| self.validate_county(&state, county))
            .collect::<Result<Vec<_>>>()?;
        table.filter_in(column, &codes)
    }

    /// Fetches Census-designated places for a state.
    pub fn places(&self, state: Option<&str>, options: &TigerOptions) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = state_or_us(state, year, options.cb)?;
        self.load(&places_url(year, options.cb, &state), options)
    }

    /// Fetches public use microdata areas for a state.
    pub fn pumas(&self, state: Option<&str>, options: &TigerOptions) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = state_or_us(state, year, options.cb)?;
        let url = pumas_url(year, options.cb, &state)?;
        self.load(&url, options)
    }

    /// Fetches zip code tabulation areas, optionally keeping only ZCTAs
    /// starting with the given prefixes.
    ///
    /// ZCTAs approximate USPS zip codes and are nationwide-only after
    /// 2010; the download is one of the largest the Census Bureau serves.
    pub fn zctas(
        &self,
        state: Option<&str>,
        starts_with: &[&str],
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = state.map(validate_state).transpose()?;
        let url = zctas_url(year, options.cb, state.as_deref())?;
        let table = self.load(&url, options)?;

        if starts_with.is_empty() {
            return Ok(table);
        }

        // The ZCTA column name carries a vintage suffix (ZCTA5CE10,
        // ZCTA5CE20, ...), so locate it by prefix.
        let column = table
            .first_column_starting_with("ZCTA")
            .ok_or_else(|| Error::UnknownColumn("ZCTA*".to_string()))?
            .to_string();
        table.filter_starts_with(&column, starts_with)
    }

    /// Fetches school district boundaries for a state.
    pub fn school_districts(
        &self,
        state: Option<&str>,
        kind: SchoolDistrictKind,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let year = options.resolved_year();
        let state = state_or_us(state, year, options.cb)?;
        self.load(&school_districts_url(year, options.cb, &state, kind), options)
    }
}
