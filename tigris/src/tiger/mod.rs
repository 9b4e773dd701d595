//! Core client for the Census Bureau's TIGERweb download tree.
//!
//! [`TigerClient`] owns the HTTP client and disk cache and exposes one
//! method per geography (counties, tracts, roads, ...) from the modules
//! under `geography/`. Each of those methods builds the exact URL the
//! Census Bureau publishes for the requested year and variant, then runs
//! the shared fetch, parse and subset pipeline implemented here.

use tracing::{debug, info};

use crate::cache::DiskCache;
use crate::error::{Error, Result};
use crate::fips::validate_state;
use crate::http::{HttpClient, ReqwestClient};
use crate::shp;
use crate::table::{GeoTable, Subset};

/// Base of the Census Bureau's geography download tree.
pub const BASE_URL: &str = "https://www2.census.gov/geo/tiger";

/// Year assumed when the caller does not pick one.
pub const DEFAULT_YEAR: u16 = 2024;

/// Generalization level of a cartographic boundary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// 1:500,000 (most detailed, the default).
    #[default]
    R500k,
    /// 1:5,000,000.
    R5m,
    /// 1:20,000,000 (coarsest).
    R20m,
}

impl Resolution {
    /// The token used in cartographic boundary file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::R500k => "500k",
            Resolution::R5m => "5m",
            Resolution::R20m => "20m",
        }
    }
}

/// Options shared by every geography request.
#[derive(Debug, Clone, Default)]
pub struct TigerOptions {
    /// Data year; [`DEFAULT_YEAR`] when unset.
    pub year: Option<u16>,
    /// Prefer the generalized cartographic boundary file over TIGER/Line.
    pub cb: bool,
    /// Generalization level, for geographies offering more than one.
    pub resolution: Resolution,
    /// Reuse the on-disk archive cache. Disable to force a fresh download.
    pub cache: bool,
    /// Row filter applied after parsing.
    pub subset: Option<Subset>,
}

impl TigerOptions {
    pub fn new() -> Self {
        Self {
            cache: true,
            ..Self::default()
        }
    }

    pub fn year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn cb(mut self, cb: bool) -> Self {
        self.cb = cb;
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.cache = false;
        self
    }

    pub fn subset(mut self, subset: Subset) -> Self {
        self.subset = Some(subset);
        self
    }

    /// The effective data year.
    pub fn resolved_year(&self) -> u16 {
        match self.year {
            Some(year) => year,
            None => {
                debug!(year = DEFAULT_YEAR, "no year given, using the default");
                DEFAULT_YEAR
            }
        }
    }
}

/// Client for TIGER/Line and cartographic boundary downloads.
///
/// Generic over the HTTP transport so tests can swap in a mock; in
/// production use [`TigerClient::new`] which wires up a real client and
/// the per-user disk cache.
pub struct TigerClient<C: HttpClient = ReqwestClient> {
    http: C,
    cache: DiskCache,
}

impl TigerClient<ReqwestClient> {
    /// Creates a client with the default transport and cache location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: ReqwestClient::new()?,
            cache: DiskCache::open_default()?,
        })
    }
}

impl<C: HttpClient> TigerClient<C> {
    /// Creates a client from explicit parts.
    pub fn with_parts(http: C, cache: DiskCache) -> Self {
        Self { http, cache }
    }

    /// The HTTP transport.
    pub fn http(&self) -> &C {
        &self.http
    }

    /// The archive cache.
    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    /// Downloads (or reuses) an archive and parses it into a table.
    pub(crate) fn load(&self, url: &str, options: &TigerOptions) -> Result<GeoTable> {
        info!(url, "loading Census geography");

        let bytes = if options.cache {
            self.cache.fetch(url, &self.http)?
        } else {
            self.http.get(url)?
        };

        let mut table = shp::parse_zip(&bytes)?;
        if let Some(subset) = &options.subset {
            table = table.subset(subset);
        }
        Ok(table)
    }

    /// Loads several archives and concatenates the resulting tables.
    pub(crate) fn load_many(&self, urls: &[String], options: &TigerOptions) -> Result<GeoTable> {
        let tables = urls
            .iter()
            .map(|url| self.load(url, options))
            .collect::<Result<Vec<_>>>()?;
        GeoTable::concat(tables)
    }

    /// Resolves county identifiers and builds one URL per county, for
    /// the layers the Census Bureau publishes one archive per county.
    pub(crate) fn county_urls<F>(&self, state: &str, counties: &[&str], build: F) -> Result<Vec<String>>
    where
        F: Fn(&str, &str) -> String,
    {
        if counties.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one county is required".to_string(),
            ));
        }
        let state = validate_state(state)?;
        counties
            .iter()
            .map(|county| {
                let code = self.validate_county(&state, county)?;
                Ok(build(&state, &code))
            })
            .collect()
    }
}
