//! tigris - Census Bureau TIGER/Line and cartographic boundary files in Rust
//!
//! This library downloads shapefiles from the US Census Bureau's public
//! download tree, caches the archives on disk, and parses them into
//! [`GeoTable`] collections of attributes and geometries. It also wraps
//! the Census geocoder, the Census data API, and the LODES origin-
//! destination employment files, and ships the display transforms needed
//! for national maps (Alaska/Hawaii/Puerto Rico insets, water erasure).
//!
//! ```no_run
//! use tigris::{TigerClient, TigerOptions};
//!
//! let client = TigerClient::new()?;
//! let counties = client.counties(Some("TX"), &TigerOptions::new().cb(true))?;
//! println!("{} counties", counties.len());
//! # Ok::<(), tigris::Error>(())
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod fips;
pub mod geocode;
pub mod geography;
pub mod http;
pub mod shp;
pub mod table;
pub mod tiger;
pub mod transform;

pub use geo_types;

pub use data::{CensusApi, CensusOptions, DataTable, LodesOptions, LodesType};
pub use error::{Error, Result};
pub use geocode::{GeocodeOptions, Geocoder, StreetAddress};
pub use table::{AttrValue, Crs, GeoTable, Subset};
pub use tiger::{Resolution, TigerClient, TigerOptions, DEFAULT_YEAR};
pub use transform::{shift_geometry, AlbersProjection, ShiftPosition};
