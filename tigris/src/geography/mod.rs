//! Geography fetchers, one module per family of Census layers.
//!
//! Each module adds methods to [`crate::tiger::TigerClient`] together with
//! the pure URL builders they rely on. The builders encode the Census
//! Bureau's directory layout, which changed several times over the years
//! (PREVGENZ for 1990/2000, GENZ2010, GENZ with and without `shp/`,
//! TIGER2010 for the 2000/2010 back-catalog, TIGER2020PL for voting
//! districts), so they are tested against literal URLs.

pub mod enumeration_units;
pub mod legislative;
pub mod metro;
pub mod national;
pub mod native;
pub mod transportation;
pub mod water;
