//! Spherical Albers equal-area conic projection.
//!
//! The display transforms in this crate only need a forward projection
//! onto a handful of fixed national frames, so the math is implemented
//! directly (Snyder, Map Projections: A Working Manual, eq. 14-1..14-6
//! for the sphere) instead of pulling in a projection engine.

use geo::MapCoords;
use geo_types::{Coord, Geometry};

/// Mean Earth radius of the authalic sphere, in meters.
const EARTH_RADIUS_M: f64 = 6_370_997.0;

/// A forward Albers equal-area conic projection on the sphere.
#[derive(Debug, Clone, Copy)]
pub struct AlbersProjection {
    lon0: f64,
    n: f64,
    c: f64,
    rho0: f64,
}

impl AlbersProjection {
    /// Creates a projection from an origin and two standard parallels,
    /// all in degrees.
    pub fn new(lon0: f64, lat0: f64, lat1: f64, lat2: f64) -> Self {
        let phi0 = lat0.to_radians();
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();

        let n = (phi1.sin() + phi2.sin()) / 2.0;
        let c = phi1.cos().powi(2) + 2.0 * n * phi1.sin();
        let rho0 = EARTH_RADIUS_M / n * (c - 2.0 * n * phi0.sin()).sqrt();

        Self { lon0, n, c, rho0 }
    }

    /// The frame used for the continental United States, matching the
    /// parameters of ESRI:102003 (USA Contiguous Albers Equal Area).
    pub fn conus() -> Self {
        Self::new(-96.0, 37.5, 29.5, 45.5)
    }

    /// The Alaska frame, matching the parameters of EPSG:3338.
    pub fn alaska() -> Self {
        Self::new(-154.0, 50.0, 55.0, 65.0)
    }

    /// The Hawaii frame, matching the parameters of ESRI:102007.
    pub fn hawaii() -> Self {
        Self::new(-157.0, 13.0, 8.0, 18.0)
    }

    /// An equal-area frame centered on Puerto Rico.
    pub fn puerto_rico() -> Self {
        Self::new(-66.433, 17.833, 18.033, 18.433)
    }

    /// Projects a longitude/latitude pair (degrees) to meters.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let theta = self.n * (lon - self.lon0).to_radians();
        let rho = EARTH_RADIUS_M / self.n * (self.c - 2.0 * self.n * phi.sin()).sqrt();

        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Projects every coordinate of a geometry.
    pub fn project_geometry(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        geometry.map_coords(|Coord { x, y }| {
            let (px, py) = self.project(x, y);
            Coord { x: px, y: py }
        })
    }
}
