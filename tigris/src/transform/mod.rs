//! Cartographic post-processing: the Alaska/Hawaii/Puerto Rico inset
//! rearrangement and water-area erasure.

mod albers;

pub use albers::AlbersProjection;

use geo::algorithm::{BooleanOps, Centroid, Intersects, Scale, Translate};
use geo_types::{coord, Coord, Geometry, MultiPolygon, Rect};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::table::{Crs, GeoTable};
use crate::tiger::{Resolution, TigerClient, TigerOptions};

/// Where to place Alaska, Hawaii, and Puerto Rico relative to the
/// continental United States.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftPosition {
    /// Inset the three areas below the continental US (the familiar
    /// election-map arrangement).
    #[default]
    Below,
    /// Place them outside the continental US, roughly toward their
    /// actual geographic positions.
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Conus,
    Alaska,
    Hawaii,
    PuertoRico,
}

// Geographic centroids of the three shifted states; features are
// recentered on these so that separately fetched layers line up.
const ALASKA_CENTROID: (f64, f64) = (-152.2782, 64.0685);
const HAWAII_CENTROID: (f64, f64) = (-156.3737, 20.2927);
const PUERTO_RICO_CENTROID: (f64, f64) = (-66.4167, 18.2208);

/// Rearranges Alaska, Hawaii, and Puerto Rico for national display maps.
///
/// The output is projected into a continental-US Albers equal-area frame.
/// Features are assigned to a state either by the first two digits of
/// `geoid_column` or, when no column is given, by where their centroid
/// falls. Without `preserve_area`, Alaska is drawn at half size while
/// Hawaii and Puerto Rico are enlarged 1.5x and 2.5x.
///
/// The input must be in longitude/latitude coordinates.
pub fn shift_geometry(
    table: &GeoTable,
    geoid_column: Option<&str>,
    preserve_area: bool,
    position: ShiftPosition,
) -> Result<GeoTable> {
    if table.crs() == &Crs::AlbersUsa {
        return Err(Error::InvalidArgument(
            "the input is already in the shifted Albers frame".to_string(),
        ));
    }

    let conus = AlbersProjection::conus();
    let bounds = lower48_bounds();
    let (x0, y0) = (bounds.min().x, bounds.min().y);
    let (w, h) = (bounds.width(), bounds.height());

    let frames: Vec<Frame> = (0..table.len())
        .map(|row| classify_row(table, row, geoid_column))
        .collect::<Result<Vec<_>>>()?;

    if frames.iter().all(|f| *f == Frame::Conus) {
        warn!("no features in Alaska, Hawaii, or Puerto Rico; projecting only");
    }

    let mut out = GeoTable::new(table.columns().to_vec(), Crs::AlbersUsa);
    for (row, frame) in frames.iter().enumerate() {
        let attrs = table.row(row).unwrap_or(&[]).to_vec();
        let geometry = &table.geometries()[row];

        let shifted = match frame {
            Frame::Conus => conus.project_geometry(geometry),
            Frame::Alaska => {
                let (scale, fx, fy) = match (preserve_area, position) {
                    (false, ShiftPosition::Below) => (0.5, 0.06, -0.14),
                    (false, ShiftPosition::Outside) => (0.5, -0.08, 0.92),
                    (true, ShiftPosition::Below) => (1.0, 0.2, -0.13),
                    (true, ShiftPosition::Outside) => (1.0, -0.25, 1.35),
                };
                place(
                    &AlbersProjection::alaska(),
                    ALASKA_CENTROID,
                    geometry,
                    scale,
                    coord! { x: x0 + fx * w, y: y0 + fy * h },
                )
            }
            Frame::Hawaii => {
                let (scale, fx, fy) = match (preserve_area, position) {
                    (false, ShiftPosition::Below) => (1.5, 0.32, 0.2),
                    (false, ShiftPosition::Outside) => (1.5, 0.05, 0.35),
                    (true, ShiftPosition::Below) => (1.0, 0.6, -0.1),
                    (true, ShiftPosition::Outside) => (1.0, 0.0, 0.2),
                };
                place(
                    &AlbersProjection::hawaii(),
                    HAWAII_CENTROID,
                    geometry,
                    scale,
                    coord! { x: x0 + fx * w, y: y0 + fy * h },
                )
            }
            Frame::PuertoRico => {
                let (scale, fx, fy) = match (preserve_area, position) {
                    (false, ShiftPosition::Below) => (2.5, 0.75, 0.15),
                    (false, ShiftPosition::Outside) => (2.5, 1.0, 0.05),
                    (true, ShiftPosition::Below) => (1.0, 0.75, -0.1),
                    (true, ShiftPosition::Outside) => (1.0, 0.95, -0.05),
                };
                place(
                    &AlbersProjection::puerto_rico(),
                    PUERTO_RICO_CENTROID,
                    geometry,
                    scale,
                    coord! { x: x0 + fx * w, y: y0 + fy * h },
                )
            }
        };

        out.push_row(attrs, shifted)?;
    }
    Ok(out)
}

/// Recenters a geometry on its state centroid, rescales it, and drops
/// it at `target` in the continental frame.
fn place(
    projection: &AlbersProjection,
    centroid: (f64, f64),
    geometry: &Geometry<f64>,
    scale: f64,
    target: Coord<f64>,
) -> Geometry<f64> {
    let (cx, cy) = projection.project(centroid.0, centroid.1);
    projection
        .project_geometry(geometry)
        .translate(-cx, -cy)
        .scale_around_point(scale, scale, coord! { x: cx, y: cy })
        .translate(target.x, target.y)
}

fn classify_row(table: &GeoTable, row: usize, geoid_column: Option<&str>) -> Result<Frame> {
    if let Some(column) = geoid_column {
        let geoid = table
            .str_value(row, column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))?;
        return Ok(match geoid.get(..2) {
            Some("02") => Frame::Alaska,
            Some("15") => Frame::Hawaii,
            Some("72") => Frame::PuertoRico,
            _ => Frame::Conus,
        });
    }

    let centroid = table.geometries()[row].centroid().ok_or_else(|| {
        Error::InvalidArgument("a feature has no centroid; supply a GEOID column".to_string())
    })?;
    let (lon, lat) = (centroid.x(), centroid.y());

    // The Aleutians cross the antimeridian, hence the positive-longitude
    // check for Alaska.
    Ok(if lat >= 50.0 || lon >= 170.0 {
        Frame::Alaska
    } else if lon <= -140.0 {
        Frame::Hawaii
    } else if lat <= 19.5 && lon >= -68.0 {
        Frame::PuertoRico
    } else {
        Frame::Conus
    })
}

/// Projected bounds of the lower 48 states, derived from the extreme
/// points of the continental coastline and borders.
fn lower48_bounds() -> Rect<f64> {
    const EXTREMES: [(f64, f64); 8] = [
        (-124.78, 48.40),
        (-124.41, 40.44),
        (-117.12, 32.53),
        (-97.14, 25.84),
        (-80.03, 25.13),
        (-66.95, 44.82),
        (-95.15, 49.38),
        (-123.03, 49.00),
    ];

    let conus = AlbersProjection::conus();
    let mut min = coord! { x: f64::MAX, y: f64::MAX };
    let mut max = coord! { x: f64::MIN, y: f64::MIN };
    for (lon, lat) in EXTREMES {
        let (x, y) = conus.project(lon, lat);
        min.x = min.x.min(x);
        min.y = min.y.min(y);
        max.x = max.x.max(x);
        max.y = max.y.max(y);
    }
    Rect::new(min, max)
}

impl<C: HttpClient> TigerClient<C> {
    /// Removes water area from the polygons of `input`.
    ///
    /// Counties overlapping the input are identified, their area water
    /// layers fetched, and every water body whose `AWATER` percentile
    /// rank is at least `area_threshold` is subtracted from the input
    /// polygons. The conventional threshold of 0.75 keeps the erase
    /// fast by only carving out the largest water bodies.
    pub fn erase_water(
        &self,
        input: &GeoTable,
        area_threshold: f64,
        options: &TigerOptions,
    ) -> Result<GeoTable> {
        let counties = self.counties(
            None,
            &TigerOptions {
                cb: true,
                resolution: Resolution::R500k,
                subset: None,
                ..options.clone()
            },
        )?;

        let mut county_ids: Vec<String> = Vec::new();
        for row in 0..counties.len() {
            let geometry = &counties.geometries()[row];
            if input.geometries().iter().any(|g| g.intersects(geometry)) {
                if let Some(geoid) = counties.str_value(row, "GEOID") {
                    county_ids.push(geoid.to_string());
                }
            }
        }

        if county_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "the input does not overlap any US county".to_string(),
            ));
        }
        info!(counties = county_ids.len(), "erasing water from input");

        let mut water_tables = Vec::new();
        for geoid in &county_ids {
            let (state, county) = geoid.split_at(2);
            water_tables.push(self.area_water(state, &[county], options)?);
        }
        let water = GeoTable::concat(water_tables)?;

        let areas: Vec<f64> = (0..water.len())
            .map(|row| water_area(&water, row))
            .collect();
        let keep: Vec<MultiPolygon<f64>> = (0..water.len())
            .filter(|&row| percentile_rank(&areas, areas[row]) >= area_threshold)
            .filter_map(|row| to_multi_polygon(&water.geometries()[row]))
            .collect();

        let mut out = input.clone();
        for row in 0..out.len() {
            let Some(mut polygon) = to_multi_polygon(&out.geometries()[row]) else {
                continue;
            };
            for water_body in &keep {
                if polygon.intersects(water_body) {
                    polygon = polygon.difference(water_body);
                }
            }
            out.set_geometry(row, Geometry::MultiPolygon(polygon));
        }
        Ok(out)
    }
}

fn water_area(table: &GeoTable, row: usize) -> f64 {
    match table.value(row, "AWATER") {
        Some(value) => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or(0.0),
        None => 0.0,
    }
}

/// Fraction of values at or below `value`.
fn percentile_rank(values: &[f64], value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let at_or_below = values.iter().filter(|v| **v <= value).count();
    at_or_below as f64 / values.len() as f64
}

fn to_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DiskCache;
    use crate::http::tests::MockHttpClient;
    use crate::shp::tests::rect_archive;
    use crate::table::AttrValue;
    use geo::algorithm::Area;
    use geo_types::point;

    fn point_table(rows: &[(&str, f64, f64)]) -> GeoTable {
        let mut table = GeoTable::new(vec!["GEOID".to_string()], Crs::Epsg(4269));
        for (geoid, lon, lat) in rows {
            table
                .push_row(
                    vec![AttrValue::Str(geoid.to_string())],
                    Geometry::Point(point! { x: *lon, y: *lat }),
                )
                .unwrap();
        }
        table
    }

    #[test]
    fn test_shift_geometry_moves_alaska_below() {
        let table = point_table(&[
            ("48453", -97.7, 30.3),
            ("02020", -149.9, 61.2),
        ]);

        let shifted = shift_geometry(&table, Some("GEOID"), false, ShiftPosition::Below).unwrap();
        assert_eq!(shifted.len(), 2);
        assert_eq!(shifted.crs(), &Crs::AlbersUsa);

        let texas_y = match shifted.geometry(0).unwrap() {
            Geometry::Point(p) => p.y(),
            other => panic!("expected a point, got {:?}", other),
        };
        let alaska_y = match shifted.geometry(1).unwrap() {
            Geometry::Point(p) => p.y(),
            other => panic!("expected a point, got {:?}", other),
        };
        assert!(alaska_y < texas_y);
    }

    #[test]
    fn test_shift_geometry_classifies_by_centroid() {
        let table = point_table(&[
            ("a", -97.7, 30.3),
            ("b", -157.8, 21.3),
            ("c", -66.1, 18.4),
        ]);

        // Without a GEOID column the Hawaii and Puerto Rico points must
        // still move away from their raw projections.
        let shifted = shift_geometry(&table, None, false, ShiftPosition::Below).unwrap();
        let conus = AlbersProjection::conus();

        for row in 1..3 {
            let raw = conus.project_geometry(&table.geometries()[row]);
            assert_ne!(&raw, shifted.geometry(row).unwrap());
        }
    }

    #[test]
    fn test_shift_geometry_rejects_shifted_input() {
        let mut table = point_table(&[("48453", -97.7, 30.3)]);
        table.set_crs(Crs::AlbersUsa);
        assert!(shift_geometry(&table, None, false, ShiftPosition::Below).is_err());
    }

    #[test]
    fn test_percentile_rank() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile_rank(&values, 10.0), 0.25);
        assert_eq!(percentile_rank(&values, 40.0), 1.0);
        assert_eq!(percentile_rank(&[], 1.0), 0.0);
    }

    #[test]
    fn test_erase_water_carves_out_lakes() {
        // One county covering the input area, one big lake inside it.
        let counties = rect_archive(
            &["STATEFP", "COUNTYFP", "NAME", "GEOID"],
            &[(vec!["48", "453", "Travis", "48453"], [-98.0, 30.0, -97.0, 31.0])],
        );
        let water = rect_archive(
            &["HYDROID", "AWATER"],
            &[(vec!["110", "9000000"], [-97.8, 30.2, -97.6, 30.4])],
        );

        let dir = tempfile::tempdir().unwrap();
        let client = TigerClient::with_parts(
            MockHttpClient::with_routes(vec![
                ("_county".to_string(), counties),
                ("_areawater".to_string(), water),
            ]),
            DiskCache::new(dir.path().join("cache")),
        );

        let mut input = GeoTable::new(vec!["GEOID".to_string()], Crs::Epsg(4269));
        let square = Rect::new(coord! { x: -98.0, y: 30.0 }, coord! { x: -97.0, y: 31.0 })
            .to_polygon();
        input
            .push_row(
                vec![AttrValue::Str("48453".to_string())],
                Geometry::Polygon(square.clone()),
            )
            .unwrap();

        let erased = client
            .erase_water(&input, 0.0, &TigerOptions::new())
            .unwrap();
        assert_eq!(erased.len(), 1);

        let erased_area = match erased.geometry(0).unwrap() {
            Geometry::MultiPolygon(mp) => mp.unsigned_area(),
            other => panic!("expected polygons, got {:?}", other),
        };
        let lake_area = 0.2 * 0.2;
        assert!((square.unsigned_area() - erased_area - lake_area).abs() < 1e-9);
    }
}
