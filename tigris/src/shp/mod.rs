//! Zipped shapefile parsing.
//!
//! Every Census download is a zip archive holding at least `.shp`, `.dbf`
//! and `.prj` members. This module unpacks the archive in memory, decodes
//! shapes into `geo-types` geometries and dBASE records into attribute
//! rows, and assembles a [`GeoTable`].

use std::io::Cursor;

use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::table::{AttrValue, Crs, GeoTable};

/// The members of a shapefile archive needed to build a table.
struct ArchiveMembers {
    shp: Vec<u8>,
    dbf: Vec<u8>,
    prj: Option<String>,
}

/// Parses a zipped shapefile into a [`GeoTable`].
pub fn parse_zip(bytes: &[u8]) -> Result<GeoTable> {
    let members = unpack(bytes)?;

    let crs = members
        .prj
        .as_deref()
        .map(crs_from_wkt)
        .unwrap_or_default();

    let mut dbf_reader = shapefile::dbase::Reader::new(Cursor::new(members.dbf.as_slice()))
        .map_err(|e| Error::Shapefile(e.to_string()))?;

    let columns: Vec<String> = dbf_reader
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .filter(|name| name != "DeletionFlag")
        .collect();

    let mut rows = Vec::new();
    for record in dbf_reader.iter_records() {
        let record = record.map_err(|e| Error::Shapefile(e.to_string()))?;
        let row: Vec<AttrValue> = columns
            .iter()
            .map(|name| record.get(name).map(attr_value).unwrap_or(AttrValue::Null))
            .collect();
        rows.push(row);
    }

    let mut shape_reader = shapefile::ShapeReader::new(Cursor::new(members.shp.as_slice()))
        .map_err(|e| Error::Shapefile(e.to_string()))?;

    let mut table = GeoTable::new(columns, crs);
    for (shape, row) in shape_reader
        .iter_shapes()
        .zip(rows)
    {
        let shape = shape.map_err(|e| Error::Shapefile(e.to_string()))?;
        if let Some(geometry) = shape_to_geometry(shape) {
            table.push_row(row, geometry)?;
        }
    }

    debug!(rows = table.len(), crs = %table.crs(), "parsed shapefile archive");
    Ok(table)
}

fn unpack(bytes: &[u8]) -> Result<ArchiveMembers> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut shp = None;
    let mut dbf = None;
    let mut prj = None;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let name = file.name().to_ascii_lowercase();
        // Some archives carry macOS resource forks; skip them.
        if name.rsplit('/').next().is_some_and(|n| n.starts_with("._")) {
            continue;
        }

        let mut contents = Vec::with_capacity(file.size() as usize);
        std::io::copy(&mut file, &mut contents)?;

        if name.ends_with(".shp") {
            shp = Some(contents);
        } else if name.ends_with(".dbf") {
            dbf = Some(contents);
        } else if name.ends_with(".prj") {
            prj = Some(String::from_utf8_lossy(&contents).into_owned());
        }
    }

    Ok(ArchiveMembers {
        shp: shp.ok_or(Error::MissingMember(".shp"))?,
        dbf: dbf.ok_or(Error::MissingMember(".dbf"))?,
        prj,
    })
}

/// Maps a `.prj` WKT string onto a [`Crs`] tag.
///
/// TIGER/Line and cartographic boundary files ship in NAD83; recognizing
/// the common datums lets downstream transforms know they hold
/// longitude/latitude coordinates without a projection engine.
fn crs_from_wkt(wkt: &str) -> Crs {
    if wkt.contains("North_American_1983") || wkt.contains("NAD83") {
        Crs::Epsg(4269)
    } else if wkt.contains("WGS_1984") || wkt.contains("WGS 84") {
        Crs::Epsg(4326)
    } else {
        Crs::Wkt(wkt.to_string())
    }
}

fn attr_value(value: &FieldValue) -> AttrValue {
    match value {
        FieldValue::Character(Some(s)) => AttrValue::Str(s.trim_end().to_string()),
        FieldValue::Character(None) => AttrValue::Null,
        FieldValue::Numeric(Some(n)) => AttrValue::Num(*n),
        FieldValue::Numeric(None) => AttrValue::Null,
        FieldValue::Float(Some(f)) => AttrValue::Num(f64::from(*f)),
        FieldValue::Float(None) => AttrValue::Null,
        FieldValue::Integer(i) => AttrValue::Int(i64::from(*i)),
        FieldValue::Double(d) => AttrValue::Num(*d),
        FieldValue::Currency(c) => AttrValue::Num(*c),
        FieldValue::Logical(Some(b)) => AttrValue::Bool(*b),
        FieldValue::Logical(None) => AttrValue::Null,
        FieldValue::Date(Some(d)) => AttrValue::Str(format!(
            "{:04}-{:02}-{:02}",
            d.year(),
            d.month(),
            d.day()
        )),
        FieldValue::Date(None) => AttrValue::Null,
        _ => AttrValue::Null,
    }
}

macro_rules! polyline_to_geometry {
    ($polyline:expr) => {{
        let mut lines: Vec<geo_types::LineString<f64>> = $polyline
            .parts()
            .iter()
            .map(|part| {
                part.iter()
                    .map(|p| geo_types::coord! { x: p.x, y: p.y })
                    .collect()
            })
            .collect();
        if lines.len() == 1 {
            Some(geo_types::Geometry::LineString(lines.remove(0)))
        } else {
            Some(geo_types::Geometry::MultiLineString(
                geo_types::MultiLineString(lines),
            ))
        }
    }};
}

macro_rules! polygon_to_geometry {
    ($polygon:expr) => {{
        // Inner rings follow the outer ring they belong to, so attach each
        // hole to the most recently seen exterior.
        let mut polygons: Vec<geo_types::Polygon<f64>> = Vec::new();
        for ring in $polygon.rings() {
            let coords: geo_types::LineString<f64> = ring
                .points()
                .iter()
                .map(|p| geo_types::coord! { x: p.x, y: p.y })
                .collect();
            match ring {
                PolygonRing::Outer(_) => {
                    polygons.push(geo_types::Polygon::new(coords, Vec::new()));
                }
                PolygonRing::Inner(_) => {
                    if let Some(last) = polygons.last_mut() {
                        last.interiors_push(coords);
                    }
                }
            }
        }
        if polygons.is_empty() {
            None
        } else if polygons.len() == 1 {
            Some(geo_types::Geometry::Polygon(polygons.remove(0)))
        } else {
            Some(geo_types::Geometry::MultiPolygon(
                geo_types::MultiPolygon(polygons),
            ))
        }
    }};
}

/// Converts one shapefile shape into a `geo-types` geometry.
///
/// M and Z variants are flattened to 2D; null shapes are dropped.
fn shape_to_geometry(shape: Shape) -> Option<geo_types::Geometry<f64>> {
    match shape {
        Shape::NullShape => None,
        Shape::Point(p) => Some(geo_types::Geometry::Point(geo_types::point! {
            x: p.x, y: p.y
        })),
        Shape::PointM(p) => Some(geo_types::Geometry::Point(geo_types::point! {
            x: p.x, y: p.y
        })),
        Shape::PointZ(p) => Some(geo_types::Geometry::Point(geo_types::point! {
            x: p.x, y: p.y
        })),
        Shape::Multipoint(mp) => Some(geo_types::Geometry::MultiPoint(
            mp.points()
                .iter()
                .map(|p| geo_types::point! { x: p.x, y: p.y })
                .collect(),
        )),
        Shape::Polyline(pl) => polyline_to_geometry!(pl),
        Shape::PolylineM(pl) => polyline_to_geometry!(pl),
        Shape::PolylineZ(pl) => polyline_to_geometry!(pl),
        Shape::Polygon(poly) => polygon_to_geometry!(poly),
        Shape::PolygonM(poly) => polygon_to_geometry!(poly),
        Shape::PolygonZ(poly) => polygon_to_geometry!(poly),
        _ => None,
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use shapefile::dbase::{Record, TableWriterBuilder};
    use shapefile::{Point, Polygon};
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const NAD83_WKT: &str = "GEOGCS[\"GCS_North_American_1983\",\
        DATUM[\"D_North_American_1983\",SPHEROID[\"GRS_1980\",6378137,298.257222101]],\
        PRIMEM[\"Greenwich\",0],UNIT[\"Degree\",0.0174532925199433]]";

    /// Builds a zipped point shapefile with NAME/GEOID columns.
    pub fn point_archive(rows: &[(&str, &str, f64, f64)]) -> Vec<u8> {
        let rows: Vec<(Vec<&str>, (f64, f64))> = rows
            .iter()
            .map(|(name, geoid, x, y)| (vec![*name, *geoid], (*x, *y)))
            .collect();
        character_archive(&["NAME", "GEOID"], &rows)
    }

    /// Builds a zipped point shapefile with arbitrary character columns.
    pub fn character_archive(columns: &[&str], rows: &[(Vec<&str>, (f64, f64))]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("layer");

        let mut table = TableWriterBuilder::new();
        for column in columns {
            table = table.add_character_field((*column).try_into().unwrap(), 80);
        }
        let mut writer =
            shapefile::Writer::from_path(base.with_extension("shp"), table).unwrap();

        for (values, (x, y)) in rows {
            let mut record = Record::default();
            for (column, value) in columns.iter().zip(values) {
                record.insert(
                    column.to_string(),
                    FieldValue::Character(Some(value.to_string())),
                );
            }
            writer
                .write_shape_and_record(&Point::new(*x, *y), &record)
                .unwrap();
        }
        drop(writer);

        zip_members(&[
            ("layer.shp", &std::fs::read(base.with_extension("shp")).unwrap()),
            ("layer.dbf", &std::fs::read(base.with_extension("dbf")).unwrap()),
            ("layer.prj", NAD83_WKT.as_bytes()),
        ])
    }

    /// Builds a zipped polygon shapefile; each row is an axis-aligned
    /// rectangle given as (minx, miny, maxx, maxy).
    pub fn rect_archive(columns: &[&str], rows: &[(Vec<&str>, [f64; 4])]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("layer");

        let mut table = TableWriterBuilder::new();
        for column in columns {
            table = table.add_character_field((*column).try_into().unwrap(), 80);
        }
        let mut writer =
            shapefile::Writer::from_path(base.with_extension("shp"), table).unwrap();

        for (values, [minx, miny, maxx, maxy]) in rows {
            let mut record = Record::default();
            for (column, value) in columns.iter().zip(values) {
                record.insert(
                    column.to_string(),
                    FieldValue::Character(Some(value.to_string())),
                );
            }
            // Outer rings are clockwise in the shapefile convention.
            let ring = vec![
                Point::new(*minx, *miny),
                Point::new(*minx, *maxy),
                Point::new(*maxx, *maxy),
                Point::new(*maxx, *miny),
                Point::new(*minx, *miny),
            ];
            let polygon = Polygon::with_rings(vec![PolygonRing::Outer(ring)]);
            writer.write_shape_and_record(&polygon, &record).unwrap();
        }
        drop(writer);

        zip_members(&[
            ("layer.shp", &std::fs::read(base.with_extension("shp")).unwrap()),
            ("layer.dbf", &std::fs::read(base.with_extension("dbf")).unwrap()),
            ("layer.prj", NAD83_WKT.as_bytes()),
        ])
    }

    fn zip_members(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in members {
            zip.start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_parse_zip_points() {
        let archive = point_archive(&[
            ("Travis County", "48453", -97.7, 30.3),
            ("Harris County", "48201", -95.4, 29.8),
        ]);

        let table = parse_zip(&archive).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["NAME".to_string(), "GEOID".to_string()]);
        assert_eq!(table.crs(), &Crs::Epsg(4269));
        assert_eq!(table.str_value(0, "NAME"), Some("Travis County"));
        assert_eq!(table.str_value(1, "GEOID"), Some("48201"));

        match table.geometry(0).unwrap() {
            geo_types::Geometry::Point(p) => {
                assert_eq!(p.x(), -97.7);
                assert_eq!(p.y(), 30.3);
            }
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_zip_missing_members() {
        let archive = zip_members(&[("layer.shp", &[0u8; 4])]);
        assert!(matches!(
            parse_zip(&archive),
            Err(Error::MissingMember(".dbf"))
        ));
    }

    #[test]
    fn test_polygon_holes_attach_to_preceding_exterior() {
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        let inner = vec![
            Point::new(4.0, 4.0),
            Point::new(6.0, 4.0),
            Point::new(6.0, 6.0),
            Point::new(4.0, 6.0),
            Point::new(4.0, 4.0),
        ];
        let polygon = Polygon::with_rings(vec![
            PolygonRing::Outer(outer),
            PolygonRing::Inner(inner),
        ]);

        match shape_to_geometry(Shape::Polygon(polygon)).unwrap() {
            geo_types::Geometry::Polygon(p) => {
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("expected a polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_crs_from_wkt() {
        assert_eq!(crs_from_wkt(NAD83_WKT), Crs::Epsg(4269));
        assert_eq!(
            crs_from_wkt("GEOGCS[\"GCS_WGS_1984\",...]"),
            Crs::Epsg(4326)
        );
        assert!(matches!(
            crs_from_wkt("PROJCS[\"Custom\",...]"),
            Crs::Wkt(_)
        ));
    }
}
