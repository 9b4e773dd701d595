//! Tabular geometry collections.
//!
//! A [`GeoTable`] pairs attribute columns with a geometry column, the
//! shape every fetch operation in this crate returns. It is deliberately
//! small: enough filtering and subsetting to express the operations the
//! Census workflows need, with GeoJSON export for everything downstream.

mod geojson;

use std::fmt;

use geo::algorithm::{BoundingRect, Intersects};
use geo_types::{Geometry, Rect};

use crate::error::{Error, Result};

/// A single attribute cell.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Num(f64),
    Int(i64),
    Bool(bool),
    Null,
}

impl AttrValue {
    /// Returns the string content, if this is a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            AttrValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// True for [`AttrValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::Num(n) => write!(f, "{}", n),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Null => Ok(()),
        }
    }
}

/// Coordinate reference system of a table's geometry column.
///
/// TIGER/Line and cartographic boundary files ship in NAD83 (EPSG:4269);
/// the `.prj` member is carried verbatim when present.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Crs {
    /// No CRS information available.
    #[default]
    Unknown,
    /// An EPSG code (4269 for TIGER sources, 4326 for geocoder points).
    Epsg(u32),
    /// The continental-US Albers display frame used by `shift_geometry`.
    AlbersUsa,
    /// Raw WKT from a shapefile `.prj` member.
    Wkt(String),
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Unknown => write!(f, "unknown"),
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::AlbersUsa => write!(f, "US Albers equal-area (ESRI:102003)"),
            Crs::Wkt(wkt) => write!(f, "{}", wkt),
        }
    }
}

/// A subset directive applied after an archive is parsed.
///
/// Mirrors the retrieval-time filters callers typically want: a bounding
/// box, the first `n` rows, or intersection with a reference geometry.
#[derive(Debug, Clone)]
pub enum Subset {
    /// Keep rows whose geometry intersects the box (minx, miny, maxx, maxy).
    BoundingBox(Rect<f64>),
    /// Keep the first `n` rows.
    Head(usize),
    /// Keep rows whose geometry intersects the reference geometry.
    Intersects(Geometry<f64>),
}

/// A tabular geometry collection: attribute columns plus one geometry per row.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable {
    columns: Vec<String>,
    rows: Vec<Vec<AttrValue>>,
    geometries: Vec<Geometry<f64>>,
    crs: Crs,
}

impl GeoTable {
    /// Creates an empty table with the given column names.
    pub fn new(columns: Vec<String>, crs: Crs) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            geometries: Vec::new(),
            crs,
        }
    }

    /// Appends a row. The attribute count must match the column count.
    pub fn push_row(&mut self, attrs: Vec<AttrValue>, geometry: Geometry<f64>) -> Result<()> {
        if attrs.len() != self.columns.len() {
            return Err(Error::InvalidArgument(format!(
                "row has {} values but the table has {} columns",
                attrs.len(),
                self.columns.len()
            )));
        }
        self.rows.push(attrs);
        self.geometries.push(geometry);
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The table's coordinate reference system.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Replaces the CRS tag.
    pub fn set_crs(&mut self, crs: Crs) {
        self.crs = crs;
    }

    /// All geometries, row order.
    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    /// The geometry of one row.
    pub fn geometry(&self, row: usize) -> Option<&Geometry<f64>> {
        self.geometries.get(row)
    }

    /// Replaces the geometry of one row.
    pub fn set_geometry(&mut self, row: usize, geometry: Geometry<f64>) {
        if let Some(slot) = self.geometries.get_mut(row) {
            *slot = geometry;
        }
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The first column whose name starts with `prefix`, if any.
    pub fn first_column_starting_with(&self, prefix: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.starts_with(prefix))
            .map(|c| c.as_str())
    }

    /// One attribute cell.
    pub fn value(&self, row: usize, column: &str) -> Option<&AttrValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// One attribute cell as a string slice.
    pub fn str_value(&self, row: usize, column: &str) -> Option<&str> {
        self.value(row, column)?.as_str()
    }

    /// Attribute cells of one row, in column order.
    pub fn row(&self, row: usize) -> Option<&[AttrValue]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Returns a new table containing the rows the predicate accepts.
    pub fn filter<F>(&self, mut predicate: F) -> GeoTable
    where
        F: FnMut(&GeoTable, usize) -> bool,
    {
        let mut out = GeoTable::new(self.columns.clone(), self.crs.clone());
        for row in 0..self.len() {
            if predicate(self, row) {
                out.rows.push(self.rows[row].clone());
                out.geometries.push(self.geometries[row].clone());
            }
        }
        out
    }

    /// Keeps rows whose `column` value is one of `values`.
    pub fn filter_in(&self, column: &str, values: &[String]) -> Result<GeoTable> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))?;

        Ok(self.filter(|table, row| {
            table.rows[row][idx]
                .as_str()
                .map(|v| values.iter().any(|wanted| wanted == v))
                .unwrap_or(false)
        }))
    }

    /// Keeps rows whose `column` value starts with any of `prefixes`.
    pub fn filter_starts_with(&self, column: &str, prefixes: &[&str]) -> Result<GeoTable> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))?;

        Ok(self.filter(|table, row| {
            table.rows[row][idx]
                .as_str()
                .map(|v| prefixes.iter().any(|p| v.starts_with(p)))
                .unwrap_or(false)
        }))
    }

    /// Returns the first `n` rows.
    pub fn head(&self, n: usize) -> GeoTable {
        let mut out = GeoTable::new(self.columns.clone(), self.crs.clone());
        let take = n.min(self.len());
        out.rows.extend_from_slice(&self.rows[..take]);
        out.geometries.extend_from_slice(&self.geometries[..take]);
        out
    }

    /// Returns a table reduced to the named columns, preserving geometry.
    pub fn select(&self, columns: &[&str]) -> Result<GeoTable> {
        let mut indices = Vec::with_capacity(columns.len());
        for name in columns {
            let idx = self
                .column_index(name)
                .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
            indices.push(idx);
        }

        let mut out = GeoTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            self.crs.clone(),
        );
        for (row, geometry) in self.rows.iter().zip(&self.geometries) {
            out.rows
                .push(indices.iter().map(|&i| row[i].clone()).collect());
            out.geometries.push(geometry.clone());
        }
        Ok(out)
    }

    /// Applies a [`Subset`] directive.
    pub fn subset(&self, subset: &Subset) -> GeoTable {
        match subset {
            Subset::Head(n) => self.head(*n),
            Subset::BoundingBox(rect) => {
                let window = rect.to_polygon();
                self.filter(|table, row| table.geometries[row].intersects(&window))
            }
            Subset::Intersects(reference) => {
                self.filter(|table, row| table.geometries[row].intersects(reference))
            }
        }
    }

    /// Concatenates tables with identical columns into one.
    ///
    /// The CRS of the first table wins; the input must be non-empty.
    pub fn concat(tables: Vec<GeoTable>) -> Result<GeoTable> {
        let mut iter = tables.into_iter();
        let mut out = iter
            .next()
            .ok_or_else(|| Error::InvalidArgument("no tables to concatenate".to_string()))?;

        for table in iter {
            if table.columns != out.columns {
                return Err(Error::ColumnMismatch);
            }
            out.rows.extend(table.rows);
            out.geometries.extend(table.geometries);
        }
        Ok(out)
    }

    /// The total bounds of every geometry in the table.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut bounds: Option<Rect<f64>> = None;
        for geometry in &self.geometries {
            let rect = match geometry.bounding_rect() {
                Some(r) => r,
                None => continue,
            };
            bounds = Some(match bounds {
                None => rect,
                Some(acc) => Rect::new(
                    geo_types::coord! {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    geo_types::coord! {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                ),
            });
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, point, polygon};

    fn sample_table() -> GeoTable {
        let mut table = GeoTable::new(
            vec![
                "GEOID".to_string(),
                "STATEFP".to_string(),
                "ALAND".to_string(),
            ],
            Crs::Epsg(4269),
        );
        let rows = [
            ("48201", "48", 1_000.0, (0.0, 0.0)),
            ("48453", "48", 2_000.0, (10.0, 10.0)),
            ("06037", "06", 3_000.0, (20.0, 20.0)),
        ];
        for (geoid, state, aland, (x, y)) in rows {
            table
                .push_row(
                    vec![
                        AttrValue::Str(geoid.to_string()),
                        AttrValue::Str(state.to_string()),
                        AttrValue::Num(aland),
                    ],
                    Geometry::Point(point! { x: x, y: y }),
                )
                .unwrap();
        }
        table
    }

    #[test]
    fn test_push_row_checks_arity() {
        let mut table = GeoTable::new(vec!["A".to_string()], Crs::Unknown);
        let result = table.push_row(
            vec![AttrValue::Null, AttrValue::Null],
            Geometry::Point(point! { x: 0.0, y: 0.0 }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_in() {
        let table = sample_table();
        let texas = table.filter_in("STATEFP", &["48".to_string()]).unwrap();
        assert_eq!(texas.len(), 2);
        assert_eq!(texas.str_value(0, "GEOID"), Some("48201"));
    }

    #[test]
    fn test_filter_in_unknown_column() {
        let table = sample_table();
        assert!(matches!(
            table.filter_in("NOPE", &["x".to_string()]),
            Err(Error::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_filter_starts_with() {
        let table = sample_table();
        let matched = table.filter_starts_with("GEOID", &["060"]).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.str_value(0, "GEOID"), Some("06037"));
    }

    #[test]
    fn test_head() {
        let table = sample_table();
        assert_eq!(table.head(2).len(), 2);
        assert_eq!(table.head(10).len(), 3);
    }

    #[test]
    fn test_select() {
        let table = sample_table();
        let slim = table.select(&["GEOID"]).unwrap();
        assert_eq!(slim.columns(), ["GEOID".to_string()]);
        assert_eq!(slim.len(), 3);
        assert!(slim.geometry(0).is_some());
    }

    #[test]
    fn test_subset_bounding_box() {
        let table = sample_table();
        let rect = Rect::new(coord! { x: -1.0, y: -1.0 }, coord! { x: 11.0, y: 11.0 });
        let subset = table.subset(&Subset::BoundingBox(rect));
        assert_eq!(subset.len(), 2);
    }

    #[test]
    fn test_subset_intersects() {
        let table = sample_table();
        let reference = Geometry::Polygon(polygon![
            (x: 15.0, y: 15.0),
            (x: 25.0, y: 15.0),
            (x: 25.0, y: 25.0),
            (x: 15.0, y: 25.0),
        ]);
        let subset = table.subset(&Subset::Intersects(reference));
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.str_value(0, "GEOID"), Some("06037"));
    }

    #[test]
    fn test_concat() {
        let a = sample_table();
        let b = sample_table();
        let combined = GeoTable::concat(vec![a, b]).unwrap();
        assert_eq!(combined.len(), 6);
    }

    #[test]
    fn test_concat_column_mismatch() {
        let a = sample_table();
        let b = GeoTable::new(vec!["OTHER".to_string()], Crs::Unknown);
        assert!(matches!(
            GeoTable::concat(vec![a, b]),
            Err(Error::ColumnMismatch)
        ));
    }

    #[test]
    fn test_bounds() {
        let table = sample_table();
        let bounds = table.bounds().unwrap();
        assert_eq!(bounds.min(), coord! { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), coord! { x: 20.0, y: 20.0 });
    }

    #[test]
    fn test_first_column_starting_with() {
        let mut table = GeoTable::new(
            vec!["ZCTA5CE20".to_string(), "ALAND20".to_string()],
            Crs::Unknown,
        );
        table
            .push_row(
                vec![
                    AttrValue::Str("78701".to_string()),
                    AttrValue::Num(1.0),
                ],
                Geometry::Point(point! { x: 0.0, y: 0.0 }),
            )
            .unwrap();
        assert_eq!(table.first_column_starting_with("ZCTA"), Some("ZCTA5CE20"));
        assert_eq!(table.first_column_starting_with("NOPE"), None);
    }
}
