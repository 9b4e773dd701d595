//! GeoJSON export for [`GeoTable`].

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};

use super::{AttrValue, GeoTable};
use crate::error::Result;

impl GeoTable {
    /// Converts the table into a GeoJSON feature collection.
    ///
    /// Each row becomes one feature; attribute cells become properties.
    /// Geometry coordinates are exported as-is, so callers who need
    /// standards-conformant WGS84 output should keep the table in its
    /// native longitude/latitude CRS.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut features = Vec::with_capacity(self.len());

        for row in 0..self.len() {
            let mut properties = JsonObject::new();
            for (column, value) in self.columns().iter().zip(self.row(row).unwrap_or(&[])) {
                properties.insert(column.clone(), json_value(value));
            }

            features.push(Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::from(&self.geometries()[row])),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Serializes the table as a GeoJSON string.
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson())?)
    }
}

fn json_value(value: &AttrValue) -> JsonValue {
    match value {
        AttrValue::Str(s) => JsonValue::String(s.clone()),
        AttrValue::Num(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AttrValue::Int(i) => JsonValue::Number((*i).into()),
        AttrValue::Bool(b) => JsonValue::Bool(*b),
        AttrValue::Null => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Crs;
    use geo_types::{point, Geometry};

    #[test]
    fn test_to_geojson() {
        let mut table = GeoTable::new(
            vec!["GEOID".to_string(), "ALAND".to_string()],
            Crs::Epsg(4269),
        );
        table
            .push_row(
                vec![
                    AttrValue::Str("48201".to_string()),
                    AttrValue::Int(1000),
                ],
                Geometry::Point(point! { x: -95.4, y: 29.8 }),
            )
            .unwrap();

        let collection = table.to_geojson();
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["GEOID"], JsonValue::String("48201".to_string()));
        assert_eq!(properties["ALAND"], JsonValue::Number(1000.into()));
        assert!(feature.geometry.is_some());
    }

    #[test]
    fn test_to_geojson_string() {
        let mut table = GeoTable::new(vec!["NAME".to_string()], Crs::Epsg(4269));
        table
            .push_row(
                vec![AttrValue::Str("Travis".to_string())],
                Geometry::Point(point! { x: -97.7, y: 30.3 }),
            )
            .unwrap();

        let json = table.to_geojson_string().unwrap();
        assert!(json.contains("\"FeatureCollection\""));
        assert!(json.contains("\"Travis\""));
        assert!(json.contains("\"Point\""));
    }
}
