//! Client for the Census Bureau geocoding service.
//!
//! The geocoder turns addresses into coordinates and Census geography
//! identifiers, and coordinates back into geographies. Results come back
//! as point [`GeoTable`]s in WGS84, ready to join against shapes fetched
//! from the TIGER tree.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{HttpClient, ReqwestClient};
use crate::table::{AttrValue, Crs, GeoTable};

const GEOCODER_BASE: &str = "https://geocoding.geo.census.gov/geocoder/geographies";

/// Options shared by all geocoder requests.
#[derive(Debug, Clone)]
pub struct GeocodeOptions {
    /// Geocoder benchmark release.
    pub benchmark: String,
    /// Geography vintage within the benchmark.
    pub vintage: String,
    /// Geography layer whose identifiers to return.
    pub geography: String,
    /// Maximum number of matches to keep.
    pub limit: usize,
    /// Keep every geography attribute instead of just `GEOID`.
    pub keep_geo_cols: bool,
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        Self {
            benchmark: "Public_AR_Current".to_string(),
            vintage: "Census2020_Current".to_string(),
            geography: "Census Blocks".to_string(),
            limit: 1,
            keep_geo_cols: false,
        }
    }
}

/// Street address components for the structured endpoint.
#[derive(Debug, Clone, Default)]
pub struct StreetAddress {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

type Geographies = BTreeMap<String, Vec<serde_json::Map<String, Value>>>;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    result: GeocodeResult,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(rename = "addressMatches", default)]
    address_matches: Vec<AddressMatch>,
    #[serde(default)]
    geographies: Geographies,
}

#[derive(Debug, Deserialize)]
struct AddressMatch {
    coordinates: Coordinates,
    #[serde(default)]
    geographies: Geographies,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    x: f64,
    y: f64,
}

/// URL of a single-line address request.
pub fn onelineaddress_url(address: &str, options: &GeocodeOptions) -> Result<String> {
    build_url(
        "onelineaddress",
        &[
            ("address", address),
            ("benchmark", &options.benchmark),
            ("vintage", &options.vintage),
            ("format", "json"),
        ],
    )
}

/// URL of a structured street address request.
pub fn address_url(address: &StreetAddress, options: &GeocodeOptions) -> Result<String> {
    let mut params: Vec<(&str, &str)> = vec![("street", &address.street)];
    if let Some(city) = &address.city {
        params.push(("city", city));
    }
    if let Some(state) = &address.state {
        params.push(("state", state));
    }
    if let Some(zip) = &address.zip {
        params.push(("zip", zip));
    }
    params.push(("benchmark", &options.benchmark));
    params.push(("vintage", &options.vintage));
    params.push(("format", "json"));
    build_url("address", &params)
}

/// URL of a reverse (coordinates) lookup.
pub fn coordinates_url(longitude: f64, latitude: f64, options: &GeocodeOptions) -> Result<String> {
    build_url(
        "coordinates",
        &[
            ("x", &longitude.to_string()),
            ("y", &latitude.to_string()),
            ("benchmark", &options.benchmark),
            ("vintage", &options.vintage),
            ("format", "json"),
        ],
    )
}

fn build_url(endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
    let url = reqwest::Url::parse_with_params(&format!("{GEOCODER_BASE}/{endpoint}"), params)
        .map_err(|e| Error::Geocoder(format!("invalid request parameters: {}", e)))?;
    Ok(url.into())
}

/// Client for the Census geocoder.
pub struct Geocoder<C: HttpClient = ReqwestClient> {
    http: C,
}

impl Geocoder<ReqwestClient> {
    /// Creates a geocoder with the default HTTP transport.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: ReqwestClient::new()?,
        })
    }
}

impl<C: HttpClient> Geocoder<C> {
    /// Creates a geocoder over an explicit transport.
    pub fn with_http(http: C) -> Self {
        Self { http }
    }

    /// Geocodes a single-line address.
    ///
    /// The result echoes the input in an `address` column so several
    /// geocoded tables can be concatenated and traced back.
    pub fn geocode(&self, address: &str, options: &GeocodeOptions) -> Result<GeoTable> {
        let url = onelineaddress_url(address, options)?;
        let response = self.request(&url)?;
        let mut table = matches_to_table(&response.result.address_matches, options)?;
        append_echo_column(&mut table, "address", address)
    }

    /// Geocodes a street address given as separate components.
    pub fn geocode_components(
        &self,
        address: &StreetAddress,
        options: &GeocodeOptions,
    ) -> Result<GeoTable> {
        let url = address_url(address, options)?;
        let response = self.request(&url)?;
        let mut table = matches_to_table(&response.result.address_matches, options)?;
        append_echo_column(&mut table, "street", &address.street)
    }

    /// Looks up the Census geographies containing a coordinate.
    pub fn geolookup(
        &self,
        longitude: f64,
        latitude: f64,
        options: &GeocodeOptions,
    ) -> Result<GeoTable> {
        let url = coordinates_url(longitude, latitude, options)?;
        let response = self.request(&url)?;

        let rows = geography_rows(&response.result.geographies, options)?;
        let columns = geography_columns(&rows, options);

        let mut table = GeoTable::new(columns.clone(), Crs::Epsg(4326));
        for row in rows.iter().take(options.limit) {
            let attrs = columns
                .iter()
                .map(|col| row.get(col).map(attr_value).unwrap_or(AttrValue::Null))
                .collect();
            table.push_row(
                attrs,
                geo_types::Geometry::Point(geo_types::point! { x: longitude, y: latitude }),
            )?;
        }
        Ok(table)
    }

    fn request(&self, url: &str) -> Result<GeocodeResponse> {
        debug!(url, "geocoder request");
        let body = self.http.get(url)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Builds a point table from address matches: longitude, latitude, then
/// the geography columns.
fn matches_to_table(matches: &[AddressMatch], options: &GeocodeOptions) -> Result<GeoTable> {
    let mut rows: Vec<(f64, f64, serde_json::Map<String, Value>)> = Vec::new();
    for m in matches {
        let geographies = geography_rows(&m.geographies, options)?;
        let geo = geographies.into_iter().next().unwrap_or_default();
        rows.push((m.coordinates.x, m.coordinates.y, geo));
    }

    let geo_columns: Vec<String> = if options.keep_geo_cols {
        rows.first()
            .map(|(_, _, geo)| geo.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        vec!["GEOID".to_string()]
    };

    let mut columns = vec!["longitude".to_string(), "latitude".to_string()];
    columns.extend(geo_columns.clone());

    let mut table = GeoTable::new(columns, Crs::Epsg(4326));
    for (x, y, geo) in rows.into_iter().take(options.limit) {
        let mut attrs = vec![AttrValue::Num(x), AttrValue::Num(y)];
        for col in &geo_columns {
            attrs.push(geo.get(col).map(attr_value).unwrap_or(AttrValue::Null));
        }
        table.push_row(
            attrs,
            geo_types::Geometry::Point(geo_types::point! { x: x, y: y }),
        )?;
    }
    Ok(table)
}

fn geography_rows(
    geographies: &Geographies,
    options: &GeocodeOptions,
) -> Result<Vec<serde_json::Map<String, Value>>> {
    geographies
        .get(&options.geography)
        .cloned()
        .ok_or_else(|| {
            Error::Geocoder(format!(
                "no '{}' geographies in the response; check the geography and vintage options",
                options.geography
            ))
        })
}

fn geography_columns(
    rows: &[serde_json::Map<String, Value>],
    options: &GeocodeOptions,
) -> Vec<String> {
    if options.keep_geo_cols {
        rows.first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        vec!["GEOID".to_string()]
    }
}

fn append_echo_column(table: &mut GeoTable, name: &str, value: &str) -> Result<GeoTable> {
    let mut columns: Vec<String> = table.columns().to_vec();
    columns.push(name.to_string());

    let mut out = GeoTable::new(columns, table.crs().clone());
    for row in 0..table.len() {
        let mut attrs: Vec<AttrValue> = table.row(row).unwrap_or(&[]).to_vec();
        attrs.push(AttrValue::Str(value.to_string()));
        let geometry = table
            .geometry(row)
            .cloned()
            .unwrap_or(geo_types::Geometry::Point(geo_types::point! { x: 0.0, y: 0.0 }));
        out.push_row(attrs, geometry)?;
    }
    Ok(out)
}

fn attr_value(value: &Value) -> AttrValue {
    match value {
        Value::String(s) => AttrValue::Str(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttrValue::Int(i)
            } else {
                n.as_f64().map(AttrValue::Num).unwrap_or(AttrValue::Null)
            }
        }
        Value::Bool(b) => AttrValue::Bool(*b),
        _ => AttrValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockHttpClient;

    const GEOCODE_BODY: &str = r#"{
        "result": {
            "addressMatches": [
                {
                    "matchedAddress": "1600 PENNSYLVANIA AVE NW, WASHINGTON, DC, 20500",
                    "coordinates": {"x": -77.03535, "y": 38.898754},
                    "geographies": {
                        "Census Blocks": [
                            {"GEOID": "110010062021031", "BLOCK": "1031", "STATE": "11"}
                        ]
                    }
                }
            ]
        }
    }"#;

    const GEOLOOKUP_BODY: &str = r#"{
        "result": {
            "geographies": {
                "Census Blocks": [
                    {"GEOID": "482014301001000", "STATE": "48"}
                ]
            }
        }
    }"#;

    #[test]
    fn test_onelineaddress_url() {
        let url = onelineaddress_url("1600 Pennsylvania Ave NW", &GeocodeOptions::default())
            .unwrap();
        assert!(url.starts_with(
            "https://geocoding.geo.census.gov/geocoder/geographies/onelineaddress?address="
        ));
        assert!(url.contains("benchmark=Public_AR_Current"));
        assert!(url.contains("vintage=Census2020_Current"));
        assert!(url.contains("format=json"));
    }

    #[test]
    fn test_coordinates_url() {
        let url = coordinates_url(-97.7, 30.3, &GeocodeOptions::default()).unwrap();
        assert!(url.contains("coordinates?x=-97.7&y=30.3"));
    }

    #[test]
    fn test_geocode() {
        let geocoder = Geocoder::with_http(MockHttpClient::with_response(Ok(
            GEOCODE_BODY.as_bytes().to_vec()
        )));

        let table = geocoder
            .geocode("1600 Pennsylvania Ave NW", &GeocodeOptions::default())
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.columns(),
            [
                "longitude".to_string(),
                "latitude".to_string(),
                "GEOID".to_string(),
                "address".to_string(),
            ]
        );
        assert_eq!(table.str_value(0, "GEOID"), Some("110010062021031"));
        assert_eq!(table.crs(), &Crs::Epsg(4326));

        match table.geometry(0).unwrap() {
            geo_types::Geometry::Point(p) => {
                assert!((p.x() - -77.03535).abs() < 1e-9);
                assert!((p.y() - 38.898754).abs() < 1e-9);
            }
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn test_geocode_keep_geo_cols() {
        let geocoder = Geocoder::with_http(MockHttpClient::with_response(Ok(
            GEOCODE_BODY.as_bytes().to_vec()
        )));

        let options = GeocodeOptions {
            keep_geo_cols: true,
            ..GeocodeOptions::default()
        };
        let table = geocoder.geocode("1600 Pennsylvania Ave NW", &options).unwrap();
        assert!(table.column_index("BLOCK").is_some());
        assert!(table.column_index("STATE").is_some());
    }

    #[test]
    fn test_geocode_unknown_geography() {
        let geocoder = Geocoder::with_http(MockHttpClient::with_response(Ok(
            GEOCODE_BODY.as_bytes().to_vec()
        )));

        let options = GeocodeOptions {
            geography: "Counties".to_string(),
            ..GeocodeOptions::default()
        };
        assert!(matches!(
            geocoder.geocode("somewhere", &options),
            Err(Error::Geocoder(_))
        ));
    }

    #[test]
    fn test_geolookup() {
        let geocoder = Geocoder::with_http(MockHttpClient::with_response(Ok(
            GEOLOOKUP_BODY.as_bytes().to_vec()
        )));

        let table = geocoder
            .geolookup(-95.4, 29.8, &GeocodeOptions::default())
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.str_value(0, "GEOID"), Some("482014301001000"));
    }
}
