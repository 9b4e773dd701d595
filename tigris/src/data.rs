//! Clients for the Census data API and the LODES employment files.
//!
//! These endpoints return attribute data without geometry; results come
//! back as a [`DataTable`] whose `GEOID` columns line up with the shapes
//! fetched from the TIGER tree, so the two can be joined.

use std::io::Read;

use flate2::read::GzDecoder;
use serde_json::Value;
use tracing::debug;

use crate::cache::DiskCache;
use crate::error::{Error, Result};
use crate::http::{HttpClient, ReqwestClient};
use crate::table::AttrValue;

const DATA_API_BASE: &str = "https://api.census.gov/data";
const LODES_BASE: &str = "https://lehd.ces.census.gov/data/lodes/LODES7";

/// Census API values below this are missing-data codes, not measurements.
const SENTINEL_FLOOR: f64 = -999999.0;

/// A plain attribute table without geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<AttrValue>>,
}

impl DataTable {
    fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&AttrValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn str_value(&self, row: usize, column: &str) -> Option<&str> {
        self.value(row, column)?.as_str()
    }

    pub fn row(&self, row: usize) -> Option<&[AttrValue]> {
        self.rows.get(row).map(|r| r.as_slice())
    }
}

/// Options for a Census data API request.
#[derive(Debug, Clone, Default)]
pub struct CensusOptions {
    /// Dataset year; omit for timeseries endpoints.
    pub year: Option<u16>,
    /// Extra query parameters (`for`, `in`, `key`, ...).
    pub params: Vec<(String, String)>,
    /// Assemble a `GEOID` column from the geography columns and drop them.
    pub return_geoid: bool,
    /// Convert variable columns that parse as numbers, mapping the
    /// Bureau's negative sentinel codes to nulls.
    pub guess_dtypes: bool,
}

/// LODES dataset family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LodesType {
    /// Origin-destination flows.
    #[default]
    Od,
    /// Workplace area characteristics.
    Wac,
    /// Residence area characteristics.
    Rac,
}

impl LodesType {
    fn token(self) -> &'static str {
        match self {
            LodesType::Od => "od",
            LodesType::Wac => "wac",
            LodesType::Rac => "rac",
        }
    }
}

/// Options for a LODES download.
#[derive(Debug, Clone)]
pub struct LodesOptions {
    pub lodes_type: LodesType,
    /// For origin-destination files: `main` (within-state) or `aux`
    /// (flows into the state from outside).
    pub part: String,
    /// Job type breakdown; `JT00` covers all jobs.
    pub job_type: String,
    /// Workforce segment for `wac`/`rac` files; `S000` covers all jobs.
    pub segment: String,
    /// Reuse the on-disk cache.
    pub cache: bool,
}

impl Default for LodesOptions {
    fn default() -> Self {
        Self {
            lodes_type: LodesType::Od,
            part: "main".to_string(),
            job_type: "JT00".to_string(),
            segment: "S000".to_string(),
            cache: true,
        }
    }
}

/// URL of a Census data API request.
pub fn census_url(dataset: &str, variables: &[&str], options: &CensusOptions) -> Result<String> {
    let base = match options.year {
        Some(year) => format!("{DATA_API_BASE}/{year}/{dataset}"),
        None => format!("{DATA_API_BASE}/{dataset}"),
    };

    let get = variables.join(",");
    let mut params: Vec<(&str, &str)> = vec![("get", &get)];
    for (key, value) in &options.params {
        params.push((key, value));
    }

    let url = reqwest::Url::parse_with_params(&base, &params)
        .map_err(|e| Error::InvalidArgument(format!("invalid API parameters: {}", e)))?;
    Ok(url.into())
}

/// URL of a LODES file for one state.
pub fn lodes_url(state: &str, year: u16, options: &LodesOptions) -> String {
    let state = state.to_ascii_lowercase();
    match options.lodes_type {
        LodesType::Od => format!(
            "{LODES_BASE}/{state}/od/{state}_od_{}_{}_{year}.csv.gz",
            options.part, options.job_type
        ),
        _ => format!(
            "{LODES_BASE}/{state}/{type_}/{state}_{type_}_{}_{}_{year}.csv.gz",
            options.segment,
            options.job_type,
            type_ = options.lodes_type.token()
        ),
    }
}

/// Client for the Census data API and LODES downloads.
pub struct CensusApi<C: HttpClient = ReqwestClient> {
    http: C,
    cache: DiskCache,
}

impl CensusApi<ReqwestClient> {
    /// Creates a client with the default transport and cache location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: ReqwestClient::new()?,
            cache: DiskCache::open_default()?,
        })
    }
}

impl<C: HttpClient> CensusApi<C> {
    /// Creates a client from explicit parts.
    pub fn with_parts(http: C, cache: DiskCache) -> Self {
        Self { http, cache }
    }

    /// Requests variables from a Census data API endpoint.
    ///
    /// `dataset` is the path component after `data/` (or after the
    /// year), e.g. `acs/acs5` or `dec/pl`.
    pub fn get_census(
        &self,
        dataset: &str,
        variables: &[&str],
        options: &CensusOptions,
    ) -> Result<DataTable> {
        let url = census_url(dataset, variables, options)?;
        debug!(url, "Census API request");
        let body = self.http.get(&url)?;

        let raw: Vec<Vec<Value>> = serde_json::from_slice(&body)?;
        let mut iter = raw.into_iter();
        let header = iter
            .next()
            .ok_or_else(|| Error::InvalidArgument("empty API response".to_string()))?;

        let columns: Vec<String> = header
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect();

        let mut table = DataTable::new(columns);
        for row in iter {
            table.rows.push(row.iter().map(cell_value).collect());
        }

        if options.return_geoid {
            table = assemble_geoid(table)?;
        }
        if options.guess_dtypes {
            guess_dtypes(&mut table, variables);
        }
        Ok(table)
    }

    /// Downloads a LODES employment file for one state.
    ///
    /// Block geocodes are zero-padded to the full 15 digits so they join
    /// against `GEOID20` from [`crate::tiger::TigerClient::blocks`].
    pub fn get_lodes(&self, state: &str, year: u16, options: &LodesOptions) -> Result<DataTable> {
        let url = lodes_url(state, year, options);
        debug!(url, "LODES request");

        let compressed = if options.cache {
            self.cache.fetch(&url, &self.http)?
        } else {
            self.http.get(&url)?
        };

        let mut csv = String::new();
        GzDecoder::new(compressed.as_slice()).read_to_string(&mut csv)?;

        let mut lines = csv.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| Error::InvalidArgument("empty LODES file".to_string()))?;
        let columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();

        let geocode_columns: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| matches!(name.as_str(), "w_geocode" | "h_geocode"))
            .map(|(i, _)| i)
            .collect();

        let mut table = DataTable::new(columns);
        for line in lines {
            let row: Vec<AttrValue> = line
                .split(',')
                .enumerate()
                .map(|(i, field)| {
                    let field = field.trim();
                    if geocode_columns.contains(&i) {
                        AttrValue::Str(format!("{:0>15}", field))
                    } else if let Ok(n) = field.parse::<i64>() {
                        AttrValue::Int(n)
                    } else if let Ok(n) = field.parse::<f64>() {
                        AttrValue::Num(n)
                    } else {
                        AttrValue::Str(field.to_string())
                    }
                })
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }
}

fn cell_value(value: &Value) -> AttrValue {
    match value {
        Value::String(s) => AttrValue::Str(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttrValue::Int(i)
            } else {
                n.as_f64().map(AttrValue::Num).unwrap_or(AttrValue::Null)
            }
        }
        Value::Null => AttrValue::Null,
        other => AttrValue::Str(other.to_string()),
    }
}

/// Concatenates the geography columns (from `state` rightward) into one
/// `GEOID` column and drops the parts.
fn assemble_geoid(table: DataTable) -> Result<DataTable> {
    let state_ix = table.column_index("state").ok_or_else(|| {
        Error::InvalidArgument(
            "GEOID assembly is not supported for this geography hierarchy".to_string(),
        )
    })?;

    let mut columns: Vec<String> = table.columns[..state_ix].to_vec();
    columns.push("GEOID".to_string());

    let mut out = DataTable::new(columns);
    for row in &table.rows {
        let mut attrs: Vec<AttrValue> = row[..state_ix].to_vec();
        let geoid: String = row[state_ix..]
            .iter()
            .map(|v| v.as_str().unwrap_or_default())
            .collect();
        attrs.push(AttrValue::Str(geoid));
        out.rows.push(attrs);
    }
    Ok(out)
}

/// Converts variable columns that parse as numbers, nulling the
/// Bureau's negative missing-data codes.
fn guess_dtypes(table: &mut DataTable, variables: &[&str]) {
    for variable in variables {
        let Some(idx) = table.column_index(variable) else {
            continue;
        };

        let parseable = table.rows.iter().any(|row| {
            row[idx]
                .as_str()
                .map(|s| s.parse::<f64>().is_ok())
                .unwrap_or(false)
        });
        if !parseable {
            continue;
        }

        for row in &mut table.rows {
            row[idx] = match row[idx].as_str().map(str::parse::<f64>) {
                Some(Ok(n)) if n > SENTINEL_FLOOR => AttrValue::Num(n),
                Some(Ok(_)) => AttrValue::Null,
                _ => AttrValue::Null,
            };
        }
    }
}
