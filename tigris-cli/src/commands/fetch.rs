//! Geography download CLI commands.
//!
//! Every subcommand fetches one Census geography and writes it out as
//! GeoJSON, to stdout by default or to a file with `--output`.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use tigris::geography::enumeration_units::SchoolDistrictKind;
use tigris::geography::legislative::House;
use tigris::{GeoTable, Resolution, TigerClient, TigerOptions};
use tracing::info;

use crate::error::CliError;

/// Generalization level for cartographic boundary files.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResolutionArg {
    /// 1:500,000 (most detailed)
    #[value(name = "500k")]
    R500k,
    /// 1:5,000,000
    #[value(name = "5m")]
    R5m,
    /// 1:20,000,000 (coarsest)
    #[value(name = "20m")]
    R20m,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::R500k => Resolution::R500k,
            ResolutionArg::R5m => Resolution::R5m,
            ResolutionArg::R20m => Resolution::R20m,
        }
    }
}

/// School district type selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchoolKind {
    Unified,
    Elementary,
    Secondary,
}

impl From<SchoolKind> for SchoolDistrictKind {
    fn from(kind: SchoolKind) -> Self {
        match kind {
            SchoolKind::Unified => SchoolDistrictKind::Unified,
            SchoolKind::Elementary => SchoolDistrictKind::Elementary,
            SchoolKind::Secondary => SchoolDistrictKind::Secondary,
        }
    }
}

/// Legislative chamber selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Chamber {
    Upper,
    Lower,
}

impl From<Chamber> for House {
    fn from(chamber: Chamber) -> Self {
        match chamber {
            Chamber::Upper => House::Upper,
            Chamber::Lower => House::Lower,
        }
    }
}

/// Options shared by every fetch subcommand.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Data year (defaults to the latest supported vintage)
    #[arg(long)]
    year: Option<u16>,

    /// Prefer the generalized cartographic boundary file over TIGER/Line
    #[arg(long)]
    cb: bool,

    /// Generalization level for cartographic boundary files
    #[arg(long, value_enum, default_value = "500k")]
    resolution: ResolutionArg,

    /// Skip the on-disk archive cache and download fresh
    #[arg(long)]
    no_cache: bool,

    /// Write GeoJSON to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl CommonArgs {
    fn to_options(&self) -> TigerOptions {
        let mut options = TigerOptions::new()
            .cb(self.cb)
            .resolution(self.resolution.into());
        if let Some(year) = self.year {
            options = options.year(year);
        }
        if self.no_cache {
            options = options.no_cache();
        }
        options
    }
}

/// Geography fetch subcommands.
#[derive(Debug, Subcommand)]
pub enum FetchCommands {
    /// State boundaries
    States {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// County boundaries, optionally for one state
    Counties {
        /// State FIPS code, postal abbreviation, or name
        state: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Census tracts for a state, optionally narrowed to a county
    Tracts {
        state: Option<String>,
        /// County FIPS code or name
        #[arg(long)]
        county: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Census block groups for a state, optionally narrowed to a county
    BlockGroups {
        state: Option<String>,
        #[arg(long)]
        county: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Census blocks for a state (large downloads)
    Blocks {
        state: String,
        /// Limit to these counties (FIPS codes or names)
        #[arg(long)]
        county: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Census-designated places for a state
    Places {
        state: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Public use microdata areas for a state
    Pumas {
        state: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Zip code tabulation areas
    Zctas {
        /// State, for vintages published per state
        state: Option<String>,
        /// Keep only ZCTAs starting with these prefixes
        #[arg(long)]
        starts_with: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// School district boundaries for a state
    SchoolDistricts {
        state: Option<String>,
        /// District type
        #[arg(long, value_enum, default_value = "unified")]
        kind: SchoolKind,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Congressional districts, optionally filtered to one state
    CongressionalDistricts {
        state: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// State legislative districts for one chamber
    StateLegislativeDistricts {
        state: Option<String>,
        /// Legislative chamber
        #[arg(long, value_enum, default_value = "upper")]
        chamber: Chamber,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Voting districts (2020 vintage by default)
    VotingDistricts {
        state: Option<String>,
        #[arg(long)]
        county: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Core-based (metropolitan and micropolitan) statistical areas
    Cbsas {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Combined statistical areas
    Csas {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Urban areas
    UrbanAreas {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Census regions
    Regions {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Census divisions
    Divisions {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// The national boundary
    Nation {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// American Indian / Alaska Native / Native Hawaiian areas
    NativeAreas {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// All roads for one or more counties
    Roads {
        state: String,
        /// Counties (FIPS codes or names), at least one
        #[arg(long, required = true)]
        county: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// The nationwide primary roads layer
    PrimaryRoads {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// The nationwide rails layer
    Rails {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Water bodies for one or more counties
    AreaWater {
        state: String,
        #[arg(long, required = true)]
        county: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Linear water features for one or more counties
    LinearWater {
        state: String,
        #[arg(long, required = true)]
        county: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// The national coastline
    Coastline {
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Run a fetch subcommand.
pub fn run(command: FetchCommands) -> Result<(), CliError> {
    let client = TigerClient::new()?;

    match command {
        FetchCommands::States { common } => {
            let table = client.states(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Counties { state, common } => {
            let table = client.counties(state.as_deref(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Tracts {
            state,
            county,
            common,
        } => {
            let table = client.tracts(state.as_deref(), county.as_deref(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::BlockGroups {
            state,
            county,
            common,
        } => {
            let table =
                client.block_groups(state.as_deref(), county.as_deref(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Blocks {
            state,
            county,
            common,
        } => {
            let counties: Vec<&str> = county.iter().map(String::as_str).collect();
            let table = client.blocks(&state, &counties, &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Places { state, common } => {
            let table = client.places(state.as_deref(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Pumas { state, common } => {
            let table = client.pumas(state.as_deref(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Zctas {
            state,
            starts_with,
            common,
        } => {
            let prefixes: Vec<&str> = starts_with.iter().map(String::as_str).collect();
            let table = client.zctas(state.as_deref(), &prefixes, &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::SchoolDistricts {
            state,
            kind,
            common,
        } => {
            let table =
                client.school_districts(state.as_deref(), kind.into(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::CongressionalDistricts { state, common } => {
            let table = client.congressional_districts(state.as_deref(), &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::StateLegislativeDistricts {
            state,
            chamber,
            common,
        } => {
            let table = client.state_legislative_districts(
                state.as_deref(),
                chamber.into(),
                &common.to_options(),
            )?;
            write_table(&table, &common)
        }
        FetchCommands::VotingDistricts {
            state,
            county,
            common,
        } => {
            let table = client.voting_districts(
                state.as_deref(),
                county.as_deref(),
                &common.to_options(),
            )?;
            write_table(&table, &common)
        }
        FetchCommands::Cbsas { common } => {
            let table = client.core_based_statistical_areas(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Csas { common } => {
            let table = client.combined_statistical_areas(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::UrbanAreas { common } => {
            let table = client.urban_areas(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Regions { common } => {
            let table = client.regions(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Divisions { common } => {
            let table = client.divisions(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Nation { common } => {
            let table = client.nation(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::NativeAreas { common } => {
            let table = client.native_areas(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Roads {
            state,
            county,
            common,
        } => {
            let counties: Vec<&str> = county.iter().map(String::as_str).collect();
            let table = client.roads(&state, &counties, &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::PrimaryRoads { common } => {
            let table = client.primary_roads(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Rails { common } => {
            let table = client.rails(&common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::AreaWater {
            state,
            county,
            common,
        } => {
            let counties: Vec<&str> = county.iter().map(String::as_str).collect();
            let table = client.area_water(&state, &counties, &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::LinearWater {
            state,
            county,
            common,
        } => {
            let counties: Vec<&str> = county.iter().map(String::as_str).collect();
            let table = client.linear_water(&state, &counties, &common.to_options())?;
            write_table(&table, &common)
        }
        FetchCommands::Coastline { common } => {
            let table = client.coastline(&common.to_options())?;
            write_table(&table, &common)
        }
    }
}

/// Write a table as GeoJSON to the chosen destination.
fn write_table(table: &GeoTable, common: &CommonArgs) -> Result<(), CliError> {
    let geojson = table.to_geojson_string()?;

    match &common.output {
        Some(path) => {
            fs::write(path, geojson)?;
            info!(features = table.len(), path = %path.display(), "wrote GeoJSON");
        }
        None => println!("{}", geojson),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tigris::geo_types::{point, Geometry};
    use tigris::{AttrValue, Crs};

    fn county_table() -> GeoTable {
        let mut table = GeoTable::new(
            vec!["GEOID".to_string(), "NAME".to_string()],
            Crs::Epsg(4269),
        );
        table
            .push_row(
                vec![
                    AttrValue::Str("48453".to_string()),
                    AttrValue::Str("Travis".to_string()),
                ],
                Geometry::Point(point! { x: -97.7, y: 30.3 }),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_write_table_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counties.geojson");
        let common = CommonArgs {
            year: None,
            cb: false,
            resolution: ResolutionArg::R500k,
            no_cache: false,
            output: Some(path.clone()),
        };

        write_table(&county_table(), &common).unwrap();

        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("\"FeatureCollection\""));
        assert!(written.contains("\"Travis\""));
    }

    #[test]
    fn test_common_args_to_options() {
        let common = CommonArgs {
            year: Some(2010),
            cb: true,
            resolution: ResolutionArg::R20m,
            no_cache: true,
            output: None,
        };
        let options = common.to_options();

        assert_eq!(options.resolved_year(), 2010);
        assert!(options.cb);
        assert_eq!(options.resolution, Resolution::R20m);
        assert!(!options.cache);
    }
}
