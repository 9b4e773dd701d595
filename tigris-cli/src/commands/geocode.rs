//! Census geocoder CLI commands.

use clap::{Args, Subcommand};
use tigris::{GeocodeOptions, Geocoder};

use crate::error::CliError;

/// Options shared by geocoder subcommands.
#[derive(Debug, Args)]
pub struct GeocoderArgs {
    /// Geocoder benchmark release
    #[arg(long)]
    benchmark: Option<String>,

    /// Geography vintage within the benchmark
    #[arg(long)]
    vintage: Option<String>,

    /// Maximum number of matches to keep
    #[arg(long)]
    limit: Option<usize>,

    /// Include all Census geography columns, not just the block GEOID
    #[arg(long)]
    keep_geo_cols: bool,
}

impl GeocoderArgs {
    fn to_options(&self) -> GeocodeOptions {
        let mut options = GeocodeOptions {
            keep_geo_cols: self.keep_geo_cols,
            ..GeocodeOptions::default()
        };
        if let Some(benchmark) = &self.benchmark {
            options.benchmark = benchmark.clone();
        }
        if let Some(vintage) = &self.vintage {
            options.vintage = vintage.clone();
        }
        if let Some(limit) = self.limit {
            options.limit = limit;
        }
        options
    }
}

/// Geocoder subcommands.
#[derive(Debug, Subcommand)]
pub enum GeocodeAction {
    /// Geocode a single-line street address
    Address {
        /// Full address, e.g. "1600 Pennsylvania Ave NW, Washington, DC"
        address: String,

        #[command(flatten)]
        common: GeocoderArgs,
    },

    /// Look up the Census block containing a longitude/latitude pair
    Coordinates {
        longitude: f64,
        latitude: f64,

        #[command(flatten)]
        common: GeocoderArgs,
    },
}

/// Run a geocode subcommand.
pub fn run(action: GeocodeAction) -> Result<(), CliError> {
    let geocoder = Geocoder::new()?;

    let table = match action {
        GeocodeAction::Address { address, common } => {
            geocoder.geocode(&address, &common.to_options())?
        }
        GeocodeAction::Coordinates {
            longitude,
            latitude,
            common,
        } => geocoder.geolookup(longitude, latitude, &common.to_options())?,
    };

    if table.is_empty() {
        eprintln!("No match found");
        return Ok(());
    }
    println!("{}", table.to_geojson_string()?);
    Ok(())
}
