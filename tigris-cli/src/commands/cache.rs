//! Cache management CLI commands.

use clap::Subcommand;
use tigris::cache::{format_size, DiskCache};

use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the archive cache, removing all downloaded files
    Clear,
    /// Show archive cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction) -> Result<(), CliError> {
    let cache = DiskCache::open_default()?;

    match action {
        CacheAction::Clear => {
            println!("Clearing archive cache at: {}", cache.root().display());

            match cache.clear() {
                Ok(result) => {
                    println!(
                        "Deleted {} files, freed {}",
                        result.files_deleted,
                        format_size(result.bytes_freed)
                    );
                    Ok(())
                }
                Err(e) => Err(CliError::CacheClear(e.to_string())),
            }
        }
        CacheAction::Stats => {
            println!("Archive cache: {}", cache.root().display());

            match cache.stats() {
                Ok((files, bytes)) => {
                    println!("  Files: {}", files);
                    println!("  Size:  {}", format_size(bytes));
                    Ok(())
                }
                Err(e) => Err(CliError::CacheStats(e.to_string())),
            }
        }
    }
}
