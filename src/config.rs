//! Mirror configuration and construction-time validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::distribution::ProductKey;

/// Construction-time configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// At least one directory prefix must be declared, otherwise nothing
    /// would ever be mirrored.
    #[error("must supply at least one directory prefix to mirror")]
    NoPrefixes,

    /// The cache directory could not be created.
    #[error("failed to create cache directory {path}: {source}")]
    CacheDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mirror configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local directory holding the directory volume and downloaded volumes.
    pub cache_directory: PathBuf,
    /// Logical directory prefixes whose volumes must be kept current.
    pub required_prefixes: Vec<String>,
    /// Product identifier on the distribution service.
    pub product_id: u32,
    /// Depot identifier within the product.
    pub depot_id: u32,
}

impl Config {
    pub fn new(
        cache_directory: impl Into<PathBuf>,
        required_prefixes: Vec<String>,
        product_id: u32,
        depot_id: u32,
    ) -> Self {
        Self {
            cache_directory: cache_directory.into(),
            required_prefixes,
            product_id,
            depot_id,
        }
    }

    /// Validate the prefix set and bootstrap the cache directory.
    pub(crate) fn ensure_valid(&self) -> Result<(), ConfigError> {
        if self.required_prefixes.is_empty() {
            return Err(ConfigError::NoPrefixes);
        }
        std::fs::create_dir_all(&self.cache_directory).map_err(|source| {
            ConfigError::CacheDirectory {
                path: self.cache_directory.clone(),
                source,
            }
        })?;
        Ok(())
    }

    pub(crate) fn key(&self) -> ProductKey {
        ProductKey {
            product_id: self.product_id,
            depot_id: self.depot_id,
        }
    }
}
