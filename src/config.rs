//! Config handling

use std::path::PathBuf;

use tracing::log::LevelFilter;

use crate::catalog::Catalog;
use crate::cli::CliOptions;
use crate::constants::DEFAULT_MAX_ATTEMPTS;
use crate::error::SeederError;
use crate::search::{Backend, SearchFilters};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("sqlx", LevelFilter::Warn)
            .with_module_level("sea_orm_migration", LevelFilter::Warn);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Validated settings for a run.
#[derive(Clone, Debug)]
pub struct SeederConfig {
    /// Search backend to use.
    pub backend: Backend,
    /// Items to seed, in order.
    pub catalog: Catalog,
    /// Studio database file.
    pub database_path: String,
    /// Create the table before seeding.
    pub init_schema: bool,
    /// Destination directory.
    pub upload_dir: PathBuf,
    /// Web mount point of `upload_dir`.
    pub public_prefix: String,
    /// Stage-mode scratch root.
    pub scratch_dir: PathBuf,
    /// GET attempts per candidate.
    pub max_attempts: u32,
    /// Filters sent with every search.
    pub filters: SearchFilters,
}

impl SeederConfig {
    /// Fills in backend defaults and loads the catalog.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, SeederError> {
        let max_attempts = cli.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(SeederError::Config(
                "max attempts needs to be at least 1".to_string(),
            ));
        }

        let mut filters = cli.backend.default_filters();
        if let Some(max_results) = cli.max_results {
            if max_results == 0 {
                return Err(SeederError::Config(
                    "max results needs to be at least 1".to_string(),
                ));
            }
            filters.max_results = max_results;
        }

        if !cli.public_prefix.starts_with('/') {
            return Err(SeederError::Config(format!(
                "public prefix {:?} should start with /",
                cli.public_prefix
            )));
        }

        let catalog = match &cli.catalog {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::bundled()?,
        };

        Ok(Self {
            backend: cli.backend,
            catalog,
            database_path: cli.database_path.clone(),
            init_schema: cli.init_schema,
            upload_dir: cli.upload_dir.clone(),
            public_prefix: cli.public_prefix.clone(),
            scratch_dir: cli.scratch_dir.clone(),
            max_attempts,
            filters,
        })
    }
}
