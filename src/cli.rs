//! CLI parser
use clap::Parser;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_PUBLIC_PREFIX, DEFAULT_SCRATCH_DIR, DEFAULT_UPLOAD_DIR,
};
use crate::search::Backend;

#[derive(Parser, Debug)]
#[command(name = "pose-seeder")]
/// Finds a thumbnail for each catalog item and records it in the studio database.
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "POSE_SEEDER_DEBUG")]
    /// Enable debug logging. Env: POSE_SEEDER_DEBUG
    pub debug: bool,

    #[clap(long, short, value_enum, default_value = "duckduckgo", env = "POSE_SEEDER_BACKEND")]
    /// Search backend, `duckduckgo` returns URLs, `bing` stages files locally.
    /// Env: POSE_SEEDER_BACKEND
    pub backend: Backend,

    #[clap(long, short, env = "POSE_SEEDER_CATALOG")]
    /// JSON catalog to seed, defaults to the bundled pose list.
    /// Env: POSE_SEEDER_CATALOG
    pub catalog: Option<PathBuf>,

    #[clap(long, default_value = DEFAULT_DATABASE_PATH, env = "POSE_SEEDER_DATABASE_PATH")]
    /// Path to the studio database file, eg `./prisma/dev.db`.
    /// Env: POSE_SEEDER_DATABASE_PATH
    pub database_path: String,

    #[clap(long, env = "POSE_SEEDER_INIT_SCHEMA")]
    /// Create the `Resource` table if it doesn't exist yet.
    /// Env: POSE_SEEDER_INIT_SCHEMA
    pub init_schema: bool,

    #[clap(long, default_value = DEFAULT_UPLOAD_DIR, env = "POSE_SEEDER_UPLOAD_DIR")]
    /// Where thumbnails are written. Env: POSE_SEEDER_UPLOAD_DIR
    pub upload_dir: PathBuf,

    #[clap(long, default_value = DEFAULT_PUBLIC_PREFIX, env = "POSE_SEEDER_PUBLIC_PREFIX")]
    /// Web path the upload directory is served from. Env: POSE_SEEDER_PUBLIC_PREFIX
    pub public_prefix: String,

    #[clap(long, default_value = DEFAULT_SCRATCH_DIR, env = "POSE_SEEDER_SCRATCH_DIR")]
    /// Scratch root for the `bing` backend. Env: POSE_SEEDER_SCRATCH_DIR
    pub scratch_dir: PathBuf,

    #[clap(long, env = "POSE_SEEDER_MAX_ATTEMPTS")]
    /// GET attempts per candidate image, defaults to 3. Env: POSE_SEEDER_MAX_ATTEMPTS
    pub max_attempts: Option<u32>,

    #[clap(long, env = "POSE_SEEDER_MAX_RESULTS")]
    /// Candidates per search, defaults to 3 for duckduckgo and 1 for bing.
    /// Env: POSE_SEEDER_MAX_RESULTS
    pub max_results: Option<usize>,
}
