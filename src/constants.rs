//! Shared constants/defaults for things
//!

use std::time::Duration;

/// Where the studio app serves uploads from
pub const DEFAULT_UPLOAD_DIR: &str = "./public/uploads";

/// Web-relative mount point of [DEFAULT_UPLOAD_DIR]
pub const DEFAULT_PUBLIC_PREFIX: &str = "/uploads";

/// Scratch root for stage-mode downloads
pub const DEFAULT_SCRATCH_DIR: &str = "./temp_bing";

/// The studio app's SQLite database
pub const DEFAULT_DATABASE_PATH: &str = "./prisma/dev.db";

/// Browser identification sent with every request, some image hosts refuse anything else.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Per-request timeout for search and image requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times we try to GET a candidate image.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Candidate cap for URL-mode searches.
pub const URL_MODE_MAX_RESULTS: usize = 3;

/// Candidate cap for stage-mode searches.
pub const STAGE_MODE_MAX_RESULTS: usize = 1;

/// Upper bound on result pages requested from a search backend per query.
pub const MAX_SEARCH_PAGES: usize = 5;

/// Extension used when nothing better can be inferred.
pub const DEFAULT_EXTENSION: &str = ".jpg";
