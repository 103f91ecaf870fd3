//! Stage-mode search: a helper downloads into a scratch directory and we pick the result up from disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{Candidate, SearchFilters, SearchProvider};
use crate::error::SeederError;

/// Downloads search results for `query` into `dest`.
#[async_trait]
pub trait ImageStager: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Returns how many files were written to `dest`.
    async fn stage(
        &self,
        query: &str,
        filters: &SearchFilters,
        dest: &Path,
    ) -> Result<usize, SeederError>;
}

/// Wraps an [ImageStager] so it looks like any other [SearchProvider].
#[derive(Debug)]
pub struct StagedSearch<S> {
    stager: S,
    scratch_root: PathBuf,
}

impl<S: ImageStager> StagedSearch<S> {
    /// `scratch_root` holds one directory per query.
    pub fn new(stager: S, scratch_root: PathBuf) -> Self {
        Self {
            stager,
            scratch_root,
        }
    }

    /// Where files for `query` end up.
    pub fn scratch_dir_for(&self, query: &str) -> PathBuf {
        self.scratch_root.join(scratch_dir_name(query))
    }
}

#[async_trait]
impl<S: ImageStager> SearchProvider for StagedSearch<S> {
    fn name(&self) -> &str {
        self.stager.name()
    }

    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, SeederError> {
        let dir = self.scratch_dir_for(query);
        // leftovers from an earlier run must not be picked up
        if fs::try_exists(&dir).await? {
            debug!("Removing stale scratch directory {}", dir.display());
            fs::remove_dir_all(&dir).await?;
        }

        let staged = self.stager.stage(query, filters, &dir).await?;
        debug!("{} staged {staged} file(s) in {}", self.stager.name(), dir.display());

        Ok(first_file(&dir).await?.map(Candidate::Staged).into_iter().collect())
    }
}

/// Queries are used as directory names, so strip anything that would change directory.
fn scratch_dir_name(query: &str) -> String {
    let name: String = query
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name,
    }
}

/// `n` from an `Image_<n>.<ext>` name, the order the stager wrote them in.
fn staged_index(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .strip_prefix("Image_")?
        .parse()
        .ok()
}

/// First regular file in write order, or `None` when the directory is empty or missing.
///
/// Files that don't follow the `Image_<n>` naming come last, by name.
async fn first_file(dir: &Path) -> Result<Option<PathBuf>, SeederError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by_cached_key(|path| (staged_index(path).unwrap_or(usize::MAX), path.clone()));
    Ok(files.into_iter().next())
}
