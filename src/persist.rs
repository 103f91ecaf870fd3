//! Writes acquired images into the upload directory.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::constants::DEFAULT_EXTENSION;
use crate::error::SeederError;

/// Image bytes fetched for an item, dropped once written.
#[derive(Clone, Debug)]
pub struct AcquiredAsset {
    /// Where the bytes came from.
    pub source: String,
    /// Raw image body.
    pub bytes: Vec<u8>,
    /// Extension including the dot, eg `.jpg`.
    pub extension: String,
}

/// A file we've written into the upload directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersistedFile {
    /// `<epoch-millis><ext>`
    pub filename: String,
    /// Where it lives on disk.
    pub absolute_path: PathBuf,
    /// Web path the studio app serves it from, eg `/uploads/1771828002450.jpg`.
    pub public_path: String,
}

/// The fixed destination for seeded thumbnails.
#[derive(Clone, Debug)]
pub struct UploadDir {
    dir: PathBuf,
    public_prefix: String,
}

impl UploadDir {
    /// Creates `dir` if it's missing.
    pub async fn new(dir: impl Into<PathBuf>, public_prefix: &str) -> Result<Self, SeederError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        let dir = fs::canonicalize(&dir).await?;
        Ok(Self {
            dir,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// The directory files are written to.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Writes a fetched asset under a fresh timestamp name.
    pub async fn write(&self, asset: &AcquiredAsset) -> Result<PersistedFile, SeederError> {
        let persisted = self.next_file(&asset.extension);
        let mut file = create_new(&persisted.absolute_path).await?;
        file.write_all(&asset.bytes).await?;
        file.flush().await?;
        debug!(
            "Wrote {} bytes from {} to {}",
            asset.bytes.len(),
            asset.source,
            persisted.absolute_path.display()
        );
        Ok(persisted)
    }

    /// Copies a staged file in, leaving the source where it is.
    pub async fn copy_staged(&self, source: &Path) -> Result<PersistedFile, SeederError> {
        let persisted = self.next_file(&staged_extension(source));
        let mut reader = File::open(source).await?;
        let mut writer = create_new(&persisted.absolute_path).await?;
        tokio::io::copy(&mut reader, &mut writer).await?;
        writer.flush().await?;
        debug!(
            "Copied {} to {}",
            source.display(),
            persisted.absolute_path.display()
        );
        Ok(persisted)
    }

    fn next_file(&self, extension: &str) -> PersistedFile {
        let filename = timestamp_filename(chrono::Utc::now().timestamp_millis(), extension);
        PersistedFile {
            absolute_path: self.dir.join(&filename),
            public_path: format!("{}/{}", self.public_prefix, filename),
            filename,
        }
    }
}

/// `<millis><ext>`, eg `1771828002450.jpg`.
pub fn timestamp_filename(millis: i64, extension: &str) -> String {
    format!("{millis}{extension}")
}

/// Existing files are never overwritten; a same-millisecond clash fails here instead.
async fn create_new(path: &Path) -> Result<File, SeederError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(SeederError::from)
}

fn staged_extension(path: &Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_ascii_lowercase()),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}
