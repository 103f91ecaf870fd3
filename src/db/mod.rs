//! The studio app's database, the system of record for seeded resources.
pub mod entities;
pub mod migrations;

use sea_orm::{Database, DatabaseConnection, DbErr};
use tracing::debug;

use crate::catalog::CatalogItem;
use crate::error::SeederError;
use entities::resources::{self, UpsertOutcome};

/// Opens (creating if needed) the SQLite file at `path`.
pub async fn connect_db(path: &str) -> Result<DatabaseConnection, DbErr> {
    let url = format!("sqlite://{}?mode=rwc", path);
    Database::connect(url).await
}

#[cfg(test)]
pub async fn connect_test_db() -> Result<DatabaseConnection, DbErr> {
    Database::connect("sqlite::memory:").await
}

/// Records seeded thumbnails against their catalog item.
#[derive(Clone, Debug)]
pub struct ResourceStore {
    db: DatabaseConnection,
}

impl ResourceStore {
    /// Wraps an open connection.
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Points the `(type, name)` record at `public_path`, creating it if needed.
    pub async fn upsert(
        &self,
        item: &CatalogItem,
        public_path: &str,
    ) -> Result<UpsertOutcome, SeederError> {
        let outcome =
            resources::upsert(&self.db, &item.kind, &item.name, &item.prompt, public_path)
                .await?;
        debug!("{}/{} -> {public_path}: {outcome:?}", item.kind, item.name);
        Ok(outcome)
    }
}
