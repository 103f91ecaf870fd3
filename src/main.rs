use clap::Parser;
use pose_seeder::config::{SeederConfig, setup_logging};
use pose_seeder::db::ResourceStore;
use pose_seeder::fetch::{Fetcher, build_client};
use pose_seeder::persist::UploadDir;
use pose_seeder::search::provider_for;
use pose_seeder::seeder::Seeder;
use sea_orm_migration::MigratorTrait;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = pose_seeder::cli::CliOptions::parse();

    let _ = setup_logging(cli.debug);

    let config = match SeederConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return;
        }
    };

    let db = match pose_seeder::db::connect_db(&config.database_path).await {
        Ok(db) => db,
        Err(err) => {
            error!("Database connection error: {}", err);
            return;
        }
    };

    if config.init_schema
        && let Err(err) = pose_seeder::db::migrations::Migrator::up(&db, None).await
    {
        error!("Database migration error: {}", err);
        return;
    }

    let uploads = match UploadDir::new(&config.upload_dir, &config.public_prefix).await {
        Ok(uploads) => uploads,
        Err(err) => {
            error!(
                "Failed to create upload directory {}: {}",
                config.upload_dir.display(),
                err
            );
            return;
        }
    };

    let client = match build_client(config.filters.timeout) {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to build HTTP client: {}", err);
            return;
        }
    };
    let fetcher = Fetcher::new(client.clone());
    let provider = provider_for(
        config.backend,
        client,
        fetcher.clone(),
        config.scratch_dir.clone(),
    );
    let store = ResourceStore::new(db);

    Seeder::new(
        provider.as_ref(),
        &fetcher,
        &uploads,
        &store,
        config.filters.clone(),
        config.max_attempts,
    )
    .run(&config.catalog)
    .await;
}
