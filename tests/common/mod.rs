#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{MethodRouter, get};
use pose_seeder::db::ResourceStore;
use pose_seeder::db::migrations::Migrator;
use pose_seeder::fetch::{Fetcher, build_client};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;

/// Binds a local port, returning the listener and its base URL.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    (listener, format!("http://{addr}"))
}

/// Serves `router` in the background for the rest of the test.
pub fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
}

/// A GET route that counts hits and answers with `respond(hit_number)`.
pub fn counted<F>(counter: Arc<AtomicUsize>, respond: F) -> MethodRouter
where
    F: Fn(usize) -> (StatusCode, Vec<u8>) + Clone + Send + Sync + 'static,
{
    get(move || {
        let counter = counter.clone();
        let respond = respond.clone();
        async move {
            let hit = counter.fetch_add(1, Ordering::SeqCst) + 1;
            respond(hit)
        }
    })
}

pub fn hits(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn fetcher() -> Fetcher {
    Fetcher::new(build_client(Duration::from_secs(5)).expect("client"))
}

pub async fn store() -> ResourceStore {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");
    ResourceStore::new(db)
}

/// File names currently in `dir`.
pub fn files_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Client for search backends, same settings as the fetcher's.
pub fn fetcher_client() -> reqwest::Client {
    build_client(Duration::from_secs(5)).expect("client")
}
