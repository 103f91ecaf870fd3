mod common;

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use common::{bind, counted, fetcher, files_in, hits, spawn, store};
use pose_seeder::catalog::{Catalog, CatalogItem};
use pose_seeder::db::entities::resources::{self, UpsertOutcome};
use pose_seeder::persist::UploadDir;
use pose_seeder::search::bing::BingStager;
use pose_seeder::search::duckduckgo::DuckDuckGo;
use pose_seeder::search::staged::StagedSearch;
use pose_seeder::search::{Backend, SearchProvider};
use pose_seeder::seeder::{ItemOutcome, RunSummary, Seeder};
use serde_json::json;

const EARRING_PROMPT: &str = "Medium portrait shot of a beautiful Indian fashion model looking at the camera wearing an elegant dress one hand delicately touching her earring high quality studio editorial portrait";

fn earring() -> CatalogItem {
    CatalogItem {
        kind: "pose".to_string(),
        name: "Hand on Earring".to_string(),
        query: "indian fashion model hand on earring portrait photography -stock".to_string(),
        prompt: EARRING_PROMPT.to_string(),
    }
}

fn hips() -> CatalogItem {
    CatalogItem {
        kind: "pose".to_string(),
        name: "Hands on Hips".to_string(),
        query: "indian fashion model hands on hips".to_string(),
        prompt: "Full body shot".to_string(),
    }
}

type SeenParams = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// A fake DuckDuckGo plus image host. `results_for` maps a query to image paths on this server.
struct FakeDuckDuckGo {
    base: String,
    searches: SeenParams,
    image_hits: HashMap<&'static str, Arc<AtomicUsize>>,
}

async fn fake_duckduckgo(
    results_for: fn(&str) -> Vec<&'static str>,
    images: Vec<(&'static str, StatusCode, &'static str)>,
) -> FakeDuckDuckGo {
    let (listener, base) = bind().await;
    let searches: SeenParams = Arc::new(Mutex::new(Vec::new()));

    let seen = searches.clone();
    let image_base = base.clone();
    let mut router = Router::new()
        .route(
            "/",
            get(|| async { "<html><script>var vqd=\"4-1234567890\";</script></html>" }),
        )
        .route(
            "/i.js",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let seen = seen.clone();
                let image_base = image_base.clone();
                async move {
                    let query = params.get("q").cloned().unwrap_or_default();
                    seen.lock().expect("lock").push(params);
                    let results: Vec<_> = results_for(&query)
                        .into_iter()
                        .map(|path| json!({"image": format!("{image_base}{path}"), "title": path}))
                        .collect();
                    Json(json!({ "results": results }))
                }
            }),
        );

    let mut image_hits = HashMap::new();
    for (path, status, body) in images {
        let counter = Arc::new(AtomicUsize::new(0));
        image_hits.insert(path, counter.clone());
        router = router.route(path, counted(counter, move |_| (status, body.as_bytes().to_vec())));
    }
    spawn(listener, router);

    FakeDuckDuckGo {
        base,
        searches,
        image_hits,
    }
}

#[tokio::test]
async fn url_mode_first_good_candidate_wins() {
    let fake = fake_duckduckgo(
        |_| vec!["/a.jpg", "/b.png"],
        vec![
            ("/a.jpg", StatusCode::OK, "B"),
            ("/b.png", StatusCode::OK, "never"),
        ],
    )
    .await;
    let fetcher = fetcher();
    let provider = DuckDuckGo::with_base_url(common::fetcher_client(), &fake.base);
    let dest = tempfile::tempdir().expect("dest");
    let uploads = UploadDir::new(dest.path(), "/uploads").await.expect("uploads");
    let store = store().await;
    let seeder = Seeder::new(
        &provider,
        &fetcher,
        &uploads,
        &store,
        Backend::Duckduckgo.default_filters(),
        3,
    );

    let outcome = seeder.seed_item(&earring()).await;

    let (file, upsert) = match outcome {
        ItemOutcome::Seeded { file, upsert } => (file, upsert),
        other => panic!("expected the item to be seeded, got {other:?}"),
    };
    let stem = file.filename.strip_suffix(".jpg").expect("jpg extension");
    assert!(stem.parse::<i64>().is_ok(), "not a timestamp: {stem}");
    assert_eq!(file.public_path, format!("/uploads/{}", file.filename));
    assert_eq!(std::fs::read(&file.absolute_path).expect("read"), b"B");
    assert_eq!(files_in(uploads.path()), vec![file.filename.clone()]);
    assert!(matches!(upsert, UpsertOutcome::Created(_)));

    let rows = resources::by_key(store.connection(), "pose", "Hand on Earring")
        .await
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].thumbnail.as_deref(), Some(file.public_path.as_str()));
    assert_eq!(rows[0].prompt.as_deref(), Some(EARRING_PROMPT));

    assert_eq!(hits(&fake.image_hits["/a.jpg"]), 1);
    assert_eq!(hits(&fake.image_hits["/b.png"]), 0);

    let searches = fake.searches.lock().expect("lock");
    assert_eq!(searches.len(), 1);
    let params = &searches[0];
    assert_eq!(params.get("q").map(String::as_str), Some(earring().query.as_str()));
    assert_eq!(params.get("vqd").map(String::as_str), Some("4-1234567890"));
    assert_eq!(
        params.get("f").map(String::as_str),
        Some(",size:Large,color:color,type:photo,,")
    );
    assert_eq!(params.get("p").map(String::as_str), Some("-1"));
}

#[tokio::test]
async fn url_mode_falls_through_to_the_next_candidate() {
    let fake = fake_duckduckgo(
        |_| vec!["/broken.jpg", "/b.png"],
        vec![
            ("/broken.jpg", StatusCode::INTERNAL_SERVER_ERROR, ""),
            ("/b.png", StatusCode::OK, "png bytes"),
        ],
    )
    .await;
    let fetcher = fetcher();
    let provider = DuckDuckGo::with_base_url(common::fetcher_client(), &fake.base);
    let dest = tempfile::tempdir().expect("dest");
    let uploads = UploadDir::new(dest.path(), "/uploads").await.expect("uploads");
    let store = store().await;
    let seeder = Seeder::new(
        &provider,
        &fetcher,
        &uploads,
        &store,
        Backend::Duckduckgo.default_filters(),
        3,
    );

    let ItemOutcome::Seeded { file, .. } = seeder.seed_item(&earring()).await else {
        panic!("expected the second candidate to be used");
    };
    assert!(file.filename.ends_with(".png"));
    assert_eq!(std::fs::read(&file.absolute_path).expect("read"), b"png bytes");
    assert_eq!(hits(&fake.image_hits["/broken.jpg"]), 3);
    assert_eq!(hits(&fake.image_hits["/b.png"]), 1);
}

#[tokio::test]
async fn exhausted_retries_skip_the_item_and_the_run_continues() {
    let fake = fake_duckduckgo(
        |query| {
            if query.contains("earring") {
                vec!["/broken.jpg"]
            } else {
                vec!["/hips.jpg"]
            }
        },
        vec![
            ("/broken.jpg", StatusCode::BAD_GATEWAY, ""),
            ("/hips.jpg", StatusCode::OK, "hips"),
        ],
    )
    .await;
    let fetcher = fetcher();
    let provider = DuckDuckGo::with_base_url(common::fetcher_client(), &fake.base);
    let dest = tempfile::tempdir().expect("dest");
    let uploads = UploadDir::new(dest.path(), "/uploads").await.expect("uploads");
    let store = store().await;
    let seeder = Seeder::new(
        &provider,
        &fetcher,
        &uploads,
        &store,
        Backend::Duckduckgo.default_filters(),
        3,
    );

    let catalog = Catalog::new(vec![earring(), hips()]).expect("catalog");
    let summary = seeder.run(&catalog).await;

    assert_eq!(
        summary,
        RunSummary {
            seeded: 1,
            not_found: 1,
            failed: 0,
        }
    );
    assert_eq!(hits(&fake.image_hits["/broken.jpg"]), 3);
    assert!(
        resources::by_key(store.connection(), "pose", "Hand on Earring")
            .await
            .expect("rows")
            .is_empty()
    );
    let written = files_in(uploads.path());
    assert_eq!(written.len(), 1);
    assert_eq!(
        std::fs::read(uploads.path().join(&written[0])).expect("read"),
        b"hips"
    );
    assert_eq!(fake.searches.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn search_failure_is_reported_and_skipped() {
    // no vqd token on the landing page
    let router = Router::new().route("/", get(|| async { "<html>rate limited</html>" }));
    let (listener, base) = bind().await;
    spawn(listener, router);

    let fetcher = fetcher();
    let provider = DuckDuckGo::with_base_url(common::fetcher_client(), &base);
    let dest = tempfile::tempdir().expect("dest");
    let uploads = UploadDir::new(dest.path(), "/uploads").await.expect("uploads");
    let store = store().await;
    let seeder = Seeder::new(
        &provider,
        &fetcher,
        &uploads,
        &store,
        Backend::Duckduckgo.default_filters(),
        3,
    );

    let outcome = seeder.seed_item(&earring()).await;
    let reason = match outcome {
        ItemOutcome::Failed(reason) => reason,
        other => panic!("expected a failure, got {other:?}"),
    };
    assert!(reason.contains("vqd"), "{reason}");
    assert!(files_in(uploads.path()).is_empty());
}

#[tokio::test]
async fn stage_mode_ignores_stale_scratch_files() {
    let (listener, base) = bind().await;
    let fresh_hits = Arc::new(AtomicUsize::new(0));
    let murl_base = base.clone();
    let router = Router::new()
        .route(
            "/images/async",
            get(move || {
                let murl_base = murl_base.clone();
                async move {
                    format!(
                        "<a class=\"iusc\" m=\"{{&quot;murl&quot;:&quot;{murl_base}/fresh.png&quot;}}\"></a>"
                    )
                }
            }),
        )
        .route(
            "/fresh.png",
            counted(fresh_hits.clone(), |_| (StatusCode::OK, b"fresh".to_vec())),
        );
    spawn(listener, router);

    let scratch = tempfile::tempdir().expect("scratch");
    let client = common::fetcher_client();
    let provider = StagedSearch::new(
        BingStager::with_base_url(client.clone(), fetcher(), &base),
        scratch.path().to_path_buf(),
    );
    let item = hips();
    let query_dir = provider.scratch_dir_for(&item.query);
    std::fs::create_dir_all(&query_dir).expect("mkdir");
    std::fs::write(query_dir.join("Image_0.jpg"), b"stale").expect("stale file");

    let fetcher = fetcher();
    let dest = tempfile::tempdir().expect("dest");
    let uploads = UploadDir::new(dest.path(), "/uploads").await.expect("uploads");
    let store = store().await;
    assert_eq!(provider.name(), "Bing");
    let seeder = Seeder::new(
        &provider,
        &fetcher,
        &uploads,
        &store,
        Backend::Bing.default_filters(),
        3,
    );

    let outcome = seeder.seed_item(&item).await;

    let file = match outcome {
        ItemOutcome::Seeded { file, .. } => file,
        other => panic!("expected the item to be seeded, got {other:?}"),
    };
    assert!(file.filename.ends_with(".png"));
    assert_eq!(std::fs::read(&file.absolute_path).expect("read"), b"fresh");
    assert_eq!(files_in(&query_dir), vec!["Image_1.png".to_string()]);
    assert_eq!(hits(&fresh_hits), 1);

    let rows = resources::by_key(store.connection(), "pose", "Hands on Hips")
        .await
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].thumbnail.as_deref(), Some(file.public_path.as_str()));
}
