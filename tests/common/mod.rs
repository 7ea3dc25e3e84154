#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use reco::config::Config;
use reco::models::{Song, SongCandidate};
use reco::services::jwt::{JwtService, Provider};
use reco::services::metadata::{MetadataError, MetadataService};
use serde_json::Value;
use sqlx::PgPool;
use tokio::net::TcpListener;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("reco=debug")
            .with_test_writer()
            .init();
    });
}

/// A metadata service answering from registered links only.
///
/// Unregistered links fail like an unsupported link would.
#[derive(Debug, Default)]
pub struct MockMetadata {
    songs: Mutex<HashMap<String, SongCandidate>>,
    calls: Mutex<Vec<String>>,
}

impl MockMetadata {
    pub fn register(&self, link: &str, title: &str, artist: &str) {
        self.songs.lock().unwrap().insert(
            link.to_string(),
            SongCandidate {
                title: title.to_string(),
                artist: artist.to_string(),
                link: link.to_string(),
                thumbnail: Some(format!("{link}/thumb.jpg")),
            },
        );
    }

    /// Links looked up so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataService for MockMetadata {
    async fn fetch(&self, link: &str) -> Result<SongCandidate, MetadataError> {
        self.calls.lock().unwrap().push(link.to_string());
        self.songs
            .lock()
            .unwrap()
            .get(link)
            .cloned()
            .ok_or(MetadataError::Unsupported)
    }
}

/// Builds a configuration from `vars` on top of the test secret.
pub fn test_config(vars: &[(&str, &str)]) -> Config {
    let mut map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    map.entry("ADMIN_JWT_SECRET".into())
        .or_insert_with(|| TEST_JWT_SECRET.into());
    Config::from_lookup(move |key| map.get(key).cloned()).expect("test configuration is valid")
}

/// Signs a session token the way the login endpoints do.
pub fn admin_token(provider: Provider) -> String {
    JwtService::new(TEST_JWT_SECRET.as_bytes(), Duration::from_secs(600))
        .issue_admin_token("test-admin", "Test Admin", provider)
        .unwrap()
}

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub metadata: Arc<MockMetadata>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn admin_request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(admin_token(Provider::Password));
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.expect("Failed to execute request")
    }

    /// Current queue as returned by `GET /songs`
    pub async fn songs(&self) -> Vec<Song> {
        self.get("/songs").await.json().await.unwrap()
    }
}

/// Serves `router` on a random local port and returns its base URL.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

pub async fn spawn_app(db_pool: PgPool) -> TestApp {
    spawn_app_with(db_pool, &[]).await
}

/// Spawns the application with extra configuration variables and a
/// [`MockMetadata`] service.
pub async fn spawn_app_with(db_pool: PgPool, vars: &[(&str, &str)]) -> TestApp {
    init_tracing_once();

    let metadata = Arc::new(MockMetadata::default());
    let service: Arc<dyn MetadataService> = metadata.clone();
    let router =
        reco::app_with_metadata_service(db_pool.clone(), test_config(vars), Some(service));

    let address = serve(router).await;
    wait_until_ready(&address).await;

    TestApp {
        address,
        db_pool,
        metadata,
        client: reqwest::Client::new(),
    }
}

pub async fn wait_until_ready(address: &str) {
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Inserts a song directly, bypassing deduplication.
pub async fn insert_song(db_pool: &PgPool, title: &str, artist: &str, link: &str) -> i32 {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO songs (title, artist, link) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(title)
    .bind(artist)
    .bind(link)
    .fetch_one(db_pool)
    .await
    .unwrap()
}
