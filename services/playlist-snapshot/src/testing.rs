//!
//! src/testing.rs  Andrew Belles  Oct 19th, 2026
//!
//! Local stand-in for accounts.spotify.com, api.spotify.com and the GitHub
//! contents API so the clients can be tested without LIVE_HTTP. Counts and
//! records what it is sent
//!

use std::collections::HashMap;
use std::sync::{Arc, Mutex, atomic::{AtomicUsize, Ordering}};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use url::Url;

use crate::config::{AppConfig, GithubConfig, HttpConfig, RepoCoordinates, SpotifyConfig};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const BEARER: &str = "mock-bearer";
pub const PLAYLIST_ID: &str = "3cEYpjA9oz9GiPac4AsH4n";
pub const GITHUB_TOKEN: &str = "ghp_mock";
pub const OWNER: &str = "andrewbelles";
pub const REPO: &str = "site";
pub const FILE_PATH: &str = "data/playlist.json";
pub const BRANCH: &str = "main";

type Reply = (StatusCode, Json<Value>);
type Shared = State<Arc<MockState>>;

pub struct MockState {
    pub token_status: u16,
    pub tracks: Vec<Value>,
    pub fail_page_at_offset: Option<usize>,
    pub existing_sha: Option<String>,
    pub lookup_status: Option<u16>,
    pub put_status: u16,

    pub token_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    pub puts: Mutex<Vec<Value>>,

    // sha the mock currently holds and its own address for `next` links,
    // both filled in by start()
    pub current_sha: Mutex<Option<String>>,
    pub base: String
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            token_status: 200,
            tracks: Vec::new(),
            fail_page_at_offset: None,
            existing_sha: None,
            lookup_status: None,
            put_status: 200,
            token_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
            puts: Mutex::new(Vec::new()),
            current_sha: Mutex::new(None),
            base: String::new()
        }
    }
}

pub struct MockServer {
    pub state: Arc<MockState>,
    pub base: Url
}

impl MockServer {
    pub fn spotify_config(&self) -> SpotifyConfig {
        SpotifyConfig {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            playlist_id: PLAYLIST_ID.to_string(),
            token_url: self.base.join("api/token").unwrap(),
            api_base: self.base.join("v1/").unwrap()
        }
    }

    pub fn github_config(&self) -> GithubConfig {
        GithubConfig {
            token: GITHUB_TOKEN.to_string(),
            repo: RepoCoordinates { owner: OWNER.to_string(), name: REPO.to_string() },
            file_path: FILE_PATH.to_string(),
            branch: BRANCH.to_string(),
            api_base: self.base.clone()
        }
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            spotify: self.spotify_config(),
            github: self.github_config(),
            http: HttpConfig::default()
        }
    }
}

pub async fn start(mut state: MockState) -> MockServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    state.base = format!("http://{addr}");
    *state.current_sha.get_mut().unwrap() = state.existing_sha.clone();
    let state = Arc::new(state);

    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/playlists/{id}/tracks", get(playlist_tracks))
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(get_contents).put(put_contents)
        )
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    MockServer { state, base: Url::parse(&format!("http://{addr}/")).unwrap() }
}

pub fn full_item(title: &str) -> Value {
    json!({
        "added_at": "2024-03-01T12:00:00Z",
        "track": {
            "name": title,
            "artists": [{ "name": "Tame Impala" }, { "name": "Lil Yachty" }],
            "album": { "images": [{ "url": "https://i.scdn.co/image/ab67616d0000b273" }] },
            "external_urls": { "spotify": "https://open.spotify.com/track/6GtOsEzNUhJghrIf6UTbRV" }
        }
    })
}

/// Items titled "Track 0", "Track 1", ... so order can be checked
pub fn numbered_items(n: usize) -> Vec<Value> {
    (0..n).map(|i| full_item(&format!("Track {i}"))).collect()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reply(status: u16, body: Value) -> Reply {
    (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(body))
}

async fn token(State(state): Shared, headers: HeaderMap, body: String) -> Reply {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")));
    if header(&headers, "authorization") != Some(expected.as_str())
        || body != "grant_type=client_credentials" {
        return reply(401, json!({ "error": "invalid_client" }));
    }
    if state.token_status != 200 {
        return reply(state.token_status, json!({ "error": "invalid_request" }));
    }
    reply(200, json!({ "access_token": BEARER, "token_type": "Bearer", "expires_in": 3600 }))
}

async fn playlist_tracks(
    State(state): Shared,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap
) -> Reply {
    state.page_calls.fetch_add(1, Ordering::SeqCst);

    if header(&headers, "authorization") != Some(format!("Bearer {BEARER}").as_str()) {
        return reply(401, json!({ "error": { "status": 401, "message": "Invalid access token" } }));
    }
    if id != PLAYLIST_ID {
        return reply(404, json!({ "error": { "status": 404, "message": "Not found." } }));
    }

    let offset = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0_usize);
    let limit = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(100_usize);
    if state.fail_page_at_offset == Some(offset) {
        return reply(500, json!({ "error": { "status": 500, "message": "Server error" } }));
    }

    let total = state.tracks.len();
    let end = (offset + limit).min(total);
    let items = state.tracks.get(offset..end).unwrap_or_default().to_vec();
    let next = (end < total).then(|| format!(
        "{}/v1/playlists/{id}/tracks?offset={end}&limit={limit}", state.base
    ));

    reply(200, json!({
        "items": items,
        "next": next,
        "total": total,
        "offset": offset,
        "limit": limit
    }))
}

/// Rejects requests a real GitHub would not accept, or that target a file
/// other than the configured one
fn github_guard(headers: &HeaderMap, owner: &str, repo: &str, path: &str) -> Option<Reply> {
    if header(headers, "authorization") != Some(format!("Bearer {GITHUB_TOKEN}").as_str()) {
        return Some(reply(401, json!({ "message": "Bad credentials" })));
    }
    if header(headers, "user-agent").is_none_or(str::is_empty) {
        return Some(reply(403, json!({ "message": "Missing User-Agent" })));
    }
    if owner != OWNER || repo != REPO || path.trim_start_matches('/') != FILE_PATH {
        return Some(reply(404, json!({ "message": "Not Found" })));
    }
    None
}

async fn get_contents(
    State(state): Shared,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap
) -> Reply {
    state.lookup_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(rejected) = github_guard(&headers, &owner, &repo, &path) {
        return rejected;
    }
    if query.get("ref").map(String::as_str) != Some(BRANCH) {
        return reply(404, json!({ "message": "No commit found for the ref" }));
    }
    if let Some(status) = state.lookup_status {
        return reply(status, json!({ "message": "mock lookup failure" }));
    }

    match state.current_sha.lock().unwrap().clone() {
        Some(sha) => reply(200, json!({ "type": "file", "path": FILE_PATH, "sha": sha })),
        None => reply(404, json!({ "message": "Not Found" }))
    }
}

async fn put_contents(
    State(state): Shared,
    Path((owner, repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>
) -> Reply {
    if let Some(rejected) = github_guard(&headers, &owner, &repo, &path) {
        return rejected;
    }

    let count = {
        let mut puts = state.puts.lock().unwrap();
        puts.push(body.clone());
        puts.len()
    };
    if state.put_status != 200 {
        return reply(state.put_status, json!({ "message": "mock rejection" }));
    }

    let mut current = state.current_sha.lock().unwrap();
    if current.as_deref() != body.get("sha").and_then(Value::as_str) {
        return reply(409, json!({ "message": "sha does not match" }));
    }

    let created = current.is_none();
    let blob = format!("blob-{count}");
    *current = Some(blob.clone());

    reply(if created { 201 } else { 200 }, json!({
        "content": { "path": FILE_PATH, "sha": blob },
        "commit": { "sha": format!("commit-{count}") }
    }))
}
