//!
//! src/fetch.rs  Andrew Belles  Oct 19th, 2026
//!
//! Spotify side of the export: trades the client credentials for a bearer
//! token and walks the playlist's track pages into TrackRecords
//!

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, header, redirect, RequestBuilder};
use tracing::{debug, info};
use url::Url;

use crate::config::{HttpConfig, SpotifyConfig};
use crate::errors::ensure_success;
use crate::types::{PlaylistPage, TokenResponse, TrackRecord};
use crate::SyncError;

/// Spotify caps playlist track pages at 100 items
pub const PAGE_LIMIT: u32 = 100;

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(http.user_agent.as_str())
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

pub fn client_with_headers(http: &HttpConfig, headers: header::HeaderMap) ->
    Result<Client, SyncError> {
    client_helper(http)
        .default_headers(headers)
        .build()
        .map_err(|e| SyncError::Http(format!("build client: {e}")))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, SyncError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_with_headers(http, h)
}

#[derive(Clone, Debug)]
pub struct SpotifyClient {
    pub http: Client,
    pub cfg: SpotifyConfig
}

impl SpotifyClient {
    pub fn new(http_config: &HttpConfig, cfg: &SpotifyConfig) ->
        Result<Self, SyncError> {

        let http = base_client(http_config)?;
        Ok( Self {
            http,
            cfg: cfg.clone()
        })
    }

    /// Basic credential for the token endpoint, base64(id:secret)
    pub fn basic_credential(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.cfg.client_id, self.cfg.client_secret))
    }

    /// POST /api/token grant_type=client_credentials
    pub fn token_request(&self) -> RequestBuilder {
        self.http
            .post(self.cfg.token_url.clone())
            .header(header::AUTHORIZATION, format!("Basic {}", self.basic_credential()))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
    }

    /// Runs the client credentials handshake. The token is used for this
    /// run only and never stored
    pub async fn access_token(&self) -> Result<String, SyncError> {
        let response = self.token_request()
            .send()
            .await
            .map_err(|e| SyncError::Auth(e.to_string()))?;
        let response = ensure_success(response, SyncError::Auth).await?;

        let token: TokenResponse = response.json()
            .await
            .map_err(|e| SyncError::Auth(format!("token body: {e}")))?;

        debug!(
            token_type = token.token_type.as_deref().unwrap_or("unknown"),
            expires_in = token.expires_in,
            "spotify.token"
        );
        Ok(token.access_token)
    }

    /// {api_base}playlists/{id}/tracks?limit=100
    pub fn first_page_url(&self) -> Result<Url, SyncError> {
        let mut url = self.cfg.api_base
            .join(&format!("playlists/{}/tracks", self.cfg.playlist_id))
            .map_err(|e| SyncError::Config(format!("playlist url: {e}")))?;
        url.query_pairs_mut().append_pair("limit", &PAGE_LIMIT.to_string());
        Ok(url)
    }

    /// GET one page, `url` is either the first page or a `next` link
    pub fn page(&self, url: &str, bearer: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(bearer)
    }

    /// Follows `next` until Spotify stops sending one. The link is trusted
    /// as given, a page that points back at itself would loop. Any failed
    /// page fails the whole fetch
    pub async fn playlist_tracks(&self, bearer: &str) ->
        Result<Vec<TrackRecord>, SyncError> {
        let mut records = Vec::new();
        let mut next_url = Some(self.first_page_url()?.to_string());
        let mut pages = 0_usize;

        while let Some(url) = next_url {
            let response = self.page(&url, bearer)
                .send()
                .await
                .map_err(|e| SyncError::Fetch(e.to_string()))?;
            let response = ensure_success(response, SyncError::Fetch).await?;

            let page: PlaylistPage = response.json()
                .await
                .map_err(|e| SyncError::Fetch(format!("page {pages}: {e}")))?;

            pages += 1;
            debug!(page = pages, items = page.items.len(), total = page.total, "fetch.page");

            records.extend(page.items.into_iter().map(TrackRecord::from_item));
            next_url = page.next;
        }

        info!(
            playlist = %self.cfg.playlist_id,
            pages,
            tracks = records.len(),
            "fetch.done"
        );
        Ok(records)
    }
}
