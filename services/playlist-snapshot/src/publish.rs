//!
//! src/publish.rs  Andrew Belles  Oct 19th, 2026
//!
//! Commits the snapshot to a file in a GitHub repo through the contents
//! API. The current blob sha is read first so that an existing file can be
//! replaced, a missing file is simply created
//!

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, header, RequestBuilder, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::config::{GithubConfig, HttpConfig};
use crate::errors::ensure_success;
use crate::fetch::client_with_headers;
use crate::types::{ContentMetadata, PutContentsRequest, RevisionMarker, TrackRecord};
use crate::SyncError;

pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Pretty printed with two space indents, the exact bytes we commit
pub fn render_snapshot(records: &[TrackRecord]) -> Result<String, SyncError> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[derive(Clone, Debug)]
pub struct GithubClient {
    pub http: Client,
    pub cfg: GithubConfig
}

impl GithubClient {
    pub fn new(http_config: &HttpConfig, cfg: &GithubConfig) -> Result<Self, SyncError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json")
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static(GITHUB_API_VERSION)
        );
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", cfg.token))
            .map_err(|e| SyncError::Config(format!("invalid GITHUB_TOKEN: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http = client_with_headers(http_config, headers)?;
        Ok( Self { http, cfg: cfg.clone() })
    }

    /// {api_base}repos/{owner}/{repo}/contents/{path}, each path segment
    /// encoded on its own
    pub fn contents_url(&self) -> Result<Url, SyncError> {
        let mut url = self.cfg.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config(
                format!("GITHUB_API_BASE cannot be a base: {}", self.cfg.api_base)
            ))?
            .pop_if_empty()
            .extend(["repos", self.cfg.repo.owner.as_str(), self.cfg.repo.name.as_str(), "contents"])
            .extend(self.cfg.file_path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Last segment of the configured path, used in the commit message
    pub fn file_name(&self) -> &str {
        self.cfg.file_path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(self.cfg.file_path.as_str())
    }

    pub fn commit_message(&self) -> String {
        format!(
            "Update {} - {}",
            self.file_name(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    /// GET /repos/{owner}/{repo}/contents/{path}?ref={branch}
    pub fn metadata_request(&self, url: Url) -> RequestBuilder {
        self.http.get(url).query(&[("ref", self.cfg.branch.as_str())])
    }

    /// Blob sha of the file on the configured branch, None when the file
    /// has not been created yet
    pub async fn current_revision(&self) -> Result<Option<RevisionMarker>, SyncError> {
        let response = self.metadata_request(self.contents_url()?)
            .send()
            .await
            .map_err(|e| SyncError::Lookup(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path = %self.cfg.file_path, branch = %self.cfg.branch, "publish.lookup.absent");
            return Ok(None);
        }
        let response = ensure_success(response, SyncError::Lookup).await?;

        let meta: ContentMetadata = response.json()
            .await
            .map_err(|e| SyncError::Lookup(format!("contents body: {e}")))?;

        debug!(sha = %meta.sha, path = meta.path.as_deref(), "publish.lookup");
        Ok(Some(RevisionMarker(meta.sha)))
    }

    /// PUT /repos/{owner}/{repo}/contents/{path}. Replaces the whole file,
    /// `marker` must be the current sha when the file already exists
    pub async fn put_contents(
        &self,
        records: &[TrackRecord],
        marker: Option<&RevisionMarker>
    ) -> Result<Option<String>, SyncError> {
        let snapshot = render_snapshot(records)
            .map_err(|e| SyncError::Publish(e.to_string()))?;
        let body = PutContentsRequest {
            message: self.commit_message(),
            content: STANDARD.encode(snapshot.as_bytes()),
            branch: &self.cfg.branch,
            sha: marker.map(|m| m.0.as_str())
        };

        let response = self.http.put(self.contents_url()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Publish(e.to_string()))?;
        let response = ensure_success(response, SyncError::Publish).await?;

        let created = response.status() == StatusCode::CREATED;
        let commit = response.json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.pointer("/commit/sha")
                .and_then(|s| s.as_str())
                .map(str::to_string));

        info!(
            repo = %self.cfg.repo,
            path = %self.cfg.file_path,
            branch = %self.cfg.branch,
            created,
            commit = commit.as_deref(),
            bytes = snapshot.len(),
            "publish.done"
        );
        Ok(commit)
    }

    /// Lookup then write. Every call commits, even when the content is
    /// unchanged
    pub async fn publish(&self, records: &[TrackRecord]) -> Result<Option<String>, SyncError> {
        let marker = self.current_revision().await?;
        self.put_contents(records, marker.as_ref()).await
    }
}
