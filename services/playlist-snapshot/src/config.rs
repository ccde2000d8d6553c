//!
//! src/config.rs  Andrew Belles  Oct 19th, 2026
//!
//! Builds the configuration for a single export run from the process
//! environment (and .env if present). Nothing here is global, main owns
//! the AppConfig and hands references to each client
//!

use url::Url;
use std::time;
use crate::SyncError;

/// Constants for HTTP Config
pub const HTTP_POOL_MAX_IDLE: usize = 4;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1/";
pub const GITHUB_API_BASE: &str = "https://api.github.com/";

/// Wrapper over a variable lookup to return an invalid environment var error
fn env_check(env: &impl Fn(&str) -> Option<String>, s: &str) ->
    Result<String, SyncError> {
    match env(s) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SyncError::Config(format!("{s} was not set"))),
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

/// Url::join drops the last segment unless the base ends in '/'
fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_string();
        path.push('/');
        url.set_path(&path);
    }
}

/// Parses an optional endpoint override, falling back to the public default
fn endpoint(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
    expected_host: Option<&str>
) -> Result<Url, SyncError> {
    let raw = env(name).unwrap_or_else(|| default.to_string());
    let url = Url::parse(&raw)
        .map_err(|e| SyncError::Config(format!("{name} invalid {e}")))?;

    ensure_https(&url).map_err(SyncError::Config)?;
    if let Some(host) = expected_host {
        ensure_host(&url, host).map_err(SyncError::Config)?;
    }
    Ok(url)
}

///
/// Configuration that Spotify expects when hitting endpoints
///
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub playlist_id: String,
    pub token_url: Url,
    pub api_base: Url,
}

fn build_spotify(env: &impl Fn(&str) -> Option<String>) ->
    Result<SpotifyConfig, SyncError> {
    let client_id     = env_check(env, "SPOTIFY_CLIENT_ID")?;
    let client_secret = env_check(env, "SPOTIFY_CLIENT_SECRET")?;
    let playlist_id   = env_check(env, "SPOTIFY_PLAYLIST_ID")?;

    let token_url = endpoint(
        env, "SPOTIFY_TOKEN_URL", SPOTIFY_TOKEN_URL, Some("accounts.spotify.com")
    )?;
    let mut api_base = endpoint(
        env, "SPOTIFY_API_BASE", SPOTIFY_API_BASE, Some("api.spotify.com")
    )?;
    ensure_trailing_slash(&mut api_base);

    Ok( SpotifyConfig { client_id, client_secret, playlist_id, token_url, api_base })
}

///
/// Repository the snapshot is committed to, given as "owner/name"
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String
}

impl RepoCoordinates {
    pub fn parse(s: &str) -> Result<Self, SyncError> {
        let mut parts = s.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string()
            }),
            _ => Err(SyncError::Config(
                format!("GITHUB_REPO must look like owner/name (got {s:?})")
            ))
        }
    }
}

impl std::fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: String,
    pub repo: RepoCoordinates,
    pub file_path: String,
    pub branch: String,
    pub api_base: Url
}

fn build_github(env: &impl Fn(&str) -> Option<String>) ->
    Result<GithubConfig, SyncError> {
    let token     = env_check(env, "GITHUB_TOKEN")?;
    let repo      = RepoCoordinates::parse(&env_check(env, "GITHUB_REPO")?)?;
    let file_path = env_check(env, "GITHUB_FILE_PATH")?;
    let branch    = env_check(env, "GITHUB_BRANCH")?;

    // enterprise installs live on their own host, so only https is enforced
    let mut api_base = endpoint(env, "GITHUB_API_BASE", GITHUB_API_BASE, None)?;
    ensure_trailing_slash(&mut api_base);

    Ok( GithubConfig { token, repo, file_path, branch, api_base } )
}

///
/// Configuration for the shared reqwest client. No request timeout is set,
/// each call waits as long as the transport allows
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("playlist-snapshot/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
        }
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,playlist_snapshot=debug,reqwest=warn".to_string(),
            format: LogFormat::Pretty,
            with_ansi: true,
            include_file_line: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Never fails, unknown values fall back to the defaults so that the
    /// logger is up before the rest of the config is checked
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        match env("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => {
                cfg.format = LogFormat::Json;
                cfg.include_file_line = true;
            }
            _ => {}
        }
        if env("LOG_ANSI").as_deref() == Some("0") {
            cfg.with_ansi = false;
        }
        cfg
    }
}

///
/// AppConfig which holds everything the clients need for one run
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub github: GithubConfig,
    pub http: HttpConfig,
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, SyncError> {
    dotenvy::dotenv().ok();
    load_config_from(|k| std::env::var(k).ok())
}

pub fn load_config_from(env: impl Fn(&str) -> Option<String>) ->
    Result<AppConfig, SyncError> {
    let spotify = build_spotify(&env)?;
    let github  = build_github(&env)?;
    let http    = HttpConfig::default();

    Ok( AppConfig { spotify, github, http } )
}
