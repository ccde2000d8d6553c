//!
//! src/types.rs  Andrew Belles  Oct 19th, 2026
//!
//! The flattened track record we publish, plus the slices of the Spotify
//! and GitHub payloads we read on the way there
//!

use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

// Blob sha of the file currently on the branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionMarker(pub String);

/// One playlist entry as written to the snapshot file. Field order here is
/// the key order in the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub title: String,
    pub artist: String,
    pub album_art: String,
    pub spotify_url: String,
    pub date_added: Option<String>
}

/// Treats "" the same as a missing value
fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

impl TrackRecord {
    pub fn from_item(item: PlaylistItem) -> Self {
        let track = item.track.as_ref();

        let title = non_empty(track.and_then(|t| t.name.as_deref()))
            .unwrap_or(UNKNOWN_TITLE)
            .to_string();

        let artist = track
            .and_then(|t| t.artists.as_ref())
            .map(|artists| artists.iter()
                .filter_map(|a| non_empty(a.name.as_deref()))
                .collect::<Vec<_>>()
                .join(", "))
            .filter(|joined| !joined.is_empty())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let album_art = non_empty(track
            .and_then(|t| t.album.as_ref())
            .and_then(|a| a.images.as_ref())
            .and_then(|images| images.first())
            .and_then(|image| image.url.as_deref()))
            .unwrap_or_default()
            .to_string();

        let spotify_url = non_empty(track
            .and_then(|t| t.external_urls.as_ref())
            .and_then(|urls| urls.spotify.as_deref()))
            .unwrap_or_default()
            .to_string();

        Self { title, artist, album_art, spotify_url, date_added: item.added_at }
    }
}

///
/// Spotify wire types. Every nested field is optional since local files,
/// removed tracks and podcast episodes all leave different holes
///

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub track: Option<SpotifyTrack>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<SpotifyArtist>>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub name: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Option<Vec<SpotifyImage>>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyImage {
    #[serde(default)]
    pub url: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>
}

///
/// GitHub contents API
///

#[derive(Debug, Clone, Deserialize)]
pub struct ContentMetadata {
    pub sha: String,
    #[serde(default)]
    pub path: Option<String>
}

#[derive(Debug, Clone, Serialize)]
pub struct PutContentsRequest<'a> {
    pub message: String,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>
}
