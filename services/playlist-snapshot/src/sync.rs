//!
//! src/sync.rs  Andrew Belles  Oct 19th, 2026
//!
//! Defines the exporter: token, then every playlist page, then one commit.
//! Steps run strictly one after another and the first error ends the run
//!

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::fetch::SpotifyClient;
use crate::publish::GithubClient;
use crate::errors::SyncError;

#[derive(Clone, Debug)]
pub struct Exporter {
    spotify: SpotifyClient,
    github: GithubClient
}

impl Exporter {
    pub fn new(cfg: &AppConfig) -> Result<Self, SyncError> {
        let spotify = SpotifyClient::new(&cfg.http, &cfg.spotify)?;
        let github  = GithubClient::new(&cfg.http, &cfg.github)?;
        Ok( Self::from_clients(spotify, github) )
    }

    pub fn from_clients(spotify: SpotifyClient, github: GithubClient) -> Self {
        Self { spotify, github }
    }

    /// Returns the number of records committed
    pub async fn run(&self) -> Result<usize, SyncError> {
        let span = info_span!("sync.run", run_id = %Uuid::new_v4());

        async {
            info!(
                playlist = %self.spotify.cfg.playlist_id,
                repo = %self.github.cfg.repo,
                path = %self.github.cfg.file_path,
                branch = %self.github.cfg.branch,
                "sync.start"
            );

            let bearer  = self.spotify.access_token().await?;
            let records = self.spotify.playlist_tracks(&bearer).await?;
            let commit  = self.github.publish(&records).await?;

            info!(tracks = records.len(), commit = commit.as_deref(), "sync.done");
            Ok::<usize, SyncError>(records.len())
        }
        .instrument(span)
        .await
    }
}

/// Process exit status for a finished run, also writes the one line
/// summary the scheduler's log picks up
pub fn report(outcome: &Result<usize, SyncError>) -> u8 {
    match outcome {
        Ok(tracks) => {
            info!(tracks, "sync.ok");
            println!("Playlist successfully updated.");
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "sync.failed");
            eprintln!("Error updating playlist: {e}");
            1
        }
    }
}
