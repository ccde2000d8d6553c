//!
//! src/main.rs  Andrew Belles  Oct 19, 2026
//!
//! Entry point for one export run: pulls the playlist from Spotify and
//! commits it as JSON to the configured repo file. Meant to be started
//! fresh by an external scheduler, exits 0 on success and 1 otherwise
//!
//!

mod config;
mod errors;
mod logging;

mod fetch;
mod publish;
mod sync;
mod types;

#[cfg(test)]
mod testing;

use std::process::ExitCode;

use crate::errors::SyncError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _logger = match logging::init_logging(&config::LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error updating playlist: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        service="playlist-snapshot",
        version=%env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let outcome: Result<usize, SyncError> = async {
        let cfgs = config::load_config()?;
        sync::Exporter::new(&cfgs)?.run().await
    }.await;

    ExitCode::from(sync::report(&outcome))
}
