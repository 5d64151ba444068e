//! Spotify Playlist Reverser Library
//!
//! This library authorizes against the Spotify Web API with the authorization
//! code flow, caches the resulting credential on disk and copies the tracks of a
//! source playlist into a target playlist in reverse order.
//!
//! # Modules
//!
//! - `api` - HTTP handler behind the local OAuth redirect endpoint
//! - `cli` - Command implementations (playlist reversal, authorization)
//! - `config` - Configuration management and environment variables
//! - `error` - The crate error type
//! - `management` - Persisted credential handling
//! - `server` - Single-use local HTTP listener for the OAuth redirect
//! - `spotify` - Remote service traits, their Spotify implementations and the auth flow
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotrev::{config, management::TokenStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = TokenStore::new(config::token_path());
//!     if let Some(credential) = store.load().await {
//!         println!("cached token expired: {}", credential.is_expired());
//!     }
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching tracks from source playlist '{}'...", id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Wrote {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 right after printing, so it is
/// only used from the binary for failures that end the run.
///
/// # Example
///
/// ```
/// error!("Authorization failed: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues the user should notice, such as a credential
/// that could not be cached or a playlist name collision.
///
/// # Example
///
/// ```
/// warning!("Saved token is invalid or outdated.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
