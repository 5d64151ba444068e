//! Configuration management for the playlist reverser.
//!
//! Values are read from environment variables, optionally populated from a
//! `.env` file in the local data directory. Every value has a default so the
//! tool runs without any configuration besides the client credentials, which
//! are taken from the command line (or their environment variables).
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

/// Scopes needed to read the source playlist and write the target playlist.
pub const SCOPES: [&str; 4] = [
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-read-private",
];

/// How long the callback listener stays up after answering the browser.
pub const CALLBACK_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_TOKEN_FILE: &str = ".spotify_token.json";
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up under `spotrev/.env` in:
/// - Linux: `~/.local/share/spotrev/.env`
/// - macOS: `~/Library/Application Support/spotrev/.env`
/// - Windows: `%LOCALAPPDATA%/spotrev/.env`
///
/// A missing file is fine. A file that exists but cannot be parsed is reported
/// as an error string.
///
/// # Example
///
/// ```
/// use spotrev::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotrev/.env");

    if !async_fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
    {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| format!("Failed to load {}: {}", path.display(), e))
}

/// Returns the address the local OAuth callback listener binds to.
///
/// Reads `SERVER_ADDRESS`, defaulting to `127.0.0.1:8888`.
///
/// # Errors
///
/// Returns an error string if the configured value is not a socket address.
pub fn server_addr() -> Result<SocketAddr, String> {
    let raw = var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
    SocketAddr::from_str(&raw).map_err(|e| format!("Invalid SERVER_ADDRESS '{}': {}", raw, e))
}

/// Returns the OAuth redirect URI.
///
/// Reads `SPOTIFY_API_REDIRECT_URI`. This must match a redirect URI registered
/// in the Spotify application settings and point at [`server_addr`].
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the Spotify OAuth authorization URL (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Spotify OAuth token exchange URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the path of the cached credential file.
///
/// Reads `SPOTREV_TOKEN_FILE`, defaulting to `.spotify_token.json` relative to
/// the working directory.
pub fn token_path() -> PathBuf {
    PathBuf::from(var_or("SPOTREV_TOKEN_FILE", DEFAULT_TOKEN_FILE))
}

/// Returns how long the authorization flow waits for the browser redirect.
///
/// Reads `SPOTREV_AUTH_TIMEOUT` in seconds. Unparsable values fall back to the
/// five minute default.
pub fn auth_timeout() -> Duration {
    let secs = env::var("SPOTREV_AUTH_TIMEOUT")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
