use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds before the recorded expiry at which a credential counts as expired.
const EXPIRY_BUFFER_SECS: u64 = 240;

/// Access/refresh token pair as persisted in the credential file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Credential {
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        now >= self
            .obtained_at
            .saturating_add(self.expires_in)
            .saturating_sub(EXPIRY_BUFFER_SECS)
    }
}

/// How a credential handed out by the auth flow was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Loaded from disk and confirmed live by a probe call.
    Validated,
    /// Loaded from disk and renewed with its refresh token.
    Refreshed,
    /// Freshly obtained from the authorization code exchange.
    Exchanged,
}

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub credential: Credential,
    pub state: CredentialState,
}

/// Client id and secret registered with the service.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// One authorization attempt. Built once per flow and never modified.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client: ClientCredentials,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    pub state: String,
    pub url: String,
}

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn into_credential(self) -> Credential {
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scope: self.scope.unwrap_or_default(),
            expires_in: self.expires_in,
            obtained_at: Utc::now().timestamp().max(0) as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    /// Absent in some simplified playlist objects.
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// `None` for local files and other entries the service cannot resolve.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

impl Track {
    /// URI used to re-add the track, if the track can be resolved at all.
    pub fn playable_uri(&self) -> Option<String> {
        let id = self.id.as_ref()?;
        match &self.uri {
            Some(uri) if !uri.starts_with("spotify:local:") => Some(uri.clone()),
            _ => Some(format!("spotify:track:{}", id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<Track>,
}

/// Offset-paged listing as returned by the Web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

/// Inputs of one playlist reversal run.
#[derive(Debug, Clone)]
pub struct ReverseOptions {
    pub source_playlist_id: String,
    pub target_playlist_name: Option<String>,
    pub target_playlist_description: Option<String>,
    pub override_existing: bool,
}

/// What a reversal run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseSummary {
    pub target_id: String,
    pub target_name: String,
    pub written: usize,
    pub skipped: usize,
    pub replaced_existing: bool,
}
