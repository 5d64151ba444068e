//! # Spotify Integration Module
//!
//! The remote side of the tool is described by two capability traits:
//!
//! - [`PlaylistService`] - the playlist reads and writes of the Web API
//! - [`CredentialExchange`] - authorization URL construction, code exchange and
//!   token refresh against the accounts service
//!
//! [`SpotifyClient`] and [`SpotifyAccounts`] implement them over HTTP with
//! reqwest. The [`auth`] module drives the authorization code flow on top of
//! both traits and the local callback listener.
//!
//! ```text
//! CLI (reverse, auth)
//!      ↓
//! AuthFlow ── TokenStore
//!      ↓            ↓
//! CredentialExchange / PlaylistService
//!      ↓
//! Spotify accounts service / Web API
//! ```
//!
//! ## Error Handling
//!
//! - 401 responses surface as [`Error::InvalidCredential`]
//! - other 4xx responses surface as [`Error::Rejected`]
//! - 429 responses are retried after `Retry-After` (up to 120 seconds)
//! - 502 responses are retried after 10 seconds
//! - transport and decoding failures surface as [`Error::RemoteService`]

use async_trait::async_trait;

use crate::{
    error::Error,
    types::{
        AuthorizationRequest, ClientCredentials, Credential, CurrentUser, Page, Playlist,
        PlaylistItem,
    },
};

mod accounts;
pub mod auth;
mod client;

pub use accounts::SpotifyAccounts;
pub use auth::{AuthFlow, AuthSettings};
pub use client::SpotifyClient;

/// Page size used when walking the user's playlists.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Playlist operations of the remote service. Every call is made on behalf of
/// the user owning `token`.
#[async_trait]
pub trait PlaylistService: Send + Sync {
    /// Profile of the user owning `token`.
    async fn current_user(&self, token: &str) -> Result<CurrentUser, Error>;

    /// Looks up any playlist visible to the user. `Ok(None)` if it does not exist.
    async fn get_playlist(&self, token: &str, playlist_id: &str)
    -> Result<Option<Playlist>, Error>;

    /// Fetches every item of the playlist, in playlist order.
    async fn get_playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistItem>, Error>;

    /// One page of the playlists owned or followed by the user.
    async fn list_own_playlists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, Error>;

    async fn create_playlist(
        &self,
        token: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist, Error>;

    /// Removes every track from the playlist.
    async fn clear_playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<(), Error>;

    /// Appends `uris` to the playlist, preserving their order.
    async fn add_tracks_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), Error>;
}

/// Authorization side of the remote service.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// URL the user opens to grant `scopes`; the service redirects back to
    /// `redirect_uri` carrying `state`.
    fn authorization_url(
        &self,
        client: &ClientCredentials,
        scopes: &[String],
        redirect_uri: &str,
        state: &str,
    ) -> String;

    /// Trades the code captured for `request` for a credential.
    async fn exchange_code(
        &self,
        request: &AuthorizationRequest,
        code: &str,
    ) -> Result<Credential, Error>;

    /// Renews an expired credential with its refresh token.
    async fn refresh(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Credential, Error>;
}

/// Walks all pages of [`PlaylistService::list_own_playlists`].
pub async fn all_own_playlists<S>(api: &S, token: &str) -> Result<Vec<Playlist>, Error>
where
    S: PlaylistService + ?Sized,
{
    let mut playlists = Vec::new();
    let mut offset = 0;

    loop {
        let page = api
            .list_own_playlists(token, PLAYLIST_PAGE_SIZE, offset)
            .await?;
        let received = page.items.len() as u32;
        playlists.extend(page.items);

        if page.next.is_none() || received == 0 {
            return Ok(playlists);
        }
        offset += received;
    }
}
