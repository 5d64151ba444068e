use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    error::Error,
    types::{
        CreatePlaylistRequest, CurrentUser, ErrorResponse, Page, Playlist, PlaylistItem,
        PlaylistTracksRequest,
    },
    warning,
};

use super::PlaylistService;

/// Most track URIs the Web API accepts in one write.
const TRACK_BATCH_SIZE: usize = 100;
const TRACK_PAGE_SIZE: u32 = 100;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const MAX_BAD_GATEWAY_RETRIES: u32 = 3;

/// [`PlaylistService`] backed by the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    bad_gateway_delay: Duration,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bad_gateway_delay: BAD_GATEWAY_DELAY,
        }
    }

    /// Overrides the pause before a request answered with 502 is retried.
    pub fn with_bad_gateway_delay(mut self, delay: Duration) -> Self {
        self.bad_gateway_delay = delay;
        self
    }

    pub fn from_config() -> Self {
        Self::new(config::spotify_apiurl())
    }

    /// Sends the request built by `build` with the user's token.
    ///
    /// 429 responses are retried after the `Retry-After` delay as long as it
    /// is at most two minutes. 502 responses are retried up to three times,
    /// ten seconds apart, then fail with [`Error::RemoteService`]. 401 maps to
    /// [`Error::InvalidCredential`] and other client errors to
    /// [`Error::Rejected`].
    async fn send<F>(&self, token: &str, build: F) -> Result<Response, Error>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut bad_gateway_retries = 0;

        loop {
            let response = build(&self.http).bearer_auth(token).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = retry_after_secs(&response);
                    if retry_after <= MAX_RETRY_AFTER_SECS {
                        sleep(Duration::from_secs(retry_after)).await;
                        continue;
                    }
                    warning!(
                        "Retry after has reached an abnormal high of {} seconds. Try again later.",
                        retry_after
                    );
                    return Err(rejected(response).await);
                }
                StatusCode::BAD_GATEWAY if bad_gateway_retries < MAX_BAD_GATEWAY_RETRIES => {
                    bad_gateway_retries += 1;
                    sleep(self.bad_gateway_delay).await;
                    continue;
                }
                StatusCode::UNAUTHORIZED => return Err(Error::InvalidCredential),
                s if s.is_client_error() => return Err(rejected(response).await),
                _ => return response.error_for_status().map_err(Error::from),
            }
        }
    }
}

#[async_trait]
impl PlaylistService for SpotifyClient {
    async fn current_user(&self, token: &str) -> Result<CurrentUser, Error> {
        let url = format!("{}/me", self.api_url);
        let user = self
            .send(token, |c| c.get(&url))
            .await?
            .json::<CurrentUser>()
            .await?;
        Ok(user)
    }

    async fn get_playlist(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Option<Playlist>, Error> {
        let url = format!("{}/playlists/{}", self.api_url, playlist_id);
        match self.send(token, |c| c.get(&url)).await {
            Ok(response) => Ok(Some(response.json::<Playlist>().await?)),
            Err(Error::Rejected { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistItem>, Error> {
        let mut url = format!(
            "{}/playlists/{}/tracks?limit={}&offset=0",
            self.api_url, playlist_id, TRACK_PAGE_SIZE
        );
        let mut items = Vec::new();

        loop {
            let page = self
                .send(token, |c| c.get(&url))
                .await?
                .json::<Page<PlaylistItem>>()
                .await?;
            items.extend(page.items);

            match page.next {
                Some(next) => url = next,
                None => return Ok(items),
            }
        }
    }

    async fn list_own_playlists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, Error> {
        let url = format!(
            "{}/me/playlists?limit={}&offset={}",
            self.api_url, limit, offset
        );
        let page = self
            .send(token, |c| c.get(&url))
            .await?
            .json::<Page<Playlist>>()
            .await?;
        Ok(page)
    }

    async fn create_playlist(
        &self,
        token: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist, Error> {
        let user = self.current_user(token).await?;
        let url = format!("{}/users/{}/playlists", self.api_url, user.id);
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.map(str::to_string),
        };

        let playlist = self
            .send(token, |c| c.post(&url).json(&body))
            .await?
            .json::<Playlist>()
            .await?;
        Ok(playlist)
    }

    async fn clear_playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<(), Error> {
        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);
        let body = PlaylistTracksRequest { uris: Vec::new() };
        self.send(token, |c| c.put(&url).json(&body)).await?;
        Ok(())
    }

    async fn add_tracks_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), Error> {
        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);
        for chunk in uris.chunks(TRACK_BATCH_SIZE) {
            let body = PlaylistTracksRequest {
                uris: chunk.to_vec(),
            };
            self.send(token, |c| c.post(&url).json(&body)).await?;
        }
        Ok(())
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1)
}

async fn rejected(response: Response) -> Error {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) if !body.error.message.is_empty() => body.error.message,
        _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Error::Rejected { status, message }
}
