#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use spotrev::{
    error::Error,
    spotify::{CredentialExchange, PlaylistService},
    types::{
        AuthorizationRequest, ClientCredentials, Credential, CurrentUser, Owner, Page, Playlist,
        PlaylistItem, Track,
    },
};

pub const VALID_TOKEN: &str = "valid-token";
pub const MALFORMED_TOKEN: &str = "malformed-token";
pub const USER_ID: &str = "listener";
pub const CURATOR_ID: &str = "curator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Create {
        name: String,
        description: Option<String>,
    },
    Clear(String),
    Add(String, Vec<String>),
}

#[derive(Default)]
pub struct Library {
    pub own: Vec<Playlist>,
    pub others: Vec<Playlist>,
    pub tracks: HashMap<String, Vec<PlaylistItem>>,
    pub rejected_ids: Vec<String>,
    pub writes: Vec<Write>,
    pub probes: Vec<(String, u32)>,
    created: usize,
}

/// In-memory playlist service. Only `VALID_TOKEN` is accepted.
#[derive(Default)]
pub struct FakeService {
    pub library: Mutex<Library>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_own(self, id: &str, name: &str, items: Vec<PlaylistItem>) -> Self {
        {
            let mut lib = self.library.lock().unwrap();
            lib.own.push(playlist(id, name, USER_ID));
            lib.tracks.insert(id.to_string(), items);
        }
        self
    }

    pub fn with_other(self, id: &str, name: &str, items: Vec<PlaylistItem>) -> Self {
        {
            let mut lib = self.library.lock().unwrap();
            lib.others.push(playlist(id, name, CURATOR_ID));
            lib.tracks.insert(id.to_string(), items);
        }
        self
    }

    /// A playlist the user follows: listed with their own, owned by someone else.
    pub fn with_followed(self, id: &str, name: &str, items: Vec<PlaylistItem>) -> Self {
        {
            let mut lib = self.library.lock().unwrap();
            lib.own.push(playlist(id, name, CURATOR_ID));
            lib.tracks.insert(id.to_string(), items);
        }
        self
    }

    pub fn rejecting(self, id: &str) -> Self {
        self.library
            .lock()
            .unwrap()
            .rejected_ids
            .push(id.to_string());
        self
    }

    pub fn writes(&self) -> Vec<Write> {
        self.library.lock().unwrap().writes.clone()
    }

    pub fn probes(&self) -> Vec<(String, u32)> {
        self.library.lock().unwrap().probes.clone()
    }

    pub fn track_uris(&self, playlist_id: &str) -> Vec<String> {
        self.library
            .lock()
            .unwrap()
            .tracks
            .get(playlist_id)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.track.as_ref().and_then(|t| t.uri.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn own_named(&self, name: &str) -> Vec<Playlist> {
        self.library
            .lock()
            .unwrap()
            .own
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }

    fn authorize(token: &str) -> Result<(), Error> {
        match token {
            VALID_TOKEN => Ok(()),
            MALFORMED_TOKEN => Err(Error::Rejected {
                status: StatusCode::BAD_REQUEST,
                message: "Only valid bearer authentication supported".to_string(),
            }),
            _ => Err(Error::InvalidCredential),
        }
    }

    fn check_id(lib: &Library, playlist_id: &str) -> Result<(), Error> {
        if lib.rejected_ids.iter().any(|id| id == playlist_id) {
            return Err(Error::Rejected {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid base62 id".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlaylistService for FakeService {
    async fn current_user(&self, token: &str) -> Result<CurrentUser, Error> {
        Self::authorize(token)?;
        Ok(CurrentUser {
            id: USER_ID.to_string(),
        })
    }

    async fn get_playlist(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Option<Playlist>, Error> {
        Self::authorize(token)?;
        let lib = self.library.lock().unwrap();
        Self::check_id(&lib, playlist_id)?;
        Ok(lib
            .own
            .iter()
            .chain(lib.others.iter())
            .find(|p| p.id == playlist_id)
            .cloned())
    }

    async fn get_playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistItem>, Error> {
        Self::authorize(token)?;
        let lib = self.library.lock().unwrap();
        Self::check_id(&lib, playlist_id)?;
        lib.tracks
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| Error::Rejected {
                status: StatusCode::NOT_FOUND,
                message: "Not found.".to_string(),
            })
    }

    async fn list_own_playlists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, Error> {
        let mut lib = self.library.lock().unwrap();
        lib.probes.push((token.to_string(), limit));
        Self::authorize(token)?;

        let start = (offset as usize).min(lib.own.len());
        let end = (start + limit as usize).min(lib.own.len());
        let next = (end < lib.own.len()).then(|| format!("offset={}", end));
        Ok(Page {
            items: lib.own[start..end].to_vec(),
            next,
            total: Some(lib.own.len() as u64),
        })
    }

    async fn create_playlist(
        &self,
        token: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist, Error> {
        Self::authorize(token)?;
        let mut lib = self.library.lock().unwrap();
        lib.created += 1;
        let created = Playlist {
            id: format!("created-{}", lib.created),
            name: name.to_string(),
            owner: Some(Owner {
                id: USER_ID.to_string(),
            }),
            description: description.map(str::to_string),
            snapshot_id: None,
        };
        lib.own.push(created.clone());
        lib.tracks.insert(created.id.clone(), Vec::new());
        lib.writes.push(Write::Create {
            name: name.to_string(),
            description: description.map(str::to_string),
        });
        Ok(created)
    }

    async fn clear_playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<(), Error> {
        Self::authorize(token)?;
        let mut lib = self.library.lock().unwrap();
        lib.tracks.insert(playlist_id.to_string(), Vec::new());
        lib.writes.push(Write::Clear(playlist_id.to_string()));
        Ok(())
    }

    async fn add_tracks_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), Error> {
        Self::authorize(token)?;
        let mut lib = self.library.lock().unwrap();
        let added = uris.iter().map(|uri| PlaylistItem {
            track: Some(Track {
                id: uri.rsplit(':').next().map(str::to_string),
                name: String::new(),
                uri: Some(uri.clone()),
            }),
        });
        lib.tracks
            .entry(playlist_id.to_string())
            .or_default()
            .extend(added);
        lib.writes
            .push(Write::Add(playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}

/// Credential exchange that hands out `VALID_TOKEN` credentials.
#[derive(Default)]
pub struct FakeExchange {
    pub exchanged_codes: Mutex<Vec<String>>,
    pub refreshed: Mutex<Vec<String>>,
    pub fail_refresh: bool,
    pub urls_built: AtomicUsize,
}

impl FakeExchange {
    pub fn urls_built(&self) -> usize {
        self.urls_built.load(Ordering::SeqCst)
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().unwrap().clone()
    }

    pub fn refreshed(&self) -> Vec<String> {
        self.refreshed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialExchange for FakeExchange {
    fn authorization_url(
        &self,
        client: &ClientCredentials,
        _scopes: &[String],
        redirect_uri: &str,
        state: &str,
    ) -> String {
        self.urls_built.fetch_add(1, Ordering::SeqCst);
        format!(
            "https://accounts.test/authorize?client_id={}&redirect_uri={}&state={}",
            client.client_id, redirect_uri, state
        )
    }

    async fn exchange_code(
        &self,
        _request: &AuthorizationRequest,
        code: &str,
    ) -> Result<Credential, Error> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        Ok(fresh_credential(VALID_TOKEN))
    }

    async fn refresh(
        &self,
        _client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Credential, Error> {
        self.refreshed.lock().unwrap().push(refresh_token.to_string());
        if self.fail_refresh {
            return Err(Error::AuthorizationFailed(
                "token request failed: invalid_grant".to_string(),
            ));
        }
        Ok(fresh_credential(VALID_TOKEN))
    }
}

pub fn playlist(id: &str, name: &str, owner_id: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        owner: Some(Owner {
            id: owner_id.to_string(),
        }),
        description: None,
        snapshot_id: None,
    }
}

pub fn track(id: &str) -> PlaylistItem {
    PlaylistItem {
        track: Some(Track {
            id: Some(id.to_string()),
            name: format!("Track {}", id),
            uri: Some(format!("spotify:track:{}", id)),
        }),
    }
}

pub fn unresolved() -> PlaylistItem {
    PlaylistItem { track: None }
}

pub fn local_file(name: &str) -> PlaylistItem {
    PlaylistItem {
        track: Some(Track {
            id: None,
            name: name.to_string(),
            uri: Some(format!("spotify:local:::{}:180", name)),
        }),
    }
}

pub fn uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}

pub fn fresh_credential(access_token: &str) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: Some(format!("{}-refresh", access_token)),
        scope: "playlist-read-private".to_string(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

pub fn expired_credential(access_token: &str) -> Credential {
    Credential {
        obtained_at: (Utc::now().timestamp() - 7200) as u64,
        ..fresh_credential(access_token)
    }
}

pub fn client() -> ClientCredentials {
    ClientCredentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

/// A loopback address whose port was free a moment ago.
pub fn free_local_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
