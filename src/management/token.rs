use std::{io::ErrorKind, path::PathBuf};

use crate::{
    config,
    error::Error,
    spotify::PlaylistService,
    types::Credential,
    warning,
};

/// File-backed cache of the credential obtained by the auth flow.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn from_config() -> Self {
        Self::new(config::token_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the cached credential.
    ///
    /// `None` means there is nothing usable on disk: the file is missing, or it
    /// could not be read or parsed (reported as a warning). Either way the
    /// caller starts a fresh authorization.
    pub async fn load(&self) -> Option<Credential> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warning!("Failed reading saved token {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warning!("Saved token {} is malformed: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Checks that `credential` is still accepted, using a one-item playlist
    /// listing as probe. Any failure counts as invalid.
    pub async fn validate<S>(&self, api: &S, credential: &Credential) -> bool
    where
        S: PlaylistService + ?Sized,
    {
        match api.list_own_playlists(&credential.access_token, 1, 0).await {
            Ok(_) => true,
            Err(e) if e.is_rejection() => false,
            Err(e) => {
                warning!("Could not check saved token: {}", e);
                false
            }
        }
    }

    /// Overwrites the credential file with `credential`.
    pub async fn save(&self, credential: &Credential) -> Result<(), Error> {
        let persistence = |message: String| Error::Persistence {
            path: self.path.clone(),
            message,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(e.to_string()))?;
        }

        let json =
            serde_json::to_string_pretty(credential).map_err(|e| persistence(e.to_string()))?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| persistence(e.to_string()))
    }
}
