use std::{future::Future, net::SocketAddr, time::Duration};

use crate::{
    config,
    error::Error,
    info,
    management::TokenStore,
    server::{CallbackListener, ListenerConfig},
    types::{Authenticated, AuthorizationRequest, ClientCredentials, CredentialState},
    utils, warning,
};

use super::{CredentialExchange, PlaylistService};

type Prompt<'a> = Box<dyn Fn(&AuthorizationRequest) + Send + Sync + 'a>;

/// Where the redirect lands and how long to wait for it.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub listen_addr: SocketAddr,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub timeout: Duration,
    pub shutdown_grace: Duration,
}

impl AuthSettings {
    pub fn from_config() -> Result<Self, Error> {
        Ok(Self {
            listen_addr: config::server_addr().map_err(Error::AuthorizationFailed)?,
            redirect_uri: config::spotify_redirect_uri(),
            scopes: config::SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: config::auth_timeout(),
            shutdown_grace: config::CALLBACK_SHUTDOWN_GRACE,
        })
    }
}

/// Obtains a usable credential, preferring the cached one.
///
/// 1. A cached credential that is past its expiry and has a refresh token is
///    refreshed and saved.
/// 2. Otherwise a cached credential that passes the probe call is returned as is.
/// 3. Otherwise the authorization code flow runs: the callback listener is
///    bound, the authorization URL is presented, the first redirect's code is
///    exchanged and the new credential is saved.
///
/// Failing to save never fails the flow; it is reported as a warning.
pub struct AuthFlow<'a, A: ?Sized, X: ?Sized> {
    api: &'a A,
    exchange: &'a X,
    store: &'a TokenStore,
    settings: AuthSettings,
    prompt: Prompt<'a>,
}

impl<'a, A, X> AuthFlow<'a, A, X>
where
    A: PlaylistService + ?Sized,
    X: CredentialExchange + ?Sized,
{
    pub fn new(api: &'a A, exchange: &'a X, store: &'a TokenStore, settings: AuthSettings) -> Self {
        Self {
            api,
            exchange,
            store,
            settings,
            prompt: Box::new(present_authorization_url),
        }
    }

    /// Replaces how the authorization URL is shown to the user.
    pub fn with_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&AuthorizationRequest) + Send + Sync + 'a,
    {
        self.prompt = Box::new(prompt);
        self
    }

    /// Runs the flow. Completing `cancel` while waiting for the redirect
    /// closes the listener and fails with [`Error::AuthorizationFailed`].
    pub async fn authenticate<F>(
        &self,
        client: &ClientCredentials,
        cancel: F,
    ) -> Result<Authenticated, Error>
    where
        F: Future<Output = ()>,
    {
        if let Some(cached) = self.reuse_cached(client).await {
            return Ok(cached);
        }

        let request = self.authorization_request(client);
        let listener = CallbackListener::bind(ListenerConfig {
            addr: self.settings.listen_addr,
            expected_state: Some(request.state.clone()),
            shutdown_grace: self.settings.shutdown_grace,
        })
        .await?;

        (self.prompt)(&request);

        let code = listener.wait(self.settings.timeout, cancel).await?;
        let credential = self.exchange.exchange_code(&request, &code).await?;

        if let Err(e) = self.store.save(&credential).await {
            warning!("Authorization succeeded but the token was not cached: {}", e);
        }

        Ok(Authenticated {
            credential,
            state: CredentialState::Exchanged,
        })
    }

    async fn reuse_cached(&self, client: &ClientCredentials) -> Option<Authenticated> {
        let cached = self.store.load().await?;

        if cached.is_expired() {
            if let Some(refresh_token) = cached.refresh_token.as_deref() {
                match self.exchange.refresh(client, refresh_token).await {
                    Ok(credential) => {
                        if let Err(e) = self.store.save(&credential).await {
                            warning!("Refreshed token was not cached: {}", e);
                        }
                        return Some(Authenticated {
                            credential,
                            state: CredentialState::Refreshed,
                        });
                    }
                    Err(e) => warning!("Saved token could not be refreshed: {}", e),
                }
                return None;
            }
        }

        if self.store.validate(self.api, &cached).await {
            return Some(Authenticated {
                credential: cached,
                state: CredentialState::Validated,
            });
        }

        warning!("Saved token is invalid or outdated.");
        None
    }

    fn authorization_request(&self, client: &ClientCredentials) -> AuthorizationRequest {
        let state = utils::generate_state();
        let url = self.exchange.authorization_url(
            client,
            &self.settings.scopes,
            &self.settings.redirect_uri,
            &state,
        );

        AuthorizationRequest {
            client: client.clone(),
            scopes: self.settings.scopes.clone(),
            redirect_uri: self.settings.redirect_uri.clone(),
            state,
            url,
        }
    }
}

fn present_authorization_url(request: &AuthorizationRequest) {
    info!("Go to this URL for authorization: {}", request.url);
    if webbrowser::open(&request.url).is_err() {
        warning!("Failed to open a browser, please open the URL above manually.");
    }
}
