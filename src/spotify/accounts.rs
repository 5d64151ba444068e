use async_trait::async_trait;
use reqwest::{Client, Response, Url};

use crate::{
    config,
    error::Error,
    types::{
        AuthorizationRequest, ClientCredentials, Credential, TokenErrorResponse, TokenResponse,
    },
};

use super::CredentialExchange;

/// [`CredentialExchange`] backed by the Spotify accounts service.
///
/// Uses the confidential-client variant of the authorization code flow: the
/// client secret authenticates the token requests via HTTP basic auth.
pub struct SpotifyAccounts {
    http: Client,
    auth_url: String,
    token_url: String,
}

impl SpotifyAccounts {
    pub fn new(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::spotify_apiauth_url(), config::spotify_apitoken_url())
    }

    async fn request_token(
        &self,
        client: &ClientCredentials,
        form: &[(&str, &str)],
    ) -> Result<Credential, Error> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&client.client_id, Some(&client.client_secret))
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(token_error(response).await);
        }

        let token = response.json::<TokenResponse>().await?;
        Ok(token.into_credential())
    }
}

#[async_trait]
impl CredentialExchange for SpotifyAccounts {
    fn authorization_url(
        &self,
        client: &ClientCredentials,
        scopes: &[String],
        redirect_uri: &str,
        state: &str,
    ) -> String {
        let scope = scopes.join(" ");
        let params = [
            ("client_id", client.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
        ];

        match Url::parse_with_params(&self.auth_url, &params) {
            Ok(url) => url.to_string(),
            // keep going with an unencoded URL, the user can still follow it
            Err(_) => format!(
                "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
                self.auth_url, client.client_id, redirect_uri, scope, state
            ),
        }
    }

    async fn exchange_code(
        &self,
        request: &AuthorizationRequest,
        code: &str,
    ) -> Result<Credential, Error> {
        self.request_token(
            &request.client,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", request.redirect_uri.as_str()),
            ],
        )
        .await
    }

    async fn refresh(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Credential, Error> {
        let mut credential = self
            .request_token(
                client,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;

        // the service only sometimes rotates the refresh token
        if credential.refresh_token.is_none() {
            credential.refresh_token = Some(refresh_token.to_string());
        }
        Ok(credential)
    }
}

async fn token_error(response: Response) -> Error {
    let status = response.status();
    let reason = match response.json::<TokenErrorResponse>().await {
        Ok(body) => match body.error_description {
            Some(description) => format!("{} ({})", body.error, description),
            None => body.error,
        },
        Err(_) => status.to_string(),
    };
    Error::AuthorizationFailed(format!("token request failed: {}", reason))
}
