use tokio::sync::Notify;

use crate::{
    error::Error,
    info,
    spotify::{AuthFlow, CredentialExchange, PlaylistService},
    success,
    types::{Authenticated, ClientCredentials, CredentialState},
    utils,
};

/// Runs the auth flow until it finishes or `interrupt` fires.
///
/// An interrupt drops the flow wherever it is, which closes the callback
/// listener if one is open, and fails with [`Error::AuthorizationFailed`].
pub async fn auth<A, X>(
    flow: &AuthFlow<'_, A, X>,
    client: &ClientCredentials,
    interrupt: &Notify,
) -> Result<Authenticated, Error>
where
    A: PlaylistService + ?Sized,
    X: CredentialExchange + ?Sized,
{
    let authenticated = utils::until_interrupted(
        interrupt,
        flow.authenticate(client, std::future::pending()),
    )
    .await
    .ok_or_else(|| Error::AuthorizationFailed("authorization was interrupted".to_string()))??;

    match authenticated.state {
        CredentialState::Validated => info!("Using saved token."),
        CredentialState::Refreshed => success!("Saved token refreshed."),
        CredentialState::Exchanged => success!("Authentication successful!"),
    }

    Ok(authenticated)
}
