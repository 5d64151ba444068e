use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::Error,
    server::{AuthorizationResult, CallbackState},
};

const CLOSE_PAGE: &str = "<html><head><script>window.close()</script></head>\
<body><p>Authorization received. You can close this window.</p></body></html>";

pub const ALREADY_ANSWERED: &str = "This authorization request has already been answered.";

pub async fn callback(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !state.claim() {
        return ALREADY_ANSWERED.into_response();
    }

    state.resolve(authorization_outcome(
        &params,
        state.expected_state.as_deref(),
    ));
    state.schedule_shutdown();

    Html(CLOSE_PAGE).into_response()
}

fn authorization_outcome(
    params: &HashMap<String, String>,
    expected_state: Option<&str>,
) -> AuthorizationResult {
    if let Some(expected) = expected_state {
        if params.get("state").map(String::as_str) != Some(expected) {
            return Err(Error::AuthorizationFailed(
                "redirect state does not match the authorization request".to_string(),
            ));
        }
    }

    match params.get("code") {
        Some(code) if !code.is_empty() => Ok(code.clone()),
        _ => Err(Error::AuthorizationFailed(match params.get("error") {
            Some(reason) => format!("the service returned '{}'", reason),
            None => "redirect carried no authorization code".to_string(),
        })),
    }
}
