//! Defines the endpoint for exchanging credentials for a platform session.
//!
//! Authentication itself lives in the data platform; this handler only
//! checks that both fields are present and surfaces the platform's verdict.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::{
    AppState, Error,
    platform::{Authenticator, Session},
};

/// The state needed to perform a log-in.
#[derive(Clone)]
pub struct LogInState {
    /// The session capability of the data platform.
    pub auth: Arc<dyn Authenticator>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
        }
    }
}

/// The data for a log-in request.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    /// The user's email address.
    pub email: String,
    /// The user's password.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// Blank credentials are rejected locally without a platform call. On
/// success the platform's session is returned for the client to hold; on
/// rejection the platform's message is surfaced verbatim with `401`.
pub async fn post_log_in(
    State(state): State<LogInState>,
    Form(form): Form<LogInForm>,
) -> Result<Json<Session>, Error> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let session = state.auth.authenticate(&form.email, &form.password).await?;

    Ok(Json(session))
}
