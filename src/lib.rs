//! Cashbook is a small bookkeeping web app for recording cash in/out/expense
//! transactions, computing running balances, and managing employee payslips.
//!
//! Persistence, authentication, and querying are delegated to a hosted data
//! platform; this crate is the request glue, the summary aggregation, and a
//! tiny upload relay that forwards receipt images into object storage.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod config;
mod employee;
mod endpoints;
mod log_in;
mod logging;
mod payslip;
mod platform;
mod receipt;
mod routing;
mod summary;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use app_state::AppState;
pub use config::{Config, ConfigError};
pub use logging::logging_middleware;
pub use platform::{Authenticator, HttpPlatformClient, ObjectStore, RecordStore, Session};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The transaction amount was zero, negative, or not a finite number.
    ///
    /// Caught before any platform call; a transaction amount is only
    /// meaningful as a positive quantity added to one of the three buckets.
    #[error("amount must be a number greater than zero")]
    InvalidAmount,

    /// An empty string was used for an employee name.
    #[error("name must not be empty")]
    EmptyName,

    /// The log-in form was submitted with a blank email or password.
    #[error("email and password must not be empty")]
    MissingCredentials,

    /// The payslip gross salary was zero, negative, or not a finite number.
    #[error("gross salary must be a number greater than zero")]
    InvalidGrossSalary,

    /// The payslip pay period ends before it starts.
    #[error("pay period must not end before it starts")]
    InvalidPayPeriod,

    /// The multipart form did not contain a file field.
    #[error("No file")]
    NoFile,

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    Multipart(String),

    /// The data platform rejected the credentials.
    ///
    /// Carries the platform's own message, which is already user-safe and is
    /// surfaced to the caller verbatim.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The data platform reported an error for a row or storage operation.
    ///
    /// Carries the platform's own message, which is already user-safe and is
    /// surfaced to the caller verbatim.
    #[error("{0}")]
    Platform(String),

    /// The data platform could not be reached at the transport level.
    ///
    /// The message should only be logged on the server; clients get a generic
    /// internal error instead.
    #[error("could not reach the data platform: {0}")]
    Transport(String),

    /// The data platform responded with a payload this crate does not
    /// understand.
    ///
    /// The message should only be logged on the server; clients get a generic
    /// internal error instead.
    #[error("unexpected response from the data platform: {0}")]
    UnexpectedResponse(String),

    /// A value could not be serialized as JSON.
    #[error("could not serialize as JSON: {0}")]
    Serialization(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            // Validation failures are the caller's to fix and are never
            // logged as system faults.
            Error::InvalidAmount
            | Error::EmptyName
            | Error::MissingCredentials
            | Error::InvalidGrossSalary
            | Error::InvalidPayPeriod => {
                json_error(StatusCode::UNPROCESSABLE_ENTITY, &self.to_string())
            }
            Error::NoFile => json_error(StatusCode::BAD_REQUEST, "No file"),
            Error::InvalidCredentials(message) => json_error(StatusCode::UNAUTHORIZED, &message),
            // The platform's message is passed through unmodified.
            Error::Platform(message) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &message),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred. Please try again later.",
                )
            }
        }
    }
}

/// Build a JSON error response of the form `{"error": "<message>"}`.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
