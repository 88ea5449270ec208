//! The client interface to the hosted data platform.
//!
//! The platform owns all durable state: named row collections, password
//! sessions, and object storage with public URLs. This module defines the
//! three seams the rest of the app talks through, and [HttpPlatformClient]
//! implements all of them against the platform's REST surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

mod http;

pub use http::HttpPlatformClient;

/// Handles the insertion and retrieval of rows in named collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one row into `collection` and return the stored row, including
    /// the fields the platform fills in (id, creation timestamp).
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, Error>;

    /// Fetch rows from `collection`, newest first.
    ///
    /// `filter` is an optional platform filter expression such as
    /// `employee_id=eq.3`; `None` fetches every row.
    async fn query(&self, collection: &str, filter: Option<&str>) -> Result<Vec<Value>, Error>;
}

/// Exchanges credentials for a session with the data platform.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Request a password session.
    ///
    /// # Errors
    /// Returns [Error::InvalidCredentials] with the platform's message when
    /// the credentials are rejected.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, Error>;
}

/// Stores opaque objects in named buckets and resolves their public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` to `bucket` under `key`, preserving `content_type`.
    ///
    /// Returns the object's path within the bucket.
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error>;

    /// The caller-resolvable address of a previously stored object.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// An authenticated session issued by the data platform.
///
/// The token is held by the client and attached to its own platform requests;
/// this crate never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token for subsequent platform requests.
    pub access_token: String,
    /// The token scheme, e.g. "bearer".
    pub token_type: String,
    /// Seconds until `access_token` expires.
    pub expires_in: u64,
    /// The token used to mint a fresh access token.
    pub refresh_token: String,
}
