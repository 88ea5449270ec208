//! Implements a struct that holds the state of the server.

use std::sync::Arc;

use crate::{
    Config,
    platform::{Authenticator, HttpPlatformClient, ObjectStore, RecordStore},
};

/// The state of the server.
///
/// Everything in here is constructed once at startup and shared read-only;
/// request handlers never mutate it.
#[derive(Clone)]
pub struct AppState {
    /// The row insert/query capability of the data platform.
    pub records: Arc<dyn RecordStore>,

    /// The password session capability of the data platform.
    pub auth: Arc<dyn Authenticator>,

    /// The object storage capability of the data platform.
    pub objects: Arc<dyn ObjectStore>,

    /// The storage bucket that receipt images are uploaded into.
    pub receipt_bucket: String,
}

impl AppState {
    /// Create a new [AppState] backed by the hosted data platform described
    /// by `config`.
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(HttpPlatformClient::new(
            &config.platform_url,
            &config.service_key,
        ));

        Self {
            records: client.clone(),
            auth: client.clone(),
            objects: client,
            receipt_bucket: config.receipt_bucket.clone(),
        }
    }
}
