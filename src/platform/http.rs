//! The HTTP implementation of the data platform client.
//!
//! Speaks the platform's REST surface: `/rest/v1/{collection}` for rows,
//! `/auth/v1/token` for password sessions, and `/storage/v1/object` for
//! object storage. One client is built at startup from [crate::Config] and
//! shared read-only for the life of the process.

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde_json::Value;

use crate::{
    Error,
    platform::{Authenticator, ObjectStore, RecordStore, Session},
};

/// A client for the hosted data platform's REST API.
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HttpPlatformClient {
    /// Create a client for the platform at `base_url` using the privileged
    /// `service_key` credential.
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            service_key: service_key.to_owned(),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.base_url)
    }
}

#[async_trait]
impl RecordStore for HttpPlatformClient {
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, Error> {
        let response = self
            .authorized(self.http.post(self.collection_url(collection)))
            // Ask the platform to echo the stored row back, so the caller
            // sees the id and creation timestamp it assigned.
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await
            .map_err(|error| Error::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Platform(read_error_message(response).await));
        }

        let mut rows: Vec<Value> = response
            .json()
            .await
            .map_err(|error| Error::UnexpectedResponse(error.to_string()))?;

        rows.pop().ok_or_else(|| {
            Error::UnexpectedResponse(format!(
                "insert into {collection} returned no representation"
            ))
        })
    }

    async fn query(&self, collection: &str, filter: Option<&str>) -> Result<Vec<Value>, Error> {
        let mut url = format!(
            "{}?select=*&order=created_at.desc",
            self.collection_url(collection)
        );

        if let Some(filter) = filter {
            url.push('&');
            url.push_str(filter);
        }

        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|error| Error::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Platform(read_error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|error| Error::UnexpectedResponse(error.to_string()))
    }
}

#[async_trait]
impl Authenticator for HttpPlatformClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, Error> {
        let response = self
            .authorized(
                self.http
                    .post(format!("{}/auth/v1/token?grant_type=password", self.base_url)),
            )
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|error| Error::Transport(error.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|error| Error::UnexpectedResponse(error.to_string())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::InvalidCredentials(read_error_message(response).await))
            }
            _ => Err(Error::Platform(read_error_message(response).await)),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpPlatformClient {
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error> {
        let response = self
            .authorized(
                self.http
                    .post(format!("{}/storage/v1/object/{bucket}/{key}", self.base_url)),
            )
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|error| Error::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Platform(read_error_message(response).await));
        }

        Ok(key.to_owned())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}

/// Pull a human-readable message out of a platform error response.
///
/// The platform reports errors as JSON, but the field name varies by
/// subsystem, so each known field is tried in turn before falling back to
/// the raw body or the status code.
async fn read_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    extract_error_message(status, &body)
}

fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<Value>(body) {
        for field in ["message", "msg", "error_description", "error"] {
            if let Some(message) = payload.get(field).and_then(Value::as_str) {
                return message.to_owned();
            }
        }
    }

    if body.trim().is_empty() {
        format!("the data platform responded with status {status}")
    } else {
        body.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::platform::{ObjectStore, http::extract_error_message};

    use super::HttpPlatformClient;

    #[test]
    fn public_url_joins_base_bucket_and_path() {
        let client = HttpPlatformClient::new("https://platform.example.com/", "secret");

        let url = client.public_url("receipts", "receipt-1700000000000.png");

        assert_eq!(
            url,
            "https://platform.example.com/storage/v1/object/public/receipts/receipt-1700000000000.png"
        );
    }

    #[test]
    fn extracts_message_field_from_json_error_body() {
        let message = extract_error_message(
            StatusCode::NOT_FOUND,
            r#"{"statusCode":"404","message":"Bucket not found"}"#,
        );

        assert_eq!(message, "Bucket not found");
    }

    #[test]
    fn extracts_auth_error_description() {
        let message = extract_error_message(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );

        assert_eq!(message, "Invalid login credentials");
    }

    #[test]
    fn falls_back_to_raw_body_then_status() {
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, "upstream unavailable"),
            "upstream unavailable"
        );
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, ""),
            "the data platform responded with status 502 Bad Gateway"
        );
    }
}
