//! In-memory fakes for the data platform seams, shared across endpoint tests.

use std::sync::{
    Mutex,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    Error,
    platform::{Authenticator, ObjectStore, RecordStore, Session},
};

/// A [RecordStore] that keeps rows in memory and stamps ids and creation
/// timestamps the way the platform would.
#[derive(Debug, Default)]
pub struct FakeRecordStore {
    /// Stored rows as (collection, row) pairs, in insertion order.
    pub rows: Mutex<Vec<(String, Value)>>,
    next_id: AtomicI64,
}

impl FakeRecordStore {
    /// The stored rows for `collection`, oldest first.
    pub fn rows_in(&self, collection: &str) -> Vec<Value> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == collection)
            .map(|(_, row)| row.clone())
            .collect()
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let mut stored = record;
        stored["id"] = Value::from(id);
        stored["created_at"] = Value::from("2024-05-01T09:30:00+00:00");

        self.rows
            .lock()
            .unwrap()
            .push((collection.to_owned(), stored.clone()));

        Ok(stored)
    }

    async fn query(&self, collection: &str, _filter: Option<&str>) -> Result<Vec<Value>, Error> {
        let mut rows = self.rows_in(collection);
        rows.reverse();
        Ok(rows)
    }
}

/// A [RecordStore] that fails every call with a platform error message.
pub struct FailingRecordStore {
    /// The upstream message every call fails with.
    pub message: String,
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn insert(&self, _collection: &str, _record: Value) -> Result<Value, Error> {
        Err(Error::Platform(self.message.clone()))
    }

    async fn query(&self, _collection: &str, _filter: Option<&str>) -> Result<Vec<Value>, Error> {
        Err(Error::Platform(self.message.clone()))
    }
}

/// One object captured by [FakeObjectStore].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// The bucket the object was stored in.
    pub bucket: String,
    /// The storage key the object was stored under.
    pub key: String,
    /// The declared content type.
    pub content_type: String,
    /// The uploaded bytes.
    pub bytes: Vec<u8>,
}

/// An [ObjectStore] that records uploads in memory.
#[derive(Debug, Default)]
pub struct FakeObjectStore {
    /// Every object stored so far, in upload order.
    pub objects: Mutex<Vec<StoredObject>>,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error> {
        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            content_type: content_type.to_owned(),
            bytes,
        });

        Ok(key.to_owned())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://fake.storage.test/{bucket}/{path}")
    }
}

/// An [ObjectStore] whose uploads always fail with a platform error message.
pub struct FailingObjectStore {
    /// The upstream message every upload fails with.
    pub message: String,
}

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn store_object(
        &self,
        _bucket: &str,
        _key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, Error> {
        Err(Error::Platform(self.message.clone()))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://fake.storage.test/{bucket}/{path}")
    }
}

/// An [Authenticator] that accepts exactly one email/password pair.
pub struct FakeAuthenticator {
    /// The accepted email.
    pub email: String,
    /// The accepted password.
    pub password: String,
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, Error> {
        if email == self.email && password == self.password {
            Ok(Session {
                access_token: "test-access-token".to_owned(),
                token_type: "bearer".to_owned(),
                expires_in: 3600,
                refresh_token: "test-refresh-token".to_owned(),
            })
        } else {
            Err(Error::InvalidCredentials(
                "Invalid login credentials".to_owned(),
            ))
        }
    }
}
