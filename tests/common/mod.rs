#![allow(dead_code)]

use parking_lot::Mutex;
use ruts_kv::CookieOptions;
use ruts_kv::client::memory::MemoryClient;
use ruts_kv::client::{ClientError, Connect, Content, KeyValueClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TestUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TestSession {
    pub user: TestUser,
    pub preferences: TestPreferences,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TestPreferences {
    pub theme: String,
    pub language: String,
}

pub fn create_test_session() -> TestSession {
    TestSession {
        user: TestUser {
            id: 1,
            name: "Test User".to_string(),
        },
        preferences: TestPreferences {
            theme: "dark".to_string(),
            language: "en".to_string(),
        },
    }
}

pub fn build_cookie_options() -> CookieOptions {
    CookieOptions::build()
        .name("test_sess")
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .secure(true)
        .max_age(15)
        .path("/")
}

/// Connection parameters for [`MockClient`]. Counts how often a client is
/// created from them.
#[derive(Clone, Debug, Default)]
pub struct MockConnection {
    pub host: String,
    pub connects: Arc<AtomicUsize>,
}

impl MockConnection {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

/// A [`MemoryClient`] that can be told to fail its next call.
#[derive(Debug, Default)]
pub struct MockClient {
    pub storage: MemoryClient,
    pub host: Option<String>,
    next_error: Mutex<Option<ClientError>>,
    calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next call fails with `error`; later calls succeed again.
    pub fn fail_next(&self, error: ClientError) {
        *self.next_error.lock() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn take_error(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl KeyValueClient for MockClient {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<Content>, ClientError> {
        self.take_error()?;
        self.storage.get(bucket, key).await
    }

    async fn put(&self, bucket: &str, key: &str, content: Content) -> Result<(), ClientError> {
        self.take_error()?;
        self.storage.put(bucket, key, content).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        self.take_error()?;
        self.storage.delete(bucket, key).await
    }
}

impl Connect for MockClient {
    type Connection = MockConnection;

    fn connect(connection: MockConnection) -> Result<Self, ClientError> {
        connection.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            host: Some(connection.host),
            ..Self::default()
        })
    }
}
