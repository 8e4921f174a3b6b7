//! The key-value client a [`RiakStore`](crate::store::RiakStore) talks to.
//!
//! A client addresses values by `bucket` and `key` and stores each value
//! together with its content type. Three implementations ship with the crate:
//!
//! - [`MemoryClient`](memory::MemoryClient): in-process, for development and tests.
//! - [`HttpClient`](http::HttpClient): the Riak HTTP API (`http-client` feature).
//! - [`RedisClient`](redis::RedisClient): Redis hashes through `fred` (`redis-client` feature).

#[cfg(feature = "http-client")]
pub mod http;
pub mod memory;
#[cfg(feature = "redis-client")]
pub mod redis;

use std::future::Future;

/// Content type under which session payloads are written.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type reported for values stored without one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Backend(String),

    #[error("invalid connection parameters: {0}")]
    Connection(String),

    #[error("unexpected status {status} for {bucket}/{key}")]
    Status {
        status: u16,
        bucket: String,
        key: String,
    },

    #[cfg(feature = "http-client")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "redis-client")]
    #[error(transparent)]
    Redis(#[from] fred::error::Error),
}

/// A stored value and the content type it was written with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    pub content_type: String,
    pub value: Vec<u8>,
}

impl Content {
    pub fn new(content_type: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            value: value.into(),
        }
    }

    /// Creates `application/json` content from already encoded JSON text.
    pub fn json(value: impl Into<Vec<u8>>) -> Self {
        Self::new(JSON_CONTENT_TYPE, value)
    }

    /// Returns `true` if the media type is `application/json`, ignoring
    /// parameters such as `charset`.
    pub fn is_json(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
            .unwrap_or(false)
    }
}

/// Asynchronous access to a bucket/key store.
///
/// Implementations are shared by every operation of a store and must tolerate
/// concurrent calls. Timeouts, pooling and retries, if any, belong here and not
/// in the session store.
pub trait KeyValueClient: Send + Sync + 'static {
    /// Fetches the value at `bucket`/`key`.
    ///
    /// An empty `Vec` means the key holds no value. Stores that keep siblings
    /// may return more than one entry.
    fn get(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<Content>, ClientError>> + Send;

    /// Writes `content` at `bucket`/`key`, replacing whatever was there.
    fn put(
        &self,
        bucket: &str,
        key: &str,
        content: Content,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Deletes the value at `bucket`/`key`. Deleting a missing key succeeds.
    fn delete(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Creates a client from connection parameters.
pub trait Connect: KeyValueClient + Sized {
    /// Parameters handed to [`Connect::connect`]. The default value is used
    /// when a store is configured without any.
    type Connection: Default + Send;

    fn connect(connection: Self::Connection) -> Result<Self, ClientError>;
}
