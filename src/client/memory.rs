use crate::client::{ClientError, Connect, Content, KeyValueClient};
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Connection parameters for [`MemoryClient`].
///
/// There is nothing to connect to; any fields given are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MemoryConnection {}

/// An in-memory key-value client.
///
/// Values are kept per bucket in a [`DashMap`] and returned exactly as they
/// were written.
///
/// ### Note
///
/// Do not use this in a production environment.
#[derive(Debug, Default)]
pub struct MemoryClient {
    buckets: DashMap<String, HashMap<String, Content>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Returns `true` if `bucket` holds a value at `key`.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .get(bucket)
            .map(|keys| keys.contains_key(key))
            .unwrap_or(false)
    }

    /// Number of keys stored in `bucket`.
    pub fn len(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket) == 0
    }
}

impl KeyValueClient for MemoryClient {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<Content>, ClientError> {
        let content = self
            .buckets
            .get(bucket)
            .and_then(|keys| keys.get(key).cloned());

        Ok(content.into_iter().collect())
    }

    async fn put(&self, bucket: &str, key: &str, content: Content) -> Result<(), ClientError> {
        self.buckets
            .entry(bucket.to_owned())
            .or_default()
            .insert(key.to_owned(), content);

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        if let Some(mut keys) = self.buckets.get_mut(bucket) {
            keys.remove(key);
        }

        Ok(())
    }
}

impl Connect for MemoryClient {
    type Connection = MemoryConnection;

    fn connect(_connection: MemoryConnection) -> Result<Self, ClientError> {
        Ok(Self::new())
    }
}
