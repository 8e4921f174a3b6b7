use crate::client::Connect;
use crate::store::Error;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

const INVALID_BUCKET: &str = "`bucket` should be a non-empty string";

/// Where a store gets its client from. Resolved once, when the store is built.
pub enum ClientSource<C: Connect> {
    /// A client owned by the caller and shared with the store.
    Provided(Arc<C>),
    /// Parameters for [`Connect::connect`]; the store owns the resulting client.
    Connection(C::Connection),
}

impl<C: Connect> fmt::Debug for ClientSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientSource::Provided(_) => f.write_str("Provided"),
            ClientSource::Connection(_) => f.write_str("Connection"),
        }
    }
}

/// Options for building a [`RiakStore`](crate::store::RiakStore).
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ruts_kv::client::memory::MemoryClient;
/// use ruts_kv::store::{RiakStore, RiakStoreOptions};
///
/// let client = Arc::new(MemoryClient::new());
/// let store = RiakStore::new(RiakStoreOptions::new("sessions").client(client)).unwrap();
/// assert_eq!(store.bucket(), "sessions");
/// ```
pub struct RiakStoreOptions<C: Connect> {
    pub(crate) bucket: String,
    client: Option<Arc<C>>,
    connection: Option<C::Connection>,
}

impl<C: Connect> RiakStoreOptions<C> {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            client: None,
            connection: None,
        }
    }

    /// Uses an existing client. Takes precedence over [`connection`](Self::connection).
    pub fn client(mut self, client: Arc<C>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the parameters a new client is created from.
    pub fn connection(mut self, connection: C::Connection) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Reads options from a configuration document.
    ///
    /// `bucket` must be a non-empty string. `connection`, when present, is
    /// deserialized into the client's connection parameters. Other keys are
    /// ignored.
    ///
    /// ```rust
    /// use ruts_kv::client::memory::MemoryClient;
    /// use ruts_kv::store::RiakStoreOptions;
    ///
    /// let options = RiakStoreOptions::<MemoryClient>::from_json(serde_json::json!({ "bucket": {} }));
    /// assert!(options.is_err());
    /// ```
    pub fn from_json(value: serde_json::Value) -> Result<Self, Error>
    where
        C::Connection: DeserializeOwned,
    {
        let serde_json::Value::Object(mut map) = value else {
            return Err(Error::InvalidArgument(
                "store options should be an object".to_string(),
            ));
        };

        let bucket = match map.remove("bucket") {
            Some(serde_json::Value::String(bucket)) => bucket,
            _ => return Err(Error::InvalidArgument(INVALID_BUCKET.to_string())),
        };

        let connection = map
            .remove("connection")
            .filter(|connection| !connection.is_null())
            .map(serde_json::from_value::<C::Connection>)
            .transpose()
            .map_err(|err| Error::InvalidArgument(format!("invalid `connection`: {err}")))?;

        Ok(Self {
            bucket,
            client: None,
            connection,
        })
    }

    /// Validates the bucket and decides where the client comes from.
    pub(crate) fn resolve(self) -> Result<(String, ClientSource<C>), Error> {
        if self.bucket.is_empty() {
            return Err(Error::InvalidArgument(INVALID_BUCKET.to_string()));
        }

        let source = match (self.client, self.connection) {
            (Some(client), connection) => {
                if connection.is_some() {
                    tracing::debug!("client provided, ignoring connection parameters");
                }
                ClientSource::Provided(client)
            }
            (None, Some(connection)) => ClientSource::Connection(connection),
            (None, None) => ClientSource::Connection(C::Connection::default()),
        };

        Ok((self.bucket, source))
    }
}

impl<C: Connect> fmt::Debug for RiakStoreOptions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiakStoreOptions")
            .field("bucket", &self.bucket)
            .field("client", &self.client.is_some())
            .field("connection", &self.connection.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{MemoryClient, MemoryConnection};
    use serde_json::json;

    #[test]
    fn test_empty_bucket_is_rejected() {
        let err = RiakStoreOptions::<MemoryClient>::new("").resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(err.to_string(), "`bucket` should be a non-empty string");
    }

    #[test]
    fn test_provided_client_wins_over_connection() {
        let client = Arc::new(MemoryClient::new());
        let (bucket, source) = RiakStoreOptions::new("foo")
            .connection(MemoryConnection::default())
            .client(Arc::clone(&client))
            .resolve()
            .unwrap();

        assert_eq!(bucket, "foo");
        match source {
            ClientSource::Provided(provided) => assert!(Arc::ptr_eq(&provided, &client)),
            ClientSource::Connection(_) => panic!("expected the provided client"),
        }
    }

    #[test]
    fn test_missing_connection_uses_default() {
        let (_, source) = RiakStoreOptions::<MemoryClient>::new("foo").resolve().unwrap();
        assert!(matches!(source, ClientSource::Connection(MemoryConnection {})));
    }

    #[test]
    fn test_from_json_rejects_non_string_bucket() {
        for value in [
            json!({ "bucket": {} }),
            json!({ "bucket": "" }),
            json!({ "bucket": 42 }),
            json!({ "bucket": null }),
            json!({}),
        ] {
            let err = RiakStoreOptions::<MemoryClient>::from_json(value)
                .and_then(RiakStoreOptions::resolve)
                .unwrap_err();
            assert_eq!(err.to_string(), "`bucket` should be a non-empty string");
        }
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = RiakStoreOptions::<MemoryClient>::from_json(json!("foo")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_from_json_ignores_framework_options() {
        let options = RiakStoreOptions::<MemoryClient>::from_json(json!({
            "bucket": "foo",
            "connection": null,
            "cookie": { "max_age": 3600 },
        }))
        .unwrap();

        assert_eq!(options.bucket, "foo");
    }

    #[test]
    fn test_from_json_accepts_empty_connection() {
        let options = RiakStoreOptions::<MemoryClient>::from_json(json!({
            "bucket": "foo",
            "connection": {},
        }))
        .unwrap();

        assert!(options.connection.is_some());
    }
}
