use crate::client::{Connect, Content, KeyValueClient};
use crate::store::{
    ClientSource, Error, RiakStoreOptions, SessionStore, deserialize_content, serialize_value,
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::sync::Arc;

/// A session store backed by a bucket of a key-value store.
///
/// Every session lives at `(bucket, session_id)` as `application/json` content.
/// Client errors are returned as they are: the store neither retries nor falls
/// back to a default value.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ruts_kv::client::memory::MemoryClient;
/// use ruts_kv::store::{RiakStore, RiakStoreOptions, SessionStore};
///
/// #[tokio::main]
/// async fn main() {
///     let store: RiakStore<MemoryClient> =
///         RiakStore::new(RiakStoreOptions::new("sessions")).unwrap();
///
///     store.set("bar", &serde_json::json!({ "cat": true })).await.unwrap();
///     let session: Option<serde_json::Value> = store.get("bar").await.unwrap();
///     assert_eq!(session, Some(serde_json::json!({ "cat": true })));
/// }
/// ```
pub struct RiakStore<C> {
    bucket: String,
    client: Arc<C>,
}

impl<C: Connect> RiakStore<C> {
    /// Builds a store from `options`.
    ///
    /// Fails with [`Error::InvalidArgument`] if the bucket is empty, and with
    /// [`Error::Client`] if a new client cannot be created. A provided client is
    /// used as is; otherwise exactly one client is created from the connection
    /// parameters.
    pub fn new(options: RiakStoreOptions<C>) -> Result<Self, Error> {
        let (bucket, source) = options.resolve().map_err(|err| {
            tracing::error!(err = %err, "invalid session store options");
            err
        })?;

        let client = match source {
            ClientSource::Provided(client) => client,
            ClientSource::Connection(connection) => {
                let client = C::connect(connection).map_err(|err| {
                    tracing::error!(err = %err, "failed to create key-value client");
                    Error::from(err)
                })?;
                Arc::new(client)
            }
        };

        tracing::debug!(bucket = %bucket, "session store ready");

        Ok(Self { bucket, client })
    }
}

impl<C> RiakStore<C> {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

impl<C: KeyValueClient> RiakStore<C> {
    /// Returns the content stored at `session_id` without decoding it.
    #[tracing::instrument(name = "getting raw session from store", skip(self))]
    pub async fn get_raw(&self, session_id: &str) -> Result<Option<Content>, Error> {
        let content = self
            .client
            .get(&self.bucket, session_id)
            .await
            .map_err(|err| {
                tracing::error!(err = %err, "failed to get session from store");
                err
            })?;

        Ok(content.into_iter().next())
    }
}

impl<C> Clone for RiakStore<C> {
    fn clone(&self) -> Self {
        Self {
            bucket: self.bucket.clone(),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> fmt::Debug for RiakStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiakStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl<C: KeyValueClient> SessionStore for RiakStore<C> {
    #[tracing::instrument(name = "getting session from store", skip(self))]
    async fn get<T>(&self, session_id: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let Some(content) = self.get_raw(session_id).await? else {
            tracing::debug!("no session stored");
            return Ok(None);
        };

        let session = deserialize_content(content).map_err(|err| {
            tracing::error!(err = %err, "failed to decode session");
            err
        })?;

        Ok(Some(session))
    }

    #[tracing::instrument(name = "saving session to store", skip(self, session))]
    async fn set<T>(&self, session_id: &str, session: &T) -> Result<(), Error>
    where
        T: Serialize + Sync,
    {
        let value = serialize_value(session).map_err(|err| {
            tracing::error!(err = %err, "failed to encode session");
            err
        })?;

        self.client
            .put(&self.bucket, session_id, Content::json(value))
            .await
            .map_err(|err| {
                tracing::error!(err = %err, "failed to save session to store");
                err.into()
            })
    }

    #[tracing::instrument(name = "destroying session in store", skip(self))]
    async fn destroy(&self, session_id: &str) -> Result<(), Error> {
        self.client
            .delete(&self.bucket, session_id)
            .await
            .map_err(|err| {
                tracing::error!(err = %err, "failed to destroy session in store");
                err.into()
            })
    }
}
