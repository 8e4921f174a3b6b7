use crate::client::{ClientError, Connect, Content, DEFAULT_CONTENT_TYPE, KeyValueClient};
use fred::clients::Client;
use fred::interfaces::{ClientLike, HashesInterface, KeysInterface};
use fred::types::config::Config;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

const CONTENT_TYPE_FIELD: &str = "content_type";
const VALUE_FIELD: &str = "value";

/// Connection parameters for [`RedisClient`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RedisConnection {
    pub url: String,
}

impl Default for RedisConnection {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// A key-value client backed by Redis.
///
/// Each `bucket`/`key` pair is stored as the Redis hash `{bucket}:{key}` with a
/// `content_type` and a `value` field.
#[derive(Clone, Debug)]
pub struct RedisClient<C: HashesInterface + KeysInterface + Clone + Send + Sync = Client> {
    client: Arc<C>,
}

impl<C> RedisClient<C>
where
    C: HashesInterface + KeysInterface + Clone + Send + Sync,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

fn redis_key(bucket: &str, key: &str) -> String {
    format!("{bucket}:{key}")
}

impl<C> KeyValueClient for RedisClient<C>
where
    C: HashesInterface + KeysInterface + Clone + Send + Sync + 'static,
{
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<Content>, ClientError> {
        let fields = self
            .client
            .hgetall::<Option<HashMap<String, Vec<u8>>>, _>(redis_key(bucket, key))
            .await?;

        let Some(mut fields) = fields else {
            return Ok(Vec::new());
        };
        let Some(value) = fields.remove(VALUE_FIELD) else {
            return Ok(Vec::new());
        };

        let content_type = fields
            .remove(CONTENT_TYPE_FIELD)
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());

        Ok(vec![Content::new(content_type, value)])
    }

    async fn put(&self, bucket: &str, key: &str, content: Content) -> Result<(), ClientError> {
        let mut fields: HashMap<&str, Vec<u8>> = HashMap::with_capacity(2);
        fields.insert(CONTENT_TYPE_FIELD, content.content_type.into_bytes());
        fields.insert(VALUE_FIELD, content.value);

        let _: i64 = self.client.hset(redis_key(bucket, key), fields).await?;

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        let _: i64 = self.client.del(redis_key(bucket, key)).await?;

        Ok(())
    }
}

impl Connect for RedisClient<Client> {
    type Connection = RedisConnection;

    /// Builds a client and starts connecting in the background.
    ///
    /// Must be called from within a Tokio runtime. Failures to reach the
    /// server are logged as they happen and returned by the first command.
    fn connect(connection: RedisConnection) -> Result<Self, ClientError> {
        let config = Config::from_url(&connection.url)?;
        let client = Client::new(config, None, None, None);
        watch_connection(&client);

        Ok(Self::new(Arc::new(client)))
    }
}

/// Starts the connection task and logs why it stopped.
fn watch_connection(client: &Client) -> JoinHandle<()> {
    let connection = client.connect();

    tokio::spawn(async move {
        match connection.await {
            Ok(Ok(())) => tracing::debug!("redis connection closed"),
            Ok(Err(err)) => tracing::error!(err = %err, "redis connection failed"),
            Err(err) => tracing::error!(err = %err, "redis connection task failed"),
        }
    })
}
