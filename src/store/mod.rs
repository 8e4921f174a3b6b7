mod options;
mod riak;

pub use options::*;
pub use riak::*;

use crate::client::{ClientError, Content};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;

/// Session payload as seen by the [`Session`](crate::Session) handle.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Encoding failed with: {0}")]
    Encode(String),

    #[error("Decoding failed with: {0}")]
    Decode(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// The operations a session framework needs from its backend.
pub trait SessionStore: Send + Sync + 'static {
    /// Loads the session stored at `session_id`.
    ///
    /// Returns `None` when nothing is stored there.
    fn get<T>(&self, session_id: &str) -> impl Future<Output = Result<Option<T>, Error>> + Send
    where
        T: DeserializeOwned + Send;

    /// Stores `session` at `session_id`, replacing any previous value.
    fn set<T>(
        &self,
        session_id: &str,
        session: &T,
    ) -> impl Future<Output = Result<(), Error>> + Send
    where
        T: Serialize + Sync;

    /// Removes the session stored at `session_id`. Removing a session that
    /// does not exist succeeds.
    fn destroy(&self, session_id: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

pub(crate) fn serialize_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))
}

/// Decodes stored content.
///
/// JSON content is parsed. Anything else is handed over as a string so that
/// values written by other applications come back unmodified.
pub(crate) fn deserialize_content<T: DeserializeOwned>(content: Content) -> Result<T, Error> {
    if content.is_json() {
        return serde_json::from_slice(&content.value).map_err(|e| Error::Decode(e.to_string()));
    }

    let raw = String::from_utf8(content.value).map_err(|e| {
        Error::Decode(format!(
            "{} value is not valid UTF-8: {e}",
            content.content_type
        ))
    })?;

    serde_json::from_value(serde_json::Value::String(raw)).map_err(|e| Error::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_json_content() {
        let content = Content::json(r#"{"cat":true}"#);
        let value: serde_json::Value = deserialize_content(content).unwrap();
        assert_eq!(value, json!({ "cat": true }));
    }

    #[test]
    fn test_deserialize_passes_other_content_through() {
        let content = Content::new("text/plain", "hello");
        let value: String = deserialize_content(content).unwrap();
        assert_eq!(value, "hello");
    }

    #[test]
    fn test_deserialize_rejects_invalid_json() {
        let content = Content::json("{not json");
        let err = deserialize_content::<serde_json::Value>(content).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_deserialize_rejects_non_utf8_raw_value() {
        let content = Content::new("application/octet-stream", vec![0xff, 0xfe]);
        let err = deserialize_content::<String>(content).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_serialize_value() {
        let bytes = serialize_value(&json!({ "cat": true })).unwrap();
        assert_eq!(bytes, br#"{"cat":true}"#);
    }
}
