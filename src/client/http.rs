//! A client for the Riak HTTP API.
//!
//! Values live at `{url}/buckets/{bucket}/keys/{key}`; bucket and key are
//! percent-encoded as path segments. Keys with siblings (`allow_mult`) answer
//! `300 Multiple Choices` with a list of vtags; each sibling is then fetched
//! with `?vtag=`.

use crate::client::{ClientError, Connect, Content, DEFAULT_CONTENT_TYPE, KeyValueClient};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Connection parameters for [`HttpClient`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HttpConnection {
    /// Base URL of the Riak HTTP interface.
    pub url: String,
    /// Per-request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConnection {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8098".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    /// Wraps an existing `reqwest` client.
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::Connection(format!("{base_url}: {err}")))?;

        if base_url.cannot_be_a_base() {
            return Err(ClientError::Connection(format!(
                "{base_url} cannot be used as a base url"
            )));
        }

        Ok(Self { client, base_url })
    }

    fn key_url(&self, bucket: &str, key: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Connection(format!(
                    "{} cannot be used as a base url",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["buckets", bucket, "keys", key]);

        Ok(url)
    }

    /// Fetches every sibling named in `listing`, in the order listed.
    ///
    /// A sibling that disappears in between (resolved by another writer) is
    /// skipped.
    async fn get_siblings(
        &self,
        bucket: &str,
        key: &str,
        listing: &str,
    ) -> Result<Vec<Content>, ClientError> {
        let mut siblings = Vec::new();

        for vtag in sibling_vtags(listing) {
            let mut url = self.key_url(bucket, key)?;
            url.query_pairs_mut().append_pair("vtag", vtag);

            let response = self.client.get(url).send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => continue,
                status if status.is_success() => siblings.push(read_content(response).await?),
                status => return Err(unexpected(status, bucket, key)),
            }
        }

        Ok(siblings)
    }
}

/// Reads a successful response into [`Content`].
async fn read_content(response: Response) -> Result<Content, ClientError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_owned();
    let value = response.bytes().await?;

    Ok(Content::new(content_type, value.to_vec()))
}

/// Vtags listed in a `300 Multiple Choices` body:
///
/// ```text
/// Siblings:
/// 4v5xOg4bVwUYZdMkqf0d6I
/// 6nr5bCSRTSxaEO9VkJwiOJ
/// ```
fn sibling_vtags(listing: &str) -> impl Iterator<Item = &str> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
}

fn unexpected(status: StatusCode, bucket: &str, key: &str) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        bucket: bucket.to_owned(),
        key: key.to_owned(),
    }
}

impl KeyValueClient for HttpClient {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<Content>, ClientError> {
        let url = self.key_url(bucket, key)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            StatusCode::MULTIPLE_CHOICES => {
                let listing = response.text().await?;
                self.get_siblings(bucket, key, &listing).await
            }
            status if status.is_success() => Ok(vec![read_content(response).await?]),
            status => Err(unexpected(status, bucket, key)),
        }
    }

    async fn put(&self, bucket: &str, key: &str, content: Content) -> Result<(), ClientError> {
        let url = self.key_url(bucket, key)?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content.content_type)
            .body(content.value)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(unexpected(response.status(), bucket, key))
        }
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        let url = self.key_url(bucket, key)?;
        let response = self.client.delete(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            status => Err(unexpected(status, bucket, key)),
        }
    }
}

impl Connect for HttpClient {
    type Connection = HttpConnection;

    fn connect(connection: HttpConnection) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = connection.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Self::new(builder.build()?, &connection.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_url_encodes_segments() {
        let client = HttpClient::new(reqwest::Client::new(), "http://localhost:8098/riak/").unwrap();
        let url = client.key_url("my bucket", "a/b").unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8098/riak/buckets/my%20bucket/keys/a%2Fb"
        );
    }

    #[test]
    fn test_sibling_vtags() {
        let listing = "Siblings:\n4v5xOg4bVwUYZdMkqf0d6I\n6nr5bCSRTSxaEO9VkJwiOJ\n";
        let vtags: Vec<&str> = sibling_vtags(listing).collect();

        assert_eq!(vtags, ["4v5xOg4bVwUYZdMkqf0d6I", "6nr5bCSRTSxaEO9VkJwiOJ"]);
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpClient::new(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));

        let err = HttpClient::new(reqwest::Client::new(), "mailto:riak@example.com").unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[test]
    fn test_connection_defaults() {
        let connection: HttpConnection = serde_json::from_str("{}").unwrap();
        assert_eq!(connection.url, "http://127.0.0.1:8098");
        assert!(connection.timeout_secs.is_none());
    }
}
