//! Session management for web applications.

use std::result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::{Serialize, de::DeserializeOwned};
use tower_cookies::Cookies;

mod cookie_options;
mod id;

use crate::store;
use crate::store::{SessionData, SessionStore};
pub use cookie_options::*;
pub use id::Id;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] store::Error),

    #[error("session has not been initialized")]
    UnInitialized,
}

type Result<T> = result::Result<T, Error>;

/// A per-request handle on the session stored in `S`.
///
/// Every call goes to the store: reads load the whole record, writes replace
/// it. A handle without an id reads as an empty session.
#[derive(Debug)]
pub struct Session<S: SessionStore> {
    inner: Arc<Inner<S>>,
}

impl<S> Session<S>
where
    S: SessionStore,
{
    /// Creates a new `Session` instance.
    pub fn new(inner: Arc<Inner<S>>) -> Self {
        Self { inner }
    }

    /// Returns the session ID, if it exists.
    pub fn id(&self) -> Option<Id> {
        *self.inner.id.read()
    }

    /// Retrieves a single field from the session.
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum::{Router, routing::get};
    /// use ruts_kv::Session;
    /// use ruts_kv::client::memory::MemoryClient;
    /// use ruts_kv::store::RiakStore;
    ///
    /// let _: Router<()> = Router::new()
    ///     .route("/get", get(|session: Session<RiakStore<MemoryClient>>| async move {
    ///         let name: Option<String> = session.get("name").await.unwrap();
    ///     }));
    /// ```
    #[tracing::instrument(name = "getting field from session", skip(self))]
    pub async fn get<T>(&self, field: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(mut data) = self.get_all().await? else {
            return Ok(None);
        };

        match data.remove(field) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| Error::Store(store::Error::Decode(err.to_string()))),
            None => Ok(None),
        }
    }

    /// Retrieves the whole session.
    #[tracing::instrument(name = "getting session", skip(self))]
    pub async fn get_all(&self) -> Result<Option<SessionData>> {
        match self.id() {
            Some(id) => self
                .inner
                .store
                .get::<SessionData>(&id.to_string())
                .await
                .map_err(|err| {
                    tracing::error!(err = %err, "failed to get session from store");
                    err.into()
                }),
            None => {
                tracing::debug!("session not initialized");
                Ok(None)
            }
        }
    }

    /// Sets `field` to `value` and saves the session, creating it (and its id)
    /// if needed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum::{Router, routing::get};
    /// use ruts_kv::Session;
    /// use ruts_kv::client::memory::MemoryClient;
    /// use ruts_kv::store::RiakStore;
    ///
    /// let _: Router<()> = Router::new()
    ///     .route("/set", get(|session: Session<RiakStore<MemoryClient>>| async move {
    ///         session.insert("cat", &true).await.unwrap();
    ///     }));
    /// ```
    #[tracing::instrument(name = "inserting field into session", skip(self, value))]
    pub async fn insert<T>(&self, field: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)
            .map_err(|err| store::Error::Encode(err.to_string()))?;

        let mut data = self.get_all().await?.unwrap_or_default();
        data.insert(field.to_owned(), value);

        let id = self.id_or_gen();
        self.save(&id, &data).await?;
        self.changed();

        Ok(())
    }

    /// Removes `field` from the session. The session is destroyed once its
    /// last field is gone.
    ///
    /// Returns `true` if the field existed.
    #[tracing::instrument(name = "removing field from session", skip(self))]
    pub async fn remove(&self, field: &str) -> Result<bool> {
        let Some(id) = self.id() else {
            tracing::error!("the session has not been initialized");
            return Err(Error::UnInitialized);
        };

        let Some(mut data) = self.get_all().await? else {
            return Ok(false);
        };

        if data.remove(field).is_none() {
            return Ok(false);
        }

        if data.is_empty() {
            self.destroy(&id).await?;
            self.deleted();
        } else {
            self.save(&id, &data).await?;
            self.changed();
        }

        Ok(true)
    }

    /// Deletes the entire session from the store.
    #[tracing::instrument(name = "deleting session", skip(self))]
    pub async fn delete(&self) -> Result<()> {
        let Some(id) = self.id() else {
            tracing::error!("the session has not been initialized");
            return Err(Error::UnInitialized);
        };

        self.destroy(&id).await?;
        self.deleted();

        Ok(())
    }

    /// Moves the session to a new ID, e.g. after a change in privilege level.
    ///
    /// The record is written under the new ID before the old one is destroyed.
    /// Returns the new ID, or `None` if there was no stored session to move.
    #[tracing::instrument(name = "regenerating the session id", skip(self))]
    pub async fn regenerate(&self) -> Result<Option<Id>> {
        let Some(old_id) = self.id() else {
            tracing::error!("the session has not been initialized");
            return Err(Error::UnInitialized);
        };

        let Some(data) = self.get_all().await? else {
            return Ok(None);
        };

        let new_id = Id::new();
        self.save(&new_id, &data).await?;
        self.destroy(&old_id).await?;

        *self.inner.id.write() = Some(new_id);
        self.changed();

        Ok(Some(new_id))
    }

    async fn save(&self, id: &Id, data: &SessionData) -> Result<()> {
        self.inner
            .store
            .set(&id.to_string(), data)
            .await
            .map_err(|err| {
                tracing::error!(err = %err, "failed to save session to store");
                err.into()
            })
    }

    async fn destroy(&self, id: &Id) -> Result<()> {
        self.inner
            .store
            .destroy(&id.to_string())
            .await
            .map_err(|err| {
                tracing::error!(err = %err, "failed to destroy session in store");
                err.into()
            })
    }

    fn changed(&self) {
        self.inner.deleted.store(false, Ordering::Relaxed);
        self.inner.changed.store(true, Ordering::Relaxed);
    }

    fn deleted(&self) {
        self.inner.changed.store(false, Ordering::Relaxed);
        self.inner.deleted.store(true, Ordering::Relaxed);
        *self.inner.id.write() = None;
    }

    fn id_or_gen(&self) -> Id {
        *self.inner.id.write().get_or_insert_with(Id::new)
    }
}

/// State shared between a [`Session`] handle and the middleware for one request.
#[derive(Debug)]
pub struct Inner<S: SessionStore> {
    pub id: RwLock<Option<Id>>,
    // set when the session is written
    pub changed: AtomicBool,
    // set when the session is destroyed
    pub deleted: AtomicBool,
    pub cookie_options: Option<CookieOptions>,
    pub cookies: Mutex<Option<Cookies>>,
    pub store: Arc<S>,
}

impl<S: SessionStore> Inner<S> {
    pub fn new(store: Arc<S>, cookie_options: Option<CookieOptions>) -> Self {
        Self {
            id: RwLock::new(None),
            changed: AtomicBool::new(false),
            deleted: AtomicBool::new(false),
            cookie_options,
            cookies: Mutex::new(None),
            store,
        }
    }

    pub fn with_id(self, id: Option<Id>) -> Self {
        *self.id.write() = id;
        self
    }

    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Relaxed)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Relaxed)
    }

    pub fn get_cookies(&self) -> Option<Cookies> {
        self.cookies.lock().clone()
    }
}
