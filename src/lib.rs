//! # ruts-kv: key-value session storage for tower sessions
//!
//! `ruts-kv` stores sessions in a bucket of a Riak-style key-value store: every
//! session is a JSON document at `(bucket, session_id)`. The store speaks to the
//! backend through a small [`KeyValueClient`](client::KeyValueClient) trait, and
//! ships a tower middleware plus an axum extractor so handlers can work with a
//! [`Session`] directly.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use ruts_kv::{CookieOptions, Session, SessionLayer};
//! use ruts_kv::client::memory::MemoryClient;
//! use ruts_kv::store::{RiakStore, RiakStoreOptions};
//! use std::sync::Arc;
//! use tower_cookies::CookieManagerLayer;
//!
//! #[tokio::main]
//! async fn main() {
//!     // One store per bucket; the client is created once and reused.
//!     let store: RiakStore<MemoryClient> =
//!         RiakStore::new(RiakStoreOptions::new("sessions")).unwrap();
//!
//!     let cookie_options = CookieOptions::build()
//!         .name("session")
//!         .http_only(true)
//!         .same_site(cookie::SameSite::Lax)
//!         .secure(true)
//!         .max_age(3600)
//!         .path("/");
//!
//!     let session_layer = SessionLayer::new(Arc::new(store))
//!         .with_cookie_options(cookie_options);
//!
//!     let app = Router::new()
//!         .route("/", get(handler))
//!         .layer(session_layer)
//!         .layer(CookieManagerLayer::new()); // CookieManagerLayer must be after
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//!
//! async fn handler(session: Session<RiakStore<MemoryClient>>) -> String {
//!     let count: Option<i32> = session.get("count").await.unwrap();
//!     let new_count = count.unwrap_or(0) + 1;
//!     session.insert("count", &new_count).await.unwrap();
//!     format!("You've visited this page {} times", new_count)
//! }
//! ```
//!
//! # Clients
//!
//! A [`RiakStore`](store::RiakStore) either reuses a client you built or
//! creates one from connection parameters, exactly once:
//!
//! ```rust
//! use std::sync::Arc;
//! use ruts_kv::client::memory::MemoryClient;
//! use ruts_kv::store::{RiakStore, RiakStoreOptions};
//!
//! let shared = Arc::new(MemoryClient::new());
//! let store = RiakStore::new(RiakStoreOptions::new("sessions").client(Arc::clone(&shared))).unwrap();
//! assert!(Arc::ptr_eq(store.client(), &shared));
//! ```
//!
//! - `MemoryClient` - in-process, for development and tests.
//! - `HttpClient` - the Riak HTTP API. Requires the `http-client` feature.
//! - `RedisClient` - Redis hashes through `fred`. Requires the `redis-client` feature.
//!
//! # Store semantics
//!
//! - `get` of a missing session is `Ok(None)`, not an error.
//! - `set` replaces the stored document; the last write wins.
//! - `destroy` of a missing session succeeds.
//! - Client errors are returned unchanged inside [`store::Error::Client`];
//!   nothing is retried.
//!
//! # Important Notes
//!
//! ## Middleware Ordering
//! The `SessionLayer` must be applied **before** the `CookieManagerLayer`:
//!
//! ```rust,no_run
//! use axum::Router;
//! use ruts_kv::SessionLayer;
//! use ruts_kv::client::memory::MemoryClient;
//! use ruts_kv::store::{RiakStore, RiakStoreOptions};
//! use tower_cookies::CookieManagerLayer;
//! use std::sync::Arc;
//!
//! let store: RiakStore<MemoryClient> =
//!     RiakStore::new(RiakStoreOptions::new("sessions")).unwrap();
//! let app: Router<()> = Router::new();
//! let session_layer = SessionLayer::new(Arc::new(store));
//!
//! // Correct order
//! let router = app
//!     .layer(session_layer)
//!     .layer(CookieManagerLayer::new());
//! ```
//!
//! Sessions never expire in the store; `CookieOptions::max_age` only limits the
//! cookie.

pub use cookie;

pub mod client;

#[cfg(feature = "axum")]
mod extract;

mod service;
pub use service::*;

mod session;
pub use session::*;

pub mod store;

pub use tower_cookies;
