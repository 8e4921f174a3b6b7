//! Session management middleware for tower applications.
//!
//! This module provides [`SessionLayer`] for integrating
//! session management into tower applications.

use http::{Request, Response};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tower::{Layer, Service};
use tower_cookies::{Cookie, Cookies};

use crate::store::SessionStore;
use crate::{CookieOptions, Id, Inner};

/// A Tower Middleware to use `Session`.
#[derive(Debug)]
pub struct SessionService<S, T: SessionStore> {
    inner: S,
    cookie_options: Option<CookieOptions>,
    store: Arc<T>,
}

impl<S: Clone, T: SessionStore> Clone for SessionService<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cookie_options: self.cookie_options,
            store: Arc::clone(&self.store),
        }
    }
}

impl<ReqBody, ResBody, S, T> Service<Request<ReqBody>> for SessionService<S, T>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    T: SessionStore,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future, T>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let cookies = req.extensions().get::<Cookies>().cloned();

        let session_id = match (self.cookie_options.as_ref(), cookies.as_ref()) {
            (Some(cookie_options), Some(cookies)) => cookies
                .get(cookie_options.name)
                .map(Cookie::into_owned)
                .and_then(|cookie| {
                    cookie
                        .value()
                        .parse::<Id>()
                        .map_err(|err| {
                            tracing::warn!(
                                err = %err,
                                "possibly suspicious activity: malformed session id"
                            )
                        })
                        .ok()
                }),
            _ => None,
        };

        let inner_session =
            Inner::new(Arc::clone(&self.store), self.cookie_options).with_id(session_id);
        *inner_session.cookies.lock() = cookies;

        let inner_session = Arc::new(inner_session);
        req.extensions_mut().insert(Arc::clone(&inner_session));

        ResponseFuture {
            future: self.inner.call(req),
            inner_session,
        }
    }
}

/// Layer to apply [`SessionService`] middleware.
///
/// The [`CookieManagerLayer`](tower_cookies::CookieManagerLayer) must wrap this
/// layer so the cookie jar is available when a request comes in.
///
/// # Example
///
/// ```rust
/// use ruts_kv::{CookieOptions, SessionLayer};
/// use ruts_kv::client::memory::MemoryClient;
/// use ruts_kv::store::{RiakStore, RiakStoreOptions};
/// use std::sync::Arc;
///
/// let cookie_options = CookieOptions::build()
///         .name("test_sess")
///         .http_only(true)
///         .same_site(cookie::SameSite::Lax)
///         .secure(true)
///         .max_age(60)
///         .path("/");
///
/// let store: RiakStore<MemoryClient> =
///     RiakStore::new(RiakStoreOptions::new("sessions")).unwrap();
/// let session_layer = SessionLayer::new(Arc::new(store))
///     .with_cookie_options(cookie_options);
/// ```
#[derive(Debug)]
pub struct SessionLayer<T: SessionStore> {
    cookie_options: Option<CookieOptions>,
    store: Arc<T>,
}

impl<T: SessionStore> Clone for SessionLayer<T> {
    fn clone(&self) -> Self {
        Self {
            cookie_options: self.cookie_options,
            store: Arc::clone(&self.store),
        }
    }
}

impl<T> SessionLayer<T>
where
    T: SessionStore,
{
    /// Create a new session manager layer.
    pub fn new(store: Arc<T>) -> Self {
        Self {
            cookie_options: None,
            store,
        }
    }

    /// Set the cookie options for the session manager.
    pub fn with_cookie_options(mut self, options: CookieOptions) -> Self {
        self.cookie_options = Some(options);
        self
    }
}

impl<S, T> Layer<S> for SessionLayer<T>
where
    T: SessionStore,
{
    type Service = SessionService<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService {
            inner,
            cookie_options: self.cookie_options,
            store: Arc::clone(&self.store),
        }
    }
}

pin_project! {
    /// Response future for [`SessionService`].
    #[derive(Debug)]
    pub struct ResponseFuture<F, T: SessionStore> {
        #[pin]
        future: F,
        inner_session: Arc<Inner<T>>,
    }
}

impl<F, Body, E, T> Future for ResponseFuture<F, T>
where
    F: Future<Output = Result<Response<Body>, E>>,
    T: SessionStore,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let res = ready!(this.future.poll(cx)?);

        let session = this.inner_session;
        if let (Some(cookie_options), Some(cookies)) =
            (session.cookie_options.as_ref(), session.get_cookies())
        {
            if session.is_deleted() {
                cookies.remove(cookie_options.removal_cookie());
            } else if session.is_changed() {
                if let Some(id) = *session.id.read() {
                    cookies.add(cookie_options.session_cookie(id.to_string()));
                }
            }
        }

        Poll::Ready(Ok(res))
    }
}
