use std::sync::Arc;

use axum_core::extract::FromRequestParts;
use http::{StatusCode, request::Parts};

use crate::store::SessionStore;
use crate::{Inner, Session};

/// Axum Extractor for [`Session`].
impl<S, T> FromRequestParts<S> for Session<T>
where
    S: Sync + Send,
    T: SessionStore,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let inner_session = parts
            .extensions
            .get::<Arc<Inner<T>>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("session layer not found in the request extensions");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "session not found in the request",
                )
            })?;

        // The cookie jar is captured by the layer; without it the session id
        // can neither be read nor sent back.
        if inner_session.cookie_options.is_none() {
            tracing::error!("missing cookie options");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "missing cookie options"));
        }

        if inner_session.get_cookies().is_none() {
            tracing::error!("cookies not found in the request extensions");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "cookies not found in the request",
            ));
        }

        Ok(Session::new(inner_session))
    }
}
