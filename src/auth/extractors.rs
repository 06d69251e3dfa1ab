use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::session::{flash_cookie, SessionKeys, SESSION_COOKIE};

/// Flash code left for the login page when a protected view bounces a visitor.
pub const LOGIN_REQUIRED: &str = "login_required";

/// Authentication state of the current browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(i64),
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Session::Anonymous);
        };

        match SessionKeys::from_ref(state).verify(cookie.value()) {
            Ok(user_id) => Ok(Session::Authenticated(user_id)),
            Err(e) => {
                debug!(error = %e, "session cookie rejected");
                Ok(Session::Anonymous)
            }
        }
    }
}

/// User id of an authenticated session; anonymous visitors are sent to `/login`.
pub struct AuthUser(pub i64);

pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let jar = CookieJar::new().add(flash_cookie(LOGIN_REQUIRED));
        (jar, Redirect::to("/login")).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .unwrap_or(Session::Anonymous);
        match session {
            Session::Authenticated(user_id) => Ok(AuthUser(user_id)),
            Session::Anonymous => Err(LoginRedirect),
        }
    }
}
