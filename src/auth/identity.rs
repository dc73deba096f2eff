//! The signed in user as seen by request handlers.

use std::str::FromStr;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;

use crate::{Error, UserID, auth::cookie::get_token_from_cookies};

/// Who is making the request.
///
/// The auth guard places this in the request extensions, so handlers behind
/// the guard can take it as an argument.
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The address the user signed in with.
    pub email: EmailAddress,
}

/// Get the signed in user from the auth cookie.
///
/// Returns `None` if there is no auth cookie, the token has expired or the
/// token cannot be read.
pub fn get_current_user(jar: &PrivateCookieJar) -> Option<UserIdentity> {
    let token = match get_token_from_cookies(jar) {
        Ok(token) => token,
        Err(Error::Unauthenticated) => return None,
        Err(error) => {
            tracing::warn!("Could not read auth token: {error}");
            return None;
        }
    };

    match EmailAddress::from_str(&token.email) {
        Ok(email) => Some(UserIdentity {
            id: token.user_id,
            email,
        }),
        Err(error) => {
            tracing::warn!("Auth token has an invalid email {}: {error}", token.email);
            None
        }
    }
}

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserIdentity>()
            .cloned()
            .ok_or(Error::Unauthenticated)
    }
}
