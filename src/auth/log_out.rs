//! Log-out route handler that invalidates authentication cookies and redirects users.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState, SessionEvent, SessionHub,
    auth::{cookie::invalidate_auth_cookie, identity::get_current_user},
    endpoints,
};

/// The state needed to log a user out.
#[derive(Debug, Clone)]
pub struct LogOutState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub sessions: SessionHub,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            sessions: state.sessions.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Invalidate the auth cookie, tell observers the user signed out and
/// redirect the client to the log-in page.
pub async fn get_log_out(State(state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    let user_id = get_current_user(&jar).map(|user| user.id);
    let jar = invalidate_auth_cookie(jar);

    state.sessions.publish(SessionEvent::SignedOut { user_id });

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
