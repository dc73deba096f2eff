//! Registration, log-in and log-out, and the cookie based sessions that tie them together.

mod cookie;
mod identity;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;
mod token;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use identity::{UserIdentity, get_current_user};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use register::{get_register_page, register_user};

#[cfg(test)]
pub(crate) use cookie::{COOKIE_TOKEN, set_auth_cookie};
