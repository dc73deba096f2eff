#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    PasswordHash, ValidatedPassword, auth::UserIdentity, db::initialize, user::create_user,
};

pub(crate) use form::{
    assert_form_input, assert_form_select, assert_form_submit_button, assert_hx_endpoint,
    must_get_form,
};
pub(crate) use html::{
    assert_alert_message, assert_valid_html, parse_html_document, parse_html_fragment,
    parse_html_page,
};
pub(crate) use http::{HTML_CONTENT_TYPE, assert_content_type, assert_hx_redirect, get_header};

/// An in-memory database with all the application tables.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Register a user with `email` and return who they are signed in as.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> UserIdentity {
    let email = EmailAddress::new_unchecked(email);
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked("test"), 4)
        .expect("Could not hash password");
    let user = create_user(&email, &password_hash, connection).expect("Could not create user");

    UserIdentity {
        id: user.id,
        email: user.email,
    }
}
