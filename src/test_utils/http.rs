use axum::{body::Body, http::StatusCode, response::Response};

/// The content type maud gives to rendered pages and fragments.
pub(crate) const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(get_header(response, "content-type"), content_type);
}

/// The value of `header_name`, failing the test if it is missing or not text.
#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let Some(value) = response.headers().get(header_name) else {
        panic!("Response has no {header_name} header, got {:?}", response.headers());
    };

    value
        .to_str()
        .unwrap_or_else(|error| panic!("{header_name} header is not text: {error}"))
        .to_owned()
}

/// Check that an htmx request is sent to `endpoint`, e.g. the log-in page.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}
