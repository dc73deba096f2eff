use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

use super::http::{HTML_CONTENT_TYPE, assert_content_type, assert_status_ok};

async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).into_owned()
}

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&body_text(response).await)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&body_text(response).await)
}

/// Parse a full page, checking that it was served as valid HTML with a 200 status.
pub(crate) async fn parse_html_page(response: Response<Body>) -> Html {
    assert_status_ok(&response);
    assert_content_type(&response, HTML_CONTENT_TYPE);

    let document = parse_html_document(response).await;
    assert_valid_html(&document);

    document
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// Check the headline of the alert swapped into the alert container.
#[track_caller]
pub(crate) fn assert_alert_message(html: &Html, want_message: &str) {
    let message = html
        .select(&Selector::parse("#alert-container p").unwrap())
        .next()
        .expect("No alert message found")
        .text()
        .collect::<String>();

    assert_eq!(message.trim(), want_message);
}
