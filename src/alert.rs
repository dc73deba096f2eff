//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as an out-of-band swap that replaces the alert
//! container in [crate::html::base], so a handler can return an alert on its
//! own or alongside the fragment that htmx swaps into the target element.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message with an explanation of what went wrong.
    Error { message: String, details: String },
}

const SUCCESS_STYLE: &str = "flex items-start gap-3 p-4 rounded-lg shadow-lg \
    text-green-800 bg-green-50 border border-green-300 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ERROR_STYLE: &str = "flex items-start gap-3 p-4 rounded-lg shadow-lg \
    text-red-800 bg-red-50 border border-red-300 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

impl Alert {
    pub fn into_html(self) -> Markup {
        let (style, role, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, "status", message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, "alert", message, details),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role=(role)
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Close"
                        class="text-lg leading-none"
                        onclick="document.getElementById('alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
