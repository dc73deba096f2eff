//! Lists the user's people and the form for adding more.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserIdentity,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, EMPTY_CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, delete_button, loading_spinner,
    },
    navigation::NavBar,
    person::{Person, get_people},
};

/// The ID of the list that new people are appended to.
pub(super) const PEOPLE_LIST_ID: &str = "people-list";
/// The ID of the placeholder shown while the list is empty.
pub(super) const PEOPLE_EMPTY_ID: &str = "people-empty";

/// The state needed for the people page.
#[derive(Debug, Clone)]
pub struct PeoplePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PeoplePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the people page for the signed in user.
pub async fn get_people_page(
    State(state): State<PeoplePageState>,
    user: UserIdentity,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let people = get_people(user.id, &connection)
        .inspect_err(|error| tracing::error!("could not get people: {error}"))?;

    Ok(people_view(&people, &user).into_response())
}

fn people_view(people: &[Person], user: &UserIdentity) -> Markup {
    let nav_bar = NavBar::new(endpoints::PEOPLE_VIEW, Some(user)).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-2xl space-y-8"
            {
                section class="space-y-4"
                {
                    h1 class="text-xl font-bold" { "People" }

                    ul id=(PEOPLE_LIST_ID) class="space-y-4"
                    {
                        @for person in people {
                            (person_card(person))
                        }

                        @if people.is_empty() {
                            (empty_people_placeholder())
                        }
                    }
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Add person" }

                    (new_person_form())
                }
            }
        }
    );

    base("People", &content)
}

fn new_person_form() -> Markup {
    html!(
        form
            hx-post=(endpoints::PEOPLE_API)
            hx-target={ "#" (PEOPLE_LIST_ID) }
            hx-swap="beforeend"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="Ana"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="age" class=(FORM_LABEL_STYLE) { "Age" }

                input
                    type="number"
                    name="age"
                    id="age"
                    min="0"
                    max="255"
                    step="1"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Add person"
            }
        }
    )
}

/// A list item showing a person's name and age with a delete button.
pub(super) fn person_card(person: &Person) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_PERSON, person.id.as_i64());
    let confirm_message = format!(
        "Are you sure you want to delete {}? Their transactions will be kept.",
        person.name
    );

    html!(
        li class=(CARD_STYLE) data-person-id=(person.id.as_i64())
        {
            div class="flex items-center justify-between gap-3"
            {
                div
                {
                    div class="text-sm font-semibold text-gray-900 dark:text-white"
                    {
                        (person.name.as_str())
                    }

                    div class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        (person.age.years()) " years old"

                        @if person.age.is_minor() {
                            " · under 18"
                        }
                    }
                }

                (delete_button(&delete_url, &confirm_message, "closest li"))
            }
        }
    )
}

pub(super) fn empty_people_placeholder() -> Markup {
    html!(
        li id=(PEOPLE_EMPTY_ID) class=(EMPTY_CARD_STYLE)
        {
            "No people yet. Add someone with the form below."
        }
    )
}
