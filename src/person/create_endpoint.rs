//! Defines the endpoint for adding a person.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    auth::UserIdentity,
    person::{
        Age, NewPerson, PersonName, create_person,
        people_page::{PEOPLE_EMPTY_ID, person_card},
    },
};

/// The state needed for adding a person.
#[derive(Debug, Clone)]
pub struct CreatePersonState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePersonState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw form data for adding a person.
///
/// The age is kept as text so that a malformed age gets a helpful message
/// instead of a generic deserialization error.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PersonForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
}

impl PersonForm {
    fn validate(&self, owner_id: UserID) -> Result<NewPerson, Error> {
        Ok(NewPerson {
            name: PersonName::new(&self.name)?,
            age: Age::parse(&self.age)?,
            owner_id,
        })
    }
}

/// A route handler for adding a person.
///
/// On success, responds with the new person's card to append to the list,
/// removes the empty list placeholder and shows a success alert.
pub async fn create_person_endpoint(
    State(state): State<CreatePersonState>,
    user: UserIdentity,
    Form(form): Form<PersonForm>,
) -> Response {
    let new_person = match form.validate(user.id) {
        Ok(new_person) => new_person,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let person = match create_person(new_person, &connection) {
        Ok(person) => person,
        Err(error) => {
            tracing::error!("Could not create person from {form:?}: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Could not add person".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            )
                .into_response();
        }
    };

    tracing::info!("Added person {} for user {}", person.id, user.id);

    html!(
        (person_card(&person))
        li id=(PEOPLE_EMPTY_ID) hx-swap-oob="delete" {}
        (Alert::SuccessSimple {
            message: format!("Added {}", person.name),
        }
        .into_html())
    )
    .into_response()
}

#[cfg(test)]
mod create_person_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        auth::UserIdentity,
        person::get_people,
        test_utils::{
            assert_alert_message, assert_valid_html, create_test_user, get_test_connection,
            parse_html_fragment,
        },
    };

    use super::{CreatePersonState, PersonForm, create_person_endpoint};

    fn get_state() -> (CreatePersonState, UserIdentity) {
        let connection = get_test_connection();
        let user = create_test_user("ana@example.com", &connection);

        (
            CreatePersonState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn person_form(name: &str, age: &str) -> Form<PersonForm> {
        Form(PersonForm {
            name: name.to_owned(),
            age: age.to_owned(),
        })
    }

    #[tokio::test]
    async fn can_create_person() {
        let (state, user) = get_state();

        let response =
            create_person_endpoint(State(state.clone()), user.clone(), person_form(" Ana ", "30"))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let card = html
            .select(&Selector::parse("li[data-person-id]").unwrap())
            .next()
            .expect("No person card found");
        assert!(card.text().collect::<String>().contains("Ana"));
        assert_eq!(
            html.select(&Selector::parse("li#people-empty[hx-swap-oob=delete]").unwrap())
                .count(),
            1
        );
        assert_alert_message(&html, "Added Ana");

        let people = get_people(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name.as_str(), "Ana");
        assert_eq!(people[0].age.years(), 30);
        assert_eq!(people[0].owner_id, user.id);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_insert() {
        let (state, user) = get_state();

        let response =
            create_person_endpoint(State(state.clone()), user.clone(), person_form("   ", "30"))
                .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Invalid input");
        let people = get_people(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(people.is_empty());
    }

    #[tokio::test]
    async fn invalid_age_is_rejected_before_insert() {
        for age in ["", "-1", "256", "12.5", "abc"] {
            let (state, user) = get_state();

            let response =
                create_person_endpoint(State(state.clone()), user.clone(), person_form("Ana", age))
                    .await;

            assert_eq!(
                response.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "age {age:?} should be rejected"
            );
            let people = get_people(user.id, &state.db_connection.lock().unwrap()).unwrap();
            assert!(people.is_empty(), "age {age:?} should not be inserted");
        }
    }

    #[tokio::test]
    async fn missing_fields_get_an_invalid_input_alert() {
        for body in ["", "name=Ana", "age=30"] {
            let (state, user) = get_state();
            let form: PersonForm =
                serde_urlencoded::from_str(body).expect("Could not parse form body");

            let response = create_person_endpoint(State(state.clone()), user.clone(), Form(form))
                .await;

            assert_eq!(
                response.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "body {body:?} should be rejected"
            );
            let html = parse_html_fragment(response).await;
            assert_alert_message(&html, "Invalid input");
            let people = get_people(user.id, &state.db_connection.lock().unwrap()).unwrap();
            assert!(people.is_empty(), "body {body:?} should not be inserted");
        }
    }

    #[tokio::test]
    async fn response_has_no_card_on_error() {
        let (state, user) = get_state();

        let response = create_person_endpoint(State(state), user, person_form("", "")).await;

        let html = parse_html_fragment(response).await;
        assert_eq!(
            html.select(&Selector::parse("li[data-person-id]").unwrap())
                .count(),
            0
        );
    }
}
