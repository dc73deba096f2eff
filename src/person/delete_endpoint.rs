//! Person deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserIdentity,
    person::{PersonId, delete_person},
};

/// The state needed for deleting a person.
#[derive(Debug, Clone)]
pub struct DeletePersonState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletePersonState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle person deletion. Returns success alert or error.
///
/// The person's transactions are kept.
pub async fn delete_person_endpoint(
    Path(person_id): Path<PersonId>,
    State(state): State<DeletePersonState>,
    user: UserIdentity,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_person(person_id, user.id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Person deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingPerson) => Error::DeleteMissingPerson.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting person {person_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_person_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::Html;

    use crate::{
        Money, PersonId, TransactionKind,
        auth::UserIdentity,
        person::{Age, NewPerson, PersonName, create_person, get_people},
        test_utils::{
            assert_valid_html, create_test_user, get_header, get_test_connection,
            parse_html_fragment,
        },
        transaction::{Description, NewTransaction, create_transaction, get_transactions},
    };

    use super::{DeletePersonState, delete_person_endpoint};

    fn get_state() -> (DeletePersonState, UserIdentity) {
        let connection = get_test_connection();
        let user = create_test_user("ana@example.com", &connection);

        (
            DeletePersonState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn create_test_person(state: &DeletePersonState, user: &UserIdentity) -> PersonId {
        create_person(
            NewPerson {
                name: PersonName::new_unchecked("Ana"),
                age: Age::new(30),
                owner_id: user.id,
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test person")
        .id
    }

    #[tokio::test]
    async fn delete_person_endpoint_succeeds() {
        let (state, user) = get_state();
        let person_id = create_test_person(&state, &user);

        let response =
            delete_person_endpoint(Path(person_id), State(state.clone()), user.clone()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_first_paragraph(&html, "Person deleted successfully");
        let people = get_people(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(people.is_empty());
    }

    #[tokio::test]
    async fn deleting_person_keeps_their_transactions() {
        let (state, user) = get_state();
        let person_id = create_test_person(&state, &user);
        create_transaction(
            NewTransaction {
                amount: Money::from_cents(10_000),
                kind: TransactionKind::Income,
                description: Description::new_unchecked("Salary"),
                person_id,
                owner_id: user.id,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response =
            delete_person_endpoint(Path(person_id), State(state.clone()), user.clone()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let transactions = get_transactions(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].person_id, person_id);
    }

    #[tokio::test]
    async fn delete_person_endpoint_with_invalid_id_returns_error_html() {
        let (state, user) = get_state();

        let response = delete_person_endpoint(Path(PersonId::new(999_999)), State(state), user).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_first_paragraph(&html, "Could not delete person");
    }

    #[tokio::test]
    async fn cannot_delete_another_users_person() {
        let (state, ana) = get_state();
        let person_id = create_test_person(&state, &ana);
        let bruno = create_test_user("bruno@example.com", &state.db_connection.lock().unwrap());

        let response = delete_person_endpoint(Path(person_id), State(state.clone()), bruno).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let people = get_people(ana.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(people.len(), 1);
    }

    #[track_caller]
    fn assert_first_paragraph(html: &Html, want_message: &str) {
        let p = scraper::Selector::parse("p").unwrap();
        let message = html
            .select(&p)
            .next()
            .expect("No alert message found")
            .text()
            .collect::<Vec<_>>()
            .join("");

        assert_eq!(want_message, message.trim());
    }
}
