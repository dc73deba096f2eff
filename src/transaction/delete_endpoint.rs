//! Transaction deletion endpoint.

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
    transaction::{TransactionId, delete_transaction},
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction deletion. Returns success alert or error.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionState>,
    user: UserIdentity,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user.id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::Html;

    use crate::{
        Money, PersonId,
        auth::UserIdentity,
        test_utils::{
            assert_valid_html, create_test_user, get_header, get_test_connection,
            parse_html_fragment,
        },
        transaction::{
            Description, NewTransaction, TransactionId, TransactionKind, create_transaction,
            get_transactions,
        },
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_state() -> (DeleteTransactionState, UserIdentity) {
        let connection = get_test_connection();
        let user = create_test_user("ana@example.com", &connection);

        (
            DeleteTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn create_test_transaction(
        state: &DeleteTransactionState,
        user: &UserIdentity,
    ) -> TransactionId {
        create_transaction(
            NewTransaction {
                amount: Money::from_cents(4_200),
                kind: TransactionKind::Expense,
                description: Description::new_unchecked("Groceries"),
                person_id: PersonId::new(1),
                owner_id: user.id,
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test transaction")
        .id
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_succeeds() {
        let (state, user) = get_state();
        let transaction_id = create_test_transaction(&state, &user);

        let response =
            delete_transaction_endpoint(Path(transaction_id), State(state.clone()), user.clone())
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_first_paragraph(&html, "Transaction deleted successfully");
        let transactions = get_transactions(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_with_invalid_id_returns_error_html() {
        let (state, user) = get_state();

        let response =
            delete_transaction_endpoint(Path(TransactionId::new(999_999)), State(state), user)
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_first_paragraph(&html, "Could not delete transaction");
    }

    #[tokio::test]
    async fn cannot_delete_another_users_transaction() {
        let (state, ana) = get_state();
        let transaction_id = create_test_transaction(&state, &ana);
        let bruno = create_test_user("bruno@example.com", &state.db_connection.lock().unwrap());

        let response =
            delete_transaction_endpoint(Path(transaction_id), State(state.clone()), bruno).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let transactions = get_transactions(ana.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transactions.len(), 1);
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
