//! Defines the endpoint for adding a transaction.

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
    AppState, Error, Money, PersonId, UserID,
    alert::Alert,
    auth::UserIdentity,
    person::get_person,
    transaction::{
        Description, NewTransaction, TransactionKind, create_transaction,
        transactions_page::{TRANSACTIONS_EMPTY_ID, transaction_card},
    },
};

/// The state needed for adding a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw form data for adding a transaction.
///
/// Every field is kept as text and defaults to empty so that missing or
/// malformed fields get a helpful message instead of a generic
/// deserialization error.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub person_id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

impl TransactionForm {
    /// Check the fields that do not need the database.
    fn validate(&self, owner_id: UserID) -> Result<NewTransaction, Error> {
        let person_id = self
            .person_id
            .trim()
            .parse::<i64>()
            .map(PersonId::new)
            .map_err(|_| Error::MissingPerson)?;

        Ok(NewTransaction {
            amount: Money::parse_non_negative(&self.amount)?,
            kind: TransactionKind::parse(&self.kind)?,
            description: Description::new(&self.description)?,
            person_id,
            owner_id,
        })
    }
}

/// A route handler for adding a transaction.
///
/// The person must belong to the user, and people under 18 may only have
/// expenses. On success, responds with the new transaction's card to append
/// to the list, removes the empty list placeholder and shows a success alert.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    user: UserIdentity,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match form.validate(user.id) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let person = match get_person(new_transaction.person_id, user.id, &connection) {
        Ok(person) => person,
        Err(Error::NotFound) => {
            return Error::InvalidPerson(new_transaction.person_id).into_alert_response();
        }
        Err(error) => {
            tracing::error!(
                "Could not get person {} for new transaction: {error}",
                new_transaction.person_id
            );
            return error.into_alert_response();
        }
    };

    if person.age.is_minor() && new_transaction.kind == TransactionKind::Income {
        return Error::IncomeForMinor(person.name.to_string()).into_alert_response();
    }

    let transaction = match create_transaction(new_transaction, &connection) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::error!("Could not create transaction from {form:?}: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Could not add transaction".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            )
                .into_response();
        }
    };

    tracing::info!(
        "Added transaction {} for person {} of user {}",
        transaction.id,
        person.id,
        user.id
    );

    html!(
        (transaction_card(&transaction, Some(person.name.as_str())))
        li id=(TRANSACTIONS_EMPTY_ID) hx-swap-oob="delete" {}
        (Alert::SuccessSimple {
            message: format!(
                "Added {} for {}",
                transaction.kind.label().to_lowercase(),
                person.name
            ),
        }
        .into_html())
    )
    .into_response()
}
