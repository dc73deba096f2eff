//! The transaction kinds a person may have, swapped into the form when the
//! selected person changes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PersonId,
    auth::UserIdentity,
    html::FORM_TEXT_INPUT_STYLE,
    person::get_person,
    transaction::TransactionKind,
};

/// The ID of the select element for the transaction kind.
pub(super) const KIND_SELECT_ID: &str = "kind";

/// The state needed for getting the allowed transaction kinds.
#[derive(Debug, Clone)]
pub struct KindOptionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for KindOptionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters sent by the person select.
///
/// The ID is kept as text since the placeholder option sends an empty string.
#[derive(Debug, Default, Deserialize)]
pub struct KindOptionsQuery {
    #[serde(default)]
    pub person_id: String,
}

/// A route handler that responds with the kind select for the chosen person.
///
/// People under 18 are only offered expenses. All kinds are offered when no
/// person, or an unknown person, is selected; the create endpoint rejects
/// those.
pub async fn get_kind_options(
    State(state): State<KindOptionsState>,
    user: UserIdentity,
    Query(query): Query<KindOptionsQuery>,
) -> Response {
    let Ok(person_id) = query.person_id.trim().parse::<i64>().map(PersonId::new) else {
        return kind_select(&TransactionKind::ALL).into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let kinds = match get_person(person_id, user.id, &connection) {
        Ok(person) => TransactionKind::allowed_for(person.age.is_minor()),
        Err(Error::NotFound) => TransactionKind::allowed_for(false),
        Err(error) => {
            tracing::error!("Could not get person {person_id}: {error}");
            return error.into_alert_response();
        }
    };

    kind_select(kinds).into_response()
}

/// A select with one option per kind in `kinds`, the first one selected.
pub(super) fn kind_select(kinds: &[TransactionKind]) -> Markup {
    html!(
        select
            name="kind"
            id=(KIND_SELECT_ID)
            required
            class=(FORM_TEXT_INPUT_STYLE)
        {
            @for kind in kinds {
                option value=(kind.as_str()) { (kind.label()) }
            }
        }
    )
}
