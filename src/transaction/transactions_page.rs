//! Lists the user's transactions and the form for adding more.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, PersonId,
    auth::UserIdentity,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, EMPTY_CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, delete_button, format_currency, link,
        loading_spinner,
    },
    navigation::NavBar,
    person::{Person, get_people},
    transaction::{
        Transaction, TransactionKind, get_transactions,
        kind_options::{KIND_SELECT_ID, kind_select},
    },
};

/// The ID of the list that new transactions are appended to.
pub(super) const TRANSACTIONS_LIST_ID: &str = "transactions-list";
/// The ID of the placeholder shown while the list is empty.
pub(super) const TRANSACTIONS_EMPTY_ID: &str = "transactions-empty";

/// Shown instead of a person's name when they have been deleted.
const UNKNOWN_PERSON: &str = "Unknown";

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the transactions page for the signed in user.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    user: UserIdentity,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let people = get_people(user.id, &connection)
        .inspect_err(|error| tracing::error!("could not get people: {error}"))?;
    let transactions = get_transactions(user.id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(transactions_view(&transactions, &people, &user).into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    people: &[Person],
    user: &UserIdentity,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, Some(user)).into_html();
    let names_by_id: HashMap<PersonId, &str> = people
        .iter()
        .map(|person| (person.id, person.name.as_str()))
        .collect();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-2xl space-y-8"
            {
                section class="space-y-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    ul id=(TRANSACTIONS_LIST_ID) class="space-y-4"
                    {
                        @for transaction in transactions {
                            (transaction_card(
                                transaction,
                                names_by_id.get(&transaction.person_id).copied(),
                            ))
                        }

                        @if transactions.is_empty() {
                            (empty_transactions_placeholder())
                        }
                    }
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Add transaction" }

                    @if people.is_empty() {
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            "Transactions belong to a person. "
                            (link(endpoints::PEOPLE_VIEW, "Add a person"))
                            " before adding transactions."
                        }
                    } @else {
                        (new_transaction_form(people))
                    }
                }
            }
        }
    );

    base("Transactions", &content)
}

fn new_transaction_form(people: &[Person]) -> Markup {
    html!(
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target={ "#" (TRANSACTIONS_LIST_ID) }
            hx-swap="beforeend"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4"
        {
            div
            {
                label for="person_id" class=(FORM_LABEL_STYLE) { "Person" }

                select
                    name="person_id"
                    id="person_id"
                    required
                    hx-get=(endpoints::TRANSACTION_KIND_OPTIONS)
                    hx-trigger="change"
                    hx-target={ "#" (KIND_SELECT_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected disabled { "Select a person" }

                    @for person in people {
                        option value=(person.id.as_i64())
                        {
                            (person.name.as_str())

                            @if person.age.is_minor() {
                                " (under 18)"
                            }
                        }
                    }
                }
            }

            div
            {
                label for=(KIND_SELECT_ID) class=(FORM_LABEL_STYLE) { "Type" }

                (kind_select(&TransactionKind::ALL))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    type="text"
                    inputmode="decimal"
                    name="amount"
                    id="amount"
                    placeholder="0.00"
                    pattern="[0-9]*([.,][0-9]{1,2})?"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    placeholder="Groceries"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Add transaction"
            }
        }
    )
}

/// A list item showing a transaction with a delete button.
///
/// `person_name` is `None` when the person has been deleted.
pub(super) fn transaction_card(transaction: &Transaction, person_name: Option<&str>) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id.as_i64());
    let amount_style = match transaction.kind {
        TransactionKind::Income => "text-green-700 dark:text-green-400",
        TransactionKind::Expense => "text-red-700 dark:text-red-400",
    };

    html!(
        li class=(CARD_STYLE) data-transaction-id=(transaction.id.as_i64())
        {
            div class="flex items-center justify-between gap-3"
            {
                div class="min-w-0"
                {
                    div class="text-sm font-semibold text-gray-900 dark:text-white truncate"
                    {
                        (transaction.description.as_str())
                    }

                    div class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        span data-person-name { (person_name.unwrap_or(UNKNOWN_PERSON)) }
                        " · "
                        span data-kind { (transaction.kind.label()) }
                    }
                }

                div class="flex items-center gap-4"
                {
                    span class={ "text-sm font-semibold " (amount_style) } data-amount
                    {
                        (format_currency(transaction.amount))
                    }

                    (delete_button(
                        &delete_url,
                        "Are you sure you want to delete this transaction?",
                        "closest li",
                    ))
                }
            }
        }
    )
}

pub(super) fn empty_transactions_placeholder() -> Markup {
    html!(
        li id=(TRANSACTIONS_EMPTY_ID) class=(EMPTY_CARD_STYLE)
        {
            "No transactions yet."
        }
    )
}
