//! The dashboard page with the overall totals and a table of totals per person.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, Money,
    auth::UserIdentity,
    dashboard::aggregation::{PersonTotals, Totals, summarise, totals_by_person},
    endpoints,
    html::{
        CARD_STYLE, EMPTY_CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    person::get_people,
    transaction::get_transactions,
};

const INCOME_STYLE: &str = "text-green-600 dark:text-green-400";
const EXPENSE_STYLE: &str = "text-red-600 dark:text-red-400";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading people and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with the signed in user's totals.
///
/// The people and transactions are read on every request and summarised in
/// memory.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
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
    drop(connection);

    let global = summarise(&transactions);
    let per_person = totals_by_person(&people, &transactions);

    Ok(dashboard_view(&global, &per_person, &user).into_response())
}

fn dashboard_view(global: &Totals, per_person: &[PersonTotals], user: &UserIdentity) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, Some(user)).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl space-y-8"
            {
                h1 class="text-xl font-bold" { "Totals" }

                section class="grid grid-cols-1 gap-4 sm:grid-cols-3"
                {
                    (total_card("Income", "income", global.income, INCOME_STYLE))
                    (total_card("Expenses", "expense", global.expense, EXPENSE_STYLE))
                    (total_card("Balance", "balance", global.balance(), balance_style(global.balance())))
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Per person" }

                    @if per_person.is_empty() {
                        (no_people_message())
                    } @else {
                        (per_person_table(per_person))
                    }
                }
            }
        }
    );

    base("Dashboard", &content)
}

fn total_card(label: &str, key: &str, amount: Money, amount_style: &str) -> Markup {
    html!(
        div class=(CARD_STYLE) data-total=(key)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class={ "text-2xl font-bold " (amount_style) } data-amount
            {
                (format_currency(amount))
            }
        }
    )
}

fn per_person_table(per_person: &[PersonTotals]) -> Markup {
    html!(
        div class="relative overflow-x-auto rounded shadow-md"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Person" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                    }
                }

                tbody
                {
                    @for entry in per_person {
                        tr class=(TABLE_ROW_STYLE) data-person-id=(entry.person.id.as_i64())
                        {
                            th
                                scope="row"
                                class={ (TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white" }
                            {
                                (entry.person.name.as_str())
                            }
                            td class=(TABLE_CELL_STYLE) { (format_currency(entry.totals.income)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(entry.totals.expense)) }
                            td class={ (TABLE_CELL_STYLE) " " (balance_style(entry.totals.balance())) }
                            {
                                (format_currency(entry.totals.balance()))
                            }
                        }
                    }
                }
            }
        }
    )
}

fn no_people_message() -> Markup {
    html!(
        div class=(EMPTY_CARD_STYLE) id="no-people"
        {
            "No people registered yet. "
            (link(endpoints::PEOPLE_VIEW, "Add someone"))
            " to see their totals here."
        }
    )
}

fn balance_style(balance: Money) -> &'static str {
    if balance < Money::ZERO {
        EXPENSE_STYLE
    } else {
        INCOME_STYLE
    }
}
