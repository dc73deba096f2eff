//! Creates the tables for the application's domain models.

use rusqlite::Connection;

use crate::{
    Error, person::create_person_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create all the tables that the application needs.
///
/// Tables are created with `IF NOT EXISTS`, so calling this on an existing
/// database is safe. All tables are created in a single SQL transaction.
///
/// # Errors
///
/// Returns [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_person_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
