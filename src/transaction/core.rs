//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, Money, PersonId, UserID};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of a [Transaction].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    /// Wrap a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(TransactionId)
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received, e.g. a salary.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// Every kind, in the order they are offered in forms.
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Expense, TransactionKind::Income];

    /// Parse the kind sent by a form, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTransactionKind] if `text` is not "income" or "expense".
    pub fn parse(text: &str) -> Result<Self, Error> {
        match text.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidTransactionKind(text.to_owned())),
        }
    }

    /// The value used in forms and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The human readable name of the kind.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// The kinds a person of the given age may have.
    ///
    /// People under 18 may only have expenses.
    pub fn allowed_for(is_minor: bool) -> &'static [TransactionKind] {
        if is_minor {
            &[TransactionKind::Expense]
        } else {
            &Self::ALL
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        TransactionKind::parse(text).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The text describing a transaction, guaranteed to not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description(String);

impl Description {
    /// Create a description with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyDescription] if `text` is empty or only whitespace.
    pub fn new(text: &str) -> Result<Self, Error> {
        let text = text.trim();

        if text.is_empty() {
            Err(Error::EmptyDescription)
        } else {
            Ok(Self(text.to_owned()))
        }
    }

    /// Create a description without checking it.
    ///
    /// The caller should ensure that `text` is not blank.
    pub fn new_unchecked(text: &str) -> Self {
        Self(text.to_owned())
    }

    /// The description as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An income or expense attributed to one person.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money, never negative.
    pub amount: Money,
    /// Whether the money came in or went out.
    pub kind: TransactionKind,
    /// What the transaction was for.
    pub description: Description,
    /// The person the transaction belongs to.
    ///
    /// The person may have been deleted since.
    pub person_id: PersonId,
    /// The user that recorded the transaction.
    pub owner_id: UserID,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The validated fields needed to record a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money, never negative.
    pub amount: Money,
    /// Whether the money came in or went out.
    pub kind: TransactionKind,
    /// What the transaction was for.
    pub description: Description,
    /// The person the transaction belongs to.
    pub person_id: PersonId,
    /// The user recording the transaction.
    pub owner_id: UserID,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// There is no foreign key on the person so that a person's transactions
/// outlive them.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount INTEGER NOT NULL CHECK (amount BETWEEN 0 AND 1000000000000),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                description TEXT NOT NULL,
                person_id INTEGER NOT NULL,
                owner_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner ON \"transaction\"(owner_id);",
        (),
    )?;

    Ok(())
}

/// Insert a new transaction and return the row that was created.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, kind, description, person_id, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, amount, kind, description, person_id, owner_id, created_at",
        )?
        .query_row(
            (
                new_transaction.amount,
                new_transaction.kind,
                new_transaction.description.as_str(),
                new_transaction.person_id,
                new_transaction.owner_id.as_i64(),
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Get all the transactions recorded by `owner_id`, oldest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    owner_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, kind, description, person_id, owner_id, created_at
             FROM \"transaction\"
             WHERE owner_id = :owner_id
             ORDER BY created_at, id",
        )?
        .query_map(&[(":owner_id", &owner_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction with `id` if it belongs to `owner_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if there is no such transaction
/// for this owner, or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    owner_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let kind = row.get(2)?;
    let description: String = row.get(3)?;
    let person_id = row.get(4)?;
    let owner_id = row.get(5)?;
    let created_at = row.get(6)?;

    Ok(Transaction {
        id,
        amount,
        kind,
        description: Description::new_unchecked(&description),
        person_id,
        owner_id: UserID::new(owner_id),
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
