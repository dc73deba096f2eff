//! Defines the core data models and database queries for people.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, UserID};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of a [Person].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(i64);

impl PersonId {
    /// Wrap a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for PersonId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for PersonId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(PersonId)
    }
}

/// The name of a person, guaranteed to not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName(String);

impl PersonName {
    /// Create a person's name with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyPersonName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyPersonName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a person's name without checking it.
    ///
    /// The caller should ensure that `name` is not blank.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A person's age in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Age(u8);

impl Age {
    /// People younger than this may only have expenses.
    pub const ADULT: u8 = 18;

    /// Create an age from a whole number of years.
    pub fn new(years: u8) -> Self {
        Self(years)
    }

    /// Parse an age typed into a form.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAge] if `text` is not a whole number from 0 to 255.
    pub fn parse(text: &str) -> Result<Self, Error> {
        text.trim()
            .parse::<u8>()
            .map(Self)
            .map_err(|_| Error::InvalidAge(text.to_owned()))
    }

    /// The age in years.
    pub fn years(&self) -> u8 {
        self.0
    }

    /// Whether the person is under 18.
    pub fn is_minor(&self) -> bool {
        self.0 < Self::ADULT
    }
}

impl Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Someone whose income and expenses are being tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// The ID of the person.
    pub id: PersonId,
    /// The person's name.
    pub name: PersonName,
    /// The person's age.
    pub age: Age,
    /// The user that registered this person.
    pub owner_id: UserID,
    /// When the person was registered.
    pub created_at: OffsetDateTime,
}

/// The validated fields needed to register a person.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    /// The person's name.
    pub name: PersonName,
    /// The person's age.
    pub age: Age,
    /// The user registering this person.
    pub owner_id: UserID,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the person table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_person_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS person (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER NOT NULL CHECK (age BETWEEN 0 AND 255),
                owner_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_person_owner ON person(owner_id);",
        (),
    )?;

    Ok(())
}

/// Insert a new person and return the row that was created.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_person(new_person: NewPerson, connection: &Connection) -> Result<Person, Error> {
    connection
        .prepare(
            "INSERT INTO person (name, age, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, age, owner_id, created_at",
        )?
        .query_row(
            (
                new_person.name.as_str(),
                new_person.age.years(),
                new_person.owner_id.as_i64(),
                OffsetDateTime::now_utc(),
            ),
            map_person_row,
        )
        .map_err(|error| error.into())
}

/// Get all the people registered by `owner_id`, oldest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_people(owner_id: UserID, connection: &Connection) -> Result<Vec<Person>, Error> {
    connection
        .prepare(
            "SELECT id, name, age, owner_id, created_at FROM person
             WHERE owner_id = :owner_id
             ORDER BY created_at, id",
        )?
        .query_map(&[(":owner_id", &owner_id.as_i64())], map_person_row)?
        .map(|maybe_person| maybe_person.map_err(Error::from))
        .collect()
}

/// Get the person with `id` if they belong to `owner_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such person for this owner, or
/// [Error::SqlError] if there is some other SQL error.
pub fn get_person(id: PersonId, owner_id: UserID, connection: &Connection) -> Result<Person, Error> {
    connection
        .prepare(
            "SELECT id, name, age, owner_id, created_at FROM person
             WHERE id = :id AND owner_id = :owner_id",
        )?
        .query_row(
            &[(":id", &id.as_i64()), (":owner_id", &owner_id.as_i64())],
            map_person_row,
        )
        .map_err(|error| error.into())
}

/// Delete the person with `id` if they belong to `owner_id`.
///
/// The person's transactions are not deleted.
///
/// # Errors
/// Returns [Error::DeleteMissingPerson] if there is no such person for this
/// owner, or [Error::SqlError] if there is some other SQL error.
pub fn delete_person(id: PersonId, owner_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM person WHERE id = ?1 AND owner_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPerson);
    }

    Ok(())
}

/// Map a database row to a [Person].
pub fn map_person_row(row: &Row) -> Result<Person, rusqlite::Error> {
    let id = row.get(0)?;
    let name: String = row.get(1)?;
    let age = row.get(2)?;
    let owner_id = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Person {
        id,
        name: PersonName::new_unchecked(&name),
        age: Age::new(age),
        owner_id: UserID::new(owner_id),
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, UserID,
        db::initialize,
        user::{create_user, parse_email},
    };

    use super::{
        Age, NewPerson, PersonId, PersonName, create_person, delete_person, get_people, get_person,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            &parse_email("test@example.com").unwrap(),
            &PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (conn, user.id)
    }

    fn new_person(name: &str, age: u8, owner_id: UserID) -> NewPerson {
        NewPerson {
            name: PersonName::new_unchecked(name),
            age: Age::new(age),
            owner_id,
        }
    }

    #[test]
    fn create_returns_the_new_row() {
        let (conn, user_id) = get_test_connection();

        let person = create_person(new_person("Ana", 30, user_id), &conn).unwrap();

        assert_eq!(person.id, PersonId::new(1));
        assert_eq!(person.name.as_str(), "Ana");
        assert_eq!(person.age, Age::new(30));
        assert_eq!(person.owner_id, user_id);
    }

    #[test]
    fn get_people_returns_only_owned_people_in_creation_order() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            &parse_email("other@example.com").unwrap(),
            &PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        let ana = create_person(new_person("Ana", 30, user_id), &conn).unwrap();
        create_person(new_person("Bia", 12, other_user.id), &conn).unwrap();
        let caio = create_person(new_person("Caio", 8, user_id), &conn).unwrap();

        let people = get_people(user_id, &conn).unwrap();

        assert_eq!(people, vec![ana, caio]);
    }

    #[test]
    fn get_person_checks_owner() {
        let (conn, user_id) = get_test_connection();
        let ana = create_person(new_person("Ana", 30, user_id), &conn).unwrap();

        assert_eq!(get_person(ana.id, user_id, &conn), Ok(ana.clone()));
        assert_eq!(
            get_person(ana.id, UserID::new(user_id.as_i64() + 1), &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_removes_person() {
        let (conn, user_id) = get_test_connection();
        let ana = create_person(new_person("Ana", 30, user_id), &conn).unwrap();

        delete_person(ana.id, user_id, &conn).unwrap();

        assert_eq!(get_people(user_id, &conn), Ok(vec![]));
    }

    #[test]
    fn delete_missing_person_fails() {
        let (conn, user_id) = get_test_connection();

        assert_eq!(
            delete_person(PersonId::new(42), user_id, &conn),
            Err(Error::DeleteMissingPerson)
        );
    }

    #[test]
    fn delete_other_users_person_fails() {
        let (conn, user_id) = get_test_connection();
        let ana = create_person(new_person("Ana", 30, user_id), &conn).unwrap();

        assert_eq!(
            delete_person(ana.id, UserID::new(user_id.as_i64() + 1), &conn),
            Err(Error::DeleteMissingPerson)
        );
        assert_eq!(get_people(user_id, &conn).unwrap().len(), 1);
    }
}
