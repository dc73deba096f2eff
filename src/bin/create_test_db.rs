use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use controle_gastos::{
    Age, Description, Money, NewPerson, NewTransaction, PasswordHash, PersonName,
    TransactionKind, ValidatedPassword, count_users, create_person, create_transaction,
    create_user, initialize_db, parse_email,
};

/// A utility for creating a test database for the Controle de Gastos server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The email address of the test user.
    #[arg(long, short, default_value = "test@example.com")]
    email: String,

    /// The password of the test user.
    #[arg(long, short, default_value = "test")]
    password: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {}...", args.email);

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(&args.password),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(&parse_email(&args.email)?, &password_hash, &conn)?;

    println!("Creating people and transactions...");

    let people = [("Ana", 34), ("Bruno", 36), ("Clara", 12)];
    let transactions = [
        (0, TransactionKind::Income, 650_000, "Salary"),
        (0, TransactionKind::Expense, 180_000, "Rent"),
        (0, TransactionKind::Expense, 45_990, "Groceries"),
        (1, TransactionKind::Income, 420_000, "Salary"),
        (1, TransactionKind::Expense, 12_500, "Internet"),
        (2, TransactionKind::Expense, 3_000, "School supplies"),
        (2, TransactionKind::Expense, 1_250, "Ice cream"),
    ];

    let mut person_ids = Vec::with_capacity(people.len());

    for (name, age) in people {
        let person = create_person(
            NewPerson {
                name: PersonName::new(name)?,
                age: Age::new(age),
                owner_id: user.id,
            },
            &conn,
        )?;
        person_ids.push(person.id);
    }

    for (person_index, kind, cents, description) in transactions {
        create_transaction(
            NewTransaction {
                amount: Money::from_cents(cents),
                kind,
                description: Description::new(description)?,
                person_id: person_ids[person_index],
                owner_id: user.id,
            },
            &conn,
        )?;
    }

    println!(
        "Success! The database has {} user(s), {} people and {} transactions.",
        count_users(&conn)?,
        people.len(),
        transactions.len()
    );

    Ok(())
}
