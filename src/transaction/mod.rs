//! Income and expenses recorded against people.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod kind_options;
mod transactions_page;

pub use core::{
    Description, NewTransaction, Transaction, TransactionId, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use kind_options::get_kind_options;
pub use transactions_page::get_transactions_page;
