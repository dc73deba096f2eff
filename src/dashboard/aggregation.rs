//! Income, expense and balance totals over transactions.
//!
//! These functions are pure: they only look at the people and transactions
//! they are given, so the callers decide which user's data is summarised.

use std::collections::HashMap;

use crate::{Money, Person, PersonId, Transaction, TransactionKind};

/// The income and expenses over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// The sum of all income.
    pub income: Money,
    /// The sum of all expenses.
    pub expense: Money,
}

impl Totals {
    /// Income minus expenses. Negative when more was spent than earned.
    pub fn balance(&self) -> Money {
        self.income - self.expense
    }

    fn add(&mut self, transaction: &Transaction) {
        match transaction.kind {
            TransactionKind::Income => self.income += transaction.amount,
            TransactionKind::Expense => self.expense += transaction.amount,
        }
    }
}

/// The totals over one person's transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonTotals<'a> {
    /// The person the transactions belong to.
    pub person: &'a Person,
    /// The totals over the person's transactions.
    pub totals: Totals,
}

/// Sum the income and expenses of all `transactions`.
///
/// Transactions count whether or not their person still exists.
pub fn summarise(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        totals.add(transaction);
    }

    totals
}

/// Sum the income and expenses of each person in `people`.
///
/// Returns one entry per person, in the same order as `people`. People
/// without transactions get zero totals, and transactions whose person is not
/// in `people` are ignored.
pub fn totals_by_person<'a>(
    people: &'a [Person],
    transactions: &[Transaction],
) -> Vec<PersonTotals<'a>> {
    let mut totals_by_id: HashMap<PersonId, Totals> = HashMap::with_capacity(people.len());

    for transaction in transactions {
        totals_by_id
            .entry(transaction.person_id)
            .or_default()
            .add(transaction);
    }

    people
        .iter()
        .map(|person| PersonTotals {
            person,
            totals: totals_by_id.get(&person.id).copied().unwrap_or_default(),
        })
        .collect()
}
