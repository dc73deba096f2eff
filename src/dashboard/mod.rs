//! Dashboard module
//!
//! Provides an overview page with the income, expenses and balance of each
//! person and of everyone together.

mod aggregation;
mod page;

pub use aggregation::{PersonTotals, Totals, summarise, totals_by_person};
pub use page::get_dashboard_page;
