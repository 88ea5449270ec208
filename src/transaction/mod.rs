//! Recording and listing cash transactions.
//!
//! Rows live in the data platform's `transactions` collection and are
//! insert-only; nothing in this crate updates or deletes them.

mod create_endpoint;
mod list_endpoint;
mod models;

pub use create_endpoint::{CreateTransactionState, TransactionForm, create_transaction_endpoint};
pub use list_endpoint::{ListTransactionsState, get_transactions_endpoint};
pub use models::{Transaction, TransactionKind};

/// The name of the platform collection holding transaction rows.
pub(crate) const TRANSACTIONS_COLLECTION: &str = "transactions";
