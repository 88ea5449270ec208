//! The transaction record and its closed set of kinds.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// The three closed transaction categories.
///
/// Cash in increases the balance; cash out and expense decrease it. The
/// entry form only accepts these three values, so no other kind can be
/// created through this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received.
    In,
    /// Money paid out.
    Out,
    /// Money spent on operating costs.
    Expense,
}

impl TransactionKind {
    /// The wire name of this kind, as stored in the `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::In => "in",
            TransactionKind::Out => "out",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse a wire name back into a kind.
    ///
    /// Returns `None` for anything outside the closed set. Rows read back
    /// from the platform go through this, so an unknown value in stored data
    /// is skipped rather than treated as an error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in" => Some(TransactionKind::In),
            "out" => Some(TransactionKind::Out),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// One row of the `transactions` collection.
///
/// `id` and `created_at` are assigned by the data platform and are `None`
/// until the row has been stored. `kind` is kept as text on the read path;
/// see [TransactionKind::parse].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The row ID assigned by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The creation timestamp assigned by the platform.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    /// The business date the transaction applies to.
    pub date: Date,
    /// The transaction category: `in`, `out`, or `expense`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The amount of money moved, always a positive quantity.
    pub amount: f64,
    /// An optional category label, e.g. "Payroll".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional free-text detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
