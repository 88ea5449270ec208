//! Summary aggregation over the recorded transactions.
//!
//! Reduces a list of transactions into the three category totals and the
//! derived balance, and formats totals for display with exactly two
//! fraction digits.

use std::sync::{Arc, OnceLock};

use axum::{
    Json,
    extract::{FromRef, State},
};
use numfmt::{Formatter, Precision};
use serde::Serialize;

use crate::{
    AppState, Error,
    platform::RecordStore,
    transaction::{TRANSACTIONS_COLLECTION, Transaction, TransactionKind},
};

/// The category totals and derived balance for a set of transactions.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all `in` amounts.
    pub cash_in: f64,
    /// The sum of all `out` amounts.
    pub cash_out: f64,
    /// The sum of all `expense` amounts.
    pub expense: f64,
    /// `cash_in - (cash_out + expense)`.
    pub balance: f64,
}

/// Reduce `transactions` into category totals and a balance.
///
/// Summation is commutative, so the result is stable under reordering of
/// the input. An empty slice yields all zeros.
pub fn aggregate(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for transaction in transactions {
        match TransactionKind::parse(&transaction.kind) {
            Some(TransactionKind::In) => summary.cash_in += transaction.amount,
            Some(TransactionKind::Out) => summary.cash_out += transaction.amount,
            Some(TransactionKind::Expense) => summary.expense += transaction.amount,
            // The entry form cannot create a kind outside the closed set;
            // any found in stored data are excluded from every bucket.
            None => {}
        }
    }

    summary.balance = summary.cash_in - (summary.cash_out + summary.expense);

    summary
}

/// Format a total with thousands separators and exactly two fraction digits.
pub fn format_amount(value: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if value < 0.0 {
        format!("-{}", fmt.fmt_string(value.abs()))
    } else if value > 0.0 {
        fmt.fmt_string(value)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "0.00".to_owned()
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

/// The state needed to compute the summary.
#[derive(Clone)]
pub struct SummaryState {
    /// The row capability of the data platform.
    pub records: Arc<dyn RecordStore>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            records: state.records.clone(),
        }
    }
}

/// The summary payload: raw totals plus display strings.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// The raw totals.
    #[serde(flatten)]
    pub totals: Summary,
    /// The totals formatted for display.
    pub display: SummaryDisplay,
}

/// The formatted rendering of each total.
#[derive(Debug, Serialize)]
pub struct SummaryDisplay {
    /// Formatted `cash_in`.
    pub cash_in: String,
    /// Formatted `cash_out`.
    pub cash_out: String,
    /// Formatted `expense`.
    pub expense: String,
    /// Formatted `balance`.
    pub balance: String,
}

impl From<Summary> for SummaryResponse {
    fn from(totals: Summary) -> Self {
        let display = SummaryDisplay {
            cash_in: format_amount(totals.cash_in),
            cash_out: format_amount(totals.cash_out),
            expense: format_amount(totals.expense),
            balance: format_amount(totals.balance),
        };

        Self { totals, display }
    }
}

/// A route handler returning the totals and balance over every recorded
/// transaction.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
) -> Result<Json<SummaryResponse>, Error> {
    let rows = state.records.query(TRANSACTIONS_COLLECTION, None).await?;

    let transactions: Vec<Transaction> = serde_json::from_value(serde_json::Value::Array(rows))
        .map_err(|error| Error::UnexpectedResponse(error.to_string()))?;

    Ok(Json(aggregate(&transactions).into()))
}
