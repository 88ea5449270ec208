//! Defines the endpoint for recording a new transaction.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    platform::RecordStore,
    transaction::{TRANSACTIONS_COLLECTION, Transaction, TransactionKind},
};

/// The state needed to record a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The row capability of the data platform.
    pub records: Arc<dyn RecordStore>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            records: state.records.clone(),
        }
    }
}

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The business date the transaction applies to.
    pub date: Date,
    /// The transaction category. Only the three closed kinds deserialize,
    /// so unknown kinds are rejected before the handler runs.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money moved.
    pub amount: f64,
    /// An optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional free-text detail.
    #[serde(default)]
    pub note: Option<String>,
}

/// A route handler for recording a new transaction.
///
/// The amount must be a finite number strictly greater than zero; anything
/// else is rejected locally without a platform call. On success the stored
/// row, including the platform-assigned id, is echoed back with `201`.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Result<Response, Error> {
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let transaction = Transaction {
        id: None,
        created_at: None,
        date: form.date,
        kind: form.kind.as_str().to_owned(),
        amount: form.amount,
        category: form.category.filter(|value| !value.trim().is_empty()),
        note: form.note.filter(|value| !value.trim().is_empty()),
    };

    let record = serde_json::to_value(&transaction)
        .map_err(|error| Error::Serialization(error.to_string()))?;
    let stored = state.records.insert(TRANSACTIONS_COLLECTION, record).await?;

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}
