//! Defines the endpoint for listing recorded transactions.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde_json::Value;

use crate::{
    AppState, Error,
    platform::RecordStore,
    transaction::{TRANSACTIONS_COLLECTION, Transaction},
};

/// The state needed to list transactions.
#[derive(Clone)]
pub struct ListTransactionsState {
    /// The row capability of the data platform.
    pub records: Arc<dyn RecordStore>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            records: state.records.clone(),
        }
    }
}

/// A route handler returning every recorded transaction, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let rows = state.records.query(TRANSACTIONS_COLLECTION, None).await?;

    let transactions = serde_json::from_value(Value::Array(rows))
        .map_err(|error| Error::UnexpectedResponse(error.to_string()))?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Json, extract::State};
    use serde_json::json;

    use crate::{
        platform::RecordStore,
        test_utils::{FailingRecordStore, FakeRecordStore},
        transaction::TRANSACTIONS_COLLECTION,
    };

    use super::{ListTransactionsState, get_transactions_endpoint};

    #[tokio::test]
    async fn returns_rows_newest_first() {
        let records = Arc::new(FakeRecordStore::default());
        records
            .insert(
                TRANSACTIONS_COLLECTION,
                json!({"date": "2024-05-01", "type": "in", "amount": 100.0}),
            )
            .await
            .unwrap();
        records
            .insert(
                TRANSACTIONS_COLLECTION,
                json!({"date": "2024-05-02", "type": "out", "amount": 40.0}),
            )
            .await
            .unwrap();

        let Json(transactions) = get_transactions_endpoint(State(ListTransactionsState {
            records,
        }))
        .await
        .unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].kind, "out");
        assert_eq!(transactions[1].kind, "in");
    }

    #[tokio::test]
    async fn platform_errors_propagate() {
        let records = Arc::new(FailingRecordStore {
            message: "permission denied for table transactions".to_owned(),
        });

        let result =
            get_transactions_endpoint(State(ListTransactionsState { records })).await;

        assert_eq!(
            result.expect_err("want platform error"),
            crate::Error::Platform("permission denied for table transactions".to_owned())
        );
    }
}
