//! Recording and listing employee payslips.
//!
//! A payslip covers one pay period for one employee. The net salary is
//! always computed server-side from the gross salary and the itemized
//! deduction/addition fields, and the disbursement can optionally be
//! recorded in the ledger as a cash-out transaction linked to the payslip.

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
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    platform::RecordStore,
    transaction::{TRANSACTIONS_COLLECTION, Transaction, TransactionKind},
};

/// The name of the platform collection holding payslip rows.
pub(crate) const PAYSLIPS_COLLECTION: &str = "payslips";

/// One row of the `payslips` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payslip {
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
    /// The employee this payslip belongs to.
    pub employee_id: i64,
    /// The first day of the pay period.
    pub period_start: Date,
    /// The last day of the pay period.
    pub period_end: Date,
    /// The day the payslip was issued.
    pub issued_on: Date,
    /// The gross salary for the period.
    pub gross_salary: f64,
    /// Statutory deductions, e.g. social security contributions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statutory_deduction: Option<f64>,
    /// A cash advance already paid out and deducted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_advance: Option<f64>,
    /// A one-off bonus added for the period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<f64>,
    /// A recurring allowance added for the period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowance: Option<f64>,
    /// Any other deduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_deduction: Option<f64>,
    /// The computed take-home amount.
    pub net_salary: f64,
    /// Optional free-text detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The ledger transaction recording the disbursement, if one was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
}

/// The form data for creating a payslip.
#[derive(Debug, Deserialize)]
pub struct PayslipForm {
    /// The employee this payslip belongs to.
    pub employee_id: i64,
    /// The first day of the pay period.
    pub period_start: Date,
    /// The last day of the pay period.
    pub period_end: Date,
    /// The day the payslip was issued.
    pub issued_on: Date,
    /// The gross salary for the period.
    pub gross_salary: f64,
    /// Statutory deductions.
    #[serde(default)]
    pub statutory_deduction: Option<f64>,
    /// A cash advance to deduct.
    #[serde(default)]
    pub cash_advance: Option<f64>,
    /// A one-off bonus to add.
    #[serde(default)]
    pub bonus: Option<f64>,
    /// A recurring allowance to add.
    #[serde(default)]
    pub allowance: Option<f64>,
    /// Any other deduction.
    #[serde(default)]
    pub other_deduction: Option<f64>,
    /// Optional free-text detail.
    #[serde(default)]
    pub note: Option<String>,
    /// Present when the disbursement should be recorded in the ledger as a
    /// cash-out transaction (HTML checkbox semantics).
    #[serde(default)]
    pub record_in_ledger: Option<String>,
}

/// The take-home amount for a payslip: gross plus additions, minus
/// deductions. Absent components count as zero.
pub fn net_salary(form: &PayslipForm) -> f64 {
    let additions = form.bonus.unwrap_or_default() + form.allowance.unwrap_or_default();
    let deductions = form.statutory_deduction.unwrap_or_default()
        + form.cash_advance.unwrap_or_default()
        + form.other_deduction.unwrap_or_default();

    form.gross_salary + additions - deductions
}

/// The state needed to create or list payslips.
#[derive(Clone)]
pub struct PayslipState {
    /// The row capability of the data platform.
    pub records: Arc<dyn RecordStore>,
}

impl FromRef<AppState> for PayslipState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            records: state.records.clone(),
        }
    }
}

/// A route handler for creating a new payslip.
///
/// The gross salary must be a finite number strictly greater than zero and
/// the pay period must not end before it starts; anything else is rejected
/// locally without a platform call. When the form asks for the disbursement
/// to be recorded in the ledger, a cash-out transaction for the net salary
/// is inserted first and its id stored on the payslip.
pub async fn create_payslip_endpoint(
    State(state): State<PayslipState>,
    Form(form): Form<PayslipForm>,
) -> Result<Response, Error> {
    if !form.gross_salary.is_finite() || form.gross_salary <= 0.0 {
        return Err(Error::InvalidGrossSalary);
    }

    if form.period_end < form.period_start {
        return Err(Error::InvalidPayPeriod);
    }

    let net = net_salary(&form);

    let transaction_id = if form.record_in_ledger.is_some() {
        // A disbursement is a positive cash-out; a non-positive net salary
        // cannot be recorded in the ledger.
        if net <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        Some(record_disbursement(&state, &form, net).await?)
    } else {
        None
    };

    let payslip = Payslip {
        id: None,
        created_at: None,
        employee_id: form.employee_id,
        period_start: form.period_start,
        period_end: form.period_end,
        issued_on: form.issued_on,
        gross_salary: form.gross_salary,
        statutory_deduction: form.statutory_deduction,
        cash_advance: form.cash_advance,
        bonus: form.bonus,
        allowance: form.allowance,
        other_deduction: form.other_deduction,
        net_salary: net,
        note: form.note.filter(|value| !value.trim().is_empty()),
        transaction_id,
    };

    let record =
        serde_json::to_value(&payslip).map_err(|error| Error::Serialization(error.to_string()))?;
    let stored = state.records.insert(PAYSLIPS_COLLECTION, record).await?;

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

/// Insert the cash-out transaction for a payslip's net salary and return the
/// id the platform assigned to it.
async fn record_disbursement(
    state: &PayslipState,
    form: &PayslipForm,
    net: f64,
) -> Result<i64, Error> {
    let transaction = Transaction {
        id: None,
        created_at: None,
        date: form.issued_on,
        kind: TransactionKind::Out.as_str().to_owned(),
        amount: net,
        category: Some("Payroll".to_owned()),
        note: Some(format!(
            "Salary for employee #{} ({} to {})",
            form.employee_id, form.period_start, form.period_end
        )),
    };

    let record = serde_json::to_value(&transaction)
        .map_err(|error| Error::Serialization(error.to_string()))?;
    let stored = state.records.insert(TRANSACTIONS_COLLECTION, record).await?;

    stored
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::UnexpectedResponse("stored transaction has no id".to_owned()))
}

/// A route handler returning every payslip, newest first.
pub async fn get_payslips_endpoint(
    State(state): State<PayslipState>,
) -> Result<Json<Vec<Payslip>>, Error> {
    let rows = state.records.query(PAYSLIPS_COLLECTION, None).await?;

    let payslips = serde_json::from_value(Value::Array(rows))
        .map_err(|error| Error::UnexpectedResponse(error.to_string()))?;

    Ok(Json(payslips))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{Error, test_utils::FakeRecordStore};

    use super::{PayslipForm, PayslipState, create_payslip_endpoint, net_salary};

    fn base_form() -> PayslipForm {
        PayslipForm {
            employee_id: 3,
            period_start: date!(2024 - 05 - 01),
            period_end: date!(2024 - 05 - 31),
            issued_on: date!(2024 - 06 - 01),
            gross_salary: 3000.0,
            statutory_deduction: None,
            cash_advance: None,
            bonus: None,
            allowance: None,
            other_deduction: None,
            note: None,
            record_in_ledger: None,
        }
    }

    #[test]
    fn net_salary_equals_gross_when_no_components() {
        assert_eq!(net_salary(&base_form()), 3000.0);
    }

    #[test]
    fn net_salary_adds_additions_and_subtracts_deductions() {
        let form = PayslipForm {
            statutory_deduction: Some(120.0),
            cash_advance: Some(200.0),
            bonus: Some(150.0),
            allowance: Some(80.0),
            other_deduction: Some(10.0),
            ..base_form()
        };

        assert_eq!(net_salary(&form), 3000.0 + 150.0 + 80.0 - 120.0 - 200.0 - 10.0);
    }

    #[tokio::test]
    async fn rejects_non_positive_gross_salary_without_a_platform_call() {
        let records = Arc::new(FakeRecordStore::default());
        let state = PayslipState {
            records: records.clone(),
        };

        let form = PayslipForm {
            gross_salary: 0.0,
            ..base_form()
        };

        let result = create_payslip_endpoint(State(state), Form(form)).await;

        assert_eq!(result.expect_err("want rejection"), Error::InvalidGrossSalary);
        assert!(records.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_period_that_ends_before_it_starts() {
        let records = Arc::new(FakeRecordStore::default());
        let state = PayslipState {
            records: records.clone(),
        };

        let form = PayslipForm {
            period_start: date!(2024 - 05 - 31),
            period_end: date!(2024 - 05 - 01),
            ..base_form()
        };

        let result = create_payslip_endpoint(State(state), Form(form)).await;

        assert_eq!(result.expect_err("want rejection"), Error::InvalidPayPeriod);
        assert!(records.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creates_a_payslip_without_touching_the_ledger() {
        let records = Arc::new(FakeRecordStore::default());
        let state = PayslipState {
            records: records.clone(),
        };

        create_payslip_endpoint(State(state), Form(base_form()))
            .await
            .unwrap();

        assert!(records.rows_in("transactions").is_empty());

        let payslips = records.rows_in("payslips");
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0]["net_salary"], 3000.0);
        assert!(payslips[0].get("transaction_id").is_none());
    }

    #[tokio::test]
    async fn records_the_disbursement_and_links_it_to_the_payslip() {
        let records = Arc::new(FakeRecordStore::default());
        let state = PayslipState {
            records: records.clone(),
        };

        let form = PayslipForm {
            cash_advance: Some(500.0),
            record_in_ledger: Some("on".to_owned()),
            ..base_form()
        };

        create_payslip_endpoint(State(state), Form(form))
            .await
            .unwrap();

        let transactions = records.rows_in("transactions");
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["type"], "out");
        assert_eq!(transactions[0]["amount"], 2500.0);
        assert_eq!(transactions[0]["category"], "Payroll");

        let payslips = records.rows_in("payslips");
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0]["transaction_id"], transactions[0]["id"]);
    }
}
