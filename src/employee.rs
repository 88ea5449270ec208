//! Recording and listing employees.

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
use time::OffsetDateTime;

use crate::{AppState, Error, platform::RecordStore};

/// The name of the platform collection holding employee rows.
pub(crate) const EMPLOYEES_COLLECTION: &str = "employees";

/// One row of the `employees` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
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
    /// The employee's name.
    pub name: String,
    /// An optional position label, e.g. "Cashier".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// The employee's base salary, if agreed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,
}

/// The state needed to create or list employees.
#[derive(Clone)]
pub struct EmployeeState {
    /// The row capability of the data platform.
    pub records: Arc<dyn RecordStore>,
}

impl FromRef<AppState> for EmployeeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            records: state.records.clone(),
        }
    }
}

/// The form data for creating an employee.
#[derive(Debug, Deserialize)]
pub struct EmployeeForm {
    /// The employee's name.
    pub name: String,
    /// An optional position label.
    #[serde(default)]
    pub position: Option<String>,
    /// The employee's base salary, if agreed.
    #[serde(default)]
    pub base_salary: Option<f64>,
}

/// A route handler for creating a new employee.
///
/// The name must not be blank; anything else is rejected locally without a
/// platform call.
pub async fn create_employee_endpoint(
    State(state): State<EmployeeState>,
    Form(form): Form<EmployeeForm>,
) -> Result<Response, Error> {
    let name = form.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let employee = Employee {
        id: None,
        created_at: None,
        name: name.to_owned(),
        position: form.position.filter(|value| !value.trim().is_empty()),
        base_salary: form.base_salary,
    };

    let record =
        serde_json::to_value(&employee).map_err(|error| Error::Serialization(error.to_string()))?;
    let stored = state.records.insert(EMPLOYEES_COLLECTION, record).await?;

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

/// A route handler returning every employee, newest first.
pub async fn get_employees_endpoint(
    State(state): State<EmployeeState>,
) -> Result<Json<Vec<Employee>>, Error> {
    let rows = state.records.query(EMPLOYEES_COLLECTION, None).await?;

    let employees = serde_json::from_value(Value::Array(rows))
        .map_err(|error| Error::UnexpectedResponse(error.to_string()))?;

    Ok(Json(employees))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum_extra::extract::Form;

    use crate::{Error, test_utils::FakeRecordStore};

    use super::{EmployeeForm, EmployeeState, create_employee_endpoint, get_employees_endpoint};

    #[tokio::test]
    async fn rejects_blank_name_without_a_platform_call() {
        let records = Arc::new(FakeRecordStore::default());
        let state = EmployeeState {
            records: records.clone(),
        };

        let form = EmployeeForm {
            name: "   ".to_owned(),
            position: None,
            base_salary: None,
        };

        let result = create_employee_endpoint(State(state), Form(form)).await;

        assert_eq!(result.expect_err("want rejection"), Error::EmptyName);
        assert!(records.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creates_and_lists_employees() {
        let records = Arc::new(FakeRecordStore::default());
        let state = EmployeeState {
            records: records.clone(),
        };

        let form = EmployeeForm {
            name: "Ari Wibowo".to_owned(),
            position: Some("Cashier".to_owned()),
            base_salary: Some(2500.0),
        };

        create_employee_endpoint(State(state.clone()), Form(form))
            .await
            .unwrap();

        let axum::Json(employees) = get_employees_endpoint(State(state)).await.unwrap();

        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Ari Wibowo");
        assert_eq!(employees[0].position.as_deref(), Some("Cashier"));
        assert_eq!(employees[0].base_salary, Some(2500.0));
        assert_eq!(employees[0].id, Some(1));
    }
}
