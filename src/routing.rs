//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    employee::{create_employee_endpoint, get_employees_endpoint},
    log_in::post_log_in,
    logging::logging_middleware,
    payslip::{create_payslip_endpoint, get_payslips_endpoint},
    receipt::upload_receipt_endpoint,
    summary::get_summary_endpoint,
    transaction::{create_transaction_endpoint, get_transactions_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::UPLOAD_RECEIPT, post(upload_receipt_endpoint))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint).get(get_transactions_endpoint),
        )
        .route(endpoints::SUMMARY_API, get(get_summary_endpoint))
        .route(
            endpoints::EMPLOYEES_API,
            post(create_employee_endpoint).get(get_employees_endpoint),
        )
        .route(
            endpoints::PAYSLIPS_API,
            post(create_payslip_endpoint).get(get_payslips_endpoint),
        )
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
