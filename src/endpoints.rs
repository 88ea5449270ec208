//! The API endpoint URIs.

/// The route for relaying a receipt image into object storage.
pub const UPLOAD_RECEIPT: &str = "/upload-receipt";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route to access transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the transaction summary totals.
pub const SUMMARY_API: &str = "/api/summary";
/// The route to access employees.
pub const EMPLOYEES_API: &str = "/api/employees";
/// The route to access payslips.
pub const PAYSLIPS_API: &str = "/api/payslips";
