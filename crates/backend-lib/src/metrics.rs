// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const LOGIN_LOCKOUT: &str = "auth.login.lockout";
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const GATE_RESOLVED: &str = "auth.gate.resolved";
pub const GATE_ANONYMOUS: &str = "auth.gate.anonymous";
pub const GATE_REJECTED: &str = "auth.gate.rejected";
pub const EMPLOYEE_CREATED: &str = "employee.created";
pub const EMPLOYEE_UPDATED: &str = "employee.updated";
pub const EMPLOYEE_DELETED: &str = "employee.deleted";
pub const ACCESS_DENIED: &str = "employee.access_denied";
