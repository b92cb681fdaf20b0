//! HR module: employee records and the roster store that owns them.
//!
//! The store is the only mutation path for records. Every query that returns
//! a sequence hands back owned copies, so callers can read freely but must go
//! through [`EmployeeStore::update`] to change anything.

mod employee;
mod error;
mod field;
mod store;

pub use employee::{Employee, EmployeeKey, EmployeeRecord};
pub use error::{HrError, HrResult};
pub use field::{Field, FieldUpdate};
pub use store::EmployeeStore;
