//! Domain model of the CEO platform.
//!
//! Organizations own users, report templates, submitted reports and
//! notifications. Rows are scoped by `org_id` everywhere.

pub mod dashboard;
pub mod notification;
pub mod organization;
pub mod report;
pub mod role;
pub mod user;

pub use dashboard::*;
pub use notification::*;
pub use organization::*;
pub use report::*;
pub use role::*;
pub use user::*;
