//! Data Transfer Objects for the service layer.

mod auth_dto;
mod dashboard_dto;
mod notification_dto;
mod organization_dto;
mod report_dto;
mod user_dto;

pub use auth_dto::*;
pub use dashboard_dto::*;
pub use notification_dto::*;
pub use organization_dto::*;
pub use report_dto::*;
pub use user_dto::*;
