pub mod auth;
pub mod response;

pub use auth::{resolve_requester, AuthUser, Requester};
pub use response::{ApiResponse, ApiResult};
