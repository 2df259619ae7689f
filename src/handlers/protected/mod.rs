// handlers/protected/mod.rs - Handlers that take an `AuthUser`
//
// Anonymous requests are rejected by the extractor with 401 before the
// handler body runs.

pub mod auth;
pub mod recipes;
pub mod relations;
pub mod shopping_list;
pub mod users;
