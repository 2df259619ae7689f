pub mod manager;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::PgRepository;
pub use store::{PageRequest, RecipeDraft, RecipeFilter, Store};
