pub mod format;
pub mod json;
pub mod loaders;
pub mod pagination;
pub mod path;

pub use json::ValidJson;
pub use pagination::{Page, Pager, QueryParams};
pub use path::ValidPath;
