pub mod composer;
pub mod error;
pub mod media;
pub mod shopping_list;
pub mod toggle;
pub mod users;

pub use composer::{IngredientAmountInput, RecipeComposer, RecipeInput};
pub use error::{ServiceError, ServiceResult};
pub use media::{MediaError, MediaStore};
pub use shopping_list::{build_shopping_list, SHOPPING_LIST_FILENAME};
