pub mod catalog;
pub mod recipe;
pub mod user;

pub use catalog::{Ingredient, NewIngredient, NewTag, Tag, TAG_PALETTE};
pub use recipe::{Recipe, RecipeIngredient};
pub use user::{NewUser, User};
