// api/format.rs - Response projections
//
// Every entity leaves the API through one of these structs. The mapping
// functions are pure: user-relative flags are computed by the caller
// (see api/loaders.rs) and passed in.

use serde::Serialize;

use crate::database::models::{Recipe, RecipeIngredient, Tag, User};

/// Join the media URL prefix and a stored relative path
pub fn media_url(prefix: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Returned by registration, before any relation can exist
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegisteredUser {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for RegisteredUser {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserView {
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Flags of a recipe relative to the requesting user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFlags {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeView {
    pub fn new(
        recipe: &Recipe,
        author: UserView,
        tags: Vec<Tag>,
        ingredients: Vec<RecipeIngredient>,
        flags: RecipeFlags,
        media_prefix: &str,
    ) -> Self {
        Self {
            id: recipe.id,
            tags,
            author,
            ingredients,
            is_favorited: flags.is_favorited,
            is_in_shopping_cart: flags.is_in_shopping_cart,
            name: recipe.name.clone(),
            image: media_url(media_prefix, &recipe.image),
            text: recipe.text.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Compact form used by the toggles and inside subscriptions
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeShortView {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShortView {
    pub fn new(recipe: &Recipe, media_prefix: &str) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media_url(media_prefix, &recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A followed author with a preview of their recipes
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeShortView>,
    pub recipes_count: i64,
}
