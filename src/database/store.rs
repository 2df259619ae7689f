use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeIngredient, Tag, User,
};
use crate::types::RelationKind;

/// Constraint names shared by the SQL schema and every `Store` implementation
pub mod constraints {
    pub const USERS_EMAIL: &str = "users_email_unique";
    pub const USERS_USERNAME: &str = "users_username_unique";
    pub const RECIPES_AUTHOR_NAME: &str = "recipes_author_name_unique";
    pub const INGREDIENT_AMOUNTS_RECIPE_INGREDIENT: &str =
        "ingredient_amounts_recipe_ingredient_unique";
    pub const FOLLOWS_NO_SELF_FOLLOW: &str = "follows_no_self_follow";
}

/// Limit/offset window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// Everything persisted for a recipe besides its id and timestamp.
/// Ingredients are (ingredient id, amount) pairs.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<(i64, i32)>,
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author_id: Option<i64>,
    /// Any-of match on tag slugs
    pub tag_slugs: Vec<String>,
    pub favorited_by: Option<i64>,
    pub in_cart_of: Option<i64>,
}

/// Persistence seam used by the services. Implementations must enforce the
/// unique constraints named in [`constraints`] and in
/// [`RelationKind::unique_constraint`], reporting them as
/// [`DatabaseError::UniqueViolation`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Users
    async fn insert_user(&self, user: &NewUser) -> Result<User, DatabaseError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError>;
    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DatabaseError>;

    // Catalog
    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError>;
    async fn tag_by_id(&self, id: i64) -> Result<Option<Tag>, DatabaseError>;
    async fn tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, DatabaseError>;
    /// Returns the number of rows inserted; existing tags are skipped
    async fn insert_tags(&self, tags: &[NewTag]) -> Result<u64, DatabaseError>;
    async fn search_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, DatabaseError>;
    async fn ingredient_by_id(&self, id: i64) -> Result<Option<Ingredient>, DatabaseError>;
    async fn ingredients_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>, DatabaseError>;
    /// Returns the number of rows inserted; existing ingredients are skipped
    async fn insert_ingredients(&self, ingredients: &[NewIngredient]) -> Result<u64, DatabaseError>;

    // Recipes
    /// Inserts the recipe with its ingredient amounts and tags atomically
    async fn insert_recipe(&self, draft: &RecipeDraft) -> Result<i64, DatabaseError>;
    /// Overwrites the scalar fields and replaces the ingredient amounts and
    /// tags atomically
    async fn replace_recipe(&self, id: i64, draft: &RecipeDraft) -> Result<(), DatabaseError>;
    async fn delete_recipe(&self, id: i64) -> Result<bool, DatabaseError>;
    async fn recipe_by_id(&self, id: i64) -> Result<Option<Recipe>, DatabaseError>;
    async fn recipe_by_author_and_name(&self, author_id: i64, name: &str) -> Result<Option<Recipe>, DatabaseError>;
    /// Newest first
    async fn list_recipes(&self, filter: &RecipeFilter, page: PageRequest) -> Result<(Vec<Recipe>, i64), DatabaseError>;
    async fn recipes_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>, DatabaseError>;
    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64, DatabaseError>;
    async fn recipe_tags(&self, recipe_id: i64) -> Result<Vec<Tag>, DatabaseError>;
    async fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>, DatabaseError>;

    // Relations
    async fn relation_exists(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, DatabaseError>;
    async fn insert_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<(), DatabaseError>;
    async fn delete_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, DatabaseError>;
    /// Recipe ids in the user's cart, in the order they were added
    async fn cart_recipe_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError>;
    /// Ingredient amounts of the given recipes, grouped by recipe in the order
    /// of `recipe_ids` and by insertion order within a recipe
    async fn ingredients_for_recipes(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeIngredient>, DatabaseError>;
    async fn followed_authors(&self, user_id: i64, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError>;
}
