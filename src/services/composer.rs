use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::database::models::{Recipe, User};
use crate::database::store::constraints;
use crate::database::{DatabaseError, RecipeDraft, Store};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::media::MediaStore;

pub const MAX_RECIPE_NAME_LENGTH: usize = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i64,
    pub amount: i32,
}

/// Body of a recipe create or update
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    /// Absent lists deserialize empty so validation names the field
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountInput>,
    #[serde(default)]
    pub tags: Vec<i64>,
    /// Data URI; required on create, optional on update
    #[serde(default)]
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Rejects an empty list, a repeated ingredient and non-positive amounts.
/// Entries are checked in request order so the first offence is reported.
pub fn validate_ingredients(ingredients: &[IngredientAmountInput]) -> ServiceResult<()> {
    if ingredients.is_empty() {
        return Err(ServiceError::validation("ingredients", "Choose at least one ingredient"));
    }

    let mut seen = HashSet::new();
    for item in ingredients {
        if !seen.insert(item.id) {
            return Err(ServiceError::validation(
                "ingredients",
                format!("Ingredient {} is listed more than once", item.id),
            ));
        }
        if item.amount < 1 {
            return Err(ServiceError::validation("amount", "Amount must be at least 1"));
        }
    }
    Ok(())
}

pub fn validate_tags(tags: &[i64]) -> ServiceResult<()> {
    if tags.is_empty() {
        return Err(ServiceError::validation("tags", "Choose at least one tag"));
    }

    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(*tag) {
            return Err(ServiceError::validation("tags", format!("Tag {} is listed more than once", tag)));
        }
    }
    Ok(())
}

pub fn validate_scalars(input: &RecipeInput) -> ServiceResult<()> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("name", "Name must not be empty"));
    }
    if name.chars().count() > MAX_RECIPE_NAME_LENGTH {
        return Err(ServiceError::validation(
            "name",
            format!("Name must be at most {} characters", MAX_RECIPE_NAME_LENGTH),
        ));
    }
    if input.text.trim().is_empty() {
        return Err(ServiceError::validation("text", "Text must not be empty"));
    }
    if input.cooking_time < 1 {
        return Err(ServiceError::validation("cooking_time", "Cooking time must be at least 1 minute"));
    }
    Ok(())
}

/// Write path for recipes: validates the composition, stores the image and
/// persists the recipe with its ingredient amounts and tags in one step.
pub struct RecipeComposer<'a> {
    store: &'a dyn Store,
    media: &'a MediaStore,
}

impl<'a> RecipeComposer<'a> {
    pub fn new(store: &'a dyn Store, media: &'a MediaStore) -> Self {
        Self { store, media }
    }

    pub async fn create(&self, author: &User, input: RecipeInput) -> ServiceResult<Recipe> {
        self.validate(&input).await?;
        let image_uri = input
            .image
            .as_deref()
            .ok_or_else(|| ServiceError::validation("image", "Image is required"))?;

        let name = input.name.trim();
        if self.store.recipe_by_author_and_name(author.id, name).await?.is_some() {
            return Err(duplicate_name());
        }

        let image = self.media.save_image(image_uri).await?;
        let draft = draft_from(author.id, image, &input);
        let id = self.store.insert_recipe(&draft).await.map_err(map_write_error)?;

        info!("User {} created recipe {}", author.id, id);
        self.load(id).await
    }

    /// Full replace: the stored ingredient amounts and tags end up exactly as
    /// given. The image is kept when the input carries none.
    pub async fn update(&self, actor: &User, recipe_id: i64, input: RecipeInput) -> ServiceResult<Recipe> {
        let recipe = self.load(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;
        self.validate(&input).await?;

        let name = input.name.trim();
        if let Some(existing) = self.store.recipe_by_author_and_name(recipe.author_id, name).await? {
            if existing.id != recipe.id {
                return Err(duplicate_name());
            }
        }

        let image = match input.image.as_deref() {
            Some(uri) => self.media.save_image(uri).await?,
            None => recipe.image.clone(),
        };
        let draft = draft_from(recipe.author_id, image, &input);
        self.store.replace_recipe(recipe.id, &draft).await.map_err(map_write_error)?;

        info!("User {} updated recipe {}", actor.id, recipe.id);
        self.load(recipe.id).await
    }

    pub async fn delete(&self, actor: &User, recipe_id: i64) -> ServiceResult<()> {
        let recipe = self.load(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;

        if !self.store.delete_recipe(recipe.id).await? {
            return Err(recipe_not_found(recipe_id));
        }
        info!("User {} deleted recipe {}", actor.id, recipe.id);
        Ok(())
    }

    async fn load(&self, recipe_id: i64) -> ServiceResult<Recipe> {
        self.store
            .recipe_by_id(recipe_id)
            .await?
            .ok_or_else(|| recipe_not_found(recipe_id))
    }

    /// Shape checks first, then references against the catalog
    async fn validate(&self, input: &RecipeInput) -> ServiceResult<()> {
        validate_ingredients(&input.ingredients)?;
        validate_tags(&input.tags)?;
        validate_scalars(input)?;

        let ids: Vec<i64> = input.ingredients.iter().map(|i| i.id).collect();
        let found = self.store.ingredients_by_ids(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|i| i.id == **id)) {
            return Err(ServiceError::NotFound(format!("Ingredient {} not found", missing)));
        }

        let tags = self.store.tags_by_ids(&input.tags).await?;
        if let Some(missing) = input.tags.iter().find(|id| !tags.iter().any(|t| t.id == **id)) {
            return Err(ServiceError::validation("tags", format!("Tag {} does not exist", missing)));
        }
        Ok(())
    }
}

fn ensure_can_modify(actor: &User, recipe: &Recipe) -> ServiceResult<()> {
    if actor.id == recipe.author_id || actor.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("Only the author can change this recipe".to_string()))
    }
}

fn draft_from(author_id: i64, image: String, input: &RecipeInput) -> RecipeDraft {
    RecipeDraft {
        author_id,
        name: input.name.trim().to_string(),
        image,
        text: input.text.clone(),
        cooking_time: input.cooking_time,
        ingredients: input.ingredients.iter().map(|i| (i.id, i.amount)).collect(),
        tag_ids: input.tags.clone(),
    }
}

fn recipe_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Recipe {} not found", id))
}

fn duplicate_name() -> ServiceError {
    ServiceError::validation("name", "You already have a recipe with this name")
}

/// Constraint failures that slip past the pre-checks (concurrent writers,
/// catalog rows deleted mid-request) surface as the matching client error.
fn map_write_error(err: DatabaseError) -> ServiceError {
    match &err {
        DatabaseError::UniqueViolation(c) if c == constraints::RECIPES_AUTHOR_NAME => {
            warn!("Duplicate recipe name caught by the store");
            duplicate_name()
        }
        DatabaseError::UniqueViolation(c) if c == constraints::INGREDIENT_AMOUNTS_RECIPE_INGREDIENT => {
            ServiceError::validation("ingredients", "Ingredient is listed more than once")
        }
        DatabaseError::ForeignKeyViolation(c) if c.contains("tag") => {
            ServiceError::validation("tags", "Tag does not exist")
        }
        DatabaseError::ForeignKeyViolation(c) if c.contains("ingredient") => {
            ServiceError::NotFound("Ingredient not found".to_string())
        }
        DatabaseError::CheckViolation(c) if c.contains("amount") => {
            ServiceError::validation("amount", "Amount must be at least 1")
        }
        DatabaseError::CheckViolation(c) if c.contains("cooking_time") => {
            ServiceError::validation("cooking_time", "Cooking time must be at least 1 minute")
        }
        DatabaseError::NotFound(msg) => ServiceError::NotFound(msg.clone()),
        _ => ServiceError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::RecipeIngredient;
    use crate::testing::{seed_ingredients, seed_tags, seed_user, MemoryStore, PNG_DATA_URI};
    use crate::types::Role;

    fn amounts(pairs: &[(i64, i32)]) -> Vec<IngredientAmountInput> {
        pairs.iter().map(|(id, amount)| IngredientAmountInput { id: *id, amount: *amount }).collect()
    }

    fn input(name: &str, ingredients: &[(i64, i32)], tags: &[i64]) -> RecipeInput {
        RecipeInput {
            ingredients: amounts(ingredients),
            tags: tags.to_vec(),
            image: Some(PNG_DATA_URI.to_string()),
            name: name.to_string(),
            text: "Mix and bake".to_string(),
            cooking_time: 30,
        }
    }

    struct Fixture {
        store: MemoryStore,
        media: MediaStore,
        _dir: tempfile::TempDir,
        author: User,
        ingredients: Vec<i64>,
        tags: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let author = seed_user(&store, "author", Role::User).await;
        let ingredients = seed_ingredients(&store, &[("Flour", "g"), ("Sugar", "g"), ("Milk", "ml")]).await;
        let tags = seed_tags(&store).await;
        Fixture { media: MediaStore::new(dir.path()), store, _dir: dir, author, ingredients, tags }
    }

    fn stored(rows: Vec<RecipeIngredient>) -> Vec<(i64, i32)> {
        rows.into_iter().map(|r| (r.id, r.amount)).collect()
    }

    #[test]
    fn empty_ingredient_list_is_rejected() {
        let err = validate_ingredients(&[]).unwrap_err();
        assert_eq!(err.field(), Some("ingredients"));
    }

    #[test]
    fn duplicate_ingredient_is_rejected() {
        let err = validate_ingredients(&amounts(&[(1, 2), (2, 1), (1, 5)])).unwrap_err();
        assert_eq!(err.field(), Some("ingredients"));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        assert_eq!(validate_ingredients(&amounts(&[(1, 0)])).unwrap_err().field(), Some("amount"));
        assert_eq!(validate_ingredients(&amounts(&[(1, 2), (2, -3)])).unwrap_err().field(), Some("amount"));
    }

    #[test]
    fn tags_must_be_present_and_distinct() {
        assert_eq!(validate_tags(&[]).unwrap_err().field(), Some("tags"));
        assert_eq!(validate_tags(&[4, 4]).unwrap_err().field(), Some("tags"));
        assert!(validate_tags(&[4, 5]).is_ok());
    }

    #[test]
    fn scalar_limits() {
        let mut recipe = input("Pancakes", &[(1, 1)], &[1]);
        recipe.cooking_time = 0;
        assert_eq!(validate_scalars(&recipe).unwrap_err().field(), Some("cooking_time"));

        recipe.cooking_time = 1;
        recipe.name = "x".repeat(MAX_RECIPE_NAME_LENGTH + 1);
        assert_eq!(validate_scalars(&recipe).unwrap_err().field(), Some("name"));

        recipe.name = "   ".to_string();
        assert_eq!(validate_scalars(&recipe).unwrap_err().field(), Some("name"));
    }

    #[tokio::test]
    async fn create_persists_the_exact_composition() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);
        let (flour, sugar) = (f.ingredients[0], f.ingredients[1]);

        let recipe = composer
            .create(&f.author, input("Pancakes", &[(flour, 200), (sugar, 30)], &f.tags))
            .await
            .unwrap();

        assert_eq!(recipe.author_id, f.author.id);
        assert!(recipe.image.starts_with("recipes/images/"));
        assert_eq!(stored(f.store.recipe_ingredients(recipe.id).await.unwrap()), vec![(flour, 200), (sugar, 30)]);
        let tag_ids: Vec<i64> = f.store.recipe_tags(recipe.id).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(tag_ids, f.tags);
    }

    #[tokio::test]
    async fn update_replaces_instead_of_merging() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);
        let (a, b, c) = (f.ingredients[0], f.ingredients[1], f.ingredients[2]);

        let recipe = composer
            .create(&f.author, input("Pancakes", &[(a, 2), (b, 3)], &f.tags))
            .await
            .unwrap();

        let mut replacement = input("Pancakes", &[(c, 1)], &f.tags[1..]);
        replacement.image = None;
        let updated = composer.update(&f.author, recipe.id, replacement).await.unwrap();

        assert_eq!(updated.image, recipe.image);
        assert_eq!(stored(f.store.recipe_ingredients(recipe.id).await.unwrap()), vec![(c, 1)]);
        assert_eq!(f.store.amount_row_count(), 1);
        let tag_ids: Vec<i64> = f.store.recipe_tags(recipe.id).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(tag_ids, vec![f.tags[1]]);
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);
        let flour = f.ingredients[0];

        let err = composer
            .create(&f.author, input("Pancakes", &[(flour, 1), (flour, 2)], &f.tags))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("ingredients"));
        assert_eq!(f.store.amount_row_count(), 0);
        assert!(f.store.recipe_by_author_and_name(f.author.id, "Pancakes").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_references() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);

        let err = composer.create(&f.author, input("Soup", &[(9999, 1)], &f.tags)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = composer
            .create(&f.author, input("Soup", &[(f.ingredients[0], 1)], &[9999]))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("tags"));
    }

    #[tokio::test]
    async fn missing_image_on_create() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);
        let mut recipe = input("Soup", &[(f.ingredients[0], 1)], &f.tags);
        recipe.image = None;

        let err = composer.create(&f.author, recipe).await.unwrap_err();
        assert_eq!(err.field(), Some("image"));

        let mut recipe = input("Soup", &[(f.ingredients[0], 1)], &f.tags);
        recipe.image = Some("not an image".to_string());
        let err = composer.create(&f.author, recipe).await.unwrap_err();
        assert_eq!(err.field(), Some("image"));
    }

    #[tokio::test]
    async fn duplicate_name_per_author() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);
        let other = seed_user(&f.store, "other", Role::User).await;
        let flour = f.ingredients[0];

        composer.create(&f.author, input("Bread", &[(flour, 500)], &f.tags)).await.unwrap();
        let err = composer.create(&f.author, input("Bread", &[(flour, 400)], &f.tags)).await.unwrap_err();
        assert_eq!(err.field(), Some("name"));

        // Another author may reuse the name
        composer.create(&other, input("Bread", &[(flour, 400)], &f.tags)).await.unwrap();
    }

    #[tokio::test]
    async fn only_author_or_admin_can_modify() {
        let f = fixture().await;
        let composer = RecipeComposer::new(&f.store, &f.media);
        let stranger = seed_user(&f.store, "stranger", Role::User).await;
        let admin = seed_user(&f.store, "admin", Role::Admin).await;
        let flour = f.ingredients[0];

        let recipe = composer.create(&f.author, input("Bread", &[(flour, 500)], &f.tags)).await.unwrap();

        let err = composer
            .update(&stranger, recipe.id, input("Bread", &[(flour, 1)], &f.tags))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(matches!(composer.delete(&stranger, recipe.id).await, Err(ServiceError::Forbidden(_))));

        let updated = composer
            .update(&admin, recipe.id, input("Rye bread", &[(flour, 450)], &f.tags))
            .await
            .unwrap();
        assert_eq!(updated.author_id, f.author.id);
        assert_eq!(updated.name, "Rye bread");

        composer.delete(&admin, recipe.id).await.unwrap();
        assert!(matches!(composer.delete(&admin, recipe.id).await, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn store_violations_become_client_errors() {
        let err = map_write_error(DatabaseError::UniqueViolation(constraints::RECIPES_AUTHOR_NAME.into()));
        assert_eq!(err.field(), Some("name"));

        let err = map_write_error(DatabaseError::ForeignKeyViolation("recipe_tags_tag_id_fkey".into()));
        assert_eq!(err.field(), Some("tags"));

        let err = map_write_error(DatabaseError::ForeignKeyViolation("ingredient_amounts_ingredient_id_fkey".into()));
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
