use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::database::models::{
    Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeIngredient, Tag, User,
};
use crate::database::store::{constraints, PageRequest, RecipeDraft, RecipeFilter, Store};
use crate::database::DatabaseError;
use crate::types::RelationKind;

#[derive(Debug, Clone)]
struct AmountRow {
    id: i64,
    recipe_id: i64,
    ingredient_id: i64,
    amount: i32,
}

#[derive(Debug, Clone)]
struct RelationRow {
    id: i64,
    kind: RelationKind,
    user_id: i64,
    target_id: i64,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    amounts: Vec<AmountRow>,
    recipe_tags: Vec<(i64, i64)>,
    relations: Vec<RelationRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_composition(&self, recipe_id: i64, draft: &RecipeDraft) -> Result<(), DatabaseError> {
        for (position, (ingredient_id, amount)) in draft.ingredients.iter().enumerate() {
            if !self.ingredients.iter().any(|i| i.id == *ingredient_id) {
                return Err(DatabaseError::ForeignKeyViolation("ingredient_amounts_ingredient_id_fkey".into()));
            }
            if *amount < 1 {
                return Err(DatabaseError::CheckViolation("ingredient_amounts_amount_positive".into()));
            }
            if draft.ingredients[..position].iter().any(|(seen, _)| seen == ingredient_id) {
                return Err(DatabaseError::UniqueViolation(
                    constraints::INGREDIENT_AMOUNTS_RECIPE_INGREDIENT.into(),
                ));
            }
        }
        for tag_id in &draft.tag_ids {
            if !self.tags.iter().any(|t| t.id == *tag_id) {
                return Err(DatabaseError::ForeignKeyViolation("recipe_tags_tag_id_fkey".into()));
            }
        }
        if draft.cooking_time < 1 {
            return Err(DatabaseError::CheckViolation("recipes_cooking_time_positive".into()));
        }
        if self
            .recipes
            .iter()
            .any(|r| r.id != recipe_id && r.author_id == draft.author_id && r.name == draft.name)
        {
            return Err(DatabaseError::UniqueViolation(constraints::RECIPES_AUTHOR_NAME.into()));
        }
        Ok(())
    }

    fn write_composition(&mut self, recipe_id: i64, draft: &RecipeDraft) {
        for (ingredient_id, amount) in &draft.ingredients {
            let id = self.next_id();
            self.amounts.push(AmountRow { id, recipe_id, ingredient_id: *ingredient_id, amount: *amount });
        }
        for tag_id in &draft.tag_ids {
            if !self.recipe_tags.contains(&(recipe_id, *tag_id)) {
                self.recipe_tags.push((recipe_id, *tag_id));
            }
        }
    }

    fn recipe_ingredients(&self, recipe_id: i64) -> Vec<RecipeIngredient> {
        self.amounts
            .iter()
            .filter(|a| a.recipe_id == recipe_id)
            .filter_map(|a| {
                self.ingredients.iter().find(|i| i.id == a.ingredient_id).map(|i| RecipeIngredient {
                    id: i.id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: a.amount,
                })
            })
            .collect()
    }

    fn has_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> bool {
        self.relations
            .iter()
            .any(|r| r.kind == kind && r.user_id == user_id && r.target_id == target_id)
    }

    fn matches(&self, recipe: &Recipe, filter: &RecipeFilter) -> bool {
        if filter.author_id.is_some_and(|a| a != recipe.author_id) {
            return false;
        }
        if !filter.tag_slugs.is_empty() {
            let tagged = self.recipe_tags.iter().filter(|(r, _)| *r == recipe.id).any(|(_, tag_id)| {
                self.tags
                    .iter()
                    .any(|t| t.id == *tag_id && filter.tag_slugs.contains(&t.slug))
            });
            if !tagged {
                return false;
            }
        }
        if let Some(user_id) = filter.favorited_by {
            if !self.has_relation(RelationKind::Favorite, user_id, recipe.id) {
                return false;
            }
        }
        if let Some(user_id) = filter.in_cart_of {
            if !self.has_relation(RelationKind::ShoppingCart, user_id, recipe.id) {
                return false;
            }
        }
        true
    }
}

/// In-memory `Store` enforcing the same constraints as the SQL schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    hide_relations: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `relation_exists` always answer false, as if another request
    /// inserted the row between the existence check and the insert.
    pub fn hide_existing_relations(&self, hide: bool) {
        self.hide_relations.store(hide, Ordering::SeqCst);
    }

    pub fn relation_count(&self, kind: RelationKind) -> usize {
        self.tables.lock().unwrap().relations.iter().filter(|r| r.kind == kind).count()
    }

    pub fn amount_row_count(&self) -> usize {
        self.tables.lock().unwrap().amounts.len()
    }
}

fn window<T: Clone>(rows: &[T], page: PageRequest) -> Vec<T> {
    rows.iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation(constraints::USERS_EMAIL.into()));
        }
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation(constraints::USERS_USERNAME.into()));
        }
        let id = t.next_id();
        let row = User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let t = self.tables.lock().unwrap();
        let mut users = t.users.clone();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok((window(&users, page), users.len() as i64))
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let mut tags = self.tables.lock().unwrap().tags.clone();
        tags.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tags)
    }

    async fn tag_by_id(&self, id: i64) -> Result<Option<Tag>, DatabaseError> {
        Ok(self.tables.lock().unwrap().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, DatabaseError> {
        Ok(self.tables.lock().unwrap().tags.iter().filter(|t| ids.contains(&t.id)).cloned().collect())
    }

    async fn insert_tags(&self, tags: &[NewTag]) -> Result<u64, DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        let mut inserted = 0;
        for tag in tags {
            let taken = t
                .tags
                .iter()
                .any(|e| e.name == tag.name || e.color == tag.color || e.slug == tag.slug);
            if taken {
                continue;
            }
            let id = t.next_id();
            t.tags.push(Tag { id, name: tag.name.clone(), color: tag.color.clone(), slug: tag.slug.clone() });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn search_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, DatabaseError> {
        let prefix = name_prefix.unwrap_or_default().to_lowercase();
        let mut rows: Vec<Ingredient> = self
            .tables
            .lock()
            .unwrap()
            .ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn ingredient_by_id(&self, id: i64) -> Result<Option<Ingredient>, DatabaseError> {
        Ok(self.tables.lock().unwrap().ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn ingredients_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>, DatabaseError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .ingredients
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn insert_ingredients(&self, ingredients: &[NewIngredient]) -> Result<u64, DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        let mut inserted = 0;
        for ingredient in ingredients {
            let taken = t
                .ingredients
                .iter()
                .any(|e| e.name == ingredient.name && e.measurement_unit == ingredient.measurement_unit);
            if taken {
                continue;
            }
            let id = t.next_id();
            t.ingredients.push(Ingredient {
                id,
                name: ingredient.name.clone(),
                measurement_unit: ingredient.measurement_unit.clone(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn insert_recipe(&self, draft: &RecipeDraft) -> Result<i64, DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        if !t.users.iter().any(|u| u.id == draft.author_id) {
            return Err(DatabaseError::ForeignKeyViolation("recipes_author_id_fkey".into()));
        }
        t.check_composition(0, draft)?;

        let id = t.next_id();
        // Strictly increasing timestamps keep newest-first ordering stable
        let created_at = Utc::now() + Duration::milliseconds(id);
        t.recipes.push(Recipe {
            id,
            author_id: draft.author_id,
            name: draft.name.clone(),
            image: draft.image.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            created_at,
        });
        t.write_composition(id, draft);
        Ok(id)
    }

    async fn replace_recipe(&self, id: i64, draft: &RecipeDraft) -> Result<(), DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        if !t.recipes.iter().any(|r| r.id == id) {
            return Err(DatabaseError::NotFound(format!("recipe {}", id)));
        }
        t.check_composition(id, draft)?;

        if let Some(recipe) = t.recipes.iter_mut().find(|r| r.id == id) {
            recipe.name = draft.name.clone();
            recipe.image = draft.image.clone();
            recipe.text = draft.text.clone();
            recipe.cooking_time = draft.cooking_time;
        }
        t.amounts.retain(|a| a.recipe_id != id);
        t.recipe_tags.retain(|(r, _)| *r != id);
        t.write_composition(id, draft);
        Ok(())
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.recipes.len();
        t.recipes.retain(|r| r.id != id);
        if t.recipes.len() == before {
            return Ok(false);
        }
        t.amounts.retain(|a| a.recipe_id != id);
        t.recipe_tags.retain(|(r, _)| *r != id);
        t.relations
            .retain(|r| r.kind == RelationKind::Follow || r.target_id != id);
        Ok(true)
    }

    async fn recipe_by_id(&self, id: i64) -> Result<Option<Recipe>, DatabaseError> {
        Ok(self.tables.lock().unwrap().recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn recipe_by_author_and_name(&self, author_id: i64, name: &str) -> Result<Option<Recipe>, DatabaseError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .recipes
            .iter()
            .find(|r| r.author_id == author_id && r.name == name)
            .cloned())
    }

    async fn list_recipes(&self, filter: &RecipeFilter, page: PageRequest) -> Result<(Vec<Recipe>, i64), DatabaseError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Recipe> = t.recipes.iter().filter(|r| t.matches(r, filter)).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok((window(&rows, page), rows.len() as i64))
    }

    async fn recipes_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>, DatabaseError> {
        let filter = RecipeFilter { author_id: Some(author_id), ..Default::default() };
        let page = PageRequest { limit: limit.unwrap_or(i64::MAX), offset: 0 };
        Ok(self.list_recipes(&filter, page).await?.0)
    }

    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64, DatabaseError> {
        Ok(self.tables.lock().unwrap().recipes.iter().filter(|r| r.author_id == author_id).count() as i64)
    }

    async fn recipe_tags(&self, recipe_id: i64) -> Result<Vec<Tag>, DatabaseError> {
        let t = self.tables.lock().unwrap();
        let mut tags: Vec<Tag> = t
            .tags
            .iter()
            .filter(|tag| t.recipe_tags.contains(&(recipe_id, tag.id)))
            .cloned()
            .collect();
        tags.sort_by_key(|tag| tag.id);
        Ok(tags)
    }

    async fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>, DatabaseError> {
        Ok(self.tables.lock().unwrap().recipe_ingredients(recipe_id))
    }

    async fn relation_exists(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, DatabaseError> {
        if self.hide_relations.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.tables.lock().unwrap().has_relation(kind, user_id, target_id))
    }

    async fn insert_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<(), DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        if t.has_relation(kind, user_id, target_id) {
            return Err(DatabaseError::UniqueViolation(kind.unique_constraint().into()));
        }
        if kind == RelationKind::Follow && user_id == target_id {
            return Err(DatabaseError::CheckViolation(constraints::FOLLOWS_NO_SELF_FOLLOW.into()));
        }
        let target_exists = match kind {
            RelationKind::Follow => t.users.iter().any(|u| u.id == target_id),
            RelationKind::Favorite | RelationKind::ShoppingCart => t.recipes.iter().any(|r| r.id == target_id),
        };
        if !target_exists || !t.users.iter().any(|u| u.id == user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!("{}_fkey", kind.table())));
        }
        let id = t.next_id();
        t.relations.push(RelationRow { id, kind, user_id, target_id });
        Ok(())
    }

    async fn delete_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, DatabaseError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.relations.len();
        t.relations
            .retain(|r| !(r.kind == kind && r.user_id == user_id && r.target_id == target_id));
        Ok(t.relations.len() < before)
    }

    async fn cart_recipe_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<&RelationRow> = t
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::ShoppingCart && r.user_id == user_id)
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows.into_iter().map(|r| r.target_id).collect())
    }

    async fn ingredients_for_recipes(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeIngredient>, DatabaseError> {
        let t = self.tables.lock().unwrap();
        Ok(recipe_ids.iter().flat_map(|id| t.recipe_ingredients(*id)).collect())
    }

    async fn followed_authors(&self, user_id: i64, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<&RelationRow> = t
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Follow && r.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        let authors: Vec<User> = rows
            .iter()
            .filter_map(|r| t.users.iter().find(|u| u.id == r.target_id).cloned())
            .collect();
        Ok((window(&authors, page), authors.len() as i64))
    }
}
