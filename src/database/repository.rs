use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeIngredient, Tag, User,
};
use crate::database::store::{PageRequest, RecipeDraft, RecipeFilter, Store};
use crate::types::RelationKind;

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, role, created_at";
const RECIPE_COLUMNS: &str =
    "r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_recipe_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RecipeFilter) {
        builder.push(" WHERE TRUE");
        if let Some(author_id) = filter.author_id {
            builder.push(" AND r.author_id = ").push_bind(author_id);
        }
        if !filter.tag_slugs.is_empty() {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                     WHERE rt.recipe_id = r.id AND t.slug = ANY(",
                )
                .push_bind(filter.tag_slugs.clone())
                .push("))");
        }
        if let Some(user_id) = filter.favorited_by {
            builder
                .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
        if let Some(user_id) = filter.in_cart_of {
            builder
                .push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }

    async fn write_composition(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        recipe_id: i64,
        draft: &RecipeDraft,
    ) -> Result<(), DatabaseError> {
        let (ingredient_ids, amounts): (Vec<i64>, Vec<i32>) = draft.ingredients.iter().copied().unzip();

        sqlx::query(
            "INSERT INTO ingredient_amounts (recipe_id, ingredient_id, amount)
             SELECT $1, i.ingredient_id, i.amount
             FROM UNNEST($2::BIGINT[], $3::INTEGER[]) WITH ORDINALITY AS i(ingredient_id, amount, position)
             ORDER BY i.position",
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut **tx)
        .await?;

        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) SELECT $1, UNNEST($2::BIGINT[])")
            .bind(recipe_id)
            .bind(&draft.tag_ids)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, first_name, last_name, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY email LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, count.0))
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let rows = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn tag_by_id(&self, id: i64) -> Result<Option<Tag>, DatabaseError> {
        let row = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_tags(&self, tags: &[NewTag]) -> Result<u64, DatabaseError> {
        let mut inserted = 0;
        for tag in tags {
            let result = sqlx::query(
                "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(&tag.slug)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn search_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, DatabaseError> {
        let rows = match name_prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients
                     WHERE lower(name) LIKE $1
                     ORDER BY name",
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn ingredient_by_id(&self, id: i64) -> Result<Option<Ingredient>, DatabaseError> {
        let row = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ingredients_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_ingredients(&self, ingredients: &[NewIngredient]) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for ingredient in ingredients {
            let result = sqlx::query(
                "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(&ingredient.name)
            .bind(&ingredient.measurement_unit)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_recipe(&self, draft: &RecipeDraft) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let (recipe_id,): (i64,) = sqlx::query_as(
            "INSERT INTO recipes (author_id, name, image, text, cooking_time)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(draft.author_id)
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.text)
        .bind(draft.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        Self::write_composition(&mut tx, recipe_id, draft).await?;
        tx.commit().await?;
        Ok(recipe_id)
    }

    async fn replace_recipe(&self, id: i64, draft: &RecipeDraft) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 WHERE id = $5",
        )
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.text)
        .bind(draft.cooking_time)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("recipe {}", id)));
        }

        sqlx::query("DELETE FROM ingredient_amounts WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::write_composition(&mut tx, id, draft).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn recipe_by_id(&self, id: i64) -> Result<Option<Recipe>, DatabaseError> {
        let row = sqlx::query_as::<_, Recipe>(&format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn recipe_by_author_and_name(&self, author_id: i64, name: &str) -> Result<Option<Recipe>, DatabaseError> {
        let row = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.author_id = $1 AND r.name = $2"
        ))
        .bind(author_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_recipes(&self, filter: &RecipeFilter, page: PageRequest) -> Result<(Vec<Recipe>, i64), DatabaseError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        Self::push_recipe_filter(&mut count_query, filter);
        let (count,): (i64,) = count_query.build_query_as().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r"));
        Self::push_recipe_filter(&mut select, filter);
        select
            .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let rows = select.build_query_as::<Recipe>().fetch_all(&self.pool).await?;

        Ok((rows, count))
    }

    async fn recipes_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>, DatabaseError> {
        let rows = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r
             WHERE r.author_id = $1
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $2"
        ))
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn recipe_tags(&self, recipe_id: i64) -> Result<Vec<Tag>, DatabaseError> {
        let rows = sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name, t.color, t.slug
             FROM recipe_tags rt
             JOIN tags t ON t.id = rt.tag_id
             WHERE rt.recipe_id = $1
             ORDER BY t.id",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>, DatabaseError> {
        self.ingredients_for_recipes(&[recipe_id]).await
    }

    async fn relation_exists(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND {} = $2)",
            kind.table(),
            kind.target_column()
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(target_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<(), DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (user_id, {}) VALUES ($1, $2)",
            kind.table(),
            kind.target_column()
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(target_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_relation(&self, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
            kind.table(),
            kind.target_column()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(target_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cart_recipe_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT recipe_id FROM shopping_cart WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn ingredients_for_recipes(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeIngredient>, DatabaseError> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, RecipeIngredient>(
            "SELECT i.id, i.name, i.measurement_unit, ia.amount
             FROM ingredient_amounts ia
             JOIN ingredients i ON i.id = ia.ingredient_id
             WHERE ia.recipe_id = ANY($1)
             ORDER BY array_position($1, ia.recipe_id), ia.id",
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn followed_authors(&self, user_id: i64, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let rows = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.password_hash, u.role, u.created_at
             FROM follows f
             JOIN users u ON u.id = f.author_id
             WHERE f.user_id = $1
             ORDER BY f.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, count))
    }
}

/// Escape LIKE wildcards in user input
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
