// api/loaders.rs - Assemble projections from the store
//
// `viewer` is the requesting user, `None` for anonymous requests. All
// user-relative flags are false for anonymous viewers.

use crate::api::format::{RecipeFlags, RecipeShortView, RecipeView, SubscriptionView, UserView};
use crate::database::models::{Recipe, User};
use crate::database::Store;
use crate::services::{ServiceError, ServiceResult};
use crate::types::RelationKind;

pub async fn is_subscribed(store: &dyn Store, viewer: Option<&User>, author_id: i64) -> ServiceResult<bool> {
    match viewer {
        Some(viewer) if viewer.id != author_id => {
            Ok(store.relation_exists(RelationKind::Follow, viewer.id, author_id).await?)
        }
        _ => Ok(false),
    }
}

pub async fn user_view(store: &dyn Store, viewer: Option<&User>, user: &User) -> ServiceResult<UserView> {
    Ok(UserView::new(user, is_subscribed(store, viewer, user.id).await?))
}

pub async fn recipe_flags(store: &dyn Store, viewer: Option<&User>, recipe_id: i64) -> ServiceResult<RecipeFlags> {
    let Some(viewer) = viewer else {
        return Ok(RecipeFlags::default());
    };
    Ok(RecipeFlags {
        is_favorited: store.relation_exists(RelationKind::Favorite, viewer.id, recipe_id).await?,
        is_in_shopping_cart: store.relation_exists(RelationKind::ShoppingCart, viewer.id, recipe_id).await?,
    })
}

pub async fn recipe_view(
    store: &dyn Store,
    media_prefix: &str,
    viewer: Option<&User>,
    recipe: &Recipe,
) -> ServiceResult<RecipeView> {
    let author = store
        .user_by_id(recipe.author_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", recipe.author_id)))?;

    Ok(RecipeView::new(
        recipe,
        user_view(store, viewer, &author).await?,
        store.recipe_tags(recipe.id).await?,
        store.recipe_ingredients(recipe.id).await?,
        recipe_flags(store, viewer, recipe.id).await?,
        media_prefix,
    ))
}

pub async fn recipe_views(
    store: &dyn Store,
    media_prefix: &str,
    viewer: Option<&User>,
    recipes: &[Recipe],
) -> ServiceResult<Vec<RecipeView>> {
    let mut views = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        views.push(recipe_view(store, media_prefix, viewer, recipe).await?);
    }
    Ok(views)
}

pub async fn subscription_view(
    store: &dyn Store,
    media_prefix: &str,
    viewer: Option<&User>,
    author: &User,
    recipes_limit: Option<i64>,
) -> ServiceResult<SubscriptionView> {
    let recipes = store.recipes_by_author(author.id, recipes_limit).await?;

    Ok(SubscriptionView {
        user: user_view(store, viewer, author).await?,
        recipes: recipes.iter().map(|r| RecipeShortView::new(r, media_prefix)).collect(),
        recipes_count: store.count_recipes_by_author(author.id).await?,
    })
}
