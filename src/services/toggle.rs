use tracing::{info, warn};

use crate::database::models::{Recipe, User};
use crate::database::{DatabaseError, Store};
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::{Collection, RelationKind};

/// Put a recipe into one of the user's collections. Returns the recipe for
/// the short projection.
pub async fn add_to_collection(
    store: &dyn Store,
    collection: Collection,
    user: &User,
    recipe_id: i64,
) -> ServiceResult<Recipe> {
    let recipe = store
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))?;

    let kind = collection.relation();
    if store.relation_exists(kind, user.id, recipe.id).await? {
        return Err(ServiceError::Conflict(collection.already_added_message().to_string()));
    }
    insert_or_conflict(store, kind, user.id, recipe.id, collection.already_added_message()).await?;

    info!("User {} added recipe {} to {}", user.id, recipe.id, kind.table());
    Ok(recipe)
}

pub async fn remove_from_collection(
    store: &dyn Store,
    collection: Collection,
    user: &User,
    recipe_id: i64,
) -> ServiceResult<()> {
    let kind = collection.relation();
    if !store.delete_relation(kind, user.id, recipe_id).await? {
        return Err(ServiceError::NotFound(collection.missing_message().to_string()));
    }
    info!("User {} removed recipe {} from {}", user.id, recipe_id, kind.table());
    Ok(())
}

/// Subscribe `user` to `author_id`. Self-follow is refused before any lookup.
pub async fn follow(store: &dyn Store, user: &User, author_id: i64) -> ServiceResult<User> {
    if user.id == author_id {
        return Err(ServiceError::validation("author", "You cannot follow yourself"));
    }
    let author = store
        .user_by_id(author_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", author_id)))?;

    let kind = RelationKind::Follow;
    let message = "You are already following this user";
    if store.relation_exists(kind, user.id, author.id).await? {
        return Err(ServiceError::Conflict(message.to_string()));
    }
    insert_or_conflict(store, kind, user.id, author.id, message).await?;

    info!("User {} followed user {}", user.id, author.id);
    Ok(author)
}

pub async fn unfollow(store: &dyn Store, user: &User, author_id: i64) -> ServiceResult<()> {
    if !store.delete_relation(RelationKind::Follow, user.id, author_id).await? {
        return Err(ServiceError::NotFound("You are not following this user".to_string()));
    }
    info!("User {} unfollowed user {}", user.id, author_id);
    Ok(())
}

/// The existence check and the insert are separate statements; a concurrent
/// request can win in between and the unique constraint reports it.
async fn insert_or_conflict(
    store: &dyn Store,
    kind: RelationKind,
    user_id: i64,
    target_id: i64,
    message: &str,
) -> ServiceResult<()> {
    match store.insert_relation(kind, user_id, target_id).await {
        Ok(()) => Ok(()),
        Err(err) if err.violates(kind.unique_constraint()) => {
            warn!("Concurrent insert into {} for user {} and target {}", kind.table(), user_id, target_id);
            Err(ServiceError::Conflict(message.to_string()))
        }
        Err(DatabaseError::ForeignKeyViolation(_)) => {
            Err(ServiceError::NotFound("Target no longer exists".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}
