//! Test fixtures shared by the unit tests

mod memory_store;

pub use memory_store::MemoryStore;

use crate::database::models::{NewIngredient, NewTag, NewUser, User};
use crate::database::Store;
use crate::types::Role;

/// Insert a user with a throwaway password hash
pub async fn seed_user(store: &dyn Store, username: &str, role: Role) -> User {
    store
        .insert_user(&NewUser {
            email: format!("{}@example.com", username),
            username: username.to_string(),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .await
        .expect("seed user")
}

/// Tags `breakfast` (id order first) and `dinner`
pub async fn seed_tags(store: &dyn Store) -> Vec<i64> {
    store
        .insert_tags(&[
            NewTag { name: "Breakfast".into(), color: "#c90076".into(), slug: "breakfast".into() },
            NewTag { name: "Dinner".into(), color: "#49b64e".into(), slug: "dinner".into() },
        ])
        .await
        .expect("seed tags");
    let mut ids: Vec<i64> = store.list_tags().await.expect("list tags").iter().map(|t| t.id).collect();
    ids.sort();
    ids
}

/// Ingredients in the given order, returning their ids in the same order
pub async fn seed_ingredients(store: &dyn Store, rows: &[(&str, &str)]) -> Vec<i64> {
    let new: Vec<NewIngredient> = rows
        .iter()
        .map(|(name, unit)| NewIngredient { name: name.to_string(), measurement_unit: unit.to_string() })
        .collect();
    store.insert_ingredients(&new).await.expect("seed ingredients");

    let all = store.search_ingredients(None).await.expect("list ingredients");
    rows.iter()
        .map(|(name, unit)| {
            all.iter()
                .find(|i| i.name == *name && i.measurement_unit == *unit)
                .map(|i| i.id)
                .expect("seeded ingredient")
        })
        .collect()
}

/// 1x1 transparent PNG as a data URI
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
