use tracing::debug;

use crate::database::models::RecipeIngredient;
use crate::database::Store;
use crate::services::error::{ServiceError, ServiceResult};

/// Name offered to the client for the downloaded list
pub const SHOPPING_LIST_FILENAME: &str = "shoplist.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Sum amounts per (name, unit), keeping the order in which each pair was
/// first seen. The catalog keys ingredients by the same pair, so a name
/// listed under two units yields two lines instead of a mixed total.
pub fn aggregate<'a, I>(rows: I) -> Vec<ShoppingItem>
where
    I: IntoIterator<Item = &'a RecipeIngredient>,
{
    let mut items: Vec<ShoppingItem> = Vec::new();
    for row in rows {
        match items
            .iter_mut()
            .find(|item| item.name == row.name && item.measurement_unit == row.measurement_unit)
        {
            Some(item) => item.total += i64::from(row.amount),
            None => items.push(ShoppingItem {
                name: row.name.clone(),
                measurement_unit: row.measurement_unit.clone(),
                total: i64::from(row.amount),
            }),
        }
    }
    items
}

/// One `<name> - <total> <unit>` line per item
pub fn render(items: &[ShoppingItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} - {} {}\n", item.name, item.total, item.measurement_unit))
        .collect()
}

/// Build the text report for everything in the user's cart
pub async fn build_shopping_list(store: &dyn Store, user_id: i64) -> ServiceResult<String> {
    let recipe_ids = store.cart_recipe_ids(user_id).await?;
    if recipe_ids.is_empty() {
        return Err(ServiceError::EmptyCart);
    }

    let rows = store.ingredients_for_recipes(&recipe_ids).await?;
    let items = aggregate(&rows);
    debug!(
        "Shopping list for user {}: {} recipes, {} items",
        user_id,
        recipe_ids.len(),
        items.len()
    );
    Ok(render(&items))
}
