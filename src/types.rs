/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role stored in `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique (user, target) relations that are toggled on and off.
/// Favorites and the shopping cart point at recipes, follows point at users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Favorite,
    ShoppingCart,
    Follow,
}

impl RelationKind {
    pub fn table(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping_cart",
            RelationKind::Follow => "follows",
        }
    }

    pub fn target_column(&self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "recipe_id",
            RelationKind::Follow => "author_id",
        }
    }

    /// Name of the store constraint guarding the (user, target) pair
    pub fn unique_constraint(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites_user_recipe_unique",
            RelationKind::ShoppingCart => "shopping_cart_user_recipe_unique",
            RelationKind::Follow => "follows_user_author_unique",
        }
    }
}

/// Recipe collections a user can add to and remove from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Favorites,
    ShoppingCart,
}

impl Collection {
    pub fn relation(&self) -> RelationKind {
        match self {
            Collection::Favorites => RelationKind::Favorite,
            Collection::ShoppingCart => RelationKind::ShoppingCart,
        }
    }

    pub fn already_added_message(&self) -> &'static str {
        match self {
            Collection::Favorites => "Recipe is already in favorites",
            Collection::ShoppingCart => "Recipe is already in the shopping cart",
        }
    }

    pub fn missing_message(&self) -> &'static str {
        match self {
            Collection::Favorites => "Recipe is not in favorites",
            Collection::ShoppingCart => "Recipe is not in the shopping cart",
        }
    }
}
