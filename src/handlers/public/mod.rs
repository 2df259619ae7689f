// handlers/public/mod.rs - Handlers reachable without a token
//
// The requester is still resolved for these routes: listings and details
// compute `is_subscribed`, `is_favorited` and `is_in_shopping_cart` for a
// signed-in caller and report false for anonymous ones.

pub mod auth;
pub mod catalog;
pub mod recipes;
pub mod users;
