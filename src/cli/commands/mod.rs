pub mod db;
pub mod fixture;
pub mod user;
