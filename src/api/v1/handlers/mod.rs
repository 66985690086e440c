pub mod auth_check;
pub mod health;
