pub mod auth_check;
