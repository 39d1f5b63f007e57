pub mod comments;
pub mod manager;
pub mod models;
pub mod reviews;
pub mod taxonomy;
pub mod titles;
pub mod users;
