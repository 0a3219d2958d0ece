//! Local cache database

pub mod manager;
pub mod notification_repository;

pub use manager::DbManager;
pub use notification_repository::SqliteNotificationStore;
