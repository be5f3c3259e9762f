//! # aquahub-database
//!
//! PostgreSQL connection management, the `authentication` table repository,
//! and the task that owns the dedicated `LISTEN` connection.

pub mod connection;
pub mod listener;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use listener::{ListenerHandle, ListenerTask};
pub use repositories::AuthenticationRepository;
