//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel row structs and domain
//! types; no business rule lives here beyond what the schema enforces
//! (subject uniqueness, the active-application index). Connections come from
//! a `bb8` pool of `diesel-async` connections.
//!
//! ```no_run
//! use adoption_backend::outbound::persistence::{DbPool, DieselPetRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/adoption")).await?;
//! let pets = DieselPetRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_application_repository;
mod diesel_helpers;
mod diesel_message_repository;
mod diesel_notification_repository;
mod diesel_pet_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_application_repository::DieselApplicationRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_pet_repository::DieselPetRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
