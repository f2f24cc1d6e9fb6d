//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: a process-local store for development and tests
//! - **events**: the broadcast change feed
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod events;
pub mod memory;
pub mod persistence;
