//! Pet adoption marketplace backend.
//!
//! Hexagonal layout: [`domain`] holds entities, rules, services and ports;
//! [`inbound`] adapts HTTP and WebSocket traffic onto the driving ports;
//! [`outbound`] implements the driven ports for PostgreSQL, the in-memory
//! store and the change feed.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
