//! Inbound adapters mapping external traffic onto the driving ports.
//!
//! [`http`] serves the REST API under `/api/v1`; [`ws`] pushes committed
//! changes to signed-in clients over `/ws`.

pub mod http;
pub mod ws;
