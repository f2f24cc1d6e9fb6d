//! Actix middleware shared by every route.
//!
//! [`Trace`] scopes each request to a fresh trace id, echoes it in the
//! `trace-id` response header and logs completion.

pub mod trace;

pub use trace::Trace;
