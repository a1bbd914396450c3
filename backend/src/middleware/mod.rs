//! Actix middleware shared by every docvault route.

pub mod trace;

pub use trace::Trace;
