//! RentSure client library
//!
//! Resilient API access with an offline response cache, plus the listing
//! filters and text rendering used by the `rentsure` binary.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod fetch;
pub mod listings;
pub mod output;
