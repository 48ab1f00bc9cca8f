//! services/web/src/lib.rs
//!
//! The GemaraChain web service: page handlers over the `DatabaseService` port.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
