//! Shared infrastructure for the Nutribud services
//!
//! This crate holds what every service needs to talk to its backing
//! stores: the PostgreSQL connection pool, the Redis client and the
//! error types those layers produce.

pub mod cache;
pub mod database;
pub mod error;
