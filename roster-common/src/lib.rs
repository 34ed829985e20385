//! # Roster Common Library
//!
//! Shared code for the roster services:
//! - Domain model (people, tasks, assignments)
//! - Assignment-consistency engine (normalizer, pruner, ranking, status)
//! - SQLite storage layer
//! - Configuration loading
//! - Error types and date utilities

pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;

pub use error::{Error, Result};
