//! # taskdeck
//!
//! Multi-tenant task management REST API with recurring tasks.
//!
//! This library provides:
//! - User registration/login with JWT bearer auth
//! - Per-user task CRUD with daily/weekly/monthly recurrence rules
//! - A "today's tasks" listing that unions one-off and due recurring tasks
//!
//! ## Request Flow
//! 1. The auth middleware resolves the bearer token to an owner identity
//! 2. The query planner builds a declarative store query for the operation
//! 3. The store (SQLite or in-memory) executes it
//! 4. The pagination calculator shapes list results into a page descriptor
//!
//! ## Modules
//! - `api`: HTTP surface (axum routers, handlers, auth middleware)
//! - `query`: task query planning (filters, sort, skip/limit)
//! - `recurrence`: due-date evaluation for recurring tasks
//! - `pagination`: page arithmetic and parameter normalization
//! - `store`: pluggable persistence (SQLite, in-memory)

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod pagination;
pub mod query;
pub mod recurrence;
pub mod store;

pub use config::Config;
pub use error::ApiError;
