//! HTTP API for taskdeck.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/auth/register` - Register a new account
//! - `POST /api/v1/auth/login` - Log in, returns a bearer token
//! - `POST /api/v1/tasks` - Create a task
//! - `GET /api/v1/tasks` - List tasks (paginated, optional title search)
//! - `GET /api/v1/tasks/today` - Today's tasks (one-off + due recurring)
//! - `GET /api/v1/tasks/today/count` - Count of one-off tasks dated today
//! - `PATCH /api/v1/tasks/{id}` - Toggle a task's completion flag
//! - `GET /api/health` - Health check

mod auth;
mod routes;
mod tasks;
pub mod types;

pub use routes::{router, serve, AppState};
