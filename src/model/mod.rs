//! Domain model: tasks, users, and their construction-time validation.
//!
//! Validation is decoupled from persistence: raw payloads (`NewTask`,
//! `NewUser`) are checked and normalized into `Valid*` values before any
//! store interaction.

mod task;
mod user;

pub use task::{NewTask, RecurrenceType, Task, ValidTask, Weekday, DEFAULT_CARD_COLOR};
pub use user::{NewUser, User, ValidUser};
