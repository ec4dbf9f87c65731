//! Repositories for database operations

pub mod recipe;
pub mod session;

pub use recipe::PgRecipeStore;
pub use session::{SessionRecord, SessionRepository};
