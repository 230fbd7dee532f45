//! Storage seams.
//!
//! Handlers never talk to MongoDB directly: they go through these traits,
//! which lets the same routes run against [`MongoDB`] in production and
//! [`MemoryStore`] in tests.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

use crate::{
    models::{Form, FormResponse, SessionState, User},
    utils::AppError,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

pub const USERS: &str = "users";
pub const FORMS: &str = "forms";
pub const RESPONSES: &str = "responses";
pub const SESSIONS: &str = "sessions";

/// Session records untouched for this long are gone.
pub const SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with [`AppError::Validation`] when the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
}

#[async_trait]
pub trait FormStore: Send + Sync {
    async fn insert_form(&self, form: &Form) -> Result<(), AppError>;

    async fn find_form(&self, id: &ObjectId) -> Result<Option<Form>, AppError>;

    /// Newest first.
    async fn forms_by_owner(&self, owner_id: &ObjectId) -> Result<Vec<Form>, AppError>;
}

#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn insert_response(&self, response: &FormResponse) -> Result<(), AppError>;

    /// Oldest first.
    async fn responses_for_form(&self, form_id: &ObjectId) -> Result<Vec<FormResponse>, AppError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, token: &str) -> Result<Option<SessionState>, AppError>;

    async fn save_session(&self, token: &str, state: &SessionState) -> Result<(), AppError>;

    async fn delete_session(&self, token: &str) -> Result<(), AppError>;
}

pub(crate) fn duplicate_email() -> AppError {
    AppError::Validation("This email is already registered".to_string())
}
