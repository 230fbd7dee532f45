use super::{
    duplicate_email, FormStore, ResponseStore, SessionStore, UserStore, SESSION_TTL_SECS,
};
use crate::{
    models::{Form, FormResponse, SessionState, User},
    utils::AppError,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Process-local backend for tests and for running without MongoDB.
///
/// Collections keep insertion order, which stands in for MongoDB's `_id` order.
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    forms: RwLock<Vec<Form>>,
    responses: RwLock<Vec<FormResponse>>,
    sessions: RwLock<HashMap<String, (SessionState, Instant)>>,
    session_ttl: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            users: RwLock::default(),
            forms: RwLock::default(),
            responses: RwLock::default(),
            sessions: RwLock::default(),
            session_ttl: Duration::from_secs(SESSION_TTL_SECS),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_session_ttl(session_ttl: Duration) -> Self {
        Self {
            session_ttl,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(duplicate_email());
        }
        users.push(user.clone());
        Ok(())
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn insert_form(&self, form: &Form) -> Result<(), AppError> {
        self.forms.write().await.push(form.clone());
        Ok(())
    }

    async fn find_form(&self, id: &ObjectId) -> Result<Option<Form>, AppError> {
        Ok(self.forms.read().await.iter().find(|f| f.id == *id).cloned())
    }

    async fn forms_by_owner(&self, owner_id: &ObjectId) -> Result<Vec<Form>, AppError> {
        Ok(self
            .forms
            .read()
            .await
            .iter()
            .rev()
            .filter(|f| f.owner_id == *owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn insert_response(&self, response: &FormResponse) -> Result<(), AppError> {
        self.responses.write().await.push(response.clone());
        Ok(())
    }

    async fn responses_for_form(&self, form_id: &ObjectId) -> Result<Vec<FormResponse>, AppError> {
        Ok(self
            .responses
            .read()
            .await
            .iter()
            .filter(|r| r.form_id == *form_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session(&self, token: &str) -> Result<Option<SessionState>, AppError> {
        let ttl = self.session_ttl;
        Ok(self
            .sessions
            .read()
            .await
            .get(token)
            .filter(|(_, touched)| touched.elapsed() < ttl)
            .map(|(state, _)| state.clone()))
    }

    /// Also drops every expired record, standing in for MongoDB's TTL monitor.
    async fn save_session(&self, token: &str, state: &SessionState) -> Result<(), AppError> {
        let ttl = self.session_ttl;
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, touched)| touched.elapsed() < ttl);
        sessions.insert(token.to_string(), (state.clone(), Instant::now()));
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
