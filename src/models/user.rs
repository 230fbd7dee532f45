use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Conta de usuário (armazenada no MongoDB, coleção `users`)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Always trimmed and lowercased; unique across the collection.
    pub email: String,
    pub password_hash: String,
    pub created_at: BsonDateTime,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: ObjectId::new(),
            name,
            email,
            password_hash,
            created_at: BsonDateTime::now(),
        }
    }
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
