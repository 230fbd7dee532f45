use super::{
    duplicate_email, FormStore, ResponseStore, SessionStore, UserStore, FORMS, RESPONSES,
    SESSIONS, SESSION_TTL_SECS, USERS,
};
use crate::{
    models::{Form, FormResponse, SessionState, User},
    utils::AppError,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

/// Documento da coleção `sessions`
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    token: String,
    state: SessionState,
    updated_at: BsonDateTime,
}

impl MongoDB {
    pub async fn new(uri: &str, database_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("form-builder".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(database_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes lookups and uniqueness rely on
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let unique = IndexOptions::builder().unique(true).build();
        let ttl = IndexOptions::builder()
            .expire_after(Duration::from_secs(SESSION_TTL_SECS))
            .build();

        let indexes = [
            (USERS, doc! { "email": 1 }, Some(unique.clone())),
            (FORMS, doc! { "owner_id": 1 }, None),
            (RESPONSES, doc! { "form_id": 1 }, None),
            (SESSIONS, doc! { "token": 1 }, Some(unique)),
            (SESSIONS, doc! { "updated_at": 1 }, Some(ttl)),
        ];

        for (collection, keys, options) in indexes {
            let description = format!("{}({})", collection, keys);
            let model = match options {
                Some(options) => IndexModel::builder().keys(keys).options(options).build(),
                None => IndexModel::builder().keys(keys).build(),
            };

            match self.collection::<Document>(collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", description),
                // The unique email index is what keeps registrations consistent
                Err(e) if collection == USERS => return Err(e.into()),
                Err(e) => log::warn!("   ⚠️  Index {} not created: {}", description, e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserStore for MongoDB {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.collection::<User>(USERS).insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(duplicate_email()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FormStore for MongoDB {
    async fn insert_form(&self, form: &Form) -> Result<(), AppError> {
        self.collection::<Form>(FORMS).insert_one(form).await?;
        Ok(())
    }

    async fn find_form(&self, id: &ObjectId) -> Result<Option<Form>, AppError> {
        Ok(self
            .collection::<Form>(FORMS)
            .find_one(doc! { "_id": *id })
            .await?)
    }

    async fn forms_by_owner(&self, owner_id: &ObjectId) -> Result<Vec<Form>, AppError> {
        let cursor = self
            .collection::<Form>(FORMS)
            .find(doc! { "owner_id": *owner_id })
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl ResponseStore for MongoDB {
    async fn insert_response(&self, response: &FormResponse) -> Result<(), AppError> {
        self.collection::<FormResponse>(RESPONSES)
            .insert_one(response)
            .await?;
        Ok(())
    }

    async fn responses_for_form(&self, form_id: &ObjectId) -> Result<Vec<FormResponse>, AppError> {
        let cursor = self
            .collection::<FormResponse>(RESPONSES)
            .find(doc! { "form_id": *form_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl SessionStore for MongoDB {
    async fn load_session(&self, token: &str) -> Result<Option<SessionState>, AppError> {
        let record = self
            .collection::<SessionRecord>(SESSIONS)
            .find_one(doc! { "token": token })
            .await?;

        // The TTL monitor runs about once a minute, so check the age here too
        let cutoff = BsonDateTime::now().timestamp_millis() - (SESSION_TTL_SECS as i64) * 1000;
        Ok(record
            .filter(|r| r.updated_at.timestamp_millis() >= cutoff)
            .map(|r| r.state))
    }

    async fn save_session(&self, token: &str, state: &SessionState) -> Result<(), AppError> {
        let record = SessionRecord {
            token: token.to_string(),
            state: state.clone(),
            updated_at: BsonDateTime::now(),
        };
        self.collection::<SessionRecord>(SESSIONS)
            .replace_one(doc! { "token": token }, record)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.collection::<SessionRecord>(SESSIONS)
            .delete_one(doc! { "token": token })
            .await?;
        Ok(())
    }
}
