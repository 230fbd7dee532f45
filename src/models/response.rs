use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Valor de uma resposta; o formato depende do tipo do campo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// `checkbox`
    Flag(bool),
    /// `checkbox_group`
    Choices(Vec<String>),
    /// Every single-value field; `None` when nothing was posted.
    Text(Option<String>),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Flag(true) => write!(f, "Yes"),
            AnswerValue::Flag(false) => write!(f, "No"),
            AnswerValue::Choices(values) => write!(f, "{}", values.join(", ")),
            AnswerValue::Text(Some(value)) => write!(f, "{}", value),
            AnswerValue::Text(None) => Ok(()),
        }
    }
}

pub type Answers = BTreeMap<String, AnswerValue>;

/// Resposta enviada a um formulário público (coleção `responses`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub form_id: ObjectId,
    pub answers: Answers,
    pub created_at: BsonDateTime,
}

impl FormResponse {
    pub fn new(form_id: ObjectId, answers: Answers) -> Self {
        Self {
            id: ObjectId::new(),
            form_id,
            answers,
            created_at: BsonDateTime::now(),
        }
    }
}
