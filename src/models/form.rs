use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Tipo de campo suportado pelo construtor de formulários
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Number,
    Date,
    Checkbox,
    CheckboxGroup,
    Select,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Number,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::CheckboxGroup,
        FieldType::Select,
    ];

    /// Builder input is free text; anything unrecognised becomes a text field.
    pub fn parse(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == raw.trim())
            .unwrap_or(FieldType::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::CheckboxGroup => "checkbox_group",
            FieldType::Select => "select",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "Short text",
            FieldType::Textarea => "Paragraph",
            FieldType::Email => "Email",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Checkbox => "Checkbox",
            FieldType::CheckboxGroup => "Checkbox group",
            FieldType::Select => "Dropdown",
        }
    }

    pub fn takes_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::CheckboxGroup)
    }

    pub fn is_checkbox(&self) -> bool {
        *self == FieldType::Checkbox
    }

    pub fn is_checkbox_group(&self) -> bool {
        *self == FieldType::CheckboxGroup
    }

    pub fn is_select(&self) -> bool {
        *self == FieldType::Select
    }

    pub fn is_textarea(&self) -> bool {
        *self == FieldType::Textarea
    }

    /// `type` attribute of the `<input>` rendered for single-value fields.
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Date => "date",
            _ => "text",
        }
    }
}

/// Campo de um formulário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    /// Technical name used as the answer key; unique within a form.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Formulário (armazenado no MongoDB, coleção `forms`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner_id: ObjectId,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    pub created_at: BsonDateTime,
}

impl Form {
    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        self.owner_id == *user_id
    }
}

/// One row of the field builder before it is turned into a [`Field`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDraft {
    pub label: String,
    pub kind: String,
    pub options: String,
}

impl FieldDraft {
    /// Rebuilds rows from the builder's parallel `field_label[]`, `field_type[]`
    /// and `field_options[]` columns. Labels drive the row count; a missing
    /// type or options entry reads as empty.
    pub fn from_columns(labels: Vec<String>, kinds: Vec<String>, options: Vec<String>) -> Vec<Self> {
        let mut kinds = kinds.into_iter();
        let mut options = options.into_iter();

        labels
            .into_iter()
            .map(|label| FieldDraft {
                label,
                kind: kinds.next().unwrap_or_default(),
                options: options.next().unwrap_or_default(),
            })
            .collect()
    }
}

/// Request para criar formulário
#[derive(Debug, Clone)]
pub struct CreateFormRequest {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDraft>,
}
