use crate::{
    database::{FormStore, ResponseStore},
    models::{
        AnswerValue, Answers, CreateFormRequest, Field, FieldDraft, FieldType, Form,
        FormResponse, SessionUser,
    },
    utils::{AppError, FormData},
};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::collections::HashSet;

fn form_not_found() -> AppError {
    AppError::NotFound("Form not found".to_string())
}

/// Technical name for a label: spaces become underscores, then lowercase.
pub fn field_name(label: &str) -> String {
    label.replace(' ', "_").to_lowercase()
}

/// Comma separated choices, trimmed, empty fragments dropped.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns builder rows into stored fields.
///
/// Rows with a blank label are skipped. Repeated names get `_2`, `_3`, ...
/// so every answer has its own key, both in the stored answers and in the
/// posted body (a checkbox group posts under `<name>[]`).
pub fn build_fields(drafts: &[FieldDraft]) -> Vec<Field> {
    let mut names = HashSet::new();
    let mut posted_keys = HashSet::new();
    let mut fields = Vec::new();

    for draft in drafts {
        let label = draft.label.trim();
        if label.is_empty() {
            continue;
        }

        let kind = FieldType::parse(&draft.kind);
        let options = if kind.takes_options() {
            parse_options(&draft.options)
        } else {
            Vec::new()
        };

        let base = field_name(label);
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) || posted_keys.contains(&posted_key(&name, kind)) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        names.insert(name.clone());
        posted_keys.insert(posted_key(&name, kind));

        fields.push(Field {
            label: label.to_string(),
            name,
            kind,
            required: false,
            options,
        });
    }

    fields
}

pub async fn create_form(
    forms: &dyn FormStore,
    owner: &SessionUser,
    request: &CreateFormRequest,
) -> Result<Form, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("A form title is required".to_string()));
    }

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let form = Form {
        id: ObjectId::new(),
        owner_id: owner.user_id,
        title: title.to_string(),
        description,
        fields: build_fields(&request.fields),
        created_at: BsonDateTime::now(),
    };

    forms.insert_form(&form).await?;
    log::info!(
        "📝 Form {} created by {} with {} field(s)",
        form.id,
        owner.user_id,
        form.fields.len()
    );

    Ok(form)
}

/// Looks a form up by its path segment. Malformed ids read as missing.
pub async fn find_form(forms: &dyn FormStore, raw_id: &str) -> Result<Form, AppError> {
    let id = ObjectId::parse_str(raw_id).map_err(|_| form_not_found())?;
    forms.find_form(&id).await?.ok_or_else(form_not_found)
}

pub async fn forms_for_owner(forms: &dyn FormStore, owner: &SessionUser) -> Result<Vec<Form>, AppError> {
    forms.forms_by_owner(&owner.user_id).await
}

/// Body key a field's answer arrives under.
fn posted_key(name: &str, kind: FieldType) -> String {
    if kind == FieldType::CheckboxGroup {
        format!("{}[]", name)
    } else {
        name.to_string()
    }
}

/// Maps posted values onto the form's fields by type.
pub fn collect_answers(fields: &[Field], posted: &FormData) -> Answers {
    fields
        .iter()
        .map(|field| {
            let value = match field.kind {
                FieldType::Checkbox => {
                    AnswerValue::Flag(posted.get(&field.name).is_some_and(|v| !v.is_empty()))
                }
                FieldType::CheckboxGroup => {
                    AnswerValue::Choices(posted.get_all(&posted_key(&field.name, field.kind)))
                }
                _ => AnswerValue::Text(posted.get(&field.name).map(str::to_string)),
            };
            (field.name.clone(), value)
        })
        .collect()
}

pub async fn submit_response(
    responses: &dyn ResponseStore,
    form: &Form,
    posted: &FormData,
) -> Result<FormResponse, AppError> {
    let response = FormResponse::new(form.id, collect_answers(&form.fields, posted));
    responses.insert_response(&response).await?;
    log::info!("📨 Response {} stored for form {}", response.id, form.id);
    Ok(response)
}

/// Responses of a form, only for its owner.
pub async fn responses_for_owner(
    forms: &dyn FormStore,
    responses: &dyn ResponseStore,
    raw_form_id: &str,
    user: &SessionUser,
) -> Result<(Form, Vec<FormResponse>), AppError> {
    let form = find_form(forms, raw_form_id).await?;

    if !form.is_owned_by(&user.user_id) {
        log::warn!(
            "🚫 User {} tried to read responses of form {} owned by {}",
            user.user_id,
            form.id,
            form.owner_id
        );
        return Err(AppError::Forbidden);
    }

    let list = responses.responses_for_form(&form.id).await?;
    Ok((form, list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn draft(label: &str, kind: &str, options: &str) -> FieldDraft {
        FieldDraft {
            label: label.into(),
            kind: kind.into(),
            options: options.into(),
        }
    }

    fn owner() -> SessionUser {
        SessionUser {
            user_id: ObjectId::new(),
            user_name: "Ada".into(),
        }
    }

    #[test]
    fn blank_labels_are_skipped_and_options_parsed() {
        let fields = build_fields(&[
            draft("Name", "text", ""),
            draft("", "text", ""),
            draft("Color", "select", "red, blue"),
        ]);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "name");
        assert!(fields[0].options.is_empty());
        assert_eq!(fields[1].name, "color");
        assert_eq!(fields[1].kind, FieldType::Select);
        assert_eq!(fields[1].options, vec!["red", "blue"]);
        assert!(fields.iter().all(|f| !f.required));
    }

    #[test]
    fn options_only_for_choice_fields() {
        let fields = build_fields(&[
            draft("Notes", "textarea", "a,b"),
            draft("Toppings", "checkbox_group", " cheese, ,olives ,"),
        ]);
        assert!(fields[0].options.is_empty());
        assert_eq!(fields[1].options, vec!["cheese", "olives"]);
    }

    #[test]
    fn names_replace_spaces_and_lowercase() {
        let fields = build_fields(&[draft("  Favourite Colour ", "text", "")]);
        assert_eq!(fields[0].label, "Favourite Colour");
        assert_eq!(fields[0].name, "favourite_colour");
    }

    #[test]
    fn duplicate_labels_get_distinct_names() {
        let fields = build_fields(&[
            draft("Phone", "text", ""),
            draft("phone", "text", ""),
            draft("Phone", "text", ""),
            draft("phone_2", "text", ""),
        ]);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["phone", "phone_2", "phone_3", "phone_2_2"]);
    }

    #[test]
    fn group_and_bracketed_label_never_share_a_body_key() {
        let fields = build_fields(&[
            draft("x", "checkbox_group", "a,b"),
            draft("x[]", "text", ""),
        ]);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "x[]_2"]);

        let answers = collect_answers(&fields, &FormData::parse(b"x%5B%5D=a"));
        assert_eq!(answers["x"], AnswerValue::Choices(vec!["a".into()]));
        assert_eq!(answers["x[]_2"], AnswerValue::Text(None));

        let fields = build_fields(&[
            draft("x[]", "text", ""),
            draft("x", "checkbox_group", "a,b"),
        ]);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x[]", "x_2"]);
    }

    #[test]
    fn answers_follow_field_types() {
        let fields = build_fields(&[
            draft("Agree", "checkbox", ""),
            draft("Colors", "checkbox_group", "red,green,blue"),
            draft("Name", "text", ""),
            draft("Age", "number", ""),
        ]);
        let posted = FormData::parse(b"colors%5B%5D=red&colors%5B%5D=blue&name=Ada");

        let answers = collect_answers(&fields, &posted);
        assert_eq!(answers["agree"], AnswerValue::Flag(false));
        assert_eq!(
            answers["colors"],
            AnswerValue::Choices(vec!["red".into(), "blue".into()])
        );
        assert_eq!(answers["name"], AnswerValue::Text(Some("Ada".into())));
        assert_eq!(answers["age"], AnswerValue::Text(None));
    }

    #[test]
    fn checked_checkbox_is_true() {
        let fields = build_fields(&[draft("Agree", "checkbox", "")]);
        let answers = collect_answers(&fields, &FormData::parse(b"agree=on"));
        assert_eq!(answers["agree"], AnswerValue::Flag(true));
    }

    #[tokio::test]
    async fn title_is_required() {
        let store = MemoryStore::new();
        let request = CreateFormRequest {
            title: "   ".into(),
            description: None,
            fields: vec![],
        };
        assert!(matches!(
            create_form(&store, &owner(), &request).await,
            Err(AppError::Validation(_))
        ));
        assert!(store.forms_by_owner(&ObjectId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let unknown = ObjectId::new().to_hex();
        for raw in ["not-an-id", unknown.as_str()] {
            assert!(matches!(
                find_form(&store, raw).await,
                Err(AppError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn only_the_owner_reads_responses() {
        let store = MemoryStore::new();
        let ada = owner();
        let eve = owner();
        let form = create_form(
            &store,
            &ada,
            &CreateFormRequest {
                title: "Survey".into(),
                description: Some("  ".into()),
                fields: vec![draft("Name", "text", "")],
            },
        )
        .await
        .unwrap();
        assert_eq!(form.description, None);

        submit_response(&store, &form, &FormData::parse(b"name=one")).await.unwrap();
        submit_response(&store, &form, &FormData::parse(b"name=two")).await.unwrap();

        let id = form.id.to_hex();
        assert!(matches!(
            responses_for_owner(&store, &store, &id, &eve).await,
            Err(AppError::Forbidden)
        ));

        let (_, list) = responses_for_owner(&store, &store, &id, &ada).await.unwrap();
        let names: Vec<_> = list.iter().map(|r| r.answers["name"].to_string()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
