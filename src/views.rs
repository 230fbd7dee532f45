//! Page models rendered by askama; templates live in `templates/`.

use crate::{
    middleware::Session,
    models::{display_time, FieldType, Flash, Form, FormResponse},
    utils::AppError,
};
use actix_web::{http::header, HttpResponse};
use askama::Template;

/// Parts of the layout every page shares.
pub struct Chrome {
    pub user_name: Option<String>,
    pub flashes: Vec<Flash>,
}

impl Chrome {
    /// Consumes the session's pending flash messages.
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_name: session.user().map(|u| u.user_name),
            flashes: session.take_flashes(),
        }
    }
}

pub fn render(page: &impl Template) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page.render()?))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub chrome: Chrome,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub chrome: Chrome,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub chrome: Chrome,
}

pub struct FormSummary {
    pub id: String,
    pub title: String,
    pub field_count: usize,
    pub created_at: String,
}

impl From<&Form> for FormSummary {
    fn from(form: &Form) -> Self {
        Self {
            id: form.id.to_hex(),
            title: form.title.clone(),
            field_count: form.fields.len(),
            created_at: display_time(form.created_at),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub chrome: Chrome,
    pub name: String,
    pub forms: Vec<FormSummary>,
}

#[derive(Template)]
#[template(path = "form_new.html")]
pub struct NewFormPage {
    pub chrome: Chrome,
    pub field_types: Vec<FieldType>,
}

impl NewFormPage {
    pub fn new(chrome: Chrome) -> Self {
        Self {
            chrome,
            field_types: FieldType::ALL.to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "form_public.html")]
pub struct PublicFormPage {
    pub chrome: Chrome,
    pub form_id: String,
    pub description: String,
    pub form: Form,
}

impl PublicFormPage {
    pub fn new(chrome: Chrome, form: Form) -> Self {
        Self {
            chrome,
            form_id: form.id.to_hex(),
            description: form.description.clone().unwrap_or_default(),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "form_thanks.html")]
pub struct ThanksPage {
    pub chrome: Chrome,
    pub title: String,
}

pub struct ResponseRow {
    pub submitted_at: String,
    pub cells: Vec<String>,
}

#[derive(Template)]
#[template(path = "form_responses.html")]
pub struct ResponsesPage {
    pub chrome: Chrome,
    pub title: String,
    pub form_id: String,
    pub headers: Vec<String>,
    pub rows: Vec<ResponseRow>,
}

impl ResponsesPage {
    /// One column per field, in field order; answers for unknown keys are not shown.
    pub fn new(chrome: Chrome, form: &Form, responses: &[FormResponse]) -> Self {
        let rows = responses
            .iter()
            .map(|response| ResponseRow {
                submitted_at: display_time(response.created_at),
                cells: form
                    .fields
                    .iter()
                    .map(|field| {
                        response
                            .answers
                            .get(&field.name)
                            .map(|v| v.to_string())
                            .unwrap_or_default()
                    })
                    .collect(),
            })
            .collect();

        Self {
            chrome,
            title: form.title.clone(),
            form_id: form.id.to_hex(),
            headers: form.fields.iter().map(|f| f.label.clone()).collect(),
            rows,
        }
    }
}
