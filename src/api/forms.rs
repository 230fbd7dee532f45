use crate::{
    app::AppState,
    middleware::{CurrentUser, Session},
    models::{CreateFormRequest, FieldDraft},
    services::form_service,
    utils::{AppError, FormData},
    views::{redirect, render, Chrome, NewFormPage, PublicFormPage, ResponsesPage, ThanksPage},
};
use actix_web::{web, HttpResponse};

/// GET /forms/new
pub async fn new_form_page(session: Session, _user: CurrentUser) -> Result<HttpResponse, AppError> {
    render(&NewFormPage::new(Chrome::from_session(&session)))
}

/// POST /forms/new
pub async fn create_form(
    state: web::Data<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    form: FormData,
) -> Result<HttpResponse, AppError> {
    let request = CreateFormRequest {
        title: form.text("title"),
        description: form.get("description").map(str::to_string),
        fields: FieldDraft::from_columns(
            form.get_all("field_label[]"),
            form.get_all("field_type[]"),
            form.get_all("field_options[]"),
        ),
    };

    match form_service::create_form(state.forms.as_ref(), &user, &request).await {
        Ok(_) => {
            session.success("Form created");
            Ok(redirect("/dashboard"))
        }
        Err(AppError::Validation(msg)) => {
            session.error(msg);
            Ok(redirect("/forms/new"))
        }
        Err(e) => Err(e),
    }
}

/// GET /f/{form_id} - public form
pub async fn public_form(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let form = form_service::find_form(state.forms.as_ref(), &path).await?;
    render(&PublicFormPage::new(Chrome::from_session(&session), form))
}

/// POST /f/{form_id} - store one response
pub async fn submit_public_form(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
    posted: FormData,
) -> Result<HttpResponse, AppError> {
    let form = form_service::find_form(state.forms.as_ref(), &path).await?;
    form_service::submit_response(state.responses.as_ref(), &form, &posted).await?;

    render(&ThanksPage {
        chrome: Chrome::from_session(&session),
        title: form.title,
    })
}

/// GET /forms/{form_id}/responses - owner only
pub async fn form_responses(
    state: web::Data<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (form, responses) = form_service::responses_for_owner(
        state.forms.as_ref(),
        state.responses.as_ref(),
        &path,
        &user,
    )
    .await?;

    render(&ResponsesPage::new(
        Chrome::from_session(&session),
        &form,
        &responses,
    ))
}
