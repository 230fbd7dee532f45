use crate::{
    app::AppState,
    middleware::{CurrentUser, Session},
    services::form_service,
    utils::AppError,
    views::{render, Chrome, DashboardPage, FormSummary},
};
use actix_web::{web, HttpResponse};

/// GET /dashboard - forms owned by the logged-in user, newest first
pub async fn dashboard(
    state: web::Data<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> Result<HttpResponse, AppError> {
    let forms = form_service::forms_for_owner(state.forms.as_ref(), &user).await?;

    render(&DashboardPage {
        chrome: Chrome::from_session(&session),
        name: user.user_name,
        forms: forms.iter().map(FormSummary::from).collect(),
    })
}
