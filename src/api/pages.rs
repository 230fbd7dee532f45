use crate::{
    middleware::Session,
    utils::AppError,
    views::{redirect, render, Chrome, IndexPage},
};
use actix_web::HttpResponse;

/// GET / - landing page, or the dashboard for logged-in users
pub async fn index(session: Session) -> Result<HttpResponse, AppError> {
    if session.is_logged_in() {
        return Ok(redirect("/dashboard"));
    }

    render(&IndexPage {
        chrome: Chrome::from_session(&session),
    })
}
