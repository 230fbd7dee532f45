use crate::{
    api,
    database::{FormStore, ResponseStore, SessionStore, UserStore},
    middleware::{SecurityHeaders, SessionMiddleware},
};
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use std::sync::Arc;

/// Store handles and settings shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub forms: Arc<dyn FormStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

impl AppState {
    /// Uses one backend for all four stores.
    pub fn with_backend<B>(backend: Arc<B>, bcrypt_cost: u32, cookie_secure: bool) -> Self
    where
        B: UserStore + FormStore + ResponseStore + SessionStore + 'static,
    {
        Self {
            users: backend.clone(),
            forms: backend.clone(),
            responses: backend.clone(),
            sessions: backend,
            bcrypt_cost,
            cookie_secure,
        }
    }
}

pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let sessions = SessionMiddleware::new(state.sessions.clone(), state.cookie_secure);

    App::new()
        .app_data(web::Data::new(state))
        .wrap(sessions)
        .wrap(SecurityHeaders)
        .configure(api::routes)
}
