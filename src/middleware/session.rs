use crate::{
    database::{SessionStore, SESSION_TTL_SECS},
    models::{Flash, FlashLevel, SessionState, SessionUser},
    utils::AppError,
};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "form_session";

/// Per-request view of the server-side session.
///
/// The middleware loads it before the handler runs and persists it afterwards
/// if the handler changed anything.
#[derive(Clone)]
pub struct Session(Rc<RefCell<SessionInner>>);

#[derive(Default)]
struct SessionInner {
    state: SessionState,
    changed: bool,
    /// Identity changed; the presented token must not survive.
    renew: bool,
}

impl Session {
    fn from_state(state: SessionState) -> Self {
        Session(Rc::new(RefCell::new(SessionInner {
            state,
            ..SessionInner::default()
        })))
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.0.borrow().state.user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.0.borrow().state.user.is_some()
    }

    pub fn log_in(&self, user: SessionUser) {
        let mut inner = self.0.borrow_mut();
        inner.state.user = Some(user);
        inner.changed = true;
        inner.renew = true;
    }

    /// Drops the identity and any pending messages.
    pub fn clear(&self) {
        let mut inner = self.0.borrow_mut();
        inner.state = SessionState::default();
        inner.changed = true;
        inner.renew = true;
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let mut inner = self.0.borrow_mut();
        inner.state.flashes.push(Flash {
            level,
            message: message.into(),
        });
        inner.changed = true;
    }

    pub fn success(&self, message: impl Into<String>) {
        self.flash(FlashLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.flash(FlashLevel::Error, message);
    }

    /// Pending messages; each is returned once.
    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut inner = self.0.borrow_mut();
        if inner.state.flashes.is_empty() {
            return Vec::new();
        }
        inner.changed = true;
        std::mem::take(&mut inner.state.flashes)
    }

    /// State to persist, and whether it needs a fresh token.
    fn changed_state(&self) -> Option<(SessionState, bool)> {
        let inner = self.0.borrow();
        inner.changed.then(|| (inner.state.clone(), inner.renew))
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Session>()
                .cloned()
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("Session middleware is not installed")),
        )
    }
}

/// The logged-in user; anonymous requests are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<Session>().and_then(Session::user);
        ready(match user {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(AppError::LoginRequired.into()),
        })
    }
}

pub struct SessionMiddleware {
    store: Arc<dyn SessionStore>,
    cookie_secure: bool,
}

impl SessionMiddleware {
    pub fn new(store: Arc<dyn SessionStore>, cookie_secure: bool) -> Self {
        Self {
            store,
            cookie_secure,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            store: Arc::clone(&self.store),
            cookie_secure: self.cookie_secure,
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn SessionStore>,
    cookie_secure: bool,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let store = Arc::clone(&self.store);
        let cookie_secure = self.cookie_secure;

        Box::pin(async move {
            let presented = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

            let (token, state) = match presented {
                Some(token) => match store.load_session(&token).await? {
                    Some(state) => (Some(token), state),
                    None => {
                        log::debug!("Unknown or expired session token, starting fresh");
                        (None, SessionState::default())
                    }
                },
                None => (None, SessionState::default()),
            };

            let session = Session::from_state(state);
            req.extensions_mut().insert(session.clone());

            let mut res = service.call(req).await?;

            if let Some((state, renew)) = session.changed_state() {
                let token = match token {
                    Some(old) if renew => {
                        store.delete_session(&old).await?;
                        new_token()
                    }
                    Some(current) => current,
                    None => new_token(),
                };
                store.save_session(&token, &state).await?;
                res.response_mut()
                    .add_cookie(&session_cookie(token, cookie_secure))?;
            }

            Ok::<_, Error>(res)
        })
    }
}

fn new_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(SESSION_TTL_SECS as i64))
        .finish()
}
