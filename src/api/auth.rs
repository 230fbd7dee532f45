use crate::{
    app::AppState,
    middleware::Session,
    services::auth_service::{self, LoginRequest, RegisterRequest},
    utils::{AppError, FormData},
    views::{redirect, render, Chrome, LoginPage, RegisterPage},
};
use actix_web::{web, HttpResponse};

/// GET /register
pub async fn register_page(session: Session) -> Result<HttpResponse, AppError> {
    if session.is_logged_in() {
        return Ok(redirect("/dashboard"));
    }

    render(&RegisterPage {
        chrome: Chrome::from_session(&session),
    })
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    session: Session,
    form: FormData,
) -> Result<HttpResponse, AppError> {
    if session.is_logged_in() {
        return Ok(redirect("/dashboard"));
    }

    let request = RegisterRequest {
        name: form.text("name"),
        email: form.text("email"),
        password: form.get("password").unwrap_or_default().to_string(),
    };
    log::info!("📝 POST /register - email: {}", request.email);

    match auth_service::register(state.users.as_ref(), &request, state.bcrypt_cost).await {
        Ok(user) => {
            log::info!("✅ Registration successful: {}", user.email);
            session.success("Registered successfully! You can log in now");
            Ok(redirect("/login"))
        }
        Err(AppError::Validation(msg)) => {
            log::warn!("❌ Registration failed: {} - {}", request.email, msg);
            session.error(msg);
            Ok(redirect("/register"))
        }
        Err(e) => Err(e),
    }
}

/// GET /login
pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    if session.is_logged_in() {
        return Ok(redirect("/dashboard"));
    }

    render(&LoginPage {
        chrome: Chrome::from_session(&session),
    })
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    form: FormData,
) -> Result<HttpResponse, AppError> {
    if session.is_logged_in() {
        return Ok(redirect("/dashboard"));
    }

    let request = LoginRequest {
        email: form.text("email"),
        password: form.get("password").unwrap_or_default().to_string(),
    };
    log::info!("🔐 POST /login - email: {}", request.email);

    match auth_service::login(state.users.as_ref(), &request).await {
        Ok(user) => {
            log::info!("✅ Login successful: {}", request.email);
            session.log_in(user);
            session.success("Logged in successfully!");
            Ok(redirect("/dashboard"))
        }
        Err(AppError::InvalidCredentials) => {
            log::warn!("❌ Login failed: {}", request.email);
            session.error("Wrong email or password");
            Ok(redirect("/login"))
        }
        Err(e) => Err(e),
    }
}

/// GET /logout
pub async fn logout(session: Session) -> HttpResponse {
    if let Some(user) = session.user() {
        log::info!("👋 Logout: {}", user.user_id);
    }
    session.clear();
    session.success("You have been logged out");
    redirect("/")
}

#[cfg(test)]
mod tests {
    use crate::app::{build_app, testing::*};
    use actix_web::{http::StatusCode, test};

    const ADA: [(&str, &str); 3] = [
        ("name", "Ada"),
        ("email", "ada@example.com"),
        ("password", "analytical-engine"),
    ];

    #[actix_web::test]
    async fn register_then_login_then_logout() {
        let (state, store) = memory_state();
        let app = test::init_service(build_app(state)).await;

        let res = test::call_service(&app, post_form("/register", &ADA).to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/login");
        assert_eq!(store.user_count().await, 1);
        let cookie = session_cookie(&res).expect("flash needs a session");

        let req = test::TestRequest::get().uri("/login").cookie(cookie.clone()).to_request();
        let page = body_text(test::call_service(&app, req).await).await;
        assert!(page.contains("Registered successfully"));

        let req = post_form(
            "/login",
            &[("email", " ADA@example.com"), ("password", "analytical-engine")],
        )
        .cookie(cookie.clone())
        .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(location(&res), "/dashboard");
        let anonymous = cookie;
        let cookie = session_cookie(&res).expect("login issues a new session");
        assert_ne!(cookie.value(), anonymous.value());

        // The pre-login token does not carry the identity
        let req = test::TestRequest::get().uri("/dashboard").cookie(anonymous).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(location(&res), "/login");

        // Logged-in visitors skip the auth pages
        for uri in ["/", "/login", "/register"] {
            let req = test::TestRequest::get().uri(uri).cookie(cookie.clone()).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(location(&res), "/dashboard", "{}", uri);
        }

        // The login flash is still pending; logout drops it
        let req = test::TestRequest::get().uri("/logout").cookie(cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(location(&res), "/");
        let logged_out = session_cookie(&res).expect("logout issues a new session");
        assert_ne!(logged_out.value(), cookie.value());

        let req = test::TestRequest::get().uri("/").cookie(logged_out.clone()).to_request();
        let page = body_text(test::call_service(&app, req).await).await;
        assert!(page.contains("You have been logged out"));
        assert!(!page.contains("Logged in successfully!"));

        let req = test::TestRequest::get().uri("/").cookie(logged_out.clone()).to_request();
        let page = body_text(test::call_service(&app, req).await).await;
        assert!(!page.contains("You have been logged out"));

        for stale in [cookie, logged_out] {
            let req = test::TestRequest::get().uri("/dashboard").cookie(stale).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(location(&res), "/login");
        }
    }

    #[actix_web::test]
    async fn duplicate_registration_flashes_and_keeps_one_user() {
        let (state, store) = memory_state();
        let app = test::init_service(build_app(state)).await;

        test::call_service(&app, post_form("/register", &ADA).to_request()).await;

        let res = test::call_service(
            &app,
            post_form(
                "/register",
                &[("name", "Eve"), ("email", "Ada@Example.COM"), ("password", "x")],
            )
            .to_request(),
        )
        .await;
        assert_eq!(location(&res), "/register");
        assert_eq!(store.user_count().await, 1);

        let cookie = session_cookie(&res).unwrap();
        let req = test::TestRequest::get().uri("/register").cookie(cookie).to_request();
        let page = body_text(test::call_service(&app, req).await).await;
        assert!(page.contains("already registered"));
    }

    #[actix_web::test]
    async fn wrong_password_gets_a_generic_message() {
        let (state, _) = memory_state();
        let app = test::init_service(build_app(state)).await;
        test::call_service(&app, post_form("/register", &ADA).to_request()).await;

        for (email, password) in [
            ("ada@example.com", "wrong"),
            ("nobody@example.com", "analytical-engine"),
        ] {
            let res = test::call_service(
                &app,
                post_form("/login", &[("email", email), ("password", password)]).to_request(),
            )
            .await;
            assert_eq!(location(&res), "/login");

            let cookie = session_cookie(&res).unwrap();
            let req = test::TestRequest::get().uri("/login").cookie(cookie.clone()).to_request();
            let page = body_text(test::call_service(&app, req).await).await;
            assert!(page.contains("Wrong email or password"));

            let req = test::TestRequest::get().uri("/dashboard").cookie(cookie).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(location(&res), "/login");
        }
    }
}
