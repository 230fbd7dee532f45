pub mod auth;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod pages;

use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_page))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::get().to(auth::logout))
        .route("/dashboard", web::get().to(dashboard::dashboard))
        .service(
            web::resource("/forms/new")
                .route(web::get().to(forms::new_form_page))
                .route(web::post().to(forms::create_form)),
        )
        .route("/forms/{form_id}/responses", web::get().to(forms::form_responses))
        .service(
            web::resource("/f/{form_id}")
                .route(web::get().to(forms::public_form))
                .route(web::post().to(forms::submit_public_form)),
        );
}
