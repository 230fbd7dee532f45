use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(String),
    PasswordHash(String),
    Template(String),
    Config(String),
    /// Missing or rejected user input; handlers turn it into a flash message.
    Validation(String),
    InvalidCredentials,
    LoginRequired,
    NotFound(String),
    Forbidden,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::PasswordHash(msg) => write!(f, "Password hashing error: {}", msg),
            AppError::Template(msg) => write!(f, "Template error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Validation(msg) => write!(f, "{}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::LoginRequired => write!(f, "Login required"),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Forbidden => write!(f, "Unauthorized"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::PasswordHash(e.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::LoginRequired => StatusCode::FOUND,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_)
            | AppError::PasswordHash(_)
            | AppError::Template(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::LoginRequired => HttpResponse::Found()
                .insert_header((header::LOCATION, "/login"))
                .finish(),
            AppError::DatabaseError(_)
            | AppError::PasswordHash(_)
            | AppError::Template(_)
            | AppError::Config(_) => {
                log::error!("❌ {}", self);
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal server error")
            }
            _ => HttpResponse::build(self.status_code())
                .content_type("text/plain; charset=utf-8")
                .body(self.to_string()),
        }
    }
}
