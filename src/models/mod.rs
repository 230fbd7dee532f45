pub mod form;
pub mod response;
pub mod session;
pub mod user;

pub use form::*;
pub use response::*;
pub use session::*;
pub use user::*;

use mongodb::bson::DateTime as BsonDateTime;

/// Human-readable UTC timestamp for pages.
pub fn display_time(at: BsonDateTime) -> String {
    chrono::DateTime::from_timestamp_millis(at.timestamp_millis())
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}
