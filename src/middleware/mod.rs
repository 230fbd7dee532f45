pub mod security_headers;
pub mod session;

pub use security_headers::SecurityHeaders;
pub use session::{CurrentUser, Session, SessionMiddleware};
