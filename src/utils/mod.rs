// Utility functions
pub mod error;
pub mod form_data;

pub use error::*;
pub use form_data::*;
