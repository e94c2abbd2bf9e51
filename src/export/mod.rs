//! Export functionality: JSON envelope and CSV.

pub mod csv;
pub mod json;

pub use json::MailResponse;
