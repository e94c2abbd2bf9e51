//! Core data model types.

pub mod record;

pub use record::MailRecord;
