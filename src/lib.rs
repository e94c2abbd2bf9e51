//! `dormmail`: scraper for the NCNU dormitory mail board.
//!
//! The board is a single legacy HTML page (usually Big5) listing unclaimed
//! packages as runs of text separated only by full-width spaces. This
//! crate fetches the page, rebuilds structured [`MailRecord`]s from the
//! token stream, and filters them by department or masked recipient name.

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod search;

pub use error::{DormMailError, FetchError, Result};
pub use fetch::{fetch_page, fetch_records};
pub use model::MailRecord;
pub use parser::{parse, ParseOptions};
pub use search::{all_departments, filter_by_department, filter_by_name, MailQuery};
