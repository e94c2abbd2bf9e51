//! Dorm mail page parsing: HTML to body text, full-width-space tokens,
//! and fixed-window record reconstruction around date anchors.

pub mod records;
pub mod text;
pub mod tokens;

use crate::model::MailRecord;

pub use records::{build_records, locate_records, LocatedRecord};
pub use tokens::{is_date_anchor, tokenize, FULLWIDTH_SPACE};

/// Knobs for anchor recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    min_year: i32,
    max_year: i32,
}

impl ParseOptions {
    /// Accept anchors whose year lies in `min_year..=max_year`.
    ///
    /// The bounds are swapped if given in the wrong order.
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self {
            min_year: min_year.min(max_year),
            max_year: min_year.max(max_year),
        }
    }

    /// Whether `year` falls inside the window.
    pub fn accepts_year(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    pub fn min_year(&self) -> i32 {
        self.min_year
    }

    pub fn max_year(&self) -> i32 {
        self.max_year
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        crate::config::ParserConfig::default().options()
    }
}

/// Parse a decoded dorm mail page into records, in document order.
///
/// Never fails: a page without a body or without anchors yields an
/// empty list.
pub fn parse(html: &str, options: &ParseOptions) -> Vec<MailRecord> {
    let text = text::body_text(html);
    let tokens = tokenize(&text);
    tracing::debug!(tokens = tokens.len(), "Tokenized page body");
    build_records(&tokens, options)
}
