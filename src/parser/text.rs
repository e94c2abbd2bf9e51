//! Visible text extraction from the page body.

use scraper::{Html, Selector};

/// Concatenate every text node under `<body>`, markup removed.
///
/// Entities are resolved by the HTML parser, so `&#12288;` arrives as a
/// real U+3000. Returns an empty string when there is no body.
pub fn body_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    match doc.select(&selector).next() {
        Some(body) => body.text().collect(),
        None => {
            tracing::debug!("Document has no body element");
            String::new()
        }
    }
}
