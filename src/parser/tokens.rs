//! Tokenizer for the full-width-space delimited board text.

use super::ParseOptions;

/// The board's only field delimiter (U+3000 IDEOGRAPHIC SPACE).
pub const FULLWIDTH_SPACE: char = '\u{3000}';

/// Split on U+3000, trim each piece and drop the empty ones.
///
/// Trimming uses Unicode whitespace, so stray newlines and `&nbsp;`
/// between table cells disappear as well.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(FULLWIDTH_SPACE)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// A token is a date anchor if it has a `/` and embeds a year from the
/// configured window as four consecutive ASCII digits.
pub fn is_date_anchor(token: &str, options: &ParseOptions) -> bool {
    token.contains('/') && embedded_years(token).into_iter().any(|y| options.accepts_year(y))
}

/// Every 4-digit window in `token`, read as a number.
fn embedded_years(token: &str) -> Vec<i32> {
    let chars: Vec<char> = token.chars().collect();
    chars
        .windows(4)
        .filter_map(|w| {
            w.iter()
                .try_fold(0i32, |acc, c| c.to_digit(10).map(|d| acc * 10 + d as i32))
        })
        .collect()
}
