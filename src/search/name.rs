//! Recipient name matching against the board's masked names.
//!
//! The board hides one character of every name with `Ｏ`, e.g. `武Ｏ星`.
//! A pattern may be the masked form itself, a bare surname, or the full
//! unmasked name, which is converted to the masked form before comparing.

use crate::model::MailRecord;

/// Mask character the board prints (U+FF2F FULLWIDTH LATIN CAPITAL O).
pub const MASK: char = 'Ｏ';

/// Characters treated as a mask when typed by a user.
pub const MASK_CHARS: [char; 2] = [MASK, 'O'];

/// Keep records whose recipient matches `pattern`.
///
/// Each record is tested once, so a record satisfying several rules
/// still appears a single time. Input order is preserved.
pub fn filter_by_name(records: &[MailRecord], pattern: &str) -> Vec<MailRecord> {
    let pattern = pattern.trim();
    if records.is_empty() || pattern.is_empty() {
        return Vec::new();
    }
    let matcher = NameMatcher::new(pattern);
    records
        .iter()
        .filter(|r| matcher.matches(&r.recipient))
        .cloned()
        .collect()
}

/// Precomputed forms of one name pattern.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    pattern: String,
    len: usize,
    masked: Vec<String>,
    unmasked: String,
}

impl NameMatcher {
    pub fn new(pattern: &str) -> Self {
        let pattern = pattern.trim().to_string();
        let len = pattern.chars().count();
        let masked = if len >= 2 && !has_mask(&pattern) {
            masked_forms(&pattern)
        } else {
            Vec::new()
        };
        let unmasked = strip_mask(&pattern);
        Self {
            pattern,
            len,
            masked,
            unmasked,
        }
    }

    /// Rules, in order: exact, surname prefix, masked reconstruction,
    /// mask-insensitive containment.
    pub fn matches(&self, recipient: &str) -> bool {
        if self.pattern.is_empty() {
            return false;
        }
        if self.pattern == recipient {
            return true;
        }
        if self.len == 1 {
            return recipient.starts_with(self.pattern.as_str());
        }
        if self.masked.iter().any(|m| m == recipient) {
            return true;
        }
        self.contains_ignoring_mask(recipient)
    }

    fn contains_ignoring_mask(&self, recipient: &str) -> bool {
        let other = strip_mask(recipient);
        if self.unmasked.chars().count() < 2 || other.chars().count() < 2 {
            return false;
        }
        other.contains(self.unmasked.as_str()) || self.unmasked.contains(other.as_str())
    }
}

/// Masked forms the board could print for an unmasked full name.
///
/// Three chars mask the middle one (`武星星` → `武Ｏ星`). Four chars are
/// ambiguous between a two-char surname and a two-char given name, so
/// both `p0p1Ｏp3` and `p0Ｏp2p3` are returned. Other lengths have none.
pub fn masked_forms(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    match chars.as_slice() {
        [a, _, c] => vec![[*a, MASK, *c].iter().collect()],
        [a, b, c, d] => {
            let mut forms: Vec<String> = vec![
                [*a, *b, MASK, *d].iter().collect(),
                [*a, MASK, *c, *d].iter().collect(),
            ];
            forms.dedup();
            forms
        }
        _ => Vec::new(),
    }
}

fn has_mask(s: &str) -> bool {
    s.chars().any(|c| MASK_CHARS.contains(&c))
}

fn strip_mask(s: &str) -> String {
    s.chars().filter(|c| !MASK_CHARS.contains(c)).collect()
}
