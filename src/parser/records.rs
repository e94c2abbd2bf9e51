//! Record reconstruction over the token stream.
//!
//! The board prints each notice as
//! `　編號　日期　收件人　郵寄公司　種類　追蹤號碼　系所　天數　`
//! with no markup around it, so records are recovered positionally: the
//! date is the anchor, the id sits right before it, and the six fields
//! after it are taken verbatim.

use crate::model::MailRecord;

use super::tokens::is_date_anchor;
use super::ParseOptions;

/// Fields following the anchor in one notice.
const TRAILING_FIELDS: usize = 6;

/// Tokens the scan skips after an accepted or rejected anchor.
pub const WINDOW_LEN: usize = TRAILING_FIELDS + 1;

/// Longest recipient (in chars) still taken for a person's name.
const MAX_RECIPIENT_CHARS: usize = 10;

/// A record together with the token index of its date anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRecord {
    pub anchor: usize,
    pub record: MailRecord,
}

/// Reconstruct records from `tokens`, in scan order.
pub fn build_records<S: AsRef<str>>(tokens: &[S], options: &ParseOptions) -> Vec<MailRecord> {
    locate_records(tokens, options)
        .into_iter()
        .map(|located| located.record)
        .collect()
}

/// Like [`build_records`], but keeps the anchor position of each record.
///
/// Windows never overlap: once an anchor opens a window the scan resumes
/// `WINDOW_LEN` tokens later, whether or not the record was accepted.
pub fn locate_records<S: AsRef<str>>(tokens: &[S], options: &ParseOptions) -> Vec<LocatedRecord> {
    let mut found = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let opens_window = i > 0
            && i + TRAILING_FIELDS < tokens.len()
            && is_date_anchor(tokens[i].as_ref(), options);

        if !opens_window {
            i += 1;
            continue;
        }

        let record = record_at(tokens, i);
        if is_plausible(&record) {
            tracing::debug!(id = %record.id, recipient = %record.recipient, "Parsed mail record");
            found.push(LocatedRecord { anchor: i, record });
        } else {
            tracing::debug!(anchor = i, "Rejected implausible record window");
        }
        i += WINDOW_LEN;
    }

    tracing::info!(count = found.len(), "Parsed mail records");
    found
}

/// Map the window around anchor `i` onto a record.
///
/// Caller guarantees `0 < i` and `i + TRAILING_FIELDS < tokens.len()`.
fn record_at<S: AsRef<str>>(tokens: &[S], i: usize) -> MailRecord {
    let field = |k: usize| tokens[k].as_ref().trim().to_string();
    MailRecord {
        id: field(i - 1),
        arrival_time: field(i),
        recipient: field(i + 1),
        carrier: field(i + 2),
        kind: field(i + 3),
        tracking_number: field(i + 4),
        department: field(i + 5),
        days_since_arrival: field(i + 6),
    }
}

/// Reject windows that landed on page furniture instead of a notice.
fn is_plausible(record: &MailRecord) -> bool {
    let name_len = record.recipient.chars().count();
    !record.id.is_empty() && (1..=MAX_RECIPIENT_CHARS).contains(&name_len)
}
