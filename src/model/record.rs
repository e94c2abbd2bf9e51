//! A single package notice reconstructed from the dorm mail board.

use serde::{Deserialize, Serialize};

/// One unclaimed package or registered-mail notice.
///
/// Every field is kept as the source text; dates and day counts are not
/// parsed because the board is not consistent about their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailRecord {
    /// Sequence / reference number (token right before the date).
    pub id: String,

    /// Arrival date as shown, `YYYY/M/D` or `YYYY/MM/DD`.
    pub arrival_time: String,

    /// Recipient name, usually masked with `Ｏ` (e.g. `王Ｏ明`).
    pub recipient: String,

    /// Logistics company.
    pub carrier: String,

    /// Category label (package / registered mail).
    #[serde(rename = "type")]
    pub kind: String,

    /// Carrier tracking code, may be empty.
    pub tracking_number: String,

    /// Department / class label, e.g. `資工系碩1`.
    pub department: String,

    /// Days since arrival, as shown.
    pub days_since_arrival: String,
}
