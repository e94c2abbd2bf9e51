//! Export mail records to CSV.
//!
//! Output is UTF-8 with BOM so spreadsheet tools pick up the CJK text.

use std::io::Write;
use std::path::Path;

use crate::model::MailRecord;

const COLUMNS: [&str; 8] = [
    "id",
    "arrival_time",
    "recipient",
    "carrier",
    "type",
    "tracking_number",
    "department",
    "days_since_arrival",
];

/// Write `records` to `output_path`, one row per record.
pub fn export_csv(records: &[MailRecord], output_path: &Path, separator: char) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_csv(&mut file, records, separator)?;
    tracing::info!(path = %output_path.display(), rows = records.len(), "Exported CSV");
    Ok(())
}

/// Write the BOM, header and rows to any writer.
pub fn write_csv<W: Write>(out: &mut W, records: &[MailRecord], separator: char) -> std::io::Result<()> {
    out.write_all(&[0xEF, 0xBB, 0xBF])?;

    let sep = separator.to_string();
    writeln!(out, "{}", COLUMNS.join(&sep))?;

    for r in records {
        let fields = [
            &r.id,
            &r.arrival_time,
            &r.recipient,
            &r.carrier,
            &r.kind,
            &r.tracking_number,
            &r.department,
            &r.days_since_arrival,
        ];
        let row: Vec<String> = fields.iter().map(|f| escape(f, separator)).collect();
        writeln!(out, "{}", row.join(&sep))?;
    }
    Ok(())
}

/// Quote a field (RFC 4180) when it holds the separator, a quote or a line break.
fn escape(value: &str, separator: char) -> String {
    if value.contains(separator) || value.contains(['"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MailRecord {
        MailRecord {
            id: "A123".into(),
            arrival_time: "2025/10/01".into(),
            recipient: "王Ｏ明".into(),
            carrier: "順豐".into(),
            kind: "包裹".into(),
            tracking_number: "SF123456".into(),
            department: "資工系碩1".into(),
            days_since_arrival: "3".into(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain", ','), "plain");
        assert_eq!(escape("a,b", ','), "\"a,b\"");
        assert_eq!(escape("a,b", ';'), "a,b");
        assert_eq!(escape("say \"hi\"", ','), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_csv_layout() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record()], ',').unwrap();
        assert!(buf.starts_with(&[0xEF, 0xBB, 0xBF]));
        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,arrival_time,recipient"));
        assert_eq!(lines[1], "A123,2025/10/01,王Ｏ明,順豐,包裹,SF123456,資工系碩1,3");
    }

    #[test]
    fn test_export_csv_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mail.csv");
        export_csv(&[record(), record()], &path, ';').unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("A123;2025/10/01"));
    }
}
