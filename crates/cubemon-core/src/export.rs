//! CSV export of the filtered record set

use chrono::{DateTime, SecondsFormat, Utc};
use cubemon_source::Transaction;

use crate::error::{CoreError, CoreResult};

/// Column headers, in output order
pub const CSV_HEADERS: [&str; 10] = [
    "ID", "Item ID", "Tray ID", "Type", "Location", "Robot", "Quantity", "User", "Status", "Created",
];

/// MIME type of the download
pub const CSV_CONTENT_TYPE: &str = "text/csv";

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize records as CSV: a header row, then one row per record in the
/// given order. Rows are separated by `\n` with no trailing newline; only
/// fields that need it are quoted.
pub fn export_csv(records: &[&Transaction]) -> CoreResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for tx in records {
        let quantity = tx.quantity.to_string();
        let created = format_timestamp(&tx.created_at);
        writer.write_record([
            tx.id.as_str(),
            tx.item_id.as_str(),
            tx.tray_id.as_str(),
            tx.transaction_type.as_str(),
            tx.location_name.code(),
            tx.robot_id.as_str(),
            quantity.as_str(),
            tx.username.as_str(),
            tx.status.as_str(),
            created.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| CoreError::ExportError {
        message: e.to_string(),
    })?;
    let mut content = String::from_utf8(bytes).map_err(|e| CoreError::ExportError {
        message: e.to_string(),
    })?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}

/// Download filename, `transactions-<ISO timestamp>.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("transactions-{}.csv", format_timestamp(&now))
}
