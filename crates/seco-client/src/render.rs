//! Terminal rendering of responses.

use seco_protocol::{FIELD_DELIMITER, Record, Response};

use crate::error::ClientResult;

/// Renders a response as a summary line followed by one line per record.
///
/// Records are written back in wire form, `?`-joined in schema order.
pub fn text(response: &Response) -> String {
    let mut out = format!(
        "{} {} ({} record{})\n",
        response.status_code,
        response.request_type.name(),
        response.records.len(),
        if response.records.len() == 1 { "" } else { "s" },
    );
    for record in &response.records {
        out.push_str(&record_line(record));
        out.push('\n');
    }
    out
}

/// Renders a value as pretty JSON.
pub fn json<T: serde::Serialize>(value: &T) -> ClientResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn record_line(record: &Record) -> String {
    let schema = record.schema();
    let mut columns: Vec<&str> = schema
        .fields
        .iter()
        .map(|field| record.field(field).unwrap_or_default())
        .collect();
    if let Record::Method(method) = record {
        columns.extend(method.author_ids.iter().map(String::as_str));
    }
    let delimiter = FIELD_DELIMITER.to_string();
    columns.join(delimiter.as_str())
}
