//! Response envelope and the schema-driven field decoder.
//!
//! A response is a status line followed by zero or more `?`-delimited record
//! lines:
//!
//! ```text
//! 200\n
//! <col 0>?<col 1>?...\n
//! ...
//! ```
//!
//! A body consisting only of `No results found.` is a valid empty result.

use serde::Serialize;
use tracing::debug;

use crate::error::{ProtocolError, ProtocolResult};
use crate::request::RequestType;
use crate::schema::{AuthorRecord, MethodRecord, ProjectRecord, Record, Schema, schema_for};

/// Line the server sends when a lookup matched nothing.
pub const NO_RESULTS: &str = "No results found.";

/// Column delimiter within a record line.
pub const FIELD_DELIMITER: char = '?';

/// Classification of a response status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    ServerError,
    Unknown(i32),
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        match code {
            200 => Status::Ok,
            400 => Status::BadRequest,
            500 => Status::ServerError,
            other => Status::Unknown(other),
        }
    }
}

/// A fully received response to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status_code: i32,
    pub request_type: RequestType,
    pub records: Vec<Record>,
}

impl Response {
    pub fn new(status_code: i32, request_type: RequestType, records: Vec<Record>) -> Self {
        Self {
            status_code,
            request_type,
            records,
        }
    }

    /// Parses a raw response payload received for `request_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyResponse`] for an empty payload and
    /// [`ProtocolError::MalformedStatus`] if the first line is not an integer.
    pub fn from_payload(request_type: RequestType, payload: &str) -> ProtocolResult<Self> {
        if payload.is_empty() {
            return Err(ProtocolError::EmptyResponse);
        }

        let mut lines = payload.split('\n');
        let status_code = parse_status_line(lines.next().unwrap_or_default())?;
        let records = decode_records(request_type, lines);

        Ok(Self::new(status_code, request_type, records))
    }

    pub fn status(&self) -> Status {
        Status::from(self.status_code)
    }

    pub fn is_ok(&self) -> bool {
        self.status() == Status::Ok
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodRecord> {
        self.records.iter().filter_map(Record::as_method)
    }

    pub fn authors(&self) -> impl Iterator<Item = &AuthorRecord> {
        self.records.iter().filter_map(Record::as_author)
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.records.iter().filter_map(Record::as_project)
    }
}

/// Parses the status line of a response.
///
/// Surrounding whitespace (including a stray `\r`) is ignored.
pub fn parse_status_line(line: &str) -> ProtocolResult<i32> {
    line.trim()
        .parse::<i32>()
        .map_err(|_| ProtocolError::MalformedStatus {
            line: line.to_string(),
        })
}

/// Decodes record lines of a response to `request_type`.
///
/// Empty lines are skipped. Lines with fewer columns than the schema needs are
/// dropped, so the result may be shorter than the input.
pub fn decode_records<I, S>(request_type: RequestType, lines: I) -> Vec<Record>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<S> = lines
        .into_iter()
        .filter(|line| !line.as_ref().is_empty())
        .collect();

    if let [only] = lines.as_slice()
        && only.as_ref().trim_end() == NO_RESULTS
    {
        return Vec::new();
    }

    let schema = schema_for(request_type);
    let records: Vec<Record> = lines
        .iter()
        .filter_map(|line| decode_line(schema, line.as_ref()))
        .collect();

    if records.len() < lines.len() {
        debug!(
            request_type = %request_type,
            lines = lines.len(),
            decoded = records.len(),
            "dropped short record lines"
        );
    }

    records
}

/// Decodes one line, or `None` if it lacks a required column.
fn decode_line(schema: &Schema, line: &str) -> Option<Record> {
    if !schema.split {
        return Some(Record::from_columns(schema, vec![line.to_string()], Vec::new()));
    }

    let mut columns: Vec<String> = line.split(FIELD_DELIMITER).map(str::to_string).collect();
    let required = schema.required_columns();
    if columns.len() < required {
        return None;
    }

    let tail = columns.split_off(required);
    let tail = if schema.tail.is_some() { tail } else { Vec::new() };

    Some(Record::from_columns(schema, columns, tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR_A: &str = "0af1d147-b483-76a7-9e14-7f6828b94a60";
    const AUTHOR_B: &str = "66163fed-c2bd-940d-b4a6-ec6e153a90c4";
    const AUTHOR_C: &str = "a6ad6bc8-a201-ff89-c5d3-0ea9c00a16d0";

    fn method_line(fields: &MethodRecord) -> String {
        let mut columns: Vec<&str> = [
            &fields.method_hash,
            &fields.project_id,
            &fields.start_version,
            &fields.start_version_hash,
            &fields.end_version,
            &fields.end_version_hash,
            &fields.method_name,
            &fields.file,
            &fields.line_number,
            &fields.parser_version,
            &fields.vuln_code,
            &fields.license,
            &fields.author_total,
        ]
        .into_iter()
        .map(String::as_str)
        .collect();
        columns.extend(fields.author_ids.iter().map(String::as_str));
        columns.join("?")
    }

    fn sample_method(author_ids: &[&str]) -> MethodRecord {
        MethodRecord {
            method_hash: "897dadeff0b5432633e7f4a8b568fe9f".into(),
            project_id: "1790983771".into(),
            start_version: "1527703251000".into(),
            start_version_hash: "75e749a7926a3ae2dfd5b2eaab6d15956f73381a".into(),
            end_version: "1527797086000".into(),
            end_version_hash: "a80ee0d831a8ee69f1fad5b4673491847975eb26".into(),
            method_name: "isOdd".into(),
            file: "index.js".into(),
            line_number: "12".into(),
            parser_version: "1".into(),
            vuln_code: String::new(),
            license: "MIT".into(),
            author_total: author_ids.len().to_string(),
            author_ids: author_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn method_record_positional_roundtrip() {
        for authors in [
            vec![AUTHOR_A],
            vec![AUTHOR_A, AUTHOR_B],
            vec![AUTHOR_A, AUTHOR_B, AUTHOR_C],
        ] {
            let original = sample_method(&authors);
            let records = decode_records(RequestType::Check, [method_line(&original)]);
            assert_eq!(records, vec![Record::Method(original)]);
        }
    }

    #[test]
    fn method_record_keeps_empty_columns() {
        let mut original = sample_method(&[AUTHOR_A]);
        original.method_name = String::new();
        original.license = String::new();

        let records = decode_records(RequestType::Check, [method_line(&original)]);
        let method = records[0].as_method().unwrap();
        assert_eq!(method.method_name, "");
        assert_eq!(method.license, "");
        assert_eq!(method.author_total, "1");
        assert_eq!(method.author_ids, vec![AUTHOR_A.to_string()]);
    }

    #[test]
    fn method_record_without_tail_has_no_authors() {
        let line = method_line(&sample_method(&[]));
        let records = decode_records(RequestType::Check, [line]);
        assert_eq!(records.len(), 1);
        assert!(records[0].as_method().unwrap().author_ids.is_empty());
    }

    #[test]
    fn sentinel_yields_empty_list_for_every_type() {
        for request_type in RequestType::ALL {
            assert!(decode_records(request_type, [NO_RESULTS]).is_empty());
            assert!(decode_records(request_type, ["", NO_RESULTS, ""]).is_empty());
        }
    }

    #[test]
    fn sentinel_among_other_lines_is_not_special() {
        let records = decode_records(RequestType::GetTopJob, ["job-1", NO_RESULTS]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn short_lines_are_dropped() {
        let full = "jdoe?jdoe@example.com?0af1d147-b483-76a7-9e14-7f6828b94a60";
        let records = decode_records(
            RequestType::GetAuthor,
            [full, "jdoe?jdoe@example.com", "lonely", ""],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("username"), Some("jdoe"));

        let short_method = "897dadeff0b5432633e7f4a8b568fe9f?1790983771?1527703251000";
        assert!(decode_records(RequestType::Check, [short_method]).is_empty());

        let short_project = "1790983771?1527797086000?a80e?MIT?isodd?https://x?owner";
        assert!(decode_records(RequestType::ExtractProjects, [short_project]).is_empty());
    }

    #[test]
    fn extra_columns_ignored_without_tail() {
        let line = "jdoe?jdoe@example.com?uuid-1?unexpected";
        let records = decode_records(RequestType::GetAuthor, [line]);
        let author = records[0].as_author().unwrap();
        assert_eq!(author.uuid, "uuid-1");
    }

    #[test]
    fn project_records_decode_in_order() {
        let line = "1790983771?1527797086000?a80ee0d831a8ee69f1fad5b4673491847975eb26?MIT?is-odd?https://github.com/jonschlinkert/is-odd?0af1d147-b483-76a7-9e14-7f6828b94a60?1";
        let records = decode_records(RequestType::ExtractProjects, [line]);
        assert_eq!(
            records,
            vec![Record::Project(ProjectRecord {
                id: "1790983771".into(),
                version_time: "1527797086000".into(),
                version_hash: "a80ee0d831a8ee69f1fad5b4673491847975eb26".into(),
                license: "MIT".into(),
                name: "is-odd".into(),
                url: "https://github.com/jonschlinkert/is-odd".into(),
                owner_id: AUTHOR_A.into(),
                parser_version: "1".into(),
            })]
        );
    }

    #[test]
    fn generic_lines_are_not_split() {
        let records = decode_records(
            RequestType::GetPreviousProject,
            ["1527703251000?75e749a7?1", "", "second"],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("raw"), Some("1527703251000?75e749a7?1"));
        assert_eq!(records[1].field("raw"), Some("second"));
    }

    #[test]
    fn response_from_payload() {
        let payload = format!("200\n{}\n\n", method_line(&sample_method(&[AUTHOR_A])));
        let response = Response::from_payload(RequestType::Check, &payload).unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.request_type, RequestType::Check);
        assert_eq!(response.methods().count(), 1);
    }

    #[test]
    fn response_with_sentinel_keeps_status() {
        let response =
            Response::from_payload(RequestType::GetAuthor, "400\nNo results found.\n").unwrap();
        assert_eq!(response.status(), Status::BadRequest);
        assert!(response.is_empty());
        assert!(!response.is_ok());
    }

    #[test]
    fn status_line_parsing() {
        assert_eq!(parse_status_line("200"), Ok(200));
        assert_eq!(parse_status_line(" 500\r"), Ok(500));
        assert_eq!(parse_status_line("-1"), Ok(-1));
        assert_eq!(
            parse_status_line("OK"),
            Err(ProtocolError::MalformedStatus {
                line: "OK".to_string()
            })
        );
        assert!(parse_status_line("").is_err());
    }

    #[test]
    fn malformed_and_empty_payloads() {
        assert_eq!(
            Response::from_payload(RequestType::Check, ""),
            Err(ProtocolError::EmptyResponse)
        );
        assert!(matches!(
            Response::from_payload(RequestType::Check, "hello\nworld\n"),
            Err(ProtocolError::MalformedStatus { .. })
        ));
    }

    #[test]
    fn status_classification() {
        assert_eq!(Status::from(200), Status::Ok);
        assert_eq!(Status::from(400), Status::BadRequest);
        assert_eq!(Status::from(500), Status::ServerError);
        assert_eq!(Status::from(418), Status::Unknown(418));
    }
}
