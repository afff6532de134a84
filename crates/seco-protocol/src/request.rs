//! Request types and the outbound message codec.
//!
//! Every request is sent as a header line followed by a newline-terminated
//! body:
//!
//! ```text
//! <code>?<client id>?<body length in bytes>\n
//! <line 1>\n
//! <line 2>\n
//! ...
//! ```
//!
//! The declared length counts bytes, not characters, so multi-byte payloads
//! are framed correctly. An empty payload sends only the header with a
//! length of `0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProtocolError;

/// Catalog operations, each identified on the wire by a four-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "upld")]
    Upload,
    /// Look up methods by hash.
    #[serde(rename = "chck")]
    Check,
    #[serde(rename = "chup")]
    CheckUpload,
    #[serde(rename = "conn")]
    Connect,
    #[serde(rename = "gtip")]
    GetIps,
    #[serde(rename = "upjb")]
    UploadJob,
    #[serde(rename = "upcd")]
    UploadCrawlData,
    #[serde(rename = "gtjb")]
    GetTopJob,
    #[serde(rename = "udjb")]
    UpdateJob,
    #[serde(rename = "fnjb")]
    FinishJob,
    /// Look up project versions by `<project id>?<version>` pairs.
    #[serde(rename = "extp")]
    ExtractProjects,
    /// Look up authors by identifier.
    #[serde(rename = "idau")]
    GetAuthor,
    #[serde(rename = "aume")]
    GetMethodByName,
    #[serde(rename = "gppr")]
    GetPreviousProject,
    #[serde(rename = "undf")]
    Undefined,
}

impl RequestType {
    /// All request types, in wire-table order.
    pub const ALL: [RequestType; 15] = [
        RequestType::Upload,
        RequestType::Check,
        RequestType::CheckUpload,
        RequestType::Connect,
        RequestType::GetIps,
        RequestType::UploadJob,
        RequestType::UploadCrawlData,
        RequestType::GetTopJob,
        RequestType::UpdateJob,
        RequestType::FinishJob,
        RequestType::ExtractProjects,
        RequestType::GetAuthor,
        RequestType::GetMethodByName,
        RequestType::GetPreviousProject,
        RequestType::Undefined,
    ];

    /// Four-character wire code.
    pub const fn code(self) -> &'static str {
        match self {
            RequestType::Upload => "upld",
            RequestType::Check => "chck",
            RequestType::CheckUpload => "chup",
            RequestType::Connect => "conn",
            RequestType::GetIps => "gtip",
            RequestType::UploadJob => "upjb",
            RequestType::UploadCrawlData => "upcd",
            RequestType::GetTopJob => "gtjb",
            RequestType::UpdateJob => "udjb",
            RequestType::FinishJob => "fnjb",
            RequestType::ExtractProjects => "extp",
            RequestType::GetAuthor => "idau",
            RequestType::GetMethodByName => "aume",
            RequestType::GetPreviousProject => "gppr",
            RequestType::Undefined => "undf",
        }
    }

    /// Human-facing name, as accepted on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            RequestType::Upload => "upload",
            RequestType::Check => "check",
            RequestType::CheckUpload => "check-upload",
            RequestType::Connect => "connect",
            RequestType::GetIps => "get-ips",
            RequestType::UploadJob => "upload-job",
            RequestType::UploadCrawlData => "upload-crawl-data",
            RequestType::GetTopJob => "get-top-job",
            RequestType::UpdateJob => "update-job",
            RequestType::FinishJob => "finish-job",
            RequestType::ExtractProjects => "extract-projects",
            RequestType::GetAuthor => "get-author",
            RequestType::GetMethodByName => "get-method-by-name",
            RequestType::GetPreviousProject => "get-previous-project",
            RequestType::Undefined => "undefined",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RequestType {
    type Err = ProtocolError;

    /// Accepts either the wire code (`chck`) or the name (`check`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestType::ALL
            .into_iter()
            .find(|t| t.code() == s || t.name() == s)
            .ok_or_else(|| ProtocolError::UnknownRequestType(s.to_string()))
    }
}

/// A request ready for transmission: header line and body, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    /// Request type the header was built for.
    pub request_type: RequestType,
    /// `<code>?<client id>?<body length>\n`.
    pub header: String,
    /// Payload lines, each terminated by `\n`; empty when there is no payload.
    pub body: String,
}

impl EncodedRequest {
    /// Number of body bytes announced in the header.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Header and body concatenated into a single buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.header.len() + self.body.len());
        buffer.extend_from_slice(self.header.as_bytes());
        buffer.extend_from_slice(self.body.as_bytes());
        buffer
    }
}

/// Encodes a request for `client_id` carrying `payload` lines.
///
/// Payload values are not escaped; they must not contain `?` or `\n`.
///
/// # Example
///
/// ```rust
/// use seco_protocol::{encode_request, RequestType};
///
/// let request = encode_request(RequestType::Check, "test", &["abc", "def"]);
/// assert_eq!(request.header, "chck?test?8\n");
/// assert_eq!(request.body, "abc\ndef\n");
/// ```
pub fn encode_request<S: AsRef<str>>(
    request_type: RequestType,
    client_id: &str,
    payload: &[S],
) -> EncodedRequest {
    let mut body = payload
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    if !payload.is_empty() {
        body.push('\n');
    }

    let header = format!("{}?{}?{}\n", request_type.code(), client_id, body.len());

    debug!(
        request_type = %request_type,
        lines = payload.len(),
        body_bytes = body.len(),
        "encoded request"
    );

    EncodedRequest {
        request_type,
        header,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_check_request() {
        let request = encode_request(RequestType::Check, "test", &["abc", "def"]);
        assert_eq!(request.request_type, RequestType::Check);
        assert_eq!(request.header, "chck?test?8\n");
        assert_eq!(request.body, "abc\ndef\n");
        assert_eq!(request.body_len(), 8);
        assert_eq!(request.to_bytes(), b"chck?test?8\nabc\ndef\n".to_vec());
    }

    #[test]
    fn empty_payload_has_empty_body() {
        let request = encode_request::<&str>(RequestType::GetTopJob, "crawler", &[]);
        assert_eq!(request.header, "gtjb?crawler?0\n");
        assert!(request.body.is_empty());
        assert_eq!(request.to_bytes(), b"gtjb?crawler?0\n".to_vec());
    }

    #[test]
    fn single_empty_line_still_gets_terminator() {
        let request = encode_request(RequestType::Connect, "c", &[""]);
        assert_eq!(request.body, "\n");
        assert_eq!(request.header, "conn?c?1\n");
    }

    #[test]
    fn declared_length_counts_bytes() {
        let payloads: Vec<Vec<&str>> = vec![
            vec!["plain"],
            vec!["héllo", "wörld"],
            vec!["日本語", "emoji 🦀", ""],
            vec!["a"; 64],
        ];

        for payload in payloads {
            let request = encode_request(RequestType::Upload, "test", &payload);
            let declared: usize = request
                .header
                .trim_end()
                .rsplit('?')
                .next()
                .unwrap()
                .parse()
                .unwrap();
            assert_eq!(declared, request.body.len());
            assert_eq!(declared, request.body.as_bytes().len());
        }

        let request = encode_request(RequestType::Upload, "test", &["日本語"]);
        assert_eq!(request.header, "upld?test?10\n");
    }

    #[test]
    fn accepts_owned_strings() {
        let payload = vec![String::from("1790983771?1527797086000")];
        let request = encode_request(RequestType::ExtractProjects, "test", &payload);
        assert_eq!(request.body, "1790983771?1527797086000\n");
        assert_eq!(request.header, "extp?test?25\n");
    }

    #[test]
    fn request_type_codes_are_unique_four_chars() {
        let mut codes: Vec<&str> = RequestType::ALL.iter().map(|t| t.code()).collect();
        assert!(codes.iter().all(|c| c.len() == 4));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), RequestType::ALL.len());
    }

    #[test]
    fn request_type_parses_code_and_name() {
        for request_type in RequestType::ALL {
            assert_eq!(request_type.code().parse::<RequestType>(), Ok(request_type));
            assert_eq!(request_type.name().parse::<RequestType>(), Ok(request_type));
        }
        assert_eq!(
            "nope".parse::<RequestType>(),
            Err(ProtocolError::UnknownRequestType("nope".to_string()))
        );
    }

    #[test]
    fn request_type_serializes_as_code() {
        let json = serde_json::to_string(&RequestType::GetAuthor).unwrap();
        assert_eq!(json, "\"idau\"");
        let parsed: RequestType = serde_json::from_str("\"extp\"").unwrap();
        assert_eq!(parsed, RequestType::ExtractProjects);
    }
}
