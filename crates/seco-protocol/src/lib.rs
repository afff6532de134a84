//! Wire codec and response schemas for the seco catalog protocol.
//!
//! # Protocol Overview
//!
//! One request and one response travel over a fresh TCP connection:
//!
//! - Client → server: a header line `<code>?<client id>?<body bytes>\n`,
//!   then the body: payload lines, each terminated by `\n`.
//! - Server → client: a decimal status line, then `?`-delimited record lines
//!   shaped by the request type's [`Schema`], or the single line
//!   `No results found.`.
//!
//! # Example
//!
//! ```rust
//! use seco_protocol::{encode_request, RequestType, Response};
//!
//! let request = encode_request(RequestType::GetAuthor, "test", &["0af1d147-b483-76a7-9e14-7f6828b94a60"]);
//! assert_eq!(request.header, "idau?test?37\n");
//!
//! let response = Response::from_payload(
//!     RequestType::GetAuthor,
//!     "200\njdoe?jdoe@example.com?0af1d147-b483-76a7-9e14-7f6828b94a60\n",
//! ).unwrap();
//! assert_eq!(response.authors().next().unwrap().username, "jdoe");
//! ```

mod error;
mod request;
mod response;
mod schema;

pub use error::{ProtocolError, ProtocolResult};
pub use request::{EncodedRequest, RequestType, encode_request};
pub use response::{
    FIELD_DELIMITER, NO_RESULTS, Response, Status, decode_records, parse_status_line,
};
pub use schema::{
    AuthorRecord, GenericRecord, MethodRecord, ProjectRecord, Record, Schema, SchemaKind,
    schema_for,
};
