//! Record schemas for catalog responses.
//!
//! Each request type maps to one [`Schema`]: an ordered list of positional
//! field names plus an optional variable-length tail. Decoding is driven
//! entirely by these descriptors (see [`crate::response::decode_records`]).

use serde::{Deserialize, Serialize};

use crate::request::RequestType;

/// Shape of the records a schema produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Method,
    Author,
    Project,
    Generic,
}

/// Positional field layout for one record shape.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: SchemaKind,
    /// Named fields, in column order. Every one must be present.
    pub fields: &'static [&'static str],
    /// Field collecting every column past the named ones, if any.
    pub tail: Option<&'static str>,
    /// Whether lines are split on `?` at all.
    pub split: bool,
}

impl Schema {
    /// Number of columns a line needs to yield a record.
    pub fn required_columns(&self) -> usize {
        self.fields.len()
    }

    /// Column index of a named field.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }
}

pub static METHOD_SCHEMA: Schema = Schema {
    kind: SchemaKind::Method,
    fields: &[
        "method_hash",
        "project_id",
        "start_version",
        "start_version_hash",
        "end_version",
        "end_version_hash",
        "method_name",
        "file",
        "line_number",
        "parser_version",
        "vuln_code",
        "license",
        "author_total",
    ],
    tail: Some("author_ids"),
    split: true,
};

pub static AUTHOR_SCHEMA: Schema = Schema {
    kind: SchemaKind::Author,
    fields: &["username", "email", "uuid"],
    tail: None,
    split: true,
};

pub static PROJECT_SCHEMA: Schema = Schema {
    kind: SchemaKind::Project,
    fields: &[
        "id",
        "version_time",
        "version_hash",
        "license",
        "name",
        "url",
        "owner_id",
        "parser_version",
    ],
    tail: None,
    split: true,
};

pub static GENERIC_SCHEMA: Schema = Schema {
    kind: SchemaKind::Generic,
    fields: &["raw"],
    tail: None,
    split: false,
};

/// Returns the schema used to decode responses to `request_type`.
pub fn schema_for(request_type: RequestType) -> &'static Schema {
    match request_type {
        RequestType::Check => &METHOD_SCHEMA,
        RequestType::GetAuthor => &AUTHOR_SCHEMA,
        RequestType::ExtractProjects => &PROJECT_SCHEMA,
        _ => &GENERIC_SCHEMA,
    }
}

/// A method matched by hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub method_hash: String,
    pub project_id: String,
    pub start_version: String,
    pub start_version_hash: String,
    pub end_version: String,
    pub end_version_hash: String,
    pub method_name: String,
    pub file: String,
    pub line_number: String,
    pub parser_version: String,
    pub vuln_code: String,
    pub license: String,
    pub author_total: String,
    pub author_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub username: String,
    pub email: String,
    pub uuid: String,
}

/// One version of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub version_time: String,
    pub version_hash: String,
    pub license: String,
    pub name: String,
    pub url: String,
    pub owner_id: String,
    pub parser_version: String,
}

/// An undecoded response line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRecord {
    pub raw: String,
}

/// One decoded response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Method(MethodRecord),
    Author(AuthorRecord),
    Project(ProjectRecord),
    Generic(GenericRecord),
}

impl Record {
    /// Builds a record of `schema`'s shape from its named columns and tail.
    ///
    /// `columns` must hold exactly `schema.required_columns()` values.
    pub(crate) fn from_columns(schema: &Schema, columns: Vec<String>, tail: Vec<String>) -> Self {
        let mut columns = columns.into_iter();
        let mut next = || columns.next().unwrap_or_default();

        match schema.kind {
            SchemaKind::Method => Record::Method(MethodRecord {
                method_hash: next(),
                project_id: next(),
                start_version: next(),
                start_version_hash: next(),
                end_version: next(),
                end_version_hash: next(),
                method_name: next(),
                file: next(),
                line_number: next(),
                parser_version: next(),
                vuln_code: next(),
                license: next(),
                author_total: next(),
                author_ids: tail,
            }),
            SchemaKind::Author => Record::Author(AuthorRecord {
                username: next(),
                email: next(),
                uuid: next(),
            }),
            SchemaKind::Project => Record::Project(ProjectRecord {
                id: next(),
                version_time: next(),
                version_hash: next(),
                license: next(),
                name: next(),
                url: next(),
                owner_id: next(),
                parser_version: next(),
            }),
            SchemaKind::Generic => Record::Generic(GenericRecord { raw: next() }),
        }
    }

    /// Schema this record was decoded with.
    pub fn schema(&self) -> &'static Schema {
        match self {
            Record::Method(_) => &METHOD_SCHEMA,
            Record::Author(_) => &AUTHOR_SCHEMA,
            Record::Project(_) => &PROJECT_SCHEMA,
            Record::Generic(_) => &GENERIC_SCHEMA,
        }
    }

    /// Looks up a named (non-tail) field.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match self {
            Record::Method(m) => match name {
                "method_hash" => &m.method_hash,
                "project_id" => &m.project_id,
                "start_version" => &m.start_version,
                "start_version_hash" => &m.start_version_hash,
                "end_version" => &m.end_version,
                "end_version_hash" => &m.end_version_hash,
                "method_name" => &m.method_name,
                "file" => &m.file,
                "line_number" => &m.line_number,
                "parser_version" => &m.parser_version,
                "vuln_code" => &m.vuln_code,
                "license" => &m.license,
                "author_total" => &m.author_total,
                _ => return None,
            },
            Record::Author(a) => match name {
                "username" => &a.username,
                "email" => &a.email,
                "uuid" => &a.uuid,
                _ => return None,
            },
            Record::Project(p) => match name {
                "id" => &p.id,
                "version_time" => &p.version_time,
                "version_hash" => &p.version_hash,
                "license" => &p.license,
                "name" => &p.name,
                "url" => &p.url,
                "owner_id" => &p.owner_id,
                "parser_version" => &p.parser_version,
                _ => return None,
            },
            Record::Generic(g) => match name {
                "raw" => &g.raw,
                _ => return None,
            },
        };
        Some(value.as_str())
    }

    pub fn as_method(&self) -> Option<&MethodRecord> {
        match self {
            Record::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_author(&self) -> Option<&AuthorRecord> {
        match self {
            Record::Author(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectRecord> {
        match self {
            Record::Project(p) => Some(p),
            _ => None,
        }
    }
}
