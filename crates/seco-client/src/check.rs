//! The "check" workflow: method lookup followed by the author and project
//! lookups it references.
//!
//! The three round trips run in sequence since the second and third requests
//! are built from the first response.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use seco_core::is_canonical_id;
use seco_protocol::{FIELD_DELIMITER, RequestType, Response};

use crate::error::ClientResult;
use crate::session::Session;

/// Responses of one check, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResponses {
    pub method: Response,
    pub author: Response,
    pub project: Response,
}

impl CheckResponses {
    /// Method, author and project responses, in that order.
    pub fn into_array(self) -> [Response; 3] {
        [self.method, self.author, self.project]
    }

    /// Whether every round trip reported status 200.
    pub fn all_ok(&self) -> bool {
        self.method.is_ok() && self.author.is_ok() && self.project.is_ok()
    }
}

/// Looks up `hashes`, then the authors and project versions they reference.
///
/// Status codes are not inspected; a non-200 method response still triggers
/// the two follow-up lookups (with whatever it decoded). Any terminal
/// transport failure aborts the check.
pub async fn check<S: AsRef<str>>(
    session: &Session,
    hashes: &[S],
) -> ClientResult<CheckResponses> {
    let method = session.execute(RequestType::Check, hashes).await?;

    let authors = author_ids(&method);
    debug!(methods = method.records.len(), authors = authors.len(), "resolving authors");
    let author = session.execute(RequestType::GetAuthor, &authors).await?;

    let versions = version_pairs(&method);
    debug!(versions = versions.len(), "resolving project versions");
    let project = session.execute(RequestType::ExtractProjects, &versions).await?;

    Ok(CheckResponses {
        method,
        author,
        project,
    })
}

/// Distinct canonical author identifiers across all method records, in
/// first-seen order.
pub fn author_ids(response: &Response) -> Vec<String> {
    let mut seen = HashSet::new();
    response
        .methods()
        .flat_map(|m| m.author_ids.iter())
        .filter(|id| is_canonical_id(id))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Distinct `<project id>?<version>` pairs for the start and end version of
/// every method record, in first-seen order. Pairs with an empty side are
/// skipped.
pub fn version_pairs(response: &Response) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for method in response.methods() {
        for version in [&method.start_version, &method.end_version] {
            if method.project_id.is_empty() || version.is_empty() {
                continue;
            }
            let pair = format!("{}{}{}", method.project_id, FIELD_DELIMITER, version);
            if seen.insert(pair.clone()) {
                pairs.push(pair);
            }
        }
    }

    pairs
}
