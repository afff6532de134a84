//! Catalog session, check workflow and the `seco` command-line interface.
//!
//! ```no_run
//! use seco_client::{Session, SessionOptions};
//!
//! # async fn run() -> seco_client::ClientResult<()> {
//! let session = Session::new(SessionOptions::new("127.0.0.1:8003", "crawler"));
//! let responses = session.check(&["6bac8a660e8db4b32ab77c5fb8682744"]).await?;
//! for response in responses.into_array() {
//!     println!("{} {}", response.request_type, response.status_code);
//! }
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod session;

pub use check::{CheckResponses, author_ids, check, version_pairs};
pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionOptions, SessionPhase};
