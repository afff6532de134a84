//! Core helpers shared by the seco crates: tracing setup and identifier shapes.

pub mod ident;
pub mod tracing;

pub use ident::is_canonical_id;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
