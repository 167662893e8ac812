//! ConHub Observability Library
//!
//! Tracing subscriber setup shared by connector services: structured JSON
//! output for deployments, pretty output for development, `RUST_LOG` style
//! filtering everywhere.

pub mod init;

pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, trace, warn, Level};
