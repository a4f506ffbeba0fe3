//! Pull engine for envpull.
//!
//! Retrieves a sealed bundle for the current workspace and reconstructs
//! it locally:
//! - Credential lookup for the requesting identity
//! - API client for the bundle endpoints
//! - Envelope decryption (wrapped key, then every sealed payload)
//! - Assembly into a file body or an ordered `name=value` document
//! - Atomic persistence through an output sink

pub mod api_client;
pub mod assembler;
pub mod config;
pub mod credential_manager;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod types;
pub mod workspace;

pub use config::PullConfig;
pub use error::{AuthError, FetchError, PullError, PullResult};
pub use pipeline::{PullOutcome, PullPipeline, PullReport, PullState, PullTarget};
pub use types::*;
