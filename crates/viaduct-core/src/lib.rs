//! # Viaduct Core
//!
//! Core types and the error taxonomy shared by the Viaduct request-dispatch
//! framework.
//!
//! This crate defines:
//!
//! - The HTTP [`Request`] and [`Response`] aliases used throughout the
//!   pipeline (standard `http` types with `Full<Bytes>` bodies)
//! - [`ViaductError`] and [`InvalidHandlerError`], the caller-visible
//!   failures of dispatch and handler resolution
//! - A serializable [`ErrorEnvelope`] for callers that translate failures
//!   into transport-level responses
//!
//! All errors in this crate are non-retriable programming or configuration
//! errors: they surface synchronously as `Err` from the call that detected
//! them, and the framework performs no retries and no partial recovery.

#![doc(html_root_url = "https://docs.rs/viaduct-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod types;

// Re-export main types at crate root
pub use error::{ErrorDetail, ErrorEnvelope, InvalidHandlerError, ViaductError, ViaductResult};
pub use types::{Request, Response, ResponseExt};
