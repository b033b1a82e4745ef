//! # Viaduct Runner
//!
//! The thin layer between a transport and the Viaduct dispatch core.
//!
//! A [`RequestRunner`] drives each incoming request through its pipeline
//! and hands the finished response to an [`Emitter`], suppressing the body
//! for HEAD requests and bodyless status codes (1xx informational,
//! `204 No Content`, `205 Reset Content`, `304 Not Modified`).
//!
//! Dispatch failures propagate out of [`RequestRunner::run`] untranslated;
//! [`error_response`] builds a JSON 500 for callers that prefer answering
//! over propagating. Connection handling, timeouts, and cancellation stay
//! with the transport.

#![doc(html_root_url = "https://docs.rs/viaduct-runner/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod emitter;
pub mod runner;

// Re-export main types at crate root
pub use emitter::{Emitter, WriteEmitter};
pub use runner::{error_response, response_without_body, RequestRunner, NO_BODY_STATUS};
