//! # doclink-error
//!
//! Unified error handling for doclink - following OpenDAL's error handling practices.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., ParseFailed, SerializationFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! This crate covers infrastructure failures (I/O, serialization, version
//! mismatches in the file representation). Resolution failures have their own
//! structured taxonomy in `doclink-resolver::error::ResolutionError` because
//! they need per-variant payloads a flat context vector can't express.
//!
//! ## Usage
//!
//! ```rust
//! use doclink_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::DeserializationFailed, "unexpected version tag")
//!         .with_operation("file_repr::decode")
//!         .with_context("file", "hierarchy.bin")
//!         .with_context("version", "2.0.0"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, doclink_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using doclink's Error
pub type Result<T> = std::result::Result<T, Error>;
