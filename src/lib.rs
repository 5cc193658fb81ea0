//! A bidirectional codec between the RIS bibliographic reference format and
//! the normalized reflib record model.
//!
//! `reflib-ris` converts RIS formatted text (the tagged, line-oriented
//! interchange format emitted by most citation managers) into [`Reference`]
//! records keyed by human-readable reflib field names, and converts such
//! records back into RIS text.
//!
//! # Key Features
//!
//! - **Permissive decoding**: unknown tags are dropped, malformed lines are
//!   folded into the preceding field or ignored, and unrecognized reference
//!   types degrade to `unknown`. Vendor exports vary too much for strict
//!   rejection to be usable.
//! - **Streaming-friendly inputs**: decode from a string, a UTF-8 byte
//!   buffer, or any [`std::io::Read`] stream.
//! - **Incremental output**: encode a collection, a single record, or a
//!   pull-based record source into any [`std::io::Write`] sink.
//! - **Stable field translation**: one static dictionary maps RIS tags to
//!   reflib fields and RIS type codes to reflib type names, in both
//!   directions.
//!
//! # Decoding
//!
//! ```rust
//! use reflib_ris::decode;
//!
//! let input = "TY  - JOUR\nTI  - Example Article\nAU  - Smith, John\nER  -";
//!
//! let references: Vec<_> = decode(input).unwrap().collect();
//! assert_eq!(references.len(), 1);
//! assert_eq!(
//!     references[0].get("title").and_then(|v| v.as_str()),
//!     Some("Example Article"),
//! );
//! assert_eq!(references[0].ref_type(), Some("journalArticle"));
//! ```
//!
//! # Encoding
//!
//! ```rust
//! use reflib_ris::{encode_to_string, EncodeOptions, Reference};
//!
//! let mut reference = Reference::new();
//! reference.set("title", "Example Article");
//! reference.set("authors", vec!["Smith, John"]);
//!
//! let ris = encode_to_string(EncodeOptions::records(vec![reference])).unwrap();
//! assert!(ris.starts_with("TY  - JOUR\n"));
//! assert!(ris.contains("AU  - Smith, John\n"));
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`RisError`]. Input
//! faults (unreadable streams, bytes that are not UTF-8 text) surface from
//! [`decode`] before any record is produced; a missing encode content source
//! or a failing pull callback surfaces from [`encode`]. Everything else is
//! absorbed by the permissive parsing policy rather than reported.
//!
//! # Thread Safety
//!
//! The translation dictionary is immutable process-wide reference data, built
//! lazily on first use. Decoding and encoding hold no shared mutable state:
//! each [`Records`] iterator owns its working record and each [`encode`] call
//! owns its sink for the duration of the call.

use thiserror::Error;

pub mod decode;
pub mod encode;
pub mod fields;
pub mod reference;
mod regex;

// Reexports
pub use decode::{Records, Source, decode, decode_all};
pub use encode::{Content, EncodeOptions, PullFn, encode, encode_to_string};
pub use reference::{Reference, Value};

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, RisError>;

/// Represents errors that can occur while decoding or encoding RIS data.
#[derive(Error, Debug)]
pub enum RisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is not valid UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("no content has been provided")]
    MissingContent,

    #[error("content source error: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),
}
