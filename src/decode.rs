//! RIS decoding: the line-level state machine that turns raw RIS text into
//! normalized reference records.
//!
//! Decoding is permissive by design. Exports in the wild disagree about
//! padding, record terminators, and tag sets, so anything that does not parse
//! as a tagged line is folded into the field that is currently open (or
//! silently dropped), and unrecognized tags close that field without
//! complaint. The only reportable faults concern the input itself: a stream
//! that cannot be read, or bytes that are not UTF-8 text.

use either::{Either, Left, Right};
use once_cell::sync::Lazy;
use std::io::Read;
use tracing::{debug, trace};

use crate::Result;
use crate::fields::{self, FieldMapping};
use crate::reference::Reference;
use crate::regex::Regex;

/// Tag that opens a new reference record.
const REFERENCE_START: &str = "TY";
/// Explicit end-of-record marker.
const END_OF_REFERENCE: &str = "ER";

/// Matches a tagged line: a two-character tag, optional padding spaces, a
/// literal `-`, an optional single space, then the value. This accepts both
/// wire variants ("TY  - JOUR", "TY - JOUR", "TY- JOUR") as well as a bare
/// "ER  -" terminator.
static TAG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9]) *- ?(.*)$").unwrap());

/// Splits a comma-separated name list, eating whitespace around each comma.
static NAME_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Raw decode input: in-memory text, a UTF-8 byte buffer, or a readable
/// stream. Streams are buffered to end of data before parsing begins.
pub enum Source {
    Text(String),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read>),
}

impl Source {
    /// Wrap an arbitrary readable stream.
    pub fn reader(reader: impl Read + 'static) -> Self {
        Source::Reader(Box::new(reader))
    }

    /// Materialize the source into one text buffer.
    fn into_text(self) -> Result<String> {
        match self {
            Source::Text(text) => Ok(text),
            Source::Bytes(bytes) => Ok(String::from_utf8(bytes)?),
            Source::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(String::from_utf8(bytes)?)
            }
        }
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

/// Begin decoding RIS text into reference records.
///
/// The source is materialized into a single text buffer up front, so input
/// faults surface here, before any record can be observed. Parsing itself
/// runs as the returned [`Records`] iterator is advanced. Nothing is emitted
/// within this call, so a consumer always has the iterator in hand before
/// the first record exists.
///
/// # Example
///
/// ```rust
/// let mut records = reflib_ris::decode("TY  - BOOK\nTI  - Title\nER  -").unwrap();
/// let reference = records.next().unwrap();
/// assert_eq!(reference.ref_type(), Some("book"));
/// ```
pub fn decode(source: impl Into<Source>) -> Result<Records> {
    let text = source.into().into_text()?;
    Ok(Records::new(&text))
}

/// Decode an entire source into a vector of reference records.
pub fn decode_all(source: impl Into<Source>) -> Result<Vec<Reference>> {
    Ok(decode(source)?.collect())
}

/// Iterator over the reference records of one RIS document, in source order.
///
/// Each record is finalized as it is yielded: pages are synthesized from
/// `startPage`/`endPage`, the raw type code is resolved to a reflib type
/// name, and scalar values are right-trimmed.
pub struct Records {
    lines: std::vec::IntoIter<String>,
    current: Reference,
    open: Option<&'static FieldMapping>,
}

impl Records {
    fn new(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(|line| line.trim_end().to_string()).collect();
        Self {
            lines: lines.into_iter(),
            current: Reference::new(),
            open: None,
        }
    }

    /// Process one line, returning a record completed by it, if any.
    fn step(&mut self, line: &str) -> Option<Reference> {
        let (tag, value) = match split_tag_line(line) {
            Left(line) => {
                // Continuation of the currently open field, if one exists.
                match self.open {
                    Some(mapping) if mapping.is_array => {
                        self.current.push_values(mapping.field, [line.to_string()]);
                    }
                    Some(mapping) => self.current.extend_scalar(mapping.field, line),
                    None => {}
                }
                return None;
            }
            Right(pair) => pair,
        };

        if tag == END_OF_REFERENCE {
            self.open = None;
            return self.flush();
        }

        let completed = if tag == REFERENCE_START {
            self.flush()
        } else {
            None
        };

        match fields::mapping_for_tag(tag) {
            Some(mapping) => {
                self.open = Some(mapping);
                self.accumulate(mapping, value);
            }
            None => {
                debug!(tag, "ignoring unrecognized tag");
                self.open = None;
            }
        }

        completed
    }

    /// Store a tag's value in the working record per its mapping.
    fn accumulate(&mut self, mapping: &'static FieldMapping, value: &str) {
        if mapping.is_array {
            if mapping.split {
                self.current.push_values(mapping.field, split_name_list(value));
            } else {
                self.current.push_values(mapping.field, [value.to_string()]);
            }
        } else {
            self.current.set(mapping.field, value);
        }
    }

    /// Finalize and hand off the working record, if it holds anything.
    fn flush(&mut self) -> Option<Reference> {
        if self.current.is_empty() {
            return None;
        }
        let mut completed = std::mem::take(&mut self.current);
        completed.collapse_pages();
        completed.resolve_type();
        completed.trim_scalar_values();
        trace!(fields = completed.len(), "reference parsed");
        Some(completed)
    }
}

impl Iterator for Records {
    type Item = Reference;

    fn next(&mut self) -> Option<Reference> {
        while let Some(line) = self.lines.next() {
            if let Some(completed) = self.step(&line) {
                return Some(completed);
            }
        }
        // The source needs no trailing delimiter for its final record.
        self.flush()
    }
}

/// Classify a line as either a plain line or a `(tag, value)` pair.
fn split_tag_line(line: &str) -> Either<&str, (&str, &str)> {
    match TAG_LINE.captures(line) {
        Some(caps) => {
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map_or("", |m| m.as_str());
            Right((tag, value))
        }
        None => Left(line),
    }
}

/// Split a secondary-author value into individual names.
///
/// Tags such as A2 carry several names in one value, each in
/// `Family, Initials` form: `"Smith, J, Doe, A"` holds two names. The value
/// is split on commas and the tokens re-paired; an odd trailing token stands
/// alone.
fn split_name_list(value: &str) -> Vec<String> {
    let tokens: Vec<&str> = NAME_SEPARATOR
        .split(value)
        .filter(|token| !token.is_empty())
        .collect();
    tokens.chunks(2).map(|name| name.join(", ")).collect()
}
