//! RIS encoding: writes normalized reference records back out as RIS text.
//!
//! Records are written incrementally to any [`std::io::Write`] sink, one
//! tagged block per record, with a blank line separating consecutive records.
//! Fields with no reverse mapping in the dictionary are dropped rather than
//! reported, mirroring the permissive decode policy.

use compact_str::CompactString;
use std::io::Write;
use tracing::debug;

use crate::fields;
use crate::reference::{Reference, Value};
use crate::{Result, RisError};

/// Reflib type assumed for records that do not carry one.
const DEFAULT_TYPE: &str = "journalArticle";

/// RIS code written when neither the record's type nor the configured default
/// has a dictionary entry.
const FALLBACK_TYPE_CODE: &str = "GEN";

/// A pull-based record source: invoked with a zero-based batch index, it
/// returns the next batch of records, or `None` once exhausted. An error
/// aborts encoding.
pub type PullFn = Box<
    dyn FnMut(
        usize,
    ) -> std::result::Result<
        Option<Vec<Reference>>,
        Box<dyn std::error::Error + Send + Sync>,
    >,
>;

/// The record source for one encode call.
pub enum Content {
    /// A finite ordered sequence of records.
    Records(Vec<Reference>),
    /// A single record.
    Single(Reference),
    /// A pull callback, driven until it reports no more data.
    Pull(PullFn),
}

/// Configuration for [`encode`].
pub struct EncodeOptions {
    /// Reflib type name used when a record omits `type`.
    pub default_type: CompactString,
    /// The record source; encoding fails with
    /// [`MissingContent`](RisError::MissingContent) when absent.
    pub content: Option<Content>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            default_type: DEFAULT_TYPE.into(),
            content: None,
        }
    }
}

impl EncodeOptions {
    /// Encode a finite ordered sequence of records.
    pub fn records(records: Vec<Reference>) -> Self {
        Self {
            content: Some(Content::Records(records)),
            ..Self::default()
        }
    }

    /// Encode a single record.
    pub fn single(record: Reference) -> Self {
        Self {
            content: Some(Content::Single(record)),
            ..Self::default()
        }
    }

    /// Encode records fetched batch by batch from a pull callback.
    pub fn pull<F>(fetch: F) -> Self
    where
        F: FnMut(
                usize,
            ) -> std::result::Result<
                Option<Vec<Reference>>,
                Box<dyn std::error::Error + Send + Sync>,
            > + 'static,
    {
        Self {
            content: Some(Content::Pull(Box::new(fetch))),
            ..Self::default()
        }
    }

    /// Override the reflib type assumed for records without one.
    #[must_use]
    pub fn with_default_type(mut self, default_type: impl Into<CompactString>) -> Self {
        self.default_type = default_type.into();
        self
    }
}

/// Encode reference records as RIS text written incrementally to `sink`.
///
/// Records are written in encounter order. On completion the sink is flushed
/// and handed back to the caller; no further writes are made to it.
///
/// # Example
///
/// ```rust
/// use reflib_ris::{encode, EncodeOptions, Reference};
///
/// let mut reference = Reference::new();
/// reference.set("title", "Example Article");
///
/// let sink = encode(Vec::new(), EncodeOptions::single(reference)).unwrap();
/// assert_eq!(sink, b"TY  - JOUR\nTI  - Example Article\nER  -\n");
/// ```
pub fn encode<W: Write>(mut sink: W, mut options: EncodeOptions) -> Result<W> {
    let content = options.content.take().ok_or(RisError::MissingContent)?;
    let default_type = options.default_type;
    let mut written = 0usize;

    match content {
        Content::Records(records) => {
            for reference in records {
                write_reference(&mut sink, reference, &default_type, &mut written)?;
            }
        }
        Content::Single(reference) => {
            write_reference(&mut sink, reference, &default_type, &mut written)?;
        }
        Content::Pull(mut fetch) => {
            let mut batch = 0;
            loop {
                let records = match fetch(batch) {
                    Ok(Some(records)) if !records.is_empty() => records,
                    Ok(_) => break,
                    Err(err) => return Err(RisError::Source(err)),
                };
                for reference in records {
                    write_reference(&mut sink, reference, &default_type, &mut written)?;
                }
                batch += 1;
            }
        }
    }

    sink.flush()?;
    Ok(sink)
}

/// Encode into an in-memory string.
pub fn encode_to_string(options: EncodeOptions) -> Result<String> {
    let sink = encode(Vec::new(), options)?;
    Ok(String::from_utf8(sink)?)
}

/// Write one reference block, preceded by a blank separator line for every
/// record but the first.
fn write_reference<W: Write>(
    sink: &mut W,
    mut reference: Reference,
    default_type: &str,
    written: &mut usize,
) -> Result<()> {
    if *written > 0 {
        writeln!(sink)?;
    }
    *written += 1;

    let code = reference
        .ref_type()
        .and_then(fields::type_code)
        .or_else(|| fields::type_code(default_type))
        .unwrap_or(FALLBACK_TYPE_CODE);
    writeln!(sink, "TY  - {code}")?;

    // The type was written as the record opener, never as a regular field.
    reference.remove("type");
    reference.expand_pages();

    for (field, value) in reference.iter() {
        let Some(mapping) = fields::mapping_for_field(field) else {
            debug!(field, "no RIS mapping for field, dropping");
            continue;
        };
        match value {
            Value::Single(scalar) => writeln!(sink, "{}  - {}", mapping.tag, scalar)?,
            Value::Many(items) => {
                for item in items {
                    writeln!(sink, "{}  - {}", mapping.tag, item)?;
                }
            }
        }
    }

    writeln!(sink, "ER  -")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(title: &str) -> Reference {
        let mut reference = Reference::new();
        reference.set("title", title);
        reference
    }

    #[test]
    fn test_encode_reference_with_pages() {
        let mut reference = article("A");
        reference.set("authors", vec!["X, Y"]);
        reference.set("pages", "10-15");

        let ris = encode_to_string(EncodeOptions::records(vec![reference])).unwrap();
        assert_eq!(
            ris,
            "TY  - JOUR\nTI  - A\nAU  - X, Y\nSP  - 10\nEP  - 15\nER  -\n"
        );
    }

    #[test]
    fn test_encode_blank_line_between_records_only() {
        let ris =
            encode_to_string(EncodeOptions::records(vec![article("A"), article("B")])).unwrap();
        assert_eq!(
            ris,
            "TY  - JOUR\nTI  - A\nER  -\n\nTY  - JOUR\nTI  - B\nER  -\n"
        );
    }

    #[test]
    fn test_encode_type_is_not_emitted_as_field() {
        let mut reference = article("A");
        reference.set("type", "web");

        let ris = encode_to_string(EncodeOptions::single(reference)).unwrap();
        assert_eq!(ris, "TY  - ELEC\nTI  - A\nER  -\n");
    }

    #[test]
    fn test_encode_type_priority_code_wins() {
        let mut reference = article("A film");
        reference.set("type", "filmOrBroadcast");

        let ris = encode_to_string(EncodeOptions::single(reference)).unwrap();
        assert!(ris.starts_with("TY  - VIDEO\n"));
        assert!(!ris.contains("MPCT"));
    }

    #[test]
    fn test_encode_default_type_override() {
        let ris = encode_to_string(
            EncodeOptions::records(vec![article("A")]).with_default_type("book"),
        )
        .unwrap();
        assert!(ris.starts_with("TY  - BOOK\n"));
    }

    #[test]
    fn test_encode_unmapped_type_falls_back_to_default() {
        let mut reference = article("A");
        reference.set("type", "notAKnownType");

        let ris = encode_to_string(EncodeOptions::single(reference)).unwrap();
        assert!(ris.starts_with("TY  - JOUR\n"));
    }

    #[test]
    fn test_encode_drops_unmapped_fields() {
        let mut reference = article("A");
        reference.set("publisher", "Nowhere Press");

        let ris = encode_to_string(EncodeOptions::single(reference)).unwrap();
        assert_eq!(ris, "TY  - JOUR\nTI  - A\nER  -\n");
    }

    #[test]
    fn test_encode_array_fields_one_line_per_entry() {
        let mut reference = article("A");
        reference.set("tags", vec!["alpha", "beta"]);

        let ris = encode_to_string(EncodeOptions::single(reference)).unwrap();
        assert_eq!(
            ris,
            "TY  - JOUR\nTI  - A\nKW  - alpha\nKW  - beta\nER  -\n"
        );
    }

    #[test]
    fn test_encode_missing_content() {
        let result = encode_to_string(EncodeOptions::default());
        assert!(matches!(result, Err(RisError::MissingContent)));
    }

    #[test]
    fn test_encode_empty_collection() {
        let ris = encode_to_string(EncodeOptions::records(Vec::new())).unwrap();
        assert_eq!(ris, "");
    }

    #[test]
    fn test_encode_pull_source_batches() {
        let mut batches = vec![vec![article("A")], vec![article("B"), article("C")]].into_iter();

        let ris = encode_to_string(EncodeOptions::pull(move |_batch| Ok(batches.next()))).unwrap();
        assert_eq!(ris.matches("TY  - JOUR").count(), 3);
        assert!(ris.ends_with("TI  - C\nER  -\n"));
        assert!(!ris.ends_with("\n\n"));
    }

    #[test]
    fn test_encode_pull_source_batch_index_increments() {
        let ris = encode_to_string(EncodeOptions::pull(|batch| {
            if batch < 2 {
                Ok(Some(vec![article(&format!("Title {batch}"))]))
            } else {
                Ok(None)
            }
        }))
        .unwrap();
        assert!(ris.contains("TI  - Title 0\n"));
        assert!(ris.contains("TI  - Title 1\n"));
    }

    #[test]
    fn test_encode_pull_source_error_aborts() {
        let result = encode_to_string(EncodeOptions::pull(|_batch| Err("boom".into())));
        match result {
            Err(RisError::Source(err)) => assert_eq!(err.to_string(), "boom"),
            other => panic!("expected a source error, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut first = article("Hello World");
        first.set("authors", vec!["Joe Random", "John Random"]);
        first.set("volume", "1");
        first.set("pages", "10-15");

        let mut second = article("Goodbye World");
        second.set("authors", vec!["Josh Random", "Janet Random"]);
        second.set("volume", "2");
        second.set("type", "web");

        let ris =
            encode_to_string(EncodeOptions::records(vec![first, second])).unwrap();
        let decoded = crate::decode_all(ris.as_str()).unwrap();

        let expected_first: Reference = [
            ("type", Value::from("journalArticle")),
            ("title", Value::from("Hello World")),
            ("authors", Value::from(vec!["Joe Random", "John Random"])),
            ("volume", Value::from("1")),
            ("pages", Value::from("10-15")),
        ]
        .into_iter()
        .collect();
        let expected_second: Reference = [
            ("type", Value::from("web")),
            ("title", Value::from("Goodbye World")),
            ("authors", Value::from(vec!["Josh Random", "Janet Random"])),
            ("volume", Value::from("2")),
        ]
        .into_iter()
        .collect();
        assert_eq!(decoded, vec![expected_first, expected_second]);
    }
}
