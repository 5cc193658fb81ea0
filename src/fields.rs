//! The RIS field dictionary: static translation tables between RIS tags and
//! reflib field names, and between RIS type codes and reflib type names.
//!
//! Both tables are declaration-ordered. Several RIS tags may target the same
//! reflib field (and several type codes the same type name), so the reverse
//! lookups keep the first-declared entry: declaration order is the encode
//! priority list.
//!
//! See: http://en.wikipedia.org/wiki/RIS_(file_format)

use itertools::Itertools;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The sentinel reflib type name used for unrecognized RIS type codes.
pub const UNKNOWN_TYPE: &str = "unknown";

/// A single entry of the tag translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Two-character RIS tag.
    pub tag: &'static str,
    /// Target field name in the normalized record.
    pub field: &'static str,
    /// Whether repeated occurrences accumulate into an ordered sequence.
    pub is_array: bool,
    /// Whether a single tag value holds several comma-separated names.
    pub split: bool,
}

impl FieldMapping {
    const fn scalar(tag: &'static str, field: &'static str) -> Self {
        Self {
            tag,
            field,
            is_array: false,
            split: false,
        }
    }

    const fn array(tag: &'static str, field: &'static str) -> Self {
        Self {
            tag,
            field,
            is_array: true,
            split: false,
        }
    }

    const fn split_array(tag: &'static str, field: &'static str) -> Self {
        Self {
            tag,
            field,
            is_array: true,
            split: true,
        }
    }
}

/// Map of RIS tags to reflib fields.
///
/// The first mapping declared for a reflib field is the one that field is
/// written back as, so canonical tags come before their synonyms (AU before
/// A1, AB before N2, and so on).
const FIELD_MAPPINGS: &[FieldMapping] = &[
    FieldMapping::array("AU", "authors"),
    FieldMapping::array("A1", "authors"),
    FieldMapping::split_array("A2", "authors"),
    FieldMapping::split_array("A3", "authors"),
    FieldMapping::split_array("A4", "authors"),
    FieldMapping::scalar("AB", "abstract"),
    FieldMapping::scalar("N2", "abstract"),
    FieldMapping::scalar("C1", "custom1"),
    FieldMapping::scalar("C2", "custom2"),
    FieldMapping::scalar("C3", "custom3"),
    FieldMapping::scalar("C4", "custom4"),
    FieldMapping::scalar("C5", "custom5"),
    FieldMapping::scalar("C6", "custom6"),
    FieldMapping::scalar("C7", "custom7"),
    FieldMapping::scalar("C8", "custom8"),
    FieldMapping::scalar("CA", "caption"),
    FieldMapping::scalar("CY", "address"),
    FieldMapping::scalar("DA", "date"),
    FieldMapping::scalar("Y1", "date"),
    FieldMapping::scalar("DB", "database"),
    FieldMapping::scalar("DO", "doi"),
    FieldMapping::scalar("DP", "databaseProvider"),
    FieldMapping::scalar("EP", "endPage"),
    FieldMapping::scalar("ET", "edition"),
    FieldMapping::scalar("IS", "number"),
    FieldMapping::scalar("JF", "journal"),
    FieldMapping::scalar("J1", "journal"),
    FieldMapping::array("KW", "tags"),
    FieldMapping::scalar("LA", "language"),
    FieldMapping::scalar("N1", "notes"),
    FieldMapping::scalar("SN", "isbn"),
    FieldMapping::scalar("SP", "startPage"),
    FieldMapping::scalar("TI", "title"),
    FieldMapping::scalar("T1", "title"),
    FieldMapping::scalar("TY", "type"),
    FieldMapping::scalar("VL", "volume"),
];

/// Map of RIS type codes to reflib type names.
///
/// High-priority codes are declared at the top: when translating back, the
/// first code declared for a reflib type is the one written out.
const TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("ADVS", "audiovisualMaterial"),
    ("JOUR", "journalArticle"),
    ("PCOMM", "personalCommunication"),
    ("VIDEO", "filmOrBroadcast"),
    // Low priority below this line
    ("ABST", "unknown"),
    ("AGGR", "aggregatedDatabase"),
    ("ANCIENT", "ancientText"),
    ("ART", "artwork"),
    ("BILL", "bill"),
    ("BLOG", "blog"),
    ("BOOK", "book"),
    ("CASE", "case"),
    ("CHAP", "bookSection"),
    ("CHART", "chartOrTable"),
    ("CLSWK", "classicalWork"),
    ("COMP", "computerProgram"),
    ("CONF", "conferenceProceedings"),
    ("CPAPER", "conferencePaper"),
    ("CTLG", "catalog"),
    ("DATA", "dataset"),
    ("DBASE", "onlineDatabase"),
    ("DICT", "dictionary"),
    ("EBOOK", "electronicBook"),
    ("ECHAP", "electronicBookSection"),
    ("EDBOOK", "editedBook"),
    ("EJOUR", "electronicArticle"),
    ("ELEC", "web"),
    ("ENCYC", "encyclopedia"),
    ("EQUA", "equation"),
    ("FIGURE", "figure"),
    ("GEN", "generic"),
    ("GOVDOC", "governmentDocument"),
    ("GRANT", "grant"),
    ("HEARING", "hearing"),
    ("ICOMM", "personalCommunication"),
    ("INPR", "newspaperArticle"),
    ("JFULL", "journalArticle"),
    ("LEGAL", "legalRuleOrRegulation"),
    ("MANSCPT", "manuscript"),
    ("MAP", "map"),
    ("MGZN", "magazineArticle"),
    ("MPCT", "filmOrBroadcast"),
    ("MULTI", "onlineMultimedia"),
    ("MUSIC", "music"),
    ("NEWS", "newspaperArticle"),
    ("PAMP", "pamphlet"),
    ("PAT", "patent"),
    ("RPRT", "report"),
    ("SER", "serial"),
    ("SLIDE", "audiovisualMaterial"),
    ("SOUND", "audiovisualMaterial"),
    ("STAND", "standard"),
    ("STAT", "statute"),
    ("THES", "thesis"),
    ("UNPB", "unpublished"),
];

static TAG_INDEX: Lazy<HashMap<&'static str, &'static FieldMapping>> =
    Lazy::new(|| FIELD_MAPPINGS.iter().map(|m| (m.tag, m)).collect());

static FIELD_INDEX: Lazy<HashMap<&'static str, &'static FieldMapping>> = Lazy::new(|| {
    FIELD_MAPPINGS
        .iter()
        .unique_by(|m| m.field)
        .map(|m| (m.field, m))
        .collect()
});

static TYPE_NAME_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TYPE_MAPPINGS.iter().copied().collect());

static TYPE_CODE_INDEX: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    TYPE_MAPPINGS
        .iter()
        .unique_by(|(_, name)| *name)
        .map(|(code, name)| (*name, *code))
        .collect()
});

/// Look up the field mapping for a RIS tag.
pub fn mapping_for_tag(tag: &str) -> Option<&'static FieldMapping> {
    TAG_INDEX.get(tag).copied()
}

/// Look up the field mapping a reflib field is written back as.
pub fn mapping_for_field(field: &str) -> Option<&'static FieldMapping> {
    FIELD_INDEX.get(field).copied()
}

/// Translate a RIS type code to its reflib type name.
///
/// Unrecognized codes translate to [`UNKNOWN_TYPE`].
pub fn type_name(code: &str) -> &'static str {
    TYPE_NAME_INDEX.get(code).copied().unwrap_or(UNKNOWN_TYPE)
}

/// Translate a reflib type name back to its highest-priority RIS type code.
pub fn type_code(name: &str) -> Option<&'static str> {
    TYPE_CODE_INDEX.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("AU", "authors", true, false)]
    #[case("A1", "authors", true, false)]
    #[case("A2", "authors", true, true)]
    #[case("AB", "abstract", false, false)]
    #[case("KW", "tags", true, false)]
    #[case("SP", "startPage", false, false)]
    #[case("TY", "type", false, false)]
    fn test_mapping_for_tag(
        #[case] tag: &str,
        #[case] field: &str,
        #[case] is_array: bool,
        #[case] split: bool,
    ) {
        let mapping = mapping_for_tag(tag).unwrap();
        assert_eq!(mapping.field, field);
        assert_eq!(mapping.is_array, is_array);
        assert_eq!(mapping.split, split);
    }

    #[test]
    fn test_mapping_for_tag_unknown() {
        assert_eq!(mapping_for_tag("ZZ"), None);
        assert_eq!(mapping_for_tag("ER"), None);
    }

    #[rstest]
    #[case("authors", "AU")]
    #[case("abstract", "AB")]
    #[case("title", "TI")]
    #[case("journal", "JF")]
    #[case("date", "DA")]
    #[case("doi", "DO")]
    fn test_reverse_lookup_keeps_first_declared(#[case] field: &str, #[case] tag: &str) {
        assert_eq!(mapping_for_field(field).unwrap().tag, tag);
    }

    #[test]
    fn test_reverse_lookup_unknown_field() {
        assert_eq!(mapping_for_field("publisher"), None);
    }

    #[test]
    fn test_every_tag_resolves_to_its_own_mapping() {
        for mapping in FIELD_MAPPINGS {
            assert_eq!(mapping_for_tag(mapping.tag), Some(mapping));
        }
    }

    #[rstest]
    #[case("JOUR", "journalArticle")]
    #[case("BOOK", "book")]
    #[case("MPCT", "filmOrBroadcast")]
    #[case("VIDEO", "filmOrBroadcast")]
    #[case("ELEC", "web")]
    #[case("NOPE", "unknown")]
    #[case("", "unknown")]
    fn test_type_name(#[case] code: &str, #[case] name: &str) {
        assert_eq!(type_name(code), name);
    }

    #[rstest]
    #[case("journalArticle", Some("JOUR"))]
    #[case("filmOrBroadcast", Some("VIDEO"))]
    #[case("audiovisualMaterial", Some("ADVS"))]
    #[case("personalCommunication", Some("PCOMM"))]
    #[case("newspaperArticle", Some("INPR"))]
    #[case("web", Some("ELEC"))]
    #[case("sculpture", None)]
    fn test_type_code_priority(#[case] name: &str, #[case] code: Option<&str>) {
        assert_eq!(type_code(name), code);
    }
}
