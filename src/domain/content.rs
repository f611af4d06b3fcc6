//! Typed view of a raw content item.
//!
//! All attribute probing of a content item happens here. The result is a closed
//! variant that carries only the fields its value type can have.

use crate::domain::dataset::{tags, Dataset, Tag};
use crate::domain::node::{CodedConcept, SopReference, ValueType};

/// A content item read from the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    /// The item has no value type; nothing else is read from it.
    Untyped,
    Typed {
        concept_name: Option<CodedConcept>,
        relationship: Option<String>,
        value: ContentValue,
    },
}

/// Type-specific payload of a typed content item.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    Text(Option<String>),
    Code(Option<CodedConcept>),
    Num(Option<MeasuredValue>),
    Container,
    /// DATETIME, DATE, TIME, PNAME and UIDREF: a single literal value.
    Literal {
        value_type: ValueType,
        literal: Option<String>,
    },
    /// IMAGE, COMPOSITE and WAVEFORM: a referenced SOP instance.
    Reference {
        value_type: ValueType,
        reference: Option<SopReference>,
    },
    /// A value type without a dedicated payload reader.
    Unhandled(ValueType),
}

impl ContentValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            ContentValue::Text(_) => ValueType::Text,
            ContentValue::Code(_) => ValueType::Code,
            ContentValue::Num(_) => ValueType::Num,
            ContentValue::Container => ValueType::Container,
            ContentValue::Literal { value_type, .. }
            | ContentValue::Reference { value_type, .. }
            | ContentValue::Unhandled(value_type) => value_type.clone(),
        }
    }
}

/// First entry of a measured value sequence that carries a numeric value.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredValue {
    pub numeric: String,
    pub unit: Option<CodedConcept>,
}

impl ContentItem {
    pub fn read(item: &Dataset) -> Self {
        let Some(raw_type) = item.string(tags::VALUE_TYPE) else {
            return ContentItem::Untyped;
        };
        let value_type = ValueType::from_source(raw_type);

        let value = match value_type {
            ValueType::Text => ContentValue::Text(read_raw(item, tags::TEXT_VALUE)),
            ValueType::Code => {
                ContentValue::Code(extract_coded(item, tags::CONCEPT_CODE_SEQUENCE))
            }
            ValueType::Num => ContentValue::Num(read_measured_value(item)),
            ValueType::Container => ContentValue::Container,
            ValueType::DateTime
            | ValueType::Date
            | ValueType::Time
            | ValueType::PName
            | ValueType::UidRef => {
                let literal = literal_tag(&value_type).and_then(|tag| read_trimmed(item, tag));
                ContentValue::Literal {
                    value_type,
                    literal,
                }
            }
            ValueType::Image | ValueType::Composite | ValueType::Waveform => {
                ContentValue::Reference {
                    value_type,
                    reference: read_reference(item),
                }
            }
            other => ContentValue::Unhandled(other),
        };

        ContentItem::Typed {
            concept_name: extract_coded(item, tags::CONCEPT_NAME_CODE_SEQUENCE),
            relationship: read_raw(item, tags::RELATIONSHIP_TYPE),
            value,
        }
    }
}

/// Read the first entry of a code sequence.
///
/// Returns `None` when the sequence is absent or empty. Each sub-field is kept
/// trimmed when present and non-blank, otherwise it becomes an empty string.
pub fn extract_coded(item: &Dataset, sequence: Tag) -> Option<CodedConcept> {
    let entry = item.sequence(sequence)?.first()?;
    Some(CodedConcept {
        meaning: coded_field(entry, tags::CODE_MEANING),
        value: coded_field(entry, tags::CODE_VALUE),
        scheme: coded_field(entry, tags::CODING_SCHEME_DESIGNATOR),
    })
}

fn coded_field(entry: &Dataset, tag: Tag) -> String {
    read_trimmed(entry, tag).unwrap_or_default()
}

/// Free text and relationship labels are kept exactly as stored.
fn read_raw(item: &Dataset, tag: Tag) -> Option<String> {
    item.string(tag).map(str::to_string)
}

fn read_trimmed(item: &Dataset, tag: Tag) -> Option<String> {
    item.string(tag)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn read_measured_value(item: &Dataset) -> Option<MeasuredValue> {
    let measured = item.sequence(tags::MEASURED_VALUE_SEQUENCE)?.first()?;
    let numeric = read_trimmed(measured, tags::NUMERIC_VALUE)?;
    Some(MeasuredValue {
        numeric,
        unit: extract_coded(measured, tags::MEASUREMENT_UNITS_CODE_SEQUENCE),
    })
}

fn read_reference(item: &Dataset) -> Option<SopReference> {
    let referenced = item.sequence(tags::REFERENCED_SOP_SEQUENCE)?.first()?;
    Some(SopReference {
        class_uid: read_trimmed(referenced, tags::REFERENCED_SOP_CLASS_UID),
        instance_uid: read_trimmed(referenced, tags::REFERENCED_SOP_INSTANCE_UID),
    })
}

fn literal_tag(value_type: &ValueType) -> Option<Tag> {
    match value_type {
        ValueType::DateTime => Some(tags::DATE_TIME),
        ValueType::Date => Some(tags::DATE),
        ValueType::Time => Some(tags::TIME),
        ValueType::PName => Some(tags::PERSON_NAME),
        ValueType::UidRef => Some(tags::UID),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_item(meaning: Option<&str>, value: &str, scheme: &str) -> Dataset {
        let mut entry = Dataset::new()
            .with_string(tags::CODE_VALUE, value)
            .with_string(tags::CODING_SCHEME_DESIGNATOR, scheme);
        if let Some(m) = meaning {
            entry = entry.with_string(tags::CODE_MEANING, m);
        }
        entry
    }

    #[test]
    fn given_missing_sequence_when_extracting_coded_then_returns_none() {
        let item = Dataset::new();
        assert_eq!(extract_coded(&item, tags::CONCEPT_NAME_CODE_SEQUENCE), None);
    }

    #[test]
    fn given_empty_sequence_when_extracting_coded_then_returns_none() {
        let item = Dataset::new().with_sequence(tags::CONCEPT_NAME_CODE_SEQUENCE, vec![]);
        assert_eq!(extract_coded(&item, tags::CONCEPT_NAME_CODE_SEQUENCE), None);
    }

    #[test]
    fn given_blank_null_and_missing_fields_when_extracting_coded_then_normalizes_to_empty() {
        let entry = Dataset::new()
            .with_string(tags::CODE_VALUE, "   ")
            .with_null(tags::CODE_MEANING);
        let item = Dataset::new().with_sequence(tags::CONCEPT_NAME_CODE_SEQUENCE, vec![entry]);

        let coded = extract_coded(&item, tags::CONCEPT_NAME_CODE_SEQUENCE).unwrap();
        assert_eq!(coded, CodedConcept::new("", "", ""));
    }

    #[test]
    fn given_padded_fields_when_extracting_coded_then_trims() {
        let item = Dataset::new().with_sequence(
            tags::CONCEPT_NAME_CODE_SEQUENCE,
            vec![code_item(Some(" Size "), "112039 ", "DCM")],
        );
        let coded = extract_coded(&item, tags::CONCEPT_NAME_CODE_SEQUENCE).unwrap();
        assert_eq!(coded, CodedConcept::new("Size", "112039", "DCM"));
    }

    #[test]
    fn given_no_value_type_when_reading_then_untyped_even_with_other_attributes() {
        let item = Dataset::new()
            .with_string(tags::RELATIONSHIP_TYPE, "CONTAINS")
            .with_string(tags::TEXT_VALUE, "ignored");
        assert_eq!(ContentItem::read(&item), ContentItem::Untyped);
    }

    #[test]
    fn given_padded_text_and_relationship_when_reading_then_kept_verbatim() {
        let item = Dataset::new()
            .with_string(tags::VALUE_TYPE, "TEXT")
            .with_string(tags::RELATIONSHIP_TYPE, "HAS OBS CONTEXT ")
            .with_string(tags::TEXT_VALUE, "  indented note ");

        assert_eq!(
            ContentItem::read(&item),
            ContentItem::Typed {
                concept_name: None,
                relationship: Some("HAS OBS CONTEXT ".to_string()),
                value: ContentValue::Text(Some("  indented note ".to_string())),
            }
        );

        let blank = Dataset::new()
            .with_string(tags::VALUE_TYPE, "TEXT")
            .with_string(tags::TEXT_VALUE, "");
        match ContentItem::read(&blank) {
            ContentItem::Typed { value, .. } => {
                assert_eq!(value, ContentValue::Text(Some(String::new())))
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn given_num_without_numeric_value_when_reading_then_measurement_is_none() {
        let measured = Dataset::new().with_sequence(
            tags::MEASUREMENT_UNITS_CODE_SEQUENCE,
            vec![code_item(None, "mm", "UCUM")],
        );
        let item = Dataset::new()
            .with_string(tags::VALUE_TYPE, "NUM")
            .with_sequence(tags::MEASURED_VALUE_SEQUENCE, vec![measured]);

        match ContentItem::read(&item) {
            ContentItem::Typed { value, .. } => assert_eq!(value, ContentValue::Num(None)),
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn given_image_when_reading_then_collects_reference_pair() {
        let referenced = Dataset::new()
            .with_string(tags::REFERENCED_SOP_CLASS_UID, "1.2.840.10008.5.1.4.1.1.1")
            .with_string(tags::REFERENCED_SOP_INSTANCE_UID, "1.2.3.4");
        let item = Dataset::new()
            .with_string(tags::VALUE_TYPE, "IMAGE")
            .with_sequence(tags::REFERENCED_SOP_SEQUENCE, vec![referenced]);

        let ContentItem::Typed { value, .. } = ContentItem::read(&item) else {
            panic!("expected typed item");
        };
        assert_eq!(
            value,
            ContentValue::Reference {
                value_type: ValueType::Image,
                reference: Some(SopReference {
                    class_uid: Some("1.2.840.10008.5.1.4.1.1.1".into()),
                    instance_uid: Some("1.2.3.4".into()),
                }),
            }
        );
    }
}
