//! In-memory attribute model of a structured report document.
//!
//! A `Dataset` is an ordered map from DICOM tags to elements. Elements are either
//! string-valued (numbers are kept in their textual form) or nested sequences of
//! datasets. Byte-level decoding is left to the loaders in `infrastructure`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// DICOM attribute tag (group, element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u16, pub u16);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl FromStr for Tag {
    type Err = DomainError;

    /// Parse the 8-hex-digit key form used by the DICOM JSON model, e.g. `0040A040`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidTag(s.to_string());
        if s.len() != 8 || !s.is_ascii() {
            return Err(invalid());
        }
        let group = u16::from_str_radix(&s[..4], 16).map_err(|_| invalid())?;
        let element = u16::from_str_radix(&s[4..], 16).map_err(|_| invalid())?;
        Ok(Tag(group, element))
    }
}

/// Well-known tags used by the content tree.
pub mod tags {
    use super::Tag;

    // Code sequence item
    pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
    pub const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
    pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);

    // Document level
    pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
    pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
    pub const MODALITY: Tag = Tag(0x0008, 0x0060);
    pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
    pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);

    // References
    pub const REFERENCED_SOP_CLASS_UID: Tag = Tag(0x0008, 0x1150);
    pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);
    pub const REFERENCED_SOP_SEQUENCE: Tag = Tag(0x0008, 0x1199);

    // Content item
    pub const MEASUREMENT_UNITS_CODE_SEQUENCE: Tag = Tag(0x0040, 0x08EA);
    pub const RELATIONSHIP_TYPE: Tag = Tag(0x0040, 0xA010);
    pub const VALUE_TYPE: Tag = Tag(0x0040, 0xA040);
    pub const CONCEPT_NAME_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA043);
    pub const DATE_TIME: Tag = Tag(0x0040, 0xA120);
    pub const DATE: Tag = Tag(0x0040, 0xA121);
    pub const TIME: Tag = Tag(0x0040, 0xA122);
    pub const PERSON_NAME: Tag = Tag(0x0040, 0xA123);
    pub const UID: Tag = Tag(0x0040, 0xA124);
    pub const TEXT_VALUE: Tag = Tag(0x0040, 0xA160);
    pub const CONCEPT_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA168);
    pub const MEASURED_VALUE_SEQUENCE: Tag = Tag(0x0040, 0xA300);
    pub const NUMERIC_VALUE: Tag = Tag(0x0040, 0xA30A);
    pub const CONTENT_SEQUENCE: Tag = Tag(0x0040, 0xA730);
}

/// Value of a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// String-like values. A `None` entry is present in the document but null.
    Strings(Vec<Option<String>>),
    /// Nested items of a sequence attribute.
    Sequence(Vec<Dataset>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    elements: BTreeMap<Tag, Element>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag, element: Element) {
        self.elements.insert(tag, element);
    }

    pub fn with_string(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.insert(tag, Element::Strings(vec![Some(value.into())]));
        self
    }

    /// Attribute present with a single null entry.
    pub fn with_null(mut self, tag: Tag) -> Self {
        self.insert(tag, Element::Strings(vec![None]));
        self
    }

    pub fn with_sequence(mut self, tag: Tag, items: Vec<Dataset>) -> Self {
        self.insert(tag, Element::Sequence(items));
        self
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    /// First value of a string attribute; `None` when absent, empty, null or a sequence.
    pub fn string(&self, tag: Tag) -> Option<&str> {
        match self.elements.get(&tag)? {
            Element::Strings(values) => values.first()?.as_deref(),
            Element::Sequence(_) => None,
        }
    }

    /// Items of a sequence attribute; `None` when absent or not a sequence.
    pub fn sequence(&self, tag: Tag) -> Option<&[Dataset]> {
        match self.elements.get(&tag)? {
            Element::Sequence(items) => Some(items),
            Element::Strings(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
