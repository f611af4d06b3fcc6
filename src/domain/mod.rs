//! Domain layer: report model, decoding, tree building and search
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod content;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod node;
pub mod search;

pub use builder::{TreeBuilder, DEFAULT_ROOT_LABEL};
pub use content::{extract_coded, ContentItem, ContentValue, MeasuredValue};
pub use dataset::{tags, Dataset, Element, Tag};
pub use decoder::ContentItemDecoder;
pub use error::{DomainError, DomainResult};
pub use node::{CodedConcept, Node, NodeId, Payload, SopReference, ValueType};
pub use search::{SearchCriteria, SearchEngine};
