//! Request-scoped value types produced by the structure-recovery heuristics.
//!
//! Nothing here is persisted or shared between requests; every value is
//! built once and then only serialized.

mod document;
mod reference;
mod section;
mod table;

pub use document::{DocumentInfo, PageText, TextPayload};
pub use reference::{CitationStyle, ReferenceEntry, ReferenceExtraction, ReferencesPayload};
pub use section::{HeadingStyle, HierarchyEntry, SectionEntry, SectionOutline, SectionsPayload};
pub use table::{NormalizedTable, RawTable, TableEntry, TablesPayload};
