//! Table types.

use serde::{Deserialize, Serialize};

/// A raw grid as produced by the table detector.
///
/// Rows may be ragged; `None` marks a cell with no text.
pub type RawTable = Vec<Vec<Option<String>>>;

/// Header/row form of a table grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    /// First row of a multi-row grid, empty otherwise
    pub headers: Vec<String>,

    /// Body rows
    pub rows: Vec<Vec<String>>,

    /// Number of body rows
    pub row_count: usize,

    /// Width of the first row
    pub column_count: usize,
}

impl NormalizedTable {
    /// Check if the table has no body rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// A table located on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Page the table was found on (1-indexed)
    pub page_number: u32,

    /// Position of the table among the grids detected on its page (1-indexed)
    pub table_index: usize,

    #[serde(flatten)]
    pub table: NormalizedTable,
}

/// Payload of the `extract_tables` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesPayload {
    pub tables: Vec<TableEntry>,
    pub table_count: usize,
    pub page_count: usize,
}

impl TablesPayload {
    /// Build the payload from page-ordered entries.
    pub fn new(tables: Vec<TableEntry>, page_count: usize) -> Self {
        Self {
            table_count: tables.len(),
            tables,
            page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entry_is_flat() {
        let entry = TableEntry {
            page_number: 2,
            table_index: 1,
            table: NormalizedTable {
                headers: vec!["a".into(), "b".into()],
                rows: vec![vec!["1".into(), "2".into()]],
                row_count: 1,
                column_count: 2,
            },
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["page_number"], 2);
        assert_eq!(value["headers"][1], "b");
        assert_eq!(value["row_count"], 1);
        assert!(value.get("table").is_none());
    }

    #[test]
    fn test_payload_counts() {
        let payload = TablesPayload::new(Vec::new(), 3);
        assert_eq!(payload.table_count, 0);
        assert_eq!(payload.page_count, 3);
    }
}
