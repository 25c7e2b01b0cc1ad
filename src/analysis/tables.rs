//! Table normalization.

use crate::model::{NormalizedTable, RawTable, TableEntry};

/// Convert a raw grid into header/row form.
///
/// Cells are trimmed and `None` becomes an empty string. A grid with more
/// than one row uses its first row as headers; a single row is body only.
pub fn normalize_table(raw: &[Vec<Option<String>>]) -> NormalizedTable {
    if raw.is_empty() {
        return NormalizedTable::default();
    }

    let mut cleaned: Vec<Vec<String>> = raw
        .iter()
        .map(|row| row.iter().map(|cell| clean_cell(cell.as_deref())).collect())
        .collect();

    let column_count = cleaned[0].len();
    let headers = if cleaned.len() > 1 {
        cleaned.remove(0)
    } else {
        Vec::new()
    };

    NormalizedTable {
        headers,
        row_count: cleaned.len(),
        rows: cleaned,
        column_count,
    }
}

fn clean_cell(cell: Option<&str>) -> String {
    cell.map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Whether a raw grid has no rows with cells.
pub fn is_degenerate(raw: &[Vec<Option<String>>]) -> bool {
    raw.iter().all(|row| row.is_empty())
}

/// Normalize the grids detected on one page, dropping the degenerate ones.
///
/// `table_index` keeps the grid's position among all grids on the page, so
/// indices may skip over discarded grids.
pub fn page_table_entries(page_number: u32, grids: &[RawTable]) -> Vec<TableEntry> {
    grids
        .iter()
        .enumerate()
        .filter(|(_, grid)| !is_degenerate(grid))
        .filter_map(|(idx, grid)| {
            let table = normalize_table(grid);
            if table.is_empty() {
                log::debug!("page {}: dropping table {} with no body rows", page_number, idx + 1);
                return None;
            }
            Some(TableEntry {
                page_number,
                table_index: idx + 1,
                table,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawTable {
        rows.iter()
            .map(|r| r.iter().map(|c| Some(c.to_string())).collect())
            .collect()
    }

    #[test]
    fn test_empty_grid() {
        let table = normalize_table(&[]);
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
        assert_eq!(table.row_count, 0);
        assert_eq!(table.column_count, 0);
    }

    #[test]
    fn test_header_and_body() {
        let table = normalize_table(&grid(&[&["a", "b"], &["1", "2"]]));
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
        assert_eq!(table.row_count, 1);
        assert_eq!(table.column_count, 2);
    }

    #[test]
    fn test_single_row_has_no_headers() {
        let table = normalize_table(&grid(&[&["x", "y", "z"]]));
        assert!(table.headers.is_empty());
        assert_eq!(table.row_count, 1);
        assert_eq!(table.column_count, 3);
    }

    #[test]
    fn test_cells_are_cleaned() {
        let raw = vec![
            vec![Some(" Name ".to_string()), None],
            vec![None, Some("\t42\n".to_string())],
        ];
        let table = normalize_table(&raw);
        assert_eq!(table.headers, vec!["Name", ""]);
        assert_eq!(table.rows[0], vec!["", "42"]);
    }

    #[test]
    fn test_page_entries_skip_degenerate_grids() {
        let grids = vec![
            Vec::new(),
            vec![Vec::new(), Vec::new()],
            grid(&[&["h1", "h2"], &["a", "b"], &["c", "d"]]),
        ];
        let entries = page_table_entries(4, &grids);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].page_number, 4);
        assert_eq!(entries[0].table_index, 3);
        assert_eq!(entries[0].table.row_count, 2);
    }

    #[test]
    fn test_page_entries_never_emit_empty_tables() {
        let grids = vec![vec![Vec::new(), vec![Some("only".to_string())]]];
        let entries = page_table_entries(1, &grids);
        // header row is empty, single body row survives
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().all(|e| e.table.row_count > 0));
    }
}
