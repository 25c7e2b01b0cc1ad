//! Table detection from text positions (stream mode).
//!
//! Tables are recovered without ruling lines: spans are grouped into rows by
//! baseline, column edges are found where left edges line up across rows,
//! and runs of consecutive aligned rows become table regions.

use std::collections::{HashMap, HashSet};

use super::layout::TextSpan;
use crate::model::RawTable;

/// Left edges within this many points share a column bucket.
const EDGE_BUCKET: f32 = 5.0;

/// A span aligns with a column edge within this many points.
const ALIGN_TOLERANCE: f32 = 5.0;

/// Spans may start this far left of their column edge.
const COLUMN_SLACK: f32 = 10.0;

/// Thresholds for accepting a grid as a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Consecutive aligned rows needed, header row included
    pub min_rows: usize,
    /// Fewest column edges a grid may have
    pub min_columns: usize,
    /// More edges than this usually means justified prose split into words
    pub max_columns: usize,
    /// Baselines closer than this fraction of the font size share a row
    pub y_tolerance_factor: f32,
    /// Share of rows an edge needs to be a column, and of spans a row needs to be aligned
    pub min_alignment_ratio: f32,
    /// Closest two column edges may sit, in points
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Spans sharing a baseline, sorted left to right.
#[derive(Debug, Clone)]
struct Row {
    spans: Vec<TextSpan>,
}

/// Detects table grids in a page's spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables and return them as raw grids, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<RawTable> {
        let cfg = &self.config;
        if spans.len() < cfg.min_rows * cfg.min_columns {
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);
        let columns = self.detect_columns(&rows);
        log::debug!(
            "table detector: {} rows, column edges {:?}",
            rows.len(),
            columns
        );
        if rows.len() < cfg.min_rows || columns.len() < cfg.min_columns {
            return Vec::new();
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_regions(&rows, &columns) {
            let region = &rows[start..=end];
            let region_columns = self.detect_columns(region);

            if region_columns.len() < cfg.min_columns {
                continue;
            }
            if region_columns.len() > cfg.max_columns {
                log::debug!(
                    "table detector: skipping region, too many columns ({} > {})",
                    region_columns.len(),
                    cfg.max_columns
                );
                continue;
            }
            if is_list_pattern(region, &region_columns) {
                log::debug!("table detector: skipping region, looks like a list");
                continue;
            }

            tables.push(to_grid(region, &region_columns));
        }
        tables
    }

    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<Row> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<Row> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(Row::new(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(Row::new(current));
        }
        rows
    }

    /// Column edges from left edges that recur across rows.
    ///
    /// Rows with two or more spans are preferred; when too few exist every
    /// span of every row votes instead.
    fn detect_columns(&self, rows: &[Row]) -> Vec<f32> {
        let multi: Vec<&Row> = rows.iter().filter(|r| r.spans.len() >= 2).collect();

        let mut counts: HashMap<i32, usize> = HashMap::new();
        let voters = if multi.len() >= self.config.min_rows {
            for row in &multi {
                let buckets: HashSet<i32> = row.spans.iter().map(|s| bucket(s.x)).collect();
                for b in buckets {
                    *counts.entry(b).or_insert(0) += 1;
                }
            }
            multi.len()
        } else {
            for span in rows.iter().flat_map(|r| r.spans.iter()) {
                *counts.entry(bucket(span.x)).or_insert(0) += 1;
            }
            rows.len()
        };

        let min_occurrences =
            ((voters as f32 * self.config.min_alignment_ratio) as usize).max(2);
        let mut edges: Vec<f32> = counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(b, _)| b as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(f32::total_cmp);

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Runs of at least `min_rows` consecutive rows aligned with `columns`.
    fn find_regions(&self, rows: &[Row], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }
        regions
    }
}

impl Row {
    fn new(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { spans }
    }
}

fn bucket(x: f32) -> i32 {
    (x / EDGE_BUCKET).round() as i32
}

/// Fraction of a row's spans that start on a column edge.
fn alignment_score(row: &Row, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|s| columns.iter().any(|c| (s.x - c).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Lay a region's spans out on its columns. Empty cells are `None`.
fn to_grid(rows: &[Row], columns: &[f32]) -> RawTable {
    rows.iter()
        .map(|row| {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for span in &row.spans {
                cells[column_for(span.x, columns)].push(span.text.trim());
            }
            cells
                .into_iter()
                .map(|parts| (!parts.is_empty()).then(|| parts.join(" ")))
                .collect()
        })
        .collect()
}

/// Column whose `[edge - slack, next_edge - slack)` range holds `x`, else the nearest.
fn column_for(x: f32, columns: &[f32]) -> usize {
    let in_range = columns.iter().enumerate().position(|(i, &edge)| {
        let end = columns.get(i + 1).map_or(f32::INFINITY, |next| next - COLUMN_SLACK);
        x >= edge - COLUMN_SLACK && x < end
    });
    in_range.unwrap_or_else(|| {
        columns
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
            .map_or(0, |(i, _)| i)
    })
}

/// Bulleted or numbered lists split into marker and text spans look like
/// two-column tables.
fn is_list_pattern(rows: &[Row], columns: &[f32]) -> bool {
    if columns.len() < 2 || rows.is_empty() {
        return false;
    }

    let mut bullets = 0;
    let mut numbers = 0;
    for row in rows {
        let Some(first) = row.spans.first() else {
            continue;
        };
        let text = first.text.trim();
        if is_bullet_marker(text) {
            bullets += 1;
        } else if is_number_marker(text) {
            numbers += 1;
        }
    }

    let total = rows.len() as f32;
    bullets as f32 / total >= 0.5 || (columns.len() == 2 && (bullets + numbers) as f32 / total >= 0.5)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text,
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆"
    )
}

/// `1.`, `12)`, a bare number, or a single letter followed by `.` or `)`.
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    let digits = cleaned.chars().take_while(char::is_ascii_digit).count();
    let rest = &cleaned[digits..];
    if digits > 0 && (rest.is_empty() || rest == "." || rest == ")") {
        return true;
    }
    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}
