//! Scanned-document heuristic.

/// Average characters per page below which a document looks image-only.
pub const MIN_CHARS_PER_PAGE: f64 = 100.0;

/// Estimate whether a document is scanned from its text density.
///
/// A document with no pages is treated as scanned.
pub fn looks_scanned(full_text: &str, page_count: usize) -> bool {
    if page_count == 0 {
        return true;
    }
    let chars = full_text.chars().count() as f64;
    chars / (page_count as f64) < MIN_CHARS_PER_PAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_scanned() {
        assert!(looks_scanned("", 5));
    }

    #[test]
    fn test_dense_text_is_not_scanned() {
        assert!(!looks_scanned(&"x".repeat(1000), 5));
    }

    #[test]
    fn test_zero_pages_is_scanned() {
        assert!(looks_scanned("", 0));
        assert!(looks_scanned(&"x".repeat(10_000), 0));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!looks_scanned(&"x".repeat(100), 1));
        assert!(looks_scanned(&"x".repeat(99), 1));
        assert!(looks_scanned(&"x".repeat(199), 2));
    }
}
