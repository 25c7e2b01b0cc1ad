//! Reference section location and citation parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::{collapse_whitespace, CharOffsets};
use crate::model::{CitationStyle, ReferenceEntry, ReferenceExtraction};

/// Line-based fallback keeps paragraphs longer than this many characters.
pub const MIN_FALLBACK_CHARS: usize = 20;

static RE_HEADERS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"(?i)(?:^|\n)\s*references?\s*\n",
        r"(?i)(?:^|\n)\s*bibliography\s*\n",
        r"(?i)(?:^|\n)\s*works?\s+cited\s*\n",
        r"(?i)(?:^|\n)\s*literature\s+cited\s*\n",
    ]
    .map(|p| Regex::new(p).expect("valid references header regex"))
});
static RE_REGION_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\n\s*(?:appendix|supplementary|acknowledgment|acknowledgement)")
        .expect("valid region end regex")
});

static RE_BRACKET_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\[(\d+)\]\s*").expect("valid bracket head regex"));
static RE_BRACKET_NEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\[\d+\]").expect("valid bracket boundary regex"));
static RE_DOT_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\d+)\.\s+").expect("valid dot head regex"));
static RE_DOT_NEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\d+\.").expect("valid dot boundary regex"));
static RE_AUTHOR_YEAR_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[A-Z][a-zA-Z\-']+(?:,?\s+(?:and\s+)?[A-Z]\.?\s*)+\.?\s*\(\d{4}\)")
        .expect("valid author-year head regex")
});
static RE_AUTHOR_YEAR_NEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[A-Z][a-zA-Z\-']+(?:,?\s+(?:and\s+)?[A-Z]\.?\s*)+")
        .expect("valid author-year boundary regex")
});

static RE_DOI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:doi[:\s]*|https?://(?:dx\.)?doi\.org/)?(10\.\d{4,}/[^\s]+)")
        .expect("valid doi regex")
});
static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s\]\)]+").expect("valid url regex"));
static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year regex"));
static RE_PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid paragraph break regex"));

/// A citation listing grammar.
///
/// An entry starts at a `head` match and its body runs until the next
/// `boundary` match, a blank line, or the end of the region, whichever
/// comes first.
struct CitationGrammar {
    style: CitationStyle,
    head: &'static LazyLock<Regex>,
    boundary: &'static LazyLock<Regex>,
    /// Author-year bodies start with the author list itself.
    body_includes_head: bool,
}

/// Grammars in fallback order.
static GRAMMARS: [CitationGrammar; 3] = [
    CitationGrammar {
        style: CitationStyle::NumberedBracket,
        head: &RE_BRACKET_HEAD,
        boundary: &RE_BRACKET_NEXT,
        body_includes_head: false,
    },
    CitationGrammar {
        style: CitationStyle::NumberedDot,
        head: &RE_DOT_HEAD,
        boundary: &RE_DOT_NEXT,
        body_includes_head: false,
    },
    CitationGrammar {
        style: CitationStyle::AuthorYear,
        head: &RE_AUTHOR_YEAR_HEAD,
        boundary: &RE_AUTHOR_YEAR_NEXT,
        body_includes_head: true,
    },
];

/// One raw citation cut out of the references region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawCitation<'t> {
    number: Option<&'t str>,
    body: &'t str,
}

impl CitationGrammar {
    fn citations<'t>(&self, region: &'t str) -> Vec<RawCitation<'t>> {
        let mut citations = Vec::new();
        let mut pos = 0;

        while let Some(caps) = self.head.captures_at(region, pos) {
            let Some(head) = caps.get(0) else { break };
            // The body holds at least one character.
            let Some(first) = region[head.end()..].chars().next() else {
                break;
            };
            let scan_from = head.end() + first.len_utf8();

            let mut body_end = region.len();
            if let Some(next) = self.boundary.find_at(region, scan_from) {
                body_end = body_end.min(next.start());
            }
            if let Some(blank) = region[scan_from..].find("\n\n") {
                body_end = body_end.min(scan_from + blank);
            }

            let body_start = if self.body_includes_head {
                head.start()
            } else {
                head.end()
            };
            let body = region[body_start..body_end].trim();
            if !body.is_empty() {
                citations.push(RawCitation {
                    number: caps.get(1).map(|m| m.as_str()),
                    body,
                });
            }
            pos = body_end;
        }

        citations
    }

    fn parse(&self, region: &str) -> Vec<ReferenceEntry> {
        self.citations(region)
            .into_iter()
            .map(|c| parse_citation(c.body, c.number))
            .collect()
    }
}

/// The bounded references region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRegion<'t> {
    /// Trimmed region text
    pub text: &'t str,
    /// Character offset of the header match
    pub start: usize,
}

/// Find the references header and bound the region that follows it.
///
/// The earliest header across all header grammars wins. The region ends at
/// the first appendix, supplementary or acknowledgment line. An empty region
/// counts as no references section.
pub fn locate_references(text: &str) -> Option<ReferenceRegion<'_>> {
    let mut header: Option<regex::Match<'_>> = None;
    for pattern in RE_HEADERS.iter() {
        if let Some(m) = pattern.find(text) {
            if header.map_or(true, |h| m.start() < h.start()) {
                header = Some(m);
            }
        }
    }
    let header = header?;

    let remaining = &text[header.end()..];
    let end = RE_REGION_END
        .find(remaining)
        .map_or(remaining.len(), |m| m.start());
    let region = remaining[..end].trim();
    if region.is_empty() {
        log::debug!("references header found but region is empty");
        return None;
    }

    Some(ReferenceRegion {
        text: region,
        start: CharOffsets::new(text).at(header.start()),
    })
}

/// Count entries of every citation grammar, in fallback order.
pub fn citation_counts(region: &str) -> Vec<(CitationStyle, usize)> {
    GRAMMARS
        .iter()
        .map(|g| (g.style, g.citations(region).len()))
        .collect()
}

/// Classify the citation style of a references region.
///
/// The grammar with the strictly greatest entry count wins; a tie for the
/// top count or no entries at all yields `Unknown`.
pub fn classify_citation_style(region: &str) -> CitationStyle {
    let counts = citation_counts(region);
    log::debug!("citation counts: {:?}", counts);

    let top = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if top == 0 {
        return CitationStyle::Unknown;
    }
    let mut leaders = counts.iter().filter(|(_, n)| *n == top);
    match (leaders.next(), leaders.next()) {
        (Some((style, _)), None) => *style,
        _ => CitationStyle::Unknown,
    }
}

/// Locate the references section and parse its citations.
pub fn extract_references(text: &str) -> ReferenceExtraction {
    let Some(region) = locate_references(text) else {
        return ReferenceExtraction::default();
    };

    let style = classify_citation_style(region.text);
    let mut entries = GRAMMARS
        .iter()
        .find(|g| g.style == style)
        .map(|g| g.parse(region.text))
        .unwrap_or_default();

    if entries.is_empty() {
        entries = GRAMMARS
            .iter()
            .map(|g| g.parse(region.text))
            .find(|parsed| !parsed.is_empty())
            .unwrap_or_default();
    }

    if !entries.is_empty() {
        return ReferenceExtraction {
            entries,
            style,
            section_found: true,
            section_start: Some(region.start),
            used_line_fallback: false,
        };
    }

    log::debug!("no citation grammar matched; splitting references region on blank lines");
    ReferenceExtraction {
        entries: split_paragraphs(region.text),
        style: CitationStyle::LineBased,
        section_found: true,
        section_start: Some(region.start),
        used_line_fallback: true,
    }
}

/// Line-based fallback: one entry per paragraph, numbered over kept paragraphs.
fn split_paragraphs(region: &str) -> Vec<ReferenceEntry> {
    RE_PARAGRAPH_BREAK
        .split(region)
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_FALLBACK_CHARS)
        .enumerate()
        .map(|(i, p)| {
            let number = (i + 1).to_string();
            parse_citation(p, Some(number.as_str()))
        })
        .collect()
}

/// Extract structured fields from one citation body.
pub fn parse_citation(body: &str, number: Option<&str>) -> ReferenceEntry {
    let raw_text = collapse_whitespace(body);

    let doi = RE_DOI
        .captures(&raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string())
        .filter(|doi| !doi.is_empty());

    let url = RE_URL
        .find_iter(&raw_text)
        .map(|m| m.as_str())
        .find(|url| !url.contains("doi.org"))
        .map(String::from);

    let year_match = RE_YEAR.find(&raw_text);
    let year = year_match.map(|m| m.as_str().to_string());
    let authors = year_match
        .map(|m| clean_authors(&raw_text[..m.start()]))
        .filter(|authors| authors.chars().count() > 2)
        .map(String::from);

    ReferenceEntry {
        number: number.map(String::from),
        authors,
        year,
        doi,
        url,
        raw_text,
    }
}

fn clean_authors(text: &str) -> &str {
    text.trim_end_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | ',')
    })
    .trim_start()
}
