//! Section structure detection.
//!
//! The detector classifies the document's heading convention by counting
//! matches of each heading grammar, extracts headings with the winning
//! grammar, and falls back to well-known academic section names when the
//! primary pass finds fewer than [`MIN_PRIMARY_SECTIONS`] headings.

use std::sync::LazyLock;

use regex::Regex;

use super::{preview, CharOffsets};
use crate::model::{HeadingStyle, SectionEntry, SectionOutline};

/// Below this many primary headings the common-name pass is tried.
pub const MIN_PRIMARY_SECTIONS: usize = 3;

/// Section names recognized by the fallback pass, matched case-insensitively
/// as a whole line with an optional plural `s`.
pub const COMMON_SECTION_NAMES: [&str; 22] = [
    "abstract",
    "introduction",
    "background",
    "related work",
    "methodology",
    "methods",
    "materials and methods",
    "experimental setup",
    "experiments",
    "results",
    "discussion",
    "conclusion",
    "conclusions",
    "future work",
    "acknowledgments",
    "acknowledgements",
    "references",
    "bibliography",
    "appendix",
    "appendices",
    "supplementary material",
    "supplementary materials",
];

static RE_NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\d+(?:\.\d+)*\.?)[ \t]+([A-Z][^\n]{2,80})$")
        .expect("valid numbered heading regex")
});
static RE_ROMAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([IVXLCDM]+\.?)[ \t]+([A-Z][^\n]{2,80})$")
        .expect("valid roman heading regex")
});
static RE_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Z]\.)[ \t]+([A-Z][^\n]{2,80})$").expect("valid letter heading regex")
});
static RE_UPPERCASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Z][A-Z ]{3,59})$").expect("valid uppercase heading regex")
});
static RE_COMMON_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let names = COMMON_SECTION_NAMES
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?im)^(?:{})s?\s*\n", names)).expect("valid common name regex")
});

/// How a grammar's first capture turns into a section number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numeral {
    /// Dot-delimited numeral; depth sets the level.
    Hierarchical,
    /// Single label such as `IV` or `B`; always level 1.
    Label,
    /// The whole match is the title.
    Absent,
}

/// A heading grammar: one style, one line-anchored pattern.
struct HeadingGrammar {
    style: HeadingStyle,
    pattern: &'static LazyLock<Regex>,
    numeral: Numeral,
    /// Extraction-time filter on the trimmed title.
    accept: fn(&str) -> bool,
}

/// Grammars in tie-break priority order.
static GRAMMARS: [HeadingGrammar; 4] = [
    HeadingGrammar {
        style: HeadingStyle::Numbered,
        pattern: &RE_NUMBERED,
        numeral: Numeral::Hierarchical,
        accept: accept_any,
    },
    HeadingGrammar {
        style: HeadingStyle::Roman,
        pattern: &RE_ROMAN,
        numeral: Numeral::Label,
        accept: accept_any,
    },
    HeadingGrammar {
        style: HeadingStyle::Letter,
        pattern: &RE_LETTER,
        numeral: Numeral::Label,
        accept: accept_any,
    },
    HeadingGrammar {
        style: HeadingStyle::Uppercase,
        pattern: &RE_UPPERCASE,
        numeral: Numeral::Absent,
        accept: accept_uppercase,
    },
];

fn accept_any(_title: &str) -> bool {
    true
}

/// Drops running headers and page furniture caught by the uppercase grammar.
fn accept_uppercase(title: &str) -> bool {
    let len = title.chars().count();
    (4..=50).contains(&len) && !title.chars().all(|c| c.is_ascii_digit())
}

/// A heading located in the text. Offsets are byte offsets.
#[derive(Debug, Clone)]
struct Heading {
    start: usize,
    end: usize,
    number: Option<String>,
    title: String,
    level: u32,
}

impl HeadingGrammar {
    fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    fn headings(&self, text: &str) -> Vec<Heading> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let first = caps.get(1)?.as_str();
                let (number, title, level) = match self.numeral {
                    Numeral::Hierarchical => {
                        let number = first.trim_end_matches('.');
                        let level = number.matches('.').count() as u32 + 1;
                        (Some(number.to_string()), caps.get(2)?.as_str().trim(), level)
                    }
                    Numeral::Label => (
                        Some(first.trim_end_matches('.').to_string()),
                        caps.get(2)?.as_str().trim(),
                        1,
                    ),
                    Numeral::Absent => (None, first.trim(), 1),
                };
                if !(self.accept)(title) {
                    return None;
                }
                Some(Heading {
                    start: whole.start(),
                    end: whole.end(),
                    number,
                    title: title.to_string(),
                    level,
                })
            })
            .collect()
    }
}

/// Count matches of every heading grammar, in priority order.
pub fn heading_counts(text: &str) -> Vec<(HeadingStyle, usize)> {
    GRAMMARS.iter().map(|g| (g.style, g.count(text))).collect()
}

/// Classify the document's heading convention.
///
/// The grammar with the greatest match count wins; ties go to the earlier
/// grammar in priority order. No matches at all yields `Unknown`.
pub fn classify_heading_style(text: &str) -> HeadingStyle {
    let counts = heading_counts(text);
    log::debug!("heading counts: {:?}", counts);

    let mut best = (HeadingStyle::Unknown, 0);
    for (style, count) in counts {
        if count > best.1 {
            best = (style, count);
        }
    }
    best.0
}

/// Detect the document's sections and the heading style that produced them.
pub fn detect_sections(text: &str) -> SectionOutline {
    let mut style = classify_heading_style(text);
    let mut headings = GRAMMARS
        .iter()
        .find(|g| g.style == style)
        .map(|g| g.headings(text))
        .unwrap_or_default();

    if headings.len() < MIN_PRIMARY_SECTIONS {
        let common = common_name_headings(text);
        if common.len() > headings.len() {
            log::debug!(
                "{} {} headings, {} common-name headings; using common names",
                headings.len(),
                style,
                common.len()
            );
            headings = common;
            style = HeadingStyle::CommonNames;
        }
    }

    SectionOutline {
        sections: build_sections(text, &headings),
        style,
    }
}

/// Whole-line matches of [`COMMON_SECTION_NAMES`], in document order.
fn common_name_headings(text: &str) -> Vec<Heading> {
    RE_COMMON_NAME
        .find_iter(text)
        .map(|m| Heading {
            start: m.start(),
            end: m.end(),
            number: None,
            title: m.as_str().trim().to_string(),
            level: 1,
        })
        .collect()
}

/// Turn headings into entries whose bodies run to the next heading.
fn build_sections(text: &str, headings: &[Heading]) -> Vec<SectionEntry> {
    let mut offsets = CharOffsets::new(text);
    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let body_end = headings.get(i + 1).map_or(text.len(), |next| next.start);
            let body = text.get(heading.end..body_end).unwrap_or_default().trim();
            SectionEntry {
                number: heading.number.clone(),
                title: heading.title.clone(),
                level: heading.level,
                start_position: offsets.at(heading.start),
                content_preview: preview(body),
            }
        })
        .collect()
}
