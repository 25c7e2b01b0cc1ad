//! Positioned text extraction from page content streams.
//!
//! Walks the text operators of a decoded content stream and records each
//! shown string together with its text-space origin and effective font size.
//! The table detector works purely on these spans.

use lopdf::content::Content;
use lopdf::Object;

use crate::error::{Error, Result};

/// Font size assumed until the first `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// TJ adjustments larger than this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A run of text shown by one text operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Base font name, or the resource name when unknown
    pub font_name: String,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size,
            font_name: String::new(),
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }
}

/// Turns string operands into text for the font selected by `Tf`.
pub trait GlyphDecoder {
    /// Base font name of a font resource.
    fn base_font(&self, resource: &[u8]) -> Option<String>;

    /// Decode a string operand shown with the given font resource.
    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String;
}

/// Decode a content stream and collect its text spans.
pub fn extract_spans(content: &[u8], decoder: &dyn GlyphDecoder) -> Result<Vec<TextSpan>> {
    let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut state = TextState::default();
    let mut spans = Vec::new();

    for op in &content.operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.in_text = true;
                state.matrix = TextMatrix::default();
            }
            "ET" => state.in_text = false,
            "Tf" => {
                if let [Object::Name(resource), size, ..] = operands {
                    state.font_name = decoder
                        .base_font(resource)
                        .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                    state.font_resource = resource.clone();
                    state.font_size = number(size).unwrap_or(DEFAULT_FONT_SIZE);
                }
            }
            "Td" | "TD" => {
                if let [tx, ty, ..] = operands {
                    state
                        .matrix
                        .translate(number(tx).unwrap_or(0.0), number(ty).unwrap_or(0.0));
                }
            }
            "Tm" => {
                if let [a, b, c, d, e, f, ..] = operands {
                    state.matrix = TextMatrix {
                        a: number(a).unwrap_or(1.0),
                        b: number(b).unwrap_or(0.0),
                        c: number(c).unwrap_or(0.0),
                        d: number(d).unwrap_or(1.0),
                        e: number(e).unwrap_or(0.0),
                        f: number(f).unwrap_or(0.0),
                    };
                }
            }
            "T*" => state.matrix.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = decoder.decode(&state.font_resource, bytes);
                    state.show(text, &mut spans);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = decode_tj_array(items, &state.font_resource, decoder);
                    state.show(text, &mut spans);
                }
            }
            "'" | "\"" => {
                state.matrix.next_line();
                let idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(idx) {
                    let text = decoder.decode(&state.font_resource, bytes);
                    state.show(text, &mut spans);
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Join the strings of a TJ array, inserting a space at large positive gaps.
fn decode_tj_array(items: &[Object], resource: &[u8], decoder: &dyn GlyphDecoder) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decoder.decode(resource, bytes)),
            other => {
                let Some(adjustment) = number(other) else {
                    continue;
                };
                if -adjustment > TJ_SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(char::is_whitespace)
                {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}

#[derive(Debug, Default)]
struct TextState {
    in_text: bool,
    matrix: TextMatrix,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
}

impl TextState {
    fn show(&self, text: String, spans: &mut Vec<TextSpan>) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let size = if self.font_size > 0.0 {
            self.font_size
        } else {
            DEFAULT_FONT_SIZE
        };
        spans.push(
            TextSpan::new(text, self.matrix.e, self.matrix.f, size * self.matrix.scale())
                .with_font(self.font_name.clone()),
        );
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // No TL tracking; assume 12pt leading
        self.f -= DEFAULT_FONT_SIZE * self.d;
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode_text_simple;

    struct PlainDecoder;

    impl GlyphDecoder for PlainDecoder {
        fn base_font(&self, resource: &[u8]) -> Option<String> {
            (resource == b"F1").then(|| "Helvetica".to_string())
        }

        fn decode(&self, _resource: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }
    }

    #[test]
    fn test_td_positions() {
        let content = b"BT /F1 10 Tf 72 700 Td (Hello) Tj 0 -14 Td (World) Tj ET";
        let spans = extract_spans(content, &PlainDecoder).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Hello");
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
        assert_eq!(spans[1].y, 686.0);
        assert_eq!(spans[0].font_size, 10.0);
        assert_eq!(spans[0].font_name, "Helvetica");
    }

    #[test]
    fn test_tm_sets_origin_and_scale() {
        let content = b"BT /F2 1 Tf 9 0 0 9 300 500 Tm (Cell) Tj ET";
        let spans = extract_spans(content, &PlainDecoder).unwrap();
        assert_eq!((spans[0].x, spans[0].y), (300.0, 500.0));
        assert_eq!(spans[0].font_size, 9.0);
        assert_eq!(spans[0].font_name, "F2");
    }

    #[test]
    fn test_tj_array_gap_inserts_space() {
        let content = b"BT /F1 12 Tf [(Hel) -20 (lo) -400 (there)] TJ ET";
        let spans = extract_spans(content, &PlainDecoder).unwrap();
        assert_eq!(spans[0].text, "Hello there");
    }

    #[test]
    fn test_text_outside_bt_is_ignored() {
        let content = b"(stray) Tj BT /F1 12 Tf ( ) Tj ET";
        let spans = extract_spans(content, &PlainDecoder).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_quote_operator_moves_to_next_line() {
        let content = b"BT /F1 12 Tf 50 100 Td (one) Tj (two) ' ET";
        let spans = extract_spans(content, &PlainDecoder).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].y, 88.0);
    }
}
