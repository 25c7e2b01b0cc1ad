//! PDF decoding adapter.
//!
//! Everything that touches the binary PDF lives here: the [`PdfBackend`]
//! trait and its lopdf implementation, positioned text spans decoded from
//! content streams, and the grid table detector that works on those spans.

mod backend;
mod layout;
mod table_detector;

pub use backend::{decode_text_simple, LopdfBackend, PdfBackend};
pub use layout::{extract_spans, GlyphDecoder, TextSpan};
pub use table_detector::{TableDetector, TableDetectorConfig};
