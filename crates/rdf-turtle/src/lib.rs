#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]

mod accumulator;
pub mod cancellation;
pub mod cursor;
pub mod detect;
pub mod nquads;
pub mod ntriples;
pub mod reader;
pub mod serializer;
pub mod trig;
pub mod turtle;

pub use crate::cancellation::{CancellationToken, NeverCancel};
pub use crate::cursor::{CursorLimits, CursorState, StatementOutcome};
pub use crate::detect::{detect, DetectedFormat};
pub use crate::nquads::{NQuadsParser, NQuadsReader, NQuadsSerializer};
pub use crate::ntriples::{NTriplesParser, NTriplesReader, NTriplesSerializer};
pub use crate::reader::LineReader;
pub use crate::serializer::{PrefixTable, TriGSerializer, TurtleSerializer};
pub use crate::trig::{TriGParser, TriGReader};
pub use crate::turtle::{TurtleParser, TurtleReader};
