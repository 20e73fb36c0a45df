#![doc = include_str!("../README.md")]
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_qualifications
)]
#![doc(test(attr(deny(warnings))))]

mod blank_node;
pub mod cancellation;
pub mod error;
mod lexical;
mod literal;
mod named_node;
mod triple;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeFactory, BlankNodeIdParseError};
pub use crate::cancellation::{CancellationToken, NeverCancel};
pub use crate::error::{ErrorCode, ParseError, TextPosition, error_code};
pub use crate::lexical::{
    IriResolutionError, UnescapeError, is_pn_local_escape, is_valid_lang_tag, iri_disallowed,
    normalize_iri_path, resolve_iri, unescape_string, write_escaped_iri, write_escaped_string,
};
pub use crate::literal::{LanguageTagParseError, Literal};
pub use crate::named_node::{IriParseError, NamedNode};
pub use crate::triple::{
    GraphName, Quad, Statement, Subject, Term, TermCastError, TermKind, Triple,
};
