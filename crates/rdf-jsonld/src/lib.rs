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

pub mod canon;
pub mod context;
pub mod from_rdf;
pub mod to_rdf;

pub use crate::context::{JsonLdContext, JsonLdDocumentLoader, NoopDocumentLoader};
pub use crate::from_rdf::JsonLdSerializer;
pub use crate::to_rdf::{JsonLdLimits, JsonLdParser, JsonLdReader};
