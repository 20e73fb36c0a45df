//! Re-exports the cooperative-cancellation contract from `rdf-core`
//! (spec.md §5): a decoder polls a token before each logical statement,
//! before each read, and — in `rdf-jsonld` — between nodes. Kept as its
//! own module here (rather than a bare `pub use` at the crate root) so
//! that every engine in this crate spells it `crate::cancellation::*`
//! uniformly.

pub use rdf_core::cancellation::{CancellationToken, NeverCancel};
