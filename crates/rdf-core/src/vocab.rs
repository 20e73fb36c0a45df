//! IRI constants for the vocabularies this crate needs internally:
//! `rdf:` (collection/reification predicates) and `xsd:` (literal
//! datatypes for numeric/boolean literals and JCS).
//!
//! These are plain `&'static str` constants rather than `NamedNodeRef`
//! values, since [`crate::NamedNode`] is an owned-only type and every
//! entity in this crate is value-typed. Wrap with
//! [`crate::NamedNode::new_unchecked`] at the call site.

pub mod rdf {
    //! [RDF](https://www.w3.org/TR/rdf11-concepts/) vocabulary.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// Associates a reifier resource with a quoted triple (RDF 1.2).
    pub const REIFIES: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#reifies";
    /// Datatype of RDF literals storing canonical JSON content (RDF 1.2).
    pub const JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";
    /// `rdf:_1`, `rdf:_2`, ... container membership properties.
    pub fn li_member(index: usize) -> String {
        format!("http://www.w3.org/1999/02/22-rdf-syntax-ns#_{index}")
    }
    pub const LI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#li";
}

pub mod xsd {
    //! [XML Schema Datatypes](https://www.w3.org/TR/xmlschema11-2/) vocabulary.
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
}
