use std::fmt;

/// An owned RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// Blank node identifiers are scoped to a single decode: two blank nodes
/// are co-identified only if they carry the same identifier *within the
/// same document*. Callers that mint fresh blank nodes (the Turtle/TriG
/// cursor engine, JSON-LD lowering) use [`BlankNode::new_unchecked`] with
/// a monotonic `b1`, `b2`, ... counter rather than a random value, so that
/// identifiers are deterministic for a fixed input and starting counter.
///
/// The default string formatter returns an N-Triples/Turtle-compatible
/// representation:
/// ```
/// use rdf_core::BlankNode;
///
/// assert_eq!("_:a122", BlankNode::new("a122")?.to_string());
/// # Result::<_, rdf_core::BlankNodeIdParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct BlankNode(String);

impl BlankNode {
    /// Creates a blank node from a unique identifier, validating it against
    /// the N-Triples/Turtle/SPARQL `BLANK_NODE_LABEL` grammar.
    pub fn new(id: impl Into<String>) -> Result<Self, BlankNodeIdParseError> {
        let id = id.into();
        validate_blank_node_identifier(&id)?;
        Ok(Self(id))
    }

    /// Creates a blank node from an identifier without validation.
    ///
    /// It is the caller's responsibility to ensure `id` is a valid blank
    /// node identifier. Used internally to mint fresh `bN` identifiers.
    #[inline]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Mints document-local blank node identifiers in traversal order, starting
/// at `b1`. Owned by a single decoder; never shared across decoder
/// instances.
#[derive(Debug, Default, Clone)]
pub struct BlankNodeFactory {
    next: u64,
}

impl BlankNodeFactory {
    #[inline]
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Seeds the counter so that a caller can guarantee uniqueness across
    /// several decoders sharing a document scope.
    #[inline]
    pub fn with_start(start: u64) -> Self {
        Self { next: start }
    }

    /// Mints a fresh blank node, e.g. `_:b1`, `_:b2`, ...
    pub fn fresh(&mut self) -> BlankNode {
        self.next += 1;
        BlankNode::new_unchecked(format!("b{}", self.next))
    }
}

fn validate_blank_node_identifier(id: &str) -> Result<(), BlankNodeIdParseError> {
    let mut chars = id.chars();
    let front = chars.next().ok_or(BlankNodeIdParseError)?;
    match front {
        '0'..='9'
        | '_'
        | ':'
        | 'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}' => (),
        _ => return Err(BlankNodeIdParseError),
    }
    for c in chars {
        match c {
            '.' // validated below: cannot be the last character
            | '-'
            | '0'..='9'
            | '\u{00B7}'
            | '\u{0300}'..='\u{036F}'
            | '\u{203F}'..='\u{2040}'
            | '_'
            | ':'
            | 'A'..='Z'
            | 'a'..='z'
            | '\u{00C0}'..='\u{00D6}'
            | '\u{00D8}'..='\u{00F6}'
            | '\u{00F8}'..='\u{02FF}'
            | '\u{0370}'..='\u{037D}'
            | '\u{037F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}' => (),
            _ => return Err(BlankNodeIdParseError),
        }
    }
    if id.ends_with('.') {
        Err(BlankNodeIdParseError)
    } else {
        Ok(())
    }
}

/// An error raised during [`BlankNode`] identifier validation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("the blank node identifier is invalid")]
pub struct BlankNodeIdParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validation() {
        BlankNode::new("").unwrap_err();
        BlankNode::new("a").unwrap();
        BlankNode::new("-").unwrap_err();
        BlankNode::new("a-").unwrap();
        BlankNode::new(".").unwrap_err();
        BlankNode::new("a.").unwrap_err();
        BlankNode::new("a.a").unwrap();
    }

    #[test]
    fn factory_is_deterministic_and_sequential() {
        let mut f = BlankNodeFactory::new();
        assert_eq!(f.fresh().as_str(), "b1");
        assert_eq!(f.fresh().as_str(), "b2");
        assert_eq!(f.fresh().as_str(), "b3");
    }

    #[test]
    fn factory_can_be_seeded() {
        let mut f = BlankNodeFactory::with_start(10);
        assert_eq!(f.fresh().as_str(), "b11");
    }

    #[test]
    fn display_is_ntriples_form() {
        assert_eq!(BlankNode::new("x1").unwrap().to_string(), "_:x1");
    }
}
