use crate::lexical::iri_disallowed;
use std::fmt;

/// An owned RDF [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri).
///
/// The inner string is the *absolute* IRI after base resolution; an empty
/// value is invalid.
///
/// The default string formatter returns an N-Triples/Turtle-compatible
/// representation:
/// ```
/// use rdf_core::NamedNode;
///
/// assert_eq!("<http://example.com>", NamedNode::new("http://example.com")?.to_string());
/// # Result::<_, rdf_core::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct NamedNode(String);

impl NamedNode {
    /// Builds and validates an IRI.
    pub fn new(iri: impl Into<String>) -> Result<Self, IriParseError> {
        let iri = iri.into();
        validate_iri(&iri)?;
        Ok(Self(iri))
    }

    /// Builds an IRI from a validated string without re-validating it.
    ///
    /// It is the caller's responsibility to ensure `iri` is a non-empty,
    /// absolute IRI with no disallowed characters.
    #[inline]
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(iri.into())
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

impl fmt::Display for NamedNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl AsRef<str> for NamedNode {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate_iri(iri: &str) -> Result<(), IriParseError> {
    if iri.is_empty() {
        return Err(IriParseError("an IRI cannot be the empty string"));
    }
    if let Some(c) = iri.chars().find(|c| iri_disallowed(*c)) {
        return Err(match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                IriParseError("an IRI cannot contain a reserved delimiter character")
            }
            _ => IriParseError("an IRI cannot contain control characters"),
        });
    }
    Ok(())
}

/// An error raised during [`NamedNode`] validation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct IriParseError(&'static str);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        NamedNode::new("").unwrap_err();
    }

    #[test]
    fn rejects_disallowed_chars() {
        NamedNode::new("http://example.com/<a>").unwrap_err();
        NamedNode::new("http://example.com/a b").unwrap_err();
    }

    #[test]
    fn display_is_ntriples_form() {
        assert_eq!(
            NamedNode::new("http://example.com/s").unwrap().to_string(),
            "<http://example.com/s>"
        );
    }
}
