use crate::named_node::NamedNode;
use crate::vocab::xsd;
use std::fmt;
use std::fmt::Write;

/// An owned RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal).
///
/// At most one of `language` / an explicit `datatype` accompanies a value:
/// when `language` is set the datatype is implicitly `rdf:langString`;
/// when neither is set it is implicitly `xsd:string`.
///
/// The default string formatter returns an N-Triples/Turtle-compatible
/// representation, escaping the lexical form:
/// ```
/// use rdf_core::Literal;
/// use rdf_core::vocab::xsd;
///
/// assert_eq!(
///     "\"foo\\nbar\"",
///     Literal::new_simple_literal("foo\nbar").to_string()
/// );
/// assert_eq!(
///     "\"1999-01-01\"^^<http://www.w3.org/2001/XMLSchema#date>",
///     Literal::new_typed_literal("1999-01-01", NamedNode::new_unchecked(xsd::DATE)).to_string()
/// );
/// assert_eq!(
///     "\"foo\"@en",
///     Literal::new_language_tagged_literal("foo", "en")?.to_string()
/// );
/// # Result::<(), rdf_core::LanguageTagParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Literal(LiteralContent);

#[derive(PartialEq, Eq, Debug, Clone, Hash)]
enum LiteralContent {
    String(String),
    LanguageTaggedString { value: String, language: String },
    TypedLiteral { value: String, datatype: NamedNode },
}

impl Literal {
    /// Builds a simple literal (implicit datatype `xsd:string`).
    #[inline]
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(LiteralContent::String(value.into()))
    }

    /// Builds a literal with an explicit datatype.
    #[inline]
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        let value = value.into();
        Self(if datatype.as_str() == xsd::STRING {
            LiteralContent::String(value)
        } else {
            LiteralContent::TypedLiteral { value, datatype }
        })
    }

    /// Builds a language-tagged string, validating `language` as BCP-47.
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, LanguageTagParseError> {
        let mut language = language.into();
        language.make_ascii_lowercase();
        if !crate::lexical::is_valid_lang_tag(&language) {
            return Err(LanguageTagParseError);
        }
        Ok(Self::new_language_tagged_literal_unchecked(value, language))
    }

    /// Builds a language-tagged string without validating `language`.
    ///
    /// It is the caller's responsibility to ensure `language` is a valid,
    /// lowercase BCP-47 tag.
    #[inline]
    pub fn new_language_tagged_literal_unchecked(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self(LiteralContent::LanguageTaggedString {
            value: value.into(),
            language: language.into(),
        })
    }

    /// The literal lexical form.
    #[inline]
    pub fn value(&self) -> &str {
        match &self.0 {
            LiteralContent::String(value)
            | LiteralContent::LanguageTaggedString { value, .. }
            | LiteralContent::TypedLiteral { value, .. } => value,
        }
    }

    /// The BCP-47 language tag, if this is a language-tagged string.
    #[inline]
    pub fn language(&self) -> Option<&str> {
        match &self.0 {
            LiteralContent::LanguageTaggedString { language, .. } => Some(language),
            _ => None,
        }
    }

    /// The effective datatype: `rdf:langString` for language-tagged
    /// strings, `xsd:string` for simple literals, else the explicit
    /// datatype.
    #[inline]
    pub fn datatype(&self) -> &str {
        match &self.0 {
            LiteralContent::String(_) => xsd::STRING,
            LiteralContent::LanguageTaggedString { .. } => crate::vocab::rdf::LANG_STRING,
            LiteralContent::TypedLiteral { datatype, .. } => datatype.as_str(),
        }
    }

    /// True for simple literals and language-tagged strings (RDF 1.0 "plain
    /// literal" shape).
    #[inline]
    pub fn is_plain(&self) -> bool {
        !matches!(self.0, LiteralContent::TypedLiteral { .. })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        crate::lexical::write_escaped_string(self.value(), f)?;
        f.write_char('"')?;
        match &self.0 {
            LiteralContent::String(_) => Ok(()),
            LiteralContent::LanguageTaggedString { language, .. } => {
                write!(f, "@{language}")
            }
            LiteralContent::TypedLiteral { datatype, .. } => {
                write!(f, "^^{datatype}")
            }
        }
    }
}

/// An error raised when a language tag fails BCP-47 validation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("the language tag is not a valid BCP-47 tag")]
pub struct LanguageTagParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_literal_escapes_on_display() {
        assert_eq!(
            Literal::new_simple_literal("foo\nbar").to_string(),
            "\"foo\\nbar\""
        );
    }

    #[test]
    fn typed_literal_keeps_datatype() {
        let l = Literal::new_typed_literal("42", NamedNode::new_unchecked(xsd::INTEGER));
        assert_eq!(l.datatype(), xsd::INTEGER);
        assert_eq!(
            l.to_string(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn xsd_string_datatype_collapses_to_simple() {
        let l = Literal::new_typed_literal("v", NamedNode::new_unchecked(xsd::STRING));
        assert!(l.is_plain());
        assert_eq!(l.to_string(), "\"v\"");
    }

    #[test]
    fn language_tagged_literal_has_rdf_lang_string_datatype() {
        let l = Literal::new_language_tagged_literal("v", "en-GB").unwrap();
        assert_eq!(l.datatype(), crate::vocab::rdf::LANG_STRING);
        assert_eq!(l.to_string(), "\"v\"@en-gb");
    }

    #[test]
    fn rejects_malformed_language_tag() {
        Literal::new_language_tagged_literal("v", "not a tag").unwrap_err();
    }
}
