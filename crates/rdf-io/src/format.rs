use std::fmt;

/// RDF serialization formats, plus [`RdfFormat::Auto`] for prefix-sniffing
/// detection (dispatches through [`crate::detect_format`] once enough of
/// the input has been peeked).
///
/// This enumeration is non exhaustive. New formats might be added in the future.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[non_exhaustive]
pub enum RdfFormat {
    /// Detect the format from the document's leading bytes rather than
    /// naming it up front.
    Auto,
    /// [N-Quads](https://www.w3.org/TR/n-quads/)
    NQuads,
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    NTriples,
    /// [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/). Recognized as a
    /// format name throughout this workspace, but has no decoder or encoder
    /// here: parsing or serializing it returns [`crate::error::RdfParseError`]
    /// classified as [`rdf_core::ErrorCode::UnsupportedFormat`].
    RdfXml,
    /// [TriG](https://www.w3.org/TR/trig/)
    TriG,
    /// [Turtle](https://www.w3.org/TR/turtle/)
    Turtle,
    /// [JSON-LD](https://www.w3.org/TR/json-ld/)
    JsonLd,
}

impl RdfFormat {
    /// The format canonical IRI according to the [Unique URIs for file formats registry](https://www.w3.org/ns/formats/).
    ///
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(
    ///     RdfFormat::NTriples.iri(),
    ///     "http://www.w3.org/ns/formats/N-Triples"
    /// )
    /// ```
    #[inline]
    pub const fn iri(self) -> &'static str {
        match self {
            Self::Auto => "",
            Self::JsonLd => "https://www.w3.org/ns/formats/data/JSON-LD",
            Self::NQuads => "http://www.w3.org/ns/formats/N-Quads",
            Self::NTriples => "http://www.w3.org/ns/formats/N-Triples",
            Self::RdfXml => "http://www.w3.org/ns/formats/RDF_XML",
            Self::TriG => "http://www.w3.org/ns/formats/TriG",
            Self::Turtle => "http://www.w3.org/ns/formats/Turtle",
        }
    }

    /// The format [IANA media type](https://tools.ietf.org/html/rfc2046).
    ///
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::NTriples.media_type(), "application/n-triples")
    /// ```
    #[inline]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Auto => "application/octet-stream",
            Self::JsonLd => "application/ld+json",
            Self::NQuads => "application/n-quads",
            Self::NTriples => "application/n-triples",
            Self::RdfXml => "application/rdf+xml",
            Self::TriG => "application/trig",
            Self::Turtle => "text/turtle",
        }
    }

    /// The format [IANA-registered](https://tools.ietf.org/html/rfc2046) file extension.
    ///
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::NTriples.file_extension(), "nt")
    /// ```
    #[inline]
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Auto => "",
            Self::JsonLd => "jsonld",
            Self::NQuads => "nq",
            Self::NTriples => "nt",
            Self::RdfXml => "rdf",
            Self::TriG => "trig",
            Self::Turtle => "ttl",
        }
    }

    /// The format name.
    ///
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::NTriples.name(), "N-Triples")
    /// ```
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::JsonLd => "JSON-LD",
            Self::NQuads => "N-Quads",
            Self::NTriples => "N-Triples",
            Self::RdfXml => "RDF/XML",
            Self::TriG => "TriG",
            Self::Turtle => "Turtle",
        }
    }

    /// Checks if the format supports [RDF datasets](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset) and not only [RDF graphs](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-graph).
    ///
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::NTriples.supports_datasets(), false);
    /// assert_eq!(RdfFormat::NQuads.supports_datasets(), true);
    /// ```
    #[inline]
    pub const fn supports_datasets(self) -> bool {
        matches!(self, Self::JsonLd | Self::NQuads | Self::TriG)
    }

    /// Looks for a known format from a media type.
    ///
    /// It supports some media type aliases. For example, "application/xml"
    /// returns `RdfFormat::RdfXml` even if it is not its canonical media type.
    ///
    /// Example:
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(
    ///     RdfFormat::from_media_type("text/turtle; charset=utf-8"),
    ///     Some(RdfFormat::Turtle)
    /// );
    /// ```
    #[inline]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        const MEDIA_SUBTYPES: [(&str, RdfFormat); 12] = [
            ("activity+json", RdfFormat::JsonLd),
            ("json", RdfFormat::JsonLd),
            ("ld+json", RdfFormat::JsonLd),
            ("jsonld", RdfFormat::JsonLd),
            ("n-quads", RdfFormat::NQuads),
            ("n-triples", RdfFormat::NTriples),
            ("nquads", RdfFormat::NQuads),
            ("ntriples", RdfFormat::NTriples),
            ("plain", RdfFormat::NTriples),
            ("rdf+xml", RdfFormat::RdfXml),
            ("trig", RdfFormat::TriG),
            ("turtle", RdfFormat::Turtle),
        ];
        const UTF8_CHARSETS: [&str; 3] = ["ascii", "utf8", "utf-8"];

        let (type_subtype, parameters) = media_type.split_once(';').unwrap_or((media_type, ""));

        let (r#type, subtype) = type_subtype.split_once('/')?;
        let r#type = r#type.trim();
        if !r#type.eq_ignore_ascii_case("application") && !r#type.eq_ignore_ascii_case("text") {
            return None;
        }
        let subtype = subtype.trim();
        let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
        if subtype.eq_ignore_ascii_case("xml") {
            return Some(RdfFormat::RdfXml);
        }

        let parameters = parameters.trim();
        let parameters = if parameters.is_empty() {
            Vec::new()
        } else {
            parameters
                .split(';')
                .map(|p| {
                    let (key, value) = p.split_once('=')?;
                    Some((key.trim(), value.trim()))
                })
                .collect::<Option<Vec<_>>>()?
        };

        for (candidate_subtype, candidate_id) in MEDIA_SUBTYPES {
            if candidate_subtype.eq_ignore_ascii_case(subtype) {
                for (key, value) in &parameters {
                    if key.eq_ignore_ascii_case("charset")
                        && !UTF8_CHARSETS.iter().any(|c| c.eq_ignore_ascii_case(value))
                    {
                        return None; // No other charset than UTF-8 is supported
                    }
                }
                return Some(candidate_id);
            }
        }
        None
    }

    /// Looks for a known format from a file extension.
    ///
    /// It supports some aliases.
    ///
    /// Example:
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::from_extension("nt"), Some(RdfFormat::NTriples))
    /// ```
    #[inline]
    pub fn from_extension(extension: &str) -> Option<Self> {
        const EXTENSIONS: [(&str, RdfFormat); 9] = [
            ("json", RdfFormat::JsonLd),
            ("jsonld", RdfFormat::JsonLd),
            ("nq", RdfFormat::NQuads),
            ("nt", RdfFormat::NTriples),
            ("rdf", RdfFormat::RdfXml),
            ("trig", RdfFormat::TriG),
            ("ttl", RdfFormat::Turtle),
            ("txt", RdfFormat::NTriples),
            ("xml", RdfFormat::RdfXml),
        ];
        for (candidate_extension, candidate_id) in EXTENSIONS {
            if candidate_extension.eq_ignore_ascii_case(extension) {
                return Some(candidate_id);
            }
        }
        None
    }

    /// Looks for a known format from its canonical name or a common alias
    /// (`ttl` ↔ `Turtle`, `nt` ↔ `NTriples`, `nq` ↔ `NQuads`, `trig`,
    /// `rdfxml`/`xml`, `jsonld`/`json-ld`, `auto`).
    ///
    /// ```
    /// use rdf_io::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::parse_format("ttl"), Some(RdfFormat::Turtle));
    /// assert_eq!(RdfFormat::parse_format("json-ld"), Some(RdfFormat::JsonLd));
    /// ```
    #[inline]
    pub fn parse_format(name: &str) -> Option<Self> {
        Some(match_ignore_case(
            name,
            &[
                ("auto", RdfFormat::Auto),
                ("ntriples", RdfFormat::NTriples),
                ("nt", RdfFormat::NTriples),
                ("nquads", RdfFormat::NQuads),
                ("nq", RdfFormat::NQuads),
                ("turtle", RdfFormat::Turtle),
                ("ttl", RdfFormat::Turtle),
                ("trig", RdfFormat::TriG),
                ("rdfxml", RdfFormat::RdfXml),
                ("rdf/xml", RdfFormat::RdfXml),
                ("xml", RdfFormat::RdfXml),
                ("jsonld", RdfFormat::JsonLd),
                ("json-ld", RdfFormat::JsonLd),
            ],
        )?)
    }
}

fn match_ignore_case(name: &str, candidates: &[(&str, RdfFormat)]) -> Option<RdfFormat> {
    candidates
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, format)| *format)
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_media_type() {
        assert_eq!(RdfFormat::from_media_type("foo/bar"), None);
        assert_eq!(RdfFormat::from_media_type("text/csv"), None);
        assert_eq!(
            RdfFormat::from_media_type("text/turtle"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(
            RdfFormat::from_media_type("application/x-turtle"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(
            RdfFormat::from_media_type("application/ld+json"),
            Some(RdfFormat::JsonLd)
        );
        assert_eq!(
            RdfFormat::from_media_type("application/xml"),
            Some(RdfFormat::RdfXml)
        );
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(RdfFormat::from_extension("nt"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_extension("JSONLD"), Some(RdfFormat::JsonLd));
        assert_eq!(RdfFormat::from_extension("unknown"), None);
    }

    #[test]
    fn test_parse_format_aliases() {
        assert_eq!(RdfFormat::parse_format("ttl"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::parse_format("TURTLE"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::parse_format("json-ld"), Some(RdfFormat::JsonLd));
        assert_eq!(RdfFormat::parse_format("xml"), Some(RdfFormat::RdfXml));
        assert_eq!(RdfFormat::parse_format("auto"), Some(RdfFormat::Auto));
        assert_eq!(RdfFormat::parse_format("turtlee"), None);
    }

    #[test]
    fn test_supports_datasets() {
        assert!(!RdfFormat::NTriples.supports_datasets());
        assert!(RdfFormat::NQuads.supports_datasets());
        assert!(RdfFormat::TriG.supports_datasets());
        assert!(RdfFormat::JsonLd.supports_datasets());
    }
}
