//! Format-agnostic serialization: [`RdfSerializer`] builds a
//! [`WriterQuadSerializer`] that buffers quads as they are handed in and
//! writes them out in canonical form, for whichever [`RdfFormat`] was
//! requested, once [`WriterQuadSerializer::finish`] is called.
//!
//! Turtle and N-Triples are single-graph formats: [`serialize_quad`] rejects
//! a quad outside the default graph rather than silently dropping its graph
//! name. TriG, N-Quads and JSON-LD all support datasets.
//!
//! [`serialize_quad`]: WriterQuadSerializer::serialize_quad

use crate::error::RdfParseError;
use crate::format::RdfFormat;
use rdf_core::{ErrorCode, ParseError as CoreParseError, Quad, Triple};
use rdf_jsonld::JsonLdSerializer;
use rdf_turtle::{NQuadsSerializer, NTriplesSerializer, TriGSerializer, TurtleSerializer};
use std::io::{self, Write};

/// Builds [`WriterQuadSerializer`]s.
///
/// It currently supports the following formats:
/// * [N-Quads](https://www.w3.org/TR/n-quads/) ([`RdfFormat::NQuads`])
/// * [N-Triples](https://www.w3.org/TR/n-triples/) ([`RdfFormat::NTriples`])
/// * [TriG](https://www.w3.org/TR/trig/) ([`RdfFormat::TriG`])
/// * [Turtle](https://www.w3.org/TR/turtle/) ([`RdfFormat::Turtle`])
/// * [JSON-LD](https://www.w3.org/TR/json-ld/) ([`RdfFormat::JsonLd`])
///
/// [`RdfFormat::RdfXml`] and [`RdfFormat::Auto`] are accepted as format
/// names but every write fails with an [`ErrorCode::UnsupportedFormat`]
/// error: this workspace carries no RDF/XML encoder, and a serializer has
/// no bytes to sniff a format from.
#[must_use]
pub struct RdfSerializer {
    format: RdfFormat,
    prefixes: Vec<(String, String)>,
    jsonld_native_types: bool,
}

impl RdfSerializer {
    /// Builds a serializer for the given format.
    pub fn from_format(format: RdfFormat) -> Self {
        Self {
            format,
            prefixes: Vec::new(),
            jsonld_native_types: false,
        }
    }

    /// Turtle/TriG only: seeds the prefix table written out ahead of the
    /// triples, and used to abbreviate any IRI it is a prefix of.
    #[inline]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), iri.into()));
        self
    }

    /// JSON-LD only: emits JSON `number`/`boolean` values for
    /// `xsd:decimal`/`xsd:boolean` typed literals instead of `@value`/`@type`
    /// objects.
    #[inline]
    pub fn with_jsonld_native_types(mut self, native: bool) -> Self {
        self.jsonld_native_types = native;
        self
    }

    /// Returns a [`WriterQuadSerializer`] collecting quads to write to
    /// `write` once [`WriterQuadSerializer::finish`] is called.
    pub fn serialize_to_write<W: Write>(self, write: W) -> WriterQuadSerializer<W> {
        let kind = match self.format {
            RdfFormat::NQuads => SerializerKind::NQuads,
            RdfFormat::NTriples => SerializerKind::NTriples,
            RdfFormat::Turtle => SerializerKind::Turtle,
            RdfFormat::TriG => SerializerKind::TriG,
            RdfFormat::JsonLd => SerializerKind::JsonLd,
            RdfFormat::RdfXml => SerializerKind::Unsupported("rdfxml"),
            RdfFormat::Auto => SerializerKind::Unsupported("auto"),
        };
        WriterQuadSerializer {
            kind,
            write,
            quads: Vec::new(),
            prefixes: self.prefixes,
            jsonld_native_types: self.jsonld_native_types,
        }
    }
}

enum SerializerKind {
    NQuads,
    NTriples,
    Turtle,
    TriG,
    JsonLd,
    Unsupported(&'static str),
}

/// Collects quads handed to [`serialize_quad`](Self::serialize_quad) and
/// writes them out in canonical form on [`finish`](Self::finish).
///
/// None of the formats this workspace writes are streamed term-by-term:
/// Turtle/TriG need every triple in hand to group by subject and predicate,
/// and JSON-LD lowers a whole dataset into node objects at once. Buffering
/// here keeps every format behind the same contract rather than special
/// casing N-Triples/N-Quads, which could in principle stream.
#[must_use]
pub struct WriterQuadSerializer<W> {
    kind: SerializerKind,
    write: W,
    quads: Vec<Quad>,
    prefixes: Vec<(String, String)>,
    jsonld_native_types: bool,
}

impl<W: Write> WriterQuadSerializer<W> {
    /// Queues `quad` to be written on [`finish`](Self::finish).
    ///
    /// Fails immediately if the format cannot represent this quad: a named
    /// graph given to a single-graph format (N-Triples, Turtle), or any
    /// quad at all given to an unsupported format.
    pub fn serialize_quad(&mut self, quad: &Quad) -> Result<(), RdfParseError> {
        match &self.kind {
            SerializerKind::Unsupported(format) => {
                return Err(RdfParseError::unsupported_format(format));
            }
            SerializerKind::NTriples | SerializerKind::Turtle
                if !quad.graph_name.is_default_graph() =>
            {
                return Err(rejected(
                    "this format has no graph term; only default-graph quads can be written",
                ));
            }
            _ => {}
        }
        self.quads.push(quad.clone());
        Ok(())
    }

    /// Writes every queued quad in the requested format and returns the
    /// underlying writer.
    pub fn finish(self) -> Result<W, RdfParseError> {
        let Self {
            kind,
            mut write,
            quads,
            prefixes,
            jsonld_native_types,
        } = self;
        match kind {
            SerializerKind::Unsupported(format) => {
                return Err(RdfParseError::unsupported_format(format));
            }
            SerializerKind::NTriples => {
                let serializer = NTriplesSerializer::new();
                for quad in &quads {
                    serializer.serialize_to_write(&mut write, &quad_as_triple(quad))?;
                }
            }
            SerializerKind::NQuads => {
                let serializer = NQuadsSerializer::new();
                for quad in &quads {
                    serializer.serialize_to_write(&mut write, quad)?;
                }
            }
            SerializerKind::Turtle => {
                let mut serializer = TurtleSerializer::new();
                for (prefix, iri) in prefixes {
                    serializer = serializer.with_prefix(prefix, iri);
                }
                let triples: Vec<Triple> = quads.iter().map(quad_as_triple).collect();
                serializer.serialize_to_write(&mut write, &triples)?;
            }
            SerializerKind::TriG => {
                let mut serializer = TriGSerializer::new();
                for (prefix, iri) in prefixes {
                    serializer = serializer.with_prefix(prefix, iri);
                }
                serializer.serialize_to_write(&mut write, &quads)?;
            }
            SerializerKind::JsonLd => {
                let serializer = JsonLdSerializer::new().with_native_types(jsonld_native_types);
                let value = serializer.serialize_to_value(&quads);
                serde_json::to_writer(&mut write, &value)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            }
        }
        Ok(write)
    }
}

fn quad_as_triple(quad: &Quad) -> Triple {
    Triple::new(quad.subject.clone(), quad.predicate.clone(), quad.object.clone())
}

fn rejected(cause: &'static str) -> RdfParseError {
    RdfParseError::Syntax(CoreParseError::new(ErrorCode::ParseError, "rdf-io", cause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::{GraphName, NamedNode};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn writes_ntriples() {
        let quad = Quad::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"), GraphName::DefaultGraph);
        let mut writer = RdfSerializer::from_format(RdfFormat::NTriples).serialize_to_write(Vec::new());
        writer.serialize_quad(&quad).unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(out, b"<http://ex/s> <http://ex/p> <http://ex/o> .\n");
    }

    #[test]
    fn ntriples_rejects_named_graph() {
        let quad = Quad::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"), iri("http://ex/g"));
        let mut writer = RdfSerializer::from_format(RdfFormat::NTriples).serialize_to_write(Vec::new());
        assert!(writer.serialize_quad(&quad).is_err());
    }

    #[test]
    fn writes_nquads_with_graph_name() {
        let quad = Quad::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"), iri("http://ex/g"));
        let mut writer = RdfSerializer::from_format(RdfFormat::NQuads).serialize_to_write(Vec::new());
        writer.serialize_quad(&quad).unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(out, b"<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> .\n");
    }

    #[test]
    fn writes_turtle_with_prefix_abbreviation() {
        let quad = Quad::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"), GraphName::DefaultGraph);
        let mut writer = RdfSerializer::from_format(RdfFormat::Turtle)
            .with_prefix("ex", "http://ex/")
            .serialize_to_write(Vec::new());
        writer.serialize_quad(&quad).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(out.contains("@prefix ex:"));
        assert!(out.contains("ex:s ex:p ex:o"));
    }

    #[test]
    fn writes_jsonld_document() {
        let quad = Quad::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"), GraphName::DefaultGraph);
        let mut writer = RdfSerializer::from_format(RdfFormat::JsonLd).serialize_to_write(Vec::new());
        writer.serialize_quad(&quad).unwrap();
        let out = writer.finish().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["@id"], "http://ex/s");
    }

    #[test]
    fn rdfxml_is_unsupported() {
        let quad = Quad::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"), GraphName::DefaultGraph);
        let mut writer = RdfSerializer::from_format(RdfFormat::RdfXml).serialize_to_write(Vec::new());
        let err = writer.serialize_quad(&quad).unwrap_err();
        assert_eq!(err.code(), Some(rdf_core::ErrorCode::UnsupportedFormat));
    }
}
