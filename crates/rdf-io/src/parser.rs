//! Format-agnostic parsing: [`RdfParser`] builds an [`RdfReader`] that
//! dispatches every [`read_next`](RdfReader::read_next) call to whichever
//! concrete decoder in this workspace handles the requested [`RdfFormat`].
//! [`RdfFormat::Auto`] is resolved once, from a buffered peek at the
//! document's leading bytes, via [`rdf_turtle::detect::detect`].

use crate::error::RdfParseError;
use crate::format::RdfFormat;
use rdf_core::{
    BlankNode, CancellationToken, ErrorCode, GraphName, NeverCancel, ParseError as CoreParseError,
    Quad, Subject, Term, Triple,
};
use rdf_jsonld::{JsonLdDocumentLoader, JsonLdParser, JsonLdReader};
use rdf_turtle::detect::{detect, DetectedFormat};
use rdf_turtle::{
    NQuadsParser, NQuadsReader, NTriplesParser, NTriplesReader, TriGParser, TriGReader,
    TurtleParser, TurtleReader,
};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

/// Resource limits a decoder enforces while reading (all `0` meaning
/// unlimited). Shared across every format; a format that has no use for a
/// given limit (e.g. `max_nodes` outside JSON-LD) simply ignores it.
#[derive(Debug, Default, Clone, Copy)]
struct RdfParserLimits {
    max_line_bytes: usize,
    max_statement_bytes: usize,
    max_depth: usize,
    max_triples: usize,
    max_input_bytes: usize,
    max_nodes: usize,
    max_quads: usize,
    max_graph_items: usize,
}

/// Parses RDF documents in any format this workspace supports.
///
/// It currently supports the following formats:
/// * [N-Quads](https://www.w3.org/TR/n-quads/) ([`RdfFormat::NQuads`])
/// * [N-Triples](https://www.w3.org/TR/n-triples/) ([`RdfFormat::NTriples`])
/// * [TriG](https://www.w3.org/TR/trig/) ([`RdfFormat::TriG`])
/// * [Turtle](https://www.w3.org/TR/turtle/) ([`RdfFormat::Turtle`])
/// * [JSON-LD](https://www.w3.org/TR/json-ld/) ([`RdfFormat::JsonLd`])
/// * [`RdfFormat::Auto`], detected from the document's leading bytes.
///
/// [`RdfFormat::RdfXml`] is accepted as a format name but every read fails
/// with an [`ErrorCode::UnsupportedFormat`] error: this workspace carries no
/// RDF/XML decoder.
///
/// Useful options:
/// - [`with_base_iri`](Self::with_base_iri) to resolve relative IRIs.
/// - [`rename_blank_nodes`](Self::rename_blank_nodes) to replace the blank
///   node ids set in the document with fresh random ones, to avoid
///   collisions when merging several documents' output together.
/// - [`without_named_graphs`](Self::without_named_graphs) to reject any
///   quad outside the default graph.
/// - [`unchecked`](Self::unchecked) to skip revalidating input already
///   known to be well-formed.
#[must_use]
pub struct RdfParser {
    format: RdfFormat,
    base_iri: Option<String>,
    prefixes: Vec<(String, String)>,
    default_graph: GraphName,
    without_named_graphs: bool,
    rename_blank_nodes: bool,
    allow_quoted_triple_statements: bool,
    debug_statements: bool,
    expand_rdfxml_containers: bool,
    unchecked: bool,
    limits: RdfParserLimits,
    loader: Option<Box<dyn JsonLdDocumentLoader>>,
}

impl RdfParser {
    /// Builds a parser for the given format.
    pub fn from_format(format: RdfFormat) -> Self {
        Self {
            format,
            base_iri: None,
            prefixes: Vec::new(),
            default_graph: GraphName::DefaultGraph,
            without_named_graphs: false,
            rename_blank_nodes: false,
            allow_quoted_triple_statements: true,
            debug_statements: false,
            expand_rdfxml_containers: true,
            unchecked: false,
            limits: RdfParserLimits::default(),
            loader: None,
        }
    }

    /// The format the parser was built for. Still `RdfFormat::Auto` if
    /// detection has not run yet — it only resolves once a read begins.
    pub fn format(&self) -> RdfFormat {
        self.format
    }

    /// Provides an IRI used to resolve the document's relative IRIs.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Seeds the prefix table before decoding begins, as if the pair had
    /// been declared by a leading `@prefix` directive (Turtle/TriG only).
    #[inline]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), iri.into()));
        self
    }

    /// [`Self::with_prefix`] for a whole table at once.
    #[inline]
    pub fn with_seed_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.prefixes.extend(prefixes);
        self
    }

    /// Provides the graph name that should replace the default graph in
    /// the returned quads.
    #[inline]
    pub fn with_default_graph(mut self, default_graph: impl Into<GraphName>) -> Self {
        self.default_graph = default_graph.into();
        self
    }

    /// Fails reads instead of emitting a quad outside the default graph.
    /// Restricts the parser to a single RDF graph rather than a dataset.
    #[inline]
    pub fn without_named_graphs(mut self) -> Self {
        self.without_named_graphs = true;
        self
    }

    /// Renames the blank node ids set in the document to fresh random ids,
    /// to avoid collisions when merging graphs from several documents.
    #[inline]
    pub fn rename_blank_nodes(mut self) -> Self {
        self.rename_blank_nodes = true;
        self
    }

    /// Fails a read as soon as it produces a statement containing a quoted
    /// triple term (`<<( s p o )>>`), instead of passing it through.
    /// Defaults to `true`.
    #[inline]
    pub fn allow_quoted_triple_statements(mut self, allow: bool) -> Self {
        self.allow_quoted_triple_statements = allow;
        self
    }

    /// Whether a syntax error keeps the excerpt window the underlying
    /// decoder attached to it (`true`) or has it stripped before the error
    /// reaches the caller (`false`, the default — useful when statement
    /// text should not end up in logs).
    #[inline]
    pub fn debug_statements(mut self, debug: bool) -> Self {
        self.debug_statements = debug;
        self
    }

    /// Whether `rdf:li` items in an `rdf:Bag`/`rdf:Seq`/`rdf:Alt` container
    /// are expanded to `rdf:_1 … rdf:_n` (default `true`). Accepted for API
    /// parity with every other format option; moot in practice, since this
    /// workspace has no RDF/XML decoder to honor it.
    #[inline]
    pub fn expand_rdfxml_containers(mut self, expand: bool) -> Self {
        self.expand_rdfxml_containers = expand;
        self
    }

    /// Assumes the document is already valid, to skip some validations and
    /// make parsing faster. Emits broken RDF instead of an error if that
    /// assumption does not hold.
    #[inline]
    pub fn unchecked(mut self) -> Self {
        self.unchecked = true;
        self
    }

    #[inline]
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.limits.max_line_bytes = max;
        self
    }

    #[inline]
    pub fn with_max_statement_bytes(mut self, max: usize) -> Self {
        self.limits.max_statement_bytes = max;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.limits.max_depth = max;
        self
    }

    #[inline]
    pub fn with_max_triples(mut self, max: usize) -> Self {
        self.limits.max_triples = max;
        self
    }

    /// JSON-LD only: caps the size of the input buffered before expansion.
    #[inline]
    pub fn with_max_input_bytes(mut self, max: usize) -> Self {
        self.limits.max_input_bytes = max;
        self
    }

    /// JSON-LD only: caps the number of node objects expanded.
    #[inline]
    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.limits.max_nodes = max;
        self
    }

    /// JSON-LD only: caps the number of quads a document may lower to.
    #[inline]
    pub fn with_max_quads(mut self, max: usize) -> Self {
        self.limits.max_quads = max;
        self
    }

    /// JSON-LD only: caps the length of a top-level `@graph` array.
    #[inline]
    pub fn with_max_graph_items(mut self, max: usize) -> Self {
        self.limits.max_graph_items = max;
        self
    }

    /// JSON-LD only: provides a loader used to fetch remote `@context`
    /// documents. Without one, string-valued contexts are a no-op.
    #[inline]
    pub fn with_document_loader(mut self, loader: impl JsonLdDocumentLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Parses from a [`Read`] implementation and returns a reader that
    /// yields quads one at a time. Reads are buffered.
    ///
    /// JSON-LD is not streamed: the whole input is read and expanded up
    /// front, then handed out one quad at a time so every format presents
    /// the same reader-shaped contract.
    pub fn parse_read<R: Read>(self, reader: R) -> RdfReader<R> {
        let debug_statements = self.debug_statements;
        let mapper = QuadMapper::new(
            self.default_graph.clone(),
            self.without_named_graphs,
            self.rename_blank_nodes,
            self.allow_quoted_triple_statements,
        );
        let mut buffered = BufReader::new(reader);
        let kind = match resolve_format(self.format, &mut buffered) {
            Ok(format) => self.build_kind(format, buffered),
            Err(e) => RdfReaderKind::Failed(Some(e)),
        };
        RdfReader {
            kind,
            mapper,
            debug_statements,
        }
    }

    fn build_kind<R: Read>(self, format: RdfFormat, buffered: BufReader<R>) -> RdfReaderKind<R> {
        match format {
            RdfFormat::Auto => unreachable!("resolved before dispatch"),
            RdfFormat::NQuads => {
                let parser = NQuadsParser::new().with_max_line_bytes(self.limits.max_line_bytes);
                RdfReaderKind::NQuads(parser.parse_read(buffered))
            }
            RdfFormat::NTriples => {
                let parser = NTriplesParser::new().with_max_line_bytes(self.limits.max_line_bytes);
                RdfReaderKind::NTriples(parser.parse_read(buffered))
            }
            RdfFormat::Turtle => {
                let mut parser = TurtleParser::new()
                    .with_max_depth(self.limits.max_depth)
                    .with_max_triples(self.limits.max_triples)
                    .with_max_line_bytes(self.limits.max_line_bytes)
                    .with_max_statement_bytes(self.limits.max_statement_bytes);
                if let Some(base) = &self.base_iri {
                    parser = parser.with_base_iri(base.clone());
                }
                for (prefix, iri) in &self.prefixes {
                    parser = parser.with_prefix(prefix.clone(), iri.clone());
                }
                if self.unchecked {
                    parser = parser.unchecked();
                }
                RdfReaderKind::Turtle(parser.parse_read(buffered))
            }
            RdfFormat::TriG => {
                let mut parser = TriGParser::new()
                    .with_max_depth(self.limits.max_depth)
                    .with_max_triples(self.limits.max_triples)
                    .with_max_line_bytes(self.limits.max_line_bytes)
                    .with_max_statement_bytes(self.limits.max_statement_bytes);
                if let Some(base) = &self.base_iri {
                    parser = parser.with_base_iri(base.clone());
                }
                for (prefix, iri) in &self.prefixes {
                    parser = parser.with_prefix(prefix.clone(), iri.clone());
                }
                if self.unchecked {
                    parser = parser.unchecked();
                }
                RdfReaderKind::TriG(parser.parse_read(buffered))
            }
            RdfFormat::JsonLd => {
                let mut data = Vec::new();
                let mut buffered = buffered;
                if let Err(e) = buffered.read_to_end(&mut data) {
                    return RdfReaderKind::Failed(Some(e.into()));
                }
                let mut parser = JsonLdParser::new()
                    .with_max_input_bytes(self.limits.max_input_bytes)
                    .with_max_nodes(self.limits.max_nodes)
                    .with_max_quads(self.limits.max_quads)
                    .with_max_graph_items(self.limits.max_graph_items);
                if let Some(base) = &self.base_iri {
                    parser = parser.with_base_iri(base.clone());
                }
                if let Some(loader) = self.loader {
                    parser = parser.with_document_loader(BoxedDocumentLoader(loader));
                }
                match parser.parse_slice(&data) {
                    Ok(reader) => RdfReaderKind::JsonLd(reader),
                    Err(e) => RdfReaderKind::Failed(Some(e.into())),
                }
            }
            RdfFormat::RdfXml => {
                RdfReaderKind::Failed(Some(RdfParseError::unsupported_format("rdfxml")))
            }
        }
    }
}

impl From<RdfFormat> for RdfParser {
    fn from(format: RdfFormat) -> Self {
        Self::from_format(format)
    }
}

/// Peeks `buffered` (without consuming) and resolves [`RdfFormat::Auto`]
/// via [`detect`]; any other format is returned unchanged.
fn resolve_format<R: Read>(
    format: RdfFormat,
    buffered: &mut BufReader<R>,
) -> Result<RdfFormat, RdfParseError> {
    if format != RdfFormat::Auto {
        return Ok(format);
    }
    let peek = buffered.fill_buf()?;
    Ok(match detect(peek) {
        DetectedFormat::JsonLd => RdfFormat::JsonLd,
        DetectedFormat::RdfXml => RdfFormat::RdfXml,
        DetectedFormat::Turtle => RdfFormat::Turtle,
        DetectedFormat::TriG => RdfFormat::TriG,
        DetectedFormat::NTriples => RdfFormat::NTriples,
        DetectedFormat::NQuads => RdfFormat::NQuads,
    })
}

/// A local wrapper so a boxed loader trait object can itself implement
/// [`JsonLdDocumentLoader`] (the trait and `Box` are both foreign to this
/// crate, so a blanket impl would violate the orphan rule).
struct BoxedDocumentLoader(Box<dyn JsonLdDocumentLoader>);

impl JsonLdDocumentLoader for BoxedDocumentLoader {
    fn load_context(&self, iri: &str) -> Result<serde_json::Value, CoreParseError> {
        self.0.load_context(iri)
    }
}

/// Reads RDF quads from a [`Read`] implementation. Built with
/// [`RdfParser::parse_read`].
#[must_use]
pub struct RdfReader<R> {
    kind: RdfReaderKind<R>,
    mapper: QuadMapper,
    debug_statements: bool,
}

enum RdfReaderKind<R> {
    NQuads(NQuadsReader<BufReader<R>>),
    NTriples(NTriplesReader<BufReader<R>>),
    TriG(TriGReader<BufReader<R>>),
    Turtle(TurtleReader<BufReader<R>>),
    JsonLd(JsonLdReader),
    /// Format resolution or upfront buffering failed; `read_next` returns
    /// the stored error exactly once, then behaves as an exhausted reader.
    Failed(Option<RdfParseError>),
}

impl<R: Read> RdfReader<R> {
    /// Reads the next quad, or `None` at end of input. Idempotent once
    /// exhausted: subsequent calls keep returning `Ok(None)`.
    pub fn read_next(&mut self) -> Result<Option<Quad>, RdfParseError> {
        self.read_next_cancellable(&NeverCancel)
    }

    /// [`Self::read_next`], polling `cancellation` before starting on the
    /// next statement.
    pub fn read_next_cancellable(
        &mut self,
        cancellation: &impl CancellationToken,
    ) -> Result<Option<Quad>, RdfParseError> {
        let result = match &mut self.kind {
            RdfReaderKind::NQuads(r) => r
                .read_next_cancellable(cancellation)?
                .map(|q| self.mapper.map_quad(q))
                .transpose(),
            RdfReaderKind::NTriples(r) => Ok(r
                .read_next_cancellable(cancellation)?
                .map(|t| self.mapper.map_triple_to_quad(t))),
            RdfReaderKind::Turtle(r) => Ok(r
                .read_next_cancellable(cancellation)?
                .map(|t| self.mapper.map_triple_to_quad(t))),
            RdfReaderKind::TriG(r) => r
                .read_next_cancellable(cancellation)?
                .map(|q| self.mapper.map_quad(q))
                .transpose(),
            RdfReaderKind::JsonLd(r) => r
                .read_next()?
                .map(|q| self.mapper.map_quad(q))
                .transpose(),
            RdfReaderKind::Failed(pending) => match pending.take() {
                Some(e) => Err(e),
                None => Ok(None),
            },
        };
        result.map_err(|e| self.strip_excerpt_unless_debug(e))
    }

    fn strip_excerpt_unless_debug(&self, error: RdfParseError) -> RdfParseError {
        if self.debug_statements {
            return error;
        }
        match error {
            RdfParseError::Syntax(e) => RdfParseError::Syntax(e.with_statement_excerpt("")),
            other => other,
        }
    }
}

impl<R: Read> Iterator for RdfReader<R> {
    type Item = Result<Quad, RdfParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Parses `reader` as `format`, calling `handler` with every decoded
/// statement until the input is exhausted or `handler` returns an error.
/// `RdfFormat::Auto` is resolved once, from the input's leading bytes.
pub fn parse<R: Read>(
    cancellation: &impl CancellationToken,
    reader: R,
    format: RdfFormat,
    mut handler: impl FnMut(Quad) -> Result<(), RdfParseError>,
) -> Result<(), RdfParseError> {
    let mut rdf_reader = RdfParser::from_format(format).parse_read(reader);
    while let Some(statement) = rdf_reader.read_next_cancellable(cancellation)? {
        handler(statement)?;
    }
    Ok(())
}

struct QuadMapper {
    default_graph: GraphName,
    without_named_graphs: bool,
    allow_quoted_triple_statements: bool,
    blank_node_map: Option<HashMap<BlankNode, BlankNode>>,
}

impl QuadMapper {
    fn new(
        default_graph: GraphName,
        without_named_graphs: bool,
        rename_blank_nodes: bool,
        allow_quoted_triple_statements: bool,
    ) -> Self {
        Self {
            default_graph,
            without_named_graphs,
            allow_quoted_triple_statements,
            blank_node_map: rename_blank_nodes.then(HashMap::new),
        }
    }

    fn map_blank_node(&mut self, node: BlankNode) -> BlankNode {
        match &mut self.blank_node_map {
            Some(map) => map
                .entry(node)
                .or_insert_with(fresh_random_blank_node)
                .clone(),
            None => node,
        }
    }

    fn map_subject(&mut self, subject: Subject) -> Subject {
        match subject {
            Subject::NamedNode(n) => n.into(),
            Subject::BlankNode(b) => self.map_blank_node(b).into(),
            Subject::Triple(t) => self.map_triple(*t).into(),
        }
    }

    fn map_term(&mut self, term: Term) -> Term {
        match term {
            Term::NamedNode(n) => n.into(),
            Term::BlankNode(b) => self.map_blank_node(b).into(),
            Term::Literal(l) => l.into(),
            Term::Triple(t) => self.map_triple(*t).into(),
        }
    }

    fn map_triple(&mut self, triple: Triple) -> Triple {
        Triple {
            subject: self.map_subject(triple.subject),
            predicate: triple.predicate,
            object: self.map_term(triple.object),
        }
    }

    fn map_graph_name(&mut self, graph_name: GraphName) -> Result<GraphName, RdfParseError> {
        match graph_name {
            GraphName::NamedNode(_) | GraphName::BlankNode(_) if self.without_named_graphs => {
                Err(rejected("named graphs are not allowed"))
            }
            GraphName::NamedNode(n) => Ok(n.into()),
            GraphName::BlankNode(b) => Ok(self.map_blank_node(b).into()),
            GraphName::DefaultGraph => Ok(self.default_graph.clone()),
        }
    }

    fn map_quad(&mut self, quad: Quad) -> Result<Quad, RdfParseError> {
        if !self.allow_quoted_triple_statements && statement_has_quoted_triple(&quad) {
            return Err(rejected("quoted triple statements are not allowed"));
        }
        Ok(Quad {
            subject: self.map_subject(quad.subject),
            predicate: quad.predicate,
            object: self.map_term(quad.object),
            graph_name: self.map_graph_name(quad.graph_name)?,
        })
    }

    fn map_triple_to_quad(&mut self, triple: Triple) -> Quad {
        self.map_triple(triple)
            .in_graph(self.default_graph.clone())
    }
}

fn statement_has_quoted_triple(quad: &Quad) -> bool {
    matches!(quad.subject, Subject::Triple(_)) || matches!(quad.object, Term::Triple(_))
}

fn rejected(cause: &'static str) -> RdfParseError {
    RdfParseError::Syntax(CoreParseError::new(ErrorCode::ParseError, "rdf-io", cause))
}

fn fresh_random_blank_node() -> BlankNode {
    BlankNode::new_unchecked(format!("r{:032x}", rand::random::<u128>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(format: RdfFormat, input: &str) -> Vec<Quad> {
        RdfParser::from_format(format)
            .parse_read(input.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn parses_ntriples() {
        let quads = parse_all(
            RdfFormat::NTriples,
            "<http://ex/s> <http://ex/p> <http://ex/o> .\n",
        );
        assert_eq!(quads.len(), 1);
        assert!(quads[0].graph_name.is_default_graph());
    }

    #[test]
    fn parses_turtle_with_prefix() {
        let parser = RdfParser::from_format(RdfFormat::Turtle).with_prefix("ex", "http://ex/");
        let quads = parser
            .parse_read("ex:s ex:p ex:o .\n".as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(quads[0].subject.to_string(), "<http://ex/s>");
    }

    #[test]
    fn auto_detects_ntriples() {
        let quads = parse_all(
            RdfFormat::Auto,
            "<http://ex/s> <http://ex/p> <http://ex/o> .\n",
        );
        assert_eq!(quads.len(), 1);
    }

    #[test]
    fn auto_detects_jsonld() {
        let quads = parse_all(
            RdfFormat::Auto,
            r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","ex:p":{"@id":"ex:o"}}"#,
        );
        assert_eq!(quads.len(), 1);
    }

    #[test]
    fn rdfxml_is_unsupported() {
        let mut reader =
            RdfParser::from_format(RdfFormat::RdfXml).parse_read("<rdf:RDF/>".as_bytes());
        let err = reader.read_next().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UnsupportedFormat));
    }

    #[test]
    fn without_named_graphs_rejects_quads() {
        let parser = RdfParser::from_format(RdfFormat::NQuads).without_named_graphs();
        let mut reader = parser
            .parse_read("<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> .\n".as_bytes());
        assert!(reader.read_next().is_err());
    }

    #[test]
    fn rename_blank_nodes_avoids_collisions() {
        let file = "_:a <http://ex/p> <http://ex/o> .\n";
        let first = parse_all(RdfFormat::NQuads, file);
        let renamed = RdfParser::from_format(RdfFormat::NQuads)
            .rename_blank_nodes()
            .parse_read(file.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_ne!(first[0].subject, renamed[0].subject);
    }

    #[test]
    fn with_default_graph_replaces_default_graph() {
        let parser = RdfParser::from_format(RdfFormat::Turtle)
            .with_default_graph(rdf_core::NamedNode::new("http://ex/g").unwrap());
        let quads = parser
            .parse_read("<http://ex/s> <http://ex/p> <http://ex/o> .\n".as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(quads[0].graph_name.to_string(), "<http://ex/g>");
    }
}
