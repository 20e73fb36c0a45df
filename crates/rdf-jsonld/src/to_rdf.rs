//! JSON-LD expansion and node-to-quads lowering (spec.md §4.8): context
//! resolution, `@id`/`@type`/`@value`/`@list`/`@graph` handling, and the
//! resource limits a `jsonldState` enforces while doing so.

use crate::canon;
use crate::context::{JsonLdContext, JsonLdDocumentLoader, NoopDocumentLoader};
use rdf_core::vocab::{rdf, xsd};
use rdf_core::{
    BlankNode, BlankNodeFactory, CancellationToken, ErrorCode, GraphName, NamedNode, NeverCancel,
    ParseError, Quad, Subject, Term,
};
use serde_json::{Map, Value};
use std::collections::VecDeque;

const FORMAT: &str = "jsonld";

/// Resource limits honored while lowering a document (spec.md §5, §6).
/// `0` means unlimited.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLdLimits {
    pub max_input_bytes: usize,
    pub max_nodes: usize,
    pub max_quads: usize,
    pub max_graph_items: usize,
}

/// Builds [`JsonLdReader`]s.
pub struct JsonLdParser {
    base_iri: Option<String>,
    seed_context: Value,
    limits: JsonLdLimits,
    loader: Option<Box<dyn JsonLdDocumentLoader>>,
}

impl Default for JsonLdParser {
    fn default() -> Self {
        Self {
            base_iri: None,
            seed_context: Value::Null,
            limits: JsonLdLimits::default(),
            loader: None,
        }
    }
}

impl JsonLdParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Seeds the context before the document's own `@context` is merged,
    /// equivalent to an outer array-context entry.
    #[must_use]
    pub fn with_seed_context(mut self, context: Value) -> Self {
        self.seed_context = context;
        self
    }

    #[must_use]
    pub fn with_document_loader(mut self, loader: impl JsonLdDocumentLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn with_max_input_bytes(mut self, max: usize) -> Self {
        self.limits.max_input_bytes = max;
        self
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.limits.max_nodes = max;
        self
    }

    #[must_use]
    pub fn with_max_quads(mut self, max: usize) -> Self {
        self.limits.max_quads = max;
        self
    }

    #[must_use]
    pub fn with_max_graph_items(mut self, max: usize) -> Self {
        self.limits.max_graph_items = max;
        self
    }

    pub fn parse_slice(&self, data: &[u8]) -> Result<JsonLdReader, ParseError> {
        self.parse_slice_cancellable(data, &NeverCancel)
    }

    pub fn parse_slice_cancellable(
        &self,
        data: &[u8],
        cancellation: &impl CancellationToken,
    ) -> Result<JsonLdReader, ParseError> {
        if self.limits.max_input_bytes > 0 && data.len() > self.limits.max_input_bytes {
            return Err(ParseError::new(
                ErrorCode::TripleLimitExceeded,
                FORMAT,
                format!(
                    "input exceeds the configured maximum of {} bytes",
                    self.limits.max_input_bytes
                ),
            ));
        }
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| ParseError::new(ErrorCode::ParseError, FORMAT, e.to_string()))?;
        let mut ctx = JsonLdContext::with_base(self.base_iri.clone());
        let loader = self
            .loader
            .as_deref()
            .unwrap_or(&NoopDocumentLoader as &dyn JsonLdDocumentLoader);
        ctx.merge(&self.seed_context, Some(loader), 0)?;
        let mut state = JsonLdState::new(self.limits);
        let mut sink = Vec::new();
        parse_top_level(&value, &ctx, GraphName::DefaultGraph, &mut state, loader, &mut sink, cancellation)?;
        Ok(JsonLdReader {
            quads: sink.into(),
        })
    }
}

/// Yields one [`Quad`] at a time from an already-fully-expanded JSON-LD
/// document. JSON-LD is not byte-streamed the way the line-oriented
/// formats are (spec.md §1 scopes a full streaming processor out); the
/// whole document is parsed and lowered up front, then handed out one
/// quad at a time so callers see the same `Next()`-shaped contract.
pub struct JsonLdReader {
    quads: VecDeque<Quad>,
}

impl JsonLdReader {
    pub fn read_next(&mut self) -> Result<Option<Quad>, ParseError> {
        Ok(self.quads.pop_front())
    }
}

/// Per-decode bookkeeping: the blank-node counter (document-local,
/// monotonic, starting at `b1`) and the node/quad counters the configured
/// [`JsonLdLimits`] bound.
struct JsonLdState {
    blank_nodes: BlankNodeFactory,
    limits: JsonLdLimits,
    node_count: usize,
    quad_count: usize,
}

impl JsonLdState {
    fn new(limits: JsonLdLimits) -> Self {
        Self {
            blank_nodes: BlankNodeFactory::new(),
            limits,
            node_count: 0,
            quad_count: 0,
        }
    }

    fn new_blank_node(&mut self) -> BlankNode {
        self.blank_nodes.fresh()
    }

    fn bump_node_count(&mut self) -> Result<(), ParseError> {
        self.node_count += 1;
        if self.limits.max_nodes > 0 && self.node_count > self.limits.max_nodes {
            return Err(ParseError::new(
                ErrorCode::DepthExceeded,
                FORMAT,
                format!("expansion exceeds the configured maximum of {} nodes", self.limits.max_nodes),
            ));
        }
        Ok(())
    }

    fn bump_quad_count(&mut self) -> Result<(), ParseError> {
        self.quad_count += 1;
        if self.limits.max_quads > 0 && self.quad_count > self.limits.max_quads {
            return Err(ParseError::new(
                ErrorCode::TripleLimitExceeded,
                FORMAT,
                format!("expansion exceeds the configured maximum of {} quads", self.limits.max_quads),
            ));
        }
        Ok(())
    }

    fn check_context(&self, cancellation: &impl CancellationToken) -> Result<(), ParseError> {
        if cancellation.is_canceled() {
            return Err(ParseError::new(ErrorCode::ContextCanceled, FORMAT, "decoding was canceled"));
        }
        Ok(())
    }
}

fn error(cause: impl Into<String>) -> ParseError {
    ParseError::new(ErrorCode::ParseError, FORMAT, cause)
}

/// The document root: an array of nodes, a single node object, or a node
/// object whose only meaningful keys are `@context`/`@graph`.
fn parse_top_level(
    value: &Value,
    ctx: &JsonLdContext,
    graph: GraphName,
    state: &mut JsonLdState,
    loader: &dyn JsonLdDocumentLoader,
    sink: &mut Vec<Quad>,
    cancellation: &impl CancellationToken,
) -> Result<(), ParseError> {
    match value {
        Value::Array(items) => {
            if state.limits.max_graph_items > 0 && items.len() > state.limits.max_graph_items {
                return Err(ParseError::new(
                    ErrorCode::TripleLimitExceeded,
                    FORMAT,
                    format!(
                        "graph array exceeds the configured maximum of {} items",
                        state.limits.max_graph_items
                    ),
                ));
            }
            for item in items {
                state.check_context(cancellation)?;
                if let Value::Object(map) = item {
                    parse_node(map, ctx, graph.clone(), state, loader, sink, cancellation)?;
                } else {
                    return Err(error("top-level array elements must be JSON-LD node objects"));
                }
            }
            Ok(())
        }
        Value::Object(map) => {
            parse_node(map, ctx, graph, state, loader, sink, cancellation)?;
            Ok(())
        }
        _ => Err(error("a JSON-LD document must be a JSON object or array")),
    }
}

/// Parses one JSON-LD node object, emitting its asserted quads into
/// `sink`, and returns the [`Term`] identifying its subject.
fn parse_node(
    obj: &Map<String, Value>,
    ctx: &JsonLdContext,
    graph: GraphName,
    state: &mut JsonLdState,
    loader: &dyn JsonLdDocumentLoader,
    sink: &mut Vec<Quad>,
    cancellation: &impl CancellationToken,
) -> Result<Term, ParseError> {
    state.check_context(cancellation)?;
    state.bump_node_count()?;

    let mut ctx = ctx.clone();
    if let Some(node_context) = obj.get("@context") {
        ctx.merge(node_context, Some(loader), 0)?;
    }

    let subject_term = match obj.get("@id").and_then(Value::as_str) {
        Some(id) => Term::NamedNode(
            NamedNode::new(ctx.expand_reference(id)?)
                .map_err(|e| ParseError::new(ErrorCode::InvalidIri, FORMAT, e.to_string()))?,
        ),
        None => Term::BlankNode(state.new_blank_node()),
    };
    let subject: Subject = subject_term.clone().try_into().expect("subject is never a literal");

    if let Some(type_value) = obj.get("@type") {
        for type_item in as_items(type_value) {
            let Value::String(type_str) = type_item else {
                return Err(error("@type values must be strings"));
            };
            let type_iri = NamedNode::new(ctx.expand_reference(type_str)?)
                .map_err(|e| ParseError::new(ErrorCode::InvalidIri, FORMAT, e.to_string()))?;
            push_quad(
                state,
                sink,
                Quad::new(subject.clone(), NamedNode::new_unchecked(rdf::TYPE), type_iri, graph.clone()),
            )?;
        }
    }

    for (key, value) in obj {
        if key.starts_with('@') {
            continue;
        }
        if key == "@graph" {
            continue;
        }
        let predicate = NamedNode::new(ctx.expand(key))
            .map_err(|e| ParseError::new(ErrorCode::InvalidIri, FORMAT, e.to_string()))?;
        for item in as_items(value) {
            emit_value(&subject, &predicate, item, &ctx, graph.clone(), state, loader, sink, cancellation)?;
        }
    }

    if let Some(graph_value) = obj.get("@graph") {
        let child_graph = match &subject_term {
            Term::NamedNode(n) if obj.contains_key("@id") => GraphName::NamedNode(n.clone()),
            Term::BlankNode(b) if obj.contains_key("@id") => GraphName::BlankNode(b.clone()),
            _ => GraphName::DefaultGraph,
        };
        parse_top_level(graph_value, &ctx, child_graph, state, loader, sink, cancellation)?;
    }

    Ok(subject_term)
}

/// Normalizes a context/type/value position that may be either a bare
/// value or a JSON array of values into a uniform iterator.
fn as_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_value(
    subject: &Subject,
    predicate: &NamedNode,
    value: &Value,
    ctx: &JsonLdContext,
    graph: GraphName,
    state: &mut JsonLdState,
    loader: &dyn JsonLdDocumentLoader,
    sink: &mut Vec<Quad>,
    cancellation: &impl CancellationToken,
) -> Result<(), ParseError> {
    let object = match value {
        Value::Object(map) if map.contains_key("@value") => Term::Literal(build_value_literal(map, ctx)?),
        Value::Object(map) if map.contains_key("@list") => {
            expand_list(map.get("@list"), ctx, graph.clone(), state, loader, sink, cancellation)?
        }
        Value::Object(map) => parse_node(map, ctx, graph.clone(), state, loader, sink, cancellation)?,
        Value::String(s) => Term::Literal(rdf_core::Literal::new_simple_literal(s.clone())),
        Value::Number(n) => Term::Literal(rdf_core::Literal::new_typed_literal(
            canon::format_number(n)?,
            NamedNode::new_unchecked(xsd::DECIMAL),
        )),
        Value::Bool(b) => Term::Literal(rdf_core::Literal::new_typed_literal(
            if *b { "true" } else { "false" },
            NamedNode::new_unchecked(xsd::BOOLEAN),
        )),
        Value::Null => return Ok(()),
        Value::Array(_) => return Err(error("nested arrays are not valid JSON-LD value positions")),
    };
    push_quad(state, sink, Quad::new(subject.clone(), predicate.clone(), object, graph))
}

fn build_value_literal(map: &Map<String, Value>, ctx: &JsonLdContext) -> Result<rdf_core::Literal, ParseError> {
    let value = map.get("@value").ok_or_else(|| error("@value object is missing its value"))?;
    if let Some(lang) = map.get("@language").and_then(Value::as_str) {
        let Value::String(s) = value else {
            return Err(error("@language requires a string @value"));
        };
        return rdf_core::Literal::new_language_tagged_literal(s.clone(), lang)
            .map_err(|e| ParseError::new(ErrorCode::InvalidLiteral, FORMAT, e.to_string()));
    }
    if let Some(type_str) = map.get("@type").and_then(Value::as_str) {
        let expanded_type = ctx.expand_reference(type_str)?;
        if expanded_type == "@json" || expanded_type == rdf::JSON {
            let canonical = canon::canonicalize(value)?;
            return Ok(rdf_core::Literal::new_typed_literal(canonical, NamedNode::new_unchecked(rdf::JSON)));
        }
        let lexical = value_to_lexical(value);
        let datatype = NamedNode::new(expanded_type)
            .map_err(|e| ParseError::new(ErrorCode::InvalidIri, FORMAT, e.to_string()))?;
        return Ok(rdf_core::Literal::new_typed_literal(lexical, datatype));
    }
    Ok(match value {
        Value::String(s) => rdf_core::Literal::new_simple_literal(s.clone()),
        Value::Number(n) => {
            rdf_core::Literal::new_typed_literal(canon::format_number(n)?, NamedNode::new_unchecked(xsd::DECIMAL))
        }
        Value::Bool(b) => rdf_core::Literal::new_typed_literal(
            if *b { "true" } else { "false" },
            NamedNode::new_unchecked(xsd::BOOLEAN),
        ),
        _ => rdf_core::Literal::new_simple_literal(value_to_lexical(value)),
    })
}

fn value_to_lexical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "true" } else { "false" }).to_string(),
        other => other.to_string(),
    }
}

/// `{"@list": [i1, i2, ..., in]}` expanded to an `rdf:first`/`rdf:rest`
/// chain terminated by `rdf:nil`, mirroring `rdf-turtle`'s Turtle
/// collection expansion (spec.md §4.5.6, applied here per §4.8 step 4).
#[allow(clippy::too_many_arguments)]
fn expand_list(
    list_value: Option<&Value>,
    ctx: &JsonLdContext,
    graph: GraphName,
    state: &mut JsonLdState,
    loader: &dyn JsonLdDocumentLoader,
    sink: &mut Vec<Quad>,
    cancellation: &impl CancellationToken,
) -> Result<Term, ParseError> {
    let items = match list_value {
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(error("@list must be a JSON array")),
        None => &[],
    };
    if items.is_empty() {
        return Ok(Term::NamedNode(NamedNode::new_unchecked(rdf::NIL)));
    }
    let nodes: Vec<BlankNode> = items.iter().map(|_| state.new_blank_node()).collect();
    for (i, item) in items.iter().enumerate() {
        let cell = nodes[i].clone();
        emit_value(
            &Subject::BlankNode(cell.clone()),
            &NamedNode::new_unchecked(rdf::FIRST),
            item,
            ctx,
            graph.clone(),
            state,
            loader,
            sink,
            cancellation,
        )?;
        let rest = if i + 1 < nodes.len() {
            Term::BlankNode(nodes[i + 1].clone())
        } else {
            Term::NamedNode(NamedNode::new_unchecked(rdf::NIL))
        };
        push_quad(
            state,
            sink,
            Quad::new(cell, NamedNode::new_unchecked(rdf::REST), rest, graph.clone()),
        )?;
    }
    Ok(Term::BlankNode(nodes[0].clone()))
}

fn push_quad(state: &mut JsonLdState, sink: &mut Vec<Quad>, quad: Quad) -> Result<(), ParseError> {
    state.bump_quad_count()?;
    sink.push(quad);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Vec<Quad> {
        let parser = JsonLdParser::new();
        let mut reader = parser.parse_slice(input.as_bytes()).unwrap();
        let mut out = Vec::new();
        while let Some(q) = reader.read_next().unwrap() {
            out.push(q);
        }
        out
    }

    #[test]
    fn simple_node_with_iri_object() {
        let quads = parse_all(r#"{"@context":{"ex":"http://ex/"},"ex:p":{"@id":"ex:o"},"@id":"ex:s"}"#);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].subject.to_string(), "<http://ex/s>");
        assert_eq!(quads[0].predicate.to_string(), "<http://ex/p>");
        assert_eq!(quads[0].object.to_string(), "<http://ex/o>");
        assert!(quads[0].graph_name.is_default_graph());
    }

    #[test]
    fn graph_array_scenario() {
        let quads = parse_all(
            r#"{"@context":{"ex":"http://ex/"},"@graph":[{"@id":"ex:s","ex:p":{"@id":"ex:o"}}]}"#,
        );
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].subject.to_string(), "<http://ex/s>");
        assert_eq!(quads[0].object.to_string(), "<http://ex/o>");
    }

    #[test]
    fn named_graph_from_enclosing_id() {
        let quads = parse_all(
            r#"{"@context":{"ex":"http://ex/"},"@id":"ex:g","@graph":[{"@id":"ex:s","ex:p":{"@id":"ex:o"}}]}"#,
        );
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].graph_name.to_string(), "<http://ex/g>");
    }

    #[test]
    fn literal_with_language() {
        let quads = parse_all(
            r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","ex:p":{"@value":"bonjour","@language":"fr"}}"#,
        );
        assert_eq!(quads[0].object.to_string(), "\"bonjour\"@fr");
    }

    #[test]
    fn plain_string_is_xsd_string() {
        let quads = parse_all(r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","ex:p":"v"}"#);
        assert_eq!(quads[0].object.to_string(), "\"v\"");
    }

    #[test]
    fn number_is_xsd_decimal_with_jcs_lexical() {
        let quads = parse_all(r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","ex:p":42.0}"#);
        assert_eq!(
            quads[0].object.to_string(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#decimal>"
        );
    }

    #[test]
    fn list_expands_to_collection() {
        let quads = parse_all(r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","ex:p":{"@list":["a","b"]}}"#);
        assert_eq!(quads.len(), 5);
    }

    #[test]
    fn json_literal_is_canonicalized() {
        let quads = parse_all(
            r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","ex:p":{"@value":{"b":1,"a":2},"@type":"@json"}}"#,
        );
        assert_eq!(
            quads[0].object.to_string(),
            "\"{\\\"a\\\":2,\\\"b\\\":1}\"^^<http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON>"
        );
    }

    #[test]
    fn blank_node_subject_without_id() {
        let quads = parse_all(r#"{"@context":{"ex":"http://ex/"},"ex:p":"v"}"#);
        assert!(quads[0].subject.to_string().starts_with("_:b"));
    }

    #[test]
    fn type_keyword_emits_rdf_type() {
        let quads = parse_all(r#"{"@context":{"ex":"http://ex/"},"@id":"ex:s","@type":"ex:Thing"}"#);
        assert_eq!(quads[0].predicate.to_string(), "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>");
        assert_eq!(quads[0].object.to_string(), "<http://ex/Thing>");
    }

    #[test]
    fn node_count_limit_is_enforced() {
        let parser = JsonLdParser::new().with_max_nodes(1);
        let err = parser
            .parse_slice(br#"[{"@id":"http://ex/a"},{"@id":"http://ex/b"}]"#)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DepthExceeded);
    }
}
