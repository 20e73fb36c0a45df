//! The TriG driver: layers graph-block dispatch (`GRAPH`? label `{ ... }`)
//! on top of the same accumulator/cursor engine used for plain Turtle,
//! yielding [`Quad`]s instead of bare [`Triple`]s.

use crate::accumulator::{Chunk, StatementAccumulator};
use crate::cancellation::{CancellationToken, NeverCancel};
use crate::cursor::{parse_graph_label, parse_statement, CursorLimits, CursorState, StatementOutcome};
use crate::reader::LineReader;
use crate::turtle::with_line;
use rdf_core::{ErrorCode, GraphName, ParseError, Quad};
use std::io::BufRead;

const FORMAT: &str = "trig";

/// Builds [`TriGReader`]s.
#[derive(Debug, Clone)]
pub struct TriGParser {
    base_iri: Option<String>,
    prefixes: Vec<(String, String)>,
    limits: CursorLimits,
    max_line_bytes: usize,
    max_statement_bytes: usize,
    checked: bool,
}

impl Default for TriGParser {
    fn default() -> Self {
        Self {
            base_iri: None,
            prefixes: Vec::new(),
            limits: CursorLimits::default(),
            max_line_bytes: 0,
            max_statement_bytes: 0,
            checked: true,
        }
    }
}

impl TriGParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), iri.into()));
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.limits.max_depth = max;
        self
    }

    #[must_use]
    pub fn with_max_triples(mut self, max: usize) -> Self {
        self.limits.max_triples = max;
        self
    }

    #[must_use]
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    #[must_use]
    pub fn with_max_statement_bytes(mut self, max: usize) -> Self {
        self.max_statement_bytes = max;
        self
    }

    #[must_use]
    pub fn unchecked(mut self) -> Self {
        self.checked = false;
        self
    }

    pub fn parse_read<R: BufRead>(&self, reader: R) -> TriGReader<R> {
        let lines = LineReader::new(reader, FORMAT).with_max_line_bytes(self.max_line_bytes);
        let accumulator = StatementAccumulator::new(lines, FORMAT, true)
            .with_max_statement_bytes(self.max_statement_bytes);
        let mut state = CursorState::new();
        state.base = self.base_iri.clone();
        state.limits = self.limits;
        state.checked = self.checked;
        for (prefix, iri) in &self.prefixes {
            state.prefixes.insert(prefix.clone(), iri.clone());
        }
        TriGReader {
            accumulator,
            state,
            pending: Vec::new(),
            current_graph: GraphName::DefaultGraph,
            quads_emitted: 0,
        }
    }
}

/// Yields one [`Quad`] at a time from a TriG document.
pub struct TriGReader<R> {
    accumulator: StatementAccumulator<R>,
    state: CursorState,
    pending: Vec<Quad>,
    current_graph: GraphName,
    quads_emitted: usize,
}

impl<R: BufRead> TriGReader<R> {
    pub fn read_next(&mut self) -> Result<Option<Quad>, ParseError> {
        self.read_next_cancellable(&NeverCancel)
    }

    pub fn read_next_cancellable(
        &mut self,
        cancellation: &impl CancellationToken,
    ) -> Result<Option<Quad>, ParseError> {
        loop {
            if !self.pending.is_empty() {
                self.quads_emitted += 1;
                return Ok(Some(self.pending.remove(0)));
            }
            let Some(chunk) = self.accumulator.next_chunk(cancellation)? else {
                return Ok(None);
            };
            match chunk {
                Chunk::Statement { text, line } => {
                    let outcome = parse_statement(&mut self.state, FORMAT, &text)
                        .map_err(|e| with_line(e, line))?;
                    if let StatementOutcome::Triples(triples) = outcome {
                        self.check_quad_limit(triples.len())?;
                        self.pending = triples
                            .into_iter()
                            .map(|t| t.in_graph(self.current_graph.clone()))
                            .collect();
                    }
                }
                Chunk::GraphOpen { label, line } => {
                    let label = strip_graph_keyword(&label);
                    self.current_graph = if label.is_empty() {
                        GraphName::DefaultGraph
                    } else {
                        parse_graph_label(&mut self.state, FORMAT, label)
                            .map_err(|e| with_line(e, line))?
                    };
                }
                Chunk::GraphClose { .. } => {
                    self.current_graph = GraphName::DefaultGraph;
                }
            }
        }
    }

    fn check_quad_limit(&self, additional: usize) -> Result<(), ParseError> {
        let limit = self.state.limits.max_triples;
        if limit > 0 && self.quads_emitted + additional > limit {
            return Err(ParseError::new(
                ErrorCode::TripleLimitExceeded,
                FORMAT,
                format!("decode exceeds the configured maximum of {limit} triples"),
            ));
        }
        Ok(())
    }
}

/// Strips an optional, case-insensitive leading `GRAPH` keyword from a
/// graph-block label.
fn strip_graph_keyword(label: &str) -> &str {
    let trimmed = label.trim();
    if trimmed.len() >= 5 && trimmed[..5].eq_ignore_ascii_case("graph") {
        let rest = trimmed[5..].trim_start();
        if rest.len() < trimmed.len() {
            return rest;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Vec<Quad> {
        let parser = TriGParser::new();
        let mut reader = parser.parse_read(input.as_bytes());
        let mut out = Vec::new();
        while let Some(q) = reader.read_next().unwrap() {
            out.push(q);
        }
        out
    }

    #[test]
    fn default_graph_statements_without_blocks() {
        let out = parse_all("@prefix ex: <http://ex/> .\nex:s ex:p ex:o .\n");
        assert_eq!(out.len(), 1);
        assert!(out[0].graph_name.is_default_graph());
    }

    #[test]
    fn graph_block_assigns_named_graph() {
        let out = parse_all("@prefix ex: <http://ex/> .\nex:g {\nex:s ex:p ex:o .\n}\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].graph_name, GraphName::NamedNode(rdf_core::NamedNode::new("http://ex/g").unwrap()));
    }

    #[test]
    fn graph_keyword_is_optional_and_case_insensitive() {
        let out = parse_all("@prefix ex: <http://ex/> .\nGRAPH ex:g {\nex:s ex:p ex:o .\n}\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].graph_name, GraphName::NamedNode(rdf_core::NamedNode::new("http://ex/g").unwrap()));
    }

    #[test]
    fn returns_to_default_graph_after_block_close() {
        let out = parse_all(
            "@prefix ex: <http://ex/> .\nex:g {\nex:s ex:p ex:o .\n}\nex:s2 ex:p2 ex:o2 .\n",
        );
        assert_eq!(out.len(), 2);
        assert!(out[1].graph_name.is_default_graph());
    }
}
