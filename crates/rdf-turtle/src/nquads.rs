//! N-Quads parsing and serialization: an N-Triples line plus an optional
//! fourth graph-name term.

use crate::cancellation::{CancellationToken, NeverCancel};
use crate::ntriples::LineScanner;
use crate::reader::LineReader;
use rdf_core::{BlankNodeFactory, ErrorCode, GraphName, ParseError, Quad, Term};
use std::io::{self, BufRead, Write};

const FORMAT: &str = "nquads";

/// Builds [`NQuadsReader`]s and [`NQuadsSerializer`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct NQuadsParser {
    max_line_bytes: usize,
}

impl NQuadsParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    pub fn parse_read<R: BufRead>(&self, reader: R) -> NQuadsReader<R> {
        NQuadsReader {
            lines: LineReader::new(reader, FORMAT).with_max_line_bytes(self.max_line_bytes),
            blank_nodes: BlankNodeFactory::new(),
        }
    }
}

/// Yields one [`Quad`] per non-blank, non-comment input line.
pub struct NQuadsReader<R> {
    lines: LineReader<R>,
    blank_nodes: BlankNodeFactory,
}

impl<R: BufRead> NQuadsReader<R> {
    pub fn read_next(&mut self) -> Result<Option<Quad>, ParseError> {
        self.read_next_cancellable(&NeverCancel)
    }

    pub fn read_next_cancellable(
        &mut self,
        cancellation: &impl CancellationToken,
    ) -> Result<Option<Quad>, ParseError> {
        loop {
            let Some(line) = self.lines.read_line(cancellation)? else {
                return Ok(None);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut scanner = LineScanner::new(trimmed, FORMAT, &mut self.blank_nodes);
            let subject = scanner.parse_subject()?;
            scanner.skip_ws()?;
            let predicate = scanner.parse_predicate()?;
            scanner.skip_ws()?;
            let object = scanner.parse_term()?;
            scanner.skip_ws()?;
            let graph_name = if scanner.peek_dot() {
                GraphName::DefaultGraph
            } else {
                let term = scanner.parse_term()?;
                scanner.skip_ws()?;
                match term {
                    Term::NamedNode(n) => GraphName::NamedNode(n),
                    Term::BlankNode(b) => GraphName::BlankNode(b),
                    _ => {
                        return Err(ParseError::new(
                            ErrorCode::ParseError,
                            FORMAT,
                            "graph name must be an IRI or blank node",
                        ));
                    }
                }
            };
            scanner.expect_dot()?;
            return Ok(Some(Quad::new(subject, predicate, object, graph_name)));
        }
    }
}

/// Writes quads in canonical N-Quads form, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NQuadsSerializer;

impl NQuadsSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize_to_write<W: Write>(&self, mut write: W, quad: &Quad) -> io::Result<()> {
        writeln!(write, "{quad} .")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Vec<Quad> {
        let parser = NQuadsParser::new();
        let mut reader = parser.parse_read(input.as_bytes());
        let mut out = Vec::new();
        while let Some(q) = reader.read_next().unwrap() {
            out.push(q);
        }
        out
    }

    #[test]
    fn parses_triple_in_default_graph() {
        let q = parse_all("<http://ex/s> <http://ex/p> <http://ex/o> .\n");
        assert_eq!(q.len(), 1);
        assert!(q[0].graph_name.is_default_graph());
    }

    #[test]
    fn parses_quad_with_named_graph() {
        let q = parse_all("<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> .\n");
        assert_eq!(q[0].graph_name, GraphName::NamedNode(rdf_core::NamedNode::new("http://ex/g").unwrap()));
    }

    #[test]
    fn parses_quad_with_blank_node_graph() {
        let q = parse_all("<http://ex/s> <http://ex/p> <http://ex/o> _:g1 .\n");
        assert_eq!(q[0].graph_name.to_string(), "_:g1");
    }

    #[test]
    fn serializes_default_graph_without_graph_term() {
        let q = &parse_all("<http://ex/s> <http://ex/p> <http://ex/o> .\n")[0];
        let mut buf = Vec::new();
        NQuadsSerializer::new().serialize_to_write(&mut buf, q).unwrap();
        assert_eq!(buf, b"<http://ex/s> <http://ex/p> <http://ex/o> .\n");
    }
}
