//! The plain Turtle driver: wires [`crate::reader::LineReader`] and
//! [`crate::accumulator::StatementAccumulator`] into
//! [`crate::cursor::parse_statement`], yielding one [`Triple`] at a time.

use crate::accumulator::{Chunk, StatementAccumulator};
use crate::cancellation::{CancellationToken, NeverCancel};
use crate::cursor::{parse_statement, CursorLimits, CursorState, StatementOutcome};
use crate::reader::LineReader;
use rdf_core::{ErrorCode, ParseError, Triple};
use std::io::BufRead;

const FORMAT: &str = "turtle";

/// Builds [`TurtleReader`]s.
#[derive(Debug, Clone)]
pub struct TurtleParser {
    base_iri: Option<String>,
    prefixes: Vec<(String, String)>,
    limits: CursorLimits,
    max_line_bytes: usize,
    max_statement_bytes: usize,
    checked: bool,
}

impl Default for TurtleParser {
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

impl TurtleParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Seeds the prefix table before decoding begins, as if each pair had
    /// been declared by a leading `@prefix` directive.
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

    /// Skips re-validating IRIs minted from already-resolved references and
    /// prefix expansions. A performance opt-in for trusted input.
    #[must_use]
    pub fn unchecked(mut self) -> Self {
        self.checked = false;
        self
    }

    pub fn parse_read<R: BufRead>(&self, reader: R) -> TurtleReader<R> {
        let lines = LineReader::new(reader, FORMAT).with_max_line_bytes(self.max_line_bytes);
        let accumulator = StatementAccumulator::new(lines, FORMAT, false)
            .with_max_statement_bytes(self.max_statement_bytes);
        let mut state = CursorState::new();
        state.base = self.base_iri.clone();
        state.limits = self.limits;
        state.checked = self.checked;
        for (prefix, iri) in &self.prefixes {
            state.prefixes.insert(prefix.clone(), iri.clone());
        }
        TurtleReader {
            accumulator,
            state,
            pending: Vec::new(),
            triples_emitted: 0,
        }
    }
}

/// Yields one [`Triple`] at a time from a Turtle document.
pub struct TurtleReader<R> {
    accumulator: StatementAccumulator<R>,
    state: CursorState,
    pending: Vec<Triple>,
    triples_emitted: usize,
}

impl<R: BufRead> TurtleReader<R> {
    pub fn read_next(&mut self) -> Result<Option<Triple>, ParseError> {
        self.read_next_cancellable(&NeverCancel)
    }

    pub fn read_next_cancellable(
        &mut self,
        cancellation: &impl CancellationToken,
    ) -> Result<Option<Triple>, ParseError> {
        loop {
            if let Some(triple) = self.take_pending() {
                return Ok(Some(triple));
            }
            let Some(chunk) = self.accumulator.next_chunk(cancellation)? else {
                return Ok(None);
            };
            match chunk {
                Chunk::Statement { text, line } => {
                    let outcome = parse_statement(&mut self.state, FORMAT, &text)
                        .map_err(|e| with_line(e, line))?;
                    if let StatementOutcome::Triples(triples) = outcome {
                        self.check_triple_limit(triples.len())?;
                        self.pending = triples;
                    }
                }
                Chunk::GraphOpen { line, .. } | Chunk::GraphClose { line } => {
                    return Err(ParseError::new(
                        ErrorCode::ParseError,
                        FORMAT,
                        "TriG graph blocks are not valid Turtle syntax",
                    )
                    .with_position(rdf_core::TextPosition {
                        line,
                        column: 0,
                        byte_offset: None,
                    }));
                }
            }
        }
    }

    fn take_pending(&mut self) -> Option<Triple> {
        if self.pending.is_empty() {
            None
        } else {
            self.triples_emitted += 1;
            Some(self.pending.remove(0))
        }
    }

    fn check_triple_limit(&self, additional: usize) -> Result<(), ParseError> {
        let limit = self.state.limits.max_triples;
        if limit > 0 && self.triples_emitted + additional > limit {
            return Err(ParseError::new(
                ErrorCode::TripleLimitExceeded,
                FORMAT,
                format!("decode exceeds the configured maximum of {limit} triples"),
            ));
        }
        Ok(())
    }
}

pub(crate) fn with_line(mut err: ParseError, line: u64) -> ParseError {
    let pos = err.position();
    if pos.line == 0 {
        err = err.with_position(rdf_core::TextPosition { line, ..pos });
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Vec<Triple> {
        let parser = TurtleParser::new();
        let mut reader = parser.parse_read(input.as_bytes());
        let mut out = Vec::new();
        while let Some(t) = reader.read_next().unwrap() {
            out.push(t);
        }
        out
    }

    #[test]
    fn parses_prefixed_statement() {
        let out = parse_all("@prefix ex: <http://ex/> .\nex:s ex:p ex:o .\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].predicate.to_string(), "<http://ex/p>");
    }

    #[test]
    fn parses_multiple_statements() {
        let out = parse_all("@prefix ex: <http://ex/> .\nex:s ex:p \"a\", \"b\" .\n");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn expands_collection_into_extra_triples() {
        let out = parse_all("@prefix ex: <http://ex/> .\nex:s ex:p ( \"a\" \"b\" ) .\n");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn rejects_trig_graph_block() {
        let parser = TurtleParser::new();
        let mut reader = parser.parse_read("ex:g { ex:s ex:p ex:o . }\n".as_bytes());
        assert!(reader.read_next().is_err());
    }

    #[test]
    fn respects_base_iri_option() {
        let parser = TurtleParser::new().with_base_iri("http://ex/");
        let mut reader = parser.parse_read("<a> <b> <c> .\n".as_bytes());
        let t = reader.read_next().unwrap().unwrap();
        assert_eq!(t.subject.to_string(), "<http://ex/a>");
    }

    #[test]
    fn enforces_triple_limit() {
        let parser = TurtleParser::new().with_max_triples(1);
        let mut reader =
            parser.parse_read("@prefix ex: <http://ex/> .\nex:s ex:p \"a\", \"b\" .\n".as_bytes());
        assert!(reader.read_next().unwrap().is_some());
        assert!(reader.read_next().is_err());
    }
}
