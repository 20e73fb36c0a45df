//! The shared Turtle/TriG pretty writer (spec.md §4.7, C7): prefix-table
//! management and subject/predicate grouping (`;`/`,` abbreviation) shared
//! by [`TurtleSerializer`] and [`TriGSerializer`]. N-Triples and N-Quads
//! have their own flat one-line-per-statement serializers
//! ([`crate::ntriples::NTriplesSerializer`], [`crate::nquads::NQuadsSerializer`])
//! since there is nothing to abbreviate there.

use rdf_core::{GraphName, NamedNode, Quad, Subject, Term, Triple};
use std::collections::HashMap;
use std::io::{self, Write};

/// Builds [`TurtleSerializer`]s and [`TriGSerializer`]s, seeded with a
/// prefix table used to abbreviate matching IRIs as `prefix:local`.
#[derive(Debug, Default, Clone)]
pub struct PrefixTable {
    entries: Vec<(String, String)>,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.entries.push((prefix.into(), iri.into()));
        self
    }

    fn write_directives<W: Write>(&self, mut write: W) -> io::Result<()> {
        for (prefix, iri) in &self.entries {
            writeln!(write, "@prefix {prefix}: <{iri}> .")?;
        }
        if !self.entries.is_empty() {
            writeln!(write)?;
        }
        Ok(())
    }

    /// Returns `prefix:local` for `iri` if a configured prefix covers it and
    /// the remainder is a simple local name, else `None`.
    fn abbreviate(&self, iri: &str) -> Option<String> {
        self.entries
            .iter()
            .filter(|(_, base)| iri.starts_with(base.as_str()))
            .max_by_key(|(_, base)| base.len())
            .and_then(|(prefix, base)| {
                let local = &iri[base.len()..];
                is_simple_local_name(local).then(|| format!("{prefix}:{local}"))
            })
    }
}

fn is_simple_local_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && !s.ends_with('.')
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '%'))
}

/// Writes a [`NamedNode`], abbreviated when the prefix table covers it.
fn write_named_node<W: Write>(write: &mut W, prefixes: &PrefixTable, node: &NamedNode) -> io::Result<()> {
    match prefixes.abbreviate(node.as_str()) {
        Some(abbreviated) => write!(write, "{abbreviated}"),
        None => write!(write, "{node}"),
    }
}

fn write_subject<W: Write>(write: &mut W, prefixes: &PrefixTable, subject: &Subject) -> io::Result<()> {
    match subject {
        Subject::NamedNode(n) => write_named_node(write, prefixes, n),
        other => write!(write, "{other}"),
    }
}

fn write_term<W: Write>(write: &mut W, prefixes: &PrefixTable, term: &Term) -> io::Result<()> {
    match term {
        Term::NamedNode(n) => write_named_node(write, prefixes, n),
        other => write!(write, "{other}"),
    }
}

/// Groups `triples` by subject, then by predicate, preserving first-seen
/// order, and writes them to `write` using `;`/`,` abbreviation. Shared by
/// the top level of a Turtle document and each graph block of a TriG one.
fn write_grouped_triples<W: Write>(
    write: &mut W,
    prefixes: &PrefixTable,
    triples: &[Triple],
    indent: &str,
) -> io::Result<()> {
    let mut subject_order: Vec<&Subject> = Vec::new();
    let mut by_subject: HashMap<&Subject, Vec<&Triple>> = HashMap::new();
    for triple in triples {
        by_subject
            .entry(&triple.subject)
            .or_insert_with(|| {
                subject_order.push(&triple.subject);
                Vec::new()
            })
            .push(triple);
    }
    for subject in subject_order {
        let group = &by_subject[subject];
        write!(write, "{indent}")?;
        write_subject(write, prefixes, subject)?;
        let mut pred_order: Vec<&NamedNode> = Vec::new();
        let mut by_pred: HashMap<&NamedNode, Vec<&Term>> = HashMap::new();
        for triple in group.iter() {
            by_pred
                .entry(&triple.predicate)
                .or_insert_with(|| {
                    pred_order.push(&triple.predicate);
                    Vec::new()
                })
                .push(&triple.object);
        }
        for (i, predicate) in pred_order.iter().enumerate() {
            if i == 0 {
                write!(write, " ")?;
            } else {
                writeln!(write, ";")?;
                write!(write, "{indent}    ")?;
            }
            write_named_node(write, prefixes, predicate)?;
            write!(write, " ")?;
            let objects = &by_pred[predicate];
            for (j, object) in objects.iter().enumerate() {
                if j > 0 {
                    write!(write, ", ")?;
                }
                write_term(write, prefixes, object)?;
            }
        }
        writeln!(write, " .")?;
    }
    Ok(())
}

/// Writes [`Triple`]s as Turtle, abbreviating IRIs with the configured
/// prefix table and grouping repeated subjects/predicates.
#[derive(Debug, Default, Clone)]
pub struct TurtleSerializer {
    prefixes: PrefixTable,
}

impl TurtleSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes = self.prefixes.with_prefix(prefix, iri);
        self
    }

    pub fn serialize_to_write<W: Write>(&self, mut write: W, triples: &[Triple]) -> io::Result<()> {
        self.prefixes.write_directives(&mut write)?;
        write_grouped_triples(&mut write, &self.prefixes, triples, "")
    }
}

/// Writes [`Quad`]s as TriG: default-graph triples at the top level, and
/// the rest grouped into `label { ... }` blocks in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct TriGSerializer {
    prefixes: PrefixTable,
}

impl TriGSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes = self.prefixes.with_prefix(prefix, iri);
        self
    }

    pub fn serialize_to_write<W: Write>(&self, mut write: W, quads: &[Quad]) -> io::Result<()> {
        self.prefixes.write_directives(&mut write)?;
        let default_graph: Vec<Triple> = quads
            .iter()
            .filter(|q| q.graph_name.is_default_graph())
            .map(|q| Triple::new(q.subject.clone(), q.predicate.clone(), q.object.clone()))
            .collect();
        write_grouped_triples(&mut write, &self.prefixes, &default_graph, "")?;

        let mut graph_order: Vec<&GraphName> = Vec::new();
        for quad in quads {
            if !quad.graph_name.is_default_graph() && !graph_order.contains(&&quad.graph_name) {
                graph_order.push(&quad.graph_name);
            }
        }
        for graph_name in graph_order {
            let triples: Vec<Triple> = quads
                .iter()
                .filter(|q| &q.graph_name == graph_name)
                .map(|q| Triple::new(q.subject.clone(), q.predicate.clone(), q.object.clone()))
                .collect();
            match graph_name {
                GraphName::NamedNode(n) => write_named_node(&mut write, &self.prefixes, n)?,
                GraphName::BlankNode(b) => write!(write, "{b}")?,
                GraphName::DefaultGraph => unreachable!("filtered above"),
            }
            writeln!(write, " {{")?;
            write_grouped_triples(&mut write, &self.prefixes, &triples, "    ")?;
            writeln!(write, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::NamedNode;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn abbreviates_subject_and_predicate() {
        let serializer = TurtleSerializer::new().with_prefix("ex", "http://ex/");
        let triples = vec![Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"))];
        let mut buf = Vec::new();
        serializer.serialize_to_write(&mut buf, &triples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("@prefix ex: <http://ex/> ."));
        assert!(text.contains("ex:s ex:p ex:o ."));
    }

    #[test]
    fn groups_repeated_predicate_with_commas() {
        let serializer = TurtleSerializer::new().with_prefix("ex", "http://ex/");
        let triples = vec![
            Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o1")),
            Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o2")),
        ];
        let mut buf = Vec::new();
        serializer.serialize_to_write(&mut buf, &triples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ex:o1, ex:o2"));
    }

    #[test]
    fn groups_repeated_subject_with_semicolon() {
        let serializer = TurtleSerializer::new().with_prefix("ex", "http://ex/");
        let triples = vec![
            Triple::new(iri("http://ex/s"), iri("http://ex/p1"), iri("http://ex/o1")),
            Triple::new(iri("http://ex/s"), iri("http://ex/p2"), iri("http://ex/o2")),
        ];
        let mut buf = Vec::new();
        serializer.serialize_to_write(&mut buf, &triples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(";"));
    }

    #[test]
    fn trig_writes_graph_blocks() {
        let serializer = TriGSerializer::new().with_prefix("ex", "http://ex/");
        let quads = vec![Quad::new(
            iri("http://ex/s"),
            iri("http://ex/p"),
            iri("http://ex/o"),
            iri("http://ex/g"),
        )];
        let mut buf = Vec::new();
        serializer.serialize_to_write(&mut buf, &quads).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ex:g {"));
        assert!(text.contains("    ex:s ex:p ex:o ."));
    }
}
