use crate::blank_node::BlankNode;
use crate::literal::Literal;
use crate::named_node::NamedNode;
use std::fmt;

/// Discriminator for [`Term`], allowing downstream code to branch on
/// `kind()` rather than performing runtime type tests.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TermKind {
    Iri,
    BlankNode,
    Literal,
    Triple,
}

/// A tagged-variant RDF term: an IRI, a blank node, a literal, or a quoted
/// triple term. Terms are value-typed and immutable once built.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    /// A quoted triple used as a term. Never directly asserted: appearing
    /// here always means *quoted*.
    Triple(Box<Triple>),
}

impl Term {
    #[inline]
    pub fn kind(&self) -> TermKind {
        match self {
            Self::NamedNode(_) => TermKind::Iri,
            Self::BlankNode(_) => TermKind::BlankNode,
            Self::Literal(_) => TermKind::Literal,
            Self::Triple(_) => TermKind::Triple,
        }
    }

    #[inline]
    pub fn is_named_node(&self) -> bool {
        matches!(self, Self::NamedNode(_))
    }

    #[inline]
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    #[inline]
    pub fn is_triple(&self) -> bool {
        matches!(self, Self::Triple(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(n) => n.fmt(f),
            Self::BlankNode(b) => b.fmt(f),
            Self::Literal(l) => l.fmt(f),
            Self::Triple(t) => write!(f, "<<( {t} )>>"),
        }
    }
}

impl From<NamedNode> for Term {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<Triple> for Term {
    #[inline]
    fn from(triple: Triple) -> Self {
        Self::Triple(Box::new(triple))
    }
}

impl From<Subject> for Term {
    #[inline]
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::NamedNode(n) => Self::NamedNode(n),
            Subject::BlankNode(b) => Self::BlankNode(b),
            Subject::Triple(t) => Self::Triple(t),
        }
    }
}

impl TryFrom<Term> for NamedNode {
    type Error = TermCastError;

    fn try_from(term: Term) -> Result<Self, Self::Error> {
        match term {
            Term::NamedNode(n) => Ok(n),
            _ => Err(TermCastError { expected: "IRI" }),
        }
    }
}

/// The subject position of a [`Triple`]: an IRI, blank node, or quoted
/// triple. Never a literal.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Subject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Triple(Box<Triple>),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(n) => n.fmt(f),
            Self::BlankNode(b) => b.fmt(f),
            Self::Triple(t) => write!(f, "<<( {t} )>>"),
        }
    }
}

impl From<NamedNode> for Subject {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<BlankNode> for Subject {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Triple> for Subject {
    #[inline]
    fn from(triple: Triple) -> Self {
        Self::Triple(Box::new(triple))
    }
}

impl TryFrom<Term> for Subject {
    type Error = TermCastError;

    fn try_from(term: Term) -> Result<Self, Self::Error> {
        match term {
            Term::NamedNode(n) => Ok(Self::NamedNode(n)),
            Term::BlankNode(b) => Ok(Self::BlankNode(b)),
            Term::Triple(t) => Ok(Self::Triple(t)),
            Term::Literal(_) => Err(TermCastError {
                expected: "IRI, blank node, or triple term",
            }),
        }
    }
}

/// An error raised when a [`Term`] cannot be cast to a more specific
/// position (e.g. a [`Literal`] used as a [`Subject`]).
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("expected {expected}")]
pub struct TermCastError {
    expected: &'static str,
}

/// An [RDF triple](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-triple):
/// `(subject, predicate, object)`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: NamedNode,
    pub object: Term,
}

impl Triple {
    #[inline]
    pub fn new(subject: impl Into<Subject>, predicate: NamedNode, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// Places this triple in a named or default graph, producing a [`Quad`].
    #[inline]
    pub fn in_graph(self, graph_name: GraphName) -> Quad {
        Quad {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            graph_name,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// The graph position of a [`Quad`]: the default graph, or a named graph
/// identified by an IRI or blank node.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum GraphName {
    DefaultGraph,
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl GraphName {
    #[inline]
    pub fn is_default_graph(&self) -> bool {
        matches!(self, Self::DefaultGraph)
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultGraph => f.write_str("DEFAULT"),
            Self::NamedNode(n) => n.fmt(f),
            Self::BlankNode(b) => b.fmt(f),
        }
    }
}

impl From<NamedNode> for GraphName {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<BlankNode> for GraphName {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Option<NamedNode>> for GraphName {
    #[inline]
    fn from(node: Option<NamedNode>) -> Self {
        match node {
            Some(node) => Self::NamedNode(node),
            None => Self::DefaultGraph,
        }
    }
}

/// An [RDF quad](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset): a
/// [`Triple`] extended with a graph name.
///
/// This also doubles as the ingestion/emission envelope, `Statement`: a
/// quad whose `graph_name` is [`GraphName::DefaultGraph`] is, by
/// definition, a triple-only statement. [`Quad::to_triple`],
/// [`Quad::to_quad`] (identity), and [`Quad::into_quad_in_graph`] are the
/// total `ToTriple`/`ToQuad`/`ToQuadInGraph` conversions.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Quad {
    pub subject: Subject,
    pub predicate: NamedNode,
    pub object: Term,
    pub graph_name: GraphName,
}

/// The ingestion/emission envelope. An alias for [`Quad`]: the two have
/// the same shape, and `graph_name == GraphName::DefaultGraph` is exactly
/// the "this is a triple" case.
pub type Statement = Quad;

impl Quad {
    #[inline]
    pub fn new(
        subject: impl Into<Subject>,
        predicate: NamedNode,
        object: impl Into<Term>,
        graph_name: impl Into<GraphName>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            graph_name: graph_name.into(),
        }
    }

    /// Drops the graph name, always succeeding (`ToTriple`).
    #[inline]
    pub fn to_triple(&self) -> Triple {
        Triple {
            subject: self.subject.clone(),
            predicate: self.predicate.clone(),
            object: self.object.clone(),
        }
    }

    /// Identity conversion (`ToQuad`): a quad is already a quad.
    #[inline]
    pub fn to_quad(&self) -> Quad {
        self.clone()
    }

    /// Replaces the graph name, always succeeding (`ToQuadInGraph`).
    #[inline]
    pub fn into_quad_in_graph(self, graph_name: impl Into<GraphName>) -> Quad {
        Quad {
            graph_name: graph_name.into(),
            ..self
        }
    }
}

impl From<Triple> for Quad {
    #[inline]
    fn from(triple: Triple) -> Self {
        triple.in_graph(GraphName::DefaultGraph)
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if !self.graph_name.is_default_graph() {
            write!(f, " {}", self.graph_name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn triple_display() {
        let t = Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"));
        assert_eq!(
            t.to_string(),
            "<http://ex/s> <http://ex/p> <http://ex/o>"
        );
    }

    #[test]
    fn quad_in_default_graph_displays_without_graph() {
        let q: Quad = Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o")).into();
        assert!(q.graph_name.is_default_graph());
        assert_eq!(q.to_string(), "<http://ex/s> <http://ex/p> <http://ex/o>");
    }

    #[test]
    fn quad_to_triple_drops_graph() {
        let q = Quad::new(
            iri("http://ex/s"),
            iri("http://ex/p"),
            iri("http://ex/o"),
            iri("http://ex/g"),
        );
        let t = q.to_triple();
        assert_eq!(t.subject, Subject::NamedNode(iri("http://ex/s")));
    }

    #[test]
    fn triple_term_as_subject_and_object() {
        let inner = Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o"));
        let outer = Triple::new(inner.clone(), iri("http://ex/says"), Term::Triple(Box::new(inner)));
        assert_eq!(outer.subject.clone().kind_name(), "triple");
    }

    trait KindName {
        fn kind_name(&self) -> &'static str;
    }

    impl KindName for Subject {
        fn kind_name(&self) -> &'static str {
            match self {
                Subject::NamedNode(_) => "iri",
                Subject::BlankNode(_) => "blank",
                Subject::Triple(_) => "triple",
            }
        }
    }
}
