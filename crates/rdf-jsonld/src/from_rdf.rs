//! Lowers [`Quad`]s back into a JSON-LD document (the inverse of
//! [`crate::to_rdf`]): quads are grouped by graph, then by subject, into
//! node objects; `rdf:JSON` literals are re-parsed into native JSON values
//! rather than re-emitted as their canonical lexical string (spec.md
//! §4.8.2).

use rdf_core::vocab::{rdf, xsd};
use rdf_core::{GraphName, Literal, Quad, Subject, Term};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Writes [`Quad`]s as a JSON-LD document: an array of node objects for the
/// default graph, each carrying a nested `@graph` array for any quads
/// asserted into a named graph sharing that node's `@id`.
#[derive(Debug, Default, Clone)]
pub struct JsonLdSerializer {
    use_native_types: bool,
}

impl JsonLdSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits JSON `number`/`boolean` values for `xsd:decimal`/`xsd:boolean`
    /// typed literals instead of `@value`/`@type` objects.
    #[must_use]
    pub fn with_native_types(mut self, use_native_types: bool) -> Self {
        self.use_native_types = use_native_types;
        self
    }

    pub fn serialize_to_value(&self, quads: &[Quad]) -> Value {
        let mut graph_order: Vec<&GraphName> = Vec::new();
        let mut by_graph: HashMap<&GraphName, Vec<&Quad>> = HashMap::new();
        for quad in quads {
            by_graph
                .entry(&quad.graph_name)
                .or_insert_with(|| {
                    graph_order.push(&quad.graph_name);
                    Vec::new()
                })
                .push(quad);
        }

        let default_graph = GraphName::DefaultGraph;
        let default_triples = by_graph.remove(&default_graph).unwrap_or_default();
        let mut node_order: Vec<String> = Vec::new();
        let mut nodes: HashMap<String, Value> = HashMap::new();
        self.group_nodes(&default_triples, &mut node_order, &mut nodes);

        for graph_name in graph_order {
            if graph_name.is_default_graph() {
                continue;
            }
            let graph_id = match graph_name {
                GraphName::NamedNode(n) => n.as_str().to_string(),
                GraphName::BlankNode(b) => b.to_string(),
                GraphName::DefaultGraph => unreachable!("skipped above"),
            };
            let mut graph_node_order: Vec<String> = Vec::new();
            let mut graph_nodes: HashMap<String, Value> = HashMap::new();
            self.group_nodes(by_graph.get(graph_name).expect("graph present"), &mut graph_node_order, &mut graph_nodes);

            if !nodes.contains_key(&graph_id) {
                node_order.push(graph_id.clone());
                nodes.insert(graph_id.clone(), named_node_stub(&graph_id));
            }
            let entry = nodes.get_mut(&graph_id).expect("just inserted or already present");
            entry
                .as_object_mut()
                .expect("node entries are always objects")
                .insert(
                    "@graph".to_string(),
                    Value::Array(graph_node_order.into_iter().map(|id| graph_nodes.remove(&id).unwrap()).collect()),
                );
        }

        Value::Array(node_order.into_iter().map(|id| nodes.remove(&id).unwrap()).collect())
    }

    /// Groups `quads` by subject into node objects, appending new subjects
    /// to `order` in first-seen order.
    fn group_nodes(&self, quads: &[&Quad], order: &mut Vec<String>, nodes: &mut HashMap<String, Value>) {
        for quad in quads {
            let subject_id = subject_key(&quad.subject);
            if !nodes.contains_key(&subject_id) {
                order.push(subject_id.clone());
                nodes.insert(subject_id.clone(), named_node_stub(&subject_id));
            }
            let node = nodes
                .get_mut(&subject_id)
                .expect("just inserted or already present")
                .as_object_mut()
                .expect("node entries are always objects");

            if quad.predicate.as_str() == rdf::TYPE {
                if let Term::NamedNode(type_iri) = &quad.object {
                    push_array_entry(node, "@type", Value::String(type_iri.as_str().to_string()));
                    continue;
                }
            }
            let value = self.term_to_value(&quad.object);
            push_array_entry(node, quad.predicate.as_str(), value);
        }
    }

    fn term_to_value(&self, term: &Term) -> Value {
        match term {
            Term::NamedNode(n) => node_reference(n.as_str()),
            Term::BlankNode(b) => node_reference(&b.to_string()),
            Term::Literal(l) => self.literal_to_value(l),
            Term::Triple(_) => Value::Null,
        }
    }

    fn literal_to_value(&self, literal: &Literal) -> Value {
        if let Some(lang) = literal.language() {
            let mut obj = Map::new();
            obj.insert("@value".to_string(), Value::String(literal.value().to_string()));
            obj.insert("@language".to_string(), Value::String(lang.to_string()));
            return Value::Object(obj);
        }
        let datatype = literal.datatype();
        if datatype == rdf::JSON {
            if let Ok(native) = serde_json::from_str::<Value>(literal.value()) {
                let mut obj = Map::new();
                obj.insert("@value".to_string(), native);
                obj.insert("@type".to_string(), Value::String("@json".to_string()));
                return Value::Object(obj);
            }
        }
        if self.use_native_types {
            if datatype == xsd::BOOLEAN {
                if let Ok(b) = literal.value().parse::<bool>() {
                    return Value::Bool(b);
                }
            }
            if matches!(datatype, xsd::DECIMAL | xsd::INTEGER | xsd::DOUBLE) {
                if let Ok(n) = literal.value().parse::<f64>() {
                    if let Some(number) = serde_json::Number::from_f64(n) {
                        return Value::Number(number);
                    }
                }
            }
        }
        if literal.is_plain() {
            return Value::String(literal.value().to_string());
        }
        let mut obj = Map::new();
        obj.insert("@value".to_string(), Value::String(literal.value().to_string()));
        obj.insert("@type".to_string(), Value::String(datatype.to_string()));
        Value::Object(obj)
    }
}

fn subject_key(subject: &Subject) -> String {
    match subject {
        Subject::NamedNode(n) => n.as_str().to_string(),
        Subject::BlankNode(b) => b.to_string(),
        Subject::Triple(t) => t.to_string(),
    }
}

fn named_node_stub(id: &str) -> Value {
    let mut obj = Map::new();
    obj.insert("@id".to_string(), Value::String(id.to_string()));
    Value::Object(obj)
}

fn node_reference(id: &str) -> Value {
    named_node_stub(id)
}

fn push_array_entry(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            node.insert(key.to_string(), Value::Array(vec![value]));
        }
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
    fn groups_default_graph_triples_into_one_node() {
        let quads = vec![
            Quad::new(iri("http://ex/s"), iri("http://ex/p1"), iri("http://ex/o1"), GraphName::DefaultGraph),
            Quad::new(iri("http://ex/s"), iri("http://ex/p2"), iri("http://ex/o2"), GraphName::DefaultGraph),
        ];
        let doc = JsonLdSerializer::new().serialize_to_value(&quads);
        let nodes = doc.as_array().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["@id"], "http://ex/s");
    }

    #[test]
    fn named_graph_nests_under_graph_key() {
        let quads = vec![Quad::new(
            iri("http://ex/s"),
            iri("http://ex/p"),
            iri("http://ex/o"),
            iri("http://ex/g"),
        )];
        let doc = JsonLdSerializer::new().serialize_to_value(&quads);
        let nodes = doc.as_array().unwrap();
        let graph_node = nodes.iter().find(|n| n["@id"] == "http://ex/g").unwrap();
        assert!(graph_node["@graph"].is_array());
    }

    #[test]
    fn rdf_type_predicate_becomes_type_keyword() {
        let quads = vec![Quad::new(
            iri("http://ex/s"),
            iri(rdf::TYPE),
            iri("http://ex/Thing"),
            GraphName::DefaultGraph,
        )];
        let doc = JsonLdSerializer::new().serialize_to_value(&quads);
        let node = &doc.as_array().unwrap()[0];
        assert_eq!(node["@type"][0], "http://ex/Thing");
    }

    #[test]
    fn json_literal_is_reparsed_to_native_json() {
        let literal = Literal::new_typed_literal(r#"{"a":1}"#, iri(rdf::JSON));
        let quads = vec![Quad::new(
            iri("http://ex/s"),
            iri("http://ex/p"),
            literal,
            GraphName::DefaultGraph,
        )];
        let doc = JsonLdSerializer::new().serialize_to_value(&quads);
        let node = &doc.as_array().unwrap()[0];
        assert_eq!(node["http://ex/p"][0]["@value"]["a"], 1);
    }

    #[test]
    fn plain_literal_is_a_bare_string() {
        let literal = Literal::new_simple_literal("hello");
        let quads = vec![Quad::new(
            iri("http://ex/s"),
            iri("http://ex/p"),
            literal,
            GraphName::DefaultGraph,
        )];
        let doc = JsonLdSerializer::new().serialize_to_value(&quads);
        let node = &doc.as_array().unwrap()[0];
        assert_eq!(node["http://ex/p"][0], "hello");
    }
}
