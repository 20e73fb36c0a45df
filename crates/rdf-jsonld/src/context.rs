//! JSON-LD context resolution (spec.md §4.8): a context is a mapping from
//! compact-IRI prefixes and bare terms to absolute IRIs, plus an optional
//! `@vocab` and `@base`. Array contexts are merged left-to-right; remote
//! string contexts are delegated to an optional [`JsonLdDocumentLoader`]
//! and silently ignored when none is configured.

use rdf_core::{ErrorCode, ParseError};
use serde_json::Value;
use std::collections::HashMap;

const FORMAT: &str = "jsonld";

/// Fetches the content of a remote JSON-LD context referenced by IRI.
///
/// Without a configured loader, string-valued `@context` entries are a
/// no-op (spec.md §4.8: "absent loader, string contexts are ignored").
pub trait JsonLdDocumentLoader {
    fn load_context(&self, iri: &str) -> Result<Value, ParseError>;
}

/// A context whose remote-context entries are always ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDocumentLoader;

impl JsonLdDocumentLoader for NoopDocumentLoader {
    fn load_context(&self, _iri: &str) -> Result<Value, ParseError> {
        Ok(Value::Null)
    }
}

/// The active context during node expansion: term/prefix mappings plus
/// `@vocab`/`@base`. Cloned and extended at each node boundary so that a
/// nested `@context` only affects its own subtree (spec.md §4.8: "Merge
/// `node["@context"]` into `ctx`").
#[derive(Debug, Default, Clone)]
pub struct JsonLdContext {
    pub mappings: HashMap<String, String>,
    pub vocab: Option<String>,
    pub base: Option<String>,
}

impl JsonLdContext {
    pub fn with_base(base: Option<String>) -> Self {
        Self {
            mappings: HashMap::new(),
            vocab: None,
            base,
        }
    }

    /// Merges `value` (an `@context` value: object, array, string, or
    /// `null`) into this context, recursing into array elements
    /// left-to-right.
    pub fn merge(
        &mut self,
        value: &Value,
        loader: Option<&dyn JsonLdDocumentLoader>,
        depth: usize,
    ) -> Result<(), ParseError> {
        if depth > 8 {
            return Err(ParseError::new(
                ErrorCode::DepthExceeded,
                FORMAT,
                "context nesting exceeds the configured maximum depth",
            ));
        }
        match value {
            Value::Null => {
                self.mappings.clear();
                self.vocab = None;
            }
            Value::Array(items) => {
                for item in items {
                    self.merge(item, loader, depth + 1)?;
                }
            }
            Value::String(iri) => {
                if let Some(loader) = loader {
                    let remote = loader.load_context(iri)?;
                    let remote_context = remote.get("@context").cloned().unwrap_or(remote);
                    self.merge(&remote_context, Some(loader), depth + 1)?;
                }
                // No loader configured: remote contexts are a no-op.
            }
            Value::Object(map) => {
                for (key, entry) in map {
                    match key.as_str() {
                        "@vocab" => {
                            self.vocab = entry.as_str().map(ToOwned::to_owned);
                        }
                        "@base" => {
                            self.base = entry.as_str().map(ToOwned::to_owned);
                        }
                        "@language" | "@direction" | "@version" | "@protected" => {
                            // Accepted, informational only in this minimal processor.
                        }
                        _ if key.starts_with('@') => {}
                        _ => {
                            if let Some(iri) = term_mapping_iri(entry) {
                                self.mappings.insert(key.clone(), iri);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Expands a compact IRI, bare term, or already-absolute IRI string
    /// into an absolute IRI, per spec.md §4.8's predicate-expansion rule:
    /// prefix substitution when a known prefix matches, a direct term
    /// mapping for colon-free keys, `@vocab` prefixing as a fallback for
    /// colon-free keys, and otherwise the value unchanged (already
    /// absolute, or left for the caller to reject).
    pub fn expand(&self, value: &str) -> String {
        if let Some((prefix, local)) = value.split_once(':') {
            if let Some(base) = self.mappings.get(prefix) {
                return format!("{base}{local}");
            }
        }
        if let Some(full) = self.mappings.get(value) {
            return full.clone();
        }
        if !value.contains(':') {
            if let Some(vocab) = &self.vocab {
                return format!("{vocab}{value}");
            }
        }
        value.to_string()
    }

    /// [`Self::expand`] followed by base-IRI resolution (RFC 3986 §5) when
    /// the expanded value has no scheme of its own, used for `@id` values
    /// which are commonly relative references.
    pub fn expand_reference(&self, value: &str) -> Result<String, ParseError> {
        let expanded = self.expand(value);
        if looks_absolute(&expanded) {
            return Ok(expanded);
        }
        match &self.base {
            Some(base) => rdf_core::resolve_iri(base, &expanded).map_err(|e| {
                ParseError::new(ErrorCode::InvalidIri, FORMAT, e.to_string())
            }),
            None => Ok(expanded),
        }
    }
}

fn looks_absolute(iri: &str) -> bool {
    iri.split_once(':')
        .is_some_and(|(scheme, _)| scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) && !scheme.is_empty())
}

/// Extracts the IRI a context term maps to: either a bare string, or an
/// object carrying `@id`.
fn term_mapping_iri(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("@id").and_then(Value::as_str).map(ToOwned::to_owned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merges_prefix_mapping() {
        let mut ctx = JsonLdContext::default();
        ctx.merge(&json!({"ex": "http://ex/"}), None, 0).unwrap();
        assert_eq!(ctx.expand("ex:s"), "http://ex/s");
    }

    #[test]
    fn merges_array_contexts_left_to_right() {
        let mut ctx = JsonLdContext::default();
        ctx.merge(&json!([{"ex": "http://ex/"}, {"ex2": "http://ex2/"}]), None, 0)
            .unwrap();
        assert_eq!(ctx.expand("ex:s"), "http://ex/s");
        assert_eq!(ctx.expand("ex2:s"), "http://ex2/s");
    }

    #[test]
    fn vocab_prefixes_bare_terms() {
        let mut ctx = JsonLdContext::default();
        ctx.merge(&json!({"@vocab": "http://ex/"}), None, 0).unwrap();
        assert_eq!(ctx.expand("name"), "http://ex/name");
    }

    #[test]
    fn direct_term_mapping_without_colon() {
        let mut ctx = JsonLdContext::default();
        ctx.merge(&json!({"name": "http://schema.org/name"}), None, 0)
            .unwrap();
        assert_eq!(ctx.expand("name"), "http://schema.org/name");
    }

    #[test]
    fn leaves_unknown_value_unchanged() {
        let ctx = JsonLdContext::default();
        assert_eq!(ctx.expand("http://ex/already-absolute"), "http://ex/already-absolute");
    }

    #[test]
    fn remote_string_context_is_noop_without_loader() {
        let mut ctx = JsonLdContext::default();
        ctx.merge(&json!("http://ex/remote-context.jsonld"), None, 0).unwrap();
        assert!(ctx.mappings.is_empty());
    }

    #[test]
    fn expand_reference_resolves_against_base() {
        let ctx = JsonLdContext::with_base(Some("http://ex/".to_string()));
        assert_eq!(ctx.expand_reference("a").unwrap(), "http://ex/a");
    }
}
