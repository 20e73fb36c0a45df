//! The Turtle/TriG recursive-descent cursor (spec.md §4.5, C5) — the hard
//! part. Operates over one already-assembled logical statement (see
//! [`crate::accumulator`]) and returns the asserted triple(s) plus any
//! *expansion triples* minted along the way (collections, blank-node
//! property lists, reifiers, annotations).
//!
//! The cursor never emits directly from inside a term-parsing routine: it
//! accumulates expansion triples on `self.expansion` and returns the
//! synthesized head term from the recursive call (spec.md §9).

use rdf_core::{
    BlankNode, BlankNodeFactory, ErrorCode, NamedNode, ParseError, Subject, Term, TermCastError,
    TextPosition, Triple, vocab::rdf, vocab::xsd,
};
use std::collections::HashMap;

/// Resource limits honored by the cursor (spec.md §5, §6). `0` means
/// unlimited.
#[derive(Debug, Default, Clone, Copy)]
pub struct CursorLimits {
    pub max_depth: usize,
    pub max_triples: usize,
}

/// Persistent state carried across statements within one decode: the
/// prefix table, the current base, and the blank-node counter (spec.md
/// §9, "Cursor state": "the blank-node counter is per-decoder scope").
#[derive(Debug, Clone)]
pub struct CursorState {
    pub prefixes: HashMap<String, String>,
    pub base: Option<String>,
    pub blank_nodes: BlankNodeFactory,
    pub limits: CursorLimits,
    /// When `false` (the `unchecked()` fast path), IRIs minted from
    /// resolved references and prefixed names skip re-validation — the
    /// resolver and prefix table are trusted to have already produced a
    /// well-formed IRI.
    pub checked: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            prefixes: HashMap::new(),
            base: None,
            blank_nodes: BlankNodeFactory::new(),
            limits: CursorLimits::default(),
            checked: true,
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The outcome of parsing one logical statement: either a directive (which
/// only mutates [`CursorState`]) or a set of asserted triples.
pub enum StatementOutcome {
    Directive,
    Triples(Vec<Triple>),
}

/// Parses one already-assembled logical Turtle/TriG statement (the text up
/// to, but not including, its terminating `.`, or the bare directive text
/// for the unterminated `PREFIX`/`BASE` forms).
pub fn parse_statement(
    state: &mut CursorState,
    format: &'static str,
    text: &str,
) -> Result<StatementOutcome, ParseError> {
    let mut cursor = Cursor {
        input: text,
        pos: 0,
        state,
        format,
        expansion: Vec::new(),
        depth: 0,
    };
    cursor.skip_ws_and_comments();
    if cursor.at_end() {
        return Ok(StatementOutcome::Directive);
    }
    if let Some(outcome) = cursor.try_parse_directive()? {
        return Ok(outcome);
    }
    let triples = cursor.parse_triples_statement()?;
    Ok(StatementOutcome::Triples(triples))
}

/// Parses a TriG graph-block label (an IRI, prefixed name, or blank node —
/// never a literal, collection, or property list) into a [`GraphName`].
pub fn parse_graph_label(
    state: &mut CursorState,
    format: &'static str,
    text: &str,
) -> Result<rdf_core::GraphName, ParseError> {
    let mut cursor = Cursor {
        input: text,
        pos: 0,
        state,
        format,
        expansion: Vec::new(),
        depth: 0,
    };
    cursor.skip_ws_and_comments();
    let name = match cursor.peek() {
        Some('<') => rdf_core::GraphName::NamedNode(cursor.parse_iri()?),
        Some('_') if cursor.starts_with("_:") => {
            rdf_core::GraphName::BlankNode(cursor.parse_blank_node_label()?)
        }
        Some(_) => rdf_core::GraphName::NamedNode(cursor.parse_prefixed_name()?),
        None => return Err(cursor.error("expected a graph label")),
    };
    cursor.skip_ws_and_comments();
    if !cursor.at_end() {
        return Err(cursor.error("unexpected content after graph label"));
    }
    Ok(name)
}

struct Cursor<'a, 'b> {
    input: &'a str,
    pos: usize,
    state: &'b mut CursorState,
    format: &'static str,
    expansion: Vec<Triple>,
    depth: usize,
}

impl<'a> Cursor<'a, '_> {
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn position(&self) -> TextPosition {
        TextPosition {
            line: 0,
            column: (self.pos + 1) as u64,
            byte_offset: Some(self.pos as u64),
        }
    }

    fn error(&self, cause: impl Into<String>) -> ParseError {
        ParseError::new(ErrorCode::ParseError, self.format, cause)
            .with_position(self.position())
            .with_statement_excerpt(self.input.to_string())
    }

    fn iri_error(&self, cause: impl Into<String>) -> ParseError {
        ParseError::new(ErrorCode::InvalidIri, self.format, cause)
            .with_position(self.position())
            .with_statement_excerpt(self.input.to_string())
    }

    fn resolve(&self, reference: &str) -> Result<NamedNode, ParseError> {
        let base = self.state.base.as_deref().unwrap_or("");
        let resolved =
            rdf_core::resolve_iri(base, reference).map_err(|e| self.iri_error(e.to_string()))?;
        if self.state.checked {
            NamedNode::new(resolved).map_err(|e| self.iri_error(e.to_string()))
        } else {
            Ok(NamedNode::new_unchecked(resolved))
        }
    }

    fn enter_nesting(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.state.limits.max_depth > 0 && self.depth > self.state.limits.max_depth {
            return Err(ParseError::new(
                ErrorCode::DepthExceeded,
                self.format,
                format!("nesting exceeds the configured maximum of {}", self.state.limits.max_depth),
            )
            .with_position(self.position()));
        }
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn push_expansion(&mut self, triple: Triple) -> Result<(), ParseError> {
        self.expansion.push(triple);
        let total = self.expansion.len();
        if self.state.limits.max_triples > 0 && total > self.state.limits.max_triples {
            return Err(ParseError::new(
                ErrorCode::TripleLimitExceeded,
                self.format,
                format!(
                    "more than the configured maximum of {} triples in one statement",
                    self.state.limits.max_triples
                ),
            )
            .with_position(self.position()));
        }
        Ok(())
    }

    fn fresh_blank_node(&mut self) -> BlankNode {
        self.state.blank_nodes.fresh()
    }

    // ---- directives (spec.md §4.5.2) ----

    fn try_parse_directive(&mut self) -> Result<Option<StatementOutcome>, ParseError> {
        if self.consume("@prefix") {
            self.parse_prefix_directive(true)?;
            return Ok(Some(StatementOutcome::Directive));
        }
        if self.consume("@base") {
            self.parse_base_directive(true)?;
            return Ok(Some(StatementOutcome::Directive));
        }
        if self.consume("@version") {
            self.skip_ws_and_comments();
            let _ = self.parse_string_literal_body()?;
            self.skip_ws_and_comments();
            self.expect_dot()?;
            return Ok(Some(StatementOutcome::Directive));
        }
        if self.matches_keyword_ci("PREFIX") {
            self.pos += "PREFIX".len();
            self.parse_prefix_directive(false)?;
            return Ok(Some(StatementOutcome::Directive));
        }
        if self.matches_keyword_ci("BASE") {
            self.pos += "BASE".len();
            self.parse_base_directive(false)?;
            return Ok(Some(StatementOutcome::Directive));
        }
        Ok(None)
    }

    fn matches_keyword_ci(&self, kw: &str) -> bool {
        let rest = self.rest();
        rest.len() >= kw.len()
            && rest[..kw.len()].eq_ignore_ascii_case(kw)
            && rest[kw.len()..]
                .chars()
                .next()
                .is_none_or(is_term_delimiter)
    }

    fn parse_prefix_directive(&mut self, requires_dot: bool) -> Result<(), ParseError> {
        self.skip_ws_and_comments();
        let name = self.parse_prefix_label()?;
        self.skip_ws_and_comments();
        if !self.consume(":") {
            return Err(self.error("expected ':' in @prefix directive"));
        }
        self.skip_ws_and_comments();
        let iri_ref = self.parse_iri_ref_lexeme()?;
        let resolved = self.resolve(&iri_ref)?;
        self.state
            .prefixes
            .insert(name, resolved.into_string());
        self.skip_ws_and_comments();
        if requires_dot {
            self.expect_dot()?;
        }
        Ok(())
    }

    fn parse_base_directive(&mut self, requires_dot: bool) -> Result<(), ParseError> {
        self.skip_ws_and_comments();
        let iri_ref = self.parse_iri_ref_lexeme()?;
        let resolved = self.resolve(&iri_ref)?;
        self.state.base = Some(resolved.into_string());
        self.skip_ws_and_comments();
        if requires_dot {
            self.expect_dot()?;
        }
        Ok(())
    }

    fn parse_prefix_label(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ':' || c.is_whitespace() {
                break;
            }
            self.bump();
        }
        let label = &self.input[start..self.pos];
        if label.starts_with('.') {
            return Err(self.error("prefix label must not start with '.'"));
        }
        if let Some(first) = label.chars().next() {
            if !is_pn_chars_base(first) {
                return Err(self.error("invalid prefix label"));
            }
        }
        Ok(label.to_string())
    }

    fn expect_dot(&mut self) -> Result<(), ParseError> {
        self.skip_ws_and_comments();
        if !self.consume(".") {
            return Err(self.error("expected '.' terminator"));
        }
        Ok(())
    }

    // ---- statement grammar (spec.md §4.5.3) ----

    fn parse_triples_statement(&mut self) -> Result<Vec<Triple>, ParseError> {
        let subject = self.parse_subject_term()?;
        self.skip_ws_and_comments();

        let subject: Subject = subject
            .try_into()
            .map_err(|e: TermCastError| self.error(e.to_string()))?;

        if self.peek_is_statement_end() {
            // Bare blank-node-as-subject statement (spec.md §4.5.3 step 3):
            // only legal when the subject came from a `[...]` property list,
            // which already pushed its triples onto `self.expansion`.
            if matches!(subject, Subject::BlankNode(_)) && !self.expansion.is_empty() {
                return Ok(std::mem::take(&mut self.expansion));
            }
            return Err(self.error("expected a predicate"));
        }

        self.parse_predicate_object_list(&subject)?;
        Ok(std::mem::take(&mut self.expansion))
    }

    fn peek_is_statement_end(&self) -> bool {
        self.rest().trim_start().is_empty()
    }

    fn parse_predicate_object_list(&mut self, subject: &Subject) -> Result<(), ParseError> {
        loop {
            self.skip_ws_and_comments();
            let predicate = self.parse_verb()?;
            self.parse_object_list(subject, &predicate)?;
            self.skip_ws_and_comments();
            while self.consume(";") {
                self.skip_ws_and_comments();
            }
            if self.at_predicate_object_list_end() {
                break;
            }
        }
        Ok(())
    }

    /// True once nothing more than `.`/`]`/`|}` (or end of input) remains —
    /// i.e. a trailing `;` had no following verb (spec.md §4.5.3).
    fn at_predicate_object_list_end(&self) -> bool {
        self.peek_is_statement_end() || self.starts_with("]") || self.starts_with("|}")
    }

    fn parse_verb(&mut self) -> Result<NamedNode, ParseError> {
        if self.starts_with("a") && self.peek_at(1).is_none_or(is_term_delimiter) {
            self.pos += 1;
            return Ok(NamedNode::new_unchecked(rdf::TYPE));
        }
        match self.parse_term(false)? {
            Term::NamedNode(n) => Ok(n),
            _ => Err(self.error("predicate must be an IRI")),
        }
    }

    fn parse_object_list(
        &mut self,
        subject: &Subject,
        predicate: &NamedNode,
    ) -> Result<(), ParseError> {
        loop {
            self.skip_ws_and_comments();
            let object = self.parse_term(true)?;
            let triple = Triple::new(subject.clone(), predicate.clone(), object.clone());
            self.skip_ws_and_comments();
            let reifier = self.parse_optional_reifier()?;
            self.skip_ws_and_comments();
            let explicit_reifier = reifier.is_some();
            if self.starts_with("{|") {
                self.parse_annotation(&triple, reifier, explicit_reifier)?;
            } else if let Some(r) = reifier {
                self.push_expansion(Triple::new(r, NamedNode::new_unchecked(rdf::REIFIES), triple.clone()))?;
            }
            self.push_expansion(triple)?;
            self.skip_ws_and_comments();
            if self.consume(",") {
                continue;
            }
            break;
        }
        Ok(())
    }

    /// `~reifier` after a parenthesized triple term or an object
    /// (spec.md §4.5.4). Returns `None` if no `~` is present.
    fn parse_optional_reifier(&mut self) -> Result<Option<Subject>, ParseError> {
        if !self.consume("~") {
            return Ok(None);
        }
        self.skip_ws_and_comments();
        if self.reifier_is_elidable() {
            return Ok(Some(Subject::BlankNode(self.fresh_blank_node())));
        }
        match self.parse_term(false)? {
            Term::NamedNode(n) => Ok(Some(Subject::NamedNode(n))),
            Term::BlankNode(b) => Ok(Some(Subject::BlankNode(b))),
            _ => Err(self.error("reifier must be an IRI or blank node")),
        }
    }

    fn reifier_is_elidable(&self) -> bool {
        match self.peek() {
            None => true,
            Some(c) => {
                self.starts_with(">>") || matches!(c, '{' | ',' | ';' | '.')
            }
        }
    }

    /// `{| predicate_object_list |}` after an object (spec.md §4.5.5).
    fn parse_annotation(
        &mut self,
        asserted: &Triple,
        reifier: Option<Subject>,
        explicit_reifier: bool,
    ) -> Result<(), ParseError> {
        self.enter_nesting()?;
        let r = match reifier {
            Some(r) => r,
            None => Subject::BlankNode(self.fresh_blank_node()),
        };
        if !explicit_reifier {
            self.push_expansion(Triple::new(
                r.clone(),
                NamedNode::new_unchecked(rdf::REIFIES),
                asserted.clone(),
            ))?;
        }
        self.consume("{|");
        self.skip_ws_and_comments();
        self.parse_predicate_object_list(&r)?;
        self.skip_ws_and_comments();
        if !self.consume("|}") {
            return Err(self.error("expected '|}' to close annotation"));
        }
        self.exit_nesting();
        Ok(())
    }

    // ---- terms (spec.md §4.5.3) ----

    fn parse_subject_term(&mut self) -> Result<Term, ParseError> {
        self.parse_term(false)
    }

    fn parse_term(&mut self, allow_literal: bool) -> Result<Term, ParseError> {
        self.skip_ws_and_comments();
        match self.peek() {
            None => Err(self.error("unexpected end of statement")),
            Some('<') if self.starts_with("<<") => self.parse_triple_term(),
            Some('<') => Ok(Term::NamedNode(self.parse_iri()?)),
            Some('_') if self.starts_with("_:") => Ok(Term::BlankNode(self.parse_blank_node_label()?)),
            Some('[') => self.parse_blank_node_property_list(),
            Some('(') => self.parse_collection(),
            Some('"') | Some('\'') if allow_literal => self.parse_literal(),
            Some('"') | Some('\'') => Err(self.error("a literal cannot appear in this position")),
            Some(c) if allow_literal && (c == '+' || c == '-' || c.is_ascii_digit()) => {
                self.parse_numeric_literal()
            }
            Some('.') if allow_literal && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_numeric_literal()
            }
            Some(_) if allow_literal
                && self.starts_with("true")
                && self.peek_at(4).is_none_or(is_term_delimiter) =>
            {
                self.pos += 4;
                Ok(Term::Literal(rdf_core::Literal::new_typed_literal(
                    "true",
                    NamedNode::new_unchecked(xsd::BOOLEAN),
                )))
            }
            Some(_) if allow_literal
                && self.starts_with("false")
                && self.peek_at(5).is_none_or(is_term_delimiter) =>
            {
                self.pos += 5;
                Ok(Term::Literal(rdf_core::Literal::new_typed_literal(
                    "false",
                    NamedNode::new_unchecked(xsd::BOOLEAN),
                )))
            }
            Some(_) => Ok(Term::NamedNode(self.parse_prefixed_name()?)),
        }
    }

    fn parse_iri(&mut self) -> Result<NamedNode, ParseError> {
        let lexeme = self.parse_iri_ref_lexeme()?;
        self.resolve(&lexeme)
    }

    /// Parses `<...>`, decoding `\uXXXX`/`\UXXXXXXXX` escapes, returning the
    /// raw (unresolved) reference.
    fn parse_iri_ref_lexeme(&mut self) -> Result<String, ParseError> {
        if !self.consume("<") {
            return Err(self.iri_error("expected '<'"));
        }
        let mut raw = String::new();
        loop {
            match self.bump() {
                None => return Err(self.iri_error("unterminated IRI reference")),
                Some('>') => break,
                Some('\\') => match self.bump() {
                    Some('u') | Some('U') => {
                        self.pos -= 1;
                        let esc_start = self.pos - 1;
                        let digits = if self.input.as_bytes().get(esc_start + 1) == Some(&b'u') {
                            4
                        } else {
                            8
                        };
                        self.pos += 1;
                        let hex: String = self.rest().chars().take(digits).collect();
                        if hex.len() != digits {
                            return Err(self.iri_error("truncated unicode escape in IRI"));
                        }
                        self.pos += digits;
                        let cp = u32::from_str_radix(&hex, 16)
                            .map_err(|_| self.iri_error("invalid unicode escape in IRI"))?;
                        let ch = char::from_u32(cp)
                            .ok_or_else(|| self.iri_error("invalid code point in IRI"))?;
                        raw.push(ch);
                    }
                    _ => return Err(self.iri_error("invalid escape in IRI reference")),
                },
                Some(c) if rdf_core::iri_disallowed(c) => {
                    return Err(self.iri_error(format!("disallowed character {c:?} in IRI")));
                }
                Some(c) => raw.push(c),
            }
        }
        Ok(raw)
    }

    fn parse_blank_node_label(&mut self) -> Result<BlankNode, ParseError> {
        self.pos += 2; // "_:"
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_pn_chars(c) || c == '.' {
                self.bump();
            } else {
                break;
            }
        }
        let mut label = &self.input[start..self.pos];
        while label.ends_with('.') {
            label = &label[..label.len() - 1];
            self.pos -= 1;
        }
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        BlankNode::new(label.to_string()).map_err(|e| self.error(e.to_string()))
    }

    fn parse_prefixed_name(&mut self) -> Result<NamedNode, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ':' || is_term_delimiter(c) {
                break;
            }
            self.bump();
        }
        if !self.starts_with(":") {
            return Err(self.error(format!("expected prefixed name, found {:?}", &self.input[start..self.pos])));
        }
        let prefix = self.input[start..self.pos].to_string();
        self.pos += 1; // ':'
        let local = self.parse_pn_local()?;
        let base_iri = self
            .state
            .prefixes
            .get(&prefix)
            .ok_or_else(|| self.error(format!("unknown prefix '{prefix}:'")))?;
        let iri = format!("{base_iri}{local}");
        if self.state.checked {
            NamedNode::new(iri).map_err(|e| self.iri_error(e.to_string()))
        } else {
            Ok(NamedNode::new_unchecked(iri))
        }
    }

    fn parse_pn_local(&mut self) -> Result<String, ParseError> {
        let mut local = String::new();
        let mut first = true;
        loop {
            match self.peek() {
                Some('%') => {
                    let hex: String = self.rest()[1..].chars().take(2).collect();
                    if hex.len() != 2 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                        return Err(self.error("invalid percent-encoding in local name"));
                    }
                    local.push('%');
                    local.push_str(&hex);
                    self.pos += 3;
                }
                Some('\\') if self.peek_at(1).is_some_and(rdf_core::is_pn_local_escape) => {
                    self.bump();
                    local.push(self.bump().expect("checked above"));
                }
                Some(c) if first && (is_pn_chars_u(c) || c == ':' || c.is_ascii_digit()) => {
                    local.push(c);
                    self.bump();
                }
                Some(c) if !first && (is_pn_chars(c) || c == ':' || c == '.') => {
                    local.push(c);
                    self.bump();
                }
                _ => break,
            }
            first = false;
        }
        while local.ends_with('.') {
            local.pop();
            self.pos -= 1;
        }
        Ok(local)
    }

    fn parse_literal(&mut self) -> Result<Term, ParseError> {
        let value = self.parse_string_literal_body()?;
        if self.consume("@") {
            let start = self.pos;
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                self.bump();
            }
            let lang = self.input[start..self.pos].to_string();
            let literal = rdf_core::Literal::new_language_tagged_literal(value, lang)
                .map_err(|e| self.error(e.to_string()))?;
            return Ok(Term::Literal(literal));
        }
        if self.consume("^^") {
            let datatype = match self.parse_term(false)? {
                Term::NamedNode(n) => n,
                _ => return Err(self.error("datatype must be an IRI")),
            };
            return Ok(Term::Literal(rdf_core::Literal::new_typed_literal(value, datatype)));
        }
        Ok(Term::Literal(rdf_core::Literal::new_simple_literal(value)))
    }

    /// Parses the quoted string body (short or long, single or double
    /// quoted), returning the unescaped value.
    fn parse_string_literal_body(&mut self) -> Result<String, ParseError> {
        let quote = self.peek().ok_or_else(|| self.error("expected a string"))?;
        if quote != '"' && quote != '\'' {
            return Err(self.error("expected a string"));
        }
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let delim: String = if long {
            std::iter::repeat_n(quote, 3).collect()
        } else {
            quote.to_string()
        };
        self.pos += delim.len();
        let start = self.pos;
        loop {
            if self.at_end() {
                return Err(self.error("unterminated string literal"));
            }
            if self.consume(&delim) {
                break;
            }
            if self.peek() == Some('\\') {
                self.bump();
                self.bump();
                continue;
            }
            if !long && (self.peek() == Some('\n') || self.peek() == Some('\r')) {
                return Err(self.error("unescaped newline in short string"));
            }
            self.bump();
        }
        let raw = &self.input[start..self.pos - delim.len()];
        rdf_core::unescape_string(raw).map_err(|e| self.error(e.to_string()))
    }

    fn parse_numeric_literal(&mut self) -> Result<Term, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let mut is_decimal = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_decimal = true;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let mut is_double = false;
        if matches!(self.peek(), Some('e') | Some('E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                is_double = true;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                self.pos = save;
            }
        }
        let lexeme = &self.input[start..self.pos];
        if lexeme.is_empty() || lexeme == "+" || lexeme == "-" {
            return Err(self.error("invalid numeric literal"));
        }
        let datatype = if is_double {
            xsd::DOUBLE
        } else if is_decimal {
            xsd::DECIMAL
        } else {
            xsd::INTEGER
        };
        Ok(Term::Literal(rdf_core::Literal::new_typed_literal(
            lexeme.to_string(),
            NamedNode::new_unchecked(datatype),
        )))
    }

    /// `<< S P O >>` bare form, or `<<( S P O )>>` parenthesized form with
    /// an optional `~reifier` (spec.md §4.5.4).
    fn parse_triple_term(&mut self) -> Result<Term, ParseError> {
        self.enter_nesting()?;
        self.pos += 2; // "<<"
        self.skip_ws_and_comments();
        let parenthesized = self.consume("(");
        self.skip_ws_and_comments();
        let subject: Subject = self
            .parse_term(false)?
            .try_into()
            .map_err(|e: TermCastError| self.error(e.to_string()))?;
        self.skip_ws_and_comments();
        let predicate = match self.parse_term(false)? {
            Term::NamedNode(n) => n,
            _ => return Err(self.error("quoted triple predicate must be an IRI")),
        };
        self.skip_ws_and_comments();
        let object = self.parse_term(true)?;
        self.skip_ws_and_comments();
        let triple = Triple::new(subject, predicate, object);
        if parenthesized {
            if !self.consume(")") {
                return Err(self.error("expected ')' to close parenthesized quoted triple"));
            }
            self.skip_ws_and_comments();
            if let Some(reifier) = self.parse_optional_reifier()? {
                self.push_expansion(Triple::new(
                    reifier,
                    NamedNode::new_unchecked(rdf::REIFIES),
                    triple.clone(),
                ))?;
            }
            self.skip_ws_and_comments();
        }
        if !self.consume(">>") {
            return Err(self.error("expected '>>' to close quoted triple"));
        }
        self.exit_nesting();
        Ok(Term::Triple(Box::new(triple)))
    }

    /// `( o1 o2 ... on )` collection, expanded to an rdf:first/rdf:rest
    /// chain terminated by `rdf:nil` (spec.md §4.5.6). Empty `()` is
    /// `rdf:nil` itself.
    fn parse_collection(&mut self) -> Result<Term, ParseError> {
        self.enter_nesting()?;
        self.pos += 1; // '('
        self.skip_ws_and_comments();
        let mut items = Vec::new();
        while !self.consume(")") {
            if self.at_end() {
                return Err(self.error("unterminated collection"));
            }
            items.push(self.parse_term(true)?);
            self.skip_ws_and_comments();
        }
        self.exit_nesting();
        if items.is_empty() {
            return Ok(Term::NamedNode(NamedNode::new_unchecked(rdf::NIL)));
        }
        let mut nodes = Vec::with_capacity(items.len());
        for _ in &items {
            nodes.push(self.fresh_blank_node());
        }
        for (i, item) in items.into_iter().enumerate() {
            let node = nodes[i].clone();
            self.push_expansion(Triple::new(
                node.clone(),
                NamedNode::new_unchecked(rdf::FIRST),
                item,
            ))?;
            let rest = if i + 1 < nodes.len() {
                Term::BlankNode(nodes[i + 1].clone())
            } else {
                Term::NamedNode(NamedNode::new_unchecked(rdf::NIL))
            };
            self.push_expansion(Triple::new(node, NamedNode::new_unchecked(rdf::REST), rest))?;
        }
        Ok(Term::BlankNode(nodes[0].clone()))
    }

    /// `[ p1 o1 ; p2 o2, o3 ]` blank-node property list (spec.md §4.5.7).
    /// Empty `[]` mints a blank node with no emissions.
    fn parse_blank_node_property_list(&mut self) -> Result<Term, ParseError> {
        self.enter_nesting()?;
        self.pos += 1; // '['
        self.skip_ws_and_comments();
        let node = self.fresh_blank_node();
        if self.consume("]") {
            self.exit_nesting();
            return Ok(Term::BlankNode(node));
        }
        let subject = Subject::BlankNode(node.clone());
        self.parse_predicate_object_list(&subject)?;
        self.skip_ws_and_comments();
        if !self.consume("]") {
            return Err(self.error("expected ']' to close blank-node property list"));
        }
        self.exit_nesting();
        Ok(Term::BlankNode(node))
    }
}

fn is_term_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | ';' | '[' | ']' | '(' | ')' | '{' | '}' | '<' | '#')
}

fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || c == '-'
        || c.is_ascii_digit()
        || c == '\u{00B7}'
        || ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{203F}'..='\u{2040}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples_of(input: &str) -> Vec<Triple> {
        let mut state = CursorState::new();
        state
            .prefixes
            .insert(String::new(), "http://ex/".to_string());
        match parse_statement(&mut state, "turtle", input).unwrap() {
            StatementOutcome::Triples(t) => t,
            StatementOutcome::Directive => Vec::new(),
        }
    }

    #[test]
    fn simple_triple() {
        let t = triples_of(":s :p :o");
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].to_string(), "<http://ex/s> <http://ex/p> <http://ex/o>");
    }

    #[test]
    fn collection_expands_to_first_rest_chain() {
        let t = triples_of(":s :p ( :a :b )");
        // 1 asserted + 2*2 expansion triples
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn blank_node_property_list_mints_and_links() {
        let t = triples_of(":s :p [ :q :r ]");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn annotation_mints_reifier_and_attaches_triples() {
        let t = triples_of(":s :p :o {| :certainty 0.9 |}");
        assert_eq!(t.len(), 3);
        assert!(t.iter().any(|tr| tr.predicate.as_str() == rdf::REIFIES));
    }

    #[test]
    fn prefix_directive_is_not_a_triple() {
        let mut state = CursorState::new();
        let outcome = parse_statement(&mut state, "turtle", "@prefix ex: <http://ex/>").unwrap();
        assert!(matches!(outcome, StatementOutcome::Directive));
        assert_eq!(state.prefixes.get("ex").unwrap(), "http://ex/");
    }

    #[test]
    fn numeric_literals_get_correct_datatype() {
        let t = triples_of(":s :p 42");
        assert_eq!(t[0].object.to_string(), "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>");
        let t = triples_of(":s :p 4.2");
        assert_eq!(t[0].object.to_string(), "\"4.2\"^^<http://www.w3.org/2001/XMLSchema#decimal>");
        let t = triples_of(":s :p 4.2e1");
        assert_eq!(t[0].object.to_string(), "\"4.2e1\"^^<http://www.w3.org/2001/XMLSchema#double>");
    }
}
