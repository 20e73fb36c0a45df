//! Lexical utilities shared by every concrete syntax engine:
//! escape decode/encode, language-tag validation, IRI reference resolution,
//! prefixed-name local-part validation, and the disallowed-IRI-character
//! predicate.

use std::fmt;

/// Decodes `\n \t \r \b \f \" \' \\ \/`, `\uXXXX`, and `\UXXXXXXXX` escapes
/// in a Turtle/N-Triples string body. Surrogate pairs (`\uD800`-`\uDBFF`
/// followed by `\uDC00`-`\uDFFF`) are combined into one scalar value; an
/// isolated surrogate half is an error.
pub fn unescape_string(s: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next().ok_or(UnescapeError::TruncatedEscape)?;
        match escape {
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'u' => {
                let cp = read_hex_escape(&mut chars, 4)?;
                out.push(decode_code_point(cp, &mut chars)?);
            }
            'U' => {
                let cp = read_hex_escape(&mut chars, 8)?;
                out.push(decode_code_point(cp, &mut chars)?);
            }
            other => return Err(UnescapeError::UnknownEscape(other)),
        }
    }
    Ok(out)
}

fn read_hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
) -> Result<u32, UnescapeError> {
    let mut value = 0u32;
    for _ in 0..digits {
        let c = chars.next().ok_or(UnescapeError::TruncatedEscape)?;
        let digit = c.to_digit(16).ok_or(UnescapeError::InvalidHexDigit(c))?;
        value = value * 16 + digit;
    }
    Ok(value)
}

fn decode_code_point(
    cp: u32,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<char, UnescapeError> {
    if (0xD800..=0xDBFF).contains(&cp) {
        // High surrogate: must be followed by \uDCxx-\uDFxx.
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            let low = read_hex_escape(&mut lookahead, 4)?;
            if (0xDC00..=0xDFFF).contains(&low) {
                *chars = lookahead;
                let combined = 0x10000 + ((cp - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined).ok_or(UnescapeError::InvalidCodePoint(combined));
            }
        }
        return Err(UnescapeError::IsolatedSurrogate(cp));
    }
    if (0xDC00..=0xDFFF).contains(&cp) {
        return Err(UnescapeError::IsolatedSurrogate(cp));
    }
    char::from_u32(cp).ok_or(UnescapeError::InvalidCodePoint(cp))
}

/// Errors from [`unescape_string`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum UnescapeError {
    #[error("string ends with an incomplete escape sequence")]
    TruncatedEscape,
    #[error("'{0}' is not a valid hexadecimal digit")]
    InvalidHexDigit(char),
    #[error("'\\{0}' is not a recognized escape sequence")]
    UnknownEscape(char),
    #[error("U+{0:04X} is an isolated UTF-16 surrogate")]
    IsolatedSurrogate(u32),
    #[error("U+{0:04X} is not a valid Unicode scalar value")]
    InvalidCodePoint(u32),
}

/// Writes `value` with N-Triples/Turtle string escaping (`\\ \" \n \r \t`)
/// applied; used by every serializer.
pub fn write_escaped_string(value: &str, f: &mut impl fmt::Write) -> fmt::Result {
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Writes `iri` with backslash escaping of control characters, for use
/// inside a N-Triples/Turtle `<...>` IRIREF.
pub fn write_escaped_iri(iri: &str, f: &mut impl fmt::Write) -> fmt::Result {
    for c in iri.chars() {
        match c {
            '\u{0}'..='\u{20}' => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Characters disallowed inside an IRIREF: controls `U+0000-U+0020`,
/// `U+007F-U+009F`, and the reserved delimiters
/// `<>"{}|^` `` ` `` `\`.
#[inline]
pub fn iri_disallowed(cp: char) -> bool {
    matches!(cp,
        '\u{0}'..='\u{20}'
        | '\u{7F}'..='\u{9F}'
        | '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'
    )
}

/// The 20-character `PN_LOCAL` escape set of the Turtle grammar: the
/// characters that may follow a `\` inside a prefixed-name local part.
#[inline]
pub fn is_pn_local_escape(c: char) -> bool {
    matches!(
        c,
        '_' | '~'
            | '.'
            | '-'
            | '!'
            | '$'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | ';'
            | '='
            | '/'
            | '?'
            | '#'
            | '@'
            | '%'
    )
}

/// Validates a BCP-47-ish language tag against the simplified grammar
/// `[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*`.
pub fn is_valid_lang_tag(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut subtags = s.split('-');
    let Some(primary) = subtags.next() else {
        return false;
    };
    if !is_alpha_subtag(primary, 1, 8) {
        return false;
    }
    for subtag in subtags {
        if !is_alphanumeric_subtag(subtag, 1, 8) {
            return false;
        }
    }
    true
}

fn is_alpha_subtag(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    (min..=max).contains(&len) && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_alphanumeric_subtag(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    (min..=max).contains(&len) && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Resolves a (possibly relative) IRI reference against `base` per RFC 3986
/// §5. Handles bare `#frag`, bare `?query`, scheme-only bases, and bases
/// ending in `/`.
pub fn resolve_iri(base: &str, reference: &str) -> Result<String, IriResolutionError> {
    if let Some(scheme_rest) = split_scheme(reference) {
        // Already an absolute IRI; still remove-dot-segments its path for
        // round-trip stability (parsers still accept non-normalized input).
        let (scheme, rest) = scheme_rest;
        let (authority, path, query, fragment) = split_hier_part(rest);
        let path = remove_dot_segments(path);
        return Ok(recompose(Some(scheme), authority, &path, query, fragment));
    }
    let Some((base_scheme, base_rest)) = split_scheme(base) else {
        return Err(IriResolutionError::BaseNotAbsolute);
    };
    let (base_authority, base_path, _base_query, _base_fragment) = split_hier_part(base_rest);

    if reference.starts_with("//") {
        let (authority, path, query, fragment) = split_hier_part(reference);
        let path = remove_dot_segments(path);
        return Ok(recompose(
            Some(base_scheme),
            authority,
            &path,
            query,
            fragment,
        ));
    }
    if let Some(fragment) = reference.strip_prefix('#') {
        return Ok(format!(
            "{}{}",
            recompose(Some(base_scheme), base_authority, base_path, None, None),
            format_args!("#{fragment}")
        ));
    }
    if let Some(rest) = reference.strip_prefix('?') {
        let (path_part, fragment) = split_once_fragment(rest);
        let (query, fragment) = (Some(path_part), fragment);
        return Ok(recompose(
            Some(base_scheme),
            base_authority,
            base_path,
            query,
            fragment,
        ));
    }
    if reference.is_empty() {
        return Ok(recompose(
            Some(base_scheme),
            base_authority,
            base_path,
            None,
            None,
        ));
    }
    let (ref_path, query, fragment) = split_path_query_fragment(reference);
    let merged_path = if ref_path.starts_with('/') {
        ref_path.to_owned()
    } else {
        merge_paths(base_authority, base_path, ref_path)
    };
    let merged_path = remove_dot_segments(&merged_path);
    Ok(recompose(
        Some(base_scheme),
        base_authority,
        &merged_path,
        query,
        fragment,
    ))
}

/// Errors from [`resolve_iri`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum IriResolutionError {
    #[error("the base IRI has no scheme and is not absolute")]
    BaseNotAbsolute,
}

fn split_scheme(iri: &str) -> Option<(&str, &str)> {
    let colon = iri.find(':')?;
    let (scheme, rest) = iri.split_at(colon);
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return None;
    }
    Some((scheme, &rest[1..]))
}

fn split_hier_part(rest: &str) -> (Option<&str>, &str, Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = split_once_fragment(rest);
    let (before_query, query) = split_once_char(before_fragment, '?');
    if let Some(authority_and_path) = before_query.strip_prefix("//") {
        let path_start = authority_and_path
            .find('/')
            .unwrap_or(authority_and_path.len());
        let (authority, path) = authority_and_path.split_at(path_start);
        (Some(authority), path, query, fragment)
    } else {
        (None, before_query, query, fragment)
    }
}

fn split_once_fragment(s: &str) -> (&str, Option<&str>) {
    split_once_char(s, '#')
}

fn split_once_char(s: &str, needle: char) -> (&str, Option<&str>) {
    match s.find(needle) {
        Some(idx) => (&s[..idx], Some(&s[idx + needle.len_utf8()..])),
        None => (s, None),
    }
}

fn split_path_query_fragment(s: &str) -> (&str, Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = split_once_fragment(s);
    let (path, query) = split_once_char(before_fragment, '?');
    (path, query, fragment)
}

fn merge_paths(base_authority: Option<&str>, base_path: &str, ref_path: &str) -> String {
    if base_authority.is_some() && base_path.is_empty() {
        return format!("/{ref_path}");
    }
    match base_path.rfind('/') {
        Some(idx) => format!("{}{}", &base_path[..=idx], ref_path),
        None => ref_path.to_owned(),
    }
}

/// Implements RFC 3986 §5.2.4 `remove_dot_segments`.
fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::new();
    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..]; // keeps the second '/' as the new leading slash
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            remove_last_segment(&mut output);
            input = &input[3..]; // keeps the second '/' as the new leading slash
        } else if input == "/.." {
            remove_last_segment(&mut output);
            input = "/";
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let (segment, rest) = take_one_segment(input);
            output.push_str(segment);
            input = rest;
        }
    }
    output
}

fn remove_last_segment(output: &mut String) {
    if let Some(idx) = output.rfind('/') {
        output.truncate(idx);
    } else {
        output.clear();
    }
}

fn take_one_segment(input: &str) -> (&str, &str) {
    if let Some(stripped) = input.strip_prefix('/') {
        match stripped.find('/') {
            Some(idx) => input.split_at(idx + 2),
            None => (input, ""),
        }
    } else {
        match input.find('/') {
            Some(idx) => input.split_at(idx),
            None => (input, ""),
        }
    }
}

fn recompose(
    scheme: Option<&str>,
    authority: Option<&str>,
    path: &str,
    query: Option<&str>,
    fragment: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(scheme) = scheme {
        out.push_str(scheme);
        out.push(':');
    }
    if let Some(authority) = authority {
        out.push_str("//");
        out.push_str(authority);
    }
    out.push_str(path);
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Canonicalizes `/./`, `/../`, trailing `/.`/`/..`, adjacent `//`
/// (authority-relative only), and a trailing `/` immediately before a
/// fragment. Applied to IRIs produced by the JSON-LD lowering for
/// round-trip stability.
pub fn normalize_iri_path(iri: &str) -> String {
    let Some((scheme, rest)) = split_scheme(iri) else {
        return iri.to_owned();
    };
    let (authority, path, query, fragment) = split_hier_part(rest);
    let mut path = remove_dot_segments(path);
    if fragment.is_some() && path.ends_with('/') && path.len() > 1 {
        path.pop();
    }
    recompose(Some(scheme), authority, &path, query, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_handles_all_simple_escapes() {
        assert_eq!(
            unescape_string(r#"\t\b\n\r\f\"\'\\\/"#).unwrap(),
            "\t\u{8}\n\r\u{c}\"\'\\/"
        );
    }

    #[test]
    fn unescape_handles_bmp_codepoint() {
        assert_eq!(unescape_string(r"é").unwrap(), "\u{e9}");
    }

    #[test]
    fn unescape_combines_surrogate_pair() {
        // U+1F600 GRINNING FACE
        assert_eq!(unescape_string(r"😀").unwrap(), "\u{1F600}");
    }

    #[test]
    fn unescape_rejects_isolated_surrogate() {
        unescape_string(r"\uD800").unwrap_err();
    }

    #[test]
    fn lang_tag_validation() {
        assert!(is_valid_lang_tag("en"));
        assert!(is_valid_lang_tag("en-GB"));
        assert!(is_valid_lang_tag("zh-Hans-CN"));
        assert!(!is_valid_lang_tag(""));
        assert!(!is_valid_lang_tag("toolongsubtag-x"));
        assert!(!is_valid_lang_tag("en-"));
    }

    #[test]
    fn resolve_relative_against_directory_base() {
        assert_eq!(
            resolve_iri("http://example.org/a/b/", "c").unwrap(),
            "http://example.org/a/b/c"
        );
    }

    #[test]
    fn resolve_bare_fragment() {
        assert_eq!(
            resolve_iri("http://example.org/a/b", "#frag").unwrap(),
            "http://example.org/a/b#frag"
        );
    }

    #[test]
    fn resolve_bare_query() {
        assert_eq!(
            resolve_iri("http://example.org/a/b", "?q=1").unwrap(),
            "http://example.org/a/b?q=1"
        );
    }

    #[test]
    fn resolve_removes_dot_segments() {
        assert_eq!(
            resolve_iri("http://example.org/a/b/c", "../../g").unwrap(),
            "http://example.org/g"
        );
    }

    #[test]
    fn resolve_absolute_path_replaces_base_path() {
        assert_eq!(
            resolve_iri("http://example.org/a/b", "/g").unwrap(),
            "http://example.org/g"
        );
    }

    #[test]
    fn resolve_scheme_only_base() {
        assert_eq!(
            resolve_iri("http://example.org", "a").unwrap(),
            "http://example.org/a"
        );
    }

    #[test]
    fn normalize_strips_trailing_slash_before_fragment() {
        assert_eq!(
            normalize_iri_path("http://example.org/a/#frag"),
            "http://example.org/a#frag"
        );
    }
}
