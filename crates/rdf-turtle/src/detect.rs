//! Format auto-detection (spec.md §4.6, C6): a prefix-sniffing heuristic
//! distinguishing the six concrete syntaxes from a buffered peek at the
//! start of a document, without fully parsing it.

/// The syntaxes [`detect`] can recognize.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum DetectedFormat {
    JsonLd,
    RdfXml,
    Turtle,
    TriG,
    NTriples,
    NQuads,
}

/// Classifies `peek` (conventionally up to 4 KiB read from the start of a
/// document, UTF-8 BOM tolerated) by its first non-whitespace,
/// non-comment content. Falls through to [`DetectedFormat::Turtle`] when
/// nothing more specific matches, mirroring Turtle's role as the most
/// permissive grammar of the family.
pub fn detect(peek: &[u8]) -> DetectedFormat {
    let text = strip_bom(peek);
    let trimmed = skip_ws_and_line_comments(text);
    match trimmed.chars().next() {
        Some('{') | Some('[') => return DetectedFormat::JsonLd,
        _ => {}
    }
    if trimmed.starts_with("<?xml") || trimmed.starts_with("<rdf:RDF") {
        return DetectedFormat::RdfXml;
    }
    let lower = trimmed.to_ascii_lowercase();
    let has_directive = lower.starts_with("@prefix")
        || lower.starts_with("@base")
        || lower.starts_with("prefix ")
        || lower.starts_with("base ")
        || lower.contains("\n@prefix")
        || lower.contains("\n@base");
    if has_directive {
        return if looks_like_trig(&lower) {
            DetectedFormat::TriG
        } else {
            DetectedFormat::Turtle
        };
    }
    match count_leading_iri_tokens(trimmed) {
        4 => DetectedFormat::NQuads,
        3 => {
            if looks_like_trig(&lower) {
                DetectedFormat::TriG
            } else {
                DetectedFormat::NTriples
            }
        }
        _ => DetectedFormat::Turtle,
    }
}

fn looks_like_trig(lower: &str) -> bool {
    lower.contains("graph ") || lower.contains("graph\t") || lower.contains("graph\n") || contains_graph_block(lower)
}

/// A graph block looks like `label {` with no property-list `[` in between;
/// a cheap heuristic is to look for `{` that is not immediately preceded by
/// `|` (ruling out RDF 1.2 annotations `{| ... |}`).
fn contains_graph_block(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[1] == b'{' && w[0] != b'|')
        && !text.trim_start().starts_with('{')
}

fn strip_bom(bytes: &[u8]) -> &str {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    std::str::from_utf8(bytes).unwrap_or("")
}

fn skip_ws_and_line_comments(mut text: &str) -> &str {
    loop {
        let before = text;
        text = text.trim_start();
        if let Some(rest) = text.strip_prefix('#') {
            text = rest.split_once('\n').map_or("", |(_, after)| after);
        }
        if text == before {
            return text;
        }
    }
}

/// Counts how many `<...>` IRI tokens appear, separated by whitespace,
/// before the first top-level `.`, capping at 4 (N-Quads' maximum).
fn count_leading_iri_tokens(text: &str) -> usize {
    let mut count = 0;
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if let Some(stripped) = rest.strip_prefix('<') {
            match stripped.find('>') {
                Some(end) => {
                    count += 1;
                    rest = &stripped[end + 1..];
                    if count >= 4 {
                        return count;
                    }
                }
                None => return count,
            }
        } else {
            return count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json_ld_by_leading_brace() {
        assert_eq!(detect(br#"{"@context": {}}"#), DetectedFormat::JsonLd);
    }

    #[test]
    fn detects_rdf_xml_by_declaration() {
        assert_eq!(detect(b"<?xml version=\"1.0\"?><rdf:RDF/>"), DetectedFormat::RdfXml);
    }

    #[test]
    fn detects_turtle_by_prefix_directive() {
        assert_eq!(detect(b"@prefix ex: <http://ex/> .\nex:s ex:p ex:o ."), DetectedFormat::Turtle);
    }

    #[test]
    fn detects_trig_by_graph_keyword() {
        assert_eq!(
            detect(b"@prefix ex: <http://ex/> .\nGRAPH ex:g { ex:s ex:p ex:o . }"),
            DetectedFormat::TriG
        );
    }

    #[test]
    fn detects_nquads_by_four_iri_tokens() {
        assert_eq!(
            detect(b"<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> ."),
            DetectedFormat::NQuads
        );
    }

    #[test]
    fn detects_ntriples_by_three_iri_tokens() {
        assert_eq!(
            detect(b"<http://ex/s> <http://ex/p> <http://ex/o> ."),
            DetectedFormat::NTriples
        );
    }

    #[test]
    fn falls_through_to_turtle() {
        assert_eq!(detect(b"_:s <http://ex/p> \"o\" ."), DetectedFormat::Turtle);
    }

    #[test]
    fn tolerates_utf8_bom() {
        let mut data = b"\xef\xbb\xbf".to_vec();
        data.extend_from_slice(b"@prefix ex: <http://ex/> .\nex:s ex:p ex:o .");
        assert_eq!(detect(&data), DetectedFormat::Turtle);
    }
}
