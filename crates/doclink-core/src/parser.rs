//! The link parser: splits a raw path string into structured components,
//! recognizing kind/hash/type-signature disambiguation suffixes and
//! operator names that would otherwise be mistaken for them.

use crate::config::SymbolKindTable;

/// How a [`ParsedPathComponent`] disambiguates among same-named siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disambiguation {
    None,
    KindOnly(String),
    HashOnly(String),
    KindAndHash(String, String),
    TypeSignature {
        parameter_types: Option<Vec<String>>,
        return_types: Option<Vec<String>>,
    },
    /// A fragment-anchor component produced by a trailing `#fragment`.
    Anchor,
}

/// One slash-delimited segment of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPathComponent {
    pub full: String,
    pub name: String,
    pub disambiguation: Disambiguation,
}

/// The result of parsing a raw link string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub components: Vec<ParsedPathComponent>,
    pub is_absolute: bool,
}

/// A parse failure. Link parsing itself cannot fail by construction (every
/// byte sequence becomes *some* sequence of components); this type exists
/// for the narrow case of malformed UTF-8 fragments handed in by a caller
/// that did not validate its input, per §7's "the core never raises"
/// policy applied to the parser's own surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParseError {
    pub message: String,
}

impl std::fmt::Display for PathParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PathParseError {}

const HASH_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

fn is_hash_candidate(text: &str, max_len: usize) -> bool {
    !text.is_empty()
        && text.len() <= max_len
        && text.chars().all(|c| HASH_ALPHABET.contains(c))
}

/// Recognize operator names whose own spelling contains a `-`, e.g.
/// `-(_:_:)` or `->(_:_:)`, so the later disambiguator scan never mistakes
/// the leading `-` for a separator (§4.2).
fn operator_name_prefix(component: &str) -> Option<&str> {
    for prefix in ["->", "-"] {
        if let Some(rest) = component.strip_prefix(prefix) {
            if rest.starts_with('(') {
                return Some(prefix);
            }
        }
    }
    None
}

/// Scan a type-signature disambiguator suffix (`-(Int,String)->Bool`),
/// tracking parenthesis depth so nested closure types (`(Int)->Int`) are
/// not mistaken for the top-level `->` separator.
fn parse_type_signature(suffix: &str) -> Option<Disambiguation> {
    let bytes = suffix.as_bytes();
    let mut parameter_types = None;
    let mut return_types = None;
    let mut rest = suffix;

    if let Some(after_paren) = rest.strip_prefix('(') {
        let mut depth = 1usize;
        let mut end = None;
        for (i, b) in after_paren.as_bytes().iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end?;
        let args = &after_paren[..end];
        parameter_types = Some(split_depth_zero_commas(args));
        rest = &after_paren[end + 1..];
    }

    if let Some(after_arrow) = rest.strip_prefix("->") {
        if !after_arrow.is_empty() {
            return_types = Some(split_top_level_tuple(after_arrow));
        }
        rest = "";
    }

    if !rest.is_empty() {
        return None;
    }
    let _ = bytes;
    if parameter_types.is_none() && return_types.is_none() {
        return None;
    }
    Some(Disambiguation::TypeSignature {
        parameter_types,
        return_types,
    })
}

/// Split `args` on commas at paren-depth zero, so `(Result,(Result,Element)->Result)`
/// yields `["Result", "(Result,Element)->Result"]`.
fn split_depth_zero_commas(args: &str) -> Vec<String> {
    if args.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(args[start..i].to_string());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(args[start..].to_string());
    parts
}

/// Split a return-type tail on depth-0 commas, for a top-level tuple return.
fn split_top_level_tuple(text: &str) -> Vec<String> {
    let trimmed = text.strip_prefix('(').and_then(|t| t.strip_suffix(')'));
    match trimmed {
        Some(inner) if !has_trailing_closure(text) => split_depth_zero_commas(inner),
        _ => vec![text.to_string()],
    }
}

fn has_trailing_closure(text: &str) -> bool {
    text.contains("->") && text.starts_with('(')
}

/// Parse one `/`-delimited path component (§4.2).
pub fn parse_component(component: &str, kinds: &SymbolKindTable) -> ParsedPathComponent {
    if let Some(prefix) = operator_name_prefix(component) {
        let _ = prefix;
        return ParsedPathComponent {
            full: component.to_string(),
            name: component.to_string(),
            disambiguation: Disambiguation::None,
        };
    }

    if let Some(sig_start) = find_type_signature_start(component) {
        let (name_part, suffix) = component.split_at(sig_start);
        if let Some(disambiguation) = parse_type_signature(suffix) {
            return ParsedPathComponent {
                full: component.to_string(),
                name: name_part.to_string(),
                disambiguation,
            };
        }
    }

    if let Some(dash_idx) = component.rfind('-') {
        let (name_part, tail_with_dash) = component.split_at(dash_idx);
        let tail = &tail_with_dash[1..];
        if !tail.is_empty() {
            if let Some(disambiguation) = classify_hyphen_tail(name_part, tail, kinds) {
                return ParsedPathComponent {
                    full: component.to_string(),
                    name: name_part.to_string(),
                    disambiguation,
                };
            }
        }
    }

    ParsedPathComponent {
        full: component.to_string(),
        name: component.to_string(),
        disambiguation: Disambiguation::None,
    }
}

/// Look for the start of a `-(` or `->` type-signature suffix, scanning
/// from the end so operator-name parentheses earlier in the component
/// (already handled by [`operator_name_prefix`]) are not mistaken for it.
fn find_type_signature_start(component: &str) -> Option<usize> {
    if let Some(idx) = component.rfind("-(") {
        return Some(idx + 1);
    }
    if let Some(idx) = component.rfind("->") {
        return Some(idx);
    }
    None
}

fn classify_hyphen_tail(
    name_part: &str,
    tail: &str,
    kinds: &SymbolKindTable,
) -> Option<Disambiguation> {
    if let Some((lang, kind)) = tail.split_once('.') {
        if kinds.contains(kind) && !lang.is_empty() {
            return Some(Disambiguation::KindOnly(format!("{lang}.{kind}")));
        }
    }
    if kinds.contains(tail) {
        // Recurse for a preceding hash, per step 1 of §4.2.
        if let Some(second_dash) = name_part.rfind('-') {
            let (inner_name, hash_candidate) = name_part.split_at(second_dash);
            let hash_candidate = &hash_candidate[1..];
            if is_hash_candidate(hash_candidate, 32) {
                let _ = inner_name;
                return Some(Disambiguation::KindAndHash(
                    tail.to_string(),
                    hash_candidate.to_string(),
                ));
            }
        }
        return Some(Disambiguation::KindOnly(tail.to_string()));
    }
    if is_hash_candidate(tail, 5) {
        return Some(Disambiguation::HashOnly(tail.to_string()));
    }
    None
}

/// Parse a full raw path string, per §4.2.
pub fn parse_path(raw: &str, kinds: &SymbolKindTable) -> Result<ParsedPath, PathParseError> {
    if !raw.is_ascii() && !raw.chars().all(|c| !c.is_control()) {
        return Err(PathParseError {
            message: "path contains control characters".to_string(),
        });
    }

    let (path_part, fragment) = match raw.rsplit_once('#') {
        Some((before, after)) => (before, Some(after.to_string())),
        None => (raw, None),
    };

    if path_part.is_empty() {
        if let Some(fragment) = fragment {
            return Ok(ParsedPath {
                components: vec![ParsedPathComponent {
                    full: fragment.clone(),
                    name: fragment,
                    disambiguation: Disambiguation::Anchor,
                }],
                is_absolute: true,
            });
        }
        return Ok(ParsedPath {
            components: Vec::new(),
            is_absolute: false,
        });
    }

    let mut raw_segments: Vec<&str> = path_part.split('/').collect();
    if raw_segments.last() == Some(&"") {
        raw_segments.pop();
    }

    let mut is_absolute = false;
    if raw_segments.first() == Some(&"") {
        is_absolute = true;
        raw_segments.remove(0);
    }
    if matches!(raw_segments.first(), Some(&"documentation") | Some(&"tutorials")) {
        is_absolute = true;
    }

    let mut components: Vec<ParsedPathComponent> = raw_segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|segment| parse_component(segment, kinds))
        .collect();

    if let Some(fragment) = fragment {
        components.push(ParsedPathComponent {
            full: fragment.clone(),
            name: fragment,
            disambiguation: Disambiguation::Anchor,
        });
    }

    Ok(ParsedPath {
        components,
        is_absolute,
    })
}
