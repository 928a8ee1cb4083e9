//! Type-signature extraction: derives parameter/return type-name strings
//! from a symbol's declaration fragments and applies Swift-style syntactic
//! sugar (§4.3).

/// One parameter's or return value's declaration fragments, already split
/// at the symbol-graph level into a type-identifier part and a text part
/// (e.g. `Array` + `<Element>`).
#[derive(Debug, Clone, Default)]
pub struct FragmentSpelling {
    pub type_identifier: String,
    pub text: String,
}

/// A symbol's function signature mixin, as handed to the builder.
#[derive(Debug, Clone, Default)]
pub struct FunctionSignature {
    pub parameters: Vec<FragmentSpelling>,
    pub returns: Vec<FragmentSpelling>,
}

/// A fully derived type-signature disambiguator, ready to store on a
/// [`crate::container::Element`] once its pieces are interned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSignature {
    pub parameter_types: Vec<String>,
    pub return_types: Vec<String>,
}

fn strip_whitespace(spelling: &FragmentSpelling) -> String {
    let mut combined = String::with_capacity(spelling.type_identifier.len() + spelling.text.len());
    combined.push_str(&spelling.type_identifier);
    combined.push_str(&spelling.text);
    combined.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Strip redundant outer parentheses unless they denote a tuple (i.e. the
/// content contains a depth-0 comma).
fn strip_redundant_parens(text: &str) -> &str {
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let mut depth = 0i32;
        for c in inner.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                ',' if depth == 0 => return text,
                _ => {}
            }
        }
        return inner;
    }
    text
}

/// Apply `Array<T> -> [T]`, `Optional<T> -> T?`, `Dictionary<K,V> -> [K:V]`
/// sugar by scanning for the generic-name markers and matching angle
/// brackets to their closing `>`.
pub fn apply_swift_sugar(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0usize;
    while i < chars.len() {
        if let Some((marker, consumed)) = match_generic_marker(&chars, i) {
            let after_name = i + consumed;
            if chars.get(after_name) == Some(&'<') {
                if let Some(close) = matching_angle_bracket(&chars, after_name) {
                    let inner: String = chars[after_name + 1..close].iter().collect();
                    let inner = apply_swift_sugar(&inner);
                    match marker {
                        'A' => out.push_str(&format!("[{inner}]")),
                        'O' => out.push_str(&format!("{inner}?")),
                        'D' => {
                            if let Some((k, v)) = split_top_level_comma(&inner) {
                                out.push_str(&format!("[{k}:{v}]"));
                            } else {
                                out.push_str(&format!("[{inner}]"));
                            }
                        }
                        _ => unreachable!(),
                    }
                    i = close + 1;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn match_generic_marker(chars: &[char], at: usize) -> Option<(char, usize)> {
    for (marker, name) in [('A', "Array"), ('O', "Optional"), ('D', "Dictionary")] {
        let name_chars: Vec<char> = name.chars().collect();
        if chars[at..].starts_with(name_chars.as_slice()) {
            return Some((marker, name_chars.len()));
        }
    }
    None
}

fn matching_angle_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (offset, c) in chars[open..].iter().enumerate() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level_comma(text: &str) -> Option<(String, String)> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                return Some((text[..i].to_string(), text[i + 1..].to_string()));
            }
            _ => {}
        }
    }
    None
}

/// Whether `fragments` spell only a void/empty return, per the
/// bundle-provided list §4.3 names ("void"/"Void").
fn is_void_return(fragments: &[FragmentSpelling]) -> bool {
    fragments.len() == 1
        && matches!(
            strip_whitespace(&fragments[0]).as_str(),
            "Void" | "void" | "()"
        )
}

/// Derive `parameter_types` for a function signature (§4.3). `is_swift`
/// gates sugar application — non-Swift symbols skip sugar but still strip
/// whitespace.
pub fn extract_parameter_types(signature: &FunctionSignature, is_swift: bool) -> Vec<String> {
    signature
        .parameters
        .iter()
        .map(|p| {
            let joined = strip_whitespace(p);
            let stripped = strip_redundant_parens(&joined).to_string();
            if is_swift {
                apply_swift_sugar(&stripped)
            } else {
                stripped
            }
        })
        .collect()
}

/// Derive `return_types` for a function signature (§4.3), splitting a
/// top-level tuple return on depth-0 commas and collapsing a void return to
/// an empty list.
pub fn extract_return_types(signature: &FunctionSignature, is_swift: bool) -> Vec<String> {
    if is_void_return(&signature.returns) {
        return Vec::new();
    }
    signature
        .returns
        .iter()
        .flat_map(|r| {
            let joined = strip_whitespace(r);
            let normalized = if is_swift {
                apply_swift_sugar(&joined)
            } else {
                joined
            };
            split_tuple_return(&normalized)
        })
        .collect()
}

fn split_tuple_return(text: &str) -> Vec<String> {
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let mut depth = 0i32;
        let mut parts = Vec::new();
        let mut start = 0usize;
        let mut has_top_comma = false;
        for (i, c) in inner.char_indices() {
            match c {
                '(' | '[' | '<' => depth += 1,
                ')' | ']' | '>' => depth -= 1,
                ',' if depth == 0 => {
                    has_top_comma = true;
                    parts.push(inner[start..i].to_string());
                    start = i + 1;
                }
                _ => {}
            }
        }
        if has_top_comma {
            parts.push(inner[start..].to_string());
            return parts;
        }
    }
    vec![text.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(ty: &str) -> FragmentSpelling {
        FragmentSpelling {
            type_identifier: ty.to_string(),
            text: String::new(),
        }
    }

    #[test]
    fn array_sugar() {
        assert_eq!(apply_swift_sugar("Array<Int>"), "[Int]");
    }

    #[test]
    fn optional_sugar() {
        assert_eq!(apply_swift_sugar("Optional<String>"), "String?");
    }

    #[test]
    fn dictionary_sugar() {
        assert_eq!(apply_swift_sugar("Dictionary<String,Int>"), "[String:Int]");
    }

    #[test]
    fn nested_sugar() {
        assert_eq!(
            apply_swift_sugar("Array<Optional<Int>>"),
            "[Int?]"
        );
    }

    #[test]
    fn non_generic_text_is_unchanged() {
        assert_eq!(apply_swift_sugar("MyStruct"), "MyStruct");
    }

    #[test]
    fn whitespace_is_stripped_from_fragments() {
        let param = FragmentSpelling {
            type_identifier: "Array".to_string(),
            text: " < Int >".to_string(),
        };
        let sig = FunctionSignature {
            parameters: vec![param],
            returns: vec![],
        };
        let params = extract_parameter_types(&sig, true);
        assert_eq!(params, vec!["[Int]".to_string()]);
    }

    #[test]
    fn void_return_yields_empty_list() {
        let sig = FunctionSignature {
            parameters: vec![],
            returns: vec![frag("Void")],
        };
        assert!(extract_return_types(&sig, true).is_empty());
    }

    #[test]
    fn tuple_return_splits_on_depth_zero_commas() {
        let sig = FunctionSignature {
            parameters: vec![],
            returns: vec![frag("(Int,String)")],
        };
        assert_eq!(
            extract_return_types(&sig, true),
            vec!["Int".to_string(), "String".to_string()]
        );
    }

    #[test]
    fn non_swift_symbol_skips_sugar_but_strips_whitespace() {
        let sig = FunctionSignature {
            parameters: vec![FragmentSpelling {
                type_identifier: "Array".to_string(),
                text: "<Int>".to_string(),
            }],
            returns: vec![],
        };
        assert_eq!(
            extract_parameter_types(&sig, false),
            vec!["Array<Int>".to_string()]
        );
    }

    #[test]
    fn redundant_outer_parens_are_stripped_but_tuples_are_not() {
        assert_eq!(strip_redundant_parens("(Int)"), "Int");
        assert_eq!(strip_redundant_parens("(Int,String)"), "(Int,String)");
    }
}
