//! The resolution error taxonomy (§7). Kept separate from
//! `doclink_error::Error`: every variant here needs a payload shaped for
//! its own kind of recovery hint, which a single flat context vector can't
//! express as precisely.

/// A text replacement suggested at a column range within the raw link
/// string. Source-file mapping is left to the caller (§7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub range: (usize, usize),
    pub text: String,
}

/// One suggested fix, with a human-readable summary and its replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub summary: String,
    pub replacements: Vec<Replacement>,
}

/// A candidate the disambiguation step considered but could not uniquely
/// select, along with the suffix that would disambiguate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path_description: String,
    pub required_suffix: String,
}

/// Shared payload every [`ResolutionError`] variant carries (§7).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPayload {
    pub path_prefix: String,
    pub remaining: String,
    pub solutions: Vec<Solution>,
    /// How much of the original range a caller should widen/narrow a
    /// diagnostic by when mapping `remaining` back to source text.
    pub range_adjustment: (isize, isize),
}

/// The non-fatal resolution error taxonomy (§7). The resolver never
/// raises; every failure is returned as one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// First component in an absolute link matches no module.
    ModuleNotFound { payload: ErrorPayload, near_misses: Vec<String> },
    /// Nothing resolved at any root.
    NotFound {
        payload: ErrorPayload,
        available_top_level_names: Vec<String>,
    },
    /// Descent stopped; the current node has no child with that name.
    UnknownName { payload: ErrorPayload, near_misses: Vec<String> },
    /// Name found but no entry matches the given suffix.
    UnknownDisambiguation {
        payload: ErrorPayload,
        candidates: Vec<Candidate>,
    },
    /// Multiple candidates remained after disambiguation.
    LookupCollision {
        payload: ErrorPayload,
        candidates: Vec<Candidate>,
    },
    /// Resolved to a sparse placeholder.
    UnfindableMatch { payload: ErrorPayload, node_name: String },
    /// A symbol link matched a non-symbol node.
    NonSymbolMatchForSymbolLink {
        payload: ErrorPayload,
        matched_path: String,
    },
}

impl ResolutionError {
    pub fn payload(&self) -> &ErrorPayload {
        match self {
            ResolutionError::ModuleNotFound { payload, .. }
            | ResolutionError::NotFound { payload, .. }
            | ResolutionError::UnknownName { payload, .. }
            | ResolutionError::UnknownDisambiguation { payload, .. }
            | ResolutionError::LookupCollision { payload, .. }
            | ResolutionError::UnfindableMatch { payload, .. }
            | ResolutionError::NonSymbolMatchForSymbolLink { payload, .. } => payload,
        }
    }
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionError::ModuleNotFound { payload, .. } => {
                write!(f, "no module named '{}'", payload.path_prefix)
            }
            ResolutionError::NotFound { payload, .. } => {
                write!(f, "nothing resolved for '{}'", payload.path_prefix)
            }
            ResolutionError::UnknownName { payload, .. } => {
                write!(f, "no child named '{}' under '{}'", payload.remaining, payload.path_prefix)
            }
            ResolutionError::UnknownDisambiguation { payload, .. } => {
                write!(f, "no entry matches suffix on '{}'", payload.remaining)
            }
            ResolutionError::LookupCollision { payload, .. } => {
                write!(f, "ambiguous reference at '{}'", payload.remaining)
            }
            ResolutionError::UnfindableMatch { node_name, .. } => {
                write!(f, "'{node_name}' is not directly findable")
            }
            ResolutionError::NonSymbolMatchForSymbolLink { matched_path, .. } => {
                write!(f, "symbol link matched non-symbol path '{matched_path}'")
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Near-miss suggestions against a list of available names, using the
/// Damerau-Levenshtein-style edit distance `fuzzy-matcher` provides,
/// capped to a small result set (§7: "a small (≤3) result cap").
pub fn near_misses(wanted: &str, available: &[String], cap: usize) -> Vec<String> {
    use fuzzy_matcher::skim::SkimMatcherV2;
    use fuzzy_matcher::FuzzyMatcher;

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &String)> = available
        .iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, wanted)
                .map(|score| (score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(cap).map(|(_, s)| s.clone()).collect()
}
