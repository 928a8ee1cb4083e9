//! The minimal-disambiguation engine (§4.5): selecting entries out of a
//! [`DisambiguationContainer`] by a parsed suffix, and computing the
//! shortest suffix that uniquely picks one entry back out again.

use doclink_core::{Disambiguation, DisambiguationContainer, Element, InternPool, InternedStr};

fn bare_kind(kind: &str) -> &str {
    kind.rsplit('.').next().unwrap_or(kind)
}

/// Filter `container` by a parsed component's disambiguation suffix.
///
/// `Disambiguation::None` returns every element, leaving tie-breaking to the
/// resolver (§4.4's collision rules apply only once descent has otherwise
/// run out of information to prefer one candidate).
pub fn select<'a>(
    container: &'a DisambiguationContainer,
    interner: &InternPool,
    disambiguation: &Disambiguation,
) -> Vec<&'a Element> {
    match disambiguation {
        Disambiguation::None | Disambiguation::Anchor => container.iter().collect(),
        Disambiguation::KindOnly(kind) => {
            let kind = interner.intern(bare_kind(kind));
            container.matching_kind_hash(Some(kind), None)
        }
        Disambiguation::HashOnly(hash) => {
            let hash = interner.intern(hash);
            container.matching_kind_hash(None, Some(hash))
        }
        Disambiguation::KindAndHash(kind, hash) => {
            let kind = interner.intern(bare_kind(kind));
            let hash = interner.intern(hash);
            container.matching_kind_hash(Some(kind), Some(hash))
        }
        Disambiguation::TypeSignature {
            parameter_types,
            return_types,
        } => {
            let params: Option<Vec<InternedStr>> = parameter_types
                .as_ref()
                .map(|types| types.iter().map(|t| interner.intern(t)).collect());
            let returns: Option<Vec<InternedStr>> = return_types
                .as_ref()
                .map(|types| types.iter().map(|t| interner.intern(t)).collect());
            container.matching_signature(params.as_deref(), returns.as_deref())
        }
    }
}

/// A canonical disambiguation suffix for one element, chosen to be the
/// shortest string that still picks it out uniquely among its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinimalSuffix {
    /// No other sibling shares this name; no suffix needed.
    None,
    Kind(String),
    Hash(String),
    /// A subset of parameter/return-type positions (§4.5 strategy 2).
    /// `parameters`/`returns` each hold one entry per position in that
    /// category; `Some(name)` positions are part of the chosen subset and
    /// render as the type name, `None` positions render as `_`.
    TypeSignature {
        parameters: Option<Vec<Option<String>>>,
        returns: Option<Vec<Option<String>>>,
    },
}

impl MinimalSuffix {
    pub fn render(&self) -> String {
        match self {
            MinimalSuffix::None => String::new(),
            MinimalSuffix::Kind(kind) => format!("-{kind}"),
            MinimalSuffix::Hash(hash) => format!("-{hash}"),
            MinimalSuffix::TypeSignature { parameters, returns } => {
                let mut out = String::new();
                if let Some(params) = parameters {
                    out.push_str("-(");
                    out.push_str(&render_slots(params));
                    out.push(')');
                }
                if let Some(rets) = returns {
                    out.push_str("->");
                    out.push_str(&render_slots(rets));
                }
                out
            }
        }
    }
}

fn render_slots(slots: &[Option<String>]) -> String {
    slots
        .iter()
        .map(|slot| slot.clone().unwrap_or_else(|| "_".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the shortest suffix that disambiguates the element at `target`
/// among all of `container`'s entries (§4.5).
///
/// Tries, in order of preference for readability: kind alone, a minimal
/// type-signature *subset* (not necessarily a prefix — see
/// [`minimal_type_signature`]), then falls back to the hash (always
/// unique, since it is derived from the symbol's own precise id).
pub fn minimal_disambiguator(
    container: &DisambiguationContainer,
    interner: &InternPool,
    target: usize,
) -> MinimalSuffix {
    let elements = container.elements();
    if elements.len() <= 1 {
        return MinimalSuffix::None;
    }
    let target_element = &elements[target];
    let others: Vec<&Element> = elements
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target)
        .map(|(_, e)| e)
        .collect();

    if let Some(kind) = target_element.kind {
        if others.iter().all(|e| e.kind != Some(kind)) {
            let rendered = interner.resolve_owned(kind).unwrap_or_default();
            return MinimalSuffix::Kind(rendered);
        }
    }

    let same_kind: Vec<&Element> = others
        .iter()
        .filter(|e| e.kind == target_element.kind)
        .copied()
        .collect();

    if let Some(suffix) = minimal_type_signature(target_element, &same_kind, interner) {
        return suffix;
    }

    let hash = target_element
        .hash
        .and_then(|h| interner.resolve_owned(h))
        .unwrap_or_default();
    MinimalSuffix::Hash(hash)
}

/// Combined parameter+return type vector for one element: index `< num_params`
/// addresses a parameter position, `>= num_params` a return position.
fn value_at(element: &Element, pos: usize, num_params: usize) -> Option<InternedStr> {
    if pos < num_params {
        element.parameter_types.as_deref().and_then(|v| v.get(pos)).copied()
    } else {
        element
            .return_types
            .as_deref()
            .and_then(|v| v.get(pos - num_params))
            .copied()
    }
}

/// §4.5 strategy 2: find the smallest *subset* of parameter/return-type
/// positions (not necessarily contiguous, not necessarily a prefix) that
/// uniquely identifies `target` among `rivals` sharing its kind.
///
/// Fast path (≤64 rivals, ≤64 positions): for each position, a 64-bit
/// bitset records which entries (target plus rivals) share the same type
/// name there; positions identical across every entry convey no
/// information and are pruned. Subsets are enumerated in increasing size,
/// each checked by ANDing the position bitsets — the target is uniquely
/// identified once every other entry is excluded from the intersection.
/// Among subsets of the minimal successful size, the one with the fewest
/// total UTF-8 bytes wins.
///
/// Fallback path (>64 rivals or positions): any single position whose type
/// name is unique to `target` alone.
fn minimal_type_signature(
    target: &Element,
    rivals: &[&Element],
    interner: &InternPool,
) -> Option<MinimalSuffix> {
    let num_params = target.parameter_types.as_ref().map(|v| v.len()).unwrap_or(0);
    let num_returns = target.return_types.as_ref().map(|v| v.len()).unwrap_or(0);
    let num_positions = num_params + num_returns;
    if num_positions == 0 {
        return None;
    }
    // Only rivals that actually carry a type signature can be discriminated
    // against this way; others are left for the hash fallback.
    let rivals: Vec<&Element> = rivals
        .iter()
        .filter(|e| e.parameter_types.is_some() || e.return_types.is_some())
        .copied()
        .collect();
    if rivals.is_empty() {
        return None;
    }

    let mut entities: Vec<&Element> = Vec::with_capacity(rivals.len() + 1);
    entities.push(target);
    entities.extend(rivals.iter().copied());
    let n = entities.len();

    let chosen_positions = if n <= 64 && num_positions <= 64 {
        minimal_positions_bitset(&entities, num_positions, num_params, interner)?
    } else {
        minimal_positions_fallback(&entities, num_positions, num_params)?
    };

    Some(render_type_signature(target, num_params, num_returns, &chosen_positions, interner))
}

/// Fast bitset path. `entities[0]` is always the target.
fn minimal_positions_bitset(
    entities: &[&Element],
    num_positions: usize,
    num_params: usize,
    interner: &InternPool,
) -> Option<Vec<usize>> {
    let n = entities.len();
    let full_mask: u64 = if n == 64 { u64::MAX } else { (1u64 << n) - 1 };
    let target = entities[0];

    let mut usable_positions: Vec<usize> = Vec::new();
    let mut same_mask: Vec<u64> = Vec::new();
    for pos in 0..num_positions {
        let target_val = value_at(target, pos, num_params);
        let mut mask = 0u64;
        let mut all_same = true;
        for (i, e) in entities.iter().enumerate() {
            let val = value_at(e, pos, num_params);
            if val == target_val {
                mask |= 1u64 << i;
            } else {
                all_same = false;
            }
        }
        if all_same {
            continue;
        }
        usable_positions.push(pos);
        same_mask.push(mask);
    }

    if usable_positions.is_empty() {
        return None;
    }

    let m = usable_positions.len();
    for size in 1..=m {
        let mut best: Option<(Vec<usize>, usize)> = None;
        for combo in combinations(m, size) {
            let mut conflict = full_mask;
            for &ci in &combo {
                conflict &= same_mask[ci];
            }
            conflict &= !1u64; // clear the target's own bit (index 0)
            conflict &= full_mask;
            if conflict == 0 {
                let positions: Vec<usize> = combo.iter().map(|&ci| usable_positions[ci]).collect();
                let byte_len: usize = positions
                    .iter()
                    .filter_map(|&p| value_at(target, p, num_params))
                    .filter_map(|sym| interner.resolve_owned(sym))
                    .map(|s| s.len())
                    .sum();
                if best.as_ref().map(|(_, b)| byte_len < *b).unwrap_or(true) {
                    best = Some((positions, byte_len));
                }
            }
        }
        if let Some((positions, _)) = best {
            return Some(positions);
        }
    }
    None
}

fn minimal_positions_fallback(
    entities: &[&Element],
    num_positions: usize,
    num_params: usize,
) -> Option<Vec<usize>> {
    let target = entities[0];
    for pos in 0..num_positions {
        let target_val = value_at(target, pos, num_params);
        if target_val.is_none() {
            continue;
        }
        if entities[1..].iter().all(|e| value_at(e, pos, num_params) != target_val) {
            return Some(vec![pos]);
        }
    }
    None
}

fn render_type_signature(
    target: &Element,
    num_params: usize,
    num_returns: usize,
    chosen: &[usize],
    interner: &InternPool,
) -> MinimalSuffix {
    let parameters = if num_params > 0 {
        Some(
            (0..num_params)
                .map(|p| {
                    if chosen.contains(&p) {
                        target
                            .parameter_types
                            .as_ref()
                            .and_then(|v| v.get(p))
                            .and_then(|sym| interner.resolve_owned(*sym))
                    } else {
                        None
                    }
                })
                .collect(),
        )
    } else {
        None
    };
    let returns = if num_returns > 0 {
        Some(
            (0..num_returns)
                .map(|r| {
                    let pos = num_params + r;
                    if chosen.contains(&pos) {
                        target
                            .return_types
                            .as_ref()
                            .and_then(|v| v.get(r))
                            .and_then(|sym| interner.resolve_owned(*sym))
                    } else {
                        None
                    }
                })
                .collect(),
        )
    } else {
        None
    };
    MinimalSuffix::TypeSignature { parameters, returns }
}

/// All `size`-element subsets of `0..n`, as sorted index vectors.
fn combinations(n: usize, size: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if size == 0 || size > n {
        return result;
    }
    let mut combo: Vec<usize> = Vec::with_capacity(size);
    fn helper(start: usize, n: usize, size: usize, combo: &mut Vec<usize>, result: &mut Vec<Vec<usize>>) {
        if combo.len() == size {
            result.push(combo.clone());
            return;
        }
        for i in start..n {
            combo.push(i);
            helper(i + 1, n, size, combo, result);
            combo.pop();
        }
    }
    helper(0, n, size, &mut combo, &mut result);
    result
}
