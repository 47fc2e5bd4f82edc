// src/services/name_match.rs
// DOCUMENTATION: Restaurant name normalization and matching
// PURPOSE: Decide whether a provider's place name is the restaurant we searched for

/// Normalize a name for comparison
/// DOCUMENTATION: Lowercases, folds quote and dash variants, spells out "&",
/// drops remaining punctuation and collapses whitespace
pub fn normalize_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());

    for ch in name.to_lowercase().chars() {
        match ch {
            '\'' | '"' | '`' | '´' | '‘' | '’' | '“' | '”' | '«' | '»' => {}
            '-' | '‐' | '‑' | '‒' | '–' | '—' | '_' | '/' => folded.push(' '),
            '&' | '＆' => folded.push_str(" and "),
            // Arabic combining marks (tashkeel) and tatweel carry no identity
            c if is_arabic_decoration(c) => {}
            c if c.is_alphanumeric() || c.is_whitespace() => folded.push(c),
            _ => folded.push(' '),
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_arabic_decoration(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}')
}

/// Exact-match filter for text search candidates
/// DOCUMENTATION: Accepts identical normalized names, or, for queries of at
/// least two tokens, when every query token is a prefix or suffix of some
/// candidate token. Single-word queries never match loosely.
pub fn is_exact_match(query: &str, candidate: &str) -> bool {
    let query = normalize_name(query);
    let candidate = normalize_name(candidate);

    if query.is_empty() || candidate.is_empty() {
        return false;
    }

    if query == candidate {
        return true;
    }

    let query_tokens: Vec<&str> = query.split(' ').collect();
    if query_tokens.len() < 2 {
        return false;
    }

    let candidate_tokens: Vec<&str> = candidate.split(' ').collect();

    query_tokens.iter().all(|qt| {
        candidate_tokens
            .iter()
            .any(|ct| ct.starts_with(*qt) || ct.ends_with(*qt))
    })
}

/// True when a name is written mostly in Latin script
pub fn is_latin_name(name: &str) -> bool {
    let (latin, other) = name
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(latin, other), c| {
            if c.is_ascii_alphabetic() {
                (latin + 1, other)
            } else {
                (latin, other + 1)
            }
        });

    latin > 0 && latin >= other
}

/// Split a restaurant's names into (english, localized)
/// DOCUMENTATION: The first Latin-script name is the English one; the first
/// other name is the localized one
pub fn split_names<'a>(names: &[&'a str]) -> (Option<&'a str>, Option<&'a str>) {
    let english = names.iter().copied().find(|n| is_latin_name(n));
    let localized = names.iter().copied().find(|n| !is_latin_name(n));
    (english, localized)
}

/// Cache key for a restaurant's names: lowercased, trimmed composite
pub fn cache_key(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join("|")
}
