// src/services/segment_builder.rs
// DOCUMENTATION: Spin wheel segment construction
// PURPOSE: Merge near-duplicate cuisines and lay them out as wheel wedges

use crate::models::{is_all_category, CategorySegment, Cuisine, WheelFilter};
use std::collections::{HashMap, HashSet};

/// Wedge colors cycled when a cuisine carries none
const PALETTE: [&str; 8] = [
    "#FF6B6B", "#FFD93D", "#6BCB77", "#4D96FF", "#FF8E3C", "#B983FF", "#00C2A8", "#F473B9",
];

/// Icon used when a forced category has no matching cuisine record
const DEFAULT_ICON: &str = "🍽️";

/// Alias → canonical cuisine lookup
/// DOCUMENTATION: Matching is case-insensitive on trimmed names; the canonical
/// spelling is returned exactly as configured
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    aliases: HashMap<String, String>,
}

impl SynonymTable {
    pub fn new(pairs: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        table.extend(pairs);
        table
    }

    /// Built-in table of known near-duplicates
    pub fn builtin() -> Self {
        let pairs: HashMap<String, String> = [
            ("pizza", "italian"),
            ("pasta", "italian"),
            ("بيتزا", "إيطالي"),
            ("باستا", "إيطالي"),
            ("burgers", "burger"),
            ("برغر", "برجر"),
            ("بيرجر", "برجر"),
            ("sushi", "japanese"),
            ("سوشي", "ياباني"),
            ("coffee", "cafe"),
            ("قهوة", "كافيه"),
            ("مقهى", "كافيه"),
            ("shawarma", "lebanese"),
            ("شاورما", "لبناني"),
        ]
        .into_iter()
        .map(|(a, c)| (a.to_string(), c.to_string()))
        .collect();

        Self::new(&pairs)
    }

    /// Add or override aliases
    pub fn extend(&mut self, pairs: &HashMap<String, String>) {
        for (alias, canonical) in pairs {
            self.aliases
                .insert(alias.trim().to_lowercase(), canonical.trim().to_string());
        }
    }

    /// Canonical name for a cuisine label (the label itself when unaliased)
    pub fn canonical(&self, name: &str) -> String {
        let trimmed = name.trim();
        self.aliases
            .get(&trimmed.to_lowercase())
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

/// Build the wheel segments for the current filter
/// DOCUMENTATION:
/// - "all": one segment per distinct canonical cuisine, first-seen order,
///   icon and color (the "all" pseudo-cuisine is skipped)
/// - a forced category: `forced_count` identical segments labelled exactly
///   as the filter, so the wedges agree with the forced spin outcome
///
/// An empty result for "all" means the wheel must not spin.
pub fn build_segments(
    cuisines: &[Cuisine],
    filter: &WheelFilter,
    synonyms: &SynonymTable,
    forced_count: usize,
) -> Vec<CategorySegment> {
    match filter {
        WheelFilter::All => merged_segments(cuisines, synonyms),
        WheelFilter::Category(category) => {
            forced_segments(cuisines, category, synonyms, forced_count.max(2))
        }
    }
}

fn merged_segments(cuisines: &[Cuisine], synonyms: &SynonymTable) -> Vec<CategorySegment> {
    let mut seen = HashSet::new();
    let mut segments = Vec::new();

    for cuisine in cuisines {
        let label = cuisine.label();
        if is_all_category(label) || is_all_category(&cuisine.name) {
            continue;
        }

        let canonical = synonyms.canonical(label);
        if !seen.insert(canonical.to_lowercase()) {
            log::debug!("Merged cuisine '{}' into '{}'", label, canonical);
            continue;
        }

        let color = cuisine
            .color
            .clone()
            .unwrap_or_else(|| PALETTE[segments.len() % PALETTE.len()].to_string());

        segments.push(CategorySegment {
            display_name: canonical,
            icon: cuisine.icon.clone().unwrap_or_else(|| DEFAULT_ICON.to_string()),
            color,
        });
    }

    segments
}

fn forced_segments(
    cuisines: &[Cuisine],
    category: &str,
    synonyms: &SynonymTable,
    count: usize,
) -> Vec<CategorySegment> {
    let canonical = synonyms.canonical(category);
    let matching = cuisines.iter().find(|c| {
        synonyms.canonical(c.label()).eq_ignore_ascii_case(&canonical)
            || synonyms.canonical(&c.name).eq_ignore_ascii_case(&canonical)
    });

    let icon = matching
        .and_then(|c| c.icon.clone())
        .unwrap_or_else(|| DEFAULT_ICON.to_string());

    (0..count)
        .map(|i| CategorySegment {
            display_name: category.to_string(),
            icon: icon.clone(),
            color: matching
                .and_then(|c| c.color.clone())
                .unwrap_or_else(|| PALETTE[i % PALETTE.len()].to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza_table() -> SynonymTable {
        let mut pairs = HashMap::new();
        pairs.insert("pizza".to_string(), "italian".to_string());
        SynonymTable::new(&pairs)
    }

    #[test]
    fn test_pizza_merges_into_italian() {
        let cuisines = vec![
            Cuisine::new("all", "🍽️"),
            Cuisine::new("italian", "🍕"),
            Cuisine::new("pizza", "🍕"),
        ];

        let segments = build_segments(&cuisines, &WheelFilter::All, &pizza_table(), 6);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].display_name, "italian");
    }

    #[test]
    fn test_one_segment_per_canonical_name() {
        let cuisines = vec![
            Cuisine::new("Pizza", "🍕"),
            Cuisine::new("burger", "🍔"),
            Cuisine::new("italian", "🍝"),
            Cuisine::new("Burger", "🍔"),
            Cuisine::new("sushi", "🍣"),
        ];
        let table = pizza_table();

        let segments = build_segments(&cuisines, &WheelFilter::All, &table, 6);
        let names: Vec<&str> = segments.iter().map(|s| s.display_name.as_str()).collect();

        assert_eq!(names, vec!["italian", "burger", "sushi"]);
        // first-seen wins for icon
        assert_eq!(segments[0].icon, "🍕");

        // every input maps to exactly one produced segment
        for cuisine in &cuisines {
            let canonical = table.canonical(cuisine.label()).to_lowercase();
            let hits = segments
                .iter()
                .filter(|s| s.display_name.to_lowercase() == canonical)
                .count();
            assert_eq!(hits, 1, "{}", cuisine.name);
        }
    }

    #[test]
    fn test_empty_list_yields_no_segments() {
        let segments = build_segments(&[], &WheelFilter::All, &SynonymTable::builtin(), 6);
        assert!(segments.is_empty());

        let only_all = vec![Cuisine::new("الكل", "🍽️")];
        assert!(build_segments(&only_all, &WheelFilter::All, &SynonymTable::builtin(), 6).is_empty());
    }

    #[test]
    fn test_forced_category_repeats_segment() {
        let cuisines = vec![Cuisine::new("burger", "🍔"), Cuisine::new("sushi", "🍣")];
        let filter = WheelFilter::Category("burger".to_string());

        let segments = build_segments(&cuisines, &filter, &SynonymTable::default(), 6);

        assert_eq!(segments.len(), 6);
        assert!(segments.iter().all(|s| s.display_name == "burger" && s.icon == "🍔"));
    }

    #[test]
    fn test_forced_count_has_floor_of_two() {
        let filter = WheelFilter::Category("grill".to_string());
        let segments = build_segments(&[], &filter, &SynonymTable::default(), 0);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].icon, DEFAULT_ICON);
    }

    #[test]
    fn test_display_name_used_for_merge() {
        let mut pizza = Cuisine::new("pizza", "🍕");
        pizza.display_name = Some("بيتزا".to_string());
        let mut italian = Cuisine::new("italian", "🍝");
        italian.display_name = Some("إيطالي".to_string());

        let segments = build_segments(
            &[italian, pizza],
            &WheelFilter::All,
            &SynonymTable::builtin(),
            6,
        );

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].display_name, "إيطالي");
    }
}
