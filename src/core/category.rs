//! Part categories and keyword-based categorization
//!
//! Categories are never stored on a part. They are recomputed from the part
//! name every time stock is grouped or allocated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::part::Part;

/// Functional class of a scaffolding part
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Upright,
    Ledger,
    Transom,
    Brace,
    Platform,
    ToeBoard,
    Guardrail,
    BaseJack,
    Shim,
    Other,
}

/// Ordered synonym table. Checked top to bottom, first match wins.
const SYNONYMS: &[(Category, &[&str])] = &[
    (Category::Upright, &["poteau", "montant", "standard", "upright"]),
    (Category::Ledger, &["moise", "lisse", "longitudinale", "ledger"]),
    (Category::Transom, &["transverse", "entretoise", "traverse", "transom"]),
    (Category::Brace, &["diagonale", "contrevent", "brace"]),
    (Category::Platform, &["plancher", "plateau", "deck", "platform", "trappe"]),
    (Category::ToeBoard, &["plinthe", "toe board", "toeboard"]),
    (Category::Guardrail, &["garde-corps", "gc", "guardrail", "lisse de protection"]),
    (Category::BaseJack, &["embase", "pied", "base jack", "socle"]),
    (Category::Shim, &["cale", "shim", "bloc"]),
];

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 10] = [
        Category::Upright,
        Category::Ledger,
        Category::Transom,
        Category::Brace,
        Category::Platform,
        Category::ToeBoard,
        Category::Guardrail,
        Category::BaseJack,
        Category::Shim,
        Category::Other,
    ];

    /// Keywords that map a part name to this category
    pub fn keywords(&self) -> &'static [&'static str] {
        SYNONYMS
            .iter()
            .find(|(cat, _)| cat == self)
            .map(|(_, words)| *words)
            .unwrap_or(&[])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Upright => "upright",
            Category::Ledger => "ledger",
            Category::Transom => "transom",
            Category::Brace => "brace",
            Category::Platform => "platform",
            Category::ToeBoard => "toe-board",
            Category::Guardrail => "guardrail",
            Category::BaseJack => "base-jack",
            Category::Shim => "shim",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "upright" | "poteau" => Ok(Category::Upright),
            "ledger" | "moise" => Ok(Category::Ledger),
            "transom" | "transverse" => Ok(Category::Transom),
            "brace" | "diagonale" => Ok(Category::Brace),
            "platform" | "plancher" => Ok(Category::Platform),
            "toe-board" | "toeboard" | "plinthe" => Ok(Category::ToeBoard),
            "guardrail" | "gardecorps" | "garde-corps" => Ok(Category::Guardrail),
            "base-jack" | "basejack" | "embase" => Ok(Category::BaseJack),
            "shim" | "cale" => Ok(Category::Shim),
            "other" | "autres" => Ok(Category::Other),
            _ => Err(format!(
                "Invalid category: {}. Use upright, ledger, transom, brace, platform, toe-board, guardrail, base-jack, shim, or other",
                s
            )),
        }
    }
}

/// Map a free-text part name to its category
///
/// Case-insensitive substring match against the synonym table. Total: names
/// that match nothing (including the empty name) are `Other`.
pub fn categorize(name: &str) -> Category {
    matched_keyword(name).map_or(Category::Other, |(cat, _)| cat)
}

/// Category and the synonym that decided it, `None` for `Other`
pub fn matched_keyword(name: &str) -> Option<(Category, &'static str)> {
    if name.is_empty() {
        return None;
    }
    let lower = name.to_lowercase();
    Category::ALL.iter().find_map(|cat| {
        cat.keywords()
            .iter()
            .find(|w| lower.contains(*w))
            .map(|w| (*cat, *w))
    })
}

/// Group parts by category, preserving inventory order within a group
pub fn group_by_category<'a, I>(parts: I) -> BTreeMap<Category, Vec<&'a Part>>
where
    I: IntoIterator<Item = &'a Part>,
{
    let mut groups: BTreeMap<Category, Vec<&'a Part>> = BTreeMap::new();
    for part in parts {
        groups.entry(categorize(&part.name)).or_default().push(part);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_known_names() {
        assert_eq!(categorize("Plateau alu"), Category::Platform);
        assert_eq!(categorize("Poteau 2m"), Category::Upright);
        assert_eq!(categorize("Moise 2.07m"), Category::Ledger);
        assert_eq!(categorize("Traverse 0.73m"), Category::Transom);
        assert_eq!(categorize("Diagonale 2.5m"), Category::Brace);
        assert_eq!(categorize("Plinthe alu 2.07m"), Category::ToeBoard);
        assert_eq!(categorize("Garde-corps latéral 2.07m"), Category::Guardrail);
        assert_eq!(categorize("Socle réglable U standard"), Category::Upright);
        assert_eq!(categorize("Embase pivotante"), Category::BaseJack);
        assert_eq!(categorize("Cale bois 50mm"), Category::Shim);
    }

    #[test]
    fn test_categorize_unknown_is_other() {
        assert_eq!(categorize("Widget XYZ"), Category::Other);
        assert_eq!(categorize(""), Category::Other);
    }

    #[test]
    fn test_categorize_is_case_insensitive() {
        assert_eq!(categorize("POTEAU 3M"), Category::Upright);
        assert_eq!(categorize("Base Jack 600"), Category::BaseJack);
        assert_eq!(categorize("Steel TOEBOARD"), Category::ToeBoard);
    }

    #[test]
    fn test_first_match_wins() {
        // "lisse" is a ledger keyword and the ledger row comes first
        assert_eq!(categorize("Lisse de protection"), Category::Ledger);
        // "standard" sits in the upright row ahead of the base-jack row
        assert_eq!(categorize("Embase standard"), Category::Upright);
    }

    #[test]
    fn test_matched_keyword() {
        assert_eq!(
            matched_keyword("Plancher alu 3.07m"),
            Some((Category::Platform, "plancher"))
        );
        assert_eq!(
            matched_keyword("Embase standard"),
            Some((Category::Upright, "standard"))
        );
        assert_eq!(matched_keyword("Widget"), None);
        assert_eq!(matched_keyword(""), None);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("toe-board".parse::<Category>().unwrap(), Category::ToeBoard);
        assert_eq!("base_jack".parse::<Category>().unwrap(), Category::BaseJack);
        assert_eq!("gardeCorps".parse::<Category>().unwrap(), Category::Guardrail);
        assert!("nonsense".parse::<Category>().is_err());
    }

    #[test]
    fn test_keywords_cover_every_real_category() {
        for cat in Category::ALL {
            if cat == Category::Other {
                assert!(cat.keywords().is_empty());
            } else {
                assert!(!cat.keywords().is_empty(), "{} has no keywords", cat);
            }
        }
    }

    #[test]
    fn test_group_by_category() {
        let parts = vec![
            Part::new(1, "Poteau 2m", 10),
            Part::new(2, "Moise 1.09m", 5),
            Part::new(3, "Poteau 3m", 4),
            Part::new(4, "Widget", 1),
        ];
        let groups = group_by_category(&parts);
        assert_eq!(groups[&Category::Upright].len(), 2);
        assert_eq!(groups[&Category::Upright][1].id, 3);
        assert_eq!(groups[&Category::Ledger].len(), 1);
        assert_eq!(groups[&Category::Other].len(), 1);
        assert!(!groups.contains_key(&Category::Shim));
    }
}
