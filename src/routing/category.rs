//! Semantic categories and their keyword rules.
//!
//! Each category owns a fixed, ordered list of experts. Tokens are
//! classified by the first matching keyword rule; rules are unanchored
//! substring patterns, so `"cat"` lands in `Language` through its `"a"`.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ExpertIndex;

/// Expert specialization buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticCategory {
    /// Numbers and arithmetic
    Math,
    /// Function words and general language
    Language,
    /// Visual/spatial
    Vision,
    /// Logical reasoning
    Logic,
    /// Code understanding
    Code,
    /// Memory/context
    Memory,
    /// Audio processing
    Audio,
    /// General reasoning
    Reasoning,
}

impl SemanticCategory {
    /// All categories in table order. Secondary picks index into this order.
    pub const ALL: [SemanticCategory; 8] = [
        SemanticCategory::Math,
        SemanticCategory::Language,
        SemanticCategory::Vision,
        SemanticCategory::Logic,
        SemanticCategory::Code,
        SemanticCategory::Memory,
        SemanticCategory::Audio,
        SemanticCategory::Reasoning,
    ];

    /// Experts owned by this category, in rotation order
    pub fn experts(self) -> &'static [ExpertIndex] {
        match self {
            SemanticCategory::Math => &[8, 16, 24],
            SemanticCategory::Language => &[1, 9, 17, 25],
            SemanticCategory::Vision => &[2, 10, 18, 26],
            SemanticCategory::Logic => &[3, 11, 19, 27],
            SemanticCategory::Code => &[4, 12, 20, 28],
            SemanticCategory::Memory => &[5, 13, 21, 29],
            SemanticCategory::Audio => &[6, 14, 22, 30],
            SemanticCategory::Reasoning => &[7, 15, 23, 31],
        }
    }

    /// Short display label
    pub fn label(self) -> &'static str {
        match self {
            SemanticCategory::Math => "Math",
            SemanticCategory::Language => "Lang",
            SemanticCategory::Vision => "Vision",
            SemanticCategory::Logic => "Logic",
            SemanticCategory::Code => "Code",
            SemanticCategory::Memory => "Memory",
            SemanticCategory::Audio => "Audio",
            SemanticCategory::Reasoning => "Reasoning",
        }
    }

    /// Classify text by the first matching keyword rule.
    pub fn classify(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(regex, _)| regex.is_match(&lower))
            .map(|(_, rule)| rule.category)
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticCategory::Math => write!(f, "math"),
            SemanticCategory::Language => write!(f, "language"),
            SemanticCategory::Vision => write!(f, "vision"),
            SemanticCategory::Logic => write!(f, "logic"),
            SemanticCategory::Code => write!(f, "code"),
            SemanticCategory::Memory => write!(f, "memory"),
            SemanticCategory::Audio => write!(f, "audio"),
            SemanticCategory::Reasoning => write!(f, "reasoning"),
        }
    }
}

/// Display label for an expert slot in the grid.
pub fn expert_label(index: ExpertIndex) -> &'static str {
    SemanticCategory::ALL[index % SemanticCategory::ALL.len()].label()
}

/// A keyword rule mapping lowercase text to a category
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Category assigned on match
    pub category: SemanticCategory,
    /// Regex pattern, applied to lowercased text
    pub pattern: &'static str,
}

/// Classification rules in priority order. First match wins.
///
/// `[0-9]` rather than `\d`: only ASCII digits count as numbers.
pub static RULES: &[CategoryRule] = &[
    CategoryRule {
        category: SemanticCategory::Math,
        pattern: r"[0-9]|number|count|calculate|math|sum|add",
    },
    CategoryRule {
        category: SemanticCategory::Vision,
        pattern: r"color|see|look|visual|image|picture",
    },
    CategoryRule {
        category: SemanticCategory::Reasoning,
        pattern: r"think|because|why|reason|logic",
    },
    CategoryRule {
        category: SemanticCategory::Code,
        pattern: r"code|program|function|debug|script",
    },
    CategoryRule {
        category: SemanticCategory::Language,
        pattern: r"the|a|an|is|are|was|were|and|or",
    },
];

lazy_static! {
    /// Compiled classification rules
    static ref CATEGORY_RULES: Vec<(Regex, &'static CategoryRule)> = RULES
        .iter()
        .filter_map(|rule| Regex::new(rule.pattern).ok().map(|r| (r, rule)))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_compile() {
        assert_eq!(CATEGORY_RULES.len(), RULES.len());
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(SemanticCategory::classify("math"), Some(SemanticCategory::Math));
        assert_eq!(SemanticCategory::classify("42"), Some(SemanticCategory::Math));
        assert_eq!(SemanticCategory::classify("xyz123"), Some(SemanticCategory::Math));
        assert_eq!(SemanticCategory::classify("picture"), Some(SemanticCategory::Vision));
        assert_eq!(SemanticCategory::classify("Why"), Some(SemanticCategory::Reasoning));
        assert_eq!(SemanticCategory::classify("DEBUG"), Some(SemanticCategory::Code));
        assert_eq!(SemanticCategory::classify("the"), Some(SemanticCategory::Language));
        // keyword inside a longer word
        assert_eq!(SemanticCategory::classify("country"), Some(SemanticCategory::Math));
    }

    #[test]
    fn test_substring_matching() {
        assert_eq!(SemanticCategory::classify("cat"), Some(SemanticCategory::Language));
        assert_eq!(SemanticCategory::classify("seems"), Some(SemanticCategory::Vision));
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(SemanticCategory::classify(""), None);
        assert_eq!(SemanticCategory::classify("dog"), None);
        assert_eq!(SemanticCategory::classify("hello"), None);
    }

    #[test]
    fn test_non_ascii_digits_are_not_math() {
        // Arabic-Indic digits
        assert_eq!(SemanticCategory::classify("\u{0663}\u{0664}"), None);
    }

    #[test]
    fn test_tables_avoid_shared_expert() {
        for category in SemanticCategory::ALL {
            let experts = category.experts();
            assert!((3..=4).contains(&experts.len()));
            assert!(experts.iter().all(|&e| e != 0 && e < 32));
        }
    }

    #[test]
    fn test_expert_labels() {
        assert_eq!(expert_label(0), "Math");
        assert_eq!(expert_label(1), "Lang");
        assert_eq!(expert_label(15), "Reasoning");
        assert_eq!(expert_label(16), "Math");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SemanticCategory::Reasoning).unwrap();
        assert_eq!(json, "\"reasoning\"");
        assert_eq!(SemanticCategory::Reasoning.to_string(), "reasoning");
    }
}
