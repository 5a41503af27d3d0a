//! Heuristic keyword and tone analysis of product text.
//!
//! Pure and deterministic. Matching is a case-insensitive substring test and
//! results follow vocabulary order, not input order.

use serde::{Deserialize, Serialize};

use crate::types::product::Tone;

pub const FEATURE_KEYWORDS: &[&str] = &[
    "organic",
    "natural",
    "premium",
    "handmade",
    "certified",
    "sustainable",
];

pub const BENEFIT_KEYWORDS: &[&str] = &[
    "energy", "focus", "health", "wellness", "improve", "boost", "enhance",
];

pub const FORMAL_WORDS: &[&str] = &["premium", "professional", "exclusive", "luxury"];

pub const CASUAL_WORDS: &[&str] = &["awesome", "cool", "fun", "easy"];

/// Keywords and tone found in a product description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub features: Vec<String>,
    pub benefits: Vec<String>,
    pub tone: Tone,
}

pub fn analyze_product_text(description: &str) -> TextAnalysis {
    let lower = description.to_lowercase();

    TextAnalysis {
        features: matching(&lower, FEATURE_KEYWORDS),
        benefits: matching(&lower, BENEFIT_KEYWORDS),
        tone: detect_tone(description),
    }
}

/// More formal hits ⇒ professional, more casual hits ⇒ casual, tie ⇒ friendly.
pub fn detect_tone(text: &str) -> Tone {
    let lower = text.to_lowercase();
    let formal = hits(&lower, FORMAL_WORDS);
    let casual = hits(&lower, CASUAL_WORDS);

    match formal.cmp(&casual) {
        std::cmp::Ordering::Greater => Tone::Professional,
        std::cmp::Ordering::Less => Tone::Casual,
        std::cmp::Ordering::Equal => Tone::Friendly,
    }
}

fn matching(lower: &str, vocabulary: &[&str]) -> Vec<String> {
    vocabulary
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect()
}

fn hits(lower: &str, vocabulary: &[&str]) -> usize {
    vocabulary.iter().filter(|w| lower.contains(*w)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tea_description() {
        let analysis = analyze_product_text("Premium organic green tea that boosts energy");

        assert_eq!(analysis.features, vec!["organic", "premium"]);
        assert_eq!(analysis.benefits, vec!["energy", "boost"]);
        assert_eq!(analysis.tone, Tone::Professional);
    }

    #[test]
    fn test_casual_tone() {
        assert_eq!(detect_tone("An awesome, fun and easy gadget"), Tone::Casual);
    }

    #[test]
    fn test_tie_is_friendly() {
        assert_eq!(detect_tone("Luxury but fun"), Tone::Friendly);
        assert_eq!(detect_tone(""), Tone::Friendly);
    }

    #[test]
    fn test_case_insensitive() {
        let analysis = analyze_product_text("HANDMADE and CERTIFIED for WELLNESS");
        assert_eq!(analysis.features, vec!["handmade", "certified"]);
        assert_eq!(analysis.benefits, vec!["wellness"]);
    }

    proptest! {
        #[test]
        fn prop_no_keywords_means_empty_and_friendly(text in "[qxzjkvwy ]{0,64}") {
            let analysis = analyze_product_text(&text);
            prop_assert!(analysis.features.is_empty());
            prop_assert!(analysis.benefits.is_empty());
            prop_assert_eq!(analysis.tone, Tone::Friendly);
        }

        #[test]
        fn prop_output_is_drawn_from_vocabulary(text in ".{0,128}") {
            let analysis = analyze_product_text(&text);
            for f in &analysis.features {
                prop_assert!(FEATURE_KEYWORDS.contains(&f.as_str()));
            }
            for b in &analysis.benefits {
                prop_assert!(BENEFIT_KEYWORDS.contains(&b.as_str()));
            }
        }
    }
}
