//! Heuristic performance score.
//!
//! Base 50 plus fixed bonuses, capped at 100. Pure; same text in, same
//! score out.

use crate::types::creative::Creative;

pub const BASE_SCORE: u32 = 50;
pub const MAX_SCORE: u32 = 100;

const STRONG_CTA_VERBS: &[&str] = &["buy", "shop", "get", "start", "try"];

pub fn predict_performance_score(creative: &Creative) -> u32 {
    let mut score = BASE_SCORE;

    let headline = creative.headline.as_str();
    if !headline.is_empty() {
        if headline.chars().count() <= 40 {
            score += 10;
        }
        if headline.contains(['!', '?']) {
            score += 5;
        }
        if headline.split(' ').count() <= 8 {
            score += 5;
        }
    }

    let body = creative.body_copy.as_str();
    if !body.is_empty() {
        if (50..=150).contains(&body.chars().count()) {
            score += 10;
        }
        // direct address, case-sensitive
        if body.contains("you") {
            score += 5;
        }
    }

    let cta = creative.call_to_action.as_str();
    if !cta.is_empty() {
        score += 10;
        let lower = cta.to_lowercase();
        if STRONG_CTA_VERBS.iter().any(|verb| lower.contains(verb)) {
            score += 5;
        }
    }

    if creative.visual.image_prompt.chars().count() > 50 {
        score += 10;
    }

    score.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::creative::Visual;
    use proptest::prelude::*;

    fn creative(headline: &str, body: &str, cta: &str, image_prompt: &str) -> Creative {
        Creative {
            platform: "instagram_feed".into(),
            name: None,
            headline: headline.into(),
            subheadline: None,
            body_copy: body.into(),
            call_to_action: cta.into(),
            hashtags: vec![],
            visual: Visual {
                style: "modern".into(),
                layout_type: "instagram_feed".into(),
                image_prompt: image_prompt.into(),
                color_scheme: vec![],
                image_url: None,
            },
            target_emotions: vec!["engagement".into()],
            performance_score: 0,
            tokens_used: 0,
            variation_id: "v1".into(),
        }
    }

    #[test]
    fn test_every_bonus_clamps_to_100() {
        let c = creative(
            "Energy you can taste!",
            "Start every morning with organic green tea that keeps you sharp all day long.",
            "Shop Now",
            "A steaming cup of green tea on a sunlit desk beside an open laptop and notebook",
        );
        // 50 + 10 + 5 + 5 + 10 + 5 + 10 + 5 + 10 = 110
        assert_eq!(predict_performance_score(&c), 100);
    }

    #[test]
    fn test_sparse_creative() {
        let long_headline = "An extremely long headline that keeps going well past the forty character mark";
        let c = creative(long_headline, "Short.", "Learn More", "tiny");
        // only the CTA presence bonus applies
        assert_eq!(predict_performance_score(&c), 60);
    }

    #[test]
    fn test_you_is_case_sensitive() {
        let body_upper = "YOU will love this tea, brewed fresh every single morning for the office.";
        let body_lower = "you will love this tea, brewed fresh every single morning for the office.";
        let long_headline = "An extremely long headline that keeps going well past the forty character mark";

        let a = predict_performance_score(&creative(long_headline, body_upper, "Learn More", ""));
        let b = predict_performance_score(&creative(long_headline, body_lower, "Learn More", ""));
        assert_eq!(b, a + 5);
    }

    #[test]
    fn test_strong_cta_any_case() {
        let long_headline = "An extremely long headline that keeps going well past the forty character mark";
        let weak = predict_performance_score(&creative(long_headline, "", "Learn More", ""));
        let strong = predict_performance_score(&creative(long_headline, "", "GET YOURS", ""));
        assert_eq!(strong, weak + 5);
    }

    proptest! {
        #[test]
        fn prop_score_in_range_and_deterministic(
            headline in ".{0,80}",
            body in ".{0,200}",
            cta in ".{0,30}",
            prompt in ".{0,120}",
        ) {
            let c = creative(&headline, &body, &cta, &prompt);
            let first = predict_performance_score(&c);
            let second = predict_performance_score(&c.clone());

            prop_assert!((BASE_SCORE..=MAX_SCORE).contains(&first));
            prop_assert_eq!(first, second);
        }
    }
}
