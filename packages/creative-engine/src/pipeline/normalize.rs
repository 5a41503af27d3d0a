//! Provider output to canonical [`Creative`].
//!
//! Providers drift in field naming between prompt revisions and platform
//! families. Each canonical field has an ordered list of dotted JSON paths
//! (numeric segments index arrays) ending in a literal default. Supporting a
//! new response shape means adding a path, not a branch.
//!
//! Normalization is total over JSON objects: a sparse object always yields a
//! creative with non-empty headline, body copy and call to action.

use serde_json::Value;
use uuid::Uuid;

use crate::error::{GenerationError, GenerationResultOf, NormalizationError};
use crate::types::creative::{Creative, Visual};
use crate::types::platform::PlatformSpec;

/// A canonical text field: synonym paths in priority order plus a default.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    pub paths: &'static [&'static str],
    pub default: &'static str,
}

pub const HEADLINE: TextField = TextField {
    paths: &[
        "headline",
        "title",
        "slides.0.headline",
        "cards.0.headline",
        "sizes.0.headline",
    ],
    default: "Generated Ad",
};

pub const BODY_COPY: TextField = TextField {
    paths: &[
        "bodyCopy",
        "description",
        "cards.0.bodyCopy",
        "slides.0.subtext",
    ],
    default: "Generated ad copy",
};

pub const CALL_TO_ACTION: TextField = TextField {
    paths: &[
        "callToAction",
        "ctaText",
        "cta",
        "cards.0.ctaText",
        "sizes.0.ctaText",
    ],
    default: "Learn More",
};

pub const VISUAL_STYLE: TextField = TextField {
    paths: &[
        "layout.style",
        "visualStyle",
        "designSuggestions.visualStyle",
    ],
    default: "modern",
};

pub const IMAGE_PROMPT: TextField = TextField {
    paths: &[
        "visualDescription",
        "imagePrompt",
        "designSuggestions.imagePrompt",
        "slides.0.visualDescription",
        "cards.0.visualDescription",
    ],
    default: "Product image with modern design",
};

/// Optional text fields have no default.
pub const SUBHEADLINE_PATHS: &[&str] = &["subheadline", "sizes.0.subheadline"];

/// Layout falls back to the platform identifier, not a literal.
pub const LAYOUT_TYPE_PATHS: &[&str] = &[
    "layout.composition",
    "layoutType",
    "designSuggestions.layoutType",
    "layout",
    "cards.0.layout",
];

pub const COLOR_PATHS: &[&str] = &[
    "colors",
    "designSuggestions.colorScheme",
    "sizes.0.colors",
];

pub const DEFAULT_COLORS: &[&str] = &["#667eea", "#764ba2"];

pub const DEFAULT_EMOTION: &str = "engagement";

/// Platform-side inputs to normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub platform: &'a str,
    /// Body copy is cut to this many characters
    pub body_limit: Option<usize>,
    /// Used when the variation names no colors (product palette)
    pub fallback_colors: &'a [String],
    /// Tokens billed for the call that produced the variation
    pub tokens_used: u32,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(platform: &'a str) -> Self {
        Self {
            platform,
            body_limit: None,
            fallback_colors: &[],
            tokens_used: 0,
        }
    }

    pub fn for_spec(spec: &'a PlatformSpec) -> Self {
        Self {
            body_limit: spec.body_limit(),
            ..Self::new(&spec.id)
        }
    }

    pub fn with_colors(mut self, colors: &'a [String]) -> Self {
        self.fallback_colors = colors;
        self
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens_used = tokens;
        self
    }

    pub fn with_body_limit(mut self, limit: Option<usize>) -> Self {
        self.body_limit = limit;
        self
    }
}

/// Split a provider response into per-variation payloads, provider order.
///
/// Accepts `{"variations": [...]}`, a bare array, or a single object. At
/// most `max` payloads are returned.
pub fn split_variations(response: &Value, max: usize) -> Vec<&Value> {
    let all: Vec<&Value> = match response {
        Value::Object(map) => match map.get("variations") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![response],
        },
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    all.into_iter().take(max).collect()
}

/// Creatives from one provider response plus the variations that were rejected.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub creatives: Vec<Creative>,
    pub rejected: Vec<NormalizationError>,
}

/// Normalize every variation of a response, provider order.
///
/// A response with no variations at all is `EmptyResponse`; individual
/// rejects are returned alongside the creatives that did normalize.
pub fn normalize_response(
    response: &Value,
    ctx: &NormalizeContext<'_>,
    max: usize,
) -> GenerationResultOf<NormalizedBatch> {
    let variations = split_variations(response, max);
    if variations.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let mut batch = NormalizedBatch::default();
    for raw in variations {
        match normalize_variation(raw, ctx) {
            Ok(creative) => batch.creatives.push(creative),
            Err(e) => batch.rejected.push(e),
        }
    }
    Ok(batch)
}

/// Map one variation onto the canonical schema.
///
/// Fails only when `raw` is not a JSON object. The performance score is
/// left at zero for the scorer.
pub fn normalize_variation(raw: &Value, ctx: &NormalizeContext<'_>) -> Result<Creative, NormalizationError> {
    if !raw.is_object() {
        return Err(NormalizationError::NotAnObject {
            found: json_kind(raw),
        });
    }

    let mut body_copy = resolve_text(raw, &BODY_COPY);
    if let Some(limit) = ctx.body_limit {
        body_copy = truncate_chars(&body_copy, limit);
    }

    let visual = Visual {
        style: resolve_text(raw, &VISUAL_STYLE),
        layout_type: first_string(raw, LAYOUT_TYPE_PATHS).unwrap_or_else(|| ctx.platform.to_string()),
        image_prompt: resolve_text(raw, &IMAGE_PROMPT),
        color_scheme: resolve_colors(raw, ctx.fallback_colors),
        image_url: None,
    };

    Ok(Creative {
        platform: ctx.platform.to_string(),
        name: first_string(raw, &["name"]),
        headline: resolve_text(raw, &HEADLINE),
        subheadline: first_string(raw, SUBHEADLINE_PATHS),
        body_copy,
        call_to_action: resolve_text(raw, &CALL_TO_ACTION),
        hashtags: string_list(lookup(raw, "hashtags")).unwrap_or_default(),
        visual,
        target_emotions: resolve_emotions(raw),
        performance_score: 0,
        tokens_used: ctx.tokens_used,
        variation_id: resolve_variation_id(raw),
    })
}

/// Follow a dotted path through objects and arrays.
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn resolve_text(raw: &Value, field: &TextField) -> String {
    first_string(raw, field.paths).unwrap_or_else(|| field.default.to_string())
}

/// First path holding a non-blank string.
pub fn first_string(raw: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup(raw, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Non-blank strings of an array, or the values of an object.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Object(map) => map
            .values()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };
    Some(items)
}

fn resolve_colors(raw: &Value, fallback: &[String]) -> Vec<String> {
    COLOR_PATHS
        .iter()
        .find_map(|path| string_list(lookup(raw, path)).filter(|c| !c.is_empty()))
        .or_else(|| (!fallback.is_empty()).then(|| fallback.to_vec()))
        .unwrap_or_else(|| DEFAULT_COLORS.iter().map(|c| c.to_string()).collect())
}

/// `targetEmotion` string, then `targetEmotions` list, then "engagement".
fn resolve_emotions(raw: &Value) -> Vec<String> {
    if let Some(emotion) = first_string(raw, &["targetEmotion"]) {
        return vec![emotion];
    }
    string_list(lookup(raw, "targetEmotions"))
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_EMOTION.to_string()])
}

fn resolve_variation_id(raw: &Value) -> String {
    match lookup(raw, "id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => short_id(),
    }
}

/// Random 9-character identifier.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(9);
    id
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
