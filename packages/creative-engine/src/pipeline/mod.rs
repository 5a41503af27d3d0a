//! Creative pipeline - prompt building, provider calls and post-processing.
//!
//! The pipeline covers:
//! - Prompt construction per platform family
//! - One provider call per platform, run concurrently
//! - Normalization of loosely shaped provider JSON
//! - Heuristic performance scoring
//! - Optional image rendering
//! - Orchestration with quota accounting and cancellation

pub mod generate;
pub mod images;
pub mod normalize;
pub mod orchestrate;
pub mod prompts;
pub mod score;

pub use generate::{
    parse_json_content, GenerationClient, ImageVariation, PlatformResponse, RenderedImage,
};
pub use images::{
    build_professional_prompt, image_size_for, layout_prompt, ImageBrief, ImageStyle, LayoutType,
};
pub use normalize::{
    normalize_response, normalize_variation, split_variations, NormalizeContext, NormalizedBatch,
};
pub use orchestrate::{Pipeline, PipelineStage, UrlPreview};
pub use prompts::{
    build_creative_request, build_prompt, format_improve_prompt, format_variations_prompt,
    CREATIVE_PROMPT, CREATIVE_SYSTEM_PROMPT, IMPROVE_PROMPT, VARIATIONS_PROMPT,
};
pub use score::{predict_performance_score, BASE_SCORE, MAX_SCORE};
