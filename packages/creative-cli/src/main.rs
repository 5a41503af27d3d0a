//! Ad creative generator CLI
//!
//! Prints results as JSON on stdout; progress and summaries go to stderr.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use creative_engine::{
    record_generation, AdRequest, CreativeStore, Customization, GenerationClient,
    GenerationResult, HttpFetcher, ImageBrief, ImageStyle, InputType, LayoutType,
    MemoryCreativeStore, MemoryQuotaStore, OpenAIProvider, Pipeline, PlatformCatalog, Tone,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Account the CLI runs as
const LOCAL_USER: &str = "local";

#[derive(Parser)]
#[command(name = "adgen")]
#[command(about = "Generate platform-specific ad creatives for a product")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate creatives for one or more platforms
    Generate {
        /// Product page to enrich from
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value = "")]
        audience: String,

        /// Repeat for several platforms
        #[arg(long = "platform")]
        platforms: Vec<String>,

        #[arg(long)]
        tone: Option<Tone>,

        /// Variations per platform
        #[arg(long)]
        variations: Option<usize>,

        /// Benefit the copy should lead with
        #[arg(long)]
        focus: Option<String>,

        /// Render an image for every creative
        #[arg(long)]
        images: bool,
    },

    /// Scrape and analyze a product page without generating
    Preview { url: String },

    /// Render a product image
    Image {
        #[arg(long)]
        prompt: String,

        #[arg(long, default_value = "instagram_feed")]
        platform: String,

        #[arg(long, default_value = "modern")]
        style: String,

        #[arg(long, default_value = "product_centered")]
        layout: String,

        /// One image per style instead of a single render
        #[arg(long)]
        all_styles: bool,
    },

    /// List supported platforms
    Platforms,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so stdout stays valid JSON)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,creative_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Platforms => {
            list_platforms();
            Ok(())
        }
        Commands::Generate {
            url,
            name,
            description,
            audience,
            platforms,
            tone,
            variations,
            focus,
            images,
        } => {
            let request = AdRequest {
                input_type: if url.is_some() {
                    InputType::Url
                } else {
                    InputType::Text
                },
                url,
                product_name: name,
                product_description: description,
                target_audience: audience,
                platforms,
                tone,
                customization: Customization {
                    variations,
                    tone: None,
                    focus_benefit: focus,
                    generate_images: images.then_some(true),
                },
            };
            generate(Config::from_env()?, request).await
        }
        Commands::Preview { url } => preview(Config::from_env()?, &url).await,
        Commands::Image {
            prompt,
            platform,
            style,
            layout,
            all_styles,
        } => {
            let brief = ImageBrief::new(prompt, platform)
                .with_style(ImageStyle::from_name(&style))
                .with_layout(LayoutType::from_name(&layout));
            image(Config::from_env()?, brief, all_styles).await
        }
    }
}

fn build_pipeline(config: &Config) -> Result<Pipeline<OpenAIProvider, MemoryQuotaStore, HttpFetcher>> {
    let quota = Arc::new(MemoryQuotaStore::new().with_account(LOCAL_USER, config.default_credits));
    let fetcher = HttpFetcher::with_timeout(config.pipeline.scrape_timeout)
        .context("Failed to build HTTP client")?;
    let provider = OpenAIProvider::new(config.credentials.clone());

    Ok(Pipeline::new(provider, quota, fetcher)?.with_config(config.pipeline.clone()))
}

async fn generate(config: Config, request: AdRequest) -> Result<()> {
    let pipeline = build_pipeline(&config)?;

    info!(
        input = ?request.input_type,
        url = request.url.as_deref().unwrap_or(""),
        platforms = ?request.platforms,
        "Starting generation"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling generation");
            on_interrupt.cancel();
        }
    });

    let result = pipeline
        .generate(LOCAL_USER, &request, &cancel)
        .await
        .context("Generation failed")?;

    if !result.failures.is_empty() {
        warn!(failed = result.failures.len(), "Some platforms failed");
    }
    info!(
        creatives = result.len(),
        credits_remaining = result.credits_remaining,
        "Generation complete"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    print_summary(&result);

    let library = MemoryCreativeStore::new();
    record_generation(&library, LOCAL_USER, &result).await?;
    let stats = library.stats(LOCAL_USER).await?;
    eprintln!(
        "{} {} recorded, average score {:.1}",
        "Library:".bright_blue(),
        stats.total,
        stats.average_performance_score
    );

    Ok(())
}

fn print_summary(result: &GenerationResult) {
    eprintln!("{}", format!("✅ {}", result.summary()).bright_green().bold());

    for (platform, creatives) in &result.creatives {
        eprintln!("  {}", platform.bright_cyan());
        for creative in creatives {
            eprintln!(
                "    [{}] {} - {}",
                creative.performance_score.to_string().bright_yellow(),
                creative.headline,
                creative.call_to_action.dimmed()
            );
        }
    }

    for failure in &result.failures {
        eprintln!(
            "  {} {} ({:?}): {}",
            "⚠".yellow(),
            failure.platform,
            failure.kind,
            failure.message
        );
    }

    eprintln!(
        "{} {} tokens, {} credit(s) left",
        "Usage:".bright_blue(),
        result.metadata.total_tokens_used,
        result.credits_remaining
    );
}

async fn preview(config: Config, url: &str) -> Result<()> {
    let pipeline = build_pipeline(&config)?;
    info!(url = %url, "Previewing product page");
    let preview = pipeline
        .preview_url(url)
        .await
        .with_context(|| format!("Failed to read {}", url))?;

    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

async fn image(config: Config, brief: ImageBrief, all_styles: bool) -> Result<()> {
    let client = GenerationClient::new(OpenAIProvider::new(config.credentials))?;
    info!(platform = %brief.platform, all_styles, "Rendering product image");

    if all_styles {
        let variations = client
            .generate_image_variations(&brief, &ImageStyle::ALL)
            .await
            .context("Image generation failed")?;
        println!("{}", serde_json::to_string_pretty(&variations)?);
    } else {
        let image = client
            .generate_image(&brief)
            .await
            .context("Image generation failed")?;
        println!("{}", serde_json::to_string_pretty(&image)?);
    }

    Ok(())
}

fn list_platforms() {
    let catalog = PlatformCatalog::builtin();
    for id in catalog.ids() {
        if let Some(spec) = catalog.get(id) {
            println!(
                "{:<20} {:<28} {}",
                id.bright_cyan(),
                spec.dimensions.to_string(),
                spec.recommended.dimmed()
            );
        }
    }
}
