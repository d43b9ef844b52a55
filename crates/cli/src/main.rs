// ABOUTME: CLI that turns a Word HTML export into an outlined static site and JSON records.
// ABOUTME: Optionally relocates images, then writes all_contents.json and one index.html per page.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use roadmap_outline::resource::{load_html, relocate_images, rewrite_image_sources};
use roadmap_outline::{
    records_to_json, render_site, write_site, ContentType, FuzzyTieBreak, Outliner,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Recover the chapter and section outline of an exported document.
#[derive(Parser, Debug)]
#[command(name = "roadmap")]
#[command(about = "Outline a Word HTML export and publish it as pages and JSON", long_about = None)]
struct Args {
    /// Export HTML file.
    input: PathBuf,

    /// Directory pages and the default JSON file are written to.
    #[arg(long, default_value = "site")]
    out: PathBuf,

    /// URL prefix the site is served under.
    #[arg(long, default_value = "")]
    prefix: String,

    /// JSON output path (default: <out>/all_contents.json).
    #[arg(long)]
    json: Option<PathBuf>,

    /// Content format of the JSON records: html, markdown or text.
    #[arg(long, default_value = "html")]
    format: String,

    /// Skip writing HTML pages.
    #[arg(long, default_value_t = false)]
    no_pages: bool,

    /// Move images next to the input into an img/ directory first.
    #[arg(long, default_value_t = false)]
    relocate_images: bool,

    /// Similarity a heading must exceed to match a table-of-contents line.
    #[arg(long)]
    threshold: Option<f64>,

    /// Among fuzzy matches, prefer the lowest qualifying similarity.
    #[arg(long, default_value_t = false)]
    lowest_tie_break: bool,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_format(format: &str) -> Result<ContentType> {
    match format.to_lowercase().as_str() {
        "html" => Ok(ContentType::Html),
        "markdown" | "md" => Ok(ContentType::Markdown),
        "text" | "txt" => Ok(ContentType::Text),
        other => bail!("unsupported format: {}", other),
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let content_type = parse_format(&args.format)?;

    let mut builder = Outliner::builder()
        .path_prefix(&args.prefix)
        .content_type(content_type);
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("--threshold must be between 0 and 1, got {}", threshold);
        }
        builder = builder.fuzzy_threshold(threshold);
    }
    if args.lowest_tie_break {
        builder = builder.fuzzy_tie_break(FuzzyTieBreak::Lowest);
    }
    let outliner = builder.build();

    if args.relocate_images {
        let staging = args
            .input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        relocate_images(staging)
            .with_context(|| format!("relocating images in {}", staging.display()))?;
    }

    let html = load_html(&args.input)?;
    let html = rewrite_image_sources(&html, &outliner.options().path_prefix);
    let outline = outliner
        .outline_html(&html)
        .with_context(|| format!("outlining {}", args.input.display()))?;

    let records = outline.records(outliner.options().content_type);
    let json = records_to_json(&records, !args.compact)?;
    let json_path = args
        .json
        .clone()
        .unwrap_or_else(|| args.out.join("all_contents.json"));
    if let Some(parent) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;
    info!(path = %json_path.display(), records = records.len(), "wrote records");

    if !args.no_pages {
        let pages = render_site(&outline, &outline.site_context());
        write_site(&pages, &args.out)?;
        for page in &pages {
            println!("{}", page.path);
        }
        info!(pages = pages.len(), out = %args.out.display(), "wrote site");
    }

    Ok(())
}
