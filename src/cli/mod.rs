//! Command-line interface for gizzdex.
//!
//! Provides commands for listing and inspecting album content, picking a
//! random album, computing slugs, scaffolding new albums and watching the
//! content directory.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::slug::to_identifier;
use crate::library::scaffold::{self, NewAlbum};
use crate::library::{CachedIndex, ContentRecord};

/// gizzdex - album content index for a discography site
#[derive(Parser, Debug)]
#[command(name = "gizzdex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List albums in display order
    List {
        /// Category to list (defaults to the configured category)
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of albums to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Newest first
        #[arg(short, long)]
        reverse: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one album
    Show {
        /// Album slug (e.g. "nonagon-infinity")
        slug: String,

        #[arg(short, long)]
        category: Option<String>,

        /// Print the body text as well
        #[arg(short, long)]
        body: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Pick a random album slug
    Random {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Convert a title to its slug
    Slug {
        /// Title words
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Create a new album content file
    New {
        /// Album title
        #[arg(short, long)]
        title: String,

        /// URL slug (derived from the title if not given)
        #[arg(short, long)]
        slug: Option<String>,

        /// Bandcamp embed code
        #[arg(short = 'b', long)]
        bandcamp_code: Option<u64>,

        /// Recommendation as "Album Name=why" (repeatable)
        #[arg(short, long = "next")]
        next: Vec<String>,

        /// Description placed under the heading
        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long)]
        category: Option<String>,
    },

    /// Watch the content directory and report changes
    Watch {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::config()?;

        match self.command {
            Commands::List {
                category,
                limit,
                reverse,
                json,
            } => list_albums(config, category.as_deref(), limit, reverse, json).await,
            Commands::Show {
                slug,
                category,
                body,
                json,
            } => show_album(config, &slug, category.as_deref(), body, json).await,
            Commands::Random { category } => random_album(config, category.as_deref()).await,
            Commands::Slug { text } => {
                println!("{}", to_identifier(&text.join(" ")));
                Ok(())
            }
            Commands::New {
                title,
                slug,
                bandcamp_code,
                next,
                description,
                category,
            } => {
                let album = NewAlbum {
                    title,
                    slug,
                    bandcamp_code,
                    next_albums: parse_next_albums(&next)?,
                    description,
                };
                new_album(config, category.as_deref(), &album).await
            }
            Commands::Watch { category } => watch(config, category.as_deref()).await,
            Commands::Config => show_config(config),
        }
    }
}

/// List albums in a category
async fn list_albums(
    config: &ResolvedConfig,
    category: Option<&str>,
    limit: Option<usize>,
    reverse: bool,
    json: bool,
) -> Result<()> {
    let category = config.category(category);
    let mut summaries = config.index().summaries(category).await;

    if reverse {
        summaries.reverse();
    }
    if let Some(limit) = limit {
        summaries.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No albums found in '{}'", category);
        return Ok(());
    }

    println!("{:<6} {:<45} {}", "INDEX", "SLUG", "TITLE");
    println!("{}", "-".repeat(80));

    for summary in summaries {
        let index = summary
            .index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<6} {:<45} {}", index, summary.slug, summary.title);
    }

    Ok(())
}

/// Show details of one album
async fn show_album(
    config: &ResolvedConfig,
    slug: &str,
    category: Option<&str>,
    show_body: bool,
    json: bool,
) -> Result<()> {
    let category = config.category(category);
    let index = config.index();

    let record = index
        .get_one(category, slug)
        .await
        .with_context(|| format!("Album '{}' exists but could not be loaded", slug))?;

    let Some(record) = record else {
        anyhow::bail!("Album '{}' not found in '{}'", slug, category);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record);

    let recommendations = index.recommendations(category, &record).await;
    if !recommendations.is_empty() {
        println!("\nUp next:");
        for rec in recommendations {
            let marker = if rec.available { "" } else { " (missing)" };
            println!("  /{}/{}{} - {}", category, rec.slug, marker, rec.description);
        }
    }

    if show_body {
        println!("\n{}", record.body.trim());
    }

    Ok(())
}

fn print_record(record: &ContentRecord) {
    let fm = &record.frontmatter;

    println!("Title: {}", fm.title);
    println!("Slug: {}", record.slug);
    if let Some(index) = fm.index {
        println!("Index: {}", index);
    }
    if let Some(date) = fm.release_date {
        println!("Released: {}", date);
    }
    if let Some(code) = fm.bandcamp_code {
        println!("Bandcamp code: {}", code);
    }
    for (label, link) in [
        ("Bandcamp", &fm.bandcamp_link),
        ("Spotify", &fm.spotify_link),
        ("YouTube", &fm.youtube_link),
    ] {
        if let Some(link) = link {
            println!("{}: {}", label, link);
        }
    }
    if !fm.extra.is_empty() {
        let keys: Vec<_> = fm.extra.keys().map(String::as_str).collect();
        println!("Other fields: {}", keys.join(", "));
    }
}

/// Print a random album slug
async fn random_album(config: &ResolvedConfig, category: Option<&str>) -> Result<()> {
    let category = config.category(category);
    let slug = config
        .index()
        .random_slug(category, &mut rand::thread_rng())
        .await
        .with_context(|| format!("No albums available in '{}'", category))?;

    println!("{}", slug);
    Ok(())
}

/// Create a new album file
async fn new_album(config: &ResolvedConfig, category: Option<&str>, album: &NewAlbum) -> Result<()> {
    let category = config.category(category);
    let path = scaffold::scaffold(&config.index(), category, album).await?;

    println!("Created {}", path.display());
    println!(
        "Don't forget the album cover: public/{}.jpg",
        album.resolve_slug()?
    );
    Ok(())
}

/// Parse repeated `--next "Name=why"` arguments
fn parse_next_albums(values: &[String]) -> Result<Vec<(String, String)>> {
    values
        .iter()
        .map(|value| {
            let (name, why) = value
                .split_once('=')
                .with_context(|| format!("Invalid --next value {:?}: expected NAME=DESCRIPTION", value))?;
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("Invalid --next value {:?}: album name is empty", value);
            }
            Ok((name.to_string(), why.trim().to_string()))
        })
        .collect()
}

/// Watch content and print the refreshed listing after each change
async fn watch(config: &ResolvedConfig, category: Option<&str>) -> Result<()> {
    let category = config.category(category).to_string();
    let cache = Arc::new(CachedIndex::new(config.index()));

    println!(
        "{} albums in '{}'",
        cache.list_all(&category).await.len(),
        category
    );

    let (mut changes, handle) = config.watcher().watch(Arc::clone(&cache))?;
    eprintln!("Watching {} (Ctrl-C to stop)", config.content_root.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => {
                let Some(change) = change else { break };
                if change.category != category {
                    continue;
                }
                for path in &change.paths {
                    println!("changed: {}", path.display());
                }
                println!(
                    "{} albums in '{}'",
                    cache.list_all(&category).await.len(),
                    category
                );
            }
        }
    }

    handle.stop().await
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Content root: {}", config.content_root.display());
    println!("Extension: .{}", config.extension);
    println!("Default category: {}", config.default_category);
    println!("Watch debounce: {} ms", config.debounce.as_millis());
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    Ok(())
}
