//! Glint CLI
//!
//! Inspect how text is decomposed and watch reveals play out frame by frame.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glint_animation::Easing;
use glint_core::{Document, NodeId, Rect, StyleProperty};
use glint_effects::text_reveal::{collapse_whitespace, decompose};
use glint_effects::{EffectsConfig, Page, TextRevealController};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

/// Where the simulated element sits, below the initial viewport
const ELEMENT_BOUNDS: Rect = Rect::new(0.0, 1200.0, 640.0, 48.0);

const MAX_FRAMES: usize = 10_000;

#[derive(Parser)]
#[command(name = "glint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glint text effects CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how text is split into words and letters
    Split {
        /// Text to split
        text: String,
    },

    /// Reveal text on a simulated page and print letter weights per frame
    Simulate {
        /// Text to reveal
        text: String,

        /// Effects configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Letter easing curve, e.g. `power2.out` (overrides the config)
        #[arg(long)]
        ease: Option<Easing>,

        /// Make the element a link so it replays on hover
        #[arg(long)]
        link: bool,

        /// Number of hover replays after the reveal
        #[arg(long, default_value = "0")]
        hover: u32,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,
    },

    /// Print the default effects configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Split { text } => cmd_split(&text),

        Commands::Simulate {
            text,
            config,
            ease,
            link,
            hover,
            fps,
        } => cmd_simulate(&text, config.as_deref(), ease, link, hover, fps),

        Commands::Config => cmd_config(),
    }
}

fn cmd_split(text: &str) -> Result<()> {
    let mut document = Document::new();
    let element = document.create_element("p");
    let words = decompose(&mut document, element, text)?;

    println!("text:      {:?}", text);
    println!("collapsed: {:?}", collapse_whitespace(text));
    println!("words:     {}", words.len());
    for (index, word) in words.iter().enumerate() {
        let letters: Vec<String> = word
            .letters
            .iter()
            .map(|l| {
                if l.is_placeholder {
                    "&nbsp;".to_string()
                } else {
                    l.glyph.to_string()
                }
            })
            .collect();
        println!(
            "  [{index}] {:<16} {} letter(s): {}",
            format!("{:?}", word.text()),
            word.glyphs().count(),
            letters.join(" ")
        );
    }
    Ok(())
}

fn cmd_simulate(
    text: &str,
    config_path: Option<&Path>,
    ease: Option<Easing>,
    link: bool,
    hover: u32,
    fps: u32,
) -> Result<()> {
    if fps == 0 {
        anyhow::bail!("--fps must be greater than zero");
    }
    let frame_ms = 1000.0 / fps as f32;

    let mut config = match config_path {
        Some(path) => EffectsConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EffectsConfig::default(),
    };
    if let Some(ease) = ease {
        config.text_reveal.animation.letter_ease = ease;
    }

    let mut document = Document::new();
    let element = document.create_element(if link { "a" } else { "p" });
    document.set_attribute(element, &config.text_reveal.marker_attribute, "")?;
    document.set_text_content(element, text)?;
    document.set_bounds(element, ELEMENT_BOUNDS)?;
    let root = document.root();
    document.append_child(root, element)?;

    let mut page = Page::new(document, VIEWPORT).with_config(&config);
    page.ready();
    println!("ready     {}", render(&page, element));

    info!("Scrolling element into view");
    page.scroll_to(ELEMENT_BOUNDS.y() - VIEWPORT.height() / 2.0);
    play(&mut page, element, frame_ms)?;

    if hover > 0 && !link {
        info!("Element is not a link; hover has no effect");
    }
    for n in 1..=hover {
        let event = page.pointer_enter(element);
        info!(
            "Hover {} (default prevented: {})",
            n,
            event.is_default_prevented()
        );
        play(&mut page, element, frame_ms)?;
    }

    Ok(())
}

/// Advance frames until idle, printing the element after each
fn play(page: &mut Page, element: NodeId, frame_ms: f32) -> Result<()> {
    let mut elapsed = 0.0;
    let mut frames = 0;
    while page.is_animating() {
        if frames >= MAX_FRAMES {
            anyhow::bail!("animation did not settle after {} frames", MAX_FRAMES);
        }
        page.advance(frame_ms);
        elapsed += frame_ms;
        frames += 1;
        println!("{:>7.1}ms {}", elapsed, render(page, element));
    }
    info!("Settled after {} frame(s)", frames);
    Ok(())
}

/// One line per state: letters at or above half opacity are drawn, the rest
/// are shown as `.`, followed by the mean weight
fn render(page: &Page, element: NodeId) -> String {
    let Some(target) = page
        .effect::<TextRevealController>()
        .and_then(|reveal| reveal.target(element))
    else {
        return String::from("(not a reveal target)");
    };

    let mut line = String::new();
    let mut total = 0.0;
    let mut count = 0;
    for (index, word) in target.words.iter().enumerate() {
        if index > 0 {
            line.push(' ');
        }
        for letter in word.glyphs() {
            let weight = page
                .document()
                .style_value(letter.node, StyleProperty::Opacity)
                .unwrap_or(0.0);
            total += weight;
            count += 1;
            line.push(if weight >= 0.5 { letter.glyph } else { '.' });
        }
    }

    let mean = if count == 0 { 1.0 } else { total / count as f32 };
    format!("{line:<32} {:>3.0}%", mean * 100.0)
}

fn cmd_config() -> Result<()> {
    let config = EffectsConfig::default();
    let text = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    print!("{text}");
    Ok(())
}
