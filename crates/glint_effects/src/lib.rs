//! Glint Effects
//!
//! Scroll and hover effects for marketing pages, built on the
//! [`glint_core`] document and the [`glint_animation`] tween engine.
//!
//! # Effects
//!
//! - **Text reveal**: marked text fades in letter by letter the first time
//!   it scrolls into view; links replay the reveal on hover
//! - **Border fill**: section borders are activated once visible
//! - **Title lines**: heading lines slide up into place one after another
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{Document, Rect};
//! use glint_effects::{EffectsConfig, Page};
//!
//! let config = EffectsConfig::load("glint.toml")?;
//! let mut page = Page::new(document, Rect::new(0.0, 0.0, 1280.0, 720.0))
//!     .with_config(&config);
//! page.ready();
//!
//! loop {
//!     page.scroll_to(next_scroll_offset());
//!     page.advance(16.0);
//! }
//! ```

pub mod border_fill;
pub mod config;
pub mod effect;
pub mod page;
pub mod text_reveal;
pub mod title_lines;

pub use border_fill::BorderFill;
pub use config::{
    BorderFillConfig, ConfigError, EffectsConfig, LineState, RevealAnimation, RevealConfig,
    TitleLineConfig,
};
pub use effect::{Effect, EffectContext};
pub use page::Page;
pub use text_reveal::{
    animate_element, restart_animation, RevealSet, RevealState, RevealTarget,
    TextRevealController,
};
pub use title_lines::TitleLineReveal;
