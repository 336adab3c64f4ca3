//! Effect configuration
//!
//! Every effect reads its settings from one TOML document. All keys are
//! optional; anything left out keeps the defaults below.
//!
//! ```toml
//! [text_reveal]
//! marker_attribute = "data-animate-text"
//! threshold = 0.3
//! root_margin = 50.0
//! hover_title = "Hover to replay"
//!
//! [text_reveal.animation]
//! letter_duration_ms = 100
//! stagger_ms = 20.0
//! stagger_ease = "power2.out"
//!
//! [border_fill]
//! threshold = 0.3
//!
//! [title_lines]
//! duration_ms = 1200
//! easing = "power3.out"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glint_animation::Easing;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for every effect on the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub text_reveal: RevealConfig,
    pub border_fill: BorderFillConfig,
    pub title_lines: TitleLineConfig,
}

impl EffectsConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("loaded effects config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let reveal = &self.text_reveal;
        if reveal.marker_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "text_reveal.marker_attribute must not be empty".to_string(),
            ));
        }
        check_threshold("text_reveal.threshold", reveal.threshold)?;
        check_margin("text_reveal.root_margin", reveal.root_margin)?;
        if !reveal.animation.stagger_ms.is_finite() || reveal.animation.stagger_ms < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "text_reveal.animation.stagger_ms must be a non-negative number, got {}",
                reveal.animation.stagger_ms
            )));
        }

        check_threshold("border_fill.threshold", self.border_fill.threshold)?;
        check_threshold("title_lines.threshold", self.title_lines.threshold)?;
        Ok(())
    }
}

fn check_threshold(key: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{key} must be within [0, 1], got {value}"
        )))
    }
}

fn check_margin(key: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{key} must be a non-negative number of pixels, got {value}"
        )))
    }
}

/// Letter reveal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub enabled: bool,
    /// Attribute that marks an element for letter reveal
    pub marker_attribute: String,
    /// Visible fraction that triggers the reveal
    pub threshold: f32,
    /// Pixels added around the viewport so reveals start slightly early
    pub root_margin: f32,
    /// Tooltip set on link targets; empty disables it
    pub hover_title: String,
    pub animation: RevealAnimation,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_attribute: "data-animate-text".to_string(),
            threshold: 0.3,
            root_margin: 50.0,
            hover_title: "Hover to replay".to_string(),
            animation: RevealAnimation::default(),
        }
    }
}

/// Timing of the letter reveal and hover replay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealAnimation {
    /// Fade-in time of a single letter
    pub letter_duration_ms: u32,
    /// Nominal gap between letter starts within a word
    pub stagger_ms: f32,
    /// Distribution of letter starts within a word
    pub stagger_ease: Easing,
    /// Curve of each letter's fade
    pub letter_ease: Easing,
    /// Start offset per word index. Zero starts every word together.
    pub word_offset_ms: u32,
    /// Fade-out time before a hover replay
    pub collapse_duration_ms: u32,
}

impl Default for RevealAnimation {
    fn default() -> Self {
        Self {
            letter_duration_ms: 100,
            stagger_ms: 20.0,
            stagger_ease: Easing::Power2Out,
            letter_ease: Easing::Power1Out,
            word_offset_ms: 0,
            collapse_duration_ms: 100,
        }
    }
}

/// Border fill settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderFillConfig {
    pub enabled: bool,
    /// Elements carrying any of these classes are watched
    pub classes: Vec<String>,
    /// Class added once an element is visible
    pub active_class: String,
    pub threshold: f32,
}

impl Default for BorderFillConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            classes: vec!["border-top".to_string(), "border-bottom".to_string()],
            active_class: "active".to_string(),
            threshold: 0.3,
        }
    }
}

/// Style values a title line animates between
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineState {
    /// Vertical offset as a percentage of the line's height
    pub translate_y: f32,
    pub rotation_x: f32,
    pub opacity: f32,
}

/// Title line reveal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleLineConfig {
    pub enabled: bool,
    pub line_class: String,
    /// Tags whose lines animate together
    pub heading_tags: Vec<String>,
    pub threshold: f32,
    pub duration_ms: u32,
    pub line_delay_ms: u32,
    pub easing: Easing,
    pub start: LineState,
    pub end: LineState,
}

impl Default for TitleLineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            line_class: "anim-title-line".to_string(),
            heading_tags: vec!["h1".to_string(), "h2".to_string(), "h3".to_string()],
            threshold: 0.1,
            duration_ms: 1200,
            line_delay_ms: 150,
            easing: Easing::Power3Out,
            start: LineState {
                translate_y: 100.0,
                rotation_x: -8.0,
                opacity: 0.0,
            },
            end: LineState {
                translate_y: 0.0,
                rotation_x: 0.0,
                opacity: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EffectsConfig::from_toml_str("").unwrap();
        assert_eq!(config, EffectsConfig::default());
        assert_eq!(config.text_reveal.threshold, 0.3);
        assert_eq!(config.text_reveal.root_margin, 50.0);
        assert_eq!(config.text_reveal.animation.stagger_ms, 20.0);
        assert_eq!(config.text_reveal.animation.word_offset_ms, 0);
    }

    #[test]
    fn test_partial_override() {
        let config = EffectsConfig::from_toml_str(
            r#"
            [text_reveal]
            threshold = 0.5

            [text_reveal.animation]
            stagger_ease = "power3.inOut"
            word_offset_ms = 40

            [title_lines]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.text_reveal.threshold, 0.5);
        assert_eq!(config.text_reveal.root_margin, 50.0);
        assert_eq!(config.text_reveal.animation.stagger_ease, Easing::Power3InOut);
        assert_eq!(config.text_reveal.animation.word_offset_ms, 40);
        assert_eq!(config.text_reveal.animation.letter_duration_ms, 100);
        assert!(!config.title_lines.enabled);
        assert!(config.border_fill.enabled);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = EffectsConfig::default();
        config.title_lines.line_delay_ms = 90;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EffectsConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = EffectsConfig::from_toml_str("[text_reveal]\nthreshold = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EffectsConfig::from_toml_str("[text_reveal]\nroot_margin = -5.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            EffectsConfig::from_toml_str("[text_reveal]\nmarker_attribute = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EffectsConfig::from_toml_str("[text_reveal.animation]\nstagger_ease = \"wobble\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[border_fill]\nactive_class = \"filled\"").unwrap();

        let config = EffectsConfig::load(file.path()).unwrap();
        assert_eq!(config.border_fill.active_class, "filled");

        let missing = EffectsConfig::load("/nonexistent/glint.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
