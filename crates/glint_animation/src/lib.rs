//! Glint Animation System
//!
//! A small tween engine for driving element styles over time.
//!
//! # Features
//!
//! - **Easing**: the power and sine families, addressable by name
//! - **Tweens**: animate numeric style properties of a batch of targets
//!   from their current value to an end value
//! - **Stagger**: per-target start offsets shaped by an easing curve
//! - **Overwrite**: `Auto` tweens take over the properties they touch from
//!   older tweens, which lets rapid restarts settle cleanly
//! - **Completion callbacks**: fired once per batch, free to chain tweens
//! - **Weak handles**: components keep a [`SchedulerHandle`] that reports
//!   when the engine is unavailable

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::{Easing, UnknownEasing};
pub use scheduler::{SchedulerHandle, TweenId, TweenScheduler};
pub use tween::{OnComplete, Overwrite, Stagger, TweenVars};
