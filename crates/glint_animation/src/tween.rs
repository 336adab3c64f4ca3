//! Tweens
//!
//! A tween drives one or more numeric style properties of a batch of targets
//! from whatever value each target holds when it first renders to a fixed end
//! value. Targets may be staggered, and the batch reports completion once,
//! after its last target finishes.
//!
//! # Example
//!
//! ```ignore
//! use glint_animation::{Easing, Stagger, TweenVars};
//!
//! let vars = TweenVars::new(100)
//!     .opacity(1.0)
//!     .stagger(Stagger::new(20.0).ease(Easing::Power2Out))
//!     .on_complete(|_doc, _handle| tracing::debug!("revealed"));
//! handle.to(&letters, vars);
//! ```

use std::fmt;

use glint_core::{Document, NodeId, StyleProperty};
use smallvec::SmallVec;

use crate::easing::Easing;
use crate::scheduler::SchedulerHandle;

/// Completion callback
///
/// Invoked after the scheduler has released its own state, so the callback
/// may schedule further tweens through the handle it receives.
pub type OnComplete = Box<dyn FnOnce(&mut Document, &SchedulerHandle)>;

/// What happens to older tweens animating the same target properties
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overwrite {
    /// Leave them running; whichever tween renders last in a frame wins
    #[default]
    None,
    /// When this tween first renders a target, kill that target's
    /// overlapping properties in every older tween
    Auto,
}

/// Per-target start offsets across a batch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    /// Nominal gap between consecutive targets
    pub each_ms: f32,
    /// Shapes how the offsets are distributed over the batch
    pub ease: Easing,
}

impl Stagger {
    pub fn new(each_ms: f32) -> Self {
        Self {
            each_ms,
            ease: Easing::Linear,
        }
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    /// Start offset of target `index` in a batch of `total`
    ///
    /// The last target always starts at `each_ms * (total - 1)`; the easing
    /// curve decides how the targets in between are spread.
    pub fn delay_for_index(&self, index: usize, total: usize) -> f32 {
        if total <= 1 {
            return 0.0;
        }
        let last = (total - 1) as f32;
        self.ease.apply(index as f32 / last) * self.each_ms * last
    }
}

/// Tween parameters
pub struct TweenVars {
    pub(crate) props: SmallVec<[(StyleProperty, f32); 3]>,
    pub(crate) duration_ms: u32,
    pub(crate) delay_ms: u32,
    pub(crate) easing: Easing,
    pub(crate) stagger: Option<Stagger>,
    pub(crate) overwrite: Overwrite,
    pub(crate) on_complete: Option<OnComplete>,
}

impl TweenVars {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            props: SmallVec::new(),
            duration_ms,
            delay_ms: 0,
            easing: Easing::default(),
            stagger: None,
            overwrite: Overwrite::default(),
            on_complete: None,
        }
    }

    /// Animate `property` to `value`. Setting the same property twice keeps
    /// the last value.
    pub fn to(mut self, property: StyleProperty, value: f32) -> Self {
        if let Some(entry) = self.props.iter_mut().find(|(p, _)| *p == property) {
            entry.1 = value;
        } else {
            self.props.push((property, value));
        }
        self
    }

    pub fn opacity(self, value: f32) -> Self {
        self.to(StyleProperty::Opacity, value)
    }

    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }

    pub fn overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Document, &SchedulerHandle) + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn properties(&self) -> &[(StyleProperty, f32)] {
        &self.props
    }
}

impl fmt::Debug for TweenVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenVars")
            .field("props", &self.props)
            .field("duration_ms", &self.duration_ms)
            .field("delay_ms", &self.delay_ms)
            .field("easing", &self.easing)
            .field("stagger", &self.stagger)
            .field("overwrite", &self.overwrite)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Runtime state for one target of a tween
struct Track {
    target: NodeId,
    offset_ms: f32,
    /// Values captured on first render
    start: Option<SmallVec<[f32; 3]>>,
    /// Per-property flag, cleared when a newer tween overwrites it
    live: SmallVec<[bool; 3]>,
    done: bool,
}

impl Track {
    fn is_killed(&self) -> bool {
        !self.live.iter().any(|l| *l)
    }
}

/// Result of advancing a tween by one frame
pub(crate) struct Advance {
    /// Target properties rendered for the first time this frame
    pub started: SmallVec<[(NodeId, StyleProperty); 8]>,
    pub finished: bool,
}

/// A scheduled tween
pub(crate) struct Tween {
    props: SmallVec<[(StyleProperty, f32); 3]>,
    tracks: Vec<Track>,
    duration_ms: f32,
    easing: Easing,
    overwrite: Overwrite,
    elapsed_ms: f32,
    on_complete: Option<OnComplete>,
}

impl Tween {
    pub(crate) fn new(targets: &[NodeId], vars: TweenVars) -> Self {
        let total = targets.len();
        let tracks = targets
            .iter()
            .enumerate()
            .map(|(index, target)| {
                let stagger = vars
                    .stagger
                    .map(|s| s.delay_for_index(index, total))
                    .unwrap_or(0.0);
                Track {
                    target: *target,
                    offset_ms: vars.delay_ms as f32 + stagger,
                    start: None,
                    live: SmallVec::from_elem(true, vars.props.len()),
                    done: false,
                }
            })
            .collect();

        Self {
            props: vars.props,
            tracks,
            duration_ms: vars.duration_ms as f32,
            easing: vars.easing,
            overwrite: vars.overwrite,
            elapsed_ms: 0.0,
            on_complete: vars.on_complete,
        }
    }

    pub(crate) fn overwrite(&self) -> Overwrite {
        self.overwrite
    }

    pub(crate) fn take_on_complete(&mut self) -> Option<OnComplete> {
        self.on_complete.take()
    }

    /// True once every property of every target has been overwritten
    pub(crate) fn is_dead(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(Track::is_killed)
    }

    pub(crate) fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tracks.iter().map(|t| t.target)
    }

    /// Stop animating `property` on `target`
    pub(crate) fn kill(&mut self, target: NodeId, property: StyleProperty) -> bool {
        let Some(index) = self.props.iter().position(|(p, _)| *p == property) else {
            return false;
        };
        let mut killed = false;
        for track in self.tracks.iter_mut().filter(|t| t.target == target) {
            killed |= std::mem::replace(&mut track.live[index], false);
        }
        killed
    }

    /// Stop animating every property on `target`
    pub(crate) fn kill_target(&mut self, target: NodeId) -> bool {
        let mut killed = false;
        for track in self.tracks.iter_mut().filter(|t| t.target == target) {
            for live in track.live.iter_mut() {
                killed |= std::mem::replace(live, false);
            }
        }
        killed
    }

    pub(crate) fn advance(&mut self, dt_ms: f32, document: &mut Document) -> Advance {
        self.elapsed_ms += dt_ms;
        let mut started = SmallVec::new();

        for track in self.tracks.iter_mut() {
            if track.done || track.is_killed() {
                continue;
            }
            let local = self.elapsed_ms - track.offset_ms;
            if local < 0.0 {
                continue;
            }

            if track.start.is_none() {
                if !document.contains(track.target) {
                    tracing::trace!("tween: target {:?} is gone", track.target);
                    track.live.iter_mut().for_each(|l| *l = false);
                    continue;
                }
                let start = self
                    .props
                    .iter()
                    .map(|(property, _)| {
                        document
                            .style_value(track.target, *property)
                            .unwrap_or_else(|| property.initial_value())
                    })
                    .collect();
                track.start = Some(start);
                for (index, (property, _)) in self.props.iter().enumerate() {
                    if track.live[index] {
                        started.push((track.target, *property));
                    }
                }
            }

            let progress = if self.duration_ms <= 0.0 {
                1.0
            } else {
                (local / self.duration_ms).min(1.0)
            };
            let eased = self.easing.apply(progress);

            if let Some(start) = &track.start {
                for (index, (property, end)) in self.props.iter().enumerate() {
                    if !track.live[index] {
                        continue;
                    }
                    let from = start[index];
                    let value = from + (end - from) * eased;
                    if document
                        .set_style_value(track.target, *property, value)
                        .is_err()
                    {
                        track.live[index] = false;
                    }
                }
            }

            if progress >= 1.0 {
                track.done = true;
            }
        }

        let finished = self.tracks.iter().all(|t| t.done || t.is_killed());
        Advance { started, finished }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stagger_linear_offsets() {
        let stagger = Stagger::new(20.0);
        assert_eq!(stagger.delay_for_index(0, 5), 0.0);
        assert!((stagger.delay_for_index(1, 5) - 20.0).abs() < 1e-4);
        assert!((stagger.delay_for_index(4, 5) - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_stagger_eased_offsets() {
        let stagger = Stagger::new(20.0).ease(Easing::Power2Out);
        let total = 5;
        // Same overall span as the linear stagger
        assert!((stagger.delay_for_index(4, total) - 80.0).abs() < 1e-4);
        // Front-loaded: the second target starts later than linear spacing
        assert!(stagger.delay_for_index(1, total) > 20.0);
        let mut last = -1.0;
        for i in 0..total {
            let d = stagger.delay_for_index(i, total);
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn test_stagger_single_target() {
        assert_eq!(Stagger::new(20.0).delay_for_index(0, 1), 0.0);
        assert_eq!(Stagger::new(20.0).delay_for_index(0, 0), 0.0);
    }

    #[test]
    fn test_vars_last_value_wins() {
        let vars = TweenVars::new(100).opacity(0.5).opacity(1.0);
        assert_eq!(vars.properties(), &[(StyleProperty::Opacity, 1.0)]);
    }

    #[test]
    fn test_advance_interpolates_from_current_value() {
        let mut doc = Document::new();
        let el = doc.create_element("span");
        doc.set_style_value(el, StyleProperty::Opacity, 0.2).unwrap();

        let mut tween = Tween::new(
            &[el],
            TweenVars::new(100).opacity(1.0).easing(Easing::Linear),
        );

        let first = tween.advance(50.0, &mut doc);
        assert_eq!(first.started.as_slice(), &[(el, StyleProperty::Opacity)]);
        assert!(!first.finished);
        assert!((doc.style_value(el, StyleProperty::Opacity).unwrap() - 0.6).abs() < 1e-5);

        let second = tween.advance(50.0, &mut doc);
        assert!(second.started.is_empty());
        assert!(second.finished);
        assert_eq!(doc.style_value(el, StyleProperty::Opacity), Some(1.0));
    }

    #[test]
    fn test_kill_marks_dead() {
        let mut doc = Document::new();
        let a = doc.create_element("span");
        let b = doc.create_element("span");
        let mut tween = Tween::new(&[a, b], TweenVars::new(100).opacity(1.0));

        assert!(tween.kill(a, StyleProperty::Opacity));
        assert!(!tween.kill(a, StyleProperty::Opacity));
        assert!(!tween.kill(b, StyleProperty::RotationX));
        assert!(!tween.is_dead());
        assert!(tween.kill_target(b));
        assert!(tween.is_dead());
    }
}
