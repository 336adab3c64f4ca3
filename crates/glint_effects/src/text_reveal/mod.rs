//! Letter-by-letter text reveal
//!
//! Elements carrying the marker attribute (`data-animate-text` by default)
//! have their text split into words and letters when the page becomes
//! ready. The first time an element scrolls into view its letters fade in,
//! in a random order within each word. The reveal plays once per page load.
//!
//! Links can be replayed: entering one with the pointer fades its letters
//! out and reveals them again, as often as the pointer comes back.

mod decompose;
mod state;

use std::any::Any;

use glint_animation::{Overwrite, SchedulerHandle, Stagger, TweenId, TweenVars};
use glint_core::{
    Cursor, Document, DomError, EventType, NodeId, ObserverOptions, PointerEvent, Selector,
    StyleProperty, VisibilityObserver,
};
use indexmap::IndexMap;
use rand::seq::SliceRandom;

use crate::config::{RevealAnimation, RevealConfig};
use crate::effect::{Effect, EffectContext};

pub use decompose::{
    collapse_whitespace, decompose, join_words, query_letters, split_words, Letter, Word,
    LETTER_CLASS, PLACEHOLDER, WORD_CLASS,
};
pub use state::{RevealSet, RevealState};

/// Attribute holding the element's text as it was before decomposition
pub const ORIGINAL_TEXT_ATTRIBUTE: &str = "data-original-text";
/// Attribute holding the element's `text-{index}` identifier
pub const ANIMATION_ID_ATTRIBUTE: &str = "data-animation-id";

/// A discovered element
#[derive(Debug)]
pub struct RevealTarget {
    pub element: NodeId,
    /// `text-{index}` in discovery order
    pub id: String,
    /// Text content captured before decomposition
    pub original_text: String,
    pub words: Vec<Word>,
    /// Whether the element is an `<a>`; only links replay on hover
    pub is_link: bool,
    /// Reveals started by visibility
    pub visibility_reveals: u32,
    /// Replays started by the pointer
    pub hover_replays: u32,
}

impl RevealTarget {
    pub fn letter_count(&self) -> usize {
        self.words.iter().map(|w| w.glyphs().count()).sum()
    }

    pub fn letters(&self) -> impl Iterator<Item = &Letter> + '_ {
        self.words.iter().flat_map(|w| w.letters.iter())
    }
}

pub struct TextRevealController {
    config: RevealConfig,
    targets: IndexMap<NodeId, RevealTarget>,
    reveal_set: RevealSet,
    observer: VisibilityObserver,
}

impl TextRevealController {
    pub fn new(config: RevealConfig) -> Self {
        let observer =
            VisibilityObserver::new(ObserverOptions::new(config.threshold, config.root_margin));
        Self {
            config,
            targets: IndexMap::new(),
            reveal_set: RevealSet::new(),
            observer,
        }
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn target(&self, element: NodeId) -> Option<&RevealTarget> {
        self.targets.get(&element)
    }

    /// Discovered targets in document order
    pub fn targets(&self) -> impl Iterator<Item = &RevealTarget> + '_ {
        self.targets.values()
    }

    pub fn reveal_set(&self) -> &RevealSet {
        &self.reveal_set
    }

    pub fn is_observing(&self, element: NodeId) -> bool {
        self.observer.is_observing(element)
    }

    fn prepare(
        &mut self,
        document: &mut Document,
        element: NodeId,
        index: usize,
    ) -> Result<(), DomError> {
        let original_text = document.text_content(element);
        let id = format!("text-{index}");
        document.set_attribute(element, ORIGINAL_TEXT_ATTRIBUTE, original_text.as_str())?;
        document.set_attribute(element, ANIMATION_ID_ATTRIBUTE, id.as_str())?;

        let words = decompose(document, element, &original_text)?;
        let is_link = document.tag_name(element) == Some("a");

        if is_link {
            self.setup_hover(document, element)?;
        }

        self.reveal_set.insert(element);
        if !words.is_empty() {
            self.observer.observe(element);
        }

        tracing::debug!(
            "text reveal: prepared {} ({} word(s), link: {})",
            id,
            words.len(),
            is_link
        );
        self.targets.insert(
            element,
            RevealTarget {
                element,
                id,
                original_text,
                words,
                is_link,
                visibility_reveals: 0,
                hover_replays: 0,
            },
        );
        Ok(())
    }

    fn setup_hover(&self, document: &mut Document, element: NodeId) -> Result<(), DomError> {
        document.style_mut(element)?.cursor = Cursor::Pointer;
        if !self.config.hover_title.is_empty() {
            document.set_attribute(element, "title", self.config.hover_title.as_str())?;
        }
        document.add_event_listener(element, EventType::PointerEnter)
    }
}

impl Effect for TextRevealController {
    fn name(&self) -> &'static str {
        "text-reveal"
    }

    fn initialize(&mut self, cx: &mut EffectContext<'_>) {
        let selector = Selector::attribute(self.config.marker_attribute.as_str());
        let elements = cx.document.query_all(&selector);

        for (index, element) in elements.into_iter().enumerate() {
            if let Err(err) = self.prepare(cx.document, element, index) {
                tracing::warn!("text reveal: skipping {:?}: {}", element, err);
            }
        }

        tracing::debug!(
            "text reveal: {} element(s), {} observed",
            self.targets.len(),
            self.observer.len()
        );
        self.on_viewport_change(cx);
    }

    fn on_viewport_change(&mut self, cx: &mut EffectContext<'_>) {
        for entry in self.observer.take_records(cx.document, cx.viewport) {
            if !entry.is_intersecting || !self.reveal_set.mark_played(entry.target) {
                continue;
            }
            if let Some(target) = self.targets.get_mut(&entry.target) {
                target.visibility_reveals += 1;
                tracing::debug!("text reveal: {} is visible", target.id);
            }
            animate_element(cx.document, cx.animations, entry.target, &self.config.animation);
        }
    }

    fn on_pointer_enter(&mut self, cx: &mut EffectContext<'_>, event: &mut PointerEvent) {
        let element = event.current_target;
        let Some(target) = self.targets.get_mut(&element) else {
            return;
        };
        if !target.is_link {
            return;
        }

        event.prevent_default();
        target.hover_replays += 1;
        tracing::trace!("text reveal: replaying {}", target.id);
        restart_animation(cx.document, cx.animations, element, self.config.animation);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fade in the letters of `element`
///
/// Each word's letters, placeholder included, are shuffled and tweened from
/// their current opacity to 1 with an eased stagger. Returns one tween per
/// word. Without a tween engine every letter is shown immediately and no
/// tweens are returned.
pub fn animate_element(
    document: &mut Document,
    animations: &SchedulerHandle,
    element: NodeId,
    animation: &RevealAnimation,
) -> Vec<TweenId> {
    let words = query_letters(document, element);

    if !animations.is_alive() {
        tracing::debug!("text reveal: no tween engine, showing {:?}", element);
        show_letters(document, words.iter().flatten().copied());
        return Vec::new();
    }

    let mut rng = rand::rng();
    let mut tweens = Vec::with_capacity(words.len());
    for (index, mut letters) in words.into_iter().enumerate() {
        letters.shuffle(&mut rng);
        let vars = TweenVars::new(animation.letter_duration_ms)
            .opacity(1.0)
            .easing(animation.letter_ease)
            .stagger(Stagger::new(animation.stagger_ms).ease(animation.stagger_ease))
            .delay((index as u32).saturating_mul(animation.word_offset_ms))
            .overwrite(Overwrite::Auto);
        tweens.extend(animations.to(&letters, vars));
    }
    tweens
}

/// Fade the letters of `element` out, then reveal them again
pub fn restart_animation(
    document: &mut Document,
    animations: &SchedulerHandle,
    element: NodeId,
    animation: RevealAnimation,
) {
    if !animations.is_alive() {
        animate_element(document, animations, element, &animation);
        return;
    }

    let letters: Vec<NodeId> = query_letters(document, element)
        .into_iter()
        .flatten()
        .collect();
    let vars = TweenVars::new(animation.collapse_duration_ms)
        .opacity(0.0)
        .overwrite(Overwrite::Auto)
        .on_complete(move |document, animations| {
            animate_element(document, animations, element, &animation);
        });
    animations.to(&letters, vars);
}

fn show_letters(document: &mut Document, letters: impl IntoIterator<Item = NodeId>) {
    for letter in letters {
        if let Err(err) = document.set_style_value(letter, StyleProperty::Opacity, 1.0) {
            tracing::warn!("text reveal: cannot show letter: {}", err);
        }
    }
}
