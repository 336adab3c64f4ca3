//! Title line reveal
//!
//! Headings split into `.anim-title-line` elements slide their lines up
//! into place one after another. Lines start pushed down, tilted back and
//! transparent. When any line of a heading becomes visible, every line of
//! that heading animates to its resting state with a short delay per line.

use std::any::Any;

use glint_animation::{Overwrite, TweenVars};
use glint_core::{
    Document, DomError, NodeId, ObserverOptions, Selector, StyleProperty, VisibilityObserver,
};

use crate::config::{LineState, TitleLineConfig};
use crate::effect::{Effect, EffectContext};

pub struct TitleLineReveal {
    config: TitleLineConfig,
    observer: VisibilityObserver,
    headings: Selector,
    triggered: usize,
}

impl TitleLineReveal {
    pub fn new(config: TitleLineConfig) -> Self {
        let observer = VisibilityObserver::new(ObserverOptions::new(config.threshold, 0.0));
        let headings = Selector::any(config.heading_tags.iter().map(Selector::tag));
        Self {
            config,
            observer,
            headings,
            triggered: 0,
        }
    }

    pub fn is_observing(&self, line: NodeId) -> bool {
        self.observer.is_observing(line)
    }

    /// Number of visibility events that started a line group
    pub fn triggered(&self) -> usize {
        self.triggered
    }

    /// The lines that animate together with `line`, in document order
    pub fn line_group(&self, document: &Document, line: NodeId) -> Vec<NodeId> {
        let group = document
            .closest(line, &self.headings)
            .map(|heading| {
                document.query_all_within(heading, &Selector::class(self.config.line_class.as_str()))
            })
            .unwrap_or_default();
        if group.is_empty() {
            vec![line]
        } else {
            group
        }
    }

    fn animate_group(&self, cx: &mut EffectContext<'_>, lines: &[NodeId]) {
        let end = self.config.end;
        for (index, line) in lines.iter().enumerate() {
            let vars = TweenVars::new(self.config.duration_ms)
                .to(StyleProperty::TranslateY, end.translate_y)
                .to(StyleProperty::RotationX, end.rotation_x)
                .opacity(end.opacity)
                .easing(self.config.easing)
                .delay((index as u32).saturating_mul(self.config.line_delay_ms))
                .overwrite(Overwrite::Auto);
            if cx.animations.to(&[*line], vars).is_none() {
                show_line(cx.document, *line);
            }
        }
    }
}

fn apply_state(document: &mut Document, line: NodeId, state: LineState) -> Result<(), DomError> {
    let style = document.style_mut(line)?;
    style.set(StyleProperty::TranslateY, state.translate_y);
    style.set(StyleProperty::RotationX, state.rotation_x);
    style.set(StyleProperty::Opacity, state.opacity);
    Ok(())
}

/// Fully visible with no transform
fn show_line(document: &mut Document, line: NodeId) {
    match document.style_mut(line) {
        Ok(style) => {
            style.set(StyleProperty::Opacity, 1.0);
            style.clear_transform();
        }
        Err(err) => tracing::warn!("title lines: {}", err),
    }
}

impl Effect for TitleLineReveal {
    fn name(&self) -> &'static str {
        "title-lines"
    }

    fn initialize(&mut self, cx: &mut EffectContext<'_>) {
        let lines = cx
            .document
            .query_all(&Selector::class(self.config.line_class.as_str()));

        if !cx.animations.is_alive() {
            tracing::debug!("title lines: no tween engine, showing {} line(s)", lines.len());
            for line in lines {
                show_line(cx.document, line);
            }
            return;
        }

        for line in lines {
            match apply_state(cx.document, line, self.config.start) {
                Ok(()) => self.observer.observe(line),
                Err(err) => tracing::warn!("title lines: skipping {:?}: {}", line, err),
            }
        }
        tracing::debug!("title lines: observing {} line(s)", self.observer.len());
        self.on_viewport_change(cx);
    }

    fn on_viewport_change(&mut self, cx: &mut EffectContext<'_>) {
        for entry in self.observer.take_records(cx.document, cx.viewport) {
            if !entry.is_intersecting || !self.observer.is_observing(entry.target) {
                continue;
            }
            let group = self.line_group(cx.document, entry.target);
            tracing::trace!("title lines: revealing {} line(s)", group.len());
            self.animate_group(cx, &group);
            self.observer.unobserve(entry.target);
            self.triggered += 1;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
