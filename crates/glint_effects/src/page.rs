//! The page event loop
//!
//! A [`Page`] owns the document, the tween scheduler and the registered
//! effects. Hosts feed it events; each event is handled to completion
//! before the call returns.
//!
//! ```ignore
//! let mut page = Page::new(document, Rect::new(0.0, 0.0, 1280.0, 720.0))
//!     .with_config(&EffectsConfig::default());
//! page.ready();
//!
//! page.scroll_to(900.0);
//! while page.advance(16.0) {}
//! ```

use glint_animation::{SchedulerHandle, TweenScheduler};
use glint_core::{Document, EventType, NodeId, PointerEvent, Point, Rect};

use crate::border_fill::BorderFill;
use crate::config::EffectsConfig;
use crate::effect::{Effect, EffectContext};
use crate::text_reveal::TextRevealController;
use crate::title_lines::TitleLineReveal;

pub struct Page {
    document: Document,
    scheduler: Option<TweenScheduler>,
    animations: SchedulerHandle,
    viewport: Rect,
    effects: Vec<Box<dyn Effect>>,
    ready: bool,
}

impl Page {
    pub fn new(document: Document, viewport: Rect) -> Self {
        let scheduler = TweenScheduler::new();
        let animations = scheduler.handle();
        Self {
            document,
            scheduler: Some(scheduler),
            animations,
            viewport,
            effects: Vec::new(),
            ready: false,
        }
    }

    /// A page whose effects run without a tween engine
    pub fn without_animations(document: Document, viewport: Rect) -> Self {
        Self {
            document,
            scheduler: None,
            animations: SchedulerHandle::detached(),
            viewport,
            effects: Vec::new(),
            ready: false,
        }
    }

    /// Register the standard effects enabled in `config`
    pub fn with_config(mut self, config: &EffectsConfig) -> Self {
        if config.text_reveal.enabled {
            self.add_effect(TextRevealController::new(config.text_reveal.clone()));
        }
        if config.border_fill.enabled {
            self.add_effect(BorderFill::new(config.border_fill.clone()));
        }
        if config.title_lines.enabled {
            self.add_effect(TitleLineReveal::new(config.title_lines.clone()));
        }
        self
    }

    pub fn add_effect(&mut self, effect: impl Effect + 'static) {
        if self.ready {
            tracing::warn!("page: effect `{}` added after ready", effect.name());
        }
        self.effects.push(Box::new(effect));
    }

    /// Find a registered effect by type
    pub fn effect<T: Effect + 'static>(&self) -> Option<&T> {
        self.effects
            .iter()
            .find_map(|effect| effect.as_any().downcast_ref::<T>())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn animations(&self) -> &SchedulerHandle {
        &self.animations
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The document is ready; initialize every effect
    ///
    /// Runs once. Later calls are ignored.
    pub fn ready(&mut self) {
        if self.ready {
            tracing::warn!("page: ready called more than once");
            return;
        }
        self.ready = true;
        tracing::debug!("page: initializing {} effect(s)", self.effects.len());
        self.each_effect(|effect, cx| effect.initialize(cx));
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        if self.ready {
            self.each_effect(|effect, cx| effect.on_viewport_change(cx));
        }
    }

    /// Scroll vertically so the viewport's top edge sits at `y`
    pub fn scroll_to(&mut self, y: f32) {
        let mut viewport = self.viewport;
        viewport.origin = Point::new(viewport.x(), y);
        self.set_viewport(viewport);
    }

    /// Deliver a pointer-enter on `target`
    ///
    /// The event visits `target` and then each ancestor that has a
    /// pointer-enter listener. The returned event reports whether a handler
    /// prevented the default action.
    pub fn pointer_enter(&mut self, target: NodeId) -> PointerEvent {
        let mut event = PointerEvent::new(EventType::PointerEnter, target);
        if !self.ready {
            return event;
        }

        let mut path = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            if self.document.has_event_listener(node, EventType::PointerEnter) {
                path.push(node);
            }
            current = self.document.parent(node);
        }

        for node in path {
            event.current_target = node;
            self.each_effect(|effect, cx| effect.on_pointer_enter(cx, &mut event));
        }
        event
    }

    /// Advance animations by one frame of `dt_ms`
    ///
    /// Returns true while tweens are still running.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        match &self.scheduler {
            Some(scheduler) => scheduler.tick(dt_ms, &mut self.document),
            None => false,
        }
    }

    /// Run frames of `frame_ms` until no tween is left, up to `max_frames`
    pub fn run_until_idle(&mut self, frame_ms: f32, max_frames: usize) -> usize {
        match &self.scheduler {
            Some(scheduler) => scheduler.run_until_idle(&mut self.document, frame_ms, max_frames),
            None => 0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(TweenScheduler::has_active_tweens)
    }

    /// Drop the tween engine. Running tweens stop where they are and
    /// effects fall back to their final state from now on.
    pub fn stop_animations(&mut self) {
        if self.scheduler.take().is_some() {
            tracing::debug!("page: tween engine stopped");
        }
    }

    fn each_effect(&mut self, mut f: impl FnMut(&mut dyn Effect, &mut EffectContext<'_>)) {
        let mut cx = EffectContext {
            document: &mut self.document,
            animations: &self.animations,
            viewport: self.viewport,
        };
        for effect in self.effects.iter_mut() {
            f(effect.as_mut(), &mut cx);
        }
    }
}
