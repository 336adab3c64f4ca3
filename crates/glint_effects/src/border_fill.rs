//! Border fill
//!
//! Section borders (`.border-top`, `.border-bottom`) are drawn by the
//! stylesheet once they carry the `active` class. This effect adds the class
//! when a border scrolls into view. The class is never removed.

use std::any::Any;

use glint_core::{NodeId, ObserverOptions, Selector, VisibilityObserver};

use crate::config::BorderFillConfig;
use crate::effect::{Effect, EffectContext};

pub struct BorderFill {
    config: BorderFillConfig,
    observer: VisibilityObserver,
}

impl BorderFill {
    pub fn new(config: BorderFillConfig) -> Self {
        let observer = VisibilityObserver::new(ObserverOptions::new(config.threshold, 0.0));
        Self { config, observer }
    }

    pub fn is_observing(&self, element: NodeId) -> bool {
        self.observer.is_observing(element)
    }
}

impl Effect for BorderFill {
    fn name(&self) -> &'static str {
        "border-fill"
    }

    fn initialize(&mut self, cx: &mut EffectContext<'_>) {
        let selector = Selector::any(self.config.classes.iter().map(Selector::class));
        for element in cx.document.query_all(&selector) {
            self.observer.observe(element);
        }
        tracing::debug!("border fill: observing {} element(s)", self.observer.len());
        self.on_viewport_change(cx);
    }

    fn on_viewport_change(&mut self, cx: &mut EffectContext<'_>) {
        for entry in self.observer.take_records(cx.document, cx.viewport) {
            if !entry.is_intersecting {
                continue;
            }
            if let Err(err) = cx.document.add_class(entry.target, &self.config.active_class) {
                tracing::warn!("border fill: {}", err);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
