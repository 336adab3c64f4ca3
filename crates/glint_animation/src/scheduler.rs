//! Tween scheduler
//!
//! Owns every running tween and advances them each frame. Components do not
//! hold the scheduler itself; they hold a [`SchedulerHandle`], a weak
//! reference that quietly reports "unavailable" once the scheduler is gone.
//! Effects use that to fall back to their final visual state instead of
//! leaving content hidden.
//!
//! Everything runs on the UI thread, so the shared state sits behind
//! `Rc<RefCell<_>>`. Completion callbacks are collected during a tick and
//! invoked after the borrow is released.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glint_core::{Document, NodeId};
use slotmap::{new_key_type, SlotMap};

use crate::tween::{OnComplete, Overwrite, Tween, TweenVars};

new_key_type! {
    /// Handle to a scheduled tween
    pub struct TweenId;
}

/// Internal state of the scheduler
struct SchedulerInner {
    tweens: SlotMap<TweenId, Tween>,
    /// Creation order; later tweens render after (and so win over) earlier ones
    order: Vec<TweenId>,
}

impl SchedulerInner {
    fn insert(&mut self, tween: Tween) -> TweenId {
        let id = self.tweens.insert(tween);
        self.order.push(id);
        id
    }

    fn advance(&mut self, dt_ms: f32, document: &mut Document) -> Vec<OnComplete> {
        let mut finished: Vec<(TweenId, bool)> = Vec::new();

        for i in 0..self.order.len() {
            let id = self.order[i];
            let Some(tween) = self.tweens.get_mut(id) else {
                continue;
            };
            if tween.is_dead() {
                continue;
            }

            let outcome = tween.advance(dt_ms, document);
            let overwrite = tween.overwrite();
            if outcome.finished {
                finished.push((id, !tween.is_dead()));
            }

            if overwrite == Overwrite::Auto && !outcome.started.is_empty() {
                for older in &self.order[..i] {
                    if let Some(other) = self.tweens.get_mut(*older) {
                        for (target, property) in &outcome.started {
                            other.kill(*target, *property);
                        }
                    }
                }
            }
        }

        // Fully overwritten tweens are discarded without completing
        for id in &self.order {
            if self.tweens.get(*id).is_some_and(Tween::is_dead)
                && !finished.iter().any(|(f, _)| f == id)
            {
                tracing::trace!("scheduler: tween {:?} overwritten", id);
                finished.push((*id, false));
            }
        }

        let mut completed = Vec::new();
        for (id, fire) in finished {
            if let Some(mut tween) = self.tweens.remove(id) {
                if fire {
                    if let Some(callback) = tween.take_on_complete() {
                        completed.push(callback);
                    }
                }
            }
        }

        let tweens = &self.tweens;
        self.order.retain(|id| tweens.contains_key(*id));
        completed
    }
}

/// The scheduler that ticks all running tweens
///
/// ```ignore
/// let scheduler = TweenScheduler::new();
/// let handle = scheduler.handle();
/// handle.to(&[node], TweenVars::new(300).opacity(1.0));
///
/// // Once per frame
/// scheduler.tick(16.0, &mut document);
/// ```
pub struct TweenScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tweens: SlotMap::with_key(),
                order: Vec::new(),
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance every tween by `dt_ms` and write the results into `document`
    ///
    /// Returns true if any tweens are still running afterwards.
    pub fn tick(&self, dt_ms: f32, document: &mut Document) -> bool {
        let completed = self.inner.borrow_mut().advance(dt_ms, document);

        if !completed.is_empty() {
            tracing::trace!("scheduler: {} tween(s) completed", completed.len());
            let handle = self.handle();
            for callback in completed {
                callback(document, &handle);
            }
        }

        self.has_active_tweens()
    }

    /// Tick at a fixed frame interval until idle or `max_frames` is reached
    ///
    /// Returns the number of frames run.
    pub fn run_until_idle(&self, document: &mut Document, frame_ms: f32, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.has_active_tweens() {
            self.tick(frame_ms, document);
            frames += 1;
        }
        frames
    }

    pub fn has_active_tweens(&self) -> bool {
        !self.inner.borrow().tweens.is_empty()
    }

    pub fn tween_count(&self) -> usize {
        self.inner.borrow().tweens.len()
    }
}

impl Default for TweenScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the tween scheduler
///
/// Cheap to clone and safe to keep after the scheduler is dropped; every
/// operation then no-ops.
#[derive(Clone, Default)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle that was never attached to a scheduler
    pub fn detached() -> Self {
        Self::default()
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Schedule a tween of `targets`
    ///
    /// Returns `None` when the scheduler is gone. An empty target list is
    /// valid and completes on the next tick.
    pub fn to(&self, targets: &[NodeId], vars: TweenVars) -> Option<TweenId> {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().insert(Tween::new(targets, vars));
        Some(id)
    }

    /// Check if a tween is still scheduled
    pub fn is_active(&self, id: TweenId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.borrow().tweens.contains_key(id))
    }

    /// Check if any running tween animates `target`
    pub fn is_tweening(&self, target: NodeId) -> bool {
        self.inner.upgrade().is_some_and(|inner| {
            inner
                .borrow()
                .tweens
                .values()
                .any(|t| !t.is_dead() && t.targets().any(|n| n == target))
        })
    }

    /// Targets of a scheduled tween, in stagger order
    pub fn targets(&self, id: TweenId) -> Vec<NodeId> {
        self.inner
            .upgrade()
            .and_then(|inner| {
                inner
                    .borrow()
                    .tweens
                    .get(id)
                    .map(|t| t.targets().collect())
            })
            .unwrap_or_default()
    }

    /// Remove a tween without running its completion callback
    pub fn kill(&self, id: TweenId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut inner = inner.borrow_mut();
        inner.order.retain(|o| *o != id);
        inner.tweens.remove(id).is_some()
    }

    /// Stop animating `target` in every tween
    ///
    /// Tweens left with nothing to animate are discarded on the next tick.
    pub fn kill_tweens_of(&self, target: NodeId) -> usize {
        let Some(inner) = self.inner.upgrade() else {
            return 0;
        };
        let mut inner = inner.borrow_mut();
        inner
            .tweens
            .values_mut()
            .map(|t| t.kill_target(target))
            .filter(|killed| *killed)
            .count()
    }

    pub fn active_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tweens.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::tween::Stagger;
    use glint_core::StyleProperty;
    use std::cell::Cell;

    fn letters(doc: &mut Document, n: usize) -> Vec<NodeId> {
        (0..n)
            .map(|_| {
                let span = doc.create_element("span");
                doc.set_style_value(span, StyleProperty::Opacity, 0.0).unwrap();
                span
            })
            .collect()
    }

    fn opacity(doc: &Document, id: NodeId) -> f32 {
        doc.style_value(id, StyleProperty::Opacity).unwrap()
    }

    #[test]
    fn test_tween_reaches_end_value() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 3);
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();

        handle.to(&targets, TweenVars::new(100).opacity(1.0)).unwrap();
        assert!(scheduler.has_active_tweens());

        let frames = scheduler.run_until_idle(&mut doc, 16.0, 100);
        assert_eq!(frames, 7);
        assert!(!scheduler.has_active_tweens());
        for t in targets {
            assert_eq!(opacity(&doc, t), 1.0);
        }
    }

    #[test]
    fn test_stagger_delays_later_targets() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 3);
        let scheduler = TweenScheduler::new();

        scheduler.handle().to(
            &targets,
            TweenVars::new(100)
                .opacity(1.0)
                .easing(Easing::Linear)
                .stagger(Stagger::new(50.0)),
        );

        scheduler.tick(50.0, &mut doc);
        assert!((opacity(&doc, targets[0]) - 0.5).abs() < 1e-5);
        assert_eq!(opacity(&doc, targets[1]), 0.0);
        assert_eq!(opacity(&doc, targets[2]), 0.0);

        scheduler.tick(50.0, &mut doc);
        assert_eq!(opacity(&doc, targets[0]), 1.0);
        assert!((opacity(&doc, targets[1]) - 0.5).abs() < 1e-5);
        assert_eq!(opacity(&doc, targets[2]), 0.0);
    }

    #[test]
    fn test_completion_fires_once_after_last_target() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 4);
        let scheduler = TweenScheduler::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();

        scheduler.handle().to(
            &targets,
            TweenVars::new(100)
                .opacity(1.0)
                .stagger(Stagger::new(20.0))
                .on_complete(move |_, _| seen.set(seen.get() + 1)),
        );

        // Last target starts at 60ms and ends at 160ms
        scheduler.tick(150.0, &mut doc);
        assert_eq!(count.get(), 0);
        scheduler.tick(10.0, &mut doc);
        assert_eq!(count.get(), 1);
        scheduler.tick(10.0, &mut doc);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_completion_can_chain_tweens() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 2);
        let scheduler = TweenScheduler::new();
        let chained = targets.clone();

        scheduler.handle().to(
            &targets,
            TweenVars::new(50)
                .opacity(1.0)
                .on_complete(move |_, handle| {
                    handle.to(&chained, TweenVars::new(50).opacity(0.0));
                }),
        );

        scheduler.tick(50.0, &mut doc);
        assert_eq!(opacity(&doc, targets[0]), 1.0);
        assert_eq!(scheduler.tween_count(), 1);

        scheduler.run_until_idle(&mut doc, 10.0, 100);
        assert_eq!(opacity(&doc, targets[0]), 0.0);
    }

    #[test]
    fn test_empty_targets_complete_next_tick() {
        let mut doc = Document::new();
        let scheduler = TweenScheduler::new();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();

        scheduler
            .handle()
            .to(&[], TweenVars::new(100).opacity(1.0).on_complete(move |_, _| flag.set(true)));
        scheduler.tick(1.0, &mut doc);
        assert!(done.get());
    }

    #[test]
    fn test_overwrite_auto_kills_older_tween() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 2);
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();
        let first_done = Rc::new(Cell::new(false));
        let flag = first_done.clone();

        handle.to(
            &targets,
            TweenVars::new(1000)
                .opacity(1.0)
                .on_complete(move |_, _| flag.set(true)),
        );
        scheduler.tick(100.0, &mut doc);

        handle.to(
            &targets,
            TweenVars::new(100)
                .opacity(0.0)
                .overwrite(Overwrite::Auto),
        );
        scheduler.tick(16.0, &mut doc);
        assert_eq!(scheduler.tween_count(), 1);

        scheduler.run_until_idle(&mut doc, 16.0, 100);
        assert!(!first_done.get());
        for t in targets {
            assert_eq!(opacity(&doc, t), 0.0);
        }
    }

    #[test]
    fn test_overwrite_none_last_writer_wins() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 1);
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();

        handle.to(&targets, TweenVars::new(1000).opacity(1.0));
        handle.to(&targets, TweenVars::new(100).opacity(0.0));

        // Both render this frame; the newer one writes last
        scheduler.tick(100.0, &mut doc);
        assert_eq!(scheduler.tween_count(), 1);
        assert_eq!(opacity(&doc, targets[0]), 0.0);

        // The older tween was never killed and keeps writing
        scheduler.tick(100.0, &mut doc);
        assert!(opacity(&doc, targets[0]) > 0.0);
    }

    #[test]
    fn test_kill_skips_completion() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 1);
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();

        let id = handle
            .to(
                &targets,
                TweenVars::new(100)
                    .opacity(1.0)
                    .on_complete(move |_, _| flag.set(true)),
            )
            .unwrap();
        assert!(handle.is_active(id));
        assert!(handle.is_tweening(targets[0]));
        assert!(handle.kill(id));
        assert!(!handle.is_active(id));

        scheduler.run_until_idle(&mut doc, 16.0, 10);
        assert!(!done.get());
        assert_eq!(opacity(&doc, targets[0]), 0.0);
    }

    #[test]
    fn test_kill_tweens_of_target() {
        let mut doc = Document::new();
        let targets = letters(&mut doc, 2);
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();

        handle.to(&targets[..1], TweenVars::new(100).opacity(1.0));
        handle.to(&targets, TweenVars::new(100).opacity(1.0));
        assert_eq!(handle.kill_tweens_of(targets[0]), 2);

        scheduler.run_until_idle(&mut doc, 16.0, 100);
        assert_eq!(opacity(&doc, targets[0]), 0.0);
        assert_eq!(opacity(&doc, targets[1]), 1.0);
    }

    #[test]
    fn test_removed_target_is_skipped() {
        let mut doc = Document::new();
        let parent = doc.create_element("p");
        let targets = letters(&mut doc, 2);
        for t in &targets {
            doc.append_child(parent, *t).unwrap();
        }
        let scheduler = TweenScheduler::new();
        scheduler
            .handle()
            .to(&targets, TweenVars::new(100).opacity(1.0));

        doc.remove_children(parent).unwrap();
        scheduler.run_until_idle(&mut doc, 16.0, 100);
        assert!(!scheduler.has_active_tweens());
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = TweenScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());
        assert!(handle.to(&[], TweenVars::new(100)).is_none());
        assert_eq!(handle.active_count(), 0);
        assert!(!SchedulerHandle::detached().is_alive());
    }
}
