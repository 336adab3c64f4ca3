//! Visibility observation
//!
//! [`VisibilityObserver`] reports when a target's visible fraction crosses a
//! threshold, measured against the viewport grown by a root margin. It is
//! polled: the page calls [`VisibilityObserver::take_records`] after every
//! scroll or resize and hands the entries to the owning effect.
//!
//! Like the browser observer, a newly observed target produces one entry on
//! the next evaluation whether or not it is visible; after that, entries are
//! only produced when the threshold predicate flips.

use indexmap::IndexMap;

use crate::document::{Document, NodeId};
use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target's area that must be inside the root
    pub threshold: f32,
    /// Pixels added to every side of the viewport before intersecting
    pub root_margin: f32,
}

impl ObserverOptions {
    pub fn new(threshold: f32, root_margin: f32) -> Self {
        Self {
            threshold,
            root_margin,
        }
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A single visibility report
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub target: NodeId,
    /// Visible area divided by the target's area
    pub intersection_ratio: f32,
    /// Whether the threshold predicate currently holds
    pub is_intersecting: bool,
    pub bounds: Rect,
}

pub struct VisibilityObserver {
    options: ObserverOptions,
    /// Last reported predicate per target; `None` until the first report
    targets: IndexMap<NodeId, Option<bool>>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: IndexMap::new(),
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    /// Start observing `target`. Observing a target twice is a no-op.
    pub fn observe(&mut self, target: NodeId) {
        self.targets.entry(target).or_insert(None);
    }

    pub fn unobserve(&mut self, target: NodeId) {
        self.targets.shift_remove(&target);
    }

    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.targets.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Visible fraction of `bounds` inside `root`
    ///
    /// Zero-area targets count as fully visible when they touch the root.
    pub fn intersection_ratio(bounds: &Rect, root: &Rect) -> f32 {
        match bounds.intersection(root) {
            None => 0.0,
            Some(_) if bounds.area() <= 0.0 => 1.0,
            Some(visible) => (visible.area() / bounds.area()).clamp(0.0, 1.0),
        }
    }

    /// Evaluate every target against `viewport` and return the changes
    ///
    /// Targets removed from the document are dropped. Targets that exist but
    /// are not attached under the root count as not intersecting.
    pub fn take_records(&mut self, document: &Document, viewport: Rect) -> Vec<VisibilityEntry> {
        let root = viewport.inflate(self.options.root_margin);
        let threshold = self.options.threshold;
        let mut records = Vec::new();

        self.targets.retain(|target, last| {
            let Some(bounds) = document.bounds(*target) else {
                tracing::trace!("observer: dropping removed target {:?}", target);
                return false;
            };

            let connected = document.is_connected(*target);
            let ratio = if connected {
                Self::intersection_ratio(&bounds, &root)
            } else {
                0.0
            };
            let touching = connected && bounds.intersection(&root).is_some();
            let is_intersecting = touching && ratio >= threshold;

            if *last != Some(is_intersecting) {
                *last = Some(is_intersecting);
                records.push(VisibilityEntry {
                    target: *target,
                    intersection_ratio: ratio,
                    is_intersecting,
                    bounds,
                });
            }
            true
        });

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_block(bounds: Rect) -> (Document, NodeId) {
        let mut doc = Document::new();
        let block = doc.create_element("p");
        doc.append_child(doc.root(), block).unwrap();
        doc.set_bounds(block, bounds).unwrap();
        (doc, block)
    }

    #[test]
    fn test_initial_entry_reported_once() {
        let (doc, block) = doc_with_block(Rect::new(0.0, 2000.0, 100.0, 100.0));
        let mut observer = VisibilityObserver::new(ObserverOptions::new(0.3, 0.0));
        observer.observe(block);

        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let first = observer.take_records(&doc, viewport);
        assert_eq!(first.len(), 1);
        assert!(!first[0].is_intersecting);

        assert!(observer.take_records(&doc, viewport).is_empty());
    }

    #[test]
    fn test_threshold_crossing() {
        let (doc, block) = doc_with_block(Rect::new(0.0, 1000.0, 100.0, 100.0));
        let mut observer = VisibilityObserver::new(ObserverOptions::new(0.3, 0.0));
        observer.observe(block);
        observer.take_records(&doc, Rect::new(0.0, 0.0, 800.0, 600.0));

        // 20% visible: below threshold
        let records = observer.take_records(&doc, Rect::new(0.0, 420.0, 800.0, 600.0));
        assert!(records.is_empty());

        // 50% visible
        let records = observer.take_records(&doc, Rect::new(0.0, 450.0, 800.0, 600.0));
        assert_eq!(records.len(), 1);
        assert!(records[0].is_intersecting);
        assert!((records[0].intersection_ratio - 0.5).abs() < 1e-4);

        // Scrolled past
        let records = observer.take_records(&doc, Rect::new(0.0, 2000.0, 800.0, 600.0));
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_intersecting);
    }

    #[test]
    fn test_root_margin_pre_triggers() {
        // Top of the block sits 40px below the viewport bottom
        let (doc, block) = doc_with_block(Rect::new(0.0, 640.0, 100.0, 100.0));
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);

        let mut plain = VisibilityObserver::new(ObserverOptions::new(0.0, 0.0));
        plain.observe(block);
        assert!(!plain.take_records(&doc, viewport)[0].is_intersecting);

        let mut margin = VisibilityObserver::new(ObserverOptions::new(0.0, 50.0));
        margin.observe(block);
        let records = margin.take_records(&doc, viewport);
        assert!(records[0].is_intersecting);
        assert!((records[0].intersection_ratio - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_unobserve_and_removed_targets() {
        let (mut doc, block) = doc_with_block(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut observer = VisibilityObserver::new(ObserverOptions::default());
        observer.observe(block);
        observer.observe(block);
        assert_eq!(observer.len(), 1);

        observer.unobserve(block);
        assert!(observer.is_empty());

        observer.observe(block);
        doc.remove_children(doc.root()).unwrap();
        assert!(observer
            .take_records(&doc, Rect::new(0.0, 0.0, 100.0, 100.0))
            .is_empty());
        assert!(!observer.is_observing(block));
    }

    #[test]
    fn test_detached_target_is_not_intersecting() {
        let (mut doc, block) = doc_with_block(Rect::new(0.0, 0.0, 10.0, 10.0));
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut observer = VisibilityObserver::new(ObserverOptions::default());
        observer.observe(block);
        assert!(observer.take_records(&doc, viewport)[0].is_intersecting);

        let holder = doc.create_element("div");
        doc.append_child(holder, block).unwrap();
        let records = observer.take_records(&doc, viewport);
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_intersecting);
        assert_eq!(records[0].intersection_ratio, 0.0);
        assert!(observer.is_observing(block));

        let root = doc.root();
        doc.append_child(root, block).unwrap();
        assert!(observer.take_records(&doc, viewport)[0].is_intersecting);
    }

    #[test]
    fn test_disconnect_stops_all_targets() {
        let (doc, block) = doc_with_block(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut observer = VisibilityObserver::new(ObserverOptions::default());
        observer.observe(block);
        observer.observe(doc.root());
        assert_eq!(observer.len(), 2);

        observer.disconnect();
        assert!(observer.is_empty());
        assert!(observer
            .take_records(&doc, Rect::new(0.0, 0.0, 100.0, 100.0))
            .is_empty());
    }

    #[test]
    fn test_zero_area_target() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            VisibilityObserver::intersection_ratio(&Rect::new(10.0, 10.0, 0.0, 0.0), &root),
            1.0
        );
        assert_eq!(
            VisibilityObserver::intersection_ratio(&Rect::new(500.0, 10.0, 0.0, 0.0), &root),
            0.0
        );
    }
}
