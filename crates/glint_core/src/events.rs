//! Pointer events
//!
//! Events are delivered synchronously by the page's event loop. Handlers may
//! call [`PointerEvent::prevent_default`] to suppress the element's default
//! action (for links, navigation).

use crate::document::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    PointerEnter,
    PointerLeave,
    PointerMove,
}

#[derive(Clone, Debug)]
pub struct PointerEvent {
    pub event_type: EventType,
    /// Node the pointer entered, left or moved over
    pub target: NodeId,
    /// Node whose listener is currently handling the event
    pub current_target: NodeId,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
