//! The effect interface driven by [`Page`](crate::Page)

use std::any::Any;

use glint_animation::SchedulerHandle;
use glint_core::{Document, PointerEvent, Rect};

/// Everything an effect may touch while handling an event
pub struct EffectContext<'a> {
    pub document: &'a mut Document,
    /// Handle to the tween engine; may be unavailable
    pub animations: &'a SchedulerHandle,
    /// Current viewport in document coordinates
    pub viewport: Rect,
}

/// A page effect
///
/// The page calls [`initialize`](Effect::initialize) once when the document
/// is ready, then forwards viewport changes and pointer-enter events. Each
/// handler runs to completion before the next event is delivered.
pub trait Effect {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, cx: &mut EffectContext<'_>);

    /// The viewport moved or resized; re-evaluate visibility
    fn on_viewport_change(&mut self, _cx: &mut EffectContext<'_>) {}

    /// The pointer entered `event.current_target`, a node this effect
    /// registered a listener on
    fn on_pointer_enter(&mut self, _cx: &mut EffectContext<'_>, _event: &mut PointerEvent) {}

    fn as_any(&self) -> &dyn Any;
}
