//! Glint Core
//!
//! The host primitives visual effects run against:
//!
//! - **Document**: a retained element tree with attributes, classes and
//!   animatable inline styles
//! - **Geometry**: page-space rectangles used for visibility tests
//! - **Events**: pointer events with default-action suppression
//! - **Observer**: threshold-based visibility observation with root margins
//!
//! Everything here is single-threaded. Effects own their observers and
//! mutate the document only from inside the page's event loop.

pub mod document;
pub mod error;
pub mod events;
pub mod geometry;
pub mod observer;
pub mod style;

pub use document::{Document, ElementData, Node, NodeData, NodeId, Selector};
pub use error::DomError;
pub use events::{EventType, PointerEvent};
pub use geometry::{Point, Rect, Size};
pub use observer::{ObserverOptions, VisibilityEntry, VisibilityObserver};
pub use style::{Cursor, Display, Style, StyleProperty};
