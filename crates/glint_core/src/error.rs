//! Tree errors

use thiserror::Error;

use crate::document::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot append {child:?} to {parent:?}: child is an ancestor of the parent")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
