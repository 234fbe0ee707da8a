use thiserror::Error;

use super::DockId;
use super::drag::GestureId;
use crate::model::dockable::{DockableId, Draggable};

/// Faults raised by structural operations. All of them mean the caller
/// skipped a check (`dock_priority`, `can_remove_dockable`, child counts);
/// none leave the tree half-modified.
#[derive(Debug, Error)]
pub enum DockError {
    #[error("Unknown dock: {0:?}")]
    UnknownDock(DockId),
    #[error("Illegal state: {0}")]
    IllegalState(String),
    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Dockable not found: {0}")]
    DockableNotFound(DockableId),
    #[error("Dock {child:?} is not a child of {parent:?}")]
    NotAChild { parent: DockId, child: DockId },
    /// The drop is not acceptable any more. The rejected item is handed back.
    #[error("Cannot dock into {0:?}")]
    CannotDock(DockId, Box<Draggable>),
    #[error("Unknown drag gesture: {0:?}")]
    UnknownGesture(GestureId),
}

impl DockError {
    pub(crate) fn illegal(msg: impl Into<String>) -> Self { DockError::IllegalState(msg.into()) }

    /// Recovers the draggable from a rejected drop.
    pub fn into_rejected(self) -> Option<Draggable> {
        match self {
            DockError::CannotDock(_, item) => Some(*item),
            _ => None,
        }
    }
}

pub type Result<T, E = DockError> = std::result::Result<T, E>;
