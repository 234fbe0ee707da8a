pub mod drag;
pub mod engine;
pub mod error;
pub mod events;
pub mod factory;
pub(crate) mod graph;
pub mod kinds;
pub mod persist;
pub mod position;
pub mod priority;

pub use drag::{DragFeedback, GestureId};
pub use engine::{DockEngine, DockNode, DockSnapshot, DockingPreview};
pub use error::{DockError, Result};
pub use events::{DockingEvent, DockingListener, DockingPhase, ListenerId};
pub use factory::{DockFactory, FactoryRegistry};
pub use graph::{FillMode, HeaderPosition, Orientation, Side};
pub use kinds::{Dock, DockKind, LeafDock};
pub use persist::PropertyStore;
pub use position::Position;
pub use priority::Priority;

/// Docks are nodes of the engine's arena.
pub type DockId = crate::model::tree::NodeId;
