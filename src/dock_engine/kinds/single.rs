use serde::{Deserialize, Serialize};

use super::{Dock, DockCx, LeafDock};
use crate::common::config::DockSettings;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{Dockable, DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Holds at most one dockable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Single {
    dockables: Vec<Dockable>,
}

impl Dock for Single {
    fn kind_name(&self) -> &'static str { "single" }

    fn accepted_modes(&self) -> DockingModes { DockingModes::SINGLE }

    fn is_full(&self, _cx: &DockCx) -> bool { !self.dockables.is_empty() }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        if item.len() != 1 || !item.supports(DockingModes::SINGLE) {
            return Priority::CannotDock;
        }
        Priority::inside(cx.central_hit(at))
    }

    fn docking_rectangle(&self, cx: &DockCx, _item: &Draggable, _at: Point) -> Rect { cx.bounds() }

    fn preferred_size(&self, _cx: &DockCx) -> Size {
        self.dockables.first().map(|d| d.preferred_size).unwrap_or_default()
    }
}

impl LeafDock for Single {
    fn dockables(&self) -> &[Dockable] { &self.dockables }

    fn dockables_mut(&mut self) -> &mut Vec<Dockable> { &mut self.dockables }

    fn capacity(&self) -> Option<usize> { Some(1) }

    fn dockable_rects(&self, bounds: Rect, _settings: &DockSettings) -> Vec<Rect> {
        self.dockables.iter().map(|_| bounds).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock_engine::error::DockError;

    fn panel(id: &str) -> Dockable { Dockable::new(id, DockingModes::ALL, Size::new(10, 10)) }

    #[test]
    fn holds_one() {
        let mut single = Single::default();
        single.insert_at(0, vec![panel("a")]).unwrap();
        assert!(matches!(
            single.insert_at(1, vec![panel("b")]),
            Err(DockError::IllegalState(_))
        ));
        assert_eq!(1, single.dockables().len());
        assert_eq!(None, single.selected());
    }
}
