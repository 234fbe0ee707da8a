use super::{Dock, DockCx, factory_accepts};
use crate::common::collections::HashMap;
use crate::dock_engine::DockId;
use crate::dock_engine::factory::{DockFactory, FactoryRegistry, SplitFactory};
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::position::Position;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Top-level floating windows, each holding one child dock. Child order is
/// z-order, front-most first. A float dock never has a parent.
#[derive(Debug, Clone)]
pub struct Float {
    windows: HashMap<DockId, Rect>,
    pub child_factory: Box<dyn DockFactory>,
    /// Name of the top-level window the floating windows belong to.
    pub owner: Option<String>,
}

impl Default for Float {
    fn default() -> Self {
        Float {
            windows: HashMap::default(),
            child_factory: Box::new(SplitFactory::default()),
            owner: None,
        }
    }
}

impl Float {
    pub fn window(&self, child: DockId) -> Option<Rect> { self.windows.get(&child).copied() }

    pub(crate) fn set_window(&mut self, child: DockId, rect: Rect) { self.windows.insert(child, rect); }

    pub fn window_count(&self) -> usize { self.windows.len() }

    /// Window for content of `size` dropped at `at` while grabbed at `grab`.
    pub fn window_for(at: Point, grab: Point, size: Size) -> Rect { Rect::from_origin_size(at - grab, size) }
}

impl Dock for Float {
    fn kind_name(&self) -> &'static str { "float" }

    fn accepted_modes(&self) -> DockingModes { DockingModes::FLOAT }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, _cx: &DockCx, item: &Draggable, _at: Point) -> Priority {
        if item.supports(DockingModes::FLOAT)
            && factory_accepts(&*self.child_factory, item, DockingModes::FLOAT)
        {
            Priority::CanDockAsLast
        } else {
            Priority::CannotDock
        }
    }

    fn docking_rectangle(&self, _cx: &DockCx, item: &Draggable, at: Point) -> Rect {
        let size = self.child_factory.dock_preferred_size(item, DockingModes::FLOAT);
        Rect::from_origin_size(at, size)
    }

    fn child_position(&self, cx: &DockCx, child: DockId) -> Option<Position> {
        let z = cx.children().iter().position(|c| *c == child)?;
        let window = self.window(child).unwrap_or_default();
        Some(Position::float(window.x, window.y, z as i32))
    }

    /// New windows go to the front.
    fn child_insertion_index(&self, _cx: &DockCx, _at: Point) -> usize { 0 }

    fn layout_children(&self, cx: &DockCx) -> Vec<(DockId, Rect)> {
        cx.children().into_iter().map(|c| (c, self.window(c).unwrap_or_default())).collect()
    }

    fn child_removed(&mut self, child: DockId) { self.windows.remove(&child); }

    fn preferred_size(&self, _cx: &DockCx) -> Size { Size::default() }

    fn save_properties(&self, _cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}childDockFactory"), self.child_factory.key());
        self.child_factory.save_properties(&format!("{prefix}childDockFactory."), store);
        if let Some(owner) = &self.owner {
            store.set(format!("{prefix}owner"), owner);
        }
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, registry: &FactoryRegistry) {
        self.child_factory = registry.load_factory(&format!("{prefix}childDockFactory"), store);
        self.owner = store.get(&format!("{prefix}owner")).map(str::to_string);
    }

    fn child_factory(&self) -> Option<&dyn DockFactory> { Some(&*self.child_factory) }

    fn child_factory_mut(&mut self) -> Option<&mut Box<dyn DockFactory>> { Some(&mut self.child_factory) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_origin_follows_grab_offset() {
        assert_eq!(
            Rect::new(90, 195, 300, 200),
            Float::window_for(Point::new(100, 200), Point::new(10, 5), Size::new(300, 200))
        );
    }
}
