use super::tab::{tab_insertion, tab_priority};
use super::{Dock, DockCx, factory_accepts};
use crate::dock_engine::DockId;
use crate::dock_engine::factory::{DockFactory, FactoryRegistry};
use crate::dock_engine::graph::{HeaderPosition, Orientation};
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::position::Position;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Child docks stacked behind header tabs; only the selected child shows.
/// Selection lives in the tree's selection observer.
#[derive(Debug, Clone)]
pub struct CompositeTab {
    pub header: HeaderPosition,
    pub child_factory: Box<dyn DockFactory>,
}

impl CompositeTab {
    pub fn new(child_factory: Box<dyn DockFactory>) -> Self {
        CompositeTab { header: HeaderPosition::default(), child_factory }
    }

    fn content(&self, cx: &DockCx) -> Rect { self.header.split(cx.bounds(), cx.settings().tab_header_size).1 }
}

impl Dock for CompositeTab {
    fn kind_name(&self) -> &'static str { "composite_tab" }

    fn accepted_modes(&self) -> DockingModes { DockingModes::TAB }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        if !item.supports(DockingModes::TAB)
            || !factory_accepts(&*self.child_factory, item, DockingModes::TAB)
        {
            return Priority::CannotDock;
        }
        tab_priority(cx, self.header, cx.child_count() > 0, at)
    }

    fn docking_rectangle(&self, cx: &DockCx, _item: &Draggable, _at: Point) -> Rect { self.content(cx) }

    fn child_position(&self, cx: &DockCx, child: DockId) -> Option<Position> {
        cx.children().iter().position(|c| *c == child).map(Position::index)
    }

    fn child_insertion_index(&self, cx: &DockCx, at: Point) -> usize {
        tab_insertion(self.header, cx.bounds(), cx.settings().tab_header_size, cx.child_count(), at)
    }

    fn layout_children(&self, cx: &DockCx) -> Vec<(DockId, Rect)> {
        let content = self.content(cx);
        cx.children().into_iter().map(|c| (c, content)).collect()
    }

    fn child_visible(&self, cx: &DockCx, child: DockId) -> bool { cx.selected_child() == Some(child) }

    fn preferred_size(&self, cx: &DockCx) -> Size {
        let content = cx
            .children()
            .into_iter()
            .fold(Size::default(), |acc, c| acc.union(cx.preferred_size_of(c)));
        let header = cx.settings().tab_header_size;
        match self.header.tab_axis() {
            Orientation::Horizontal => Size::new(content.width, content.height + header),
            Orientation::Vertical => Size::new(content.width + header, content.height),
        }
    }

    fn save_properties(&self, cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}headerPosition"), self.header);
        store.set(format!("{prefix}childDockFactory"), self.child_factory.key());
        self.child_factory.save_properties(&format!("{prefix}childDockFactory."), store);
        let selected = cx.selected_child().and_then(|s| cx.children().iter().position(|c| *c == s));
        if let Some(index) = selected {
            store.set(format!("{prefix}selectedChild"), index);
        }
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, registry: &FactoryRegistry) {
        self.header = store.get_or(&format!("{prefix}headerPosition"), self.header);
        self.child_factory = registry.load_factory(&format!("{prefix}childDockFactory"), store);
    }

    fn child_factory(&self) -> Option<&dyn DockFactory> { Some(&*self.child_factory) }

    fn child_factory_mut(&mut self) -> Option<&mut Box<dyn DockFactory>> { Some(&mut self.child_factory) }
}
