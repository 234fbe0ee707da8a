use super::{Dock, DockCx, bisect, factory_accepts, near_any, strip_boundaries, weighted_strips};
use crate::dock_engine::DockId;
use crate::dock_engine::factory::{DockFactory, FactoryRegistry};
use crate::dock_engine::graph::Orientation;
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::position::Position;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Child docks side by side along one axis, sized by their preferred extent.
#[derive(Debug, Clone)]
pub struct CompositeLine {
    pub orientation: Orientation,
    pub child_factory: Box<dyn DockFactory>,
}

impl CompositeLine {
    pub fn new(child_factory: Box<dyn DockFactory>) -> Self {
        CompositeLine { orientation: Orientation::Horizontal, child_factory }
    }

    fn rects_for(&self, bounds: Rect, sizes: &[Size]) -> Vec<Rect> {
        let weights: Vec<i32> = sizes.iter().map(|s| self.orientation.size_along(*s)).collect();
        weighted_strips(self.orientation, bounds, &weights)
    }

    fn child_sizes(&self, cx: &DockCx) -> Vec<Size> {
        cx.children().into_iter().map(|c| cx.preferred_size_of(c)).collect()
    }

    fn child_rects(&self, cx: &DockCx) -> Vec<Rect> { self.rects_for(cx.bounds(), &self.child_sizes(cx)) }
}

impl Dock for CompositeLine {
    fn kind_name(&self) -> &'static str { "composite_line" }

    fn accepted_modes(&self) -> DockingModes { self.orientation.line_mode() }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        let mode = self.orientation.line_mode();
        if !item.supports(mode) || !factory_accepts(&*self.child_factory, item, mode) {
            return Priority::CannotDock;
        }
        if cx.child_count() == 0 {
            return Priority::inside(cx.central_hit(at));
        }
        let boundaries = strip_boundaries(self.orientation, &self.child_rects(cx));
        Priority::inside(near_any(self.orientation.along(at), &boundaries, cx.settings().boundary_band))
    }

    fn docking_rectangle(&self, cx: &DockCx, item: &Draggable, at: Point) -> Rect {
        if cx.child_count() == 0 {
            return cx.bounds();
        }
        let index = self.child_insertion_index(cx, at);
        let mut sizes = self.child_sizes(cx);
        sizes.insert(index, self.child_factory.dock_preferred_size(item, self.orientation.line_mode()));
        self.rects_for(cx.bounds(), &sizes)[index]
    }

    fn child_position(&self, cx: &DockCx, child: DockId) -> Option<Position> {
        cx.children().iter().position(|c| *c == child).map(Position::index)
    }

    fn child_insertion_index(&self, cx: &DockCx, at: Point) -> usize {
        bisect(self.orientation, &self.child_rects(cx), at)
    }

    fn layout_children(&self, cx: &DockCx) -> Vec<(DockId, Rect)> {
        cx.children().into_iter().zip(self.child_rects(cx)).collect()
    }

    fn preferred_size(&self, cx: &DockCx) -> Size {
        self.child_sizes(cx).into_iter().fold(Size::default(), |acc, s| self.orientation.stack(acc, s))
    }

    fn save_properties(&self, _cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}orientation"), self.orientation);
        store.set(format!("{prefix}childDockFactory"), self.child_factory.key());
        self.child_factory.save_properties(&format!("{prefix}childDockFactory."), store);
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, registry: &FactoryRegistry) {
        self.orientation = store.get_or(&format!("{prefix}orientation"), self.orientation);
        self.child_factory = registry.load_factory(&format!("{prefix}childDockFactory"), store);
    }

    fn child_factory(&self) -> Option<&dyn DockFactory> { Some(&*self.child_factory) }

    fn child_factory_mut(&mut self) -> Option<&mut Box<dyn DockFactory>> { Some(&mut self.child_factory) }
}
