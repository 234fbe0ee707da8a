use super::{Dock, DockCx, factory_accepts, grid_cells, grid_dims, grid_insertion, grid_near_boundary};
use crate::dock_engine::DockId;
use crate::dock_engine::factory::{DockFactory, FactoryRegistry};
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::position::Position;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Child docks in equal grid cells, filled row by row.
#[derive(Debug, Clone)]
pub struct CompositeGrid {
    pub child_factory: Box<dyn DockFactory>,
}

impl CompositeGrid {
    pub fn new(child_factory: Box<dyn DockFactory>) -> Self { CompositeGrid { child_factory } }
}

impl Dock for CompositeGrid {
    fn kind_name(&self) -> &'static str { "composite_grid" }

    fn accepted_modes(&self) -> DockingModes { DockingModes::GRID }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        if !item.supports(DockingModes::GRID)
            || !factory_accepts(&*self.child_factory, item, DockingModes::GRID)
        {
            return Priority::CannotDock;
        }
        let count = cx.child_count();
        if count == 0 {
            return Priority::inside(cx.central_hit(at));
        }
        let cells = grid_cells(cx.bounds(), count);
        Priority::inside(grid_near_boundary(&cells, at, cx.settings().boundary_band))
    }

    fn docking_rectangle(&self, cx: &DockCx, _item: &Draggable, at: Point) -> Rect {
        let count = cx.child_count();
        if count == 0 {
            return cx.bounds();
        }
        let index = self.child_insertion_index(cx, at);
        grid_cells(cx.bounds(), count + 1)[index]
    }

    fn child_position(&self, cx: &DockCx, child: DockId) -> Option<Position> {
        cx.children().iter().position(|c| *c == child).map(Position::index)
    }

    fn child_insertion_index(&self, cx: &DockCx, at: Point) -> usize {
        grid_insertion(&grid_cells(cx.bounds(), cx.child_count()), at)
    }

    fn layout_children(&self, cx: &DockCx) -> Vec<(DockId, Rect)> {
        let children = cx.children();
        let cells = grid_cells(cx.bounds(), children.len());
        children.into_iter().zip(cells).collect()
    }

    fn preferred_size(&self, cx: &DockCx) -> Size {
        let children = cx.children();
        let (cols, rows) = grid_dims(children.len());
        let cell = children.into_iter().fold(Size::default(), |acc, c| acc.union(cx.preferred_size_of(c)));
        Size::new(cell.width * cols as i32, cell.height * rows as i32)
    }

    fn save_properties(&self, _cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}childDockFactory"), self.child_factory.key());
        self.child_factory.save_properties(&format!("{prefix}childDockFactory."), store);
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, registry: &FactoryRegistry) {
        self.child_factory = registry.load_factory(&format!("{prefix}childDockFactory"), store);
    }

    fn child_factory(&self) -> Option<&dyn DockFactory> { Some(&*self.child_factory) }

    fn child_factory_mut(&mut self) -> Option<&mut Box<dyn DockFactory>> { Some(&mut self.child_factory) }
}
