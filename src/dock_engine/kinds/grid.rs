use serde::{Deserialize, Serialize};

use super::{Dock, DockCx, LeafDock, grid_cells, grid_dims, grid_insertion, grid_near_boundary};
use crate::common::config::DockSettings;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{Dockable, DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Dockables in an automatically sized grid, filled row by row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    dockables: Vec<Dockable>,
}

impl Dock for Grid {
    fn kind_name(&self) -> &'static str { "grid" }

    fn accepted_modes(&self) -> DockingModes { DockingModes::GRID }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        if !item.supports(DockingModes::GRID) {
            return Priority::CannotDock;
        }
        if self.dockables.is_empty() {
            return Priority::inside(cx.central_hit(at));
        }
        let cells = self.dockable_rects(cx.bounds(), cx.settings());
        Priority::inside(grid_near_boundary(&cells, at, cx.settings().boundary_band))
    }

    fn docking_rectangle(&self, cx: &DockCx, item: &Draggable, at: Point) -> Rect {
        if self.dockables.is_empty() {
            return cx.bounds();
        }
        let index = self.insertion_index(cx.bounds(), cx.settings(), at);
        grid_cells(cx.bounds(), self.dockables.len() + item.len())[index]
    }

    fn preferred_size(&self, _cx: &DockCx) -> Size {
        let (cols, rows) = grid_dims(self.dockables.len());
        let cell = self.dockables.iter().fold(Size::default(), |acc, d| acc.union(d.preferred_size));
        Size::new(cell.width * cols as i32, cell.height * rows as i32)
    }
}

impl LeafDock for Grid {
    fn dockables(&self) -> &[Dockable] { &self.dockables }

    fn dockables_mut(&mut self) -> &mut Vec<Dockable> { &mut self.dockables }

    fn insertion_index(&self, bounds: Rect, settings: &DockSettings, at: Point) -> usize {
        grid_insertion(&self.dockable_rects(bounds, settings), at)
    }

    fn dockable_rects(&self, bounds: Rect, _settings: &DockSettings) -> Vec<Rect> {
        grid_cells(bounds, self.dockables.len())
    }
}
