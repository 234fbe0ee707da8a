//! The closed set of dock kinds and the operations every kind answers.

pub mod border;
pub mod composite_grid;
pub mod composite_line;
pub mod composite_tab;
pub mod float;
pub mod grid;
pub mod line;
pub mod single;
pub mod split;
pub mod tab;

pub use border::Border;
pub use composite_grid::CompositeGrid;
pub use composite_line::CompositeLine;
pub use composite_tab::CompositeTab;
use enum_dispatch::enum_dispatch;
pub use float::Float;
pub use grid::Grid;
pub use line::Line;
pub use single::Single;
pub use split::Split;
pub use tab::Tab;

use super::engine::DockEngine;
use super::error::{DockError, Result};
use super::factory::{DockFactory, FactoryRegistry};
use super::graph::Orientation;
use super::persist::PropertyStore;
use super::position::Position;
use super::priority::Priority;
use super::DockId;
use crate::common::collections::BTreeSet;
use crate::common::config::DockSettings;
use crate::model::dockable::{Dockable, DockableId, DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Read-only view of the engine around one dock.
#[derive(Clone, Copy)]
pub struct DockCx<'a> {
    pub engine: &'a DockEngine,
    pub id: DockId,
}

impl<'a> DockCx<'a> {
    pub fn new(engine: &'a DockEngine, id: DockId) -> Self { DockCx { engine, id } }

    pub fn bounds(&self) -> Rect { self.engine.bounds(self.id).unwrap_or_default() }

    pub fn settings(&self) -> &'a DockSettings { &self.engine.settings }

    pub fn children(&self) -> Vec<DockId> { self.engine.child_docks(self.id) }

    pub fn child_count(&self) -> usize { self.engine.child_dock_count(self.id) }

    pub fn parent(&self) -> Option<DockId> { self.engine.parent(self.id) }

    pub fn kind_of(&self, id: DockId) -> Option<&'a DockKind> { self.engine.kind(id).ok() }

    pub fn preferred_size_of(&self, id: DockId) -> Size { self.engine.preferred_size(id) }

    pub fn dockables_under(&self, id: DockId) -> BTreeSet<DockableId> {
        self.engine.dockables_under(id).into_iter().collect()
    }

    pub fn central_hit(&self, at: Point) -> bool {
        self.bounds().central(self.settings().priority_margin).contains(at)
    }

    /// Selected child as tracked by the tree observer.
    pub fn selected_child(&self) -> Option<DockId> { self.engine.selected_child(self.id) }
}

/// Operations every dock kind answers. Structural commits live on the
/// engine because they create and destroy nodes.
#[enum_dispatch]
pub trait Dock {
    fn kind_name(&self) -> &'static str;

    /// Modes this dock can ever accept.
    fn accepted_modes(&self) -> DockingModes;

    fn is_full(&self, cx: &DockCx) -> bool;

    /// Kind-specific scoring. The engine has already checked that the point
    /// is inside the bounds and that the dock is not full.
    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority;

    /// Where the item's content would land. Only asked for non-rejected drops.
    fn docking_rectangle(&self, cx: &DockCx, item: &Draggable, at: Point) -> Rect;

    fn child_position(&self, _cx: &DockCx, _child: DockId) -> Option<Position> { None }

    /// Index a new child created for a drop at `at` is inserted at.
    fn child_insertion_index(&self, cx: &DockCx, _at: Point) -> usize { cx.child_count() }

    /// Rectangles of the child docks, in child order.
    fn layout_children(&self, _cx: &DockCx) -> Vec<(DockId, Rect)> { Vec::new() }

    fn child_visible(&self, _cx: &DockCx, _child: DockId) -> bool { true }

    /// Forgets per-child bookkeeping after the child left the tree.
    fn child_removed(&mut self, _child: DockId) {}

    fn preferred_size(&self, cx: &DockCx) -> Size;

    /// Writes the kind's own scalar settings.
    fn save_properties(&self, _cx: &DockCx, _prefix: &str, _store: &mut PropertyStore) {}

    fn load_properties(&mut self, _prefix: &str, _store: &PropertyStore, _registry: &FactoryRegistry) {}

    fn child_factory(&self) -> Option<&dyn DockFactory> { None }

    fn child_factory_mut(&mut self) -> Option<&mut Box<dyn DockFactory>> { None }
}

#[enum_dispatch(Dock)]
#[derive(Debug, Clone)]
pub enum DockKind {
    Single,
    Line,
    Grid,
    Tab,
    Border,
    Split,
    CompositeLine,
    CompositeGrid,
    CompositeTab,
    Float,
}

impl DockKind {
    /// Builds an empty dock from its persisted kind name.
    pub fn from_name(name: &str, registry: &FactoryRegistry) -> Option<DockKind> {
        let kind = match name {
            "single" => Single::default().into(),
            "line" => Line::default().into(),
            "grid" => Grid::default().into(),
            "tab" => Tab::default().into(),
            "border" => Border::new(registry.default_factory()).into(),
            "split" => Split::new(registry.default_factory()).into(),
            "composite_line" => CompositeLine::new(registry.default_factory()).into(),
            "composite_grid" => CompositeGrid::new(registry.default_factory()).into(),
            "composite_tab" => CompositeTab::new(registry.default_factory()).into(),
            "float" => Float::default().into(),
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_leaf(&self) -> bool { self.as_leaf().is_some() }

    pub fn is_float(&self) -> bool { matches!(self, DockKind::Float(_)) }

    pub fn as_leaf(&self) -> Option<&dyn LeafDock> {
        match self {
            DockKind::Single(d) => Some(d),
            DockKind::Line(d) => Some(d),
            DockKind::Grid(d) => Some(d),
            DockKind::Tab(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut dyn LeafDock> {
        match self {
            DockKind::Single(d) => Some(d),
            DockKind::Line(d) => Some(d),
            DockKind::Grid(d) => Some(d),
            DockKind::Tab(d) => Some(d),
            _ => None,
        }
    }
}

/// Docks that hold dockables directly.
pub trait LeafDock {
    fn dockables(&self) -> &[Dockable];

    fn dockables_mut(&mut self) -> &mut Vec<Dockable>;

    /// Maximum number of dockables, if bounded.
    fn capacity(&self) -> Option<usize> { None }

    /// Index a drop at `at` is inserted at. Only asked when occupied.
    fn insertion_index(&self, _bounds: Rect, _settings: &DockSettings, _at: Point) -> usize {
        self.dockables().len()
    }

    /// Content rectangle of every dockable, in order.
    fn dockable_rects(&self, bounds: Rect, settings: &DockSettings) -> Vec<Rect>;

    fn selected(&self) -> Option<usize> { None }

    fn set_selected(&mut self, _index: Option<usize>) {}

    fn position_of(&self, id: &DockableId) -> Option<usize> {
        self.dockables().iter().position(|d| d.id() == id)
    }

    fn insert_at(&mut self, index: usize, items: Vec<Dockable>) -> Result<()> {
        let len = self.dockables().len();
        if index > len {
            return Err(DockError::IndexOutOfRange { index, len });
        }
        if let Some(cap) = self.capacity() {
            if len + items.len() > cap {
                return Err(DockError::illegal(format!(
                    "dock holds at most {cap} dockable(s), has {len}, adding {}",
                    items.len()
                )));
            }
        }
        if items.is_empty() {
            return Ok(());
        }
        self.dockables_mut().splice(index..index, items);
        // Tabs bring the first new member to the front; other kinds ignore it.
        self.set_selected(Some(index));
        Ok(())
    }

    fn remove(&mut self, id: &DockableId) -> Option<(usize, Dockable)> {
        let index = self.position_of(id)?;
        let removed = self.dockables_mut().remove(index);
        let len = self.dockables().len();
        let selected = match self.selected() {
            _ if len == 0 => None,
            Some(s) if s > index => Some(s - 1),
            Some(s) if s == index => Some(index.min(len - 1)),
            other => other,
        };
        self.set_selected(selected);
        Some((index, removed))
    }

    fn move_to(&mut self, id: &DockableId, index: usize) -> Result<()> {
        let len = self.dockables().len();
        if index >= len {
            return Err(DockError::IndexOutOfRange { index, len });
        }
        let from = self.position_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let item = self.dockables_mut().remove(from);
        self.dockables_mut().insert(index, item);
        self.set_selected(Some(index));
        Ok(())
    }
}

/// Strip boundaries along `o`: the start of every rect plus the end of the last.
pub(crate) fn strip_boundaries(o: Orientation, rects: &[Rect]) -> Vec<i32> {
    let mut out: Vec<i32> = rects.iter().map(|r| o.start(*r)).collect();
    if let Some(last) = rects.last() {
        out.push(o.start(*last) + o.extent(*last));
    }
    out
}

pub(crate) fn near_any(coord: i32, boundaries: &[i32], band: i32) -> bool {
    boundaries.iter().any(|b| (coord - b).abs() <= band)
}

/// Nearest-neighbor bisection: the first rect whose midpoint lies past the
/// point, else append.
pub(crate) fn bisect(o: Orientation, rects: &[Rect], at: Point) -> usize {
    let coord = o.along(at);
    rects
        .iter()
        .position(|r| coord < o.start(*r) + o.extent(*r) / 2)
        .unwrap_or(rects.len())
}

/// Splits `bounds` along `o` in proportion to `weights`. Equal strips when
/// every weight is zero.
pub(crate) fn weighted_strips(o: Orientation, bounds: Rect, weights: &[i32]) -> Vec<Rect> {
    let sum: i64 = weights.iter().map(|w| i64::from((*w).max(0))).sum();
    if sum == 0 {
        return o.strips(bounds, weights.len());
    }
    let total = i64::from(o.extent(bounds).max(0));
    let mut cum = 0i64;
    let mut prev = 0i32;
    weights
        .iter()
        .map(|w| {
            cum += i64::from((*w).max(0));
            let end = (total * cum / sum) as i32;
            let start = prev;
            prev = end;
            match o {
                Orientation::Horizontal => {
                    Rect::new(bounds.x + start, bounds.y, end - start, bounds.height)
                }
                Orientation::Vertical => Rect::new(bounds.x, bounds.y + start, bounds.width, end - start),
            }
        })
        .collect()
}

/// Columns and rows for `n` cells: as square as possible, wider than tall.
pub(crate) fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let mut cols = (n as f64).sqrt().ceil() as usize;
    while cols * cols < n {
        cols += 1;
    }
    (cols, n.div_ceil(cols))
}

pub(crate) fn grid_cells(bounds: Rect, n: usize) -> Vec<Rect> {
    let (cols, rows) = grid_dims(n);
    bounds.rows(rows).into_iter().flat_map(|row| row.columns(cols)).take(n).collect()
}

/// Insertion index for a point over grid `cells`: before the cell under the
/// point when in its left half, after it otherwise, append when outside.
pub(crate) fn grid_insertion(cells: &[Rect], at: Point) -> usize {
    match cells.iter().position(|c| c.contains(at)) {
        Some(i) if at.x < cells[i].center().x => i,
        Some(i) => i + 1,
        None => cells.len(),
    }
}

pub(crate) fn grid_near_boundary(cells: &[Rect], at: Point, band: i32) -> bool {
    cells
        .iter()
        .filter(|c| c.contains(at))
        .any(|c| near_any(at.x, &[c.x, c.right()], band))
}

pub(crate) fn factory_accepts(factory: &dyn DockFactory, item: &Draggable, mode: DockingModes) -> bool {
    factory.create_dock(item, mode).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions() {
        assert_eq!((0, 0), grid_dims(0));
        assert_eq!((1, 1), grid_dims(1));
        assert_eq!((2, 1), grid_dims(2));
        assert_eq!((2, 2), grid_dims(3));
        assert_eq!((2, 2), grid_dims(4));
        assert_eq!((3, 2), grid_dims(5));
        assert_eq!((3, 3), grid_dims(9));
        assert_eq!((4, 3), grid_dims(10));
    }

    #[test]
    fn grid_cells_tile_rows() {
        let cells = grid_cells(Rect::new(0, 0, 100, 100), 3);
        assert_eq!(
            vec![Rect::new(0, 0, 50, 50), Rect::new(50, 0, 50, 50), Rect::new(0, 50, 50, 50)],
            cells
        );
        assert_eq!(0, grid_insertion(&cells, Point::new(10, 10)));
        assert_eq!(1, grid_insertion(&cells, Point::new(40, 10)));
        assert_eq!(3, grid_insertion(&cells, Point::new(75, 75)));
    }

    #[test]
    fn weighted_strips_tile_exactly() {
        let bounds = Rect::new(10, 0, 1000, 50);
        let strips = weighted_strips(Orientation::Horizontal, bounds, &[300, 200, 0]);
        assert_eq!(Rect::new(10, 0, 600, 50), strips[0]);
        assert_eq!(Rect::new(610, 0, 400, 50), strips[1]);
        assert_eq!(0, strips[2].width);
        let equal = weighted_strips(Orientation::Vertical, bounds, &[0, 0]);
        assert_eq!(25, equal[0].height);
    }

    #[test]
    fn bisection() {
        let rects = Orientation::Horizontal.strips(Rect::new(0, 0, 300, 10), 3);
        assert_eq!(0, bisect(Orientation::Horizontal, &rects, Point::new(20, 5)));
        assert_eq!(1, bisect(Orientation::Horizontal, &rects, Point::new(80, 5)));
        assert_eq!(3, bisect(Orientation::Horizontal, &rects, Point::new(290, 5)));
        assert_eq!(vec![0, 100, 200, 300], strip_boundaries(Orientation::Horizontal, &rects));
    }
}
