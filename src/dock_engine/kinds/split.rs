use super::{Dock, DockCx, factory_accepts};
use crate::dock_engine::DockId;
use crate::dock_engine::factory::{DockFactory, FactoryRegistry};
use crate::dock_engine::graph::{Orientation, Side};
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::position::{CENTER, Position};
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Binary split: no child, one centered child, or two children divided
/// along `orientation`.
#[derive(Debug, Clone)]
pub struct Split {
    pub orientation: Orientation,
    /// Share of the extent given to the first child.
    pub ratio: f64,
    pub child_factory: Box<dyn DockFactory>,
}

impl Split {
    pub fn new(child_factory: Box<dyn DockFactory>) -> Self {
        Split { orientation: Orientation::Horizontal, ratio: 0.5, child_factory }
    }

    /// Ratio giving each side a share proportional to its preferred extent.
    pub fn ratio_for(first: i32, second: i32) -> f64 {
        let (first, second) = (first.max(0), second.max(0));
        if first + second == 0 {
            0.5
        } else {
            f64::from(first) / f64::from(first + second)
        }
    }

    /// Divider offset for an axis of `total` pixels, always in `[0, total]`.
    pub fn divider(&self, total: i32) -> i32 { divider_at(self.ratio, total) }

    pub fn side_of_index(&self, index: usize) -> Side {
        match (self.orientation, index) {
            (Orientation::Horizontal, 0) => Side::Left,
            (Orientation::Horizontal, _) => Side::Right,
            (Orientation::Vertical, 0) => Side::Top,
            (Orientation::Vertical, _) => Side::Bottom,
        }
    }

    /// The edge a drop at `at` would split along, and whether it is inside
    /// the edge band.
    pub fn drop_side(cx: &DockCx, at: Point) -> (Side, bool) {
        let (side, distance) = Side::nearest_edge(cx.bounds(), at);
        (side, distance < cx.settings().edge_fraction)
    }

    /// True when docking `item` on `side` would recreate the arrangement
    /// already on screen.
    fn is_same_arrangement(cx: &DockCx, item: &Draggable, side: Side) -> bool {
        let ids = item.ids();
        if cx.dockables_under(cx.id) == ids {
            return true;
        }
        let Some(parent) = cx.parent() else { return false };
        let Some(super::DockKind::Split(outer)) = cx.kind_of(parent) else { return false };
        let siblings = cx.engine.child_docks(parent);
        if siblings.len() != 2 || side.orientation() != Some(outer.orientation) {
            return false;
        }
        let Some(mine) = siblings.iter().position(|c| *c == cx.id) else { return false };
        let sibling = siblings[1 - mine];
        // Only the edge facing the sibling recreates the current split.
        let faces_sibling = if mine == 0 { !side.is_leading() } else { side.is_leading() };
        faces_sibling && cx.dockables_under(sibling) == ids
    }

    fn split_rects(&self, bounds: Rect) -> (Rect, Rect) {
        self.orientation.split(bounds, self.divider(self.orientation.extent(bounds)))
    }
}

pub(crate) fn divider_at(ratio: f64, total: i32) -> i32 {
    let total = total.max(0);
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.5 };
    ((f64::from(total) * ratio).round() as i32).clamp(0, total)
}

impl Dock for Split {
    fn kind_name(&self) -> &'static str { "split" }

    fn accepted_modes(&self) -> DockingModes {
        DockingModes::CENTER | DockingModes::LEFT | DockingModes::RIGHT | DockingModes::TOP | DockingModes::BOTTOM
    }

    fn is_full(&self, cx: &DockCx) -> bool { cx.child_count() >= 2 }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        match cx.child_count() {
            0 => {
                let ok = item.supports(DockingModes::CENTER)
                    && factory_accepts(&*self.child_factory, item, DockingModes::CENTER);
                if ok { Priority::inside(cx.central_hit(at)) } else { Priority::CannotDock }
            }
            1 => {
                let (side, in_band) = Self::drop_side(cx, at);
                if !item.supports(side.mode())
                    || !factory_accepts(&*self.child_factory, item, side.mode())
                    || Self::is_same_arrangement(cx, item, side)
                {
                    return Priority::CannotDock;
                }
                if in_band { Priority::CanDockWithPriority } else { Priority::CanDock }
            }
            _ => Priority::CannotDock,
        }
    }

    fn docking_rectangle(&self, cx: &DockCx, item: &Draggable, at: Point) -> Rect {
        let bounds = cx.bounds();
        let Some(existing) = cx.children().first().copied() else { return bounds };
        let (side, _) = Self::drop_side(cx, at);
        let Some(axis) = side.orientation() else { return bounds };
        let incoming = self.child_factory.dock_preferred_size(item, side.mode());
        let old = cx.preferred_size_of(existing);
        let (first, second) = if side.is_leading() { (incoming, old) } else { (old, incoming) };
        let ratio = Self::ratio_for(axis.size_along(first), axis.size_along(second));
        side.part_of(bounds, divider_at(ratio, axis.extent(bounds)))
    }

    fn child_position(&self, cx: &DockCx, child: DockId) -> Option<Position> {
        let children = cx.children();
        let index = children.iter().position(|c| *c == child)?;
        if children.len() == 1 {
            return Some(Position::new([CENTER]));
        }
        Some(Position::side(self.side_of_index(index)))
    }

    fn layout_children(&self, cx: &DockCx) -> Vec<(DockId, Rect)> {
        match cx.children().as_slice() {
            [only] => vec![(*only, cx.bounds())],
            [first, second] => {
                let (a, b) = self.split_rects(cx.bounds());
                vec![(*first, a), (*second, b)]
            }
            _ => Vec::new(),
        }
    }

    fn preferred_size(&self, cx: &DockCx) -> Size {
        cx.children()
            .into_iter()
            .fold(Size::default(), |acc, c| self.orientation.stack(acc, cx.preferred_size_of(c)))
    }

    fn save_properties(&self, _cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}orientation"), self.orientation);
        store.set(format!("{prefix}dividerRatio"), self.ratio);
        store.set(format!("{prefix}childDockFactory"), self.child_factory.key());
        self.child_factory.save_properties(&format!("{prefix}childDockFactory."), store);
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, registry: &FactoryRegistry) {
        self.orientation = store.get_or(&format!("{prefix}orientation"), self.orientation);
        self.ratio = store.get_or(&format!("{prefix}dividerRatio"), self.ratio);
        self.child_factory = registry.load_factory(&format!("{prefix}childDockFactory"), store);
    }

    fn child_factory(&self) -> Option<&dyn DockFactory> { Some(&*self.child_factory) }

    fn child_factory_mut(&mut self) -> Option<&mut Box<dyn DockFactory>> { Some(&mut self.child_factory) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_from_preferred_sizes() {
        assert_eq!(0.25, Split::ratio_for(100, 300));
        assert_eq!(0.5, Split::ratio_for(0, 0));
        assert_eq!(1.0, Split::ratio_for(10, 0));
    }

    #[test]
    fn divider_stays_in_range() {
        assert_eq!(250, divider_at(0.25, 1000));
        assert_eq!(0, divider_at(-3.0, 1000));
        assert_eq!(1000, divider_at(7.0, 1000));
        assert_eq!(500, divider_at(f64::NAN, 1000));
        assert_eq!(0, divider_at(0.5, -4));
    }

    #[test]
    fn sides_follow_orientation() {
        let mut split = Split::new(Box::new(crate::dock_engine::factory::LeafFactory));
        assert_eq!((Side::Left, Side::Right), (split.side_of_index(0), split.side_of_index(1)));
        split.orientation = Orientation::Vertical;
        assert_eq!((Side::Top, Side::Bottom), (split.side_of_index(0), split.side_of_index(1)));
    }
}
