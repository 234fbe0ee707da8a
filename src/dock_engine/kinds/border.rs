use super::{Dock, DockCx, factory_accepts};
use crate::dock_engine::DockId;
use crate::dock_engine::factory::{DockFactory, FactoryRegistry};
use crate::dock_engine::graph::Side;
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::position::Position;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Slots probed after the requested one, in this order.
pub const FALLBACK_ORDER: [Side; 5] = [Side::Center, Side::Left, Side::Right, Side::Top, Side::Bottom];

/// A center area surrounded by four edge slots, one child per slot.
#[derive(Debug, Clone)]
pub struct Border {
    slots: [Option<DockId>; 5],
    pub child_factory: Box<dyn DockFactory>,
}

fn index(side: Side) -> usize { side.slot() as usize }

impl Border {
    pub fn new(child_factory: Box<dyn DockFactory>) -> Self { Border { slots: [None; 5], child_factory } }

    pub fn slot(&self, side: Side) -> Option<DockId> { self.slots[index(side)] }

    pub fn side_of(&self, child: DockId) -> Option<Side> {
        FALLBACK_ORDER.into_iter().find(|s| self.slot(*s) == Some(child))
    }

    pub(crate) fn occupy(&mut self, side: Side, child: DockId) { self.slots[index(side)] = Some(child); }

    /// The slot under `at`: the nearest edge when close enough, else center.
    pub fn slot_at(bounds: Rect, at: Point, edge_fraction: f64) -> Side {
        let (side, distance) = Side::nearest_edge(bounds, at);
        if distance < edge_fraction { side } else { Side::Center }
    }

    fn usable(&self, side: Side, item: &Draggable) -> bool {
        self.slot(side).is_none()
            && item.supports(side.mode())
            && factory_accepts(&*self.child_factory, item, side.mode())
    }

    /// The slot a drop lands in: `requested` when free, else the first free
    /// slot in fallback order. `None` when nothing fits.
    pub fn resolve_slot(&self, requested: Side, item: &Draggable) -> Option<Side> {
        if self.usable(requested, item) {
            return Some(requested);
        }
        FALLBACK_ORDER.into_iter().filter(|s| *s != requested).find(|s| self.usable(*s, item))
    }

    /// Lays out the five areas given the preferred size of whatever sits in
    /// each slot. Top and bottom span the full width.
    pub fn slot_rects(bounds: Rect, sizes: [Option<Size>; 5], max_edge_fraction: f64) -> [Rect; 5] {
        let cap = |total: i32, want: i32| want.clamp(0, (f64::from(total) * max_edge_fraction).round() as i32);
        let size = |side: Side| sizes[index(side)];
        let top_h = size(Side::Top).map_or(0, |s| cap(bounds.height, s.height));
        let bottom_h = size(Side::Bottom).map_or(0, |s| cap(bounds.height, s.height));
        let (top, rest) = bounds.split_vertically(top_h);
        let (middle, bottom) = rest.split_vertically(rest.height - bottom_h);
        let left_w = size(Side::Left).map_or(0, |s| cap(bounds.width, s.width));
        let right_w = size(Side::Right).map_or(0, |s| cap(bounds.width, s.width));
        let (left, rest) = middle.split_horizontally(left_w);
        let (center, right) = rest.split_horizontally(rest.width - right_w);
        let mut out = [Rect::default(); 5];
        out[index(Side::Left)] = left;
        out[index(Side::Right)] = right;
        out[index(Side::Top)] = top;
        out[index(Side::Bottom)] = bottom;
        out[index(Side::Center)] = center;
        out
    }

    fn occupied_sizes(&self, cx: &DockCx) -> [Option<Size>; 5] {
        self.slots.map(|c| c.map(|c| cx.preferred_size_of(c)))
    }
}

impl Dock for Border {
    fn kind_name(&self) -> &'static str { "border" }

    fn accepted_modes(&self) -> DockingModes {
        DockingModes::CENTER | DockingModes::LEFT | DockingModes::RIGHT | DockingModes::TOP | DockingModes::BOTTOM
    }

    fn is_full(&self, _cx: &DockCx) -> bool { self.slots.iter().all(Option::is_some) }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        let requested = Self::slot_at(cx.bounds(), at, cx.settings().edge_fraction);
        if !item.supports(requested.mode()) {
            return Priority::CannotDock;
        }
        if let Some(occupant) = self.slot(requested) {
            // Dropping a slot's own content back onto it changes nothing.
            if cx.dockables_under(occupant) == item.ids() {
                return Priority::CannotDock;
            }
        }
        match self.resolve_slot(requested, item) {
            Some(side) if side == requested => Priority::CanDockWithPriority,
            Some(_) => Priority::CanDockAsLast,
            None => Priority::CannotDock,
        }
    }

    fn docking_rectangle(&self, cx: &DockCx, item: &Draggable, at: Point) -> Rect {
        let requested = Self::slot_at(cx.bounds(), at, cx.settings().edge_fraction);
        let side = self.resolve_slot(requested, item).unwrap_or(requested);
        let mut sizes = self.occupied_sizes(cx);
        sizes[index(side)] = Some(self.child_factory.dock_preferred_size(item, side.mode()));
        Self::slot_rects(cx.bounds(), sizes, cx.settings().max_edge_fraction)[index(side)]
    }

    fn child_position(&self, _cx: &DockCx, child: DockId) -> Option<Position> {
        self.side_of(child).map(Position::side)
    }

    fn layout_children(&self, cx: &DockCx) -> Vec<(DockId, Rect)> {
        let rects = Self::slot_rects(cx.bounds(), self.occupied_sizes(cx), cx.settings().max_edge_fraction);
        cx.children()
            .into_iter()
            .filter_map(|c| self.side_of(c).map(|s| (c, rects[index(s)])))
            .collect()
    }

    fn child_removed(&mut self, child: DockId) {
        for slot in self.slots.iter_mut() {
            if *slot == Some(child) {
                *slot = None;
            }
        }
    }

    fn preferred_size(&self, cx: &DockCx) -> Size {
        let size = |side: Side| self.slot(side).map(|c| cx.preferred_size_of(c)).unwrap_or_default();
        let (l, r, t, b, c) = (size(Side::Left), size(Side::Right), size(Side::Top), size(Side::Bottom), size(Side::Center));
        let middle_w = l.width + c.width + r.width;
        let middle_h = l.height.max(c.height).max(r.height);
        Size::new(middle_w.max(t.width).max(b.width), t.height + middle_h + b.height)
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dock_engine::factory::LeafFactory;
    use crate::model::dockable::Dockable;

    #[test]
    fn slot_under_point() {
        let bounds = Rect::new(0, 0, 400, 400);
        assert_eq!(Side::Left, Border::slot_at(bounds, Point::new(20, 200), 0.25));
        assert_eq!(Side::Bottom, Border::slot_at(bounds, Point::new(200, 390), 0.25));
        assert_eq!(Side::Center, Border::slot_at(bounds, Point::new(200, 200), 0.25));
    }

    #[test]
    fn slot_rects_tile_bounds() {
        let bounds = Rect::new(0, 0, 900, 600);
        let mut sizes = [None; 5];
        sizes[index(Side::Top)] = Some(Size::new(10, 50));
        sizes[index(Side::Left)] = Some(Size::new(1000, 10));
        let rects = Border::slot_rects(bounds, sizes, 1.0 / 3.0);
        assert_eq!(Rect::new(0, 0, 900, 50), rects[index(Side::Top)]);
        // Left is capped to a third of the width.
        assert_eq!(Rect::new(0, 50, 300, 550), rects[index(Side::Left)]);
        assert_eq!(Rect::new(300, 50, 600, 550), rects[index(Side::Center)]);
        assert_eq!(0, rects[index(Side::Right)].width);
        let total: i64 = rects.iter().map(Rect::area).sum();
        assert_eq!(bounds.area(), total);
    }

    #[test]
    fn fallback_skips_unsupported_slots() {
        let mut border = Border::new(Box::new(LeafFactory));
        let mut ids = slotmap::SlotMap::<DockId, ()>::with_key();
        border.occupy(Side::Center, ids.insert(()));
        let item: Draggable =
            Dockable::new("a", DockingModes::TAB | DockingModes::CENTER | DockingModes::TOP, Size::new(5, 5)).into();
        assert_eq!(Some(Side::Top), border.resolve_slot(Side::Center, &item));
        border.occupy(Side::Top, ids.insert(()));
        assert_eq!(None, border.resolve_slot(Side::Center, &item));
    }
}
