use serde::{Deserialize, Serialize};

use super::{Dock, DockCx, LeafDock, bisect, near_any, strip_boundaries, weighted_strips};
use crate::common::config::DockSettings;
use crate::dock_engine::factory::FactoryRegistry;
use crate::dock_engine::graph::{FillMode, Orientation};
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{Dockable, DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// Dockables side by side along one axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Line {
    pub orientation: Orientation,
    pub fill: FillMode,
    dockables: Vec<Dockable>,
}

impl Line {
    pub fn new(orientation: Orientation) -> Self {
        Line { orientation, ..Default::default() }
    }

    fn rects_for(&self, bounds: Rect, sizes: &[Size]) -> Vec<Rect> {
        match self.fill {
            FillMode::Equal => self.orientation.strips(bounds, sizes.len()),
            FillMode::Preferred => {
                let weights: Vec<i32> = sizes
                    .iter()
                    .map(|s| match self.orientation {
                        Orientation::Horizontal => s.width,
                        Orientation::Vertical => s.height,
                    })
                    .collect();
                weighted_strips(self.orientation, bounds, &weights)
            }
        }
    }

    fn sizes(&self) -> Vec<Size> { self.dockables.iter().map(|d| d.preferred_size).collect() }
}

impl Dock for Line {
    fn kind_name(&self) -> &'static str { "line" }

    fn accepted_modes(&self) -> DockingModes { self.orientation.line_mode() }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        if !item.supports(self.orientation.line_mode()) {
            return Priority::CannotDock;
        }
        if self.dockables.is_empty() {
            return Priority::inside(cx.central_hit(at));
        }
        let rects = self.dockable_rects(cx.bounds(), cx.settings());
        let boundaries = strip_boundaries(self.orientation, &rects);
        Priority::inside(near_any(
            self.orientation.along(at),
            &boundaries,
            cx.settings().boundary_band,
        ))
    }

    fn docking_rectangle(&self, cx: &DockCx, item: &Draggable, at: Point) -> Rect {
        if self.dockables.is_empty() {
            return cx.bounds();
        }
        let index = self.insertion_index(cx.bounds(), cx.settings(), at);
        let mut sizes = self.sizes();
        sizes.splice(index..index, item.members().iter().map(|d| d.preferred_size));
        self.rects_for(cx.bounds(), &sizes)[index]
    }

    fn preferred_size(&self, _cx: &DockCx) -> Size {
        self.dockables.iter().fold(Size::default(), |acc, d| {
            let p = d.preferred_size;
            match self.orientation {
                Orientation::Horizontal => Size::new(acc.width + p.width, acc.height.max(p.height)),
                Orientation::Vertical => Size::new(acc.width.max(p.width), acc.height + p.height),
            }
        })
    }

    fn save_properties(&self, _cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}orientation"), self.orientation);
        store.set(format!("{prefix}fillMode"), self.fill);
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, _registry: &FactoryRegistry) {
        self.orientation = store.get_or(&format!("{prefix}orientation"), self.orientation);
        self.fill = store.get_or(&format!("{prefix}fillMode"), self.fill);
    }
}

impl LeafDock for Line {
    fn dockables(&self) -> &[Dockable] { &self.dockables }

    fn dockables_mut(&mut self) -> &mut Vec<Dockable> { &mut self.dockables }

    fn insertion_index(&self, bounds: Rect, settings: &DockSettings, at: Point) -> usize {
        bisect(self.orientation, &self.dockable_rects(bounds, settings), at)
    }

    fn dockable_rects(&self, bounds: Rect, _settings: &DockSettings) -> Vec<Rect> {
        self.rects_for(bounds, &self.sizes())
    }
}
