use serde::{Deserialize, Serialize};

use super::{Dock, DockCx, LeafDock, bisect};
use crate::common::config::DockSettings;
use crate::dock_engine::factory::FactoryRegistry;
use crate::dock_engine::graph::{HeaderPosition, Orientation};
use crate::dock_engine::persist::PropertyStore;
use crate::dock_engine::priority::Priority;
use crate::model::dockable::{Dockable, DockingModes, Draggable};
use crate::sys::geometry::{Point, Rect, Size};

/// A stack of dockables; one is shown, the others sit behind header tabs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tab {
    pub header: HeaderPosition,
    dockables: Vec<Dockable>,
    selected: Option<usize>,
}

impl Tab {
    pub fn new(header: HeaderPosition) -> Self { Tab { header, ..Default::default() } }

    fn areas(&self, bounds: Rect, settings: &DockSettings) -> (Rect, Rect) {
        self.header.split(bounds, settings.tab_header_size)
    }
}

/// Shared by tab leaves and composite tabs: the header scores high once
/// something is docked, the central region always does.
pub(crate) fn tab_priority(
    cx: &DockCx,
    header: HeaderPosition,
    occupied: bool,
    at: Point,
) -> Priority {
    let (strip, _) = header.split(cx.bounds(), cx.settings().tab_header_size);
    Priority::inside(cx.central_hit(at) || (occupied && strip.contains(at)))
}

/// Insertion index from the header tabs, appending outside the header.
pub(crate) fn tab_insertion(header: HeaderPosition, bounds: Rect, size: i32, count: usize, at: Point) -> usize {
    let (strip, _) = header.split(bounds, size);
    if !strip.contains(at) {
        return count;
    }
    let axis = header.tab_axis();
    bisect(axis, &axis.strips(strip, count), at)
}

impl Dock for Tab {
    fn kind_name(&self) -> &'static str { "tab" }

    fn accepted_modes(&self) -> DockingModes { DockingModes::TAB }

    fn is_full(&self, _cx: &DockCx) -> bool { false }

    fn dock_priority(&self, cx: &DockCx, item: &Draggable, at: Point) -> Priority {
        if !item.supports(DockingModes::TAB) {
            return Priority::CannotDock;
        }
        tab_priority(cx, self.header, !self.dockables.is_empty(), at)
    }

    fn docking_rectangle(&self, cx: &DockCx, _item: &Draggable, _at: Point) -> Rect {
        self.areas(cx.bounds(), cx.settings()).1
    }

    fn preferred_size(&self, cx: &DockCx) -> Size {
        let content = self.dockables.iter().fold(Size::default(), |acc, d| acc.union(d.preferred_size));
        let header = cx.settings().tab_header_size;
        match self.header.tab_axis() {
            Orientation::Horizontal => Size::new(content.width, content.height + header),
            Orientation::Vertical => Size::new(content.width + header, content.height),
        }
    }

    fn save_properties(&self, _cx: &DockCx, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}headerPosition"), self.header);
        if let Some(selected) = self.selected {
            store.set(format!("{prefix}selectedDockable"), selected);
        }
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, _registry: &FactoryRegistry) {
        self.header = store.get_or(&format!("{prefix}headerPosition"), self.header);
    }
}

impl LeafDock for Tab {
    fn dockables(&self) -> &[Dockable] { &self.dockables }

    fn dockables_mut(&mut self) -> &mut Vec<Dockable> { &mut self.dockables }

    fn insertion_index(&self, bounds: Rect, settings: &DockSettings, at: Point) -> usize {
        tab_insertion(self.header, bounds, settings.tab_header_size, self.dockables.len(), at)
    }

    /// Every tab shares the content area.
    fn dockable_rects(&self, bounds: Rect, settings: &DockSettings) -> Vec<Rect> {
        let content = self.areas(bounds, settings).1;
        self.dockables.iter().map(|_| content).collect()
    }

    fn selected(&self) -> Option<usize> { self.selected }

    fn set_selected(&mut self, index: Option<usize>) {
        self.selected = index.filter(|i| *i < self.dockables.len());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tabs(ids: &[&str]) -> Tab {
        let mut tab = Tab::default();
        let panels =
            ids.iter().map(|id| Dockable::new(*id, DockingModes::TAB, Size::new(10, 10))).collect();
        tab.insert_at(0, panels).unwrap();
        tab
    }

    fn order(tab: &Tab) -> Vec<&str> { tab.dockables().iter().map(|d| d.id().as_str()).collect() }

    #[test]
    fn move_selects_moved_tab() {
        let mut tab = tabs(&["a", "b", "c"]);
        tab.move_to(&"c".into(), 0).unwrap();
        assert_eq!(vec!["c", "a", "b"], order(&tab));
        assert_eq!(Some(0), tab.selected());
    }

    #[test]
    fn insert_selects_new_tab() {
        let mut tab = tabs(&["a"]);
        tab.insert_at(1, vec![Dockable::new("b", DockingModes::TAB, Size::new(1, 1))]).unwrap();
        assert_eq!(Some(1), tab.selected());
    }

    #[test]
    fn removing_selected_selects_neighbor() {
        let mut tab = tabs(&["a", "b", "c"]);
        tab.set_selected(Some(2));
        tab.remove(&"c".into());
        assert_eq!(Some(1), tab.selected());
        tab.set_selected(Some(0));
        tab.remove(&"b".into());
        assert_eq!(Some(0), tab.selected());
        tab.remove(&"a".into());
        assert_eq!(None, tab.selected());
    }

    #[test]
    fn header_insertion() {
        let tab = tabs(&["a", "b"]);
        let bounds = Rect::new(0, 0, 200, 100);
        let settings = DockSettings::default();
        assert_eq!(0, tab.insertion_index(bounds, &settings, Point::new(10, 5)));
        assert_eq!(1, tab.insertion_index(bounds, &settings, Point::new(110, 5)));
        assert_eq!(2, tab.insertion_index(bounds, &settings, Point::new(10, 60)));
    }
}
