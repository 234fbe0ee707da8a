use serde::Serialize;
use slotmap::SecondaryMap;
use tracing::{debug, trace, warn};

use super::DockId;
use super::drag::DragManager;
use super::error::{DockError, Result};
use super::events::{DockingListener, DockingPhase, EventSupport, ListenerId};
use super::factory::{DockFactory, FactoryRegistry};
use super::graph::{Orientation, Side};
use super::kinds::{Border, Dock, DockCx, DockKind, Float, LeafDock, Split};
use super::persist::PropertyStore;
use super::position::Position;
use super::priority::Priority;
use crate::common::collections::{BTreeMap, HashMap};
use crate::common::config::DockSettings;
use crate::model::dockable::{CompositeDockable, Dockable, DockableId, DockableState, DockingModes, Draggable};
use crate::model::selection::Selection;
use crate::model::tree::Tree;
use crate::sys::geometry::{Point, Rect, Size};

/// Per-dock payload stored next to the arena node.
#[derive(Debug, Clone)]
pub struct DockNode {
    pub kind: DockKind,
    pub bounds: Rect,
    pub visible: bool,
    /// Children removed while a drag gesture still held them.
    pub ghosts: Vec<DockId>,
}

impl DockNode {
    fn new(kind: DockKind) -> Self { DockNode { kind, bounds: Rect::default(), visible: true, ghosts: Vec::new() } }
}

/// The answer to a drag hovering over a dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DockingPreview {
    pub priority: Priority,
    /// Where the content would land; `None` when it cannot dock.
    pub rect: Option<Rect>,
}

/// Structural view of a dock subtree with no arena ids in it, so two
/// engines can be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DockSnapshot {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dockables: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DockSnapshot>,
}

/// Where inside a dock a commit puts the incoming item.
#[derive(Debug, Clone)]
pub(crate) enum Hint {
    /// A drop at `point`, with the pointer `grab` pixels into the content.
    At { point: Point, grab: Point },
    /// A programmatic position in the dock's own coordinates.
    Slot(Position),
    /// Wherever the dock puts new content by default.
    Default,
}

pub struct DockEngine {
    pub(crate) tree: Tree<Selection>,
    pub(crate) nodes: SecondaryMap<DockId, DockNode>,
    pub(crate) roots: Vec<DockId>,
    homes: HashMap<DockableId, DockId>,
    pub(crate) events: EventSupport,
    pub(crate) drag: DragManager,
    pub(crate) factories: FactoryRegistry,
    pub(crate) settings: DockSettings,
}

impl Default for DockEngine {
    fn default() -> Self { Self::new(DockSettings::default()) }
}

impl DockEngine {
    pub fn new(settings: DockSettings) -> Self {
        let factories = FactoryRegistry::builtin(&settings.default_factory);
        Self::with_registry(settings, factories)
    }

    pub fn with_registry(settings: DockSettings, factories: FactoryRegistry) -> Self {
        DockEngine {
            tree: Tree::with_observer(Selection::default()),
            nodes: SecondaryMap::new(),
            roots: Vec::new(),
            homes: HashMap::default(),
            events: EventSupport::default(),
            drag: DragManager::default(),
            factories,
            settings,
        }
    }

    pub fn settings(&self) -> &DockSettings { &self.settings }

    pub fn factories(&self) -> &FactoryRegistry { &self.factories }

    // ---- structure queries ----

    /// Creates a dock that is not attached anywhere yet.
    pub fn create_dock(&mut self, kind: impl Into<DockKind>) -> DockId {
        let id = self.tree.mk_node().into_root();
        self.nodes.insert(id, DockNode::new(kind.into()));
        id
    }

    /// Creates a top-level dock covering `bounds`.
    pub fn add_root(&mut self, kind: impl Into<DockKind>, bounds: Rect) -> DockId {
        let id = self.create_dock(kind);
        self.roots.push(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.bounds = bounds;
        }
        debug!(?id, ?bounds, "added root dock");
        id
    }

    pub fn roots(&self) -> &[DockId] { &self.roots }

    pub fn contains(&self, dock: DockId) -> bool { self.nodes.contains_key(dock) }

    pub fn node(&self, dock: DockId) -> Result<&DockNode> { self.nodes.get(dock).ok_or(DockError::UnknownDock(dock)) }

    fn node_mut(&mut self, dock: DockId) -> Result<&mut DockNode> {
        self.nodes.get_mut(dock).ok_or(DockError::UnknownDock(dock))
    }

    pub fn kind(&self, dock: DockId) -> Result<&DockKind> { self.node(dock).map(|n| &n.kind) }

    pub fn kind_mut(&mut self, dock: DockId) -> Result<&mut DockKind> { self.node_mut(dock).map(|n| &mut n.kind) }

    pub(crate) fn cx(&self, dock: DockId) -> DockCx<'_> { DockCx::new(self, dock) }

    fn leaf(&self, dock: DockId) -> Result<&dyn LeafDock> {
        self.kind(dock)?
            .as_leaf()
            .ok_or_else(|| DockError::illegal(format!("{dock:?} does not hold dockables")))
    }

    fn leaf_mut(&mut self, dock: DockId) -> Result<&mut dyn LeafDock> {
        self.kind_mut(dock)?
            .as_leaf_mut()
            .ok_or_else(|| DockError::illegal(format!("{dock:?} does not hold dockables")))
    }

    pub fn parent(&self, dock: DockId) -> Option<DockId> { dock.parent(&self.tree.map) }

    pub fn bounds(&self, dock: DockId) -> Option<Rect> { self.nodes.get(dock).map(|n| n.bounds) }

    pub fn is_visible(&self, dock: DockId) -> bool { self.nodes.get(dock).is_some_and(|n| n.visible) }

    pub fn ghosts(&self, dock: DockId) -> &[DockId] {
        self.nodes.get(dock).map(|n| n.ghosts.as_slice()).unwrap_or_default()
    }

    /// Attached child docks in order. Ghosts are not children.
    pub fn child_docks(&self, dock: DockId) -> Vec<DockId> { dock.children(&self.tree.map).collect() }

    pub fn child_dock_count(&self, dock: DockId) -> usize { dock.child_count(&self.tree.map) }

    pub fn child_dock(&self, dock: DockId, index: usize) -> Result<DockId> {
        self.node(dock)?;
        dock.nth_child(&self.tree.map, index).ok_or(DockError::IndexOutOfRange {
            index,
            len: self.child_dock_count(dock),
        })
    }

    pub fn child_dock_position(&self, dock: DockId, child: DockId) -> Result<Position> {
        self.check_child(dock, child)?;
        self.kind(dock)?
            .child_position(&self.cx(dock), child)
            .ok_or(DockError::NotAChild { parent: dock, child })
    }

    pub fn child_dock_factory(&self, dock: DockId) -> Result<&dyn DockFactory> {
        self.kind(dock)?
            .child_factory()
            .ok_or_else(|| DockError::illegal(format!("{dock:?} has no child docks")))
    }

    pub fn set_child_dock_factory(&mut self, dock: DockId, factory: Box<dyn DockFactory>) -> Result<()> {
        let slot = self
            .kind_mut(dock)?
            .child_factory_mut()
            .ok_or_else(|| DockError::illegal(format!("{dock:?} has no child docks")))?;
        *slot = factory;
        Ok(())
    }

    pub fn is_empty(&self, dock: DockId) -> Result<bool> {
        match self.kind(dock)?.as_leaf() {
            Some(leaf) => Ok(leaf.dockables().is_empty()),
            None => Ok(self.child_dock_count(dock) == 0),
        }
    }

    pub fn is_full(&self, dock: DockId) -> Result<bool> { Ok(self.kind(dock)?.is_full(&self.cx(dock))) }

    pub fn preferred_size(&self, dock: DockId) -> Size {
        self.nodes.get(dock).map(|n| n.kind.preferred_size(&self.cx(dock))).unwrap_or_default()
    }

    pub fn dockables(&self, dock: DockId) -> Result<&[Dockable]> { Ok(self.leaf(dock)?.dockables()) }

    /// Ids of every dockable in the subtree, in tree order.
    pub fn dockables_under(&self, dock: DockId) -> Vec<DockableId> {
        dock.traverse_preorder(&self.tree.map)
            .filter_map(|id| self.nodes.get(id).and_then(|n| n.kind.as_leaf()))
            .flat_map(|leaf| leaf.dockables().iter().map(|d| d.id().clone()))
            .collect()
    }

    /// The leaf a dockable is docked in.
    pub fn home_of(&self, id: &DockableId) -> Option<DockId> { self.homes.get(id).copied() }

    pub fn dockable(&self, id: &DockableId) -> Result<&Dockable> {
        let home = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let leaf = self.leaf(home)?;
        leaf.position_of(id)
            .map(|i| &leaf.dockables()[i])
            .ok_or_else(|| DockError::DockableNotFound(id.clone()))
    }

    pub fn docked_count(&self) -> usize { self.homes.len() }

    pub(crate) fn check_child(&self, parent: DockId, child: DockId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DockError::NotAChild { parent, child });
        }
        Ok(())
    }

    // ---- layout ----

    /// Moves a dock and lays its subtree out again.
    pub fn set_bounds(&mut self, dock: DockId, bounds: Rect) -> Result<()> {
        self.node_mut(dock)?.bounds = bounds;
        self.layout_subtree(dock);
        Ok(())
    }

    /// Lays out the whole tree `dock` belongs to. Preferred sizes anywhere
    /// below can move every divider above.
    pub(crate) fn relayout(&mut self, dock: DockId) {
        if self.nodes.contains_key(dock) {
            self.layout_subtree(dock.root(&self.tree.map));
        }
    }

    fn layout_subtree(&mut self, dock: DockId) {
        let Some(node) = self.nodes.get(dock) else { return };
        let cx = self.cx(dock);
        let placements: Vec<(DockId, Rect, bool)> = node
            .kind
            .layout_children(&cx)
            .into_iter()
            .map(|(child, rect)| (child, rect, node.visible && node.kind.child_visible(&cx, child)))
            .collect();
        for (child, rect, visible) in placements {
            if let Some(n) = self.nodes.get_mut(child) {
                n.bounds = rect;
                n.visible = visible;
            }
            self.layout_subtree(child);
        }
    }

    pub fn divider_location(&self, split: DockId) -> Result<i32> {
        match self.kind(split)? {
            DockKind::Split(s) => {
                let bounds = self.node(split)?.bounds;
                Ok(s.divider(s.orientation.extent(bounds)))
            }
            _ => Err(DockError::illegal(format!("{split:?} is not a split"))),
        }
    }

    /// Moves the divider to `location` pixels, clamped to the split extent.
    pub fn set_divider_location(&mut self, split: DockId, location: i32) -> Result<()> {
        let bounds = self.node(split)?.bounds;
        let DockKind::Split(s) = self.kind_mut(split)? else {
            return Err(DockError::illegal(format!("{split:?} is not a split")));
        };
        let total = s.orientation.extent(bounds).max(0);
        if total > 0 {
            s.ratio = f64::from(location.clamp(0, total)) / f64::from(total);
        }
        self.layout_subtree(split);
        Ok(())
    }

    // ---- selection ----

    pub fn selected_child(&self, dock: DockId) -> Option<DockId> {
        self.tree.data.selected_child(&self.tree.map, dock)
    }

    /// Selects `child` within its parent. Returns true if the selection changed.
    pub fn select_child(&mut self, child: DockId) -> Result<bool> {
        let parent = self.parent(child).ok_or_else(|| DockError::illegal(format!("{child:?} has no parent")))?;
        let changed = self.tree.data.select_locally(&self.tree.map, child);
        if changed {
            self.layout_subtree(parent);
        }
        Ok(changed)
    }

    pub fn selected_dockable(&self, leaf: DockId) -> Result<Option<&Dockable>> {
        let leaf = self.leaf(leaf)?;
        Ok(leaf.selected().and_then(|i| leaf.dockables().get(i)))
    }

    pub fn select_dockable(&mut self, id: &DockableId) -> Result<()> {
        let home = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let leaf = self.leaf_mut(home)?;
        let index = leaf.position_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        leaf.set_selected(Some(index));
        Ok(())
    }

    pub fn set_maximized(&mut self, id: &DockableId, maximized: bool) -> Result<()> {
        let home = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let state = if maximized { DockableState::Maximized } else { self.docked_state(home) };
        let leaf = self.leaf_mut(home)?;
        let index = leaf.position_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        leaf.dockables_mut()[index].set_state(state);
        Ok(())
    }

    fn docked_state(&self, leaf: DockId) -> DockableState {
        let root = leaf.root(&self.tree.map);
        match self.nodes.get(root) {
            Some(n) if n.kind.is_float() => DockableState::Externalized,
            _ => DockableState::Normal,
        }
    }

    /// Records `leaf` as the home of everything in it.
    pub(crate) fn adopt(&mut self, leaf: DockId) {
        let state = self.docked_state(leaf);
        let Some(node) = self.nodes.get_mut(leaf) else { return };
        let Some(dockables) = node.kind.as_leaf_mut().map(|l| l.dockables_mut()) else { return };
        for d in dockables.iter_mut() {
            d.set_state(state);
            self.homes.insert(d.id().clone(), leaf);
        }
    }

    fn adopt_subtree(&mut self, dock: DockId) {
        let leaves: Vec<DockId> = dock.traverse_preorder(&self.tree.map).collect();
        for leaf in leaves {
            self.adopt(leaf);
        }
    }

    // ---- listeners ----

    pub fn add_docking_listener(
        &mut self,
        scope: Option<DockId>,
        listener: impl DockingListener + 'static,
    ) -> ListenerId {
        self.events.add(scope, Box::new(listener))
    }

    pub fn remove_docking_listener(&mut self, id: ListenerId) -> bool { self.events.remove(id) }

    // ---- placement ----

    /// How much `dock` wants `item` dropped at `at`.
    pub fn dock_priority(&self, dock: DockId, item: &Draggable, at: Point) -> Result<Priority> {
        let node = self.node(dock)?;
        let cx = self.cx(dock);
        if !node.visible
            || item.is_empty()
            || !item.common_modes().intersects(node.kind.accepted_modes())
            || (!node.kind.is_float() && !node.bounds.contains(at))
            || node.kind.is_full(&cx)
        {
            return Ok(Priority::CannotDock);
        }
        Ok(node.kind.dock_priority(&cx, item, at))
    }

    /// Priority plus the rectangle the content would take. Never mutates.
    pub fn retrieve_docking_rectangle(&self, dock: DockId, item: &Draggable, at: Point) -> Result<DockingPreview> {
        let priority = self.dock_priority(dock, item, at)?;
        let rect = priority
            .can_dock()
            .then(|| self.kind(dock).map(|k| k.docking_rectangle(&self.cx(dock), item, at)))
            .transpose()?;
        Ok(DockingPreview { priority, rect })
    }

    /// Best dock for a drop at `at`: floating windows front-most first, then
    /// the main roots, then float docks themselves. Higher priority wins,
    /// deeper docks win ties.
    pub fn find_target(&self, item: &Draggable, at: Point) -> Option<(DockId, Priority)> {
        let (floats, mains): (Vec<DockId>, Vec<DockId>) =
            self.roots.iter().partition(|r| self.nodes.get(**r).is_some_and(|n| n.kind.is_float()));
        for float in &floats {
            for window in self.child_docks(*float) {
                if self.bounds(window).is_some_and(|b| b.contains(at)) {
                    if let Some((dock, priority, _)) = self.best_in(window, item, at) {
                        return Some((dock, priority));
                    }
                }
            }
        }
        let best = mains.iter().filter_map(|r| self.best_in(*r, item, at)).fold(None, |acc, cur| match acc {
            Some((_, p, d)) if (p, d) >= (cur.1, cur.2) => acc,
            _ => Some(cur),
        });
        if let Some((dock, priority, _)) = best {
            return Some((dock, priority));
        }
        floats.into_iter().find_map(|f| {
            let p = self.dock_priority(f, item, at).ok()?;
            p.can_dock().then_some((f, p))
        })
    }

    fn best_in(&self, root: DockId, item: &Draggable, at: Point) -> Option<(DockId, Priority, usize)> {
        let mut best: Option<(DockId, Priority, usize)> = None;
        for id in root.traverse_preorder(&self.tree.map) {
            let priority = self.dock_priority(id, item, at).unwrap_or_default();
            if !priority.can_dock() {
                continue;
            }
            let depth = id.depth(&self.tree.map);
            if best.is_none_or(|(_, p, d)| (priority, depth) > (p, d)) {
                best = Some((id, priority, depth));
            }
        }
        trace!(?root, ?best, "best target in tree");
        best
    }

    // ---- dockable operations ----

    /// Drops `item` on `dock` at `at`. The drop is checked again here; when
    /// it is no longer acceptable the item comes back in the error.
    pub fn add_dockable(&mut self, dock: DockId, item: impl Into<Draggable>, at: Point) -> Result<()> {
        self.drop_at(dock, item.into(), at, Point::default())
    }

    pub(crate) fn drop_at(&mut self, dock: DockId, item: Draggable, at: Point, grab: Point) -> Result<()> {
        let priority = self.dock_priority(dock, &item, at)?;
        if !priority.can_dock() {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        }
        self.add_checked(dock, item, Hint::At { point: at, grab })
    }

    /// Adds `item` at an explicit position, e.g. a tab index or a border slot.
    pub fn add_dockable_at(&mut self, dock: DockId, item: impl Into<Draggable>, position: &Position) -> Result<()> {
        let item = item.into();
        let kind = self.kind(dock)?;
        if item.is_empty() || !item.common_modes().intersects(kind.accepted_modes()) || kind.is_full(&self.cx(dock)) {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        }
        self.add_checked(dock, item, Hint::Slot(position.clone()))
    }

    fn add_checked(&mut self, dock: DockId, item: Draggable, hint: Hint) -> Result<()> {
        if let Some(d) = item.members().iter().find(|d| self.homes.contains_key(d.id())) {
            return Err(DockError::illegal(format!("dockable {} is already docked", d.id())));
        }
        self.check_commit(dock, &item, &hint)?;
        let ids: Vec<DockableId> = item.members().iter().map(|d| d.id().clone()).collect();
        self.events.fire_all(DockingPhase::WillChange, None, Some(dock), &ids);
        let result = self.commit(dock, item, &hint);
        if result.is_ok() {
            self.relayout(dock);
            debug!(?dock, ?ids, "docked");
        }
        self.events.fire_all(DockingPhase::Changed, None, result.is_ok().then_some(dock), &ids);
        result
    }

    pub fn can_remove_dockable(&self, id: &DockableId) -> bool {
        self.home_of(id).is_some_and(|home| self.leaf(home).is_ok_and(|l| l.position_of(id).is_some()))
    }

    /// Undocks a dockable. It comes back closed.
    pub fn remove_dockable(&mut self, id: &DockableId) -> Result<Dockable> {
        let home = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let ids = [id.clone()];
        self.events.fire_all(DockingPhase::WillChange, Some(home), None, &ids);
        let removed = self.detach_dockable(id)?;
        self.events.fire_all(DockingPhase::Changed, Some(home), None, &ids);
        Ok(removed)
    }

    /// Takes a dockable out of its leaf and lets the leaf collapse.
    pub(crate) fn detach_dockable(&mut self, id: &DockableId) -> Result<Dockable> {
        let home = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let (_, mut removed) =
            self.leaf_mut(home)?.remove(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        self.homes.remove(id);
        removed.set_state(DockableState::Closed);
        self.settle(home)?;
        Ok(removed)
    }

    /// Moves a docked dockable onto `target` as if dropped at `at`.
    pub fn move_dockable(&mut self, id: &DockableId, target: DockId, at: Point) -> Result<()> {
        self.relocate(std::slice::from_ref(id), target, at, Point::default())
    }

    /// Moves docked dockables onto `target` as one group, in the given order.
    /// They may come from different docks.
    pub fn move_group(&mut self, ids: &[DockableId], target: DockId, at: Point) -> Result<()> {
        self.relocate(ids, target, at, Point::default())
    }

    /// The docked dockables `ids` as one draggable. A group keeps the
    /// selection of the leaf it was taken from.
    pub fn group_item(&self, ids: &[DockableId]) -> Result<Draggable> {
        let members = ids.iter().map(|id| self.dockable(id).cloned()).collect::<Result<Vec<_>>>()?;
        let selected = ids.iter().position(|id| {
            self.home_of(id)
                .and_then(|home| self.selected_dockable(home).ok().flatten())
                .is_some_and(|d| d.id() == id)
        });
        Ok(draggable_from(members, selected))
    }

    pub(crate) fn relocate(&mut self, ids: &[DockableId], target: DockId, at: Point, grab: Point) -> Result<()> {
        let mut sources: Vec<(DockId, Vec<DockableId>)> = Vec::new();
        for (n, id) in ids.iter().enumerate() {
            if ids[..n].contains(id) {
                return Err(DockError::illegal(format!("dockable {id} appears twice in the group")));
            }
            let origin = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
            match sources.iter_mut().find(|(o, _)| *o == origin) {
                Some((_, moved)) => moved.push(id.clone()),
                None => sources.push((origin, vec![id.clone()])),
            }
        }
        if let ([id], [(origin, _)]) = (ids, sources.as_slice()) {
            if *origin == target {
                return self.reorder_at(id, target, at);
            }
        }
        let item = self.group_item(ids)?;
        if !self.dock_priority(target, &item, at)?.can_dock() {
            return Err(DockError::CannotDock(target, Box::new(item)));
        }
        let hint = Hint::At { point: at, grab };
        self.check_commit(target, &item, &hint)?;
        let selected = match &item {
            Draggable::Composite(c) => c.selected,
            Draggable::Single(_) => None,
        };
        for (origin, moved) in &sources {
            self.events.fire_all(DockingPhase::WillChange, Some(*origin), Some(target), moved);
        }

        // Origins stay alive (ghosted at worst) until the group has landed.
        for (origin, _) in &sources {
            self.drag.hold(*origin);
        }
        let result = self.land(ids, selected, target, &hint);
        let mut flushed = Ok(());
        for (origin, _) in &sources {
            if self.drag.release(*origin) && flushed.is_ok() {
                flushed = self.flush_ghosts_of(*origin);
            }
        }
        let landed = result.as_ref().ok().copied();
        if let Some(landed) = landed {
            self.relayout(landed);
            debug!(?ids, ?landed, "moved dockables");
        }
        for (origin, moved) in &sources {
            self.events.fire_all(DockingPhase::Changed, Some(*origin), landed, moved);
        }
        result?;
        flushed
    }

    fn land(&mut self, ids: &[DockableId], selected: Option<usize>, target: DockId, hint: &Hint) -> Result<DockId> {
        let members = ids.iter().map(|id| self.detach_dockable(id)).collect::<Result<Vec<_>>>()?;
        let item = draggable_from(members, selected);
        // Removing the group can collapse the target into its parent.
        let target = if self.is_attached_dock(target) {
            target
        } else {
            let found = match hint {
                Hint::At { point, .. } => self.find_target(&item, *point),
                _ => None,
            };
            match found {
                Some((t, _)) => t,
                None => return Err(DockError::CannotDock(target, Box::new(item))),
            }
        };
        self.commit(target, item, hint)?;
        Ok(target)
    }

    /// A drop back onto the dockable's own leaf only reorders it.
    fn reorder_at(&mut self, id: &DockableId, dock: DockId, at: Point) -> Result<()> {
        let bounds = self.node(dock)?.bounds;
        let leaf = self.leaf(dock)?;
        let len = leaf.dockables().len();
        let from = leaf.position_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        // The insertion index still counts the dockable itself.
        let mut index = leaf.insertion_index(bounds, &self.settings, at);
        if index > from {
            index -= 1;
        }
        self.move_dockable_to(id, index.min(len.saturating_sub(1)))
    }

    fn is_attached_dock(&self, dock: DockId) -> bool {
        let Some(node) = self.nodes.get(dock) else { return false };
        node.visible && self.roots.contains(&dock.root(&self.tree.map))
    }

    /// Reorders a dockable inside its leaf. The moved dockable is selected.
    pub fn move_dockable_to(&mut self, id: &DockableId, index: usize) -> Result<()> {
        let home = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
        let len = self.leaf(home)?.dockables().len();
        if index >= len {
            return Err(DockError::IndexOutOfRange { index, len });
        }
        let ids = [id.clone()];
        self.events.fire_all(DockingPhase::WillChange, Some(home), Some(home), &ids);
        let result = self.leaf_mut(home)?.move_to(id, index);
        self.relayout(home);
        self.events.fire_all(DockingPhase::Changed, Some(home), Some(home), &ids);
        result
    }

    // ---- commit ----

    /// Puts `item` into `dock`, creating child docks as needed. Assumes the
    /// drop was validated.
    pub(crate) fn commit(&mut self, dock: DockId, item: Draggable, hint: &Hint) -> Result<()> {
        let kind = self.kind(dock)?;
        if kind.is_leaf() {
            return self.commit_to_leaf(dock, item, hint);
        }
        let name = kind.kind_name();
        let Some(factory) = kind.child_factory().map(|f| f.clone_box()) else {
            return Err(DockError::illegal(format!("{name} dock has no child factory")));
        };
        match name {
            "split" => self.commit_to_split(dock, item, hint, factory),
            "border" => self.commit_to_border(dock, item, hint, factory),
            "float" => self.commit_to_float(dock, item, hint, factory),
            _ => self.commit_to_ordered(dock, item, hint, factory),
        }
    }

    fn commit_to_leaf(&mut self, dock: DockId, item: Draggable, hint: &Hint) -> Result<()> {
        let node = self.nodes.get_mut(dock).ok_or(DockError::UnknownDock(dock))?;
        let bounds = node.bounds;
        let Some(leaf) = node.kind.as_leaf_mut() else {
            return Err(DockError::illegal(format!("{dock:?} does not hold dockables")));
        };
        let len = leaf.dockables().len();
        let index = match hint {
            Hint::Slot(p) => {
                let index = slot_index(p)?;
                if index > len {
                    return Err(DockError::IndexOutOfRange { index, len });
                }
                index
            }
            _ if len == 0 => 0,
            Hint::At { point, .. } => leaf.insertion_index(bounds, &self.settings, *point),
            Hint::Default => len,
        };
        if leaf.capacity().is_some_and(|cap| len + item.len() > cap) {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        }
        let selected = match &item {
            Draggable::Composite(c) => c.selected,
            Draggable::Single(_) => None,
        };
        leaf.insert_at(index, item.into_members())?;
        if let Some(s) = selected {
            leaf.set_selected(Some(index + s));
        }
        self.adopt(dock);
        Ok(())
    }

    /// Everything `commit` would turn down, checked up front so listeners
    /// never hear about a change that does not happen.
    fn check_commit(&self, dock: DockId, item: &Draggable, hint: &Hint) -> Result<()> {
        let node = self.node(dock)?;
        let reject = || DockError::CannotDock(dock, Box::new(item.clone()));
        if let Some(leaf) = node.kind.as_leaf() {
            let len = leaf.dockables().len();
            if let Hint::Slot(p) = hint {
                let index = slot_index(p)?;
                if index > len {
                    return Err(DockError::IndexOutOfRange { index, len });
                }
            }
            if leaf.capacity().is_some_and(|cap| len + item.len() > cap) {
                return Err(reject());
            }
            return Ok(());
        }
        let Some(factory) = node.kind.child_factory() else {
            return Err(DockError::illegal(format!("{} dock has no child factory", node.kind.kind_name())));
        };
        let count = self.child_dock_count(dock);
        let mode = match &node.kind {
            DockKind::Split(_) => match count {
                0 => DockingModes::CENTER,
                1 => self.split_side(dock, hint)?.0.mode(),
                _ => return Err(reject()),
            },
            DockKind::Border(_) => match self.border_side(dock, item, hint)? {
                Some(side) => side.mode(),
                None => return Err(reject()),
            },
            DockKind::Float(_) => {
                if let Hint::Slot(p) = hint {
                    if p.coords().len() != 3 {
                        return Err(DockError::illegal(format!("float position needs (x,y,z), got {p}")));
                    }
                }
                DockingModes::FLOAT
            }
            kind => {
                if let Hint::Slot(p) = hint {
                    let index = slot_index(p)?;
                    if index > count {
                        return Err(DockError::IndexOutOfRange { index, len: count });
                    }
                }
                kind.accepted_modes()
            }
        };
        match factory.create_dock(item, mode) {
            Some(_) => Ok(()),
            None => Err(reject()),
        }
    }

    /// The edge a drop divides a one-child split along.
    fn split_side(&self, dock: DockId, hint: &Hint) -> Result<(Side, Orientation)> {
        let side = match hint {
            Hint::At { point, .. } => Split::drop_side(&self.cx(dock), *point).0,
            Hint::Slot(p) => slot_side(p)?,
            Hint::Default => Side::Right,
        };
        match side.orientation() {
            Some(axis) => Ok((side, axis)),
            None => Err(DockError::illegal("a split needs an edge to divide along")),
        }
    }

    /// The border slot a drop lands in, `None` when no slot takes the item.
    fn border_side(&self, dock: DockId, item: &Draggable, hint: &Hint) -> Result<Option<Side>> {
        let bounds = self.node(dock)?.bounds;
        let DockKind::Border(border) = self.kind(dock)? else {
            return Err(DockError::illegal(format!("{dock:?} is not a border dock")));
        };
        Ok(match hint {
            Hint::At { point, .. } => {
                border.resolve_slot(Border::slot_at(bounds, *point, self.settings.edge_fraction), item)
            }
            Hint::Slot(p) => {
                let side = slot_side_or_center(p)?;
                if border.slot(side).is_some() {
                    return Err(DockError::illegal(format!("border slot {side} is occupied")));
                }
                Some(side)
            }
            Hint::Default => border.resolve_slot(Side::Center, item),
        })
    }

    fn commit_to_split(
        &mut self,
        dock: DockId,
        item: Draggable,
        hint: &Hint,
        factory: Box<dyn DockFactory>,
    ) -> Result<()> {
        let children = self.child_docks(dock);
        let existing = match children.as_slice() {
            [] => {
                let Some(kind) = factory.create_dock(&item, DockingModes::CENTER) else {
                    return Err(DockError::CannotDock(dock, Box::new(item)));
                };
                self.populate_new_child(dock, 0, kind, item)?;
                return Ok(());
            }
            [existing] => *existing,
            _ => return Err(DockError::CannotDock(dock, Box::new(item))),
        };
        let (side, axis) = self.split_side(dock, hint)?;
        let Some(kind) = factory.create_dock(&item, side.mode()) else {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        };

        // Both halves get their own split so each can be divided again later.
        let old_half = self.attach_new(dock, Split::new(factory.clone_box()).into(), 0)?;
        let _ = existing.detach(&mut self.tree).push_back(old_half);
        let new_index = if side.is_leading() { 0 } else { 1 };
        let new_half = self.attach_new(dock, Split::new(factory.clone_box()).into(), new_index)?;
        let leaf = self.attach_new(new_half, kind, 0)?;
        self.commit(leaf, item, &Hint::Default)?;

        let (first, second) = if side.is_leading() { (new_half, old_half) } else { (old_half, new_half) };
        let ratio = Split::ratio_for(
            axis.size_along(self.preferred_size(first)),
            axis.size_along(self.preferred_size(second)),
        );
        if let DockKind::Split(split) = self.kind_mut(dock)? {
            split.orientation = axis;
            split.ratio = ratio;
        }
        debug!(?dock, ?side, ratio, "split dock");
        Ok(())
    }

    fn commit_to_border(
        &mut self,
        dock: DockId,
        item: Draggable,
        hint: &Hint,
        factory: Box<dyn DockFactory>,
    ) -> Result<()> {
        let Some(side) = self.border_side(dock, &item, hint)? else {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        };
        let Some(kind) = factory.create_dock(&item, side.mode()) else {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        };
        let count = self.child_dock_count(dock);
        let child = self.populate_new_child(dock, count, kind, item)?;
        if let DockKind::Border(border) = self.kind_mut(dock)? {
            border.occupy(side, child);
        }
        Ok(())
    }

    fn commit_to_ordered(
        &mut self,
        dock: DockId,
        item: Draggable,
        hint: &Hint,
        factory: Box<dyn DockFactory>,
    ) -> Result<()> {
        let count = self.child_dock_count(dock);
        let kind = self.kind(dock)?;
        let index = match hint {
            Hint::At { point, .. } => kind.child_insertion_index(&self.cx(dock), *point),
            Hint::Slot(p) => {
                let index = slot_index(p)?;
                if index > count {
                    return Err(DockError::IndexOutOfRange { index, len: count });
                }
                index
            }
            Hint::Default => count,
        };
        let is_tab = matches!(kind, DockKind::CompositeTab(_));
        let Some(child_kind) = factory.create_dock(&item, kind.accepted_modes()) else {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        };
        let child = self.populate_new_child(dock, index, child_kind, item)?;
        if is_tab {
            self.tree.data.select_locally(&self.tree.map, child);
        }
        Ok(())
    }

    fn commit_to_float(
        &mut self,
        dock: DockId,
        item: Draggable,
        hint: &Hint,
        factory: Box<dyn DockFactory>,
    ) -> Result<()> {
        let Some(kind) = factory.create_dock(&item, DockingModes::FLOAT) else {
            return Err(DockError::CannotDock(dock, Box::new(item)));
        };
        let size = factory.dock_preferred_size(&item, DockingModes::FLOAT);
        let count = self.child_dock_count(dock);
        let (window, index) = match hint {
            Hint::At { point, grab } => (Float::window_for(*point, *grab, size), 0),
            Hint::Slot(p) => match p.coords() {
                [x, y, z] => (Rect::from_origin_size(Point::new(*x, *y), size), (*z).clamp(0, count as i32) as usize),
                _ => return Err(DockError::illegal(format!("float position needs (x,y,z), got {p}"))),
            },
            Hint::Default => (Rect::from_origin_size(Point::default(), size), 0),
        };
        let child = self.populate_new_child(dock, index, kind, item)?;
        if let DockKind::Float(float) = self.kind_mut(dock)? {
            float.set_window(child, window);
        }
        Ok(())
    }

    fn attach_new(&mut self, parent: DockId, kind: DockKind, index: usize) -> Result<DockId> {
        self.node(parent)?;
        let id = self.tree.mk_node().insert_at(parent, index);
        self.nodes.insert(id, DockNode::new(kind));
        Ok(id)
    }

    /// Attaches a fresh child and commits `item` into it. A child that could
    /// not take the item is thrown away again.
    fn populate_new_child(&mut self, parent: DockId, index: usize, kind: DockKind, item: Draggable) -> Result<DockId> {
        let child = self.attach_new(parent, kind, index)?;
        if let Err(e) = self.commit(child, item, &Hint::Default) {
            self.unlink_child(parent, child)?;
            self.destroy(child);
            return Err(e);
        }
        Ok(child)
    }

    // ---- composite surface ----

    /// Mounts a detached dock under `parent` at `position`.
    pub fn add_child_dock(&mut self, parent: DockId, child: DockId, position: &Position) -> Result<()> {
        self.node(child)?;
        if self.parent(child).is_some() {
            return Err(DockError::illegal(format!("{child:?} already has a parent")));
        }
        if parent.ancestors(&self.tree.map).any(|a| a == child) {
            return Err(DockError::illegal(format!("{child:?} cannot contain itself")));
        }
        if self.kind(child)?.is_float() {
            return Err(DockError::illegal("float docks have no parent"));
        }
        let count = self.child_dock_count(parent);
        let kind = self.kind(parent)?;
        match kind {
            _ if kind.is_leaf() => {
                return Err(DockError::illegal(format!("{} docks hold no child docks", kind.kind_name())));
            }
            DockKind::Split(split) => {
                if count >= 2 {
                    return Err(DockError::illegal("split dock already has two children"));
                }
                let side = slot_side_or_center(position)?;
                let index = match (count, side.orientation()) {
                    (0, _) => 0,
                    (_, None) => return Err(DockError::illegal("second split child needs an edge")),
                    (_, Some(_)) => usize::from(!side.is_leading()),
                };
                let orientation = side.orientation().unwrap_or(split.orientation);
                let _ = child.detach(&mut self.tree).insert_at(parent, index);
                if let DockKind::Split(split) = self.kind_mut(parent)? {
                    split.orientation = orientation;
                }
            }
            DockKind::Border(border) => {
                let side = slot_side_or_center(position)?;
                if border.slot(side).is_some() {
                    return Err(DockError::illegal(format!("border slot {side} is occupied")));
                }
                let _ = child.detach(&mut self.tree).push_back(parent);
                if let DockKind::Border(border) = self.kind_mut(parent)? {
                    border.occupy(side, child);
                }
            }
            DockKind::Float(_) => {
                let [x, y, z] = position.coords() else {
                    return Err(DockError::illegal(format!("float position needs (x,y,z), got {position}")));
                };
                let index = (*z).clamp(0, count as i32) as usize;
                let window = Rect::from_origin_size(Point::new(*x, *y), self.preferred_size(child));
                let _ = child.detach(&mut self.tree).insert_at(parent, index);
                if let DockKind::Float(float) = self.kind_mut(parent)? {
                    float.set_window(child, window);
                }
            }
            _ => {
                let index = slot_index(position)?;
                if index > count {
                    return Err(DockError::IndexOutOfRange { index, len: count });
                }
                let _ = child.detach(&mut self.tree).insert_at(parent, index);
            }
        }
        self.roots.retain(|r| *r != child);
        self.adopt_subtree(child);
        self.relayout(parent);
        Ok(())
    }

    /// Removes an empty child for good.
    pub fn empty_child(&mut self, parent: DockId, child: DockId) -> Result<()> {
        self.check_child(parent, child)?;
        if !self.is_collapsible(child)? {
            return Err(DockError::illegal(format!("{child:?} is not empty")));
        }
        self.unlink_child(parent, child)?;
        self.destroy(child);
        debug!(?parent, ?child, "emptied child");
        self.after_child_loss(parent)
    }

    /// Detaches an empty child that a drag gesture still holds. It stays
    /// invisible until `clear_ghosts`.
    pub fn ghost_child(&mut self, parent: DockId, child: DockId) -> Result<()> {
        self.check_child(parent, child)?;
        if !self.is_empty(child)? {
            return Err(DockError::illegal(format!("{child:?} is not empty")));
        }
        self.unlink_child(parent, child)?;
        self.node_mut(child)?.visible = false;
        self.node_mut(parent)?.ghosts.push(child);
        debug!(?parent, ?child, "ghosted child");
        self.after_child_loss(parent)
    }

    /// Destroys pending ghosts, then collapses whatever emptied meanwhile.
    /// Nothing pending is a no-op.
    pub fn clear_ghosts(&mut self, dock: DockId) -> Result<()> {
        let ghosts = std::mem::take(&mut self.node_mut(dock)?.ghosts);
        if ghosts.is_empty() {
            trace!(?dock, "no ghosts to clear");
            return Ok(());
        }
        for ghost in ghosts {
            self.destroy(ghost);
        }
        let stale: Vec<DockId> = self
            .child_docks(dock)
            .into_iter()
            .filter(|c| !self.drag.is_held(*c) && self.is_collapsible(*c).unwrap_or(false))
            .collect();
        for child in stale {
            self.unlink_child(dock, child)?;
            self.destroy(child);
        }
        debug!(?dock, "cleared ghosts");
        self.after_child_loss(dock)
    }

    pub(crate) fn is_collapsible(&self, dock: DockId) -> Result<bool> {
        Ok(self.is_empty(dock)? && self.node(dock)?.ghosts.is_empty())
    }

    fn unlink_child(&mut self, parent: DockId, child: DockId) -> Result<()> {
        let _ = child.detach(&mut self.tree).into_root();
        self.kind_mut(parent)?.child_removed(child);
        Ok(())
    }

    fn after_child_loss(&mut self, parent: DockId) -> Result<()> {
        while self.promote_split_survivor(parent)? {}
        self.settle(parent)
    }

    /// Lays `dock` out again and, once it is empty with nothing pending,
    /// hands it to its parent to remove or ghost.
    fn settle(&mut self, dock: DockId) -> Result<()> {
        self.relayout(dock);
        if !self.is_collapsible(dock)? {
            return Ok(());
        }
        let Some(parent) = self.parent(dock) else { return Ok(()) };
        if self.drag.is_held(dock) { self.ghost_child(parent, dock) } else { self.empty_child(parent, dock) }
    }

    /// A split left with a single split child takes over that child's
    /// children, orientation, ratio and ghosts.
    fn promote_split_survivor(&mut self, parent: DockId) -> Result<bool> {
        if !matches!(self.kind(parent)?, DockKind::Split(_)) {
            return Ok(false);
        }
        let [survivor] = self.child_docks(parent)[..] else { return Ok(false) };
        let DockKind::Split(inner) = self.kind(survivor)? else { return Ok(false) };
        let (orientation, ratio) = (inner.orientation, inner.ratio);
        let grandchildren = self.child_docks(survivor);
        let ghosts = std::mem::take(&mut self.node_mut(survivor)?.ghosts);

        let _ = survivor.detach(&mut self.tree).into_root();
        for child in grandchildren {
            let _ = child.detach(&mut self.tree).push_back(parent);
        }
        if let DockKind::Split(outer) = self.kind_mut(parent)? {
            outer.orientation = orientation;
            outer.ratio = ratio;
        }
        self.node_mut(parent)?.ghosts.extend(ghosts);
        self.destroy(survivor);
        debug!(?parent, ?survivor, "promoted split survivor");
        Ok(true)
    }

    /// Frees a detached dock, its subtree and its ghosts. Returns the
    /// dockables that were still inside, closed.
    pub(crate) fn destroy(&mut self, dock: DockId) -> Vec<Dockable> {
        let (dropped, gone) = self.dismantle(dock);
        for id in gone {
            self.events.forget_dock(id);
        }
        dropped
    }

    /// Destroys a subtree but leaves listeners scoped to its docks in place.
    /// Returns the dropped dockables and the destroyed docks.
    fn dismantle(&mut self, dock: DockId) -> (Vec<Dockable>, Vec<DockId>) {
        let mut dropped = Vec::new();
        let mut gone = Vec::new();
        let mut pending = vec![dock];
        while let Some(top) = pending.pop() {
            let subtree: Vec<DockId> = top.traverse_postorder(&self.tree.map).collect();
            for id in subtree {
                let Some(mut node) = self.nodes.remove(id) else { continue };
                pending.append(&mut node.ghosts);
                if let Some(leaf) = node.kind.as_leaf_mut() {
                    for mut d in leaf.dockables_mut().drain(..) {
                        self.homes.remove(d.id());
                        d.set_state(DockableState::Closed);
                        dropped.push(d);
                    }
                }
                gone.push(id);
                self.drag.forget(id);
            }
            self.roots.retain(|r| *r != top);
            let _ = top.detach(&mut self.tree).into_root();
            top.remove_root(&mut self.tree);
        }
        trace!(?dock, dropped = dropped.len(), "destroyed dock");
        (dropped, gone)
    }

    /// Detaches and destroys a root dock.
    pub fn remove_root(&mut self, root: DockId) -> Result<Vec<Dockable>> {
        self.node(root)?;
        if self.parent(root).is_some() {
            return Err(DockError::illegal(format!("{root:?} is not a root")));
        }
        Ok(self.destroy(root))
    }

    /// Clears the ghosts of whichever dock holds `ghost`, once nothing holds it.
    pub(crate) fn flush_ghosts_of(&mut self, ghost: DockId) -> Result<()> {
        if self.drag.is_held(ghost) {
            return Ok(());
        }
        let owner = self.nodes.iter().find(|(_, n)| n.ghosts.contains(&ghost)).map(|(id, _)| id);
        match owner {
            Some(owner) => self.clear_ghosts(owner),
            None => Ok(()),
        }
    }

    // ---- floating windows ----

    pub fn set_window_bounds(&mut self, child: DockId, rect: Rect) -> Result<()> {
        let float = self.parent(child).ok_or_else(|| DockError::illegal(format!("{child:?} is not floating")))?;
        let DockKind::Float(f) = self.kind_mut(float)? else {
            return Err(DockError::illegal(format!("{child:?} is not floating")));
        };
        f.set_window(child, rect);
        self.layout_subtree(float);
        Ok(())
    }

    pub fn bring_to_front(&mut self, child: DockId) -> Result<()> {
        let float = self.parent(child).ok_or_else(|| DockError::illegal(format!("{child:?} is not floating")))?;
        if !self.kind(float)?.is_float() {
            return Err(DockError::illegal(format!("{child:?} is not floating")));
        }
        let _ = child.detach(&mut self.tree).insert_at(float, 0);
        self.layout_subtree(float);
        Ok(())
    }

    /// The owning window closed: every floating window it owned goes away,
    /// ghosts included. Returns the dockables that were inside.
    pub fn close_owner(&mut self, owner: &str) -> Vec<Dockable> {
        let floats: Vec<DockId> = self
            .roots
            .iter()
            .copied()
            .filter(|r| matches!(self.kind(*r), Ok(DockKind::Float(f)) if f.owner.as_deref() == Some(owner)))
            .collect();
        let mut dropped = Vec::new();
        for float in floats {
            let children = self.child_docks(float);
            let ghosts = self.nodes.get_mut(float).map(|n| std::mem::take(&mut n.ghosts)).unwrap_or_default();
            for child in children {
                let ids = self.dockables_under(child);
                self.events.fire_all(DockingPhase::WillChange, Some(child), None, &ids);
                if let Ok(kind) = self.kind_mut(float) {
                    kind.child_removed(child);
                }
                let _ = child.detach(&mut self.tree).into_root();
                let (closed, gone) = self.dismantle(child);
                dropped.extend(closed);
                self.events.fire_all(DockingPhase::Changed, Some(child), None, &ids);
                for id in gone {
                    self.events.forget_dock(id);
                }
            }
            for ghost in ghosts {
                dropped.extend(self.destroy(ghost));
            }
        }
        debug!(owner, closed = dropped.len(), "closed floating windows");
        dropped
    }

    // ---- output ----

    pub fn snapshot(&self, dock: DockId) -> Result<DockSnapshot> {
        let node = self.node(dock)?;
        let cx = self.cx(dock);
        let mut store = PropertyStore::default();
        node.kind.save_properties(&cx, "", &mut store);
        let position = self.parent(dock).and_then(|p| self.child_dock_position(p, dock).ok());
        let dockables = node
            .kind
            .as_leaf()
            .map(|l| l.dockables().iter().map(|d| d.id().to_string()).collect())
            .unwrap_or_default();
        let children = self.child_docks(dock).into_iter().map(|c| self.snapshot(c)).collect::<Result<_>>()?;
        Ok(DockSnapshot {
            kind: node.kind.kind_name().to_string(),
            position,
            properties: store.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            dockables,
            children,
        })
    }

    pub fn draw_tree(&self, dock: DockId) -> String {
        let tree = self.get_ascii_tree(dock);
        let mut out = String::new();
        if ascii_tree::write_tree(&mut out, &tree).is_err() {
            warn!(?dock, "could not draw tree");
        }
        out
    }

    fn get_ascii_tree(&self, dock: DockId) -> ascii_tree::Tree {
        let Some(node) = self.nodes.get(dock) else {
            return ascii_tree::Tree::Leaf(vec![format!("{dock:?} (gone)")]);
        };
        let mut desc = node.kind.kind_name().to_string();
        match &node.kind {
            DockKind::Split(s) => desc.push_str(&format!(" {} {:.2}", s.orientation, s.ratio)),
            DockKind::Line(l) => desc.push_str(&format!(" {}", l.orientation)),
            DockKind::CompositeLine(l) => desc.push_str(&format!(" {}", l.orientation)),
            _ => {}
        }
        if let Some(p) = self.parent(dock).and_then(|p| self.child_dock_position(p, dock).ok()) {
            desc.push_str(&format!(" @{p}"));
        }
        if !node.visible {
            desc.push_str(" (hidden)");
        }
        if !node.ghosts.is_empty() {
            desc.push_str(&format!(" ghosts={}", node.ghosts.len()));
        }
        if let Some(leaf) = node.kind.as_leaf() {
            let ids: Vec<&str> = leaf.dockables().iter().map(|d| d.id().as_str()).collect();
            desc.push_str(&format!(" [{}]", ids.join(", ")));
            return ascii_tree::Tree::Leaf(vec![desc]);
        }
        let children = self.child_docks(dock).into_iter().map(|c| self.get_ascii_tree(c)).collect();
        ascii_tree::Tree::Node(desc, children)
    }
}

/// A single member stays a plain dockable; more make a group.
fn draggable_from(mut members: Vec<Dockable>, selected: Option<usize>) -> Draggable {
    if members.len() == 1 {
        if let Some(only) = members.pop() {
            return only.into();
        }
    }
    let mut group = CompositeDockable::new(members);
    if selected.is_some() {
        group.selected = selected;
    }
    group.into()
}

fn slot_index(p: &Position) -> Result<usize> {
    p.as_scalar()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| DockError::illegal(format!("expected an index, got {p}")))
}

fn slot_side_or_center(p: &Position) -> Result<Side> {
    p.as_scalar()
        .and_then(Side::from_slot)
        .ok_or_else(|| DockError::illegal(format!("expected a slot, got {p}")))
}

fn slot_side(p: &Position) -> Result<Side> {
    match slot_side_or_center(p)? {
        Side::Center => Err(DockError::illegal("a split needs an edge to divide along")),
        side => Ok(side),
    }
}
