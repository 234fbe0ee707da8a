//! Drag gestures: the dockables being dragged, the docks they came from and
//! the target currently under the pointer.
//!
//! A gesture holds its origin docks so that they survive (as ghosts) if the
//! drop empties them before the dockables land somewhere else. Dragging more
//! than one dockable moves them as a single group.

use serde::Serialize;
use slotmap::SlotMap;
use tracing::{debug, trace};

use super::DockId;
use super::engine::DockEngine;
use super::error::{DockError, Result};
use super::priority::Priority;
use crate::common::collections::HashMap;
use crate::model::dockable::{DockableId, Draggable};
use crate::sys::geometry::{Point, Rect};

slotmap::new_key_type! { pub struct GestureId; }

#[derive(Debug, Clone)]
struct Gesture {
    members: Vec<DockableId>,
    origins: Vec<DockId>,
    /// Pointer offset into the dragged content.
    grab: Point,
    /// Target shown by the last `drag_over`.
    candidate: Option<DockId>,
}

#[derive(Debug, Default)]
pub struct DragManager {
    gestures: SlotMap<GestureId, Gesture>,
    holds: HashMap<DockId, usize>,
}

impl DragManager {
    pub fn hold(&mut self, dock: DockId) { *self.holds.entry(dock).or_default() += 1; }

    /// Drops one hold. Returns true once nothing holds the dock any more.
    pub fn release(&mut self, dock: DockId) -> bool {
        let Some(count) = self.holds.get_mut(&dock) else { return true };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.holds.remove(&dock);
            return true;
        }
        false
    }

    pub fn is_held(&self, dock: DockId) -> bool { self.holds.contains_key(&dock) }

    /// Forgets a dock that was destroyed.
    pub fn forget(&mut self, dock: DockId) { self.holds.remove(&dock); }

    pub fn active_gestures(&self) -> usize { self.gestures.len() }
}

/// What the host draws while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragFeedback {
    pub target: Option<DockId>,
    pub priority: Priority,
    pub rect: Option<Rect>,
}

impl DragFeedback {
    fn nothing() -> Self { DragFeedback { target: None, priority: Priority::CannotDock, rect: None } }
}

impl DockEngine {
    /// Starts dragging a docked dockable grabbed `grab` pixels into its content.
    pub fn begin_drag(&mut self, id: &DockableId, grab: Point) -> Result<GestureId> {
        self.begin_group_drag(std::slice::from_ref(id), grab)
    }

    /// Starts dragging every dockable of `leaf` as one group, e.g. a whole
    /// tab stack pulled by its header.
    pub fn begin_leaf_drag(&mut self, leaf: DockId, grab: Point) -> Result<GestureId> {
        let ids: Vec<DockableId> = self.dockables(leaf)?.iter().map(|d| d.id().clone()).collect();
        self.begin_group_drag(&ids, grab)
    }

    /// Starts dragging docked dockables together, in the given order.
    pub fn begin_group_drag(&mut self, ids: &[DockableId], grab: Point) -> Result<GestureId> {
        if ids.is_empty() {
            return Err(DockError::illegal("nothing to drag"));
        }
        let mut origins = Vec::new();
        for id in ids {
            let origin = self.home_of(id).ok_or_else(|| DockError::DockableNotFound(id.clone()))?;
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }
        for origin in &origins {
            self.drag.hold(*origin);
        }
        let gesture = self.drag.gestures.insert(Gesture {
            members: ids.to_vec(),
            origins,
            grab,
            candidate: None,
        });
        debug!(?gesture, ?ids, "drag started");
        Ok(gesture)
    }

    /// Previews the drop under `at`. The previous candidate is kept while it
    /// scores at least as well as the best alternative, so the highlight does
    /// not flicker between equal targets.
    pub fn drag_over(&mut self, gesture: GestureId, at: Point) -> Result<DragFeedback> {
        let item = self.gesture_item(gesture)?;
        let best = self.find_target(&item, at);
        let previous = self.drag.gestures.get(gesture).and_then(|g| g.candidate);
        let sticky = previous.and_then(|prev| {
            let p = self.dock_priority(prev, &item, at).ok()?;
            (p.can_dock() && best.is_none_or(|(_, b)| p >= b)).then_some((prev, p))
        });
        let Some((target, _)) = sticky.or(best) else {
            if let Some(g) = self.drag.gestures.get_mut(gesture) {
                g.candidate = None;
            }
            return Ok(DragFeedback::nothing());
        };
        let preview = self.retrieve_docking_rectangle(target, &item, at)?;
        if let Some(g) = self.drag.gestures.get_mut(gesture) {
            g.candidate = Some(target);
        }
        trace!(?gesture, ?target, ?preview, "drag over");
        Ok(DragFeedback { target: Some(target), priority: preview.priority, rect: preview.rect })
    }

    /// Drops the dragged dockable at `at` and ends the gesture. Returns the
    /// dock it landed in, or `None` when nothing under the point takes it and
    /// the dockable stays where it was.
    pub fn drop_dragged(&mut self, gesture: GestureId, at: Point) -> Result<Option<DockId>> {
        let result = self.drop_gesture(gesture, at);
        self.end_drag(gesture)?;
        result
    }

    fn drop_gesture(&mut self, gesture: GestureId, at: Point) -> Result<Option<DockId>> {
        let g = self.drag.gestures.get(gesture).cloned().ok_or(DockError::UnknownGesture(gesture))?;
        let item = self.gesture_item(gesture)?;
        let candidate = g
            .candidate
            .filter(|c| self.dock_priority(*c, &item, at).is_ok_and(Priority::can_dock));
        let Some(target) = candidate.or_else(|| self.find_target(&item, at).map(|(t, _)| t)) else {
            debug!(?gesture, "dropped outside any dock");
            return Ok(None);
        };
        let Some(lead) = g.members.first() else { return Ok(None) };
        match self.relocate(&g.members, target, at, g.grab) {
            Ok(()) => Ok(self.home_of(lead)),
            // The dockables are still docked, so the drop simply did nothing.
            Err(DockError::CannotDock(..)) if self.home_of(lead).is_some() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Abandons a gesture without moving anything.
    pub fn cancel_drag(&mut self, gesture: GestureId) -> Result<()> { self.end_drag(gesture) }

    /// Releases the gesture's holds and destroys every ghost nothing holds any
    /// more, parents before children.
    pub fn end_drag(&mut self, gesture: GestureId) -> Result<()> {
        let g = self.drag.gestures.remove(gesture).ok_or(DockError::UnknownGesture(gesture))?;
        for origin in &g.origins {
            self.drag.release(*origin);
        }
        let mut owners: Vec<(usize, DockId)> = self
            .nodes
            .iter()
            .filter(|(_, n)| !n.ghosts.is_empty())
            .map(|(id, _)| (id.depth(&self.tree.map), id))
            .collect();
        owners.sort();
        for (_, owner) in owners {
            // An earlier flush may have collapsed this dock already.
            let Ok(node) = self.node(owner) else { continue };
            if node.ghosts.iter().any(|ghost| self.drag.is_held(*ghost)) {
                continue;
            }
            self.clear_ghosts(owner)?;
        }
        debug!(?gesture, "drag ended");
        Ok(())
    }

    fn gesture_item(&self, gesture: GestureId) -> Result<Draggable> {
        let g = self.drag.gestures.get(gesture).ok_or(DockError::UnknownGesture(gesture))?;
        self.group_item(&g.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_are_counted() {
        let mut keys = slotmap::SlotMap::<DockId, ()>::with_key();
        let dock = keys.insert(());
        let mut drag = DragManager::default();
        drag.hold(dock);
        drag.hold(dock);
        assert!(!drag.release(dock));
        assert!(drag.is_held(dock));
        assert!(drag.release(dock));
        assert!(!drag.is_held(dock));
        assert!(drag.release(dock));
    }
}
