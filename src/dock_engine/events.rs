use serde::Serialize;
use slotmap::SlotMap;
use tracing::trace;

use super::DockId;
use crate::model::dockable::DockableId;

slotmap::new_key_type! { pub struct ListenerId; }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingPhase {
    WillChange,
    Changed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DockingEvent {
    pub phase: DockingPhase,
    /// Dock the dockable leaves, if any.
    pub origin: Option<DockId>,
    /// Dock the dockable is added to, if any.
    pub destination: Option<DockId>,
    pub dockable: DockableId,
}

pub trait DockingListener {
    fn on_event(&mut self, event: &DockingEvent);
}

impl<F: FnMut(&DockingEvent)> DockingListener for F {
    fn on_event(&mut self, event: &DockingEvent) { self(event) }
}

struct Registration {
    /// `None` listens to every dock.
    scope: Option<DockId>,
    listener: Box<dyn DockingListener>,
}

#[derive(Default)]
pub struct EventSupport {
    listeners: SlotMap<ListenerId, Registration>,
}

impl EventSupport {
    pub fn add(&mut self, scope: Option<DockId>, listener: Box<dyn DockingListener>) -> ListenerId {
        self.listeners.insert(Registration { scope, listener })
    }

    pub fn remove(&mut self, id: ListenerId) -> bool { self.listeners.remove(id).is_some() }

    /// Drops listeners registered on a dock that no longer exists.
    pub fn forget_dock(&mut self, dock: DockId) { self.listeners.retain(|_, r| r.scope != Some(dock)); }

    pub fn len(&self) -> usize { self.listeners.len() }

    pub fn is_empty(&self) -> bool { self.listeners.is_empty() }

    pub fn fire(&mut self, event: DockingEvent) {
        trace!(?event, "firing");
        for (_, reg) in self.listeners.iter_mut() {
            let wants = match reg.scope {
                None => true,
                Some(dock) => event.origin == Some(dock) || event.destination == Some(dock),
            };
            if wants {
                reg.listener.on_event(&event);
            }
        }
    }

    /// Fires one event per dockable for the given phase.
    pub fn fire_all(
        &mut self,
        phase: DockingPhase,
        origin: Option<DockId>,
        destination: Option<DockId>,
        dockables: &[DockableId],
    ) {
        for dockable in dockables {
            self.fire(DockingEvent {
                phase,
                origin,
                destination,
                dockable: dockable.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::model::tree::Tree;

    #[test]
    fn scoped_and_global_listeners() {
        let mut tree = Tree::new();
        let a = tree.mk_node().into_root();
        let b = tree.mk_node().into_root();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventSupport::default();
        let log = seen.clone();
        events.add(Some(a), Box::new(move |e: &DockingEvent| log.borrow_mut().push(("a", e.phase))));
        let log = seen.clone();
        let global = events.add(None, Box::new(move |e: &DockingEvent| log.borrow_mut().push(("all", e.phase))));

        events.fire_all(DockingPhase::WillChange, None, Some(b), &[DockableId::new("x")]);
        events.fire_all(DockingPhase::Changed, Some(b), Some(a), &[DockableId::new("x")]);
        assert_eq!(
            vec![
                ("all", DockingPhase::WillChange),
                ("a", DockingPhase::Changed),
                ("all", DockingPhase::Changed)
            ],
            *seen.borrow()
        );

        assert!(events.remove(global));
        events.forget_dock(a);
        assert!(events.is_empty());
    }
}
