//! Panels that can be docked, and what a drag gesture carries around.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::common::collections::BTreeSet;
use crate::sys::geometry::Size;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DockableId(pub String);

impl DockableId {
    pub fn new(id: impl Into<String>) -> Self { DockableId(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DockableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for DockableId {
    fn from(value: &str) -> Self { DockableId::new(value) }
}

bitflags! {
    /// Ways a dockable agrees to be docked.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DockingModes: u32 {
        const SINGLE = 1 << 0;
        const TAB = 1 << 1;
        const LINE_HORIZONTAL = 1 << 2;
        const LINE_VERTICAL = 1 << 3;
        const GRID = 1 << 4;
        const CENTER = 1 << 5;
        const LEFT = 1 << 6;
        const RIGHT = 1 << 7;
        const TOP = 1 << 8;
        const BOTTOM = 1 << 9;
        const FLOAT = 1 << 10;

        const ALL = Self::SINGLE.bits()
            | Self::TAB.bits()
            | Self::LINE_HORIZONTAL.bits()
            | Self::LINE_VERTICAL.bits()
            | Self::GRID.bits()
            | Self::CENTER.bits()
            | Self::LEFT.bits()
            | Self::RIGHT.bits()
            | Self::TOP.bits()
            | Self::BOTTOM.bits()
            | Self::FLOAT.bits();
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DockableState {
    #[default]
    Normal,
    Closed,
    Maximized,
    Externalized,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dockable {
    id: DockableId,
    pub title: String,
    modes: DockingModes,
    pub preferred_size: Size,
    state: DockableState,
}

impl Dockable {
    pub fn new(id: impl Into<DockableId>, modes: DockingModes, preferred_size: Size) -> Self {
        let id = id.into();
        Dockable {
            title: id.0.clone(),
            id,
            modes,
            preferred_size,
            state: DockableState::Closed,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn id(&self) -> &DockableId { &self.id }

    pub fn modes(&self) -> DockingModes { self.modes }

    pub fn supports(&self, modes: DockingModes) -> bool { self.modes.contains(modes) }

    pub fn state(&self) -> DockableState { self.state }

    pub(crate) fn set_state(&mut self, state: DockableState) { self.state = state; }
}

impl From<String> for DockableId {
    fn from(value: String) -> Self { DockableId(value) }
}

/// An ordered group of dockables moved as one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeDockable {
    pub members: Vec<Dockable>,
    pub selected: Option<usize>,
}

impl CompositeDockable {
    pub fn new(members: Vec<Dockable>) -> Self {
        let selected = if members.is_empty() { None } else { Some(0) };
        CompositeDockable { members, selected }
    }
}

/// What a drag gesture or a programmatic add carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Draggable {
    Single(Dockable),
    Composite(CompositeDockable),
}

impl Draggable {
    pub fn members(&self) -> &[Dockable] {
        match self {
            Draggable::Single(d) => std::slice::from_ref(d),
            Draggable::Composite(c) => &c.members,
        }
    }

    pub fn into_members(self) -> Vec<Dockable> {
        match self {
            Draggable::Single(d) => vec![d],
            Draggable::Composite(c) => c.members,
        }
    }

    pub fn len(&self) -> usize { self.members().len() }

    pub fn is_empty(&self) -> bool { self.members().is_empty() }

    pub fn is_composite(&self) -> bool { matches!(self, Draggable::Composite(_)) }

    /// True when every member supports all of `modes`. An empty group
    /// supports nothing.
    pub fn supports(&self, modes: DockingModes) -> bool {
        !self.is_empty() && self.members().iter().all(|d| d.supports(modes))
    }

    /// Modes every member supports.
    pub fn common_modes(&self) -> DockingModes {
        self.members().iter().fold(
            if self.is_empty() { DockingModes::empty() } else { DockingModes::ALL },
            |acc, d| acc & d.modes(),
        )
    }

    /// Bounding size of the members.
    pub fn preferred_size(&self) -> Size {
        self.members().iter().fold(Size::default(), |acc, d| acc.union(d.preferred_size))
    }

    pub fn ids(&self) -> BTreeSet<DockableId> { self.members().iter().map(|d| d.id().clone()).collect() }
}

impl From<Dockable> for Draggable {
    fn from(value: Dockable) -> Self { Draggable::Single(value) }
}

impl From<CompositeDockable> for Draggable {
    fn from(value: CompositeDockable) -> Self { Draggable::Composite(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, modes: DockingModes, w: i32, h: i32) -> Dockable {
        Dockable::new(id, modes, Size::new(w, h))
    }

    #[test]
    fn composite_supports_only_common_modes() {
        let group = Draggable::from(CompositeDockable::new(vec![
            panel("a", DockingModes::TAB | DockingModes::GRID, 10, 10),
            panel("b", DockingModes::GRID | DockingModes::LEFT, 10, 10),
        ]));
        assert!(group.supports(DockingModes::GRID));
        assert!(!group.supports(DockingModes::TAB));
        assert_eq!(DockingModes::GRID, group.common_modes());
    }

    #[test]
    fn preferred_size_is_bounding() {
        let group = Draggable::from(CompositeDockable::new(vec![
            panel("a", DockingModes::ALL, 300, 50),
            panel("b", DockingModes::ALL, 100, 200),
        ]));
        assert_eq!(Size::new(300, 200), group.preferred_size());
        assert_eq!(2, group.ids().len());
    }

    #[test]
    fn empty_group_supports_nothing() {
        let group = Draggable::from(CompositeDockable::new(vec![]));
        assert!(!group.supports(DockingModes::SINGLE));
        assert_eq!(DockingModes::empty(), group.common_modes());
    }

    #[test]
    fn state_text_names() {
        assert_eq!("externalized", DockableState::Externalized.to_string());
        assert_eq!(Ok(DockableState::Maximized), "maximized".parse());
    }
}
