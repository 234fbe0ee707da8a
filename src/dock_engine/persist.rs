//! Flat key/value persistence of dock trees.
//!
//! Every structural fact is one entry under a hierarchical prefix built from
//! the root id and the child ids on the way down, e.g. `r0.c1.orientation`.

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::DockId;
use super::engine::DockEngine;
use super::error::{DockError, Result};
use super::graph::Side;
use super::kinds::border::FALLBACK_ORDER;
use super::kinds::{Dock, DockKind};
use super::position::Position;
use crate::common::collections::{BTreeMap, HashMap};
use crate::model::dockable::{Dockable, DockableId};
use crate::sys::geometry::Rect;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyStore {
    entries: BTreeMap<String, String>,
}

impl PropertyStore {
    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        self.entries.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> { self.entries.get(key).map(String::as_str) }

    pub fn contains(&self, key: &str) -> bool { self.entries.contains_key(key) }

    pub fn remove(&mut self, key: &str) -> Option<String> { self.entries.remove(key) }

    /// Parsed value, `None` when missing or malformed (malformed is logged).
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        let text = self.get(key)?;
        match text.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(key, text, "unparsable property");
                None
            }
        }
    }

    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> T { self.get_parsed(key).unwrap_or(default) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key starts with `prefix`, with the prefix stripped.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], v.as_str()))
    }

    pub fn to_ron_string(&self) -> anyhow::Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn from_ron_str(text: &str) -> anyhow::Result<Self> { Ok(ron::from_str(text)?) }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let buf = fs::read_to_string(path)?;
        Self::from_ron_str(&buf)
    }
}

fn rect_position(r: Rect) -> Position { Position::new([r.x, r.y, r.width, r.height]) }

fn position_rect(p: &Position) -> Option<Rect> {
    match p.coords() {
        [x, y, w, h] => Some(Rect::new(*x, *y, *w, *h)),
        _ => None,
    }
}

impl DockEngine {
    /// Writes one dock: its kind scalars, its dockables or its child id list,
    /// and the position of every child under `<prefix><childId>.`.
    /// `child_ids` names the children in order.
    pub fn save_properties(
        &self,
        dock: DockId,
        prefix: &str,
        store: &mut PropertyStore,
        child_ids: &[String],
    ) -> Result<()> {
        let kind = self.kind(dock)?;
        kind.save_properties(&self.cx(dock), prefix, store);
        if let Some(leaf) = kind.as_leaf() {
            store.set(format!("{prefix}dockableCount"), leaf.dockables().len());
            for (i, d) in leaf.dockables().iter().enumerate() {
                store.set(format!("{prefix}dockable.{i}"), d.id());
            }
            return Ok(());
        }
        let children = self.child_docks(dock);
        store.set(format!("{prefix}childDockCount"), children.len());
        for (i, (child, cid)) in children.iter().zip(child_ids).enumerate() {
            store.set(format!("{prefix}childDock.{i}"), cid);
            let position = self.child_dock_position(dock, *child)?;
            store.set(format!("{prefix}{cid}.position"), position);
            if let DockKind::Float(float) = kind {
                if let Some(window) = float.window(*child) {
                    store.set(format!("{prefix}{cid}.window"), rect_position(window));
                }
            }
        }
        Ok(())
    }

    /// Restores one dock written by `save_properties`. `child_docks` maps the
    /// saved child ids to docks already rebuilt (and still detached); the
    /// dockables are taken out of `dockables` by id. Missing dockables are
    /// skipped and children with unusable positions go to the next free
    /// default position. Float docks without a saved owner get `owner`.
    pub fn load_properties(
        &mut self,
        dock: DockId,
        prefix: &str,
        store: &PropertyStore,
        child_docks: &HashMap<String, DockId>,
        dockables: &mut HashMap<DockableId, Dockable>,
        owner: Option<&str>,
    ) -> Result<()> {
        {
            let node = self.nodes.get_mut(dock).ok_or(DockError::UnknownDock(dock))?;
            node.kind.load_properties(prefix, store, &self.factories);
            if let DockKind::Float(float) = &mut node.kind {
                if float.owner.is_none() {
                    float.owner = owner.map(str::to_string);
                }
            }
        }
        if self.kind(dock)?.is_leaf() {
            self.load_dockables(dock, prefix, store, dockables)?;
        } else {
            self.load_children(dock, prefix, store, child_docks)?;
        }
        Ok(())
    }

    fn load_dockables(
        &mut self,
        dock: DockId,
        prefix: &str,
        store: &PropertyStore,
        dockables: &mut HashMap<DockableId, Dockable>,
    ) -> Result<()> {
        let count: usize = store.get_or(&format!("{prefix}dockableCount"), 0);
        let mut found = Vec::with_capacity(count);
        for i in 0..count {
            let Some(id) = store.get(&format!("{prefix}dockable.{i}")) else { continue };
            let id = DockableId::new(id);
            if self.home_of(&id).is_some() {
                warn!(%id, "dockable is already docked, skipping");
                continue;
            }
            match dockables.remove(&id) {
                Some(d) => found.push(d),
                None => debug!(%id, "saved dockable is not available, skipping"),
            }
        }
        let Some(leaf) = self.kind_mut(dock)?.as_leaf_mut() else { return Ok(()) };
        let room = leaf.capacity().unwrap_or(usize::MAX).saturating_sub(leaf.dockables().len());
        if found.len() > room {
            warn!(?dock, kept = room, dropped = found.len() - room, "too many dockables for dock");
            found.truncate(room);
        }
        let len = leaf.dockables().len();
        leaf.insert_at(len, found)?;
        if let Some(selected) = store.get_parsed(&format!("{prefix}selectedDockable")) {
            leaf.set_selected(Some(selected));
        }
        self.adopt(dock);
        Ok(())
    }

    fn load_children(
        &mut self,
        dock: DockId,
        prefix: &str,
        store: &PropertyStore,
        child_docks: &HashMap<String, DockId>,
    ) -> Result<()> {
        let count: usize = store.get_or(&format!("{prefix}childDockCount"), 0);
        for i in 0..count {
            let Some(cid) = store.get(&format!("{prefix}childDock.{i}")) else { continue };
            let Some(&child) = child_docks.get(cid) else {
                debug!(cid, "saved child dock was not rebuilt, skipping");
                continue;
            };
            if self.is_collapsible(child)? {
                debug!(cid, "saved child dock came back empty, dropping it");
                self.destroy(child);
                continue;
            }
            let saved: Option<Position> = store.get_parsed(&format!("{prefix}{cid}.position"));
            let placed = match saved {
                Some(p) => self.add_child_dock(dock, child, &p).is_ok(),
                None => false,
            };
            if !placed {
                let fallback = self.default_child_position(dock)?;
                let retried = match &fallback {
                    Some(p) => self.add_child_dock(dock, child, p).is_ok(),
                    None => false,
                };
                if !retried {
                    warn!(cid, ?fallback, "no room for saved child dock, dropping it");
                    self.destroy(child);
                    continue;
                }
            }
            let window: Option<Position> = store.get_parsed(&format!("{prefix}{cid}.window"));
            if let Some(rect) = window.as_ref().and_then(position_rect) {
                self.set_window_bounds(child, rect)?;
            }
        }
        if let Some(index) = store.get_parsed::<usize>(&format!("{prefix}selectedChild")) {
            if let Ok(child) = self.child_dock(dock, index) {
                self.select_child(child)?;
            }
        }
        Ok(())
    }

    /// Next free position for a child of `dock`, if it has room.
    fn default_child_position(&self, dock: DockId) -> Result<Option<Position>> {
        let count = self.child_dock_count(dock);
        let position = match self.kind(dock)? {
            DockKind::Split(split) => match count {
                0 => Some(Position::side(Side::Center)),
                1 => Some(Position::side(split.side_of_index(1))),
                _ => None,
            },
            DockKind::Border(border) => FALLBACK_ORDER
                .into_iter()
                .find(|side| border.slot(*side).is_none())
                .map(Position::side),
            DockKind::Float(_) => Some(Position::float(0, 0, count as i32)),
            kind if kind.is_leaf() => None,
            _ => Some(Position::index(count)),
        };
        Ok(position)
    }

    /// Flattens the trees under `roots` into one store. Roots are named
    /// `r0, r1, ...` and children `c0, c1, ...` below their parent's prefix.
    pub fn save_layout(&self, roots: &[DockId]) -> Result<PropertyStore> {
        let mut store = PropertyStore::default();
        store.set("roots.count", roots.len());
        for (i, root) in roots.iter().enumerate() {
            let name = format!("r{i}");
            store.set(format!("roots.{i}"), &name);
            store.set(format!("{name}.bounds"), rect_position(self.node(*root)?.bounds));
            self.save_dock(*root, &format!("{name}."), &mut store)?;
        }
        debug!(roots = roots.len(), entries = store.len(), "saved layout");
        Ok(store)
    }

    fn save_dock(&self, dock: DockId, prefix: &str, store: &mut PropertyStore) -> Result<()> {
        store.set(format!("{prefix}kind"), self.kind(dock)?.kind_name());
        let children = self.child_docks(dock);
        let ids: Vec<String> = (0..children.len()).map(|i| format!("c{i}")).collect();
        self.save_properties(dock, prefix, store, &ids)?;
        for (child, cid) in children.iter().zip(&ids) {
            self.save_dock(*child, &format!("{prefix}{cid}."), store)?;
        }
        Ok(())
    }

    /// Rebuilds the roots saved by `save_layout`, taking dockables from
    /// `dockables` by id. Returns the new roots in saved order; a root whose
    /// kind is unknown is skipped.
    pub fn load_layout(
        &mut self,
        store: &PropertyStore,
        dockables: impl IntoIterator<Item = Dockable>,
        owner: Option<&str>,
    ) -> Result<Vec<DockId>> {
        let mut available: HashMap<DockableId, Dockable> =
            dockables.into_iter().map(|d| (d.id().clone(), d)).collect();
        let count: usize = store.get_or("roots.count", 0);
        let mut roots = Vec::with_capacity(count);
        for i in 0..count {
            let Some(name) = store.get(&format!("roots.{i}")) else { continue };
            let Some(root) = self.load_dock(store, &format!("{name}."), &mut available, owner)? else {
                continue;
            };
            let bounds = store
                .get_parsed::<Position>(&format!("{name}.bounds"))
                .and_then(|p| position_rect(&p))
                .unwrap_or_default();
            self.roots.push(root);
            self.set_bounds(root, bounds)?;
            roots.push(root);
        }
        if !available.is_empty() {
            debug!(unused = available.len(), "dockables not named by the layout");
        }
        debug!(roots = roots.len(), "loaded layout");
        Ok(roots)
    }

    fn load_dock(
        &mut self,
        store: &PropertyStore,
        prefix: &str,
        dockables: &mut HashMap<DockableId, Dockable>,
        owner: Option<&str>,
    ) -> Result<Option<DockId>> {
        let name = store.get(&format!("{prefix}kind")).unwrap_or_default();
        let Some(kind) = DockKind::from_name(name, &self.factories) else {
            warn!(prefix, kind = name, "unknown dock kind, skipping subtree");
            return Ok(None);
        };
        let dock = self.create_dock(kind);
        let mut children = HashMap::default();
        if !self.kind(dock)?.is_leaf() {
            let count: usize = store.get_or(&format!("{prefix}childDockCount"), 0);
            for i in 0..count {
                let Some(cid) = store.get(&format!("{prefix}childDock.{i}")) else { continue };
                if let Some(child) = self.load_dock(store, &format!("{prefix}{cid}."), dockables, owner)? {
                    children.insert(cid.to_string(), child);
                }
            }
        }
        self.load_properties(dock, prefix, store, &children, dockables, owner)?;
        // Children the dock did not take are still detached roots.
        for child in children.into_values() {
            if self.contains(child) && self.parent(child).is_none() {
                self.destroy(child);
            }
        }
        Ok(Some(dock))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn typed_getters_fall_back() {
        let mut store = PropertyStore::default();
        store.set("a.count", 3);
        store.set("a.ratio", "nope");
        assert_eq!(3usize, store.get_or("a.count", 0));
        assert_eq!(0.5, store.get_or("a.ratio", 0.5));
        assert_eq!(7, store.get_or("a.missing", 7));
    }

    #[test]
    fn prefix_scan_strips_prefix() {
        let mut store = PropertyStore::default();
        store.set("r0.kind", "split");
        store.set("r0.c0.kind", "tab");
        store.set("r1.kind", "grid");
        let keys: Vec<_> = store.with_prefix("r0.").map(|(k, _)| k).collect();
        assert_eq!(vec!["c0.kind", "kind"], keys);
    }

    #[test]
    fn ron_file_round_trip() {
        let mut store = PropertyStore::default();
        store.set("roots.count", 1);
        store.set("r0.bounds", Position::new([0, 0, 800, 600]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("layout.ron");
        store.save_to(&path).unwrap();
        assert_eq!(store, PropertyStore::load_from(&path).unwrap());
    }

    #[test]
    fn window_rectangles_need_four_coordinates() {
        assert_eq!(Some(Rect::new(1, 2, 3, 4)), position_rect(&Position::new([1, 2, 3, 4])));
        assert_eq!(None, position_rect(&Position::index(2)));
    }
}
