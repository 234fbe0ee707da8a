//! Builders for new child docks, resolved by key when a layout is loaded.

use std::fmt;

use tracing::warn;

use super::graph::Orientation;
use super::kinds::{DockKind, Grid, Line, Single, Split, Tab};
use super::persist::PropertyStore;
use crate::common::collections::BTreeMap;
use crate::model::dockable::{DockingModes, Draggable};
use crate::sys::geometry::Size;

pub const BUILTIN_FACTORY_KEYS: &[&str] =
    &["leaf", "single", "tab", "line_horizontal", "line_vertical", "grid", "split"];

pub trait DockFactory: fmt::Debug {
    /// Registry key written to saved layouts.
    fn key(&self) -> &'static str;

    /// A new empty dock able to take `item` in `mode`, or `None`.
    fn create_dock(&self, item: &Draggable, mode: DockingModes) -> Option<DockKind>;

    fn dock_preferred_size(&self, item: &Draggable, _mode: DockingModes) -> Size {
        item.preferred_size()
    }

    fn save_properties(&self, _prefix: &str, _store: &mut PropertyStore) {}

    fn load_properties(&mut self, _prefix: &str, _store: &PropertyStore, _registry: &FactoryRegistry) {}

    fn clone_box(&self) -> Box<dyn DockFactory>;
}

impl Clone for Box<dyn DockFactory> {
    fn clone(&self) -> Self { self.clone_box() }
}

/// Picks a leaf for the item: tabs when every member can be tabbed, a single
/// dock for a lone panel, otherwise a line or grid that fits the mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafFactory;

impl DockFactory for LeafFactory {
    fn key(&self) -> &'static str { "leaf" }

    fn create_dock(&self, item: &Draggable, mode: DockingModes) -> Option<DockKind> {
        if item.is_empty() {
            return None;
        }
        if item.supports(DockingModes::TAB) {
            return Some(Tab::default().into());
        }
        if item.len() == 1 && item.supports(DockingModes::SINGLE) {
            return Some(Single::default().into());
        }
        let common = item.common_modes();
        let wanted = [
            (DockingModes::LINE_VERTICAL, Orientation::Vertical),
            (DockingModes::LINE_HORIZONTAL, Orientation::Horizontal),
        ];
        if let Some((_, o)) = wanted.iter().find(|(m, _)| mode.contains(*m) && common.contains(*m)) {
            return Some(Line::new(*o).into());
        }
        if common.contains(DockingModes::GRID) {
            return Some(Grid::default().into());
        }
        wanted
            .iter()
            .rev()
            .find(|(m, _)| common.contains(*m))
            .map(|(_, o)| Line::new(*o).into())
    }

    fn clone_box(&self) -> Box<dyn DockFactory> { Box::new(*self) }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFactory;

impl DockFactory for SingleFactory {
    fn key(&self) -> &'static str { "single" }

    fn create_dock(&self, item: &Draggable, _mode: DockingModes) -> Option<DockKind> {
        (item.len() == 1 && item.supports(DockingModes::SINGLE)).then(|| Single::default().into())
    }

    fn clone_box(&self) -> Box<dyn DockFactory> { Box::new(*self) }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TabFactory;

impl DockFactory for TabFactory {
    fn key(&self) -> &'static str { "tab" }

    fn create_dock(&self, item: &Draggable, _mode: DockingModes) -> Option<DockKind> {
        item.supports(DockingModes::TAB).then(|| Tab::default().into())
    }

    fn clone_box(&self) -> Box<dyn DockFactory> { Box::new(*self) }
}

#[derive(Debug, Clone, Copy)]
pub struct LineFactory(pub Orientation);

impl DockFactory for LineFactory {
    fn key(&self) -> &'static str {
        match self.0 {
            Orientation::Horizontal => "line_horizontal",
            Orientation::Vertical => "line_vertical",
        }
    }

    fn create_dock(&self, item: &Draggable, _mode: DockingModes) -> Option<DockKind> {
        item.supports(self.0.line_mode()).then(|| Line::new(self.0).into())
    }

    fn dock_preferred_size(&self, item: &Draggable, _mode: DockingModes) -> Size {
        item.members().iter().fold(Size::default(), |acc, d| {
            let p = d.preferred_size;
            match self.0 {
                Orientation::Horizontal => Size::new(acc.width + p.width, acc.height.max(p.height)),
                Orientation::Vertical => Size::new(acc.width.max(p.width), acc.height + p.height),
            }
        })
    }

    fn clone_box(&self) -> Box<dyn DockFactory> { Box::new(*self) }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GridFactory;

impl DockFactory for GridFactory {
    fn key(&self) -> &'static str { "grid" }

    fn create_dock(&self, item: &Draggable, _mode: DockingModes) -> Option<DockKind> {
        item.supports(DockingModes::GRID).then(|| Grid::default().into())
    }

    fn clone_box(&self) -> Box<dyn DockFactory> { Box::new(*self) }
}

/// Creates split docks whose first leaf comes from a nested factory.
#[derive(Debug, Clone)]
pub struct SplitFactory {
    pub child: Box<dyn DockFactory>,
}

impl Default for SplitFactory {
    fn default() -> Self { SplitFactory { child: Box::new(LeafFactory) } }
}

impl DockFactory for SplitFactory {
    fn key(&self) -> &'static str { "split" }

    fn create_dock(&self, item: &Draggable, mode: DockingModes) -> Option<DockKind> {
        self.child
            .create_dock(item, mode)
            .map(|_| Split::new(self.child.clone_box()).into())
    }

    fn dock_preferred_size(&self, item: &Draggable, mode: DockingModes) -> Size {
        self.child.dock_preferred_size(item, mode)
    }

    fn save_properties(&self, prefix: &str, store: &mut PropertyStore) {
        store.set(format!("{prefix}childDockFactory"), self.child.key());
        self.child.save_properties(&format!("{prefix}childDockFactory."), store);
    }

    fn load_properties(&mut self, prefix: &str, store: &PropertyStore, registry: &FactoryRegistry) {
        self.child = registry.load_factory(&format!("{prefix}childDockFactory"), store);
    }

    fn clone_box(&self) -> Box<dyn DockFactory> { Box::new(self.clone()) }
}

type Constructor = fn() -> Box<dyn DockFactory>;

/// Closed table of factory constructors, filled at startup.
#[derive(Clone)]
pub struct FactoryRegistry {
    default_key: String,
    table: BTreeMap<&'static str, Constructor>,
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("default_key", &self.default_key)
            .field("keys", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self { Self::builtin("leaf") }
}

impl FactoryRegistry {
    pub fn builtin(default_key: &str) -> Self {
        let mut table: BTreeMap<&'static str, Constructor> = BTreeMap::new();
        table.insert("leaf", || Box::new(LeafFactory));
        table.insert("single", || Box::new(SingleFactory));
        table.insert("tab", || Box::new(TabFactory));
        table.insert("line_horizontal", || Box::new(LineFactory(Orientation::Horizontal)));
        table.insert("line_vertical", || Box::new(LineFactory(Orientation::Vertical)));
        table.insert("grid", || Box::new(GridFactory));
        table.insert("split", || Box::new(SplitFactory::default()));
        let default_key = if table.contains_key(default_key) {
            default_key.to_string()
        } else {
            warn!(default_key, "unknown default factory, using leaf");
            "leaf".to_string()
        };
        FactoryRegistry { default_key, table }
    }

    pub fn register(&mut self, key: &'static str, ctor: Constructor) { self.table.insert(key, ctor); }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ { self.table.keys().copied() }

    pub fn default_factory(&self) -> Box<dyn DockFactory> {
        match self.table.get(self.default_key.as_str()) {
            Some(ctor) => ctor(),
            None => Box::new(LeafFactory),
        }
    }

    pub fn get(&self, key: &str) -> Option<Box<dyn DockFactory>> { self.table.get(key).map(|c| c()) }

    /// Resolves `key`, falling back to the default factory.
    pub fn create(&self, key: &str) -> Box<dyn DockFactory> {
        self.get(key).unwrap_or_else(|| {
            warn!(key, fallback = %self.default_key, "unknown dock factory");
            self.default_factory()
        })
    }

    /// Reads the factory stored under `key` and its nested settings under
    /// `key.`; a missing key gives the default factory.
    pub fn load_factory(&self, key: &str, store: &PropertyStore) -> Box<dyn DockFactory> {
        let mut factory = match store.get(key) {
            Some(name) => self.create(name),
            None => self.default_factory(),
        };
        factory.load_properties(&format!("{key}."), store, self);
        factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock_engine::kinds::Dock;
    use crate::model::dockable::{CompositeDockable, Dockable};

    fn panel(id: &str, modes: DockingModes) -> Draggable {
        Dockable::new(id, modes, Size::new(10, 10)).into()
    }

    fn kind_of(kind: Option<DockKind>) -> Option<&'static str> { kind.map(|k| k.kind_name()) }

    #[test]
    fn leaf_factory_choices() {
        let f = LeafFactory;
        assert_eq!(Some("tab"), kind_of(f.create_dock(&panel("a", DockingModes::ALL), DockingModes::CENTER)));
        assert_eq!(
            Some("single"),
            kind_of(f.create_dock(&panel("a", DockingModes::SINGLE | DockingModes::LEFT), DockingModes::LEFT))
        );
        let group: Draggable = CompositeDockable::new(vec![
            Dockable::new("a", DockingModes::GRID | DockingModes::LINE_VERTICAL, Size::new(1, 1)),
            Dockable::new("b", DockingModes::GRID | DockingModes::LINE_VERTICAL, Size::new(1, 1)),
        ])
        .into();
        assert_eq!(Some("line"), kind_of(f.create_dock(&group, DockingModes::LINE_VERTICAL)));
        assert_eq!(Some("grid"), kind_of(f.create_dock(&group, DockingModes::CENTER)));
        assert_eq!(None, kind_of(f.create_dock(&panel("a", DockingModes::FLOAT), DockingModes::CENTER)));
    }

    #[test]
    fn unknown_key_falls_back_to_default() {
        let registry = FactoryRegistry::builtin("tab");
        assert_eq!("tab", registry.create("com.example.Missing").key());
        assert_eq!("split", registry.create("split").key());
        assert_eq!("leaf", FactoryRegistry::builtin("nope").default_factory().key());
    }

    #[test]
    fn split_factory_nested_settings() {
        let registry = FactoryRegistry::default();
        let mut store = PropertyStore::default();
        let outer = SplitFactory { child: Box::new(SplitFactory { child: Box::new(TabFactory) }) };
        outer.save_properties("f.", &mut store);
        assert_eq!(Some("split"), store.get("f.childDockFactory"));
        assert_eq!(Some("tab"), store.get("f.childDockFactory.childDockFactory"));

        let mut loaded = SplitFactory::default();
        loaded.load_properties("f.", &store, &registry);
        let mut again = PropertyStore::default();
        loaded.save_properties("f.", &mut again);
        assert_eq!(store, again);
    }
}
