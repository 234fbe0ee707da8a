pub mod dockable;
pub mod selection;
pub mod tree;
