//! A docking layout engine: a tree of docks holding draggable panels, the
//! geometry rules deciding where a dragged panel may land, the tree surgery
//! performed on a drop, and the flat key/value persistence of the arrangement.

pub mod common;
pub mod dock_engine;
pub mod model;
pub mod sys;
