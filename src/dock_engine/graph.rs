use serde::{Deserialize, Serialize};

use super::position::{BOTTOM, CENTER, LEFT, RIGHT, TOP};
use crate::model::dockable::DockingModes;
use crate::sys::geometry::{Point, Rect, Size};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn line_mode(self) -> DockingModes {
        match self {
            Orientation::Horizontal => DockingModes::LINE_HORIZONTAL,
            Orientation::Vertical => DockingModes::LINE_VERTICAL,
        }
    }

    /// Coordinate of `p` along this axis.
    pub fn along(self, p: Point) -> i32 {
        match self {
            Orientation::Horizontal => p.x,
            Orientation::Vertical => p.y,
        }
    }

    /// Extent of `r` along this axis.
    pub fn extent(self, r: Rect) -> i32 {
        match self {
            Orientation::Horizontal => r.width,
            Orientation::Vertical => r.height,
        }
    }

    pub fn size_along(self, s: Size) -> i32 {
        match self {
            Orientation::Horizontal => s.width,
            Orientation::Vertical => s.height,
        }
    }

    /// Sizes laid end to end along this axis.
    pub fn stack(self, a: Size, b: Size) -> Size {
        match self {
            Orientation::Horizontal => Size::new(a.width + b.width, a.height.max(b.height)),
            Orientation::Vertical => Size::new(a.width.max(b.width), a.height + b.height),
        }
    }

    pub fn start(self, r: Rect) -> i32 {
        match self {
            Orientation::Horizontal => r.x,
            Orientation::Vertical => r.y,
        }
    }

    /// Cuts `r` into two along this axis, `first` pixels into it.
    pub fn split(self, r: Rect, first: i32) -> (Rect, Rect) {
        match self {
            Orientation::Horizontal => r.split_horizontally(first),
            Orientation::Vertical => r.split_vertically(first),
        }
    }

    pub fn strips(self, r: Rect, count: usize) -> Vec<Rect> {
        match self {
            Orientation::Horizontal => r.columns(count),
            Orientation::Vertical => r.rows(count),
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HeaderPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl HeaderPosition {
    /// Splits `bounds` into `(header, content)`.
    pub fn split(self, bounds: Rect, size: i32) -> (Rect, Rect) {
        match self {
            HeaderPosition::Top => bounds.split_vertically(size),
            HeaderPosition::Left => bounds.split_horizontally(size),
            HeaderPosition::Bottom => {
                let (content, header) = bounds.split_vertically(bounds.height - size);
                (header, content)
            }
            HeaderPosition::Right => {
                let (content, header) = bounds.split_horizontally(bounds.width - size);
                (header, content)
            }
        }
    }

    /// Axis along which tab headers are laid out.
    pub fn tab_axis(self) -> Orientation {
        match self {
            HeaderPosition::Top | HeaderPosition::Bottom => Orientation::Horizontal,
            HeaderPosition::Left | HeaderPosition::Right => Orientation::Vertical,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Occupants get space in proportion to their preferred size.
    #[default]
    Preferred,
    Equal,
}

/// Named slots of border and split docks.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

impl Side {
    pub const EDGES: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub fn slot(self) -> i32 {
        match self {
            Side::Left => LEFT,
            Side::Right => RIGHT,
            Side::Top => TOP,
            Side::Bottom => BOTTOM,
            Side::Center => CENTER,
        }
    }

    pub fn from_slot(slot: i32) -> Option<Side> {
        match slot {
            LEFT => Some(Side::Left),
            RIGHT => Some(Side::Right),
            TOP => Some(Side::Top),
            BOTTOM => Some(Side::Bottom),
            CENTER => Some(Side::Center),
            _ => None,
        }
    }

    pub fn mode(self) -> DockingModes {
        match self {
            Side::Left => DockingModes::LEFT,
            Side::Right => DockingModes::RIGHT,
            Side::Top => DockingModes::TOP,
            Side::Bottom => DockingModes::BOTTOM,
            Side::Center => DockingModes::CENTER,
        }
    }

    /// Axis a split along this edge divides.
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            Side::Left | Side::Right => Some(Orientation::Horizontal),
            Side::Top | Side::Bottom => Some(Orientation::Vertical),
            Side::Center => None,
        }
    }

    /// Left and top come first in split order.
    pub fn is_leading(self) -> bool { matches!(self, Side::Left | Side::Top) }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Center => Side::Center,
        }
    }

    /// The edge of `bounds` closest to `at`, with its distance normalized by
    /// the matching dimension. Ties go to the first edge in `EDGES` order.
    pub fn nearest_edge(bounds: Rect, at: Point) -> (Side, f64) {
        let w = f64::from(bounds.width.max(1));
        let h = f64::from(bounds.height.max(1));
        let distances = [
            (Side::Left, f64::from(at.x - bounds.x) / w),
            (Side::Right, f64::from(bounds.right() - at.x) / w),
            (Side::Top, f64::from(at.y - bounds.y) / h),
            (Side::Bottom, f64::from(bounds.bottom() - at.y) / h),
        ];
        distances
            .into_iter()
            .fold((Side::Left, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
    }

    /// The half of `bounds` on this side, cut `first` pixels from the
    /// leading edge of the split axis.
    pub fn part_of(self, bounds: Rect, first: i32) -> Rect {
        match self.orientation() {
            None => bounds,
            Some(o) => {
                let (a, b) = o.split(bounds, first);
                if self.is_leading() { a } else { b }
            }
        }
    }
}
