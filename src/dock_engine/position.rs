use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::graph::Side;

pub const LEFT: i32 = 0;
pub const RIGHT: i32 = 1;
pub const TOP: i32 = 2;
pub const BOTTOM: i32 = 3;
pub const CENTER: i32 = 4;

/// Where a child sits inside its parent: a slot or index for most docks,
/// `(x, y, z)` for floating windows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(Vec<i32>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionParseError {
    #[error("position must be wrapped in parentheses: {0:?}")]
    Unwrapped(String),
    #[error("position has no coordinates")]
    Empty,
    #[error("bad coordinate {0:?}")]
    BadCoordinate(String),
}

impl Position {
    pub fn new(coords: impl Into<Vec<i32>>) -> Self { Position(coords.into()) }

    pub fn index(index: usize) -> Self { Position(vec![index as i32]) }

    pub fn side(side: Side) -> Self { Position(vec![side.slot()]) }

    pub fn float(x: i32, y: i32, z: i32) -> Self { Position(vec![x, y, z]) }

    pub fn dims(&self) -> usize { self.0.len() }

    pub fn get(&self, i: usize) -> Option<i32> { self.0.get(i).copied() }

    pub fn coords(&self) -> &[i32] { &self.0 }

    /// The single coordinate of a one-dimensional position.
    pub fn as_scalar(&self) -> Option<i32> {
        match self.0.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Parses `text`, returning `default` (and logging) when it is malformed.
    pub fn parse_or(text: Option<&str>, default: Position) -> Position {
        match text.map(str::parse::<Position>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                warn!(?text, %e, "malformed position, using {default}");
                default
            }
            None => default,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| PositionParseError::Unwrapped(s.to_string()))?;
        if inner.trim().is_empty() {
            return Err(PositionParseError::Empty);
        }
        inner
            .split(',')
            .map(|c| {
                c.trim().parse::<i32>().map_err(|_| PositionParseError::BadCoordinate(c.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form() {
        assert_eq!("(4)", Position::index(4).to_string());
        assert_eq!("(10,-20,0)", Position::float(10, -20, 0).to_string());
        assert_eq!(Ok(Position::float(1, 2, 3)), "( 1, 2,3 )".parse());
    }

    #[test]
    fn strict_parsing() {
        assert_eq!(Err(PositionParseError::Empty), "()".parse::<Position>());
        assert!(matches!("1,2".parse::<Position>(), Err(PositionParseError::Unwrapped(_))));
        assert!(matches!("(1,x)".parse::<Position>(), Err(PositionParseError::BadCoordinate(_))));
    }

    #[test]
    fn parse_or_falls_back() {
        let default = Position::index(7);
        assert_eq!(default, Position::parse_or(Some("(oops"), default.clone()));
        assert_eq!(default, Position::parse_or(None, default.clone()));
        assert_eq!(Position::index(1), Position::parse_or(Some("(1)"), default));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Position::new([CENTER]), Position::side(Side::Center));
        assert_ne!(Position::new([1, 2]), Position::new([1, 2, 0]));
        assert_eq!(Some(RIGHT), Position::side(Side::Right).as_scalar());
        assert_eq!(None, Position::float(0, 0, 0).as_scalar());
    }
}
