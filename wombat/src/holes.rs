use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::{ParsePositionError, Position};

/// The set of dug holes.
///
/// One bit per cell, in row-major order. Holes are never filled in again, so
/// there is no `remove()`.
///
/// On the wire this is a list of `"row,col"` keys. Their order is irrelevant
/// and duplicates collapse.
///
/// ```
/// use wombat::{Holes, Position};
/// let mut holes = Holes::new();
/// // This is an immutable data type, so `insert` returns a new `Holes`.
/// holes = holes.insert(Position::new(5, 2));
/// holes = holes.insert(Position::new(5, 2));
/// assert_eq!(holes.len(), 1);
/// assert!(holes.contains(Position::new(5, 2)));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Holes {
    bits: u64,
}

impl Holes {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    /// Off-board positions leave the set unchanged.
    #[must_use]
    pub fn insert(self, pos: Position) -> Self {
        if !pos.is_on_board() {
            return self;
        }
        Self {
            bits: self.bits | (1u64 << pos.index()),
        }
    }

    pub fn contains(self, pos: Position) -> bool {
        pos.is_on_board() && (self.bits & (1u64 << pos.index())) != 0
    }

    pub fn len(self) -> u32 {
        self.bits.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> HolesIter {
        HolesIter { bits: self.bits }
    }
}

impl std::fmt::Debug for Holes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter().map(|p| p.to_string())).finish()
    }
}

impl FromIterator<Position> for Holes {
    fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
        iter.into_iter()
            .filter(|pos| pos.is_on_board())
            .fold(Holes::new(), Holes::insert)
    }
}

impl IntoIterator for Holes {
    type Item = Position;
    type IntoIter = HolesIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Yields the holes in row-major order.
#[derive(Clone, Copy, Debug)]
pub struct HolesIter {
    bits: u64,
}

impl Iterator for HolesIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let idx = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(Position::from_index(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for HolesIter {}

impl FusedIterator for HolesIter {}

impl From<Holes> for Vec<String> {
    fn from(holes: Holes) -> Self {
        holes.iter().map(|pos| pos.to_string()).collect()
    }
}

impl TryFrom<Vec<String>> for Holes {
    type Error = HolesError;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        let mut holes = Holes::new();
        for key in keys {
            let pos: Position = key.parse().map_err(HolesError::Malformed)?;
            if !pos.is_on_board() {
                return Err(HolesError::OffBoard(pos));
            }
            holes = holes.insert(pos);
        }
        Ok(holes)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum HolesError {
    Malformed(ParsePositionError),
    OffBoard(Position),
}

impl std::error::Error for HolesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HolesError::Malformed(err) => Some(err),
            HolesError::OffBoard(_) => None,
        }
    }
}

impl std::fmt::Display for HolesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HolesError::Malformed(err) => write!(f, "Malformed hole key: {}", err),
            HolesError::OffBoard(pos) => write!(f, "Hole {} is not on the board", pos),
        }
    }
}
