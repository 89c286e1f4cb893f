use serde::*;
use std::fmt;

/// A cell position on the grid, packed as `row << 16 | col`.
///
/// The packing puts the row in the high bits, so the derived ordering is the
/// lexicographic `(row, col)` ordering used for tie-breaking block sets.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Coord {
    packed: u32,
}

impl Coord {
    pub fn new(row: u16, col: u16) -> Self {
        Coord {
            packed: ((row as u32) << 16) | col as u32,
        }
    }

    /// Build from `usize` coordinates. Callers guarantee both fit in a `u16`;
    /// grids larger than that are rejected at load time.
    pub fn from_coords(row: usize, col: usize) -> Self {
        Coord::new(row as u16, col as u16)
    }

    #[inline]
    pub fn row(self) -> u16 {
        (self.packed >> 16) as u16
    }

    #[inline]
    pub fn col(self) -> u16 {
        (self.packed & 0xFFFF) as u16
    }

    /// Apply a (row, col) delta, returning `None` when the result would leave
    /// the `rows x cols` rectangle.
    pub fn offset(self, delta: (i8, i8), rows: usize, cols: usize) -> Option<Coord> {
        let r = self.row() as i64 + delta.0 as i64;
        let c = self.col() as i64 + delta.1 as i64;
        if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
            return None;
        }
        Some(Coord::from_coords(r as usize, c as usize))
    }

    /// Manhattan distance, the step count of an unobstructed 4-way walk.
    pub fn distance_to(self, other: Self) -> u32 {
        let dr = (self.row() as i32 - other.row() as i32).unsigned_abs();
        let dc = (self.col() as i32 - other.col() as i32).unsigned_abs();
        dr + dc
    }
}

impl From<(u16, u16)> for Coord {
    fn from((row, col): (u16, u16)) -> Self {
        Coord::new(row, col)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

impl Serialize for Coord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.row(), self.col()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        <(u16, u16)>::deserialize(deserializer).map(Coord::from)
    }
}
