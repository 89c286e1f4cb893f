//! Tile kinds, their fixed values, and the token vocabulary used by grid
//! descriptions.

use crate::constants::*;
use crate::error::GridError;
use bitflags::*;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Per-cell traversal properties, precomputed when a grid is loaded.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TileFlags: u8 {
        const NONE = 0;
        /// Impassable, never reachable, never scores.
        const WALL = 1;
        /// Air: the only kind of tile a block may be placed on.
        const BLOCKABLE = 2;
        /// One end of a portal pairing.
        const PORTAL = 4;
        /// A non-wall tile on the outer ring. Reaching one means escape.
        const BOUNDARY = 8;
    }
}

/// Collectible items. Their values are fixed by kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Cherries,
    Apples,
    Bees,
}

impl Item {
    pub fn value(self) -> i64 {
        match self {
            Item::Cherries => CHERRIES_VALUE,
            Item::Apples => APPLES_VALUE,
            Item::Bees => BEES_VALUE,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Item::Cherries => "C",
            Item::Apples => "A",
            Item::Bees => "E",
        }
    }
}

/// Two-character alphanumeric portal identifier, e.g. `P0` or `Pz`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct PortalLabel([u8; 2]);

impl PortalLabel {
    pub fn new(label: &str) -> Result<PortalLabel, GridError> {
        let bytes = label.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(GridError::InvalidPortalLabel(label.to_string()));
        }
        Ok(PortalLabel([bytes[0], bytes[1]]))
    }

    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII alphanumerics, checked on construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Debug for PortalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortalLabel({})", self.as_str())
    }
}

impl fmt::Display for PortalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PortalLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PortalLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PortalLabel::new(&s).map_err(serde::de::Error::custom)
    }
}

/// What occupies a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Air,
    Horse,
    Item(Item),
    Portal(PortalLabel),
}

impl TileKind {
    /// Map a single grid-description token to a tile.
    ///
    /// `B` is a block saved from an earlier solve and reloads as a wall.
    pub fn from_token(token: &str) -> Result<TileKind, GridError> {
        let kind = match token {
            "W" | "~" | "B" => TileKind::Wall,
            "." | "_" | "AIR" => TileKind::Air,
            "H" => TileKind::Horse,
            "C" => TileKind::Item(Item::Cherries),
            "A" => TileKind::Item(Item::Apples),
            "E" | "BEE" | "Bee" => TileKind::Item(Item::Bees),
            _ if is_portal_token(token) => TileKind::Portal(PortalLabel::new(token)?),
            _ => return Err(GridError::InvalidToken(token.to_string())),
        };
        Ok(kind)
    }

    /// Score contribution if this tile ends up reachable. Walls never are.
    pub fn value(self) -> i64 {
        match self {
            TileKind::Wall => 0,
            TileKind::Air => AIR_VALUE,
            TileKind::Horse => HORSE_VALUE,
            TileKind::Item(item) => item.value(),
            TileKind::Portal(_) => PORTAL_VALUE,
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, TileKind::Wall)
    }

    pub fn is_air(self) -> bool {
        matches!(self, TileKind::Air)
    }

    pub fn portal_label(self) -> Option<PortalLabel> {
        match self {
            TileKind::Portal(label) => Some(label),
            _ => None,
        }
    }

    /// Canonical token, the inverse of `from_token` for canonical spellings.
    pub fn token(self) -> String {
        match self {
            TileKind::Wall => "W".to_string(),
            TileKind::Air => ".".to_string(),
            TileKind::Horse => "H".to_string(),
            TileKind::Item(item) => item.token().to_string(),
            TileKind::Portal(label) => label.to_string(),
        }
    }

    /// Flags intrinsic to the kind. `BOUNDARY` depends on position and is
    /// added by the grid.
    pub fn flags(self) -> TileFlags {
        match self {
            TileKind::Wall => TileFlags::WALL,
            TileKind::Air => TileFlags::BLOCKABLE,
            TileKind::Horse | TileKind::Item(_) => TileFlags::NONE,
            TileKind::Portal(_) => TileFlags::PORTAL,
        }
    }
}

fn is_portal_token(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('P'), Some(id), None) => PORTAL_ID_CHARS.contains(id),
        _ => false,
    }
}
