/// Score contributed by a reachable Air tile.
pub const AIR_VALUE: i64 = 1;
/// Score contributed by the Horse's own tile.
pub const HORSE_VALUE: i64 = 1;
/// Score contributed by a reachable portal tile (each end counts).
pub const PORTAL_VALUE: i64 = 1;
pub const CHERRIES_VALUE: i64 = 3;
pub const APPLES_VALUE: i64 = 10;
pub const BEES_VALUE: i64 = -5;

/// Neighbor offsets for 4-directional (cardinal) movement, as (row, col) deltas.
///
/// Ordered up, left, right, down so that a BFS discovers cells in row-major
/// order within each ring.
pub const NEIGHBORS_4: [(i8, i8); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Largest supported grid side. Coordinates pack into 16 bits per axis.
pub const MAX_GRID_SIDE: usize = u16::MAX as usize;

/// Characters allowed after the `P` of a portal token.
pub const PORTAL_ID_CHARS: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
