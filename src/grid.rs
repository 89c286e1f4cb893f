//! Immutable grid model: tiles, portal pairings, the Horse origin and the
//! per-cell data arrays every other module indexes into.

use crate::constants::*;
use crate::error::GridError;
use crate::location::*;
use crate::tile::*;
use fnv::FnvHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Row-major index of a cell. Index order equals `Coord` order.
pub type CellIndex = usize;

/// A dense per-cell array for grid-sized data.
#[derive(Clone, Debug)]
pub struct CellMap<T: Copy> {
    data: Vec<T>,
}

impl<T: Copy> CellMap<T> {
    pub fn new(len: usize, initial: T) -> Self {
        CellMap {
            data: vec![initial; len],
        }
    }

    pub fn for_grid(grid: &Grid, initial: T) -> Self {
        CellMap::new(grid.len(), initial)
    }

    #[inline]
    pub fn get(&self, cell: CellIndex) -> T {
        self.data[cell]
    }

    #[inline]
    pub fn set(&mut self, cell: CellIndex, value: T) {
        self.data[cell] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, &T)> {
        self.data.iter().enumerate()
    }
}

/// Serialized shape of a grid: dimensions plus row-major tiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridDescription {
    pub rows: usize,
    pub cols: usize,
    pub tiles: Vec<TileKind>,
}

/// A loaded, validated grid. Never mutated after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "GridDescription", into = "GridDescription")]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<TileKind>,
    flags: Vec<TileFlags>,
    /// For each portal cell, the cell at the other end of its pairing.
    portal_partner: Vec<Option<CellIndex>>,
    /// Pairings sorted by label.
    portals: Vec<(PortalLabel, CellIndex, CellIndex)>,
    horse: CellIndex,
    air_count: usize,
}

impl Grid {
    /// Build a grid from row-major tiles, rejecting malformed descriptions.
    pub fn new(rows: usize, cols: usize, tiles: Vec<TileKind>) -> Result<Grid, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        if rows > MAX_GRID_SIDE || cols > MAX_GRID_SIDE {
            return Err(GridError::TooLarge { rows, cols });
        }
        if tiles.len() != rows * cols {
            return Err(GridError::TileCount {
                expected: rows * cols,
                actual: tiles.len(),
            });
        }

        let coord = |i: CellIndex| Coord::from_coords(i / cols, i % cols);

        let mut horse: Option<CellIndex> = None;
        let mut portal_cells: FnvHashMap<PortalLabel, Vec<CellIndex>> = FnvHashMap::default();
        let mut flags = Vec::with_capacity(tiles.len());
        let mut air_count = 0;

        for (i, kind) in tiles.iter().enumerate() {
            match kind {
                TileKind::Horse => {
                    if let Some(first) = horse {
                        return Err(GridError::MultipleHorses {
                            first: coord(first),
                            second: coord(i),
                        });
                    }
                    horse = Some(i);
                }
                TileKind::Portal(label) => portal_cells.entry(*label).or_default().push(i),
                TileKind::Air => air_count += 1,
                _ => {}
            }

            let mut cell_flags = kind.flags();
            let (r, c) = (i / cols, i % cols);
            let on_ring = r == 0 || c == 0 || r == rows - 1 || c == cols - 1;
            if on_ring && !kind.is_wall() {
                cell_flags |= TileFlags::BOUNDARY;
            }
            flags.push(cell_flags);
        }

        let horse = horse.ok_or(GridError::NoHorse)?;

        let mut portal_partner = vec![None; tiles.len()];
        let mut portals = Vec::with_capacity(portal_cells.len());
        for (label, cells) in portal_cells.into_iter().sorted_by_key(|(label, _)| *label) {
            match cells.as_slice() {
                &[a, b] => {
                    portal_partner[a] = Some(b);
                    portal_partner[b] = Some(a);
                    portals.push((label, a, b));
                }
                _ => {
                    return Err(GridError::PortalMultiplicity {
                        label,
                        count: cells.len(),
                    })
                }
            }
        }

        Ok(Grid {
            rows,
            cols,
            tiles,
            flags,
            portal_partner,
            portals,
            horse,
            air_count,
        })
    }

    /// Build a grid from row-major tokens (`W`, `.`, `H`, `C`, `A`, `E`, `P0`, ...).
    pub fn from_tokens<'a, I>(rows: usize, cols: usize, tokens: I) -> Result<Grid, GridError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tiles = tokens
            .into_iter()
            .map(TileKind::from_token)
            .collect::<Result<Vec<_>, _>>()?;
        Grid::new(rows, cols, tiles)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells, `rows * cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn index(&self, coord: Coord) -> CellIndex {
        debug_assert!(self.contains(coord), "{} lies outside the grid", coord);
        coord.row() as usize * self.cols + coord.col() as usize
    }

    #[inline]
    pub fn coord(&self, cell: CellIndex) -> Coord {
        Coord::from_coords(cell / self.cols, cell % self.cols)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        (coord.row() as usize) < self.rows && (coord.col() as usize) < self.cols
    }

    #[inline]
    pub fn kind(&self, cell: CellIndex) -> TileKind {
        self.tiles[cell]
    }

    pub fn kind_at(&self, coord: Coord) -> TileKind {
        self.kind(self.index(coord))
    }

    #[inline]
    pub fn flags(&self, cell: CellIndex) -> TileFlags {
        self.flags[cell]
    }

    #[inline]
    pub fn value(&self, cell: CellIndex) -> i64 {
        self.tiles[cell].value()
    }

    #[inline]
    pub fn is_wall(&self, cell: CellIndex) -> bool {
        self.flags[cell].contains(TileFlags::WALL)
    }

    #[inline]
    pub fn is_air(&self, cell: CellIndex) -> bool {
        self.flags[cell].contains(TileFlags::BLOCKABLE)
    }

    #[inline]
    pub fn is_boundary(&self, cell: CellIndex) -> bool {
        self.flags[cell].contains(TileFlags::BOUNDARY)
    }

    pub fn horse(&self) -> Coord {
        self.coord(self.horse)
    }

    #[inline]
    pub fn horse_index(&self) -> CellIndex {
        self.horse
    }

    #[inline]
    pub fn portal_partner(&self, cell: CellIndex) -> Option<CellIndex> {
        self.portal_partner[cell]
    }

    /// Portal pairings as `(label, first, second)`, sorted by label.
    pub fn portals(&self) -> impl Iterator<Item = (PortalLabel, Coord, Coord)> + '_ {
        self.portals
            .iter()
            .map(move |&(label, a, b)| (label, self.coord(a), self.coord(b)))
    }

    pub fn air_count(&self) -> usize {
        self.air_count
    }

    pub fn air_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.len()).filter(move |&i| self.is_air(i))
    }

    /// All non-wall cells on the outer ring, in row-major order.
    pub fn boundary_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.len()).filter(move |&i| self.is_boundary(i))
    }

    /// Traversal neighbours of a cell ignoring blocks: the in-bounds, non-wall
    /// orthogonal neighbours, then the portal partner if the cell is a portal.
    pub fn neighbors(&self, cell: CellIndex) -> impl Iterator<Item = CellIndex> + '_ {
        let coord = self.coord(cell);
        NEIGHBORS_4
            .iter()
            .filter_map(move |&delta| coord.offset(delta, self.rows, self.cols))
            .map(move |n| self.index(n))
            .filter(move |&n| !self.is_wall(n))
            .chain(self.portal_partner[cell])
    }

    /// Convert a block set into a dense mask, checking that every block lies
    /// on an in-bounds Air tile.
    pub fn block_mask(&self, blocks: &BlockSet) -> Result<CellMap<bool>, GridError> {
        let mut mask = CellMap::for_grid(self, false);
        for &coord in blocks.iter() {
            if !self.contains(coord) {
                return Err(GridError::OutOfBounds(coord));
            }
            let cell = self.index(coord);
            if !self.is_air(cell) {
                return Err(GridError::NotAir(coord));
            }
            mask.set(cell, true);
        }
        Ok(mask)
    }

    /// A copy of this grid in which every block has become a wall, which is
    /// how a solved grid reloads after being saved.
    pub fn with_blocks_applied(&self, blocks: &BlockSet) -> Result<Grid, GridError> {
        let mask = self.block_mask(blocks)?;
        let tiles = self
            .tiles
            .iter()
            .enumerate()
            .map(|(i, &kind)| if mask.get(i) { TileKind::Wall } else { kind })
            .collect();
        Grid::new(self.rows, self.cols, tiles)
    }

    /// Row-major canonical tokens, one `Vec` per row.
    pub fn tokens(&self) -> Vec<Vec<String>> {
        self.tiles
            .chunks(self.cols)
            .map(|row| row.iter().map(|kind| kind.token()).collect())
            .collect()
    }
}

impl TryFrom<GridDescription> for Grid {
    type Error = GridError;

    fn try_from(desc: GridDescription) -> Result<Self, Self::Error> {
        Grid::new(desc.rows, desc.cols, desc.tiles)
    }
}

impl From<Grid> for GridDescription {
    fn from(grid: Grid) -> Self {
        GridDescription {
            rows: grid.rows,
            cols: grid.cols,
            tiles: grid.tiles,
        }
    }
}

/// A set of cells chosen to hold blocks, kept sorted and duplicate-free so
/// that equality and ordering are lexicographic over coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<Coord>", into = "Vec<Coord>")]
pub struct BlockSet {
    cells: Vec<Coord>,
}

impl BlockSet {
    pub fn new() -> Self {
        BlockSet::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.binary_search(&coord).is_ok()
    }

    pub fn insert(&mut self, coord: Coord) -> bool {
        match self.cells.binary_search(&coord) {
            Ok(_) => false,
            Err(pos) => {
                self.cells.insert(pos, coord);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coord> {
        self.cells.iter()
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.cells
    }

    pub fn from_indices(grid: &Grid, cells: impl IntoIterator<Item = CellIndex>) -> Self {
        cells.into_iter().map(|i| grid.coord(i)).collect()
    }
}

impl FromIterator<Coord> for BlockSet {
    fn from_iter<T: IntoIterator<Item = Coord>>(iter: T) -> Self {
        BlockSet {
            cells: iter.into_iter().sorted().dedup().collect(),
        }
    }
}

impl From<Vec<Coord>> for BlockSet {
    fn from(cells: Vec<Coord>) -> Self {
        cells.into_iter().collect()
    }
}

impl From<BlockSet> for Vec<Coord> {
    fn from(blocks: BlockSet) -> Self {
        blocks.cells
    }
}

impl<'a> IntoIterator for &'a BlockSet {
    type Item = &'a Coord;
    type IntoIter = std::slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[derive(Deserialize)]
struct PuzzleDescription {
    grid: Grid,
    max_blocks: usize,
}

/// A grid together with its block budget K.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "PuzzleDescription")]
pub struct Puzzle {
    grid: Grid,
    max_blocks: usize,
}

impl Puzzle {
    pub fn new(grid: Grid, max_blocks: usize) -> Result<Puzzle, GridError> {
        if max_blocks > grid.air_count() {
            return Err(GridError::BudgetExceedsAir {
                budget: max_blocks,
                air: grid.air_count(),
            });
        }
        Ok(Puzzle { grid, max_blocks })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }
}

impl TryFrom<PuzzleDescription> for Puzzle {
    type Error = GridError;

    fn try_from(desc: PuzzleDescription) -> Result<Self, Self::Error> {
        Puzzle::new(desc.grid, desc.max_blocks)
    }
}
