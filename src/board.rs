use std::fmt;

use crate::types::{Cell, CellContent};

/// Maze queries the ghosts and the orchestrator depend on. Cells outside the
/// stored grid are open and empty so the side tunnel keeps working.
pub trait Board {
    fn passable(&self, cell: Cell) -> bool;
    fn cell_content(&self, cell: Cell) -> CellContent;
    /// Marks a cell empty. Consuming an empty cell does nothing.
    fn consume(&mut self, cell: Cell);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Wall,
    Door,
    Open(CellContent),
}

impl Tile {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'#' => Some(Self::Wall),
            b'-' => Some(Self::Door),
            b'.' => Some(Self::Open(CellContent::Dot)),
            b'o' => Some(Self::Open(CellContent::Powerup)),
            b' ' => Some(Self::Open(CellContent::Empty)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MazeError {
    Empty,
    RaggedRow { row: usize, expected: usize, found: usize },
    UnknownTile { row: usize, col: usize, tile: char },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "maze template has no rows"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "maze row {row} has {found} tiles, expected {expected}"),
            Self::UnknownTile { row, col, tile } => {
                write!(f, "unknown maze tile {tile:?} at row {row}, col {col}")
            }
        }
    }
}

impl std::error::Error for MazeError {}

pub const REFERENCE_ORIGIN: Cell = Cell::new(10, 10);

/// `#` wall, `-` pen door, `.` dot, `o` powerup, space open floor.
pub const REFERENCE_LAYOUT: [&str; 34] = [
    "#####################################",
    "#####################################",
    "##...............................####",
    "##.###.#####################.###.####",
    "##o###.#####################.###o####",
    "##.###.#####################.###.####",
    "##............#######............####",
    "##.###.### ## ####### ## ###.###.####",
    "##.###.### ## ####### ## ###.###.####",
    "##.......                 .......####",
    "##.###.### ## ####### ## ###.###.####",
    "##.###.### ## ####### ## ###.###.####",
    "##.......                 .......####",
    "##.###.### ## ###-### ## ###.###.####",
    "##.###.### ## #     # ## ###.###.####",
    "           ## #     # ##             ",
    "##.####### ## ####### ## #######.####",
    "##.####### ## ####### ## #######.####",
    "##.......                 .......####",
    "##.###.### ## ####### ## ###.###.####",
    "##.###.### ## ####### ## ###.###.####",
    "##.###.### ## ####### ## ###.###.####",
    "##.###.### ## ####### ## ###.###.####",
    "##.###.### ## ####### ## ###.###.####",
    "##..........           ..........####",
    "##o###.###.#############.###.###o####",
    "##.###.###.#############.###.###.####",
    "##............#######............####",
    "##.###.###.##.#######.##.###.###.####",
    "##.###.###.##.#######.##.###.###.####",
    "##.###.###.##.#######.##.###.###.####",
    "##...............................####",
    "#####################################",
    "#####################################",
];

#[derive(Clone, Debug)]
pub struct MazeBoard {
    origin: Cell,
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl MazeBoard {
    /// Parses an ASCII template whose top-left tile sits at `origin`.
    pub fn parse<S: AsRef<str>>(origin: Cell, rows: &[S]) -> Result<Self, MazeError> {
        let expected = rows.first().map(|row| row.as_ref().len()).ok_or(MazeError::Empty)?;
        if expected == 0 {
            return Err(MazeError::Empty);
        }
        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(MazeError::RaggedRow {
                    row: row_idx,
                    expected,
                    found: row.len(),
                });
            }
            for (col, byte) in row.bytes().enumerate() {
                let tile = Tile::from_byte(byte).ok_or(MazeError::UnknownTile {
                    row: row_idx,
                    col,
                    tile: byte as char,
                })?;
                tiles.push(tile);
            }
        }
        Ok(Self {
            origin,
            width: expected as i32,
            height: rows.len() as i32,
            tiles,
        })
    }

    /// The built-in maze matching the fixed pixel conventions.
    pub fn reference() -> Self {
        let width = REFERENCE_LAYOUT[0].len();
        let tiles = REFERENCE_LAYOUT
            .iter()
            .flat_map(|row| row.bytes().map(|byte| Tile::from_byte(byte).unwrap_or(Tile::Wall)))
            .collect();
        Self {
            origin: REFERENCE_ORIGIN,
            width: width as i32,
            height: REFERENCE_LAYOUT.len() as i32,
            tiles,
        }
    }

    pub fn origin(&self) -> Cell {
        self.origin
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn tile(&self, cell: Cell) -> Option<Tile> {
        let x = cell.x - self.origin.x;
        let y = cell.y - self.origin.y;
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize).copied()
    }

    pub fn count(&self, content: CellContent) -> usize {
        self.tiles
            .iter()
            .filter(|tile| **tile == Tile::Open(content))
            .count()
    }

    pub fn cells_with(&self, content: CellContent) -> Vec<Cell> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.origin.offset(x, y);
                if self.tile(cell) == Some(Tile::Open(content)) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

impl Board for MazeBoard {
    fn passable(&self, cell: Cell) -> bool {
        match self.tile(cell) {
            Some(Tile::Open(_)) | None => true,
            Some(Tile::Wall) | Some(Tile::Door) => false,
        }
    }

    fn cell_content(&self, cell: Cell) -> CellContent {
        match self.tile(cell) {
            Some(Tile::Open(content)) => content,
            _ => CellContent::Empty,
        }
    }

    fn consume(&mut self, cell: Cell) {
        if self.tile(cell).is_none() {
            return;
        }
        let x = cell.x - self.origin.x;
        let y = cell.y - self.origin.y;
        if let Some(tile) = self.tiles.get_mut((y * self.width + x) as usize) {
            if let Tile::Open(_) = tile {
                *tile = Tile::Open(CellContent::Empty);
            }
        }
    }
}
