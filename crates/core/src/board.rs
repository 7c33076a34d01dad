//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell is empty, an atom, or garbage.
//! Uses a flat vector in row-major order for cache locality.
//! Coordinates: (x, y) where x ranges 0..width (left to right), y ranges 0..height (top to bottom)

use arrayvec::ArrayVec;

use crate::types::{Cell, Coord};

/// 4-directional neighbor offsets, in a fixed order (up, right, down, left)
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// The game board using flat vector storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Build a board from text rows (`.` empty, `C`, `O`, `#` garbage).
    ///
    /// Returns None if rows are ragged, empty, or contain unknown glyphs.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.as_ref().chars().count();
        if width == 0 {
            return None;
        }

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            let row = row.as_ref();
            if row.chars().count() != width {
                return None;
            }
            for c in row.chars() {
                cells.push(Cell::from_glyph(c)?);
            }
        }

        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Render rows as text, inverse of [`Board::from_rows`]
    pub fn to_rows(&self) -> Vec<String> {
        self.rows()
            .map(|row| row.iter().map(Cell::glyph).collect())
            .collect()
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some((y as usize) * self.width + (x as usize))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    pub fn cell_at(&self, coord: Coord) -> Option<Cell> {
        self.get(coord.x, coord.y)
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Cell::Empty))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(c) if !c.is_empty())
    }

    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32
    }

    /// In-bounds 4-directional neighbors of `coord`
    pub fn neighbors(&self, coord: Coord) -> ArrayVec<Coord, 4> {
        let mut out = ArrayVec::new();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let (x, y) = (coord.x + dx, coord.y + dy);
            if !self.is_out_of_bounds(x, y) {
                out.push(Coord::new(x, y));
            }
        }
        out
    }

    /// Iterate over rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        if y >= self.height {
            return true;
        }
        let start = y * self.width;
        self.cells[start..start + self.width]
            .iter()
            .all(Cell::is_empty)
    }

    /// Set every listed coordinate to empty (out-of-bounds coords are skipped)
    pub fn clear_cells(&mut self, coords: &[Coord]) {
        for c in coords {
            self.set(c.x, c.y, Cell::Empty);
        }
    }

    /// Compact every column downward, preserving the vertical order of its cells.
    ///
    /// Cells never move across columns. Returns the number of cells that moved.
    pub fn apply_gravity(&mut self) -> usize {
        let mut moved = 0;
        for x in 0..self.width {
            // Two-pointer scan from the bottom: `write_y` is the next slot to fill.
            let mut write_y = self.height;
            for read_y in (0..self.height).rev() {
                let cell = self.cells[read_y * self.width + x];
                if cell.is_empty() {
                    continue;
                }
                write_y -= 1;
                if write_y != read_y {
                    self.cells[write_y * self.width + x] = cell;
                    self.cells[read_y * self.width + x] = Cell::Empty;
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Shift all rows up by `count` and fill the bottom `count` rows with garbage.
    ///
    /// `gaps[i]` is the open column of the i-th new row (top to bottom).
    /// The top `count` rows are discarded; callers check they are empty first.
    pub fn push_garbage_rows(&mut self, gaps: &[usize]) {
        let count = gaps.len().min(self.height);
        if count == 0 {
            return;
        }

        let width = self.width;
        self.cells.copy_within(count * width.., 0);

        let first_new = self.height - count;
        for (i, &gap) in gaps.iter().take(count).enumerate() {
            let start = (first_new + i) * width;
            for (x, cell) in self.cells[start..start + width].iter_mut().enumerate() {
                *cell = if x == gap { Cell::Empty } else { Cell::Garbage };
            }
        }
    }

    /// Get a reference to the internal cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Coordinates of every cell equal to `cell`, row-major
    pub fn coords_of(&self, cell: Cell) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == cell)
            .map(|(i, _)| Coord::new((i % self.width) as i32, (i / self.width) as i32))
    }

}

impl Default for Board {
    fn default() -> Self {
        Self::new(crate::types::BOARD_WIDTH, crate::types::BOARD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(10, 12);
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(9, 0), Some(9));
        assert_eq!(board.index(0, 1), Some(10));
        assert_eq!(board.index(9, 11), Some(119));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(10, 0), None);
        assert_eq!(board.index(0, 12), None);
    }

    #[test]
    fn test_board_from_rows_roundtrip() {
        let rows = ["..C", "O.#", "CCO"];
        let board = Board::from_rows(&rows).unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 3);
        assert_eq!(board.get(2, 0), Some(Cell::Carbon));
        assert_eq!(board.get(2, 1), Some(Cell::Garbage));
        assert_eq!(board.to_rows(), rows);
    }

    #[test]
    fn test_board_from_rows_rejects_bad_input() {
        assert!(Board::from_rows(&["..", "..."]).is_none());
        assert!(Board::from_rows(&["..x"]).is_none());
        assert!(Board::from_rows::<&str>(&[]).is_none());
    }

    #[test]
    fn test_neighbors_clipped_at_corner() {
        let board = Board::new(4, 4);
        let n = board.neighbors(Coord::new(0, 0));
        assert_eq!(n.as_slice(), &[Coord::new(1, 0), Coord::new(0, 1)]);
        assert_eq!(board.neighbors(Coord::new(1, 1)).len(), 4);
    }

    #[test]
    fn test_gravity_compacts_columns_stably() {
        let mut board = Board::from_rows(&["C.", "..", "O#", ".."]).unwrap();
        let moved = board.apply_gravity();
        assert_eq!(board.to_rows(), vec!["..", "..", "C.", "O#"]);
        assert_eq!(moved, 3);
    }

    #[test]
    fn test_push_garbage_rows() {
        let mut board = Board::from_rows(&["...", "...", "C..", "CO."]).unwrap();
        board.push_garbage_rows(&[1, 2]);
        assert_eq!(board.to_rows(), vec!["C..", "CO.", "#.#", "##."]);
    }

    #[test]
    fn test_row_empty_checks() {
        let board = Board::from_rows(&["...", ".C."]).unwrap();
        assert!(board.is_row_empty(0));
        assert!(!board.is_row_empty(1));
        assert!(board.is_row_empty(7));
    }
}
