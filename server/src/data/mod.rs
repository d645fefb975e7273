use jirai_common::{
    models::{FieldSize, Position},
    protocol::{MINE, UNKNOWN},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Unknown,
    /// Only present while a touch is being computed, or on a finished board.
    Mine,
    Count(u8),
}

impl From<Cell> for i8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Unknown => UNKNOWN,
            Cell::Mine => MINE,
            Cell::Count(n) => n as i8,
        }
    }
}

/// Per-session grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: FieldSize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(size: FieldSize) -> Self {
        Self {
            size,
            cells: vec![Cell::Unknown; size.cells()],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.size.contains(pos) {
            Some(pos.y() as usize * self.size.width() + pos.x() as usize)
        } else {
            None
        }
    }

    /// Reads a cell. `None` means the position is off the field.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Writes a cell.
    ///
    /// # Panics
    ///
    /// If `pos` is off the field.
    pub fn set(&mut self, pos: Position, value: Cell) {
        let width = self.size.width();
        let Some(index) = self.index(pos) else {
            panic!("write to {pos} outside a {width}-wide board");
        };
        self.cells[index] = value;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn stage_mines(&mut self, mines: &[Position]) {
        for &pos in mines {
            self.set(pos, Cell::Mine);
        }
    }

    pub fn unstage_mines(&mut self, mines: &[Position]) {
        for &pos in mines {
            self.set(pos, Cell::Unknown);
        }
    }

    /// Nested wire view, one vector per row.
    pub fn rows(&self) -> Vec<Vec<i8>> {
        self.cells
            .chunks(self.size.width())
            .map(|row| row.iter().map(|&cell| cell.into()).collect())
            .collect()
    }
}
