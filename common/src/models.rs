use std::collections::HashSet;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::protocol::MineFieldSummary;

/// A board coordinate, `[x, y]` on the wire.
///
/// Components are signed so that neighbour arithmetic can step off the board
/// and be rejected by a bounds check instead of wrapping.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[display("[{_0}, {_1}]")]
pub struct Position(pub i64, pub i64);

impl Position {
    pub fn x(self) -> i64 {
        self.0
    }

    pub fn y(self) -> i64 {
        self.1
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self(self.0 + dx, self.1 + dy)
    }
}

/// Upper bound on the number of cells in one field.
pub const MAX_CELLS: usize = 1 << 20;

/// Width and height of a field, `[width, height]` on the wire.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[display("{_0}x{_1}")]
pub struct FieldSize(pub usize, pub usize);

impl FieldSize {
    pub fn width(self) -> usize {
        self.0
    }

    pub fn height(self) -> usize {
        self.1
    }

    /// Number of cells; saturates for sizes [`FieldSize::check`] rejects.
    pub fn cells(self) -> usize {
        self.0.saturating_mul(self.1)
    }

    /// Rejects empty sizes and sizes beyond [`MAX_CELLS`].
    pub fn check(self) -> Result<(), FieldError> {
        if self.0 == 0 || self.1 == 0 {
            return Err(FieldError::EmptySize { size: self });
        }
        match self.0.checked_mul(self.1) {
            Some(cells) if cells <= MAX_CELLS => Ok(()),
            _ => Err(FieldError::TooLarge {
                size: self,
                limit: MAX_CELLS,
            }),
        }
    }

    pub fn contains(self, pos: Position) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(pos.x()), usize::try_from(pos.y())) else {
            return false;
        };
        x < self.0 && y < self.1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum FieldError {
    #[display("field size must be positive in both dimensions, got {size}")]
    EmptySize { size: FieldSize },
    #[display("field size {size} exceeds {limit} cells")]
    TooLarge { size: FieldSize, limit: usize },
    #[display("mine {position} lies outside the {size} field")]
    MineOutOfBounds { position: Position, size: FieldSize },
    #[display("mine {position} is listed more than once")]
    DuplicateMine { position: Position },
}

/// An immutable playing field: its size and where the mines are.
///
/// Built only through [`MineField::new`] (or deserialization, which goes
/// through the same checks), so every instance has in-bounds, distinct mines.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawMineField")]
pub struct MineField {
    id: String,
    name: String,
    field_size: FieldSize,
    mines_layout: Vec<Position>,
}

#[derive(Deserialize)]
struct RawMineField {
    id: String,
    name: String,
    field_size: FieldSize,
    mines_layout: Vec<Position>,
}

impl TryFrom<RawMineField> for MineField {
    type Error = FieldError;

    fn try_from(raw: RawMineField) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.name, raw.field_size, raw.mines_layout)
    }
}

impl MineField {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        field_size: FieldSize,
        mines_layout: Vec<Position>,
    ) -> Result<Self, FieldError> {
        field_size.check()?;

        let mut seen = HashSet::with_capacity(mines_layout.len());
        for &position in &mines_layout {
            if !field_size.contains(position) {
                return Err(FieldError::MineOutOfBounds {
                    position,
                    size: field_size,
                });
            }
            if !seen.insert(position) {
                return Err(FieldError::DuplicateMine { position });
            }
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            field_size,
            mines_layout,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_size(&self) -> FieldSize {
        self.field_size
    }

    pub fn mines_layout(&self) -> &[Position] {
        &self.mines_layout
    }

    pub fn num_of_mines(&self) -> usize {
        self.mines_layout.len()
    }

    /// The public face of the field, without the mine positions.
    pub fn summary(&self) -> MineFieldSummary {
        MineFieldSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            field_size: self.field_size,
            num_of_mines: self.num_of_mines(),
        }
    }
}
