use jirai_common::models::Position;
use tracing::trace;

use crate::data::{Board, Cell};

/// Moore neighbourhood of a cell. Only two dimensions are supported.
fn neighbours(pos: Position) -> impl Iterator<Item = Position> {
    (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .map(move |(dx, dy)| pos.offset(dx, dy))
}

/// Reveals `origin` and floods outward through zero-count cells.
///
/// Mines must already be staged on the board as [`Cell::Mine`], and `origin`
/// must be [`Cell::Unknown`]. Returns how many cells were resolved.
pub fn reveal(board: &mut Board, origin: Position) -> usize {
    let mut stack = vec![origin];
    let mut resolved = 0;

    while let Some(pos) = stack.pop() {
        if board.get(pos) != Some(Cell::Unknown) {
            continue;
        }

        let mut mines = 0;
        for neighbour in neighbours(pos) {
            if board.get(neighbour) == Some(Cell::Mine) {
                mines += 1;
            }
        }

        board.set(pos, Cell::Count(mines));
        resolved += 1;
        trace!("Resolved {} with {} adjacent mines", pos, mines);

        if mines == 0 {
            stack.extend(neighbours(pos).filter(|&n| board.get(n) == Some(Cell::Unknown)));
        }
    }

    resolved
}

/// True once no cell is left unknown. With mines staged, that means every
/// safe cell has been revealed.
pub fn is_fully_revealed(board: &Board) -> bool {
    board.cells().iter().all(|&cell| cell != Cell::Unknown)
}
