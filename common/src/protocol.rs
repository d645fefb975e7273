use serde::{Deserialize, Serialize};

use crate::models::{FieldSize, Position};

/// Wire value of a cell that has not been revealed.
pub const UNKNOWN: i8 = -1;
/// Wire value of a mine, only ever visible on a finished board.
pub const MINE: i8 = -2;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MineFieldSummary {
    pub id: String,
    pub name: String,
    pub field_size: FieldSize,
    pub num_of_mines: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateSessionRequest {
    pub field_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TouchRequest {
    pub position: Position,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub code: i32,
    pub text: String,
}

/// Snapshot of a session as handed to clients.
///
/// `state` holds one inner vector per row, `UNKNOWN` for hidden cells and
/// the adjacent mine count for revealed ones.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionView {
    pub session_id: String,
    pub field_id: String,
    pub field_size: FieldSize,
    pub created_at: u64,
    pub state: Vec<Vec<i8>>,
    pub status: SessionStatus,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    ServerError,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
}
