use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use jirai_common::{
    models::{MineField, Position},
    protocol::{SessionStatus, SessionView},
};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{Board, Cell},
    error::Error,
    logic::reveal::{is_fully_revealed, reveal},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::InProgress => 1,
            Self::Won => 2,
            Self::Lost => -1,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::InProgress => "still alive",
            Self::Won => "cleared",
            Self::Lost => "game over",
        }
    }

    pub fn is_finished(self) -> bool {
        self != Self::InProgress
    }
}

impl From<GameStatus> for SessionStatus {
    fn from(status: GameStatus) -> Self {
        Self {
            code: status.code(),
            text: status.text().to_string(),
        }
    }
}

/// What a single touch did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HitMine,
    Cleared,
    Continue,
}

impl Outcome {
    /// Terminal outcomes end the session; the caller should evict it.
    pub fn is_terminal(self) -> bool {
        self != Self::Continue
    }
}

#[derive(Debug)]
pub struct Session {
    id: String,
    field: Arc<MineField>,
    created: Instant,
    created_at: u64,
    status: GameStatus,
    board: Board,
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

impl Session {
    pub fn new(id: String, field: Arc<MineField>) -> Self {
        Self {
            id,
            board: Board::new(field.field_size()),
            field,
            created: Instant::now(),
            created_at: unix_millis(),
            status: GameStatus::InProgress,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Age is measured from creation; touching a session does not extend it.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created) > ttl
    }

    /// Reveals the cell at `pos`.
    ///
    /// Fails with [`Error::InvalidMove`] without touching the board when the
    /// game is over or the cell is not an unrevealed cell on the field. On a
    /// terminal outcome the mines are left visible on the board.
    #[instrument(level = "trace", skip(self), fields(session_id = %self.id))]
    pub fn touch(&mut self, pos: Position) -> Result<Outcome, Error> {
        if self.status.is_finished() {
            warn!("Touch on finished session {} at {}", self.id, pos);
            return Err(Error::InvalidMove {
                message: format!("session {} is already finished", self.id),
            });
        }

        if self.board.get(pos) != Some(Cell::Unknown) {
            warn!("Rejected touch at {} in session {}", pos, self.id);
            return Err(Error::InvalidMove {
                message: format!("{pos} is already touched or outside the field"),
            });
        }

        let mines = self.field.mines_layout();
        self.board.stage_mines(mines);

        if self.board.get(pos) == Some(Cell::Mine) {
            self.status = GameStatus::Lost;
            info!("Session {} hit a mine at {}", self.id, pos);
            return Ok(Outcome::HitMine);
        }

        let resolved = reveal(&mut self.board, pos);
        debug!("Revealed {} cells from {} in session {}", resolved, pos, self.id);

        if is_fully_revealed(&self.board) {
            self.status = GameStatus::Won;
            info!("Session {} cleared every safe cell", self.id);
            return Ok(Outcome::Cleared);
        }

        self.board.unstage_mines(mines);
        Ok(Outcome::Continue)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            field_id: self.field.id().to_string(),
            field_size: self.field.field_size(),
            created_at: self.created_at,
            state: self.board.rows(),
            status: self.status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use jirai_common::{models::FieldSize, protocol::MINE};

    use super::*;

    fn session(size: FieldSize, mines: &[(i64, i64)]) -> Session {
        let mines = mines.iter().map(|&(x, y)| Position(x, y)).collect();
        let field = MineField::new("test-field", "test", size, mines).unwrap();
        Session::new("s1".to_string(), Arc::new(field))
    }

    #[test]
    fn new_session_is_hidden_and_alive() {
        let session = session(FieldSize(3, 2), &[(0, 0)]);
        let view = session.view();

        assert_eq!(view.session_id, "s1");
        assert_eq!(view.field_id, "test-field");
        assert_eq!(view.state, vec![vec![-1; 3]; 2]);
        assert_eq!(view.status, SessionStatus { code: 1, text: "still alive".into() });
    }

    #[test]
    fn invalid_touches_leave_board_unchanged() {
        let mut session = session(FieldSize(4, 4), &[(2, 0), (2, 1), (2, 2), (2, 3)]);
        assert_eq!(session.touch(Position(0, 3)).unwrap(), Outcome::Continue);
        let before = session.board().clone();

        for pos in [Position(0, 3), Position(-1, 0), Position(4, 0), Position(0, 4)] {
            assert!(matches!(session.touch(pos), Err(Error::InvalidMove { .. })));
            assert_eq!(session.board(), &before);
            assert_eq!(session.status(), GameStatus::InProgress);
        }
    }

    #[test]
    fn continue_unstages_mines() {
        let mut session = session(FieldSize(3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(session.touch(Position(1, 1)).unwrap(), Outcome::Continue);
        assert_eq!(session.board().get(Position(1, 1)), Some(Cell::Count(2)));
        assert_eq!(session.board().get(Position(0, 0)), Some(Cell::Unknown));
        assert_eq!(session.board().get(Position(2, 2)), Some(Cell::Unknown));
        assert!(!session.view().state.iter().flatten().any(|&v| v == MINE));
    }

    #[test]
    fn hitting_a_mine_loses_and_shows_mines() {
        let mut session = session(FieldSize(3, 3), &[(0, 0), (2, 2)]);

        let outcome = session.touch(Position(2, 2)).unwrap();
        assert_eq!(outcome, Outcome::HitMine);
        assert!(outcome.is_terminal());
        assert_eq!(session.status(), GameStatus::Lost);

        let view = session.view();
        assert_eq!(view.status, SessionStatus { code: -1, text: "game over".into() });
        assert_eq!(view.state[0][0], MINE);
        assert_eq!(view.state[2][2], MINE);
        assert_eq!(view.state[1][1], -1);

        assert!(matches!(
            session.touch(Position(1, 1)),
            Err(Error::InvalidMove { .. })
        ));
    }

    #[test]
    fn mine_free_field_is_won_in_one_touch() {
        let mut session = session(FieldSize(4, 3), &[]);

        let outcome = session.touch(Position(2, 1)).unwrap();
        assert_eq!(outcome, Outcome::Cleared);
        assert!(outcome.is_terminal());
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.view().state, vec![vec![0; 4]; 3]);
    }

    #[test]
    fn revealing_every_safe_cell_wins() {
        let mut session = session(
            FieldSize(3, 3),
            &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)],
        );

        assert_eq!(session.touch(Position(1, 1)).unwrap(), Outcome::Cleared);
        assert_eq!(session.board().get(Position(1, 1)), Some(Cell::Count(8)));
        assert_eq!(session.view().status.text, "cleared");
    }

    #[test]
    fn several_touches_lead_to_a_win() {
        let mut session = session(FieldSize(3, 3), &[(0, 0)]);

        assert_eq!(session.touch(Position(1, 0)).unwrap(), Outcome::Continue);
        assert_eq!(session.touch(Position(0, 1)).unwrap(), Outcome::Continue);
        assert_eq!(session.touch(Position(1, 1)).unwrap(), Outcome::Continue);
        assert_eq!(session.touch(Position(2, 2)).unwrap(), Outcome::Cleared);
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_counts_from_creation() {
        let mut session = session(FieldSize(3, 3), &[(0, 0)]);
        let ttl = Duration::from_secs(60);

        tokio::time::advance(Duration::from_secs(59)).await;
        session.touch(Position(1, 0)).unwrap();
        assert!(!session.is_expired(ttl, Instant::now()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(session.is_expired(ttl, Instant::now()));
    }
}
