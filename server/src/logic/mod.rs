//! The session engine: flood-fill reveals, single-game state and the
//! registry of live games.

pub mod registry;
pub mod reveal;
pub mod session;

pub use registry::{SessionRegistry, SharedSession};
pub use session::{GameStatus, Outcome, Session};
