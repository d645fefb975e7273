//! Operations the HTTP layer calls, each returning wire views.

use std::sync::Arc;

use jirai_common::{
    models::Position,
    protocol::{MineFieldSummary, SessionView},
};
use tracing::{info, instrument};

use crate::{catalog::FieldCatalog, error::Error, logic::SessionRegistry};

pub struct GameService {
    catalog: Arc<dyn FieldCatalog>,
    registry: Arc<SessionRegistry>,
}

impl GameService {
    pub fn new(catalog: Arc<dyn FieldCatalog>, registry: Arc<SessionRegistry>) -> Self {
        Self { catalog, registry }
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    pub fn list_fields(&self) -> Vec<MineFieldSummary> {
        self.catalog
            .list_fields()
            .iter()
            .map(|field| field.summary())
            .collect()
    }

    pub fn field(&self, id: &str) -> Result<MineFieldSummary, Error> {
        Ok(self.catalog.get_field(id)?.summary())
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn create_session(&self, field_id: &str) -> Result<SessionView, Error> {
        let field = self.catalog.get_field(field_id)?;
        let session = self.registry.create(field)?;
        let view = session.lock().await.view();
        Ok(view)
    }

    pub async fn session(&self, session_id: &str) -> Result<SessionView, Error> {
        let session = self.registry.get(session_id)?;
        let view = session.lock().await.view();
        Ok(view)
    }

    /// Touches a cell and evicts the session once the game is decided.
    ///
    /// The session's lock is held across the whole touch, so concurrent
    /// touches on one session run one after another. A session evicted while
    /// the touch waited for its lock is reported as not found.
    #[instrument(level = "trace", skip(self))]
    pub async fn touch_session(
        &self,
        session_id: &str,
        position: Position,
    ) -> Result<SessionView, Error> {
        let shared = self.registry.get(session_id)?;
        let mut session = shared.lock().await;

        // The sweeper may have evicted the session while this touch waited.
        if !self.registry.holds(session_id, &shared) {
            return Err(Error::not_found(format!("session({session_id}) not found")));
        }

        let outcome = session.touch(position)?;
        let view = session.view();
        drop(session);

        if outcome.is_terminal() {
            self.registry.remove(session_id);
            info!(
                "Session {} finished with {:?}, {} sessions live",
                session_id,
                outcome,
                self.registry.len()
            );
        }

        Ok(view)
    }

    pub fn end_session(&self, session_id: &str) -> bool {
        self.registry.remove(session_id)
    }
}
