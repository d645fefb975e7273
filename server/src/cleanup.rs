use std::{future::Future, sync::Arc, time::Duration};

use rocket::{
    Orbit, Rocket,
    fairing::{Fairing, Info, Kind},
};
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{logic::SessionRegistry, service::GameService};

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Sweeps expired sessions every `period` until `shutdown` resolves.
pub async fn run_sweeper<F>(registry: Arc<SessionRegistry>, period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        "Started session sweeper: checking every {}s, session ttl: {}s",
        period.as_secs(),
        registry.ttl().as_secs()
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Session sweeper stopped");
                break;
            }
            _ = interval.tick() => {
                let removed = registry.sweep_expired();
                debug!("Sweep removed {} sessions", removed);
            }
        }
    }
}

pub fn spawn_sweeper<F>(registry: Arc<SessionRegistry>, period: Duration, shutdown: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(run_sweeper(registry, period, shutdown))
}

/// Runs the sweeper for as long as the server is in orbit.
pub struct SweeperFairing {
    period: Duration,
}

impl SweeperFairing {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

#[rocket::async_trait]
impl Fairing for SweeperFairing {
    fn info(&self) -> Info {
        Info {
            name: "Session Sweeper",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        match rocket.state::<GameService>() {
            Some(service) => {
                spawn_sweeper(service.registry(), self.period, rocket.shutdown());
            }
            None => warn!("No game service managed, session sweeper not started"),
        }
    }
}

#[cfg(test)]
mod tests {
    use jirai_common::models::{FieldSize, MineField};
    use tokio::sync::oneshot;

    use super::*;

    fn field() -> Arc<MineField> {
        Arc::new(MineField::new("f", "f", FieldSize(2, 2), vec![]).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_expires_sessions_and_stops_on_shutdown() {
        let registry = Arc::new(SessionRegistry::default());
        registry.create(field()).unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = spawn_sweeper(registry.clone(), DEFAULT_SWEEP_INTERVAL, async move {
            let _ = stopped.await;
        });

        time::sleep(Duration::from_secs(45)).await;
        assert_eq!(registry.len(), 1);
        registry.create(field()).unwrap();

        time::sleep(Duration::from_secs(50)).await;
        assert_eq!(registry.len(), 1);
        assert!(!handle.is_finished());

        stop.send(()).unwrap();
        handle.await.unwrap();

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(registry.len(), 1);
    }
}
