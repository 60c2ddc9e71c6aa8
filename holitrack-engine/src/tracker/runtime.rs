use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};

use super::{TrackerSession, TrackerSnapshot};
use crate::constants::{CALENDAR_TICK_MILLIS, GEOLOCATION_RETRY_MILLIS, POSITION_TICK_MILLIS};
use crate::error::GeolocationError;
use crate::geo::GeoPoint;

/// Source of the viewer's coordinates (browser, GPS, fixed, ...).
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError>;
}

fn lock(session: &Mutex<TrackerSession>) -> MutexGuard<'_, TrackerSession> {
    session
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Spawns the tick loop and the one-shot geolocation lookup.
pub struct TrackerRuntime;

impl TrackerRuntime {
    /// Start ticking `session` on the current tokio runtime.
    #[must_use]
    pub fn spawn(
        session: TrackerSession,
        geolocation: Option<Arc<dyn GeolocationProvider>>,
    ) -> TrackerHandle {
        let session = Arc::new(Mutex::new(session));
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tick_task = tokio::spawn(tick_loop(Arc::clone(&session), snapshot_tx, shutdown_rx));
        let geo_task = geolocation.map(|provider| {
            tokio::spawn(locate_viewer(
                Arc::clone(&session),
                provider,
                snapshot_rx.clone(),
            ))
        });

        TrackerHandle {
            session,
            snapshots: snapshot_rx,
            shutdown: shutdown_tx,
            tick_task: Some(tick_task),
            geo_task,
        }
    }
}

async fn tick_loop(
    session: Arc<Mutex<TrackerSession>>,
    snapshots: watch::Sender<Option<TrackerSnapshot>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut position_tick = interval(Duration::from_millis(POSITION_TICK_MILLIS));
    position_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut calendar_tick = interval(Duration::from_millis(CALENDAR_TICK_MILLIS));
    calendar_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    log::debug!("Tracker tick loop stopping");
                    break;
                }
            }
            _ = calendar_tick.tick() => {
                lock(&session).refresh_calendar();
            }
            _ = position_tick.tick() => {
                let snapshot = lock(&session).tick();
                snapshots.send_replace(Some(snapshot));
            }
        }
    }
}

/// Wait for the holiday, then ask for the viewer's position once with a single retry.
async fn locate_viewer(
    session: Arc<Mutex<TrackerSession>>,
    provider: Arc<dyn GeolocationProvider>,
    mut snapshots: watch::Receiver<Option<TrackerSnapshot>>,
) {
    loop {
        if snapshots
            .borrow_and_update()
            .as_ref()
            .is_some_and(|snap| snap.is_holiday)
        {
            break;
        }
        if snapshots.changed().await.is_err() {
            return;
        }
    }

    log::debug!("Requesting viewer location during holiday period");
    let point = match provider.current_position().await {
        Ok(point) => point,
        Err(err) => {
            log::error!("Error getting location: {err}");
            sleep(Duration::from_millis(GEOLOCATION_RETRY_MILLIS)).await;
            log::debug!("Retrying geolocation once...");
            match provider.current_position().await {
                Ok(point) => point,
                Err(err) => {
                    log::error!("Retry failed: {err}");
                    return;
                }
            }
        }
    };

    let mut guard = lock(&session);
    guard.set_viewer_location(point.latitude, point.longitude);
    guard.refresh_calendar();
}

/// Handle to a running tracker; dropping it cancels both tasks.
pub struct TrackerHandle {
    session: Arc<Mutex<TrackerSession>>,
    snapshots: watch::Receiver<Option<TrackerSnapshot>>,
    shutdown: watch::Sender<bool>,
    tick_task: Option<JoinHandle<()>>,
    geo_task: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    /// Receiver yielding every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TrackerSnapshot>> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<TrackerSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Run `f` against the session between ticks.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut TrackerSession) -> R) -> R {
        f(&mut lock(&self.session))
    }

    /// Stop ticking and cancel any pending geolocation retry.
    pub async fn shutdown(mut self) {
        if self.shutdown.send(true).is_err() {
            log::debug!("Tracker tick loop already stopped before shutdown");
        }
        if let Some(task) = self.geo_task.take() {
            task.abort();
        }
        if let Some(task) = self.tick_task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    log::error!("Tracker tick loop failed: {err}");
                }
            }
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.geo_task.take() {
            task.abort();
        }
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }
}
