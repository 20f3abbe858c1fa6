//! In-memory registry of dashboard sessions
//!
//! Sessions live from start until they are ended or sit idle longer than
//! `dashboard.session_idle_secs`. Idle sessions are evicted lazily on
//! access and by a periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shared::CropType;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::{DashboardConfig, LocationConfig};
use crate::error::{AppError, AppResult};
use crate::external::{Providers, ReportedGeolocation};

use super::location::LocationResolver;
use super::orchestrator::Orchestrator;

struct Session {
    orchestrator: Orchestrator,
    last_access: Instant,
}

/// Owns every live session
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    providers: Providers,
    location: LocationConfig,
    dashboard: DashboardConfig,
}

impl SessionRegistry {
    pub fn new(providers: Providers, location: LocationConfig, dashboard: DashboardConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            providers,
            location,
            dashboard,
        }
    }

    /// Create a session, resolve its location and start the first fetch
    pub async fn start(
        &self,
        geolocation: Option<ReportedGeolocation>,
        crop_type: Option<CropType>,
    ) -> Orchestrator {
        let session_id = Uuid::new_v4();
        let orchestrator = Orchestrator::with_providers(
            session_id,
            &self.providers,
            crop_type.unwrap_or(self.dashboard.crop_type),
            self.dashboard.parameters(),
        );

        {
            let mut sessions = self.sessions.write().await;
            self.evict_expired(&mut sessions);
            sessions.insert(
                session_id,
                Session {
                    orchestrator: orchestrator.clone(),
                    last_access: Instant::now(),
                },
            );
        }
        tracing::info!(%session_id, "Dashboard session started");

        let resolver =
            LocationResolver::from_config(Arc::new(geolocation.unwrap_or_default()), &self.location);
        orchestrator.start(&resolver).await;

        orchestrator
    }

    /// Look up a session and mark it as recently used
    pub async fn get(&self, session_id: Uuid) -> AppResult<Orchestrator> {
        let mut sessions = self.sessions.write().await;
        let idle_limit = self.dashboard.session_idle();

        match sessions.get_mut(&session_id) {
            Some(session) if session.last_access.elapsed() <= idle_limit => {
                session.last_access = Instant::now();
                return Ok(session.orchestrator.clone());
            }
            Some(_) => {}
            None => return Err(AppError::SessionNotFound(session_id)),
        }

        if let Some(session) = sessions.remove(&session_id) {
            tracing::info!(%session_id, "Evicting idle dashboard session");
            session.orchestrator.close();
        }
        Err(AppError::SessionNotFound(session_id))
    }

    /// Remove a session and discard anything still in flight for it
    pub async fn end(&self, session_id: Uuid) -> AppResult<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&session_id)
            .ok_or(AppError::SessionNotFound(session_id))?;
        session.orchestrator.close();
        Ok(())
    }

    /// Close and drop every session idle past the limit, returning how many went
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions)
    }

    /// Sweep idle sessions in the background for the life of the process
    pub fn spawn_eviction(&self) -> JoinHandle<()> {
        let registry = self.clone();
        let period = (self.dashboard.session_idle() / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = registry.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Swept idle dashboard sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, Session>) -> usize {
        let idle_limit = self.dashboard.session_idle();
        let before = sessions.len();
        sessions.retain(|session_id, session| {
            if session.last_access.elapsed() <= idle_limit {
                return true;
            }
            tracing::info!(%session_id, "Evicting idle dashboard session");
            session.orchestrator.close();
            false
        });
        before - sessions.len()
    }
}
