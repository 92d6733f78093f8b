//! Fetches the four zonal collections and publishes the reconciled map.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use econnect_core::zonal::{reconcile, ZonalInputs, ZonalManagerMap};

use crate::query::EmployeeFilter;
use crate::{ErpApi, ErpError};

/// All four reads run concurrently; any failure fails the whole fetch.
pub async fn fetch_zonal_inputs(erp: &dyn ErpApi) -> Result<ZonalInputs, ErpError> {
    let employee_filter = EmployeeFilter::zonal_managers();
    let (service_persons, employees, customers, territories) = tokio::try_join!(
        erp.list_service_persons(),
        erp.list_employees(&employee_filter),
        erp.list_customers(),
        erp.list_territories(),
    )?;

    Ok(ZonalInputs { service_persons, employees, customers, territories })
}

pub async fn build_zonal_map(erp: &dyn ErpApi) -> Result<ZonalManagerMap, ErpError> {
    let inputs = fetch_zonal_inputs(erp).await?;
    Ok(reconcile(&inputs))
}

/// Holder for the published customer → zonal manager snapshot.
///
/// Readers clone the `Arc`; a rebuild replaces the whole snapshot.
#[derive(Debug, Default)]
pub struct ZonalDirectory {
    snapshot: RwLock<Option<Arc<ZonalManagerMap>>>,
}

impl ZonalDirectory {
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn loaded(map: ZonalManagerMap) -> Self {
        Self { snapshot: RwLock::new(Some(Arc::new(map))) }
    }

    pub async fn current(&self) -> Option<Arc<ZonalManagerMap>> {
        self.snapshot.read().await.clone()
    }

    pub async fn publish(&self, map: ZonalManagerMap) {
        *self.snapshot.write().await = Some(Arc::new(map));
    }

    /// Rebuild from the ERP. On failure the previous snapshot stays published.
    pub async fn refresh(&self, erp: &dyn ErpApi) -> Result<usize, ErpError> {
        let map = build_zonal_map(erp).await?;
        let entries = map.len();
        self.publish(map).await;
        Ok(entries)
    }
}

pub fn spawn_refresh(
    directory: Arc<ZonalDirectory>,
    erp: Arc<dyn ErpApi>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and startup already built the map.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match directory.refresh(erp.as_ref()).await {
                Ok(entries) => {
                    info!(event_name = "zonal.refresh", entries, "zonal manager map refreshed")
                }
                Err(error) => warn!(
                    event_name = "zonal.refresh.failed",
                    error = %error,
                    "zonal manager rebuild failed; keeping previous snapshot"
                ),
            }
        }
    })
}
