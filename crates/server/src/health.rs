use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub zonal_map: HealthCheck,
    pub notifier: HealthCheck,
    pub checked_at: String,
}

/// Ready once the zonal manager map is published.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let zonal_map = match state.directory.current().await {
        Some(map) if !map.is_empty() => {
            HealthCheck { status: "ready", detail: format!("{} customers mapped", map.len()) }
        }
        Some(_) => HealthCheck { status: "degraded", detail: "zonal map is empty".to_string() },
        None => HealthCheck { status: "degraded", detail: "zonal map not loaded".to_string() },
    };
    let ready = zonal_map.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "econnect-server runtime initialized".to_string(),
        },
        zonal_map,
        notifier: HealthCheck { status: "ready", detail: state.notifier.mode().to_string() },
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use econnect_core::zonal::ZonalManagerMap;
    use econnect_erp::InMemoryErp;

    use crate::health::health;
    use crate::state::testing::harness;

    #[tokio::test]
    async fn health_returns_ready_when_zonal_map_is_loaded() {
        let map: ZonalManagerMap =
            [("Acme Pharma".to_string(), "Anuraj T".to_string())].into_iter().collect();
        let harness = harness(InMemoryErp::new(), Some(map));

        let (status, Json(payload)) = health(State(harness.state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.zonal_map.detail, "1 customers mapped");
        assert_eq!(payload.notifier.detail, "recording");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_zonal_map_is_missing() {
        let harness = harness(InMemoryErp::new(), None);

        let (status, Json(payload)) = health(State(harness.state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.zonal_map.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
