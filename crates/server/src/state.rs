use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use econnect_core::config::AppConfig;
use econnect_erp::{ErpApi, ZonalDirectory};

use crate::notifier::Notifier;
use crate::{api, forms, health, pages};

/// Portal wording that depends on deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalSettings {
    pub support_contact: String,
    pub brand: String,
}

#[derive(Clone)]
pub struct AppState {
    pub erp: Arc<dyn ErpApi>,
    pub directory: Arc<ZonalDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub portal: Arc<PortalSettings>,
}

impl PortalSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            support_contact: config.portal.support_contact.clone(),
            brand: config.smtp.brand.clone(),
        }
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/get_zonal_manager", get(api::get_zonal_manager))
        .route("/get_issue_table", get(api::get_issue_table))
        .route("/get_serial_details", get(api::get_serial_details))
        .route("/search_serials", get(api::search_serials))
        .route("/submit", post(forms::submit_issue))
        .route("/submit2", post(forms::submit_warranty_claim))
        .route("/health", get(health::health))
        .with_state(state)
        .merge(pages::router(&config.server.pages_dir, &config.server.static_dir))
        .layer(TraceLayer::new_for_http())
}


#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use econnect_core::config::AppConfig;
    use econnect_core::zonal::ZonalManagerMap;
    use econnect_erp::InMemoryErp;

    use super::router;
    use crate::state::testing::harness;

    fn loaded_map() -> ZonalManagerMap {
        [("Acme Pharma".to_string(), "Vivek Chauhan".to_string())].into_iter().collect()
    }

    #[tokio::test]
    async fn zonal_manager_route_reads_query_string() {
        let harness = harness(InMemoryErp::new(), Some(loaded_map()));
        let app = router(harness.state, &AppConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/get_zonal_manager?customer=Acme%20Pharma")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["zonal_manager"], "Vivek Chauhan");
    }

    #[tokio::test]
    async fn submit_route_accepts_repeated_form_keys() {
        let harness = harness(InMemoryErp::new(), None);
        let app = router(harness.state.clone(), &AppConfig::default());

        let body = "custom_contact_email=qa%40acme.example.com&issue_type=Hardware\
                    &issue_type=Software&description=Leak";
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/submit")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(LOCATION).and_then(|value| value.to_str().ok());
        assert!(location.is_some_and(|value| value.starts_with("/issue?flash=success")));

        let issues = harness.erp.created_issues().await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "Hardware, Software");
    }
}
