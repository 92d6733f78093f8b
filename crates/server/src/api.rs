//! JSON lookups used by the portal pages.
//!
//! - `GET /get_zonal_manager?customer=`   manager for a customer
//! - `GET /get_issue_table?search=`       instrument rows for the issue form
//! - `GET /get_serial_details?serial_no=` serial, address, warranty and manager
//! - `GET /search_serials?query=`         serial-number autocomplete

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use econnect_core::domain::{AddressLink, IssueTableRow};
use econnect_core::errors::{ApplicationError, InterfaceError};
use econnect_core::warranty::WarrantyStatus;
use econnect_erp::SerialSearch;

use crate::state::AppState;

pub const ZONAL_MANAGER_NOT_FOUND: &str = "Not Found";

#[derive(Debug, Default, Deserialize)]
pub struct ZonalManagerQuery {
    pub customer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueTableQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SerialDetailsQuery {
    pub serial_no: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchSerialsQuery {
    pub query: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ZonalManagerResponse {
    pub zonal_manager: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SerialDetailsResponse {
    pub customer: String,
    pub customer_address: String,
    pub warranty_expiry_date: Option<String>,
    pub item_name: Option<String>,
    pub maintenance_status: WarrantyStatus,
    pub zonal_manager: String,
    pub amc_type: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body =
        ApiError { error: error.message().to_string(), upstream_status: error.upstream_status() };
    (status, Json(body))
}

fn bad_request(message: &str) -> (StatusCode, Json<ApiError>) {
    api_error(InterfaceError::BadRequest { message: message.to_string() })
}

fn not_found(message: &str) -> (StatusCode, Json<ApiError>) {
    api_error(InterfaceError::NotFound { message: message.to_string() })
}

pub async fn get_zonal_manager(
    State(state): State<AppState>,
    Query(query): Query<ZonalManagerQuery>,
) -> ApiResult<ZonalManagerResponse> {
    let customer = query.customer.unwrap_or_default();
    let map = state.directory.current().await.filter(|map| !map.is_empty());

    let Some(map) = map.filter(|_| !customer.is_empty()) else {
        return Err(bad_request("Customer not provided or data not loaded"));
    };

    let zonal_manager = map.get(&customer).unwrap_or(ZONAL_MANAGER_NOT_FOUND).to_string();
    Ok(Json(ZonalManagerResponse { zonal_manager }))
}

pub async fn get_issue_table(
    State(state): State<AppState>,
    Query(query): Query<IssueTableQuery>,
) -> ApiResult<Vec<IssueTableRow>> {
    let search = SerialSearch::issue_table(query.search.as_deref().unwrap_or_default());

    let rows = state.erp.list_serial_numbers(&search).await.map_err(|error| {
        warn!(event_name = "api.issue_table.failed", error = %error, "serial listing failed");
        api_error(InterfaceError::from(ApplicationError::from(error)))
    })?;

    Ok(Json(rows.into_iter().filter_map(|row| row.into_issue_row()).collect()))
}

pub async fn get_serial_details(
    State(state): State<AppState>,
    Query(query): Query<SerialDetailsQuery>,
) -> ApiResult<SerialDetailsResponse> {
    let serial_no = query.serial_no.unwrap_or_default();
    if serial_no.is_empty() {
        return Err(bad_request("Serial number is required"));
    }

    let lookup = async {
        let serial = state.erp.get_serial_number(&serial_no).await?;
        let addresses = state.erp.list_addresses().await?;
        Ok::<_, econnect_erp::ErpError>((serial, addresses))
    };
    let (serial, addresses) = lookup.await.map_err(|error| {
        warn!(
            event_name = "api.serial_details.failed",
            serial_no = %serial_no,
            error = %error,
            "serial detail lookup failed"
        );
        not_found("Serial number not found")
    })?;

    let Some(serial) = serial else {
        return Err(not_found("Serial number not found"));
    };
    let Some(customer) = serial.customer.clone() else {
        return Err(not_found("Serial number not found"));
    };
    let Some(customer_address) = first_address_by_customer(addresses).remove(&customer) else {
        return Err(not_found("Serial number not found"));
    };

    let zonal_manager = state
        .directory
        .current()
        .await
        .and_then(|map| map.get(&customer).map(str::to_string))
        .unwrap_or_default();
    let maintenance_status = WarrantyStatus::from_expiry(
        serial.warranty_expiry_date.as_deref(),
        Local::now().date_naive(),
    );

    info!(
        event_name = "api.serial_details",
        serial_no = %serial_no,
        maintenance_status = %maintenance_status,
        "serial details resolved"
    );

    Ok(Json(SerialDetailsResponse {
        customer,
        customer_address,
        warranty_expiry_date: serial.warranty_expiry_date,
        item_name: serial.item_name,
        maintenance_status,
        zonal_manager,
        amc_type: serial.amc_type,
    }))
}

pub async fn search_serials(
    State(state): State<AppState>,
    Query(query): Query<SearchSerialsQuery>,
) -> Json<Vec<String>> {
    let term = query.query.unwrap_or_default();
    if term.is_empty() {
        return Json(Vec::new());
    }

    match state.erp.list_serial_numbers(&SerialSearch::picker(&term)).await {
        Ok(rows) => Json(rows.into_iter().map(|row| row.name).collect()),
        Err(error) => {
            warn!(event_name = "api.search_serials.failed", error = %error, "serial search failed");
            Json(Vec::new())
        }
    }
}

/// Customer → address, keeping the first address listed for each customer.
fn first_address_by_customer(links: Vec<AddressLink>) -> HashMap<String, String> {
    let mut by_customer = HashMap::new();
    for link in links {
        if let Some(customer) = link.customer {
            by_customer.entry(customer).or_insert(link.address);
        }
    }
    by_customer
}
