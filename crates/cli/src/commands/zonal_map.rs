use econnect_core::config::{AppConfig, LoadOptions};
use econnect_core::zonal::ZonalManagerMap;
use econnect_erp::{build_zonal_map, ErpError, HttpErpClient};
use serde::Serialize;

const COMMAND: &str = "zonal-map";
const NOT_FOUND: &str = "Not Found";

#[derive(Debug, Serialize)]
struct CustomerLookup<'a> {
    customer: &'a str,
    zonal_manager: &'a str,
}

pub fn run(customer: Option<&str>) -> super::CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return super::CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return super::CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    match runtime.block_on(fetch_map(&config)) {
        Ok(map) => render(&map, customer),
        Err(error) => erp_failure(&error),
    }
}

async fn fetch_map(config: &AppConfig) -> Result<ZonalManagerMap, ErpError> {
    let client = HttpErpClient::from_config(&config.erp)?;
    build_zonal_map(&client).await
}

fn render(map: &ZonalManagerMap, customer: Option<&str>) -> super::CommandResult {
    let output = match customer {
        Some(customer) => {
            let lookup =
                CustomerLookup { customer, zonal_manager: map.get(customer).unwrap_or(NOT_FOUND) };
            serde_json::to_string_pretty(&lookup)
        }
        None => serde_json::to_string_pretty(map),
    };

    match output {
        Ok(output) => super::CommandResult { exit_code: 0, output },
        Err(error) => super::CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
    }
}

/// Upstream rejections exit 4; everything else that stops the read exits 3.
fn erp_failure(error: &ErpError) -> super::CommandResult {
    let exit_code = if error.upstream_status().is_some() { 4 } else { 3 };
    super::CommandResult::failure(COMMAND, "erp_unavailable", error.to_string(), exit_code)
}

#[cfg(test)]
mod tests {
    use econnect_core::zonal::ZonalManagerMap;
    use econnect_erp::ErpError;
    use serde_json::Value;

    use super::{erp_failure, render};

    fn map() -> ZonalManagerMap {
        [("Acme Pharma".to_string(), "Priya Nair".to_string())].into_iter().collect()
    }

    #[test]
    fn known_customer_prints_its_manager() {
        let result = render(&map(), Some("Acme Pharma"));
        let payload: Value = serde_json::from_str(&result.output).expect("json output");

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["zonal_manager"], "Priya Nair");
    }

    #[test]
    fn unknown_customer_prints_not_found() {
        let result = render(&map(), Some("Nobody Ltd"));
        let payload: Value = serde_json::from_str(&result.output).expect("json output");

        assert_eq!(payload["customer"], "Nobody Ltd");
        assert_eq!(payload["zonal_manager"], "Not Found");
    }

    #[test]
    fn whole_map_is_a_flat_object() {
        let result = render(&map(), None);
        let payload: Value = serde_json::from_str(&result.output).expect("json output");

        assert_eq!(payload, serde_json::json!({ "Acme Pharma": "Priya Nair" }));
    }

    #[test]
    fn upstream_rejection_uses_its_own_exit_code() {
        let rejected = ErpError::Status { doctype: "Customer".to_string(), status: 403 };
        let malformed =
            ErpError::Decode { doctype: "Customer".to_string(), message: "eof".to_string() };

        assert_eq!(erp_failure(&rejected).exit_code, 4);
        assert_eq!(erp_failure(&malformed).exit_code, 3);
    }
}
