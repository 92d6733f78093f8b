use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use econnect_core::config::ErpConfig;
use econnect_core::domain::{
    AddressLink, Customer, Employee, SerialNumber, ServicePerson, Territory,
};
use econnect_core::forms::{IssuePayload, WarrantyClaimPayload};

use crate::query::{
    serial_name_filter, EmployeeFilter, SerialSearch, ADDRESS_FIELDS, CUSTOMER_FIELDS,
    EMPLOYEE_FIELDS, SERIAL_DETAIL_FIELDS, SERVICE_PERSON_FIELDS, TERRITORY_FIELDS,
};
use crate::{doctype, CreatedRecord, ErpApi, ErpError, UNKNOWN_RECORD_NAME};

/// reqwest-backed client for `{base}/api/resource/{Doctype}`.
#[derive(Clone)]
pub struct HttpErpClient {
    client: Client,
    base_url: Url,
    authorization: SecretString,
    page_length: u64,
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct CreateEnvelope {
    #[serde(default)]
    data: Option<CreatedData>,
}

#[derive(Deserialize)]
struct CreatedData {
    #[serde(default)]
    name: Option<String>,
}

impl HttpErpClient {
    pub fn from_config(config: &ErpConfig) -> Result<Self, ErpError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Self::with_client(
            client,
            &config.base_url,
            &config.api_key,
            config.api_secret.expose_secret(),
            config.page_length,
        )
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        api_key: &str,
        api_secret: &str,
        page_length: u64,
    ) -> Result<Self, ErpError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ErpError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ErpError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            authorization: format!("token {api_key}:{api_secret}").into(),
            page_length,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resource_url(&self, doctype: &str) -> Result<Url, ErpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ErpError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "resource", doctype]);
        Ok(url)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        doctype: &str,
        fields: &[&str],
        filters: Option<Value>,
        limit: u64,
    ) -> Result<Vec<T>, ErpError> {
        let url = self.resource_url(doctype)?;
        let fields = serde_json::to_string(fields).map_err(|error| ErpError::Decode {
            doctype: doctype.to_string(),
            message: error.to_string(),
        })?;

        let mut params = vec![("fields", fields)];
        if let Some(filters) = filters {
            params.push(("filters", filters.to_string()));
        }
        params.push(("limit_start", "0".to_string()));
        params.push(("limit_page_length", limit.to_string()));

        debug!(event_name = "erp.list", doctype, limit, "fetching erp resource");

        let response = self
            .client
            .get(url)
            .header("Authorization", self.authorization.expose_secret())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(
                event_name = "erp.list.failed",
                doctype,
                status = status.as_u16(),
                "erp read failed"
            );
            return Err(ErpError::Status { doctype: doctype.to_string(), status: status.as_u16() });
        }

        let envelope: ListEnvelope<T> = response.json().await.map_err(|error| {
            ErpError::Decode { doctype: doctype.to_string(), message: error.to_string() }
        })?;
        Ok(envelope.data)
    }

    async fn create<P: Serialize + Sync>(
        &self,
        doctype: &str,
        payload: &P,
    ) -> Result<CreatedRecord, ErpError> {
        let url = self.resource_url(doctype)?;

        let response = self
            .client
            .post(url)
            .header("Authorization", self.authorization.expose_secret())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "erp.create.failed",
                doctype,
                status = status.as_u16(),
                "erp rejected record"
            );
            return Err(ErpError::Status { doctype: doctype.to_string(), status: status.as_u16() });
        }

        let envelope: CreateEnvelope = response.json().await.map_err(|error| {
            ErpError::Decode { doctype: doctype.to_string(), message: error.to_string() }
        })?;
        let name = envelope
            .data
            .and_then(|data| data.name)
            .unwrap_or_else(|| UNKNOWN_RECORD_NAME.to_string());

        debug!(event_name = "erp.create", doctype, name = %name, "erp record created");
        Ok(CreatedRecord { name })
    }
}

#[async_trait]
impl ErpApi for HttpErpClient {
    async fn list_service_persons(&self) -> Result<Vec<ServicePerson>, ErpError> {
        self.list(doctype::SERVICE_PERSON, SERVICE_PERSON_FIELDS, None, self.page_length).await
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ErpError> {
        self.list(doctype::EMPLOYEE, EMPLOYEE_FIELDS, Some(filter.to_filters()), self.page_length)
            .await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, ErpError> {
        self.list(doctype::CUSTOMER, CUSTOMER_FIELDS, None, self.page_length).await
    }

    async fn list_territories(&self) -> Result<Vec<Territory>, ErpError> {
        self.list(doctype::TERRITORY, TERRITORY_FIELDS, None, self.page_length).await
    }

    async fn list_serial_numbers(
        &self,
        search: &SerialSearch,
    ) -> Result<Vec<SerialNumber>, ErpError> {
        self.list(doctype::SERIAL_NO, search.fields, Some(search.to_filters()), search.limit).await
    }

    async fn list_addresses(&self) -> Result<Vec<AddressLink>, ErpError> {
        self.list(doctype::ADDRESS, ADDRESS_FIELDS, None, self.page_length).await
    }

    async fn get_serial_number(&self, name: &str) -> Result<Option<SerialNumber>, ErpError> {
        let rows: Vec<SerialNumber> = self
            .list(doctype::SERIAL_NO, SERIAL_DETAIL_FIELDS, Some(serial_name_filter(name)), 1)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedRecord, ErpError> {
        self.create(doctype::ISSUE, payload).await
    }

    async fn create_warranty_claim(
        &self,
        payload: &WarrantyClaimPayload,
    ) -> Result<CreatedRecord, ErpError> {
        self.create(doctype::WARRANTY_CLAIM, payload).await
    }
}
