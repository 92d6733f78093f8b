use std::sync::Arc;

use econnect_core::config::{AppConfig, ConfigError, LoadOptions};
use econnect_erp::{build_zonal_map, ErpApi, ErpError, HttpErpClient, ZonalDirectory};
use thiserror::Error;
use tracing::{info, warn};

use crate::notifier::{NoopNotifier, Notifier, NotifyError, SmtpNotifier};
use crate::state::{AppState, PortalSettings};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("erp client setup failed: {0}")]
    Erp(#[source] ErpError),
    #[error("smtp notifier setup failed: {0}")]
    Notifier(#[source] NotifyError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let erp: Arc<dyn ErpApi> =
        Arc::new(HttpErpClient::from_config(&config.erp).map_err(BootstrapError::Erp)?);
    let notifier = build_notifier(&config)?;
    let directory = Arc::new(ZonalDirectory::unloaded());

    load_zonal_map(&directory, erp.as_ref()).await;

    let state = AppState {
        erp,
        directory,
        notifier,
        portal: Arc::new(PortalSettings::from_config(&config)),
    };
    Ok(Application { config, state })
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, BootstrapError> {
    if !config.smtp.enabled {
        info!(
            event_name = "system.bootstrap.notifier_disabled",
            correlation_id = "bootstrap",
            "smtp disabled; confirmation emails will be skipped"
        );
        return Ok(Arc::new(NoopNotifier));
    }

    let notifier = SmtpNotifier::from_config(&config.smtp).map_err(BootstrapError::Notifier)?;
    Ok(Arc::new(notifier))
}

/// A failed build leaves the directory unloaded; the server still starts.
async fn load_zonal_map(directory: &ZonalDirectory, erp: &dyn ErpApi) {
    match build_zonal_map(erp).await {
        Ok(map) => {
            info!(
                event_name = "system.bootstrap.zonal_map_loaded",
                correlation_id = "bootstrap",
                entries = map.len(),
                "zonal manager map loaded"
            );
            directory.publish(map).await;
        }
        Err(error) => warn!(
            event_name = "system.bootstrap.zonal_map_failed",
            correlation_id = "bootstrap",
            error = %error,
            "zonal manager map not loaded; lookups will report data not loaded"
        ),
    }
}
