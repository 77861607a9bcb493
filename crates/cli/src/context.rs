//! Application context - wires the infrastructure adapters into the engine

use std::sync::Arc;
use std::time::Duration;

use calsync_core::ReconciliationService;
use calsync_domain::{Config, Result};
use calsync_infra::{
    GraphCalendarClient, GraphTokenProvider, HttpClient, LogCheckpointStore, QualerClient,
    QualerTokenProvider, SystemClock, TemplateBodyRenderer,
};
use tracing::info;

const USER_AGENT: &str = concat!("calsync/", env!("CARGO_PKG_VERSION"));

/// Everything a reconciliation run needs, built once per process.
pub struct AppContext {
    pub config: Config,
    pub service: Arc<ReconciliationService>,
}

impl AppContext {
    /// Build the adapters described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `CalSyncError::Config` for invalid settings and any error
    /// raised while constructing the HTTP clients.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let tz = config.sync.tz()?;

        let qualer_http = HttpClient::builder()
            .max_attempts(config.qualer.max_attempts)
            .throttle_wait(Duration::from_secs(config.qualer.rate_limit_wait_secs))
            .user_agent(USER_AGENT)
            .build()?;
        let graph_http = HttpClient::builder().user_agent(USER_AGENT).build()?;

        let qualer_credentials =
            Arc::new(QualerTokenProvider::new(qualer_http.clone(), &config.qualer));
        let graph_credentials =
            Arc::new(GraphTokenProvider::new(graph_http.clone(), &config.outlook));

        let source = Arc::new(QualerClient::new(qualer_http, &config.qualer, qualer_credentials));
        let target = Arc::new(GraphCalendarClient::new(
            graph_http,
            &config.outlook,
            &config.sync.time_zone,
            graph_credentials,
        ));
        let checkpoints = Arc::new(LogCheckpointStore::new(config.sync.checkpoint_path.clone()));
        let renderer = Arc::new(TemplateBodyRenderer::load(&config.sync.body_template_path));
        let clock = Arc::new(SystemClock::new(tz));

        let service =
            ReconciliationService::new(source, target, checkpoints, renderer, clock, &config.sync)?;

        info!(
            calendar_id = %config.outlook.calendar_id,
            time_zone = %config.sync.time_zone,
            dry_run = config.sync.dry_run,
            "application context ready"
        );

        Ok(Self { config, service: Arc::new(service) })
    }
}
