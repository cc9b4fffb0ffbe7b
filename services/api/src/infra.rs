use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use placement::config::StorageConfig;
use placement::error::AppError;
use placement::workflows::placement::{
    Clock, CsvPlacementStore, InMemoryPlacementStore, InternshipLevel, InternshipStatus,
    PlacementServices, PlacementStore, TracingNotifier,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type Services = PlacementServices<dyn PlacementStore, TracingNotifier>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CSV files when a data directory is configured, memory otherwise.
pub(crate) fn open_store(storage: &StorageConfig) -> Result<Arc<dyn PlacementStore>, AppError> {
    match &storage.data_dir {
        Some(dir) => {
            let store = CsvPlacementStore::open(dir.clone())?;
            info!(dir = %store.data_dir().display(), "using csv placement store");
            Ok(Arc::new(store))
        }
        None => {
            info!("using in-memory placement store");
            Ok(Arc::new(InMemoryPlacementStore::new()))
        }
    }
}

pub(crate) fn build_services(
    store: Arc<dyn PlacementStore>,
    clock: Arc<dyn Clock>,
) -> Result<Services, AppError> {
    Ok(PlacementServices::new(
        store,
        Arc::new(TracingNotifier),
        clock,
    )?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_status(raw: &str) -> Result<InternshipStatus, String> {
    InternshipStatus::ordered()
        .into_iter()
        .find(|status| status.label().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| format!("unknown internship status '{raw}' (pending, approved, rejected, filled)"))
}

pub(crate) fn parse_level(raw: &str) -> Result<InternshipLevel, String> {
    InternshipLevel::ordered()
        .into_iter()
        .find(|level| level.label().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| format!("unknown internship level '{raw}' (basic, intermediate, advanced)"))
}
