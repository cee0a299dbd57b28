use booking_flow::config::BookingConfig;
use booking_flow::error::AppError;
use booking_flow::workflows::booking::{
    BookingConfirmation, BookingSession, DocumentError, DocumentSink, JobType, RepositoryError,
    SessionId, SessionRepository,
};
use booking_flow::workflows::fleet::VehicleCatalog;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<VehicleCatalog>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, BookingSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: BookingSession) -> Result<BookingSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: BookingSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            guard.insert(session.id.clone(), session);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<BookingSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Keeps confirmations in memory and logs each one; stands in for the job sheet generator.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDocumentSink {
    confirmations: Arc<Mutex<Vec<BookingConfirmation>>>,
}

impl DocumentSink for InMemoryDocumentSink {
    fn publish(&self, confirmation: &BookingConfirmation) -> Result<(), DocumentError> {
        info!(
            job_id = %confirmation.job_id,
            reference = %confirmation.payment_reference,
            "job sheet queued"
        );
        let mut guard = self.confirmations.lock().expect("document mutex poisoned");
        guard.push(confirmation.clone());
        Ok(())
    }
}

impl InMemoryDocumentSink {
    pub(crate) fn confirmations(&self) -> Vec<BookingConfirmation> {
        self.confirmations
            .lock()
            .expect("document mutex poisoned")
            .clone()
    }
}

/// The configured fleet export if one is set, the standard fleet otherwise.
pub(crate) fn load_catalog(config: &BookingConfig) -> Result<VehicleCatalog, AppError> {
    load_catalog_from(config.fleet_csv.as_deref())
}

pub(crate) fn load_catalog_from(path: Option<&Path>) -> Result<VehicleCatalog, AppError> {
    match path {
        Some(path) => {
            let catalog = VehicleCatalog::from_path(path)?;
            info!(
                path = %path.display(),
                vehicles = catalog.vehicles().len(),
                "fleet imported"
            );
            Ok(catalog)
        }
        None => Ok(VehicleCatalog::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_job_type(raw: &str) -> Result<JobType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "single" => Ok(JobType::Single),
        "multi-pickup" | "multi_pickup" => Ok(JobType::MultiPickup),
        "multi-drop" | "multi_drop" => Ok(JobType::MultiDrop),
        other => Err(format!(
            "unknown job type '{other}' (expected single, multi-pickup or multi-drop)"
        )),
    }
}
