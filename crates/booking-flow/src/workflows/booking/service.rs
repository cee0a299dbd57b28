use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, instrument, warn, Instrument};

use super::confirmation::{DocumentError, DocumentSink};
use super::controller::BookingFlow;
use super::domain::{
    FlowError, GoodsRecord, JobType, LocationRecord, PalletTransfer, VehicleSelection,
};
use super::navigator::{NavigatorState, Step};
use super::payment::{PaymentError, PaymentGateway, PaymentRequest};
use super::repository::{BookingSession, RepositoryError, SessionId, SessionRepository};
use super::views::VehicleOption;
use crate::workflows::fleet::VehicleCatalog;

/// Service composing the session store, vehicle catalog, payment gateway, and document sink.
pub struct BookingService<R, D> {
    sessions: Arc<R>,
    documents: Arc<D>,
    payments: Arc<dyn PaymentGateway>,
    catalog: Arc<VehicleCatalog>,
    locks: SessionLocks,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("booking-{id:06}"))
}

impl<R, D> BookingService<R, D>
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    pub fn new(
        sessions: Arc<R>,
        documents: Arc<D>,
        payments: Arc<dyn PaymentGateway>,
        catalog: Arc<VehicleCatalog>,
    ) -> Self {
        Self {
            sessions,
            documents,
            payments,
            catalog,
            locks: SessionLocks::default(),
        }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    /// Open a new session on the job type step.
    pub fn start(&self) -> Result<BookingSession, BookingServiceError> {
        let session = BookingSession {
            id: next_session_id(),
            started_at: Utc::now(),
            flow: BookingFlow::new(),
        };
        let stored = self.sessions.insert(session)?;
        info!(session = %stored.id, "booking session started");
        Ok(stored)
    }

    pub fn get(&self, id: &SessionId) -> Result<BookingSession, BookingServiceError> {
        let session = self.sessions.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    pub fn select_job_type(
        &self,
        id: &SessionId,
        job_type: JobType,
    ) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.select_job_type(job_type))
    }

    pub fn submit_location_count(
        &self,
        id: &SessionId,
        count: usize,
    ) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.submit_location_count(count))
    }

    pub fn submit_location(
        &self,
        id: &SessionId,
        location: LocationRecord,
    ) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.submit_location(location))
    }

    pub fn submit_goods(
        &self,
        id: &SessionId,
        goods: GoodsRecord,
    ) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.submit_goods(goods))
    }

    pub fn submit_vehicle(
        &self,
        id: &SessionId,
        selection: VehicleSelection,
    ) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, catalog| flow.submit_vehicle(catalog, selection))
    }

    pub fn submit_transfer(
        &self,
        id: &SessionId,
        transfer: PalletTransfer,
    ) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.submit_transfer(transfer))
    }

    pub fn confirm_review(&self, id: &SessionId) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.confirm_review())
    }

    pub fn go_back(&self, id: &SessionId) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| flow.go_back())
    }

    pub fn restart(&self, id: &SessionId) -> Result<BookingSession, BookingServiceError> {
        self.apply(id, |flow, _| Ok(flow.restart()))
    }

    /// Run one payment attempt. The in-flight flag is persisted before the gateway is
    /// awaited so concurrent submissions on the same session are refused meanwhile.
    /// The charge settles on its own task, so a dropped caller still clears the flag.
    #[instrument(skip(self), fields(session = %id))]
    pub async fn pay(&self, id: &SessionId) -> Result<BookingSession, BookingServiceError> {
        let (_, request) = self
            .locks
            .modify(self.sessions.as_ref(), id, |flow| flow.begin_payment())?;

        let settlement = tokio::spawn(
            settle_payment(
                self.sessions.clone(),
                self.documents.clone(),
                self.payments.clone(),
                self.locks.clone(),
                id.clone(),
                request,
            )
            .in_current_span(),
        );

        match settlement.await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "payment task stopped before settling");
                let outcome = Err(PaymentError::Unavailable("payment task stopped".to_string()));
                let (session, _) = self
                    .locks
                    .modify(self.sessions.as_ref(), id, |flow| flow.complete_payment(outcome))?;
                Ok(session)
            }
        }
    }

    /// Every catalog vehicle with its fit against the session's current load.
    pub fn vehicles(&self, id: &SessionId) -> Result<Vec<VehicleOption>, BookingServiceError> {
        let session = self.get(id)?;
        let options = self
            .catalog
            .vehicles()
            .iter()
            .map(|vehicle| VehicleOption::evaluate(vehicle, &session.flow))
            .collect();
        Ok(options)
    }

    fn apply<F>(&self, id: &SessionId, transition: F) -> Result<BookingSession, BookingServiceError>
    where
        F: FnOnce(&mut BookingFlow, &VehicleCatalog) -> Result<NavigatorState, FlowError>,
    {
        let catalog = self.catalog.as_ref();
        let (session, _) = self
            .locks
            .modify(self.sessions.as_ref(), id, |flow| transition(flow, catalog))?;
        Ok(session)
    }
}

async fn settle_payment<R, D>(
    sessions: Arc<R>,
    documents: Arc<D>,
    payments: Arc<dyn PaymentGateway>,
    locks: SessionLocks,
    id: SessionId,
    request: PaymentRequest,
) -> Result<BookingSession, BookingServiceError>
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    let outcome = payments.charge(request).await;
    let (session, state) =
        locks.modify(sessions.as_ref(), &id, |flow| flow.complete_payment(outcome))?;

    if state.step == Step::Confirmed {
        if let Some(confirmation) = session.flow.confirmation() {
            documents.publish(confirmation)?;
        }
    }

    Ok(session)
}

/// One mutex per session; each fetch-change-update of a session runs under its lock.
#[derive(Clone, Default)]
struct SessionLocks {
    by_session: Arc<Mutex<HashMap<SessionId, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    fn modify<R, T, F>(
        &self,
        sessions: &R,
        id: &SessionId,
        change: F,
    ) -> Result<(BookingSession, T), BookingServiceError>
    where
        R: SessionRepository + ?Sized,
        F: FnOnce(&mut BookingFlow) -> Result<T, FlowError>,
    {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock().map_err(|_| lock_poisoned())?;

        let mut session = sessions.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let value = change(&mut session.flow)?;
        sessions.update(session.clone())?;
        Ok((session, value))
    }

    fn lock_for(&self, id: &SessionId) -> Result<Arc<Mutex<()>>, RepositoryError> {
        let mut locks = self.by_session.lock().map_err(|_| lock_poisoned())?;
        Ok(locks.entry(id.clone()).or_default().clone())
    }
}

fn lock_poisoned() -> RepositoryError {
    RepositoryError::Unavailable("session lock poisoned".to_string())
}

/// Error raised by the booking service.
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
