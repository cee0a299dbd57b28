use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::workflows::booking::confirmation::{BookingConfirmation, DocumentError, DocumentSink};
use crate::workflows::booking::controller::BookingFlow;
use crate::workflows::booking::domain::{
    AddressBookEntry, GoodsRecord, HandlingMethod, JobType, LocationRecord, LocationType,
    PackagingConfig, PackagingKind, TradingHours, TruckBodyType, VehicleSelection,
};
use crate::workflows::booking::navigator::Step;
use crate::workflows::booking::payment::{
    MockPaymentGateway, PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest,
};
use crate::workflows::booking::repository::{
    BookingSession, RepositoryError, SessionId, SessionRepository,
};
use crate::workflows::booking::service::BookingService;
use crate::workflows::fleet::VehicleCatalog;

pub(super) fn address(id: &str) -> AddressBookEntry {
    AddressBookEntry {
        id: id.to_string(),
        name: format!("Dock {id}"),
        address: "12 Wharf Road".to_string(),
        suburb: "Port Melbourne".to_string(),
        postcode: "3207".to_string(),
        is_default: false,
    }
}

pub(super) fn location(name: &str) -> LocationRecord {
    LocationRecord {
        customer_name: name.to_string(),
        address: Some(address(name)),
        recipient_mobile: Some("0412 345 678".to_string()),
        instructions: None,
        date: Some(NaiveDate::from_ymd_opt(2026, 11, 3).expect("valid date")),
        time: Some(NaiveTime::from_hms_opt(9, 30, 0).expect("valid time")),
        flexible_timing: false,
        trading_hours: Some(TradingHours::BusinessHours),
        appointment_details: None,
    }
}

pub(super) fn packaging(quantity: u32, weight_kg: f64) -> PackagingConfig {
    PackagingConfig {
        selected: true,
        quantity,
        weight: weight_kg,
        ..PackagingConfig::default()
    }
}

pub(super) fn goods_with(entries: &[(PackagingKind, u32, f64)]) -> GoodsRecord {
    let mut goods = GoodsRecord {
        description: "Palletised hardware".to_string(),
        pickup_method: Some(HandlingMethod::Forklift),
        delivery_method: Some(HandlingMethod::Tailgate),
        ..GoodsRecord::default()
    };
    for (kind, quantity, weight) in entries {
        goods
            .packaging_types
            .insert(*kind, packaging(*quantity, *weight));
    }
    goods
}

pub(super) fn box_goods() -> GoodsRecord {
    goods_with(&[(PackagingKind::Boxes, 20, 300.0)])
}

pub(super) fn pallet_goods(pallets: u32, weight_kg: f64) -> GoodsRecord {
    goods_with(&[(PackagingKind::Pallets, pallets, weight_kg)])
}

pub(super) fn selection(key: &str, body: TruckBodyType) -> VehicleSelection {
    VehicleSelection {
        vehicle_key: key.to_string(),
        truck_body_type: body,
        is_refrigerated: false,
        crane_hiab_option: Default::default(),
    }
}

/// Walks a fresh flow up to the vehicle step, submitting `goods` on every goods screen.
pub(super) fn flow_at_vehicle(job_type: JobType, count: usize, goods: &GoodsRecord) -> BookingFlow {
    let mut flow = BookingFlow::new();
    flow.select_job_type(job_type).expect("job type accepted");
    if job_type.counted_side().is_some() {
        flow.submit_location_count(count)
            .expect("location count accepted");
    }

    loop {
        let state = flow.state();
        match state.step {
            Step::Location => {
                let name = match state.location_type {
                    LocationType::Pickup => format!("Pickup {}", state.location_index),
                    LocationType::Delivery => format!("Drop {}", state.location_index),
                };
                flow.submit_location(location(&name))
                    .expect("location accepted");
            }
            Step::Goods => {
                flow.submit_goods(goods.clone()).expect("goods accepted");
            }
            Step::Vehicle => return flow,
            other => panic!("unexpected step while filling locations: {other:?}"),
        }
    }
}

/// Walks to the payment step on the 12T rigid.
pub(super) fn flow_at_payment(job_type: JobType, count: usize, goods: &GoodsRecord) -> BookingFlow {
    let catalog = VehicleCatalog::standard();
    let mut flow = flow_at_vehicle(job_type, count, goods);
    flow.submit_vehicle(&catalog, selection("rigid_12t", TruckBodyType::Tautliner))
        .expect("vehicle accepted");
    if flow.state().step == Step::Transfer {
        flow.submit_transfer(crate::workflows::booking::domain::PalletTransfer {
            account: crate::workflows::booking::domain::PalletAccount::NoExchange,
            account_number: None,
            docket_number: None,
        })
        .expect("transfer accepted");
    }
    flow.confirm_review().expect("review confirmed");
    assert_eq!(flow.state().step, Step::Payment);
    flow
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, BookingSession>>>,
}

impl SessionRepository for MemorySessions {
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
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<BookingSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableSessions;

impl SessionRepository for UnavailableSessions {
    fn insert(&self, _session: BookingSession) -> Result<BookingSession, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _session: BookingSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<BookingSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDocuments {
    published: Arc<Mutex<Vec<BookingConfirmation>>>,
}

impl MemoryDocuments {
    pub(super) fn published(&self) -> Vec<BookingConfirmation> {
        self.published
            .lock()
            .expect("document mutex poisoned")
            .clone()
    }
}

impl DocumentSink for MemoryDocuments {
    fn publish(&self, confirmation: &BookingConfirmation) -> Result<(), DocumentError> {
        self.published
            .lock()
            .expect("document mutex poisoned")
            .push(confirmation.clone());
        Ok(())
    }
}

/// Gateway that reports an outage on every charge.
pub(super) struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn charge(&self, _request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        Err(PaymentError::Unavailable("processor timeout".to_string()))
    }
}

/// Gateway that declines every charge after `delay` and counts how often it was called.
pub(super) struct CountingGateway {
    delay: Duration,
    charges: AtomicU32,
}

impl CountingGateway {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            charges: AtomicU32::new(0),
        }
    }

    pub(super) fn charges(&self) -> u32 {
        self.charges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn charge(&self, _request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        self.charges.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(PaymentOutcome::Declined {
            reason: "insufficient funds".to_string(),
        })
    }
}

pub(super) fn build_service(
    gateway: MockPaymentGateway,
) -> (
    BookingService<MemorySessions, MemoryDocuments>,
    Arc<MemorySessions>,
    Arc<MemoryDocuments>,
) {
    let sessions = Arc::new(MemorySessions::default());
    let documents = Arc::new(MemoryDocuments::default());
    let service = BookingService::new(
        sessions.clone(),
        documents.clone(),
        Arc::new(gateway),
        Arc::new(VehicleCatalog::standard()),
    );
    (service, sessions, documents)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
