use chrono::{DateTime, Utc};
use serde::Serialize;

use super::confirmation::BookingConfirmation;
use super::controller::{BookingFlow, PaymentStatus};
use super::domain::{JobType, LocationType, PackagingKind};
use super::navigator::Step;
use super::record::JobRecord;
use super::repository::{BookingSession, SessionId};
use super::validation::{load_totals, LoadTotals};
use crate::workflows::fleet::VehicleSpec;

#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub session_id: SessionId,
    pub step: Step,
    pub step_label: &'static str,
    pub location_type: LocationType,
    pub location_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type_label: Option<&'static str>,
    pub available_packaging: Vec<PackagingKind>,
    pub shows_pallet_transfer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadTotals>,
    pub payment: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<ConfirmationView>,
    pub record: JobRecord,
}

impl BookingView {
    pub fn from_session(session: &BookingSession) -> Self {
        let flow = &session.flow;
        let record = flow.record();
        let state = flow.state();

        Self {
            session_id: session.id.clone(),
            step: state.step,
            step_label: state.step.label(),
            location_type: state.location_type,
            location_index: state.location_index,
            job_type: record.job_type,
            job_type_label: record.job_type.map(JobType::label),
            available_packaging: flow.available_packaging(),
            shows_pallet_transfer: record.has_pallets(),
            load: load_totals(record.goods_entries()),
            payment: flow.payment().clone(),
            confirmation: flow.confirmation().map(ConfirmationView::from),
            record: record.clone(),
        }
    }
}

/// Identifiers shown on the confirmation screen.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationView {
    pub job_id: String,
    pub otp: String,
    pub payment_reference: String,
    pub confirmed_at: DateTime<Utc>,
}

impl From<&BookingConfirmation> for ConfirmationView {
    fn from(confirmation: &BookingConfirmation) -> Self {
        Self {
            job_id: confirmation.job_id.clone(),
            otp: confirmation.otp.clone(),
            payment_reference: confirmation.payment_reference.clone(),
            confirmed_at: confirmation.confirmed_at,
        }
    }
}

/// A catalog vehicle annotated with whether it can carry the current load.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleOption {
    pub key: String,
    pub name: String,
    pub max_weight: f64,
    pub max_pallets: u32,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VehicleOption {
    pub fn evaluate(vehicle: &VehicleSpec, flow: &BookingFlow) -> Self {
        let message = flow.vehicle_validation_message(vehicle);
        Self {
            key: vehicle.key.clone(),
            name: vehicle.name.clone(),
            max_weight: vehicle.max_weight,
            max_pallets: vehicle.max_pallets,
            valid: message.is_none(),
            message,
        }
    }
}
