use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::confirmation::BookingConfirmation;
use super::domain::{
    CraneHiabOption, FlowError, GoodsRecord, JobType, LocationRecord, PackagingKind,
    PalletTransfer, VehicleSelection,
};
use super::navigator::{backward, forward, NavigatorState, RouteContext, Step};
use super::payment::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest};
use super::record::{reduce, FlowEvent, JobRecord};
use super::validation;
use crate::workflows::fleet::{VehicleCatalog, VehicleSpec};

/// Progress of the payment step. `in_flight` blocks further submissions until settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub in_flight: bool,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Owns the job record and the navigator state; every change goes through one of
/// the transition methods below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingFlow {
    record: JobRecord,
    state: NavigatorState,
    payment: PaymentStatus,
    confirmation: Option<BookingConfirmation>,
}

impl BookingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn payment(&self) -> &PaymentStatus {
        &self.payment
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn select_job_type(&mut self, job_type: JobType) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::JobType)?;
        let ctx = RouteContext::for_job_type(job_type);
        self.advance(FlowEvent::JobTypeSelected(job_type), &ctx)
    }

    pub fn submit_location_count(&mut self, count: usize) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::LocationCount)?;
        if let Err(err) = validation::check_location_count(&self.record, count) {
            warn!(count, error = %err, "location count rejected");
            return Err(err);
        }
        let ctx = self.context()?;
        self.advance(FlowEvent::LocationCountSubmitted(count), &ctx)
    }

    pub fn submit_location(&mut self, location: LocationRecord) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::Location)?;
        let side = self.state.location_type;
        validation::check_location(&location, side)?;

        let ctx = self.context()?;
        let event = FlowEvent::LocationSubmitted {
            side,
            index: self.state.location_index,
            location,
        };
        self.advance(event, &ctx)
    }

    pub fn submit_goods(&mut self, goods: GoodsRecord) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::Goods)?;
        if let Err(err) = validation::check_goods(&goods, self.record.relevant_location_count()) {
            warn!(error = %err, "goods rejected");
            return Err(err);
        }

        let ctx = self.context()?;
        let event = FlowEvent::GoodsSubmitted {
            side: self.state.location_type,
            index: self.state.location_index,
            goods,
        };
        self.advance(event, &ctx)
    }

    pub fn submit_vehicle(
        &mut self,
        catalog: &VehicleCatalog,
        selection: VehicleSelection,
    ) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::Vehicle)?;
        let vehicle = catalog
            .find(&selection.vehicle_key)
            .cloned()
            .ok_or_else(|| FlowError::UnknownVehicle(selection.vehicle_key.clone()))?;

        if let Some(message) = validation::vehicle_validation_message(&vehicle, &self.record) {
            return Err(FlowError::VehicleOverCapacity {
                vehicle: vehicle.name,
                message,
            });
        }
        if !vehicle.offers_body(selection.truck_body_type) {
            return Err(FlowError::BodyTypeUnavailable {
                vehicle: vehicle.name,
                body: selection.truck_body_type.label(),
            });
        }
        if selection.is_refrigerated && !vehicle.refrigeration {
            return Err(FlowError::RefrigerationUnavailable(vehicle.name));
        }
        if selection.crane_hiab_option == CraneHiabOption::Hiab && !vehicle.hiab {
            return Err(FlowError::HiabUnavailable(vehicle.name));
        }

        let ctx = self.context()?;
        self.advance(FlowEvent::VehicleSubmitted { vehicle, selection }, &ctx)
    }

    pub fn submit_transfer(&mut self, transfer: PalletTransfer) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::Transfer)?;
        let missing = validation::transfer_missing_fields(&transfer);
        if !missing.is_empty() {
            return Err(FlowError::IncompleteTransfer { missing });
        }
        let ctx = self.context()?;
        self.advance(FlowEvent::TransferSubmitted(transfer), &ctx)
    }

    pub fn confirm_review(&mut self) -> Result<NavigatorState, FlowError> {
        self.expect_step(Step::Review)?;
        let ctx = self.context()?;
        self.move_to(forward(self.state, &ctx))
    }

    /// Marks a payment as in flight and returns the request to send to the gateway.
    pub fn begin_payment(&mut self) -> Result<PaymentRequest, FlowError> {
        self.expect_step(Step::Payment)?;
        let job_type = self
            .record
            .job_type
            .ok_or(FlowError::Unroutable(self.state.step.label()))?;

        self.payment.in_flight = true;
        self.payment.attempts += 1;
        self.payment.last_error = None;

        Ok(PaymentRequest {
            job_type,
            vehicle_key: self.record.vehicle.as_ref().map(|vehicle| vehicle.key.clone()),
            attempt: self.payment.attempts,
        })
    }

    /// Settles an in-flight payment. Declines keep the flow on the payment step with
    /// `last_error` set; approval confirms the booking and starts a fresh record.
    pub fn complete_payment(
        &mut self,
        outcome: Result<PaymentOutcome, PaymentError>,
    ) -> Result<NavigatorState, FlowError> {
        if self.state.step != Step::Payment || !self.payment.in_flight {
            return Err(FlowError::UnexpectedStep {
                expected: Step::Payment.label(),
                actual: self.state.step.label(),
            });
        }
        self.payment.in_flight = false;

        match outcome {
            Ok(PaymentOutcome::Approved { reference }) => {
                let record = std::mem::take(&mut self.record);
                let confirmation = BookingConfirmation::issue(record, reference);
                info!(
                    job_id = %confirmation.job_id,
                    attempts = self.payment.attempts,
                    "booking confirmed"
                );
                self.confirmation = Some(confirmation);
                self.state = NavigatorState::at(Step::Confirmed);
            }
            Ok(PaymentOutcome::Declined { reason }) => {
                warn!(attempt = self.payment.attempts, %reason, "payment declined");
                self.payment.last_error = Some(format!("Payment failed: {reason}"));
            }
            Err(err) => {
                warn!(attempt = self.payment.attempts, error = %err, "payment errored");
                self.payment.last_error = Some(format!("Payment failed: {err}"));
            }
        }

        Ok(self.state)
    }

    /// Runs one payment attempt end to end against `gateway`.
    pub async fn pay<G>(&mut self, gateway: &G) -> Result<NavigatorState, FlowError>
    where
        G: PaymentGateway + ?Sized,
    {
        let request = self.begin_payment()?;
        let outcome = gateway.charge(request).await;
        self.complete_payment(outcome)
    }

    pub fn go_back(&mut self) -> Result<NavigatorState, FlowError> {
        self.ensure_idle()?;
        if self.state.step == Step::JobType || self.state.step == Step::Confirmed {
            return Err(FlowError::NoPreviousStep(self.state.step.label()));
        }
        let ctx = self.context()?;
        let previous = backward(self.state, &ctx)
            .ok_or(FlowError::NoPreviousStep(self.state.step.label()))?;
        debug!(from = ?self.state, to = ?previous, "navigated back");
        self.state = previous;
        Ok(previous)
    }

    /// Discards everything and returns to the job type step.
    pub fn restart(&mut self) -> NavigatorState {
        *self = Self::default();
        info!("booking flow restarted");
        self.state
    }

    /// Packaging kinds the goods screen may offer for this booking.
    pub fn available_packaging(&self) -> Vec<PackagingKind> {
        validation::available_packaging(self.record.relevant_location_count())
    }

    pub fn is_vehicle_valid(&self, vehicle: &VehicleSpec) -> bool {
        validation::is_vehicle_valid(vehicle, &self.record)
    }

    pub fn vehicle_validation_message(&self, vehicle: &VehicleSpec) -> Option<String> {
        validation::vehicle_validation_message(vehicle, &self.record)
    }

    fn expect_step(&self, expected: Step) -> Result<(), FlowError> {
        self.ensure_idle()?;
        if self.state.step == expected {
            Ok(())
        } else {
            Err(FlowError::UnexpectedStep {
                expected: expected.label(),
                actual: self.state.step.label(),
            })
        }
    }

    fn ensure_idle(&self) -> Result<(), FlowError> {
        if self.payment.in_flight {
            Err(FlowError::PaymentInProgress)
        } else {
            Ok(())
        }
    }

    fn context(&self) -> Result<RouteContext, FlowError> {
        RouteContext::from_record(&self.record)
            .ok_or(FlowError::Unroutable(self.state.step.label()))
    }

    /// Routes with the pre-transition context, then folds the event into the record.
    fn advance(&mut self, event: FlowEvent, ctx: &RouteContext) -> Result<NavigatorState, FlowError> {
        let next =
            forward(self.state, ctx).ok_or(FlowError::Unroutable(self.state.step.label()))?;
        self.record = reduce(&self.record, event);
        self.move_to(Some(next))
    }

    fn move_to(&mut self, next: Option<NavigatorState>) -> Result<NavigatorState, FlowError> {
        let next = next.ok_or(FlowError::Unroutable(self.state.step.label()))?;
        debug!(from = ?self.state, to = ?next, "advanced");
        self.state = next;
        Ok(next)
    }
}
