//! Freight booking flow: job type, locations, goods, vehicle, pallet transfer,
//! review and payment.
//!
//! [`BookingFlow`] owns the record and the navigator state. Navigation lives in
//! [`navigator`], record updates in [`record::reduce`], and the checks that gate
//! each transition in [`validation`].

pub mod confirmation;
pub mod controller;
pub mod domain;
pub mod navigator;
pub mod payment;
pub mod record;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use confirmation::{BookingConfirmation, DocumentError, DocumentSink};
pub use controller::{BookingFlow, PaymentStatus};
pub use domain::{
    AddressBookEntry, CraneHiabOption, Dimensions, FlowError, GoodsRecord, HandlingMethod,
    JobType, LocationRecord, LocationType, PackagingConfig, PackagingKind, PalletAccount,
    PalletTransfer, PalletType, TradingHours, TruckBodyType, VehicleSelection,
};
pub use navigator::{NavigatorState, RouteContext, Step};
pub use payment::{
    MockPaymentGateway, PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest,
};
pub use record::{reduce, FlowEvent, JobRecord};
pub use repository::{BookingSession, RepositoryError, SessionId, SessionRepository};
pub use router::booking_router;
pub use service::{BookingService, BookingServiceError};
pub use validation::{is_vehicle_valid, vehicle_validation_message, LoadTotals};
pub use views::{BookingView, ConfirmationView, VehicleOption};
