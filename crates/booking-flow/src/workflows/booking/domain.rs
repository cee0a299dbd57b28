use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::workflows::fleet::TruckBodyType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    Single,
    MultiPickup,
    MultiDrop,
}

impl JobType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Single, Self::MultiPickup, Self::MultiDrop]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single pickup & drop",
            Self::MultiPickup => "Multiple pickups",
            Self::MultiDrop => "Multiple drops",
        }
    }

    /// The side whose locations carry goods records.
    pub const fn goods_side(self) -> LocationType {
        match self {
            Self::MultiPickup => LocationType::Pickup,
            Self::Single | Self::MultiDrop => LocationType::Delivery,
        }
    }

    /// The side whose count is chosen on the location count step, if any.
    pub const fn counted_side(self) -> Option<LocationType> {
        match self {
            Self::Single => None,
            Self::MultiPickup => Some(LocationType::Pickup),
            Self::MultiDrop => Some(LocationType::Delivery),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Pickup,
    Delivery,
}

impl LocationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingHours {
    BusinessHours,
    ExtendedHours,
    AllDay,
    OnAppointment,
}

impl TradingHours {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessHours => "Business Hours (8am - 5pm)",
            Self::ExtendedHours => "Extended Hours (6am - 10pm)",
            Self::AllDay => "24 Hours",
            Self::OnAppointment => "On Appointment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlingMethod {
    Forklift,
    HandUnload,
    Tailgate,
    PalletJack,
    Hiab,
}

impl HandlingMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forklift => "Forklift",
            Self::HandUnload => "Hand Unload",
            Self::Tailgate => "Tailgate",
            Self::PalletJack => "Pallet Jack",
            Self::Hiab => "Hiab",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingKind {
    Pallets,
    Boxes,
    Bags,
    Others,
}

impl PackagingKind {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pallets, Self::Boxes, Self::Bags, Self::Others]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pallets => "pallets",
            Self::Boxes => "boxes",
            Self::Bags => "bags",
            Self::Others => "others",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletType {
    Chep,
    Loscam,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_cm: u32,
    pub width_cm: u32,
    pub height_cm: u32,
}

/// One packaging kind inside a goods record. `weight` is the total for the kind, in kg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackagingConfig {
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub weight: f64,
    /// Only meaningful for pallets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pallet_types: Vec<PalletType>,
}

impl PackagingConfig {
    pub fn is_loaded(&self) -> bool {
        self.selected && self.quantity > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodsRecord {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pickup_method: Option<HandlingMethod>,
    #[serde(default)]
    pub delivery_method: Option<HandlingMethod>,
    #[serde(default)]
    pub packaging_types: BTreeMap<PackagingKind, PackagingConfig>,
}

impl GoodsRecord {
    pub fn packaging(&self, kind: PackagingKind) -> Option<&PackagingConfig> {
        self.packaging_types.get(&kind)
    }

    pub fn is_selected(&self, kind: PackagingKind) -> bool {
        self.packaging(kind).map_or(false, |config| config.selected)
    }

    pub fn selected_kinds(&self) -> impl Iterator<Item = PackagingKind> + '_ {
        self.packaging_types
            .iter()
            .filter(|(_, config)| config.selected)
            .map(|(kind, _)| *kind)
    }
}

/// Saved address chosen from the address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookEntry {
    pub id: String,
    pub name: String,
    pub address: String,
    pub suburb: String,
    pub postcode: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub address: Option<AddressBookEntry>,
    /// Required at pickups only.
    #[serde(default)]
    pub recipient_mobile: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub flexible_timing: bool,
    #[serde(default)]
    pub trading_hours: Option<TradingHours>,
    #[serde(default)]
    pub appointment_details: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraneHiabOption {
    #[default]
    NotRequired,
    Hiab,
}

/// Payload of the vehicle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSelection {
    pub vehicle_key: String,
    pub truck_body_type: TruckBodyType,
    #[serde(default)]
    pub is_refrigerated: bool,
    #[serde(default)]
    pub crane_hiab_option: CraneHiabOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletAccount {
    Chep,
    Loscam,
    NoExchange,
}

impl PalletAccount {
    pub const fn requires_account_number(self) -> bool {
        matches!(self, Self::Chep | Self::Loscam)
    }
}

/// Pallet exchange details collected when any goods travel on pallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletTransfer {
    pub account: PalletAccount,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub docket_number: Option<String>,
}

/// Guard failures raised before a transition is allowed. None of them mutate the flow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("the flow is on the {actual} step, not {expected}")]
    UnexpectedStep {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{0} jobs do not take a location count")]
    LocationCountNotApplicable(&'static str),
    #[error("location count must be between {min} and {max}, got {count}")]
    LocationCountOutOfRange { count: usize, min: usize, max: usize },
    #[error(
        "pallets and bags are only available for up to {limit} locations; remove them from existing goods before choosing {count}"
    )]
    PackagingLimitExceeded { count: usize, limit: usize },
    #[error("{side} location is missing: {}", .missing.join(", "))]
    IncompleteLocation {
        side: &'static str,
        missing: Vec<&'static str>,
    },
    #[error("goods are missing: {}", .missing.join(", "))]
    IncompleteGoods { missing: Vec<&'static str> },
    #[error("{} not available for {count} locations", labels(.kinds))]
    PackagingUnavailable {
        kinds: Vec<PackagingKind>,
        count: usize,
    },
    #[error("unknown vehicle '{0}'")]
    UnknownVehicle(String),
    #[error("{vehicle} cannot carry this load: {message}")]
    VehicleOverCapacity { vehicle: String, message: String },
    #[error("{vehicle} is not offered with a {body} body")]
    BodyTypeUnavailable {
        vehicle: String,
        body: &'static str,
    },
    #[error("{0} is not available refrigerated")]
    RefrigerationUnavailable(String),
    #[error("{0} cannot be fitted with a Hiab")]
    HiabUnavailable(String),
    #[error("pallet transfer is missing: {}", .missing.join(", "))]
    IncompleteTransfer { missing: Vec<&'static str> },
    #[error("a payment is already being processed")]
    PaymentInProgress,
    #[error("there is no step before {0}")]
    NoPreviousStep(&'static str),
    #[error("the booking cannot be routed from the {0} step")]
    Unroutable(&'static str),
}

impl FlowError {
    /// True for problems with the submitted data, as opposed to calls made on the wrong step.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            FlowError::UnexpectedStep { .. }
                | FlowError::PaymentInProgress
                | FlowError::NoPreviousStep(_)
                | FlowError::Unroutable(_)
                | FlowError::LocationCountNotApplicable(_)
        )
    }
}

fn labels(kinds: &[PackagingKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(" and ")
}
