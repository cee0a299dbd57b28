//! Step navigation for the booking flow.
//!
//! Both directions are a single match over `(step, job type, location type)`.
//! Whether the transfer step is shown comes from [`JobRecord::has_pallets`] in both
//! directions, so going back never lands on a screen that was skipped going forward.

use super::domain::{JobType, LocationType};
use super::record::JobRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    JobType,
    LocationCount,
    Location,
    Goods,
    Vehicle,
    Transfer,
    Review,
    Payment,
    Confirmed,
}

impl Step {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::JobType,
            Self::LocationCount,
            Self::Location,
            Self::Goods,
            Self::Vehicle,
            Self::Transfer,
            Self::Review,
            Self::Payment,
            Self::Confirmed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JobType => "job type",
            Self::LocationCount => "location count",
            Self::Location => "location",
            Self::Goods => "goods",
            Self::Vehicle => "vehicle",
            Self::Transfer => "pallet transfer",
            Self::Review => "review",
            Self::Payment => "payment",
            Self::Confirmed => "confirmed",
        }
    }

    const fn edits_location(self) -> bool {
        matches!(self, Self::Location | Self::Goods)
    }
}

/// The screen currently shown: a step plus, on location/goods screens, which entry
/// is being edited. Other steps always carry `(Pickup, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigatorState {
    pub step: Step,
    pub location_type: LocationType,
    pub location_index: usize,
}

impl NavigatorState {
    pub const fn initial() -> Self {
        Self::at(Step::JobType)
    }

    pub const fn at(step: Step) -> Self {
        Self {
            step,
            location_type: LocationType::Pickup,
            location_index: 0,
        }
    }

    pub const fn location(location_type: LocationType, location_index: usize) -> Self {
        Self {
            step: Step::Location,
            location_type,
            location_index,
        }
    }

    pub const fn goods(location_type: LocationType, location_index: usize) -> Self {
        Self {
            step: Step::Goods,
            location_type,
            location_index,
        }
    }

    pub fn is_editing_location(&self) -> bool {
        self.step.edits_location()
    }
}

impl Default for NavigatorState {
    fn default() -> Self {
        Self::initial()
    }
}

/// The facts about a booking that routing depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteContext {
    pub job_type: JobType,
    pub pickup_count: usize,
    pub delivery_count: usize,
    pub has_pallets: bool,
}

impl RouteContext {
    pub fn from_record(record: &JobRecord) -> Option<Self> {
        let job_type = record.job_type?;
        Some(Self {
            job_type,
            pickup_count: record.pickup_count,
            delivery_count: record.delivery_count,
            has_pallets: record.has_pallets(),
        })
    }

    /// Context for leaving the job type step, where only the chosen type matters.
    pub fn for_job_type(job_type: JobType) -> Self {
        let record = JobRecord::for_job_type(job_type);
        Self {
            job_type,
            pickup_count: record.pickup_count,
            delivery_count: record.delivery_count,
            has_pallets: false,
        }
    }

    fn is_last(&self, side: LocationType, index: usize) -> bool {
        let count = match side {
            LocationType::Pickup => self.pickup_count,
            LocationType::Delivery => self.delivery_count,
        };
        index + 1 >= count
    }

    fn last_index(&self, side: LocationType) -> usize {
        let count = match side {
            LocationType::Pickup => self.pickup_count,
            LocationType::Delivery => self.delivery_count,
        };
        count.saturating_sub(1)
    }

    fn after_vehicle(&self) -> NavigatorState {
        if self.has_pallets {
            NavigatorState::at(Step::Transfer)
        } else {
            NavigatorState::at(Step::Review)
        }
    }
}

/// Next screen after the current one is submitted. `None` for terminal or
/// unreachable combinations.
pub fn forward(state: NavigatorState, ctx: &RouteContext) -> Option<NavigatorState> {
    use JobType::{MultiDrop, MultiPickup, Single};
    use LocationType::{Delivery, Pickup};

    let index = state.location_index;
    let next = match (state.step, ctx.job_type, state.location_type) {
        (Step::JobType, Single, _) => NavigatorState::location(Pickup, 0),
        (Step::JobType, MultiPickup | MultiDrop, _) => NavigatorState::at(Step::LocationCount),

        (Step::LocationCount, Single, _) => return None,
        (Step::LocationCount, MultiPickup, _) => NavigatorState::location(Delivery, 0),
        (Step::LocationCount, MultiDrop, _) => NavigatorState::location(Pickup, 0),

        (Step::Location, Single | MultiDrop, Pickup) => NavigatorState::location(Delivery, 0),
        (Step::Location, MultiPickup, Pickup) => NavigatorState::goods(Pickup, index),
        (Step::Location, MultiPickup, Delivery) => NavigatorState::location(Pickup, 0),
        (Step::Location, Single | MultiDrop, Delivery) => NavigatorState::goods(Delivery, index),

        (Step::Goods, MultiPickup, Pickup) if !ctx.is_last(Pickup, index) => {
            NavigatorState::location(Pickup, index + 1)
        }
        (Step::Goods, MultiPickup, Pickup) => NavigatorState::at(Step::Vehicle),
        (Step::Goods, Single, Delivery) => NavigatorState::at(Step::Vehicle),
        (Step::Goods, MultiDrop, Delivery) if !ctx.is_last(Delivery, index) => {
            NavigatorState::location(Delivery, index + 1)
        }
        (Step::Goods, MultiDrop, Delivery) => NavigatorState::at(Step::Vehicle),
        (Step::Goods, MultiPickup, Delivery) | (Step::Goods, Single | MultiDrop, Pickup) => {
            return None
        }

        (Step::Vehicle, _, _) => ctx.after_vehicle(),
        (Step::Transfer, _, _) => NavigatorState::at(Step::Review),
        (Step::Review, _, _) => NavigatorState::at(Step::Payment),
        (Step::Payment, _, _) => NavigatorState::at(Step::Confirmed),
        (Step::Confirmed, _, _) => return None,
    };

    Some(next)
}

/// Screen reached by going back from `state`; the exact inverse of [`forward`].
pub fn backward(state: NavigatorState, ctx: &RouteContext) -> Option<NavigatorState> {
    use JobType::{MultiDrop, MultiPickup, Single};
    use LocationType::{Delivery, Pickup};

    let index = state.location_index;
    let previous = match (state.step, ctx.job_type, state.location_type) {
        (Step::JobType, _, _) | (Step::Confirmed, _, _) => return None,

        (Step::LocationCount, _, _) => NavigatorState::at(Step::JobType),

        (Step::Location, Single, Pickup) => NavigatorState::at(Step::JobType),
        (Step::Location, Single, Delivery) => NavigatorState::location(Pickup, 0),
        (Step::Location, MultiDrop, Pickup) => NavigatorState::at(Step::LocationCount),
        (Step::Location, MultiDrop, Delivery) if index == 0 => NavigatorState::location(Pickup, 0),
        (Step::Location, MultiDrop, Delivery) => NavigatorState::goods(Delivery, index - 1),
        (Step::Location, MultiPickup, Delivery) => NavigatorState::at(Step::LocationCount),
        (Step::Location, MultiPickup, Pickup) if index == 0 => NavigatorState::location(Delivery, 0),
        (Step::Location, MultiPickup, Pickup) => NavigatorState::goods(Pickup, index - 1),

        (Step::Goods, job_type, side) if side == job_type.goods_side() => {
            NavigatorState::location(side, index)
        }
        (Step::Goods, _, _) => return None,

        (Step::Vehicle, job_type, _) => {
            let side = job_type.goods_side();
            NavigatorState::goods(side, ctx.last_index(side))
        }
        (Step::Transfer, _, _) => NavigatorState::at(Step::Vehicle),
        (Step::Review, _, _) if ctx.has_pallets => NavigatorState::at(Step::Transfer),
        (Step::Review, _, _) => NavigatorState::at(Step::Vehicle),
        (Step::Payment, _, _) => NavigatorState::at(Step::Review),
    };

    Some(previous)
}
