use super::domain::{
    CraneHiabOption, GoodsRecord, JobType, LocationRecord, LocationType, PackagingKind,
    PalletTransfer, TruckBodyType, VehicleSelection,
};
use crate::workflows::fleet::VehicleSpec;
use serde::{Deserialize, Serialize};

/// Everything collected so far for one booking.
///
/// Location and goods vectors are sized to their counts and hold `None` until the
/// matching screen has been submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_type: Option<JobType>,
    pub pickup_count: usize,
    pub delivery_count: usize,
    pub pickups: Vec<Option<LocationRecord>>,
    pub deliveries: Vec<Option<LocationRecord>>,
    pub pickup_goods: Vec<Option<GoodsRecord>>,
    pub delivery_goods: Vec<Option<GoodsRecord>>,
    pub vehicle: Option<VehicleSpec>,
    pub truck_body_type: Option<TruckBodyType>,
    pub is_refrigerated: bool,
    pub crane_hiab_option: CraneHiabOption,
    pub pallet_transfer: Option<PalletTransfer>,
}

/// Data-carrying transitions accepted by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    JobTypeSelected(JobType),
    LocationCountSubmitted(usize),
    LocationSubmitted {
        side: LocationType,
        index: usize,
        location: LocationRecord,
    },
    GoodsSubmitted {
        side: LocationType,
        index: usize,
        goods: GoodsRecord,
    },
    VehicleSubmitted {
        vehicle: VehicleSpec,
        selection: VehicleSelection,
    },
    TransferSubmitted(PalletTransfer),
}

impl JobRecord {
    /// Empty record for `job_type` with the fixed side(s) already sized.
    pub fn for_job_type(job_type: JobType) -> Self {
        let (pickup_count, delivery_count) = match job_type {
            JobType::Single => (1, 1),
            JobType::MultiPickup => (0, 1),
            JobType::MultiDrop => (1, 0),
        };

        let mut record = Self {
            job_type: Some(job_type),
            ..Self::default()
        };
        record.resize(LocationType::Pickup, pickup_count);
        record.resize(LocationType::Delivery, delivery_count);
        record
    }

    pub fn count(&self, side: LocationType) -> usize {
        match side {
            LocationType::Pickup => self.pickup_count,
            LocationType::Delivery => self.delivery_count,
        }
    }

    /// Count of the goods-bearing side; this is what packaging availability is keyed on.
    pub fn relevant_location_count(&self) -> usize {
        self.job_type
            .map(|job_type| self.count(job_type.goods_side()))
            .unwrap_or(0)
    }

    pub fn locations(&self, side: LocationType) -> &[Option<LocationRecord>] {
        match side {
            LocationType::Pickup => &self.pickups,
            LocationType::Delivery => &self.deliveries,
        }
    }

    pub fn location(&self, side: LocationType, index: usize) -> Option<&LocationRecord> {
        self.locations(side).get(index).and_then(Option::as_ref)
    }

    pub fn goods_for(&self, side: LocationType) -> &[Option<GoodsRecord>] {
        match side {
            LocationType::Pickup => &self.pickup_goods,
            LocationType::Delivery => &self.delivery_goods,
        }
    }

    pub fn goods(&self, side: LocationType, index: usize) -> Option<&GoodsRecord> {
        self.goods_for(side).get(index).and_then(Option::as_ref)
    }

    /// Every goods record entered so far, pickups first.
    pub fn goods_entries(&self) -> impl Iterator<Item = &GoodsRecord> + '_ {
        self.pickup_goods
            .iter()
            .chain(self.delivery_goods.iter())
            .filter_map(Option::as_ref)
    }

    /// Whether any goods travel on pallets. Decides if the transfer step is shown,
    /// in both navigation directions.
    pub fn has_pallets(&self) -> bool {
        self.goods_entries()
            .any(|goods| goods.is_selected(PackagingKind::Pallets))
    }

    pub fn has_goods(&self) -> bool {
        self.goods_entries().next().is_some()
    }

    fn resize(&mut self, side: LocationType, count: usize) {
        let (locations, goods, stored) = match side {
            LocationType::Pickup => (
                &mut self.pickups,
                &mut self.pickup_goods,
                &mut self.pickup_count,
            ),
            LocationType::Delivery => (
                &mut self.deliveries,
                &mut self.delivery_goods,
                &mut self.delivery_count,
            ),
        };
        *stored = count;
        locations.resize(count, None);
        goods.resize(count, None);
    }
}

/// Applies `event` to a copy of `record`; the input is left untouched.
pub fn reduce(record: &JobRecord, event: FlowEvent) -> JobRecord {
    let mut next = record.clone();

    match event {
        FlowEvent::JobTypeSelected(job_type) => {
            if record.job_type != Some(job_type) {
                next = JobRecord::for_job_type(job_type);
            }
        }
        FlowEvent::LocationCountSubmitted(count) => {
            if let Some(side) = record.job_type.and_then(JobType::counted_side) {
                next.resize(side, count);
            }
            if !next.has_pallets() {
                next.pallet_transfer = None;
            }
        }
        FlowEvent::LocationSubmitted {
            side,
            index,
            location,
        } => {
            let slots = match side {
                LocationType::Pickup => &mut next.pickups,
                LocationType::Delivery => &mut next.deliveries,
            };
            store(slots, index, location);
        }
        FlowEvent::GoodsSubmitted { side, index, goods } => {
            let slots = match side {
                LocationType::Pickup => &mut next.pickup_goods,
                LocationType::Delivery => &mut next.delivery_goods,
            };
            store(slots, index, goods);
            if !next.has_pallets() {
                next.pallet_transfer = None;
            }
        }
        FlowEvent::VehicleSubmitted { vehicle, selection } => {
            next.vehicle = Some(vehicle);
            next.truck_body_type = Some(selection.truck_body_type);
            next.is_refrigerated = selection.is_refrigerated;
            next.crane_hiab_option = selection.crane_hiab_option;
        }
        FlowEvent::TransferSubmitted(transfer) => {
            next.pallet_transfer = Some(transfer);
        }
    }

    next
}

fn store<T>(slots: &mut Vec<Option<T>>, index: usize, value: T) {
    if slots.len() <= index {
        slots.resize_with(index + 1, || None);
    }
    slots[index] = Some(value);
}
