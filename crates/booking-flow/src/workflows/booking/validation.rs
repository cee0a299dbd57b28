//! Pure checks evaluated before a transition is allowed.

use super::domain::{
    FlowError, GoodsRecord, JobType, LocationRecord, LocationType, PackagingKind, PalletTransfer,
    TradingHours,
};
use super::record::JobRecord;
use crate::workflows::fleet::VehicleSpec;
use serde::Serialize;

pub const MIN_MULTI_LOCATIONS: usize = 2;
pub const MAX_LOCATIONS: usize = 30;
/// Above this many locations pallets and bags are no longer offered.
pub const FULL_PACKAGING_LIMIT: usize = 10;

const RESTRICTED_KINDS: [PackagingKind; 2] = [PackagingKind::Pallets, PackagingKind::Bags];

/// Packaging kinds offered when the goods-bearing side has `count` locations.
pub fn available_packaging(count: usize) -> Vec<PackagingKind> {
    match count {
        0..=FULL_PACKAGING_LIMIT => PackagingKind::ordered().to_vec(),
        c if c <= MAX_LOCATIONS => vec![PackagingKind::Boxes, PackagingKind::Others],
        _ => Vec::new(),
    }
}

pub fn location_missing_fields(location: &LocationRecord, side: LocationType) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if location.customer_name.trim().is_empty() {
        missing.push("customer name");
    }
    if location.address.is_none() {
        missing.push("address");
    }
    if side == LocationType::Pickup && is_blank(location.recipient_mobile.as_deref()) {
        missing.push("recipient mobile");
    }
    if location.date.is_none() {
        missing.push("date");
    }
    if location.time.is_none() {
        missing.push("time");
    }
    match location.trading_hours {
        None => missing.push("trading hours"),
        Some(TradingHours::OnAppointment)
            if is_blank(location.appointment_details.as_deref()) =>
        {
            missing.push("appointment details")
        }
        Some(_) => {}
    }

    missing
}

pub fn check_location(location: &LocationRecord, side: LocationType) -> Result<(), FlowError> {
    let missing = location_missing_fields(location, side);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FlowError::IncompleteLocation {
            side: side.label(),
            missing,
        })
    }
}

pub fn goods_missing_fields(goods: &GoodsRecord) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if goods.description.trim().is_empty() {
        missing.push("description");
    }
    if goods.pickup_method.is_none() {
        missing.push("pickup method");
    }
    if goods.delivery_method.is_none() {
        missing.push("delivery method");
    }
    if !goods.packaging_types.values().any(|config| config.is_loaded()) {
        missing.push("packaging");
    }

    missing
}

/// Completeness first, then packaging availability for `location_count`.
pub fn check_goods(goods: &GoodsRecord, location_count: usize) -> Result<(), FlowError> {
    let missing = goods_missing_fields(goods);
    if !missing.is_empty() {
        return Err(FlowError::IncompleteGoods { missing });
    }

    let available = available_packaging(location_count);
    let kinds: Vec<PackagingKind> = goods
        .selected_kinds()
        .filter(|kind| !available.contains(kind))
        .collect();
    if kinds.is_empty() {
        Ok(())
    } else {
        Err(FlowError::PackagingUnavailable {
            kinds,
            count: location_count,
        })
    }
}

/// Range check plus the packaging guard for goods entered before the count changed.
pub fn check_location_count(record: &JobRecord, count: usize) -> Result<(), FlowError> {
    let job_type = record.job_type.unwrap_or(JobType::Single);
    if job_type.counted_side().is_none() {
        return Err(FlowError::LocationCountNotApplicable(job_type.label()));
    }

    if !(MIN_MULTI_LOCATIONS..=MAX_LOCATIONS).contains(&count) {
        return Err(FlowError::LocationCountOutOfRange {
            count,
            min: MIN_MULTI_LOCATIONS,
            max: MAX_LOCATIONS,
        });
    }

    let restricted_in_use = record
        .goods_for(job_type.goods_side())
        .iter()
        .flatten()
        .any(|goods| RESTRICTED_KINDS.iter().any(|kind| goods.is_selected(*kind)));
    if count > FULL_PACKAGING_LIMIT && restricted_in_use {
        return Err(FlowError::PackagingLimitExceeded {
            count,
            limit: FULL_PACKAGING_LIMIT,
        });
    }

    Ok(())
}

pub fn transfer_missing_fields(transfer: &PalletTransfer) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if transfer.account.requires_account_number() && is_blank(transfer.account_number.as_deref())
    {
        missing.push("account number");
    }
    missing
}

/// Aggregate load across goods records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoadTotals {
    pub weight_tonnes: f64,
    pub pallets: u32,
}

/// `None` when there are no goods yet, so vehicles cannot be filtered.
pub fn load_totals<'a, I>(goods: I) -> Option<LoadTotals>
where
    I: IntoIterator<Item = &'a GoodsRecord>,
{
    let mut seen = false;
    let mut weight_kg = 0.0;
    let mut pallets: u32 = 0;

    for record in goods {
        seen = true;
        for (kind, config) in &record.packaging_types {
            if !config.selected {
                continue;
            }
            weight_kg += config.weight;
            if *kind == PackagingKind::Pallets {
                pallets = pallets.saturating_add(config.quantity);
            }
        }
    }

    seen.then(|| LoadTotals {
        weight_tonnes: weight_kg / 1000.0,
        pallets,
    })
}

pub fn is_vehicle_valid(vehicle: &VehicleSpec, record: &JobRecord) -> bool {
    vehicle_validation_message(vehicle, record).is_none()
}

/// Describes every capacity limit the current load exceeds, or `None` if it fits.
pub fn vehicle_validation_message(vehicle: &VehicleSpec, record: &JobRecord) -> Option<String> {
    let totals = load_totals(record.goods_entries())?;
    let mut problems = Vec::new();

    let weight = round2(totals.weight_tonnes);
    if weight > vehicle.max_weight {
        problems.push(format!(
            "weight limit by {}t ({}t > {}t)",
            round2(weight - vehicle.max_weight),
            weight,
            round2(vehicle.max_weight)
        ));
    }
    if totals.pallets > vehicle.max_pallets {
        problems.push(format!(
            "pallet limit by {} ({} > {})",
            totals.pallets - vehicle.max_pallets,
            totals.pallets,
            vehicle.max_pallets
        ));
    }

    if problems.is_empty() {
        None
    } else {
        Some(format!("Exceeds {}", problems.join(" and ")))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}
