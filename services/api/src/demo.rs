use crate::infra::{
    load_catalog_from, parse_date, parse_job_type, InMemoryDocumentSink, InMemorySessionRepository,
};
use booking_flow::config::{DEFAULT_PAYMENT_DELAY_MS, DEFAULT_PAYMENT_SUCCESS_RATE};
use booking_flow::error::AppError;
use booking_flow::workflows::booking::{
    AddressBookEntry, BookingService, BookingSession, BookingView, GoodsRecord, HandlingMethod,
    JobType, LocationRecord, LocationType, MockPaymentGateway, PackagingConfig, PackagingKind,
    PalletAccount, PalletTransfer, PalletType, SessionId, Step, TradingHours, VehicleSelection,
};
use booking_flow::workflows::fleet::VehicleCatalog;
use chrono::{Local, NaiveDate, NaiveTime};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type DemoService = BookingService<InMemorySessionRepository, InMemoryDocumentSink>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Job type: single, multi-pickup, or multi-drop. Defaults to multi-pickup.
    #[arg(long, value_parser = parse_job_type)]
    pub(crate) job_type: Option<JobType>,
    /// Number of pickups or drops for multi-location jobs (2-30).
    #[arg(long, default_value_t = 3)]
    pub(crate) locations: usize,
    /// Ship the goods on pallets (adds the pallet transfer step).
    #[arg(long)]
    pub(crate) pallets: bool,
    /// Collection date (YYYY-MM-DD). Defaults to tomorrow.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Preferred vehicle key; falls back to the first vehicle that fits.
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
    /// Simulated approval probability between 0 and 1.
    #[arg(long)]
    pub(crate) success_rate: Option<f64>,
    /// Simulated processing time per payment attempt, in milliseconds.
    #[arg(long)]
    pub(crate) payment_delay_ms: Option<u64>,
    /// Payment attempts before giving up.
    #[arg(long, default_value_t = 3)]
    pub(crate) max_attempts: u32,
    /// Optional fleet CSV export to use instead of the standard fleet.
    #[arg(long)]
    pub(crate) fleet_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FleetListArgs {
    /// Optional fleet CSV export to list instead of the standard fleet.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_fleet_list(args: FleetListArgs) -> Result<(), AppError> {
    let catalog = load_catalog_from(args.csv.as_deref())?;
    render_fleet(&catalog, args.csv.is_some());
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        job_type,
        locations,
        pallets,
        date,
        vehicle,
        success_rate,
        payment_delay_ms,
        max_attempts,
        fleet_csv,
    } = args;

    let job_type = job_type.unwrap_or(JobType::MultiPickup);
    let date = date.unwrap_or_else(|| Local::now().date_naive() + chrono::Duration::days(1));
    let gateway = MockPaymentGateway::new(
        Duration::from_millis(payment_delay_ms.unwrap_or(DEFAULT_PAYMENT_DELAY_MS)),
        success_rate.unwrap_or(DEFAULT_PAYMENT_SUCCESS_RATE),
    );

    let catalog = Arc::new(load_catalog_from(fleet_csv.as_deref())?);
    let documents = Arc::new(InMemoryDocumentSink::default());
    let service = BookingService::new(
        Arc::new(InMemorySessionRepository::default()),
        documents.clone(),
        Arc::new(gateway),
        catalog.clone(),
    );

    println!("Freight booking demo");
    let session = service.start()?;
    let id = session.id.clone();
    println!("Session {id}");

    let mut session = service.select_job_type(&id, job_type)?;
    print_step(&session);
    if job_type.counted_side().is_some() {
        session = service.submit_location_count(&id, locations)?;
        print_step(&session);
    }

    let mut view = BookingView::from_session(&session);
    while matches!(view.step, Step::Location | Step::Goods) {
        session = match view.step {
            Step::Location => {
                let location = demo_location(view.location_type, view.location_index, date);
                service.submit_location(&id, location)?
            }
            _ => {
                let use_pallets =
                    pallets && view.available_packaging.contains(&PackagingKind::Pallets);
                if pallets && !use_pallets {
                    println!("  pallets are not offered for this many locations; shipping boxes");
                }
                service.submit_goods(&id, demo_goods(use_pallets))?
            }
        };
        print_step(&session);
        view = BookingView::from_session(&session);
    }

    session = choose_vehicle(&service, &catalog, &id, vehicle.as_deref())?;
    print_step(&session);

    if session.flow.state().step == Step::Transfer {
        session = service.submit_transfer(
            &id,
            PalletTransfer {
                account: PalletAccount::Chep,
                account_number: Some("CHEP-DEMO-001".to_string()),
                docket_number: None,
            },
        )?;
        print_step(&session);
    }

    session = service.confirm_review(&id)?;
    print_step(&session);

    for _ in 0..max_attempts.max(1) {
        session = service.pay(&id).await?;
        let payment = session.flow.payment();
        match &payment.last_error {
            Some(error) => println!("  attempt {}: {}", payment.attempts, error),
            None => println!("  attempt {}: approved", payment.attempts),
        }
        if session.flow.state().step == Step::Confirmed {
            break;
        }
    }

    render_outcome(&session, &documents);
    Ok(())
}

fn choose_vehicle(
    service: &DemoService,
    catalog: &VehicleCatalog,
    id: &SessionId,
    preferred: Option<&str>,
) -> Result<BookingSession, AppError> {
    let options = service.vehicles(id)?;
    println!("\nVehicle options");
    for option in &options {
        match &option.message {
            Some(message) => println!("  - {} (unavailable: {})", option.name, message),
            None => println!(
                "  - {} | {}t | {} pallets",
                option.name, option.max_weight, option.max_pallets
            ),
        }
    }

    let chosen = options
        .iter()
        .filter(|option| option.valid)
        .find(|option| preferred.map_or(true, |key| option.key == key))
        .or_else(|| options.iter().find(|option| option.valid))
        .map(|option| option.key.clone());

    let Some(key) = chosen else {
        println!("  no vehicle in the fleet can carry this load; submitting the largest anyway");
        let largest = catalog
            .vehicles()
            .last()
            .map(|vehicle| vehicle.key.clone())
            .unwrap_or_default();
        return submit_vehicle(service, catalog, id, &largest);
    };

    submit_vehicle(service, catalog, id, &key)
}

fn submit_vehicle(
    service: &DemoService,
    catalog: &VehicleCatalog,
    id: &SessionId,
    key: &str,
) -> Result<BookingSession, AppError> {
    let body = catalog
        .find(key)
        .and_then(|vehicle| vehicle.body_types.first().copied())
        .unwrap_or(booking_flow::workflows::booking::TruckBodyType::Tray);
    let session = service.submit_vehicle(
        id,
        VehicleSelection {
            vehicle_key: key.to_string(),
            truck_body_type: body,
            is_refrigerated: false,
            crane_hiab_option: Default::default(),
        },
    )?;
    Ok(session)
}

fn demo_location(side: LocationType, index: usize, date: NaiveDate) -> LocationRecord {
    let (customer, suburb) = match side {
        LocationType::Pickup => (format!("Supplier {}", index + 1), "Dandenong South"),
        LocationType::Delivery => (format!("Store {}", index + 1), "Richmond"),
    };

    LocationRecord {
        customer_name: customer.clone(),
        address: Some(AddressBookEntry {
            id: format!("{}-{}", side.label(), index + 1),
            name: customer,
            address: format!("{} Industrial Drive", 10 + index),
            suburb: suburb.to_string(),
            postcode: "3175".to_string(),
            is_default: index == 0,
        }),
        recipient_mobile: Some("0400 111 222".to_string()),
        instructions: None,
        date: Some(date),
        time: NaiveTime::from_hms_opt(8, 0, 0),
        flexible_timing: true,
        trading_hours: Some(TradingHours::BusinessHours),
        appointment_details: None,
    }
}

fn demo_goods(pallets: bool) -> GoodsRecord {
    let mut goods = GoodsRecord {
        description: if pallets {
            "Bagged cement on pallets".to_string()
        } else {
            "Boxed homewares".to_string()
        },
        pickup_method: Some(HandlingMethod::Forklift),
        delivery_method: Some(HandlingMethod::Tailgate),
        ..GoodsRecord::default()
    };

    let (kind, config) = if pallets {
        (
            PackagingKind::Pallets,
            PackagingConfig {
                selected: true,
                quantity: 2,
                weight: 900.0,
                secured: Some(true),
                dimensions: None,
                pallet_types: vec![PalletType::Chep],
            },
        )
    } else {
        (
            PackagingKind::Boxes,
            PackagingConfig {
                selected: true,
                quantity: 24,
                weight: 360.0,
                ..PackagingConfig::default()
            },
        )
    };
    goods.packaging_types.insert(kind, config);
    goods
}

fn print_step(session: &BookingSession) {
    let state = session.flow.state();
    if state.is_editing_location() {
        println!(
            "-> {} ({} {})",
            state.step.label(),
            state.location_type.label(),
            state.location_index + 1
        );
    } else {
        println!("-> {}", state.step.label());
    }
}

fn render_outcome(session: &BookingSession, documents: &InMemoryDocumentSink) {
    match session.flow.confirmation() {
        Some(confirmation) => {
            let record = &confirmation.record;
            println!("\nBooking confirmed");
            println!("  Job ID: {}", confirmation.job_id);
            println!("  OTP: {}", confirmation.otp);
            println!("  Payment reference: {}", confirmation.payment_reference);
            println!(
                "  {} | {} pickup(s), {} drop(s)",
                record.job_type.map(JobType::label).unwrap_or("unknown"),
                record.pickup_count,
                record.delivery_count
            );
            if let Some(vehicle) = &record.vehicle {
                println!("  Vehicle: {}", vehicle.name);
            }
            println!("  Job sheets queued: {}", documents.confirmations().len());
        }
        None => {
            println!(
                "\nBooking not confirmed after {} payment attempt(s)",
                session.flow.payment().attempts
            );
        }
    }
}

fn render_fleet(catalog: &VehicleCatalog, imported: bool) {
    if imported {
        println!("Fleet (imported CSV)");
    } else {
        println!("Fleet (standard)");
    }
    for vehicle in catalog.vehicles() {
        let bodies = vehicle
            .body_types
            .iter()
            .map(|body| body.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "- {} [{}] | {}t | {} pallets | {}{}{}",
            vehicle.name,
            vehicle.key,
            vehicle.max_weight,
            vehicle.max_pallets,
            bodies,
            if vehicle.refrigeration { " | refrigerated" } else { "" },
            if vehicle.hiab { " | hiab" } else { "" },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_records_pass_validation() {
        let catalog = Arc::new(VehicleCatalog::standard());
        let service = BookingService::new(
            Arc::new(InMemorySessionRepository::default()),
            Arc::new(InMemoryDocumentSink::default()),
            Arc::new(MockPaymentGateway::always_approve()),
            catalog.clone(),
        );
        let session = service.start().expect("session");
        let date = NaiveDate::from_ymd_opt(2026, 11, 20).expect("valid date");

        service
            .select_job_type(&session.id, JobType::Single)
            .expect("job type");
        service
            .submit_location(&session.id, demo_location(LocationType::Pickup, 0, date))
            .expect("pickup");
        service
            .submit_location(&session.id, demo_location(LocationType::Delivery, 0, date))
            .expect("delivery");
        service
            .submit_goods(&session.id, demo_goods(true))
            .expect("goods");

        let session = choose_vehicle(&service, &catalog, &session.id, Some("van"))
            .expect("vehicle chosen");
        assert_eq!(session.flow.state().step, Step::Transfer);
        assert_eq!(
            session.flow.record().vehicle.as_ref().map(|v| v.key.as_str()),
            Some("van")
        );
    }

    #[tokio::test]
    async fn demo_runs_to_confirmation_with_certain_approval() {
        let args = DemoArgs {
            job_type: Some(JobType::MultiDrop),
            locations: 4,
            pallets: true,
            success_rate: Some(1.0),
            payment_delay_ms: Some(0),
            max_attempts: 1,
            ..DemoArgs::default()
        };
        run_demo(args).await.expect("demo completes");
    }
}
