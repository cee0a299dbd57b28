use proptest::prelude::*;

use crate::workflows::booking::domain::{JobType, LocationType};
use crate::workflows::booking::navigator::{backward, forward, NavigatorState, RouteContext, Step};

fn context(job_type: JobType, count: usize, has_pallets: bool) -> RouteContext {
    let (pickup_count, delivery_count) = match job_type {
        JobType::Single => (1, 1),
        JobType::MultiPickup => (count, 1),
        JobType::MultiDrop => (1, count),
    };
    RouteContext {
        job_type,
        pickup_count,
        delivery_count,
        has_pallets,
    }
}

fn describe(state: NavigatorState) -> String {
    if state.is_editing_location() {
        format!(
            "{}:{}:{}",
            state.step.label(),
            state.location_type.label(),
            state.location_index
        )
    } else {
        state.step.label().to_string()
    }
}

fn forward_path(ctx: &RouteContext) -> Vec<String> {
    let mut state = NavigatorState::initial();
    let mut path = vec![describe(state)];
    while let Some(next) = forward(state, ctx) {
        path.push(describe(next));
        state = next;
    }
    path
}

#[yare::parameterized(
    single_without_pallets = {
        JobType::Single, 1, false,
        &["job type", "location:pickup:0", "location:delivery:0", "goods:delivery:0",
          "vehicle", "review", "payment", "confirmed"]
    },
    single_with_pallets = {
        JobType::Single, 1, true,
        &["job type", "location:pickup:0", "location:delivery:0", "goods:delivery:0",
          "vehicle", "pallet transfer", "review", "payment", "confirmed"]
    },
    multi_pickup_with_pallets = {
        JobType::MultiPickup, 2, true,
        &["job type", "location count", "location:delivery:0", "location:pickup:0",
          "goods:pickup:0", "location:pickup:1", "goods:pickup:1", "vehicle",
          "pallet transfer", "review", "payment", "confirmed"]
    },
    multi_drop_without_pallets = {
        JobType::MultiDrop, 2, false,
        &["job type", "location count", "location:pickup:0", "location:delivery:0",
          "goods:delivery:0", "location:delivery:1", "goods:delivery:1", "vehicle",
          "review", "payment", "confirmed"]
    },
)]
fn forward_visits_screens_in_order(
    job_type: JobType,
    count: usize,
    has_pallets: bool,
    expected: &[&str],
) {
    let ctx = context(job_type, count, has_pallets);
    assert_eq!(forward_path(&ctx), expected);
}

#[yare::parameterized(
    multi_pickup = { JobType::MultiPickup, LocationType::Pickup },
    multi_drop = { JobType::MultiDrop, LocationType::Delivery },
)]
fn goods_screen_count_matches_location_count(job_type: JobType, side: LocationType) {
    let ctx = context(job_type, 7, false);
    let path = forward_path(&ctx);
    let prefix = format!("goods:{}:", side.label());
    assert_eq!(path.iter().filter(|entry| entry.starts_with(&prefix)).count(), 7);
    assert_eq!(path.iter().filter(|entry| entry.starts_with("goods:")).count(), 7);
}

#[test]
fn vehicle_goes_back_to_the_last_goods_screen() {
    let ctx = context(JobType::MultiDrop, 4, false);
    let previous = backward(NavigatorState::at(Step::Vehicle), &ctx);
    assert_eq!(previous, Some(NavigatorState::goods(LocationType::Delivery, 3)));

    let single = context(JobType::Single, 1, false);
    let previous = backward(NavigatorState::at(Step::Vehicle), &single);
    assert_eq!(previous, Some(NavigatorState::goods(LocationType::Delivery, 0)));
}

#[test]
fn review_goes_back_through_transfer_only_with_pallets() {
    let review = NavigatorState::at(Step::Review);
    assert_eq!(
        backward(review, &context(JobType::Single, 1, true)),
        Some(NavigatorState::at(Step::Transfer))
    );
    assert_eq!(
        backward(review, &context(JobType::Single, 1, false)),
        Some(NavigatorState::at(Step::Vehicle))
    );
}

#[test]
fn first_screens_after_the_count_step_go_back_to_it() {
    let multi_pickup = context(JobType::MultiPickup, 3, false);
    assert_eq!(
        backward(NavigatorState::location(LocationType::Delivery, 0), &multi_pickup),
        Some(NavigatorState::at(Step::LocationCount))
    );

    let multi_drop = context(JobType::MultiDrop, 3, false);
    assert_eq!(
        backward(NavigatorState::location(LocationType::Pickup, 0), &multi_drop),
        Some(NavigatorState::at(Step::LocationCount))
    );
}

#[test]
fn terminal_and_initial_screens_have_no_previous() {
    let ctx = context(JobType::Single, 1, false);
    assert_eq!(backward(NavigatorState::initial(), &ctx), None);
    assert_eq!(backward(NavigatorState::at(Step::Confirmed), &ctx), None);
    assert_eq!(forward(NavigatorState::at(Step::Confirmed), &ctx), None);
}

#[test]
fn non_location_steps_carry_the_neutral_position() {
    let ctx = context(JobType::MultiPickup, 2, true);
    let vehicle = forward(NavigatorState::goods(LocationType::Pickup, 1), &ctx)
        .expect("goods leads to vehicle");
    assert_eq!(vehicle, NavigatorState::at(Step::Vehicle));
    assert_eq!(vehicle.location_type, LocationType::Pickup);
    assert_eq!(vehicle.location_index, 0);
}

fn arb_job_type() -> impl Strategy<Value = JobType> {
    prop_oneof![
        Just(JobType::Single),
        Just(JobType::MultiPickup),
        Just(JobType::MultiDrop),
    ]
}

proptest! {
    #[test]
    fn going_back_undoes_every_forward_move(
        job_type in arb_job_type(),
        count in 2usize..=30,
        has_pallets in any::<bool>(),
        moves in proptest::collection::vec(any::<bool>(), 0..120),
    ) {
        let ctx = context(job_type, count, has_pallets);
        let mut state = NavigatorState::initial();

        for advance in moves {
            if advance {
                let Some(next) = forward(state, &ctx) else { continue };
                if next.step != Step::Confirmed {
                    prop_assert_eq!(backward(next, &ctx), Some(state));
                    state = next;
                }
            } else {
                let Some(previous) = backward(state, &ctx) else { continue };
                prop_assert_eq!(forward(previous, &ctx), Some(state));
                state = previous;
            }
        }
    }
}
