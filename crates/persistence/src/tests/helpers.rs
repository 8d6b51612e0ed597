// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persisted, Persistence, PersistenceError};
use rust_decimal_macros::dec;
use time::OffsetDateTime;
use time::macros::datetime;
use waste_billing::{
    BillingContext, CollectionResult, Command, TransitionResult, apply, apply_create_request,
    apply_record_collection, apply_register_member,
};
use waste_billing_audit::{Actor, Cause};
use waste_billing_domain::{
    CollectionRecord, CompletionPolicy, Member, RateTable, Role, WasteCategory, WasteRequest,
    WeightEntry,
};

pub const ADMIN_ID: i64 = 1;
pub const RESIDENT_ID: i64 = 2;
pub const COLLECTOR_ID: i64 = 3;
pub const OTHER_COLLECTOR_ID: i64 = 4;
pub const OTHER_RESIDENT_ID: i64 = 5;

pub fn create_test_actor() -> Actor {
    Actor::new(ADMIN_ID.to_string(), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 10:00:00 UTC)
}

/// 2 kg food and 1.5 kg cardboard at standard rates: 145 LKR.
pub fn create_test_entries() -> Vec<WeightEntry> {
    vec![
        WeightEntry::new(WasteCategory::Food, dec!(2)),
        WeightEntry::new(WasteCategory::Cardboard, dec!(1.5)),
    ]
}

pub fn register(persistence: &mut Persistence, name: &str, role: Role) -> Persisted<Member> {
    let result = apply_register_member(
        Command::RegisterMember {
            display_name: name.to_string(),
            role,
        },
        Actor::system(),
        create_test_cause(),
    )
    .unwrap();
    persistence.persist_member(&result, test_now()).unwrap()
}

/// Opens a fresh database holding the standard test members, in ID order.
pub fn create_seeded_persistence() -> (Persistence, BillingContext) {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    register(&mut persistence, "Admin", Role::Admin);
    register(&mut persistence, "Nimal Perera", Role::Resident);
    register(&mut persistence, "Kamal Silva", Role::Collector);
    register(&mut persistence, "Sunil Fernando", Role::Collector);
    register(&mut persistence, "Amara Jayasinghe", Role::Resident);

    let members: Vec<Member> = persistence.list_members(None).unwrap();
    assert_eq!(members.len(), 5);
    assert_eq!(members[4].member_id, Some(OTHER_RESIDENT_ID));

    let context: BillingContext =
        BillingContext::new(RateTable::standard(), CompletionPolicy::AllowUnpaid, members);
    (persistence, context)
}

pub fn create_request_at(
    persistence: &mut Persistence,
    context: &BillingContext,
    resident_id: i64,
    now: OffsetDateTime,
) -> Persisted<WasteRequest> {
    let result: TransitionResult = apply_create_request(
        context,
        Command::CreateRequest {
            resident_id,
            entries: create_test_entries(),
        },
        create_test_actor(),
        create_test_cause(),
        now,
    )
    .unwrap();
    persistence.persist_request_transition(&result, now).unwrap()
}

pub fn create_request(
    persistence: &mut Persistence,
    context: &BillingContext,
) -> Persisted<WasteRequest> {
    create_request_at(persistence, context, RESIDENT_ID, test_now())
}

/// Applies a lifecycle command to a request and persists the outcome.
pub fn transition(
    persistence: &mut Persistence,
    context: &BillingContext,
    request: &WasteRequest,
    command: Command,
) -> Result<Persisted<WasteRequest>, PersistenceError> {
    let result: TransitionResult = apply(
        context,
        request,
        command,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    persistence.persist_request_transition(&result, test_now())
}

pub fn record_collection(
    persistence: &mut Persistence,
    context: &BillingContext,
    collector_id: i64,
    resident_id: i64,
    entries: Vec<WeightEntry>,
    collected_at: OffsetDateTime,
) -> CollectionRecord {
    let result: CollectionResult = apply_record_collection(
        context,
        Command::RecordCollection {
            collector_id,
            resident_id,
            entries,
        },
        Actor::new(collector_id.to_string(), String::from("collector")),
        create_test_cause(),
        collected_at,
    )
    .unwrap();
    persistence
        .persist_collection(&result, collected_at)
        .unwrap()
        .value
}
