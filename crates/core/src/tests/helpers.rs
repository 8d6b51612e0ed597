// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BillingContext, Command, RequestChange, TransitionResult, apply_create_request};
use rust_decimal_macros::dec;
use time::OffsetDateTime;
use time::macros::datetime;
use waste_billing_audit::{Actor, Cause};
use waste_billing_domain::{
    CompletionPolicy, Member, RateTable, Role, WasteCategory, WasteRequest, WeightEntry,
};

pub const ADMIN_ID: i64 = 1;
pub const RESIDENT_ID: i64 = 2;
pub const COLLECTOR_ID: i64 = 3;
pub const OTHER_COLLECTOR_ID: i64 = 4;
pub const OTHER_RESIDENT_ID: i64 = 5;
pub const SAVED_REQUEST_ID: i64 = 10;

pub fn create_test_actor() -> Actor {
    Actor::new(ADMIN_ID.to_string(), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("HTTP request"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 10:00:00 UTC)
}

pub fn create_test_members() -> Vec<Member> {
    vec![
        Member::with_id(ADMIN_ID, String::from("Admin"), Role::Admin),
        Member::with_id(RESIDENT_ID, String::from("Nimal Perera"), Role::Resident),
        Member::with_id(COLLECTOR_ID, String::from("Kamal Silva"), Role::Collector),
        Member::with_id(
            OTHER_COLLECTOR_ID,
            String::from("Sunil Fernando"),
            Role::Collector,
        ),
        Member::with_id(
            OTHER_RESIDENT_ID,
            String::from("Amara Jayasinghe"),
            Role::Resident,
        ),
    ]
}

pub fn create_test_context() -> BillingContext {
    BillingContext::new(
        RateTable::standard(),
        CompletionPolicy::AllowUnpaid,
        create_test_members(),
    )
}

pub fn create_strict_context() -> BillingContext {
    BillingContext::new(
        RateTable::standard(),
        CompletionPolicy::RequirePayment,
        create_test_members(),
    )
}

/// 2 kg food and 1.5 kg cardboard at standard rates: 145 LKR.
pub fn create_test_entries() -> Vec<WeightEntry> {
    vec![
        WeightEntry::new(WasteCategory::Food, dec!(2)),
        WeightEntry::new(WasteCategory::Cardboard, dec!(1.5)),
    ]
}

/// A pending request as it would come back from storage.
pub fn create_saved_request(context: &BillingContext) -> WasteRequest {
    let result: TransitionResult = apply_create_request(
        context,
        Command::CreateRequest {
            resident_id: RESIDENT_ID,
            entries: create_test_entries(),
        },
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    let RequestChange::Created(mut request) = result.change else {
        panic!("expected a created request");
    };
    request.request_id = Some(SAVED_REQUEST_ID);
    request
}

/// Applies a command and returns the updated request.
pub fn apply_and_unwrap(
    context: &BillingContext,
    request: &WasteRequest,
    command: Command,
) -> WasteRequest {
    let result: TransitionResult = crate::apply(
        context,
        request,
        command,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    result.change.current().cloned().unwrap()
}
