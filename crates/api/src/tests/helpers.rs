// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use serde_json::json;
use waste_billing_audit::Cause;
use waste_billing_domain::{CompletionPolicy, RateTable, Role};
use waste_billing_persistence::Persistence;

use crate::{
    AuthenticatedActor, BillingSettings, CreateRequestRequest, RegisterMemberRequest,
    RequestInfo, WeightEntryRequest, bootstrap_admin, create_request, register_member,
};

pub const ADMIN_ID: i64 = 1;
pub const RESIDENT_ID: i64 = 2;
pub const COLLECTOR_ID: i64 = 3;
pub const OTHER_COLLECTOR_ID: i64 = 4;
pub const OTHER_RESIDENT_ID: i64 = 5;

pub const fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(ADMIN_ID, Role::Admin)
}

pub const fn create_test_resident() -> AuthenticatedActor {
    AuthenticatedActor::new(RESIDENT_ID, Role::Resident)
}

pub const fn create_test_collector() -> AuthenticatedActor {
    AuthenticatedActor::new(COLLECTOR_ID, Role::Collector)
}

pub const fn create_other_collector() -> AuthenticatedActor {
    AuthenticatedActor::new(OTHER_COLLECTOR_ID, Role::Collector)
}

pub const fn create_other_resident() -> AuthenticatedActor {
    AuthenticatedActor::new(OTHER_RESIDENT_ID, Role::Resident)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn require_payment_settings() -> BillingSettings {
    BillingSettings::new(RateTable::standard(), CompletionPolicy::RequirePayment)
}

pub fn item(category: &str, weight_kg: serde_json::Value) -> WeightEntryRequest {
    WeightEntryRequest {
        category: category.to_string(),
        weight_kg,
    }
}

/// 2 kg food and 1.5 kg cardboard at standard rates: 145.00.
pub fn create_test_items() -> Vec<WeightEntryRequest> {
    vec![item("food", json!(2)), item("cardboard", json!("1.5"))]
}

/// Opens a fresh database with a bootstrapped admin and the standard
/// residents and collectors, in ID order.
pub fn setup_test_persistence() -> Persistence {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    bootstrap_admin(&mut persistence, "Admin").unwrap();

    for (name, role) in [
        ("Nimal Perera", "resident"),
        ("Kamal Silva", "collector"),
        ("Sunil Fernando", "collector"),
        ("Amara Jayasinghe", "resident"),
    ] {
        register_member(
            &mut persistence,
            RegisterMemberRequest {
                display_name: name.to_string(),
                role: role.to_string(),
            },
            &create_test_admin(),
            create_test_cause(),
        )
        .unwrap();
    }

    persistence
}

/// Files the standard test request for the default resident.
pub fn create_test_request(
    persistence: &mut Persistence,
    settings: &BillingSettings,
) -> RequestInfo {
    create_request(
        persistence,
        settings,
        &CreateRequestRequest {
            resident_id: None,
            items: create_test_items(),
        },
        &create_test_resident(),
        create_test_cause(),
    )
    .unwrap()
    .request
}

pub fn request_id_of(request: &RequestInfo) -> i64 {
    request.request_id.unwrap()
}
