// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error translation tests.

use waste_billing::CoreError;
use waste_billing_domain::DomainError;
use waste_billing_persistence::PersistenceError;

use crate::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};

#[test]
fn test_domain_rule_names_become_error_kinds() {
    let cases: Vec<(DomainError, &str)> = vec![
        (
            DomainError::UnknownCategory {
                category: String::from("electronics"),
            },
            "unknown_category",
        ),
        (DomainError::EmptyItems, "empty_items"),
        (DomainError::NoPositiveWeight, "no_positive_weight"),
        (
            DomainError::PaymentRequired { request_id: 7 },
            "payment_required",
        ),
        (
            DomainError::PaymentAlreadyConfirmed { request_id: 7 },
            "payment_already_confirmed",
        ),
    ];

    for (err, kind) in cases {
        let translated: ApiError = translate_domain_error(err);
        assert!(matches!(
            translated,
            ApiError::DomainRuleViolation { .. }
        ));
        assert_eq!(translated.kind(), kind);
    }
}

#[test]
fn test_invalid_transition_is_its_own_kind() {
    let err = DomainError::InvalidTransition {
        from: String::from("completed"),
        action: String::from("cancel"),
        reason: String::from("only pending or assigned requests can be cancelled"),
    };

    let translated: ApiError = translate_core_error(CoreError::DomainViolation(err));

    assert_eq!(translated.kind(), "invalid_transition");
    assert!(translated.to_string().contains("completed"));
}

#[test]
fn test_missing_members_are_not_found() {
    let translated: ApiError = translate_domain_error(DomainError::CollectorNotFound(9));

    assert!(matches!(
        translated,
        ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Collector"
    ));
    assert_eq!(translated.kind(), "not_found");
}

#[test]
fn test_persistence_errors_map_to_api_kinds() {
    assert_eq!(
        translate_persistence_error(PersistenceError::RequestNotFound(3)).kind(),
        "not_found"
    );
    assert_eq!(
        translate_persistence_error(PersistenceError::ConcurrentModification {
            request_id: 3,
            expected_version: 1,
        })
        .kind(),
        "conflict"
    );

    let internal: ApiError =
        translate_persistence_error(PersistenceError::QueryFailed(String::from("boom")));
    assert_eq!(internal.kind(), "internal");
    assert!(internal.to_string().contains("boom"));
}

#[test]
fn test_auth_errors_convert() {
    let api: ApiError = AuthError::Unauthorized {
        action: String::from("delete_request"),
        required_role: String::from("admin role"),
    }
    .into();

    assert_eq!(api.kind(), "unauthorized");
    assert_eq!(
        api.to_string(),
        "Unauthorized: 'delete_request' requires admin role"
    );
}
