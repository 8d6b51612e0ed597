// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Billing settings shared by every handler.

use waste_billing_domain::{CompletionPolicy, RateTable};

/// The tariff and completion policy in force.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingSettings {
    /// Per-kilogram rates for every category.
    pub rate_table: RateTable,
    /// Whether completion waits for payment.
    pub completion_policy: CompletionPolicy,
}

impl BillingSettings {
    /// Creates settings from a rate table and completion policy.
    #[must_use]
    pub const fn new(rate_table: RateTable, completion_policy: CompletionPolicy) -> Self {
        Self {
            rate_table,
            completion_policy,
        }
    }
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self::new(RateTable::standard(), CompletionPolicy::default())
    }
}
