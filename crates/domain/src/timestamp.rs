// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamp helpers.
//!
//! All engine timestamps are UTC with whole-second precision.

use time::OffsetDateTime;

/// Drops the sub-second part of a timestamp.
#[must_use]
pub fn whole_seconds(timestamp: OffsetDateTime) -> OffsetDateTime {
    timestamp.replace_nanosecond(0).unwrap_or(timestamp)
}

/// Returns the calendar month of a timestamp as `YYYY-MM`.
#[must_use]
pub fn month_key(timestamp: OffsetDateTime) -> String {
    format!("{:04}-{:02}", timestamp.year(), u8::from(timestamp.month()))
}
