// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::info;
use waste_billing::MemberResult;
use waste_billing_audit::AuditEvent;
use waste_billing_domain::Member;

use crate::backend::PersistenceBackend;
use crate::convert::to_unix;
use crate::data_models::NewMember;
use crate::diesel_schema::members;
use crate::error::PersistenceError;
use crate::mutations::Persisted;
use crate::mutations::audit::persist_audit_event;

/// Persists a newly registered member and its audit event.
///
/// # Errors
///
/// Returns an error if either insert fails; nothing is written in that case.
pub fn persist_member(
    conn: &mut SqliteConnection,
    result: &MemberResult,
    now: OffsetDateTime,
) -> Result<Persisted<Member>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let new_member: NewMember<'_> = NewMember {
            display_name: &result.member.display_name,
            role: result.member.role.as_str(),
            created_at: to_unix(now),
        };
        diesel::insert_into(members::table)
            .values(&new_member)
            .execute(conn)?;
        let member_id: i64 = conn.get_last_insert_rowid()?;

        let event: AuditEvent = result.audit_event.clone().for_subject_id(member_id);
        let event_id: i64 = persist_audit_event(conn, &event, now)?;

        info!(
            member_id,
            role = result.member.role.as_str(),
            event_id,
            "Registered member"
        );

        Ok(Persisted {
            value: Member::with_id(
                member_id,
                result.member.display_name.clone(),
                result.member.role,
            ),
            event_id,
        })
    })
}
