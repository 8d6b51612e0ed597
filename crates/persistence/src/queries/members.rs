// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use waste_billing_domain::{Member, Role};

use crate::convert::parse_column;
use crate::diesel_schema::members;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = members)]
struct MemberRow {
    member_id: i64,
    display_name: String,
    role: String,
}

impl TryFrom<MemberRow> for Member {
    type Error = PersistenceError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let role: Role = parse_column("role", &row.role)?;
        Ok(Self::with_id(row.member_id, row.display_name, role))
    }
}

/// Retrieves a member by ID.
///
/// # Errors
///
/// Returns `PersistenceError::MemberNotFound` if no such member exists.
pub fn get_member(conn: &mut SqliteConnection, member_id: i64) -> Result<Member, PersistenceError> {
    let row: Option<MemberRow> = members::table
        .filter(members::member_id.eq(member_id))
        .select(MemberRow::as_select())
        .first::<MemberRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_member: {e}")))?;

    row.map_or(Err(PersistenceError::MemberNotFound(member_id)), Member::try_from)
}

/// Retrieves the members among `member_ids` that exist.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_members(
    conn: &mut SqliteConnection,
    member_ids: &[i64],
) -> Result<Vec<Member>, PersistenceError> {
    members::table
        .filter(members::member_id.eq_any(member_ids))
        .order(members::member_id.asc())
        .select(MemberRow::as_select())
        .load::<MemberRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("find_members: {e}")))?
        .into_iter()
        .map(Member::try_from)
        .collect()
}

/// Lists members, optionally only those with one role, by ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_members(
    conn: &mut SqliteConnection,
    role: Option<Role>,
) -> Result<Vec<Member>, PersistenceError> {
    let mut query = members::table.into_boxed();
    if let Some(role) = role {
        query = query.filter(members::role.eq(role.as_str()));
    }

    query
        .order(members::member_id.asc())
        .select(MemberRow::as_select())
        .load::<MemberRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_members: {e}")))?
        .into_iter()
        .map(Member::try_from)
        .collect()
}

/// Counts registered members.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_members(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    members::table
        .count()
        .get_result::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("count_members: {e}")))
}
