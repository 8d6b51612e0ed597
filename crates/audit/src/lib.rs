// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit trail types.
//!
//! Every successful mutation in the billing engine produces exactly one
//! [`AuditEvent`]. Events record who acted, why, what was done, and the
//! entity before and after the change.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use serde::{Deserialize, Serialize};

/// Actor type recorded for actions the service performs on its own behalf.
pub const SYSTEM_ACTOR_TYPE: &str = "system";

/// Represents the entity performing an action.
///
/// For members this is the member id and role; for the service itself
/// it is [`Actor::system`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "resident", "collector", "admin", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The service acting on its own behalf (startup provisioning).
    #[must_use]
    pub fn system() -> Self {
        Self::new(
            String::from(SYSTEM_ACTOR_TYPE),
            String::from(SYSTEM_ACTOR_TYPE),
        )
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., HTTP request id).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`AssignCollector`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Serialized view of an entity at one point in time.
///
/// An empty snapshot means the entity did not exist (before creation or
/// after deletion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Snapshot of an entity that does not exist.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            data: String::new(),
        }
    }

    /// Returns true if this snapshot records no entity.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.data.is_empty()
    }
}

/// The kind of entity an audit event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Member,
    Request,
    CollectionRecord,
    Invoice,
}

impl SubjectKind {
    /// Returns the string representation used in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Request => "request",
            Self::CollectionRecord => "collection_record",
            Self::Invoice => "invoice",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "request" => Some(Self::Request),
            "collection_record" => Some(Self::CollectionRecord),
            "invoice" => Some(Self::Invoice),
            _ => None,
        }
    }
}

/// The entity an audit event concerns.
///
/// The id is `None` while the entity is being created; persistence fills
/// it in once the entity has been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSubject {
    pub kind: SubjectKind,
    pub id: Option<i64>,
}

impl AuditSubject {
    /// Creates a subject reference.
    #[must_use]
    pub const fn new(kind: SubjectKind, id: Option<i64>) -> Self {
        Self { kind, id }
    }
}

/// An immutable audit event representing a state transition.
///
/// Audit events capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The entity before and after the transition
/// - Which entity was affected (subject)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Database identifier. `None` until persisted.
    pub event_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    pub subject: AuditSubject,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The entity before the transition
    /// * `after` - The entity after the transition
    /// * `subject` - The affected entity
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        subject: AuditSubject,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            subject,
        }
    }

    /// Returns the event with the subject id set.
    #[must_use]
    pub fn for_subject_id(mut self, subject_id: i64) -> Self {
        self.subject.id = Some(subject_id);
        self
    }
}
