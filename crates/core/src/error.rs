// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use waste_billing_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The command was routed to a transition function that does not handle it.
    CommandNotApplicable {
        /// The command name.
        command: String,
        /// The transition function that received it.
        handler: String,
    },
    /// An entity could not be captured for the audit trail.
    SnapshotFailed(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::CommandNotApplicable { command, handler } => {
                write!(f, "Command {command} cannot be applied by {handler}")
            }
            Self::SnapshotFailed(msg) => write!(f, "Failed to capture snapshot: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
