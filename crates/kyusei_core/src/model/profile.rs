//! Birth profile domain model.
//!
//! # Responsibility
//! - Define the user-managed birth profile used as board engine input.
//! - Provide the anonymous placeholder used when no profile is selected.
//!
//! # Invariants
//! - `id` is stable and never reused for another profile.
//! - `birth_date` carries day-granularity meaning; time-of-day is ignored
//!   when comparing profiles.
//! - Profiles are never mutated after creation, only replaced or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one birth profile.
pub type ProfileId = Uuid;

/// User-managed birth-date profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Stable ID used for selection references.
    pub id: ProfileId,
    /// Display name; may be empty.
    pub name: String,
    /// Birth instant. Only its calendar day is meaningful.
    pub birth_date: DateTime<Utc>,
    /// Creation instant; drives list ordering (newest first).
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a new profile with a generated ID and `created_at = now`.
    pub fn new(name: impl Into<String>, birth_date: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), name, birth_date, Utc::now())
    }

    /// Creates a profile with caller-provided identity and creation time.
    ///
    /// Used by persistence decode paths and deterministic tests.
    pub fn with_id(
        id: ProfileId,
        name: impl Into<String>,
        birth_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            birth_date,
            created_at,
        }
    }

    /// Placeholder profile used for board computation when none is selected.
    ///
    /// Nil ID, empty name, birth date and creation time at the Unix epoch.
    pub fn anonymous() -> Self {
        Self::with_id(
            Uuid::nil(),
            "",
            DateTime::<Utc>::UNIX_EPOCH,
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    /// Returns whether this is the anonymous placeholder.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_nil()
    }
}
