//! Profile list and active selection.
//!
//! # Responsibility
//! - Own the ordered profile list and the optional selected ID.
//! - Report what changed so the coordinator can persist precisely.
//!
//! # Invariants
//! - After every mutation, `selected_profile_id` is `None` iff `profiles`
//!   is empty, and otherwise refers to a listed profile.
//! - The list is sorted by `created_at` descending after every insert.
//! - At most one profile exists per birth calendar day.

use crate::model::calendar::is_same_calendar_day;
use crate::model::profile::{Profile, ProfileId};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeSet;

/// Change report returned by every `ProfileStore` mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileMutation {
    pub profiles_changed: bool,
    pub selection_changed: bool,
}

/// Result of `ProfileStore::add_profile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedProfile {
    /// Selected profile after the call (new or pre-existing).
    pub id: ProfileId,
    /// `false` when an existing same-day profile was re-selected.
    pub created: bool,
    pub mutation: ProfileMutation,
}

/// Returns the corrected selection for `profiles`.
///
/// Keeps `selected` when it is listed; otherwise falls back to the first
/// profile, or `None` for an empty list.
pub fn normalize_selection(
    profiles: &[Profile],
    selected: Option<ProfileId>,
) -> Option<ProfileId> {
    selected
        .filter(|id| profiles.iter().any(|profile| profile.id == *id))
        .or_else(|| profiles.first().map(|profile| profile.id))
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
    selected_profile_id: Option<ProfileId>,
    zone: FixedOffset,
}

impl ProfileStore {
    /// Builds a store from loaded data without normalizing.
    ///
    /// Callers run `normalize()` once loading has finished.
    pub fn new(
        profiles: Vec<Profile>,
        selected_profile_id: Option<ProfileId>,
        zone: FixedOffset,
    ) -> Self {
        Self {
            profiles,
            selected_profile_id,
            zone,
        }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn selected_profile_id(&self) -> Option<ProfileId> {
        self.selected_profile_id
    }

    pub fn selected_profile(&self) -> Option<&Profile> {
        let id = self.selected_profile_id?;
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// Adds a profile for `birth_date`, or re-selects the same-day one.
    pub fn add_profile(
        &mut self,
        birth_date: DateTime<Utc>,
        name: impl Into<String>,
    ) -> AddedProfile {
        self.add_prepared(Profile::new(name, birth_date))
    }

    /// Same as `add_profile` with caller-built identity and timestamps.
    ///
    /// Dedup only looks at `profile.birth_date`; the candidate is dropped
    /// when a same-day profile already exists.
    pub fn add_prepared(&mut self, profile: Profile) -> AddedProfile {
        let previous = self.selected_profile_id;

        if let Some(existing) = self
            .profiles
            .iter()
            .find(|p| is_same_calendar_day(p.birth_date, profile.birth_date, self.zone))
        {
            let id = existing.id;
            self.selected_profile_id = Some(id);
            return AddedProfile {
                id,
                created: false,
                mutation: ProfileMutation {
                    profiles_changed: false,
                    selection_changed: previous != Some(id),
                },
            };
        }

        let id = profile.id;
        self.profiles.push(profile);
        // Stable sort keeps insertion order among equal timestamps.
        self.profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.selected_profile_id = Some(id);

        AddedProfile {
            id,
            created: true,
            mutation: ProfileMutation {
                profiles_changed: true,
                selection_changed: previous != Some(id),
            },
        }
    }

    /// Removes every profile whose ID is listed.
    pub fn delete_profiles(&mut self, ids: &[ProfileId]) -> ProfileMutation {
        let doomed = ids.iter().copied().collect::<BTreeSet<_>>();
        let previous_len = self.profiles.len();
        self.profiles.retain(|profile| !doomed.contains(&profile.id));
        self.finish_structural_change(previous_len != self.profiles.len())
    }

    /// Removes profiles by list position; out-of-range offsets are ignored.
    pub fn delete_profiles_at(&mut self, offsets: &[usize]) -> ProfileMutation {
        let ids = offsets
            .iter()
            .filter_map(|&offset| self.profiles.get(offset).map(|profile| profile.id))
            .collect::<Vec<_>>();
        self.delete_profiles(&ids)
    }

    /// Selects `id`; an unknown ID is corrected by normalization.
    pub fn select_profile(&mut self, id: ProfileId) -> ProfileMutation {
        let previous = self.selected_profile_id;
        self.selected_profile_id = Some(id);
        self.normalize();
        ProfileMutation {
            profiles_changed: false,
            selection_changed: previous != self.selected_profile_id,
        }
    }

    /// Applies `normalize_selection`; returns whether the selection changed.
    pub fn normalize(&mut self) -> bool {
        let normalized = normalize_selection(&self.profiles, self.selected_profile_id);
        let changed = normalized != self.selected_profile_id;
        self.selected_profile_id = normalized;
        changed
    }

    fn finish_structural_change(&mut self, profiles_changed: bool) -> ProfileMutation {
        let selection_changed = self.normalize();
        ProfileMutation {
            profiles_changed,
            selection_changed,
        }
    }
}
