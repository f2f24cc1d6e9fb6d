//! Recommendation filter matching listed pets against a preference set.

use super::{AdopterPreferences, Pet, UserId};

fn admits<T: PartialEq>(allowed: &[T], value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

/// True when `pet` satisfies every non-empty preference dimension.
pub fn matches(preferences: &AdopterPreferences, pet: &Pet) -> bool {
    admits(&preferences.species, &pet.species)
        && admits(&preferences.sizes, &pet.size)
        && admits(&preferences.age_groups, &pet.age_group())
        && preferences
            .activity_level
            .is_none_or(|level| level == pet.activity_level)
}

/// Select the listed pets `viewer` should see, oldest listing first.
///
/// Removed, unavailable and the viewer's own pets are never recommended.
/// With no preferences set this degrades to every other listed pet.
pub fn recommend(
    preferences: &AdopterPreferences,
    viewer: &UserId,
    candidates: impl IntoIterator<Item = Pet>,
) -> Vec<Pet> {
    let mut selected: Vec<Pet> = candidates
        .into_iter()
        .filter(|pet| pet.is_listed() && pet.owner_id != *viewer && matches(preferences, pet))
        .collect();
    selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    selected
}
