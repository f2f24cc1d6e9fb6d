//! Adopter preference set used to recommend pets.
//!
//! Every filtering dimension is optional: an empty list (or `None` for the
//! single-valued activity level) imposes no constraint. Living space and
//! experience are informational and never filter listings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ActivityLevel, AgeGroup, Experience, LivingSpace, Size, Species};

/// A user's stored preference set.
///
/// # Examples
///
/// ```
/// use adoption_backend::domain::{AdopterPreferences, Species};
///
/// let prefs = AdopterPreferences::builder().species([Species::Dog]).build();
/// assert!(!prefs.is_unconstrained());
/// assert!(AdopterPreferences::default().is_unconstrained());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AdopterPreferences {
    /// Acceptable species; empty means any.
    #[serde(alias = "petType")]
    pub species: Vec<Species>,
    /// Acceptable sizes; empty means any.
    #[serde(alias = "size")]
    pub sizes: Vec<Size>,
    /// Acceptable age groups; empty means any.
    #[serde(alias = "age")]
    pub age_groups: Vec<AgeGroup>,
    /// Required activity level; `None` means any.
    pub activity_level: Option<ActivityLevel>,
    /// Home the adopter can offer.
    pub living_space: Option<LivingSpace>,
    /// Adopter's prior experience.
    pub experience: Option<Experience>,
}

impl AdopterPreferences {
    /// Start a builder with every dimension unconstrained.
    pub fn builder() -> AdopterPreferencesBuilder {
        AdopterPreferencesBuilder::default()
    }

    /// True when no dimension filters listings.
    pub fn is_unconstrained(&self) -> bool {
        self.species.is_empty()
            && self.sizes.is_empty()
            && self.age_groups.is_empty()
            && self.activity_level.is_none()
    }

    /// Drop duplicate entries while keeping first-seen order.
    #[must_use]
    pub fn normalised(mut self) -> Self {
        dedup_in_order(&mut self.species);
        dedup_in_order(&mut self.sizes);
        dedup_in_order(&mut self.age_groups);
        self
    }
}

fn dedup_in_order<T: PartialEq + Copy>(values: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(values.len());
    values.retain(|value| {
        if seen.contains(value) {
            false
        } else {
            seen.push(*value);
            true
        }
    });
}

/// Builder for [`AdopterPreferences`].
#[derive(Debug, Default)]
pub struct AdopterPreferencesBuilder {
    inner: AdopterPreferences,
}

impl AdopterPreferencesBuilder {
    /// Set acceptable species.
    pub fn species(mut self, species: impl IntoIterator<Item = Species>) -> Self {
        self.inner.species = species.into_iter().collect();
        self
    }

    /// Set acceptable sizes.
    pub fn sizes(mut self, sizes: impl IntoIterator<Item = Size>) -> Self {
        self.inner.sizes = sizes.into_iter().collect();
        self
    }

    /// Set acceptable age groups.
    pub fn age_groups(mut self, groups: impl IntoIterator<Item = AgeGroup>) -> Self {
        self.inner.age_groups = groups.into_iter().collect();
        self
    }

    /// Require an activity level.
    pub fn activity_level(mut self, level: ActivityLevel) -> Self {
        self.inner.activity_level = Some(level);
        self
    }

    /// Record the adopter's living space.
    pub fn living_space(mut self, space: LivingSpace) -> Self {
        self.inner.living_space = Some(space);
        self
    }

    /// Record the adopter's experience.
    pub fn experience(mut self, experience: Experience) -> Self {
        self.inner.experience = Some(experience);
        self
    }

    /// Finish building, removing duplicate entries.
    pub fn build(self) -> AdopterPreferences {
        self.inner.normalised()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn accepts_legacy_field_names() {
        let prefs: AdopterPreferences = serde_json::from_value(json!({
            "petType": ["dog", "cat"],
            "size": ["small"],
            "age": ["young"],
            "livingSpace": "house-large-yard",
        }))
        .expect("legacy payload parses");

        assert_eq!(prefs.species, vec![Species::Dog, Species::Cat]);
        assert_eq!(prefs.sizes, vec![Size::Small]);
        assert_eq!(prefs.age_groups, vec![AgeGroup::Young]);
        assert_eq!(prefs.living_space, Some(LivingSpace::HouseLargeYard));
    }

    #[rstest]
    fn missing_fields_default_to_unconstrained() {
        let prefs: AdopterPreferences = serde_json::from_value(json!({})).expect("empty object");
        assert!(prefs.is_unconstrained());
    }

    #[rstest]
    fn informational_fields_do_not_constrain() {
        let prefs = AdopterPreferences::builder()
            .living_space(LivingSpace::Apartment)
            .experience(Experience::FirstTime)
            .build();
        assert!(prefs.is_unconstrained());
    }

    #[rstest]
    fn builder_removes_duplicates() {
        let prefs = AdopterPreferences::builder()
            .sizes([Size::Large, Size::Small, Size::Large])
            .build();
        assert_eq!(prefs.sizes, vec![Size::Large, Size::Small]);
    }
}
