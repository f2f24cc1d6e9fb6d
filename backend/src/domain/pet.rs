//! Pet listings.
//!
//! A listing is created by its owner from a [`PetDraft`], validated into
//! [`PetAttributes`], and from then on only the owner may replace those
//! attributes or soft-remove the listing. `owner_id` never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, optional_text, required_text};
use super::{ActivityLevel, AgeGroup, Gender, PetId, Size, Species, UserId};

const NAME_MAX: usize = 80;
const BREED_MAX: usize = 80;
const DESCRIPTION_MAX: usize = 4000;
const MEDICAL_MAX: usize = 2000;
const LOCATION_MAX: usize = 120;
const IMAGE_URL_MAX: usize = 2048;
const IMAGES_MAX: usize = 10;
const AGE_MAX: i64 = 40;
const FEE_MAX_CENTS: i64 = 10_000_000;

/// Unvalidated listing attributes as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetDraft {
    /// Pet name.
    pub name: String,
    /// Species, if chosen.
    pub species: Option<Species>,
    /// Breed description.
    pub breed: String,
    /// Size, if chosen.
    pub size: Option<Size>,
    /// Age in whole years, if given.
    pub age_years: Option<i64>,
    /// Gender, if chosen.
    pub gender: Option<Gender>,
    /// Free-text description.
    pub description: String,
    /// Image references supplied by the upload service.
    pub images: Vec<String>,
    /// Activity level, if chosen.
    pub activity_level: Option<ActivityLevel>,
    /// Whether the pet is good with children.
    pub good_with_kids: bool,
    /// Whether the pet is good with other animals.
    pub good_with_pets: bool,
    /// Whether the pet is house-trained.
    pub house_trained: bool,
    /// Medical notes.
    pub medical_info: Option<String>,
    /// Adoption fee in cents.
    pub adoption_fee_cents: Option<i64>,
    /// Where the pet can be collected.
    pub location: String,
    /// Whether the listing is open; new listings default to open.
    pub is_available: Option<bool>,
}

/// Validated listing attributes.
///
/// ## Invariants
/// - text fields are trimmed and non-blank (medical info may be absent);
/// - `images` holds between one and ten non-blank references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetAttributes {
    name: String,
    species: Species,
    breed: String,
    size: Size,
    age_years: u16,
    gender: Gender,
    description: String,
    images: Vec<String>,
    activity_level: ActivityLevel,
    good_with_kids: bool,
    good_with_pets: bool,
    house_trained: bool,
    medical_info: Option<String>,
    adoption_fee_cents: Option<i64>,
    location: String,
    is_available: Option<bool>,
}

fn required_choice<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Blank { field })
}

fn validate_age(age: Option<i64>) -> Result<u16, ValidationError> {
    let age = required_choice("age", age)?;
    if !(0..=AGE_MAX).contains(&age) {
        return Err(ValidationError::OutOfRange {
            field: "age",
            min: 0,
            max: AGE_MAX,
        });
    }
    u16::try_from(age).map_err(|_| ValidationError::OutOfRange {
        field: "age",
        min: 0,
        max: AGE_MAX,
    })
}

fn validate_fee(fee: Option<i64>) -> Result<Option<i64>, ValidationError> {
    match fee {
        Some(cents) if !(0..=FEE_MAX_CENTS).contains(&cents) => Err(ValidationError::OutOfRange {
            field: "adoptionFeeCents",
            min: 0,
            max: FEE_MAX_CENTS,
        }),
        other => Ok(other),
    }
}

fn validate_images(images: &[String]) -> Result<Vec<String>, ValidationError> {
    if images.is_empty() {
        return Err(ValidationError::Empty { field: "images" });
    }
    if images.len() > IMAGES_MAX {
        return Err(ValidationError::Invalid {
            field: "images",
            reason: format!("at most {IMAGES_MAX} images may be attached"),
        });
    }
    images
        .iter()
        .map(|image| required_text("images", image, IMAGE_URL_MAX))
        .collect()
}

impl PetAttributes {
    /// Validate a draft. Fails on the first offending field.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::{PetAttributes, PetDraft};
    ///
    /// let err = PetAttributes::try_from_draft(PetDraft::default()).expect_err("empty draft");
    /// assert_eq!(err.field(), "name");
    /// ```
    pub fn try_from_draft(draft: PetDraft) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", &draft.name, NAME_MAX)?,
            species: required_choice("species", draft.species)?,
            breed: required_text("breed", &draft.breed, BREED_MAX)?,
            size: required_choice("size", draft.size)?,
            age_years: validate_age(draft.age_years)?,
            gender: required_choice("gender", draft.gender)?,
            description: required_text("description", &draft.description, DESCRIPTION_MAX)?,
            activity_level: required_choice("activityLevel", draft.activity_level)?,
            location: required_text("location", &draft.location, LOCATION_MAX)?,
            images: validate_images(&draft.images)?,
            good_with_kids: draft.good_with_kids,
            good_with_pets: draft.good_with_pets,
            house_trained: draft.house_trained,
            medical_info: optional_text("medicalInfo", draft.medical_info.as_deref(), MEDICAL_MAX)?,
            adoption_fee_cents: validate_fee(draft.adoption_fee_cents)?,
            is_available: draft.is_available,
        })
    }
}

/// A pet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Listing identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: PetId,
    /// Owner; immutable after creation.
    #[schema(value_type = String, format = Uuid)]
    pub owner_id: UserId,
    /// Pet name.
    pub name: String,
    /// Species.
    pub species: Species,
    /// Breed description.
    pub breed: String,
    /// Size.
    pub size: Size,
    /// Age in whole years.
    pub age_years: u16,
    /// Gender.
    pub gender: Gender,
    /// Free-text description.
    pub description: String,
    /// Image references; never empty.
    pub images: Vec<String>,
    /// Activity level.
    pub activity_level: ActivityLevel,
    /// Good with children.
    pub good_with_kids: bool,
    /// Good with other animals.
    pub good_with_pets: bool,
    /// House-trained.
    pub house_trained: bool,
    /// Medical notes.
    pub medical_info: Option<String>,
    /// Adoption fee in cents.
    pub adoption_fee_cents: Option<i64>,
    /// Collection location.
    pub location: String,
    /// Open for adoption.
    pub is_available: bool,
    /// Soft-removed by the owner; removed listings are never served.
    #[serde(skip)]
    pub is_removed: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Create a listing owned by `owner_id`.
    pub fn new(id: PetId, owner_id: UserId, attributes: PetAttributes, now: DateTime<Utc>) -> Self {
        let PetAttributes {
            name,
            species,
            breed,
            size,
            age_years,
            gender,
            description,
            images,
            activity_level,
            good_with_kids,
            good_with_pets,
            house_trained,
            medical_info,
            adoption_fee_cents,
            location,
            is_available,
        } = attributes;
        Self {
            id,
            owner_id,
            name,
            species,
            breed,
            size,
            age_years,
            gender,
            description,
            images,
            activity_level,
            good_with_kids,
            good_with_pets,
            house_trained,
            medical_info,
            adoption_fee_cents,
            location,
            is_available: is_available.unwrap_or(true),
            is_removed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every descriptive attribute, keeping identity and owner.
    ///
    /// Availability is only changed when the update names it.
    pub fn apply(&mut self, attributes: PetAttributes, now: DateTime<Utc>) {
        let PetAttributes {
            name,
            species,
            breed,
            size,
            age_years,
            gender,
            description,
            images,
            activity_level,
            good_with_kids,
            good_with_pets,
            house_trained,
            medical_info,
            adoption_fee_cents,
            location,
            is_available,
        } = attributes;
        self.name = name;
        self.species = species;
        self.breed = breed;
        self.size = size;
        self.age_years = age_years;
        self.gender = gender;
        self.description = description;
        self.images = images;
        self.activity_level = activity_level;
        self.good_with_kids = good_with_kids;
        self.good_with_pets = good_with_pets;
        self.house_trained = house_trained;
        self.medical_info = medical_info;
        self.adoption_fee_cents = adoption_fee_cents;
        self.location = location;
        if let Some(available) = is_available {
            self.is_available = available;
        }
        self.updated_at = now;
    }

    /// Age bucket used by the recommendation filter.
    pub const fn age_group(&self) -> AgeGroup {
        AgeGroup::for_age(self.age_years)
    }

    /// True when the listing is visible and open for applications.
    pub const fn is_listed(&self) -> bool {
        self.is_available && !self.is_removed
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::dog_draft;
    use super::*;
    use rstest::rstest;

    fn with(mutate: impl FnOnce(&mut PetDraft)) -> PetDraft {
        let mut draft = dog_draft();
        mutate(&mut draft);
        draft
    }

    #[rstest]
    #[case(with(|d| d.name = "  ".to_owned()), "name")]
    #[case(with(|d| d.species = None), "species")]
    #[case(with(|d| d.breed = String::new()), "breed")]
    #[case(with(|d| d.size = None), "size")]
    #[case(with(|d| d.age_years = None), "age")]
    #[case(with(|d| d.gender = None), "gender")]
    #[case(with(|d| d.description = "\t".to_owned()), "description")]
    #[case(with(|d| d.activity_level = None), "activityLevel")]
    #[case(with(|d| d.location = " ".to_owned()), "location")]
    #[case(with(|d| d.images.clear()), "images")]
    #[case(with(|d| d.images = vec![" ".to_owned()]), "images")]
    #[case(with(|d| d.age_years = Some(-1)), "age")]
    #[case(with(|d| d.adoption_fee_cents = Some(-5)), "adoptionFeeCents")]
    fn drafts_missing_required_fields_are_rejected(
        #[case] draft: PetDraft,
        #[case] field: &str,
    ) {
        let err = PetAttributes::try_from_draft(draft).expect_err("draft is invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn new_listings_default_to_available() {
        let now = Utc::now();
        let pet = fixtures::pet_from(UserId::random(), dog_draft(), now);
        assert!(pet.is_available);
        assert!(pet.is_listed());
        assert_eq!(pet.age_group(), AgeGroup::Adult);
    }

    #[rstest]
    fn apply_keeps_owner_and_only_changes_availability_when_named() {
        let owner = UserId::random();
        let created = Utc::now();
        let mut pet = fixtures::pet_from(owner, dog_draft(), created);

        let renamed = PetAttributes::try_from_draft(with(|d| d.name = "Max".to_owned()))
            .expect("valid draft");
        pet.apply(renamed, created + chrono::Duration::seconds(5));
        assert_eq!(pet.name, "Max");
        assert_eq!(pet.owner_id, owner);
        assert!(pet.is_available);

        let closed = PetAttributes::try_from_draft(with(|d| d.is_available = Some(false)))
            .expect("valid draft");
        pet.apply(closed, created + chrono::Duration::seconds(10));
        assert!(!pet.is_available);
        assert!(pet.updated_at > pet.created_at);
    }
}
