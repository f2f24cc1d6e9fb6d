//! Closed vocabularies used by pet listings and adopter preferences.
//!
//! Each enum round-trips through the same lowercase (or kebab-case) string in
//! JSON, in the database, and in query strings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when parsing an unknown vocabulary value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {input}")]
pub struct ParseVocabularyError {
    /// Vocabulary being parsed, e.g. `species`.
    pub kind: &'static str,
    /// The unrecognised input value.
    pub input: String,
}

macro_rules! define_vocabulary {
    (
        $(#[$outer:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$variant_meta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable string form used on the wire and in storage.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseVocabularyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseVocabularyError {
                        kind: $kind,
                        input: s.to_owned(),
                    }),
                }
            }
        }
    };
}

define_vocabulary! {
    /// Kind of animal offered for adoption.
    Species ("species") {
        Dog => "dog",
        Cat => "cat",
        Bird => "bird",
        Rabbit => "rabbit",
        Other => "other",
    }
}

define_vocabulary! {
    /// Adult size of the animal.
    Size ("size") {
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
}

define_vocabulary! {
    /// Sex of the animal.
    Gender ("gender") {
        Male => "male",
        Female => "female",
    }
}

define_vocabulary! {
    /// How much exercise and attention the animal needs.
    ActivityLevel ("activity level") {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

define_vocabulary! {
    /// Age bucket derived from a pet's age in years.
    AgeGroup ("age group") {
        /// 0 to 2 years.
        Young => "young",
        /// 3 to 7 years.
        Adult => "adult",
        /// 8 years and older.
        Senior => "senior",
    }
}

define_vocabulary! {
    /// Home an adopter can offer.
    LivingSpace ("living space") {
        Apartment => "apartment",
        HouseNoYard => "house-no-yard",
        HouseSmallYard => "house-small-yard",
        HouseLargeYard => "house-large-yard",
        Farm => "farm",
    }
}

define_vocabulary! {
    /// Adopter's prior experience with pets.
    Experience ("experience") {
        FirstTime => "first-time",
        Intermediate => "some",
        Experienced => "experienced",
        Professional => "professional",
    }
}

impl AgeGroup {
    /// Bucket an age in whole years.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::AgeGroup;
    ///
    /// assert_eq!(AgeGroup::for_age(2), AgeGroup::Young);
    /// assert_eq!(AgeGroup::for_age(3), AgeGroup::Adult);
    /// assert_eq!(AgeGroup::for_age(8), AgeGroup::Senior);
    /// ```
    pub const fn for_age(years: u16) -> Self {
        match years {
            0..=2 => Self::Young,
            3..=7 => Self::Adult,
            _ => Self::Senior,
        }
    }
}
