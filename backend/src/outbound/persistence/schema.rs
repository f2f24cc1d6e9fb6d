//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate them
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts, one per identity-provider subject.
    users (id) {
        id -> Uuid,
        /// Identity-provider subject; unique.
        subject -> Varchar,
        name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        location -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        /// Serialised adopter preference set.
        preferences -> Jsonb,
        created_at -> Timestamptz,
        /// Set when the account is closed; closed rows are anonymised.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Pet listings. Rows are soft-removed, never deleted.
    pets (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        species -> Varchar,
        breed -> Varchar,
        size -> Varchar,
        age_years -> Int2,
        gender -> Varchar,
        description -> Text,
        images -> Array<Text>,
        activity_level -> Varchar,
        good_with_kids -> Bool,
        good_with_pets -> Bool,
        house_trained -> Bool,
        medical_info -> Nullable<Text>,
        adoption_fee_cents -> Nullable<Int8>,
        location -> Varchar,
        is_available -> Bool,
        is_removed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Adoption applications.
    ///
    /// A partial unique index on `(pet_id, applicant_id)` covers rows whose
    /// status is `pending` or `accepted`.
    applications (id) {
        id -> Uuid,
        pet_id -> Uuid,
        applicant_id -> Uuid,
        owner_id -> Uuid,
        questionnaire -> Jsonb,
        status -> Varchar,
        created_at -> Timestamptz,
        decided_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only application transcripts.
    messages (id) {
        id -> Uuid,
        application_id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
        seq -> Int8,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        title -> Varchar,
        body -> Text,
        related_id -> Nullable<Uuid>,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(pets -> users (owner_id));
diesel::joinable!(applications -> pets (pet_id));
diesel::joinable!(messages -> applications (application_id));
diesel::joinable!(notifications -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, pets, applications, messages, notifications);
