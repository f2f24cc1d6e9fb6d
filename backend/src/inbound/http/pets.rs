//! Pet listing handlers.
//!
//! ```text
//! POST   /api/v1/pets
//! GET    /api/v1/pets
//! GET    /api/v1/pets/{id}
//! PUT    /api/v1/pets/{id}
//! DELETE /api/v1/pets/{id}
//! GET    /api/v1/users/{id}/pets
//! GET    /api/v1/users/me/recommendations?species=dog,cat&sizes=small
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ActivityLevel, AdopterPreferences, AgeGroup, Error, Experience, Gender, LivingSpace, Pet,
    PetAttributes, PetDraft, PetId, Size, Species, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_choice, parse_choice_list, parse_id};

/// Listing body for create and update.
///
/// Missing fields deserialise as blank so the domain reports which one is
/// absent.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PetRequest {
    #[schema(example = "Rex")]
    pub name: String,
    pub species: Option<Species>,
    #[schema(example = "Collie")]
    pub breed: String,
    pub size: Option<Size>,
    #[serde(alias = "age")]
    pub age_years: Option<i64>,
    pub gender: Option<Gender>,
    pub description: String,
    pub images: Vec<String>,
    pub activity_level: Option<ActivityLevel>,
    pub good_with_kids: bool,
    pub good_with_pets: bool,
    pub house_trained: bool,
    pub medical_info: Option<String>,
    /// Fee in cents; absent means free.
    pub adoption_fee_cents: Option<i64>,
    pub location: String,
    /// Omit to keep the current availability (or open a new listing).
    pub is_available: Option<bool>,
}

impl From<PetRequest> for PetDraft {
    fn from(value: PetRequest) -> Self {
        Self {
            name: value.name,
            species: value.species,
            breed: value.breed,
            size: value.size,
            age_years: value.age_years,
            gender: value.gender,
            description: value.description,
            images: value.images,
            activity_level: value.activity_level,
            good_with_kids: value.good_with_kids,
            good_with_pets: value.good_with_pets,
            house_trained: value.house_trained,
            medical_info: value.medical_info,
            adoption_fee_cents: value.adoption_fee_cents,
            location: value.location,
            is_available: value.is_available,
        }
    }
}

fn attributes_from(payload: web::Json<PetRequest>) -> Result<PetAttributes, Error> {
    Ok(PetAttributes::try_from_draft(payload.into_inner().into())?)
}

/// Explicit preference filter for recommendations.
///
/// List parameters take comma-separated values. When every parameter is
/// omitted the caller's stored preferences apply.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// e.g. `dog,cat`
    pub species: Option<String>,
    /// e.g. `small,medium`
    pub sizes: Option<String>,
    /// e.g. `young,adult`
    pub age_groups: Option<String>,
    pub activity_level: Option<String>,
    pub living_space: Option<String>,
    pub experience: Option<String>,
}

impl RecommendationQuery {
    fn is_empty(&self) -> bool {
        self.species.is_none()
            && self.sizes.is_none()
            && self.age_groups.is_none()
            && self.activity_level.is_none()
            && self.living_space.is_none()
            && self.experience.is_none()
    }

    fn into_preferences(self) -> Result<Option<AdopterPreferences>, Error> {
        if self.is_empty() {
            return Ok(None);
        }
        let species: Vec<Species> =
            parse_choice_list(self.species.as_deref(), FieldName::new("species"))?;
        let sizes: Vec<Size> = parse_choice_list(self.sizes.as_deref(), FieldName::new("sizes"))?;
        let age_groups: Vec<AgeGroup> =
            parse_choice_list(self.age_groups.as_deref(), FieldName::new("ageGroups"))?;
        let mut builder = AdopterPreferences::builder()
            .species(species)
            .sizes(sizes)
            .age_groups(age_groups);
        if let Some(raw) = self.activity_level.as_deref() {
            builder =
                builder.activity_level(parse_choice(raw, FieldName::new("activityLevel"))?);
        }
        if let Some(raw) = self.living_space.as_deref() {
            let space: LivingSpace = parse_choice(raw, FieldName::new("livingSpace"))?;
            builder = builder.living_space(space);
        }
        if let Some(raw) = self.experience.as_deref() {
            let experience: Experience = parse_choice(raw, FieldName::new("experience"))?;
            builder = builder.experience(experience);
        }
        Ok(Some(builder.build()))
    }
}

/// Publish a listing owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/pets",
    request_body = PetRequest,
    responses(
        (status = 201, description = "Listing created", body = Pet),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["pets"],
    operation_id = "createPet"
)]
#[post("/pets")]
pub async fn create_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PetRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let attributes = attributes_from(payload)?;
    let pet = state.pet_command.create(&owner, attributes).await?;
    Ok(HttpResponse::Created().json(pet))
}

/// Available listings, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/pets",
    responses(
        (status = 200, description = "Available listings", body = [Pet]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["pets"],
    operation_id = "listPets"
)]
#[get("/pets")]
pub async fn list_pets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Pet>>> {
    session.require_user_id()?;
    Ok(web::Json(state.pets.list_available().await?))
}

/// One listing; removed listings are reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}",
    params(("id" = String, Path, description = "Pet identifier")),
    responses(
        (status = 200, description = "Listing", body = Pet),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "No such listing", body = Error)
    ),
    tags = ["pets"],
    operation_id = "getPet"
)]
#[get("/pets/{id}")]
pub async fn get_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Pet>> {
    session.require_user_id()?;
    let id: PetId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(state.pets.get(&id).await?))
}

/// Replace a listing's attributes. Owner only.
#[utoipa::path(
    put,
    path = "/api/v1/pets/{id}",
    params(("id" = String, Path, description = "Pet identifier")),
    request_body = PetRequest,
    responses(
        (status = 200, description = "Updated listing", body = Pet),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "No such listing", body = Error)
    ),
    tags = ["pets"],
    operation_id = "updatePet"
)]
#[put("/pets/{id}")]
pub async fn update_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PetRequest>,
) -> ApiResult<web::Json<Pet>> {
    let caller = session.require_user_id()?;
    let id: PetId = parse_id(&path, FieldName::new("id"))?;
    let attributes = attributes_from(payload)?;
    Ok(web::Json(
        state.pet_command.update(&id, &caller, attributes).await?,
    ))
}

/// Soft-remove a listing. Owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/pets/{id}",
    params(("id" = String, Path, description = "Pet identifier")),
    responses(
        (status = 204, description = "Listing removed"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "No such listing", body = Error)
    ),
    tags = ["pets"],
    operation_id = "deletePet"
)]
#[delete("/pets/{id}")]
pub async fn delete_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id: PetId = parse_id(&path, FieldName::new("id"))?;
    state.pet_command.remove(&id, &caller).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Listings published by one owner.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/pets",
    params(("id" = String, Path, description = "Owner identifier")),
    responses(
        (status = 200, description = "Owner's listings", body = [Pet]),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["pets"],
    operation_id = "listPetsByOwner"
)]
#[get("/users/{id}/pets")]
pub async fn list_owner_pets(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Pet>>> {
    session.require_user_id()?;
    let owner: UserId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(state.pets.list_by_owner(&owner).await?))
}

/// Available listings matching explicit or stored preferences.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/recommendations",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Matching listings", body = [Pet]),
        (status = 400, description = "Unknown preference value", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["pets"],
    operation_id = "recommendPets"
)]
#[get("/users/me/recommendations")]
pub async fn recommendations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RecommendationQuery>,
) -> ApiResult<web::Json<Vec<Pet>>> {
    let viewer = session.require_user_id()?;
    let preferences = query.into_inner().into_preferences()?;
    Ok(web::Json(state.pets.recommend(&viewer, preferences).await?))
}
