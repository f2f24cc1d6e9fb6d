//! Access-control predicates gating every mutation.
//!
//! Each predicate returns `Ok(())` to allow or an [`AccessDenied`] naming the
//! rule that failed. Ownership failures surface as `forbidden`; failures of
//! the entity's current state surface as `invalid_state`.

use serde_json::json;

use super::{Application, ApplicationStatus, Error, Notification, Pet, UserId};

/// Reason a predicate denied the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// Caller does not own the pet.
    #[error("only the pet's owner may change this listing")]
    NotPetOwner,
    /// Caller does not own the pet the application targets.
    #[error("only the pet's owner may decide on this application")]
    NotApplicationOwner,
    /// Caller is neither the applicant nor the owner.
    #[error("only the applicant and the owner may access this application")]
    NotParty,
    /// Caller is not the notification's recipient.
    #[error("only the recipient may update this notification")]
    NotRecipient,
    /// Caller tried to apply for their own pet.
    #[error("owners cannot apply for their own pets")]
    OwnPet,
    /// The pet is not open for applications.
    #[error("pet is not available for adoption")]
    PetUnavailable,
    /// The application has already been decided.
    #[error("application is already {0}")]
    NotPending(ApplicationStatus),
    /// Messaging requires an accepted application.
    #[error("messages can only be sent on accepted applications; this one is {0}")]
    NotAccepted(ApplicationStatus),
}

impl From<AccessDenied> for Error {
    fn from(value: AccessDenied) -> Self {
        let message = value.to_string();
        match value {
            AccessDenied::NotPetOwner
            | AccessDenied::NotApplicationOwner
            | AccessDenied::NotParty
            | AccessDenied::NotRecipient
            | AccessDenied::OwnPet => Error::forbidden(message),
            AccessDenied::PetUnavailable => Error::invalid_state(message)
                .with_details(json!({ "reason": "pet_unavailable" })),
            AccessDenied::NotPending(status) | AccessDenied::NotAccepted(status) => {
                Error::invalid_state(message).with_details(json!({ "status": status }))
            }
        }
    }
}

/// Pet update and delete require the caller to own the pet.
pub fn ensure_pet_owner(pet: &Pet, caller: &UserId) -> Result<(), AccessDenied> {
    if pet.owner_id == *caller {
        Ok(())
    } else {
        Err(AccessDenied::NotPetOwner)
    }
}

/// Applying requires a listed pet that the caller does not own.
pub fn ensure_can_apply(pet: &Pet, caller: &UserId) -> Result<(), AccessDenied> {
    if pet.owner_id == *caller {
        return Err(AccessDenied::OwnPet);
    }
    if !pet.is_listed() {
        return Err(AccessDenied::PetUnavailable);
    }
    Ok(())
}

/// Deciding requires the caller to own the application and the application
/// to be pending.
pub fn ensure_can_decide(application: &Application, caller: &UserId) -> Result<(), AccessDenied> {
    if application.owner_id != *caller {
        return Err(AccessDenied::NotApplicationOwner);
    }
    match application.status {
        ApplicationStatus::Pending => Ok(()),
        other => Err(AccessDenied::NotPending(other)),
    }
}

/// Reading an application requires the caller to be one of its parties.
pub fn ensure_party(application: &Application, caller: &UserId) -> Result<(), AccessDenied> {
    if application.involves(caller) {
        Ok(())
    } else {
        Err(AccessDenied::NotParty)
    }
}

/// Sending a message requires the caller to be a party and the application
/// to be accepted.
pub fn ensure_can_message(application: &Application, caller: &UserId) -> Result<(), AccessDenied> {
    ensure_party(application, caller)?;
    match application.status {
        ApplicationStatus::Accepted => Ok(()),
        other => Err(AccessDenied::NotAccepted(other)),
    }
}

/// Reading a transcript requires party membership when `restricted`.
pub fn ensure_can_read_transcript(
    application: &Application,
    caller: &UserId,
    restricted: bool,
) -> Result<(), AccessDenied> {
    if restricted {
        ensure_party(application, caller)
    } else {
        Ok(())
    }
}

/// Marking a notification read requires the caller to be its recipient.
pub fn ensure_recipient(notification: &Notification, caller: &UserId) -> Result<(), AccessDenied> {
    if notification.user_id == *caller {
        Ok(())
    } else {
        Err(AccessDenied::NotRecipient)
    }
}
