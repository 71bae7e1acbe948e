//! Row-level ownership checks shared by the resource handlers.
//!
//! A caller who cannot see a row gets `NotFound`, never `Forbidden`, so
//! responses do not reveal rows that belong to other users. Deleting a row
//! someone else owns is `NotFound` even when the row is visible.

use uuid::Uuid;

use crate::{auth::claims::Principal, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Shared,
}

impl From<bool> for Visibility {
    fn from(shared: bool) -> Self {
        if shared {
            Visibility::Shared
        } else {
            Visibility::Private
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Mutate,
    Delete,
}

pub fn authorize(
    what: &'static str,
    owner_id: Uuid,
    visibility: Visibility,
    principal: &Principal,
    action: Action,
) -> Result<(), ApiError> {
    if owner_id == principal.user_id {
        return Ok(());
    }
    match (visibility, action) {
        (Visibility::Shared, Action::Read) => Ok(()),
        (Visibility::Shared, Action::Mutate) => Err(ApiError::Forbidden),
        (_, Action::Delete) | (Visibility::Private, _) => Err(ApiError::NotFound(what)),
    }
}

/// Maps a scoped `UPDATE`/`DELETE` that touched nothing to `NotFound`.
pub fn ensure_affected(what: &'static str, rows: u64) -> Result<(), ApiError> {
    if rows == 0 {
        Err(ApiError::NotFound(what))
    } else {
        Ok(())
    }
}
