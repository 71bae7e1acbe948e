use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::FishEvent;
use crate::catches::dto::CatchResponse;
use crate::error::{optional, required, ApiError, Validate};
use crate::patch::{self, Patch};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
    pub spot_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub notes: Option<String>,
    pub start_at: OffsetDateTime,
    pub end_at: Option<OffsetDateTime>,
    pub spot_id: Option<Uuid>,
}

pub(crate) fn check_span(
    start_at: OffsetDateTime,
    end_at: Option<OffsetDateTime>,
) -> Result<(), ApiError> {
    match end_at {
        Some(end) if end < start_at => Err(ApiError::validation("endAt must not precede startAt")),
        _ => Ok(()),
    }
}

impl Validate for CreateEventRequest {
    type Output = NewEvent;

    fn validate(self) -> Result<NewEvent, ApiError> {
        let title = required("title", self.title)?;
        let start_at = self
            .start_at
            .ok_or_else(|| ApiError::validation("startAt is required"))?;
        check_span(start_at, self.end_at)?;
        Ok(NewEvent {
            title,
            notes: optional(self.notes),
            start_at,
            end_at: self.end_at,
            spot_id: self.spot_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "patch::rfc3339")]
    pub end_at: Patch<OffsetDateTime>,
    #[serde(default)]
    pub spot_id: Patch<Uuid>,
}

#[derive(Debug)]
pub struct EventPatch {
    pub title: Option<String>,
    pub notes: Patch<String>,
    pub start_at: Option<OffsetDateTime>,
    pub end_at: Patch<OffsetDateTime>,
    pub spot_id: Patch<Uuid>,
}

impl Validate for UpdateEventRequest {
    type Output = EventPatch;

    fn validate(self) -> Result<EventPatch, ApiError> {
        let title = match self.title {
            Some(t) => Some(required("title", Some(t))?),
            None => None,
        };
        Ok(EventPatch {
            title,
            notes: self.notes.trimmed(),
            start_at: self.start_at,
            end_at: self.end_at,
            spot_id: self.spot_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EventFilter {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub spot_id: Option<Uuid>,
    pub title: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FishEvent> for EventResponse {
    fn from(e: FishEvent) -> Self {
        Self {
            id: e.id,
            spot_id: e.spot_id,
            title: e.title,
            notes: e.notes,
            start_at: e.start_at,
            end_at: e.end_at,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: EventResponse,
    pub catches: Vec<CatchResponse>,
}
