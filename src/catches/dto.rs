use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Catch, CatchView};
use crate::error::{optional, required, ApiError, Validate};
use crate::patch::Patch;

fn non_negative(field: &str, v: Option<f64>) -> Result<Option<f64>, ApiError> {
    match v {
        Some(x) if !x.is_finite() || x < 0.0 => Err(ApiError::validation(format!(
            "{field} must be a non-negative number"
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatchRequest {
    pub species: Option<String>,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub bait: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub caught_at: Option<OffsetDateTime>,
    pub event_id: Option<Uuid>,
    pub spot_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewCatch {
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub bait: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub is_shared: bool,
    pub caught_at: OffsetDateTime,
    pub event_id: Option<Uuid>,
    pub spot_id: Option<Uuid>,
}

impl Validate for CreateCatchRequest {
    type Output = NewCatch;

    fn validate(self) -> Result<NewCatch, ApiError> {
        Ok(NewCatch {
            species: required("species", self.species)?,
            weight_kg: non_negative("weightKg", self.weight_kg)?,
            length_cm: non_negative("lengthCm", self.length_cm)?,
            bait: optional(self.bait),
            notes: optional(self.notes),
            photo_url: optional(self.photo_url),
            is_shared: self.is_shared,
            caught_at: self.caught_at.unwrap_or_else(OffsetDateTime::now_utc),
            event_id: self.event_id,
            spot_id: self.spot_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatchRequest {
    pub species: Option<String>,
    #[serde(default)]
    pub weight_kg: Patch<f64>,
    #[serde(default)]
    pub length_cm: Patch<f64>,
    #[serde(default)]
    pub bait: Patch<String>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default)]
    pub photo_url: Patch<String>,
    pub is_shared: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub caught_at: Option<OffsetDateTime>,
    pub event_id: Option<Uuid>,
    #[serde(default)]
    pub spot_id: Patch<Uuid>,
}

/// `event_id` is not clearable: every catch belongs to an event.
#[derive(Debug)]
pub struct CatchPatch {
    pub species: Option<String>,
    pub weight_kg: Patch<f64>,
    pub length_cm: Patch<f64>,
    pub bait: Patch<String>,
    pub notes: Patch<String>,
    pub photo_url: Patch<String>,
    pub is_shared: Option<bool>,
    pub caught_at: Option<OffsetDateTime>,
    pub event_id: Option<Uuid>,
    pub spot_id: Patch<Uuid>,
}

impl Validate for UpdateCatchRequest {
    type Output = CatchPatch;

    fn validate(self) -> Result<CatchPatch, ApiError> {
        let species = match self.species {
            Some(s) => Some(required("species", Some(s))?),
            None => None,
        };
        Ok(CatchPatch {
            species,
            weight_kg: self
                .weight_kg
                .try_map(|v| non_negative("weightKg", Some(v)).map(|_| v))?,
            length_cm: self
                .length_cm
                .try_map(|v| non_negative("lengthCm", Some(v)).map(|_| v))?,
            bait: self.bait.trimmed(),
            notes: self.notes.trimmed(),
            photo_url: self.photo_url.trimmed(),
            is_shared: self.is_shared,
            caught_at: self.caught_at,
            event_id: self.event_id,
            spot_id: self.spot_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchFilter {
    pub event_id: Option<Uuid>,
    pub spot_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub bait: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub is_shared: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub caught_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Catch> for CatchResponse {
    fn from(c: Catch) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            event_id: c.event_id,
            spot_id: c.spot_id,
            species: c.species,
            weight_kg: c.weight_kg,
            length_cm: c.length_cm,
            bait: c.bait,
            notes: c.notes,
            photo_url: c.photo_url,
            is_shared: c.is_shared,
            caught_at: c.caught_at,
            created_at: c.created_at,
        }
    }
}

/// Catch with author and social counters, as shown in the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchDetails {
    #[serde(flatten)]
    pub catch: CatchResponse,
    pub author_name: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub is_liked: bool,
}

impl From<CatchView> for CatchDetails {
    fn from(v: CatchView) -> Self {
        Self {
            catch: CatchResponse {
                id: v.id,
                user_id: v.user_id,
                event_id: v.event_id,
                spot_id: v.spot_id,
                species: v.species,
                weight_kg: v.weight_kg,
                length_cm: v.length_cm,
                bait: v.bait,
                notes: v.notes,
                photo_url: v.photo_url,
                is_shared: v.is_shared,
                caught_at: v.caught_at,
                created_at: v.created_at,
            },
            author_name: v.author_name,
            likes: v.likes,
            comments: v.comments,
            is_liked: v.is_liked,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCatchResponse {
    #[serde(flatten)]
    pub catch: CatchResponse,
    /// Set when the catch was filed under a newly created session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_event_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub id: Uuid,
    pub is_shared: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_and_requires_species() {
        let req: CreateCatchRequest = serde_json::from_str(r#"{"species":" Pike "}"#).unwrap();
        let c = req.validate().unwrap();
        assert_eq!(c.species, "Pike");
        assert!(!c.is_shared);
        assert!(c.event_id.is_none());

        let req: CreateCatchRequest = serde_json::from_str(r#"{"weightKg":2.0}"#).unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "species is required");
    }

    #[test]
    fn create_rejects_negative_measurements() {
        let req: CreateCatchRequest =
            serde_json::from_str(r#"{"species":"Perch","lengthCm":-3}"#).unwrap();
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "lengthCm must be a non-negative number"
        );
    }

    #[test]
    fn update_clears_nullable_fields_and_checks_values() {
        let req: UpdateCatchRequest =
            serde_json::from_str(r#"{"photoUrl":null,"weightKg":null,"spotId":null}"#).unwrap();
        let patch = req.validate().unwrap();
        assert_eq!(patch.photo_url, Patch::Clear);
        assert_eq!(patch.weight_kg, Patch::Clear);
        assert_eq!(patch.spot_id, Patch::Clear);
        assert_eq!(patch.notes, Patch::Keep);

        let req: UpdateCatchRequest = serde_json::from_str(r#"{"weightKg":-1}"#).unwrap();
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "weightKg must be a non-negative number"
        );
    }

    #[test]
    fn created_response_flattens_catch() {
        let now = OffsetDateTime::now_utc();
        let body = CreatedCatchResponse {
            catch: CatchResponse {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                event_id: Uuid::new_v4(),
                spot_id: None,
                species: "Trout".into(),
                weight_kg: Some(1.2),
                length_cm: None,
                bait: None,
                notes: None,
                photo_url: None,
                is_shared: true,
                caught_at: now,
                created_at: now,
            },
            created_event_id: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["species"], "Trout");
        assert_eq!(json["isShared"], true);
        assert!(json.get("createdEventId").is_none());
    }
}
