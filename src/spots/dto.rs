use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Spot;
use crate::error::{optional, required, ApiError, Validate};
use crate::patch::Patch;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpotRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug)]
pub struct NewSpot {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_favorite: bool,
}

fn check_latitude(v: f64) -> Result<f64, ApiError> {
    if (-90.0..=90.0).contains(&v) {
        Ok(v)
    } else {
        Err(ApiError::validation("latitude must be between -90 and 90"))
    }
}

fn check_longitude(v: f64) -> Result<f64, ApiError> {
    if (-180.0..=180.0).contains(&v) {
        Ok(v)
    } else {
        Err(ApiError::validation("longitude must be between -180 and 180"))
    }
}

impl Validate for CreateSpotRequest {
    type Output = NewSpot;

    fn validate(self) -> Result<NewSpot, ApiError> {
        let name = required("name", self.name)?;
        let latitude = self
            .latitude
            .ok_or_else(|| ApiError::validation("latitude is required"))
            .and_then(check_latitude)?;
        let longitude = self
            .longitude
            .ok_or_else(|| ApiError::validation("longitude is required"))
            .and_then(check_longitude)?;
        Ok(NewSpot {
            name,
            description: optional(self.description),
            latitude,
            longitude,
            is_favorite: self.is_favorite,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpotRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug)]
pub struct SpotPatch {
    pub name: Option<String>,
    pub description: Patch<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Validate for UpdateSpotRequest {
    type Output = SpotPatch;

    fn validate(self) -> Result<SpotPatch, ApiError> {
        let name = match self.name {
            Some(n) => Some(required("name", Some(n))?),
            None => None,
        };
        Ok(SpotPatch {
            name,
            description: self.description.trimmed(),
            latitude: self.latitude.map(check_latitude).transpose()?,
            longitude: self.longitude.map(check_longitude).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SpotFilter {
    pub favorite: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Spot> for SpotResponse {
    fn from(s: Spot) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            latitude: s.latitude,
            longitude: s.longitude,
            is_favorite: s.is_favorite,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lat: Option<f64>, lng: Option<f64>) -> CreateSpotRequest {
        CreateSpotRequest {
            name: Some("Old pier".into()),
            description: None,
            latitude: lat,
            longitude: lng,
            is_favorite: false,
        }
    }

    #[test]
    fn create_requires_coordinates_in_range() {
        assert!(request(Some(59.9), Some(10.7)).validate().is_ok());

        let err = request(None, Some(10.7)).validate().unwrap_err();
        assert_eq!(err.to_string(), "latitude is required");

        let err = request(Some(91.0), Some(10.7)).validate().unwrap_err();
        assert_eq!(err.to_string(), "latitude must be between -90 and 90");

        let err = request(Some(0.0), Some(-181.0)).validate().unwrap_err();
        assert_eq!(err.to_string(), "longitude must be between -180 and 180");
    }

    #[test]
    fn update_rejects_blank_name() {
        let err = UpdateSpotRequest {
            name: Some("  ".into()),
            description: Patch::Keep,
            latitude: None,
            longitude: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn update_null_description_clears_it() {
        let req: UpdateSpotRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(req.validate().unwrap().description, Patch::Clear);

        let req: UpdateSpotRequest = serde_json::from_str(r#"{"latitude":10}"#).unwrap();
        assert_eq!(req.validate().unwrap().description, Patch::Keep);
    }

    #[test]
    fn create_accepts_camel_case_body() {
        let req: CreateSpotRequest = serde_json::from_str(
            r#"{"name":"Bay","latitude":1.5,"longitude":2.5,"isFavorite":true}"#,
        )
        .unwrap();
        let spot = req.validate().unwrap();
        assert!(spot.is_favorite);
    }
}
