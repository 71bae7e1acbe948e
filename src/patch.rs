//! Tri-state fields for PATCH bodies.
//!
//! A missing key keeps the stored value, an explicit `null` clears it and
//! any other value replaces it. Fields need `#[serde(default)]` so a missing
//! key lands on `Keep`.

use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(d)?.into())
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<T> Patch<T> {
    /// Whether the column is written at all.
    pub fn is_touched(&self) -> bool {
        !matches!(self, Patch::Keep)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    /// The value the column holds once the patch is applied.
    pub fn apply(&self, current: Option<T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Patch::Keep => current,
            Patch::Clear => None,
            Patch::Set(v) => Some(v.clone()),
        }
    }

    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U, ApiError>) -> Result<Patch<U>, ApiError> {
        Ok(match self {
            Patch::Keep => Patch::Keep,
            Patch::Clear => Patch::Clear,
            Patch::Set(v) => Patch::Set(f(v)?),
        })
    }
}

impl Patch<String> {
    /// Trims the new text; blank text clears the field.
    pub fn trimmed(self) -> Self {
        match self {
            Patch::Set(v) if v.trim().is_empty() => Patch::Clear,
            Patch::Set(v) => Patch::Set(v.trim().to_string()),
            other => other,
        }
    }
}

/// `deserialize_with` for RFC 3339 timestamps.
pub fn rfc3339<'de, D: Deserializer<'de>>(d: D) -> Result<Patch<OffsetDateTime>, D::Error> {
    Ok(time::serde::rfc3339::option::deserialize(d)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        notes: Patch<String>,
        #[serde(default, deserialize_with = "rfc3339")]
        end_at: Patch<OffsetDateTime>,
    }

    #[test]
    fn missing_null_and_value_are_distinct() {
        let b: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(b.notes, Patch::Keep);
        assert_eq!(b.end_at, Patch::Keep);

        let b: Body = serde_json::from_str(r#"{"notes":null,"end_at":null}"#).unwrap();
        assert_eq!(b.notes, Patch::Clear);
        assert_eq!(b.end_at, Patch::Clear);

        let b: Body =
            serde_json::from_str(r#"{"notes":"windy","end_at":"2024-06-01T09:30:00Z"}"#).unwrap();
        assert_eq!(b.notes, Patch::Set("windy".to_string()));
        assert_eq!(b.end_at, Patch::Set(datetime!(2024-06-01 09:30 UTC)));
    }

    #[test]
    fn apply_and_trim() {
        assert_eq!(Patch::<i32>::Keep.apply(Some(3)), Some(3));
        assert_eq!(Patch::<i32>::Clear.apply(Some(3)), None);
        assert_eq!(Patch::Set(4).apply(Some(3)), Some(4));
        assert!(!Patch::<i32>::Keep.is_touched());
        assert!(Patch::<i32>::Clear.is_touched());

        assert_eq!(Patch::Set("  ".to_string()).trimmed(), Patch::Clear);
        assert_eq!(
            Patch::Set(" reed bed ".to_string()).trimmed(),
            Patch::Set("reed bed".to_string())
        );
    }
}
