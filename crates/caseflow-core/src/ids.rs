//! Core identifier types for caseflow.
//!
//! Cases, teams and specialists are keyed by UUIDs. Categories are
//! admin-configured slugs (e.g. `credentialing`, `claims-dispute`) because
//! they double as keys into the SLA policy table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a category slug.
pub const MAX_CATEGORY_LEN: usize = 64;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            #[doc = concat!("Generate a new random `", stringify!($name), "`.")]
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Return the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
                Ok(Self(uuid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

uuid_id! {
    /// Unique identifier of a provider-relations case.
    ///
    /// Assigned at intake and never changed afterwards.
    CaseId
}

uuid_id! {
    /// Identifier of the team that owns a case.
    TeamId
}

uuid_id! {
    /// Identifier of the specialist a case is assigned to.
    SpecialistId
}

/// An admin-configured case category.
///
/// Category slugs are lowercase ASCII letters, digits, `-` and `_`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    /// Parse and validate a category slug.
    ///
    /// # Errors
    ///
    /// Returns `IdError::InvalidCategory` if the slug is empty, too long, or
    /// contains characters outside `[a-z0-9_-]`.
    pub fn new(slug: impl Into<String>) -> Result<Self, IdError> {
        let slug = slug.into();
        let allowed = |b: u8| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_');
        let valid = !slug.is_empty() && slug.len() <= MAX_CATEGORY_LEN && slug.bytes().all(allowed);
        if valid {
            Ok(Self(slug))
        } else {
            Err(IdError::InvalidCategory(slug))
        }
    }

    /// Return the slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CategoryId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid category slug.
    #[error("invalid category slug: {0:?}")]
    InvalidCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_id_roundtrip() {
        let id = CaseId::generate();
        let parsed = CaseId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn case_id_invalid_uuid() {
        let result = CaseId::from_str("CASE-0001");
        assert!(matches!(result, Err(IdError::InvalidUuid)));
    }

    #[test]
    fn case_id_serde_json() {
        let id = CaseId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: CaseId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn team_and_specialist_debug_names() {
        let uuid = uuid::Uuid::nil();
        assert_eq!(
            format!("{:?}", TeamId::from_uuid(uuid)),
            "TeamId(00000000-0000-0000-0000-000000000000)"
        );
        assert!(format!("{:?}", SpecialistId::from_uuid(uuid)).starts_with("SpecialistId("));
    }

    #[test]
    fn category_accepts_slugs() {
        assert!(CategoryId::new("credentialing").is_ok());
        assert!(CategoryId::new("claims-dispute").is_ok());
        assert!(CategoryId::new("network_2024").is_ok());
    }

    #[test]
    fn category_rejects_bad_slugs() {
        assert!(matches!(
            CategoryId::new(""),
            Err(IdError::InvalidCategory(_))
        ));
        assert!(CategoryId::new("Claims").is_err());
        assert!(CategoryId::new("claims dispute").is_err());
        assert!(CategoryId::new("x".repeat(MAX_CATEGORY_LEN + 1)).is_err());
    }

    #[test]
    fn category_serde_rejects_invalid() {
        let ok: CategoryId = serde_json::from_str("\"contracting\"").unwrap();
        assert_eq!(ok.as_str(), "contracting");
        assert!(serde_json::from_str::<CategoryId>("\"Not A Slug\"").is_err());
    }
}
