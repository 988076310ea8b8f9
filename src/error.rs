//! Error types for store mutation, tree building and archive import.
//!
//! Graph-shape problems (cycles, dangling ids, asymmetric spouses) are never
//! errors: the builder prunes them and the layout degrades gracefully. Only
//! rejected mutations, malformed archives and caller contract violations
//! surface here.

use crate::family::PersonId;

/// Result type for family tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for family tree operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    PersonNotFound(PersonId),

    #[error("name is required")]
    EmptyName,

    #[error("{field} year {year} must be between {min} and {max}")]
    YearOutOfRange {
        field: &'static str,
        year: i32,
        min: i32,
        max: i32,
    },

    #[error("birth year {birth} is after death year {death}")]
    DeathBeforeBirth { birth: i32, death: i32 },

    #[error("a person can have at most two parents, got {0}")]
    TooManyParents(usize),

    #[error("a person cannot be their own parent")]
    SelfParent,

    #[error("a person cannot be their own spouse")]
    SelfSpouse,

    #[error("{parent} is already a descendant of {child}")]
    AncestorCycle { child: PersonId, parent: PersonId },

    #[error("duplicate id {0}")]
    DuplicateId(PersonId),

    #[error("person ids exhausted, the largest is {}", PersonId::MAX.raw())]
    IdSpaceExhausted,

    #[error("generation bound must be at least 1, got {0}")]
    InvalidGenerationBound(u32),

    #[error("unknown tree mode {0:?}, expected ancestors, descendants or full")]
    InvalidMode(String),

    #[error("malformed import: {0}")]
    MalformedImport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::PersonNotFound(PersonId::new(7)).to_string(),
            "Person(7) not found"
        );
        assert_eq!(
            Error::YearOutOfRange {
                field: "birth",
                year: 1700,
                min: 1800,
                max: 2025,
            }
            .to_string(),
            "birth year 1700 must be between 1800 and 2025"
        );
        assert_eq!(
            Error::InvalidMode("sideways".into()).to_string(),
            "unknown tree mode \"sideways\", expected ancestors, descendants or full"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
