//! JSON archive of a family: `{version, exportDate, people}`.
//!
//! The export keeps every person field so an export followed by an import
//! reproduces the collection exactly.

use serde::{Deserialize, Serialize};

use super::person::Person;
use super::store::PersonStore;
use crate::error::{Error, Result};

/// Format version written into every export.
pub const ARCHIVE_VERSION: &str = "1.0";

/// Persisted family state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyArchive {
    #[serde(default)]
    pub version: String,
    /// ISO-8601 timestamp supplied by the caller.
    #[serde(default)]
    pub export_date: String,
    pub people: Vec<Person>,
}

impl FamilyArchive {
    /// Snapshot the store under the given export timestamp.
    pub fn from_store(store: &PersonStore, export_date: impl Into<String>) -> Self {
        Self {
            version: ARCHIVE_VERSION.to_string(),
            export_date: export_date.into(),
            people: store.people().to_vec(),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an archive. The document must carry a `people` array.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("people") {
            Some(people) if people.is_array() => {}
            Some(_) => return Err(Error::MalformedImport("`people` is not an array".into())),
            None => return Err(Error::MalformedImport("missing `people`".into())),
        }

        let archive: Self = serde_json::from_value(value)?;
        if archive.version != ARCHIVE_VERSION {
            tracing::warn!(version = %archive.version, "importing archive with unexpected version");
        }
        Ok(archive)
    }

    /// Load the archived people into `store`, replacing its contents.
    pub fn restore_into(self, store: &mut PersonStore) -> Result<usize> {
        let count = self.people.len();
        store.replace_all(self.people)?;
        Ok(count)
    }
}
