//! Family data: person records, the session store and the JSON archive.
//!
//! The store keeps records in insertion order behind stable ids, answers
//! relationship queries for the tree builder, and validates every edit so the
//! record invariants hold before any layout runs.

mod archive;
mod person;
mod store;

pub use archive::{ARCHIVE_VERSION, FamilyArchive};
pub use person::{Gender, Person, PersonDraft, PersonId};
pub use store::{PersonStore, ValidationConfig};
