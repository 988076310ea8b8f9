//! Family Tree - WASM Module
//!
//! This module provides the genealogy store and tree layout engine for the
//! family tree editor. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `family`: Person records, the session store and the JSON archive
//! - `layout`: Generation tree building and box placement
//! - `analysis`: Store-wide statistics (generations, marriages)
//! - `error`: Error types shared by the modules above
//! - `logging`: Browser console subscriber for the core's `tracing` events
//!
//! The browser side owns forms, SVG drawing, pan/zoom and file handling; it
//! hands this module person drafts and layout parameters and receives plain
//! `{nodes, connections}` layouts to draw.

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub mod analysis;
pub mod error;
pub mod family;
pub mod layout;
pub mod logging;

pub use error::{Error, Result};

use analysis::TreeStats;
use family::{FamilyArchive, PersonDraft, PersonId, PersonStore};
use layout::{LayoutConfig, LayoutRequest, TreeMode, compute_layout};

/// Initialize the WASM module: panic messages and core logs go to the
/// browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    logging::install(tracing::Level::DEBUG);
}

/// Serialize for JS, with maps as plain objects and `None` as `null`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> std::result::Result<T, JsError> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Ids cross the boundary as JS numbers, exact up to [`PersonId::MAX`].
fn person_id(value: f64) -> std::result::Result<PersonId, JsError> {
    if is_person_id(value) {
        Ok(PersonId(value as u64))
    } else {
        Err(JsError::new(&format!("invalid person id {value}")))
    }
}

fn is_person_id(value: f64) -> bool {
    value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= PersonId::MAX.raw() as f64
}

/// Main entry point for the family tree editor.
///
/// This struct owns the session's PersonStore and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    store: PersonStore,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Create a new empty family.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: PersonStore::new(),
        }
    }

    // =========================================================================
    // Person Operations
    // =========================================================================

    /// Add a person from a draft object
    /// `{name, gender, birthYear, deathYear, photo, notes, parentIds, spouseId}`.
    ///
    /// Returns the new person's id.
    #[wasm_bindgen(js_name = addPerson)]
    pub fn add_person(&mut self, draft: JsValue) -> std::result::Result<f64, JsError> {
        let draft: PersonDraft = from_js(draft)?;
        let id = self.store.add(draft)?;
        Ok(id.raw() as f64)
    }

    /// Replace every field of an existing person.
    #[wasm_bindgen(js_name = updatePerson)]
    pub fn update_person(&mut self, id: f64, draft: JsValue) -> std::result::Result<(), JsError> {
        let draft: PersonDraft = from_js(draft)?;
        self.store.update(person_id(id)?, draft)?;
        Ok(())
    }

    /// Delete a person and every reference to them.
    #[wasm_bindgen(js_name = deletePerson)]
    pub fn delete_person(&mut self, id: f64) -> std::result::Result<(), JsError> {
        self.store.delete(person_id(id)?)?;
        Ok(())
    }

    /// Get a person by id, or null.
    #[wasm_bindgen(js_name = getPerson)]
    pub fn get_person(&self, id: f64) -> std::result::Result<JsValue, JsError> {
        to_js(&self.store.find_by_id(person_id(id)?))
    }

    /// All people in insertion order.
    pub fn people(&self) -> std::result::Result<JsValue, JsError> {
        to_js(self.store.people())
    }

    /// People whose name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> std::result::Result<JsValue, JsError> {
        to_js(&self.store.search(term))
    }

    /// Get the number of people.
    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> usize {
        self.store.len()
    }

    /// Replace the family with the demonstration data.
    #[wasm_bindgen(js_name = loadSample)]
    pub fn load_sample(&mut self) -> std::result::Result<(), JsError> {
        let sample = PersonStore::sample();
        self.store.replace_all(sample.people().to_vec())?;
        Ok(())
    }

    /// Remove every person.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Compute the tree layout.
    ///
    /// # Arguments
    ///
    /// * `root_id` - Root person; undefined picks the first person without
    ///   parents. An unknown id falls back the same way.
    /// * `mode` - `"ancestors"`, `"descendants"` or `"full"`
    /// * `max_generations` - Generations shown in each direction, root included
    /// * `config` - Optional partial `{nodeWidth, nodeHeight,
    ///   horizontalSpacing, verticalSpacing, spouseGap}`
    ///
    /// Returns `{nodes, connections}`.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(
        &self,
        root_id: Option<f64>,
        mode: &str,
        max_generations: u32,
        config: JsValue,
    ) -> std::result::Result<JsValue, JsError> {
        let root = root_id.map(person_id).transpose()?;
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            from_js(config)?
        };
        let request = LayoutRequest {
            root,
            mode: mode.parse::<TreeMode>()?,
            max_generations,
        };

        to_js(&compute_layout(&self.store, &request, config)?)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// `{people, generations, marriages}`.
    pub fn stats(&self) -> std::result::Result<JsValue, JsError> {
        to_js(&TreeStats::collect(&self.store))
    }

    /// One-line summary, e.g. `7 people, 3 generations, 2 marriages`.
    #[wasm_bindgen(js_name = statsSummary)]
    pub fn stats_summary(&self) -> String {
        if self.store.is_empty() {
            return String::new();
        }
        TreeStats::collect(&self.store).to_string()
    }

    #[wasm_bindgen(js_name = countGenerations)]
    pub fn count_generations(&self) -> usize {
        analysis::count_generations(&self.store)
    }

    #[wasm_bindgen(js_name = countMarriages)]
    pub fn count_marriages(&self) -> usize {
        analysis::count_marriages(&self.store)
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// Export the family as pretty-printed JSON, stamped with the current time.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> std::result::Result<String, JsError> {
        let now: String = js_sys::Date::new_0().to_iso_string().into();
        Ok(FamilyArchive::from_store(&self.store, now).to_json()?)
    }

    /// Replace the family with an exported JSON document.
    ///
    /// Returns the number of people imported. On error the current family is
    /// kept.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, text: &str) -> std::result::Result<usize, JsError> {
        Ok(FamilyArchive::from_json(text)?.restore_into(&mut self.store)?)
    }
}

impl FamilyTreeWasm {
    /// The session store, for Rust callers.
    pub fn store(&self) -> &PersonStore {
        &self.store
    }
}

impl Default for FamilyTreeWasm {
    fn default() -> Self {
        Self::new()
    }
}
