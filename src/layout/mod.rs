//! Family tree layout.
//!
//! Layout runs in two stages, both rebuilt from scratch on every request:
//!
//! - [`builder`]: walk the store from a root into a cycle-safe generation tree.
//! - [`engine`]: assign box coordinates and derive the connectors.
//!
//! [`compute_layout`] chains the two for a [`LayoutRequest`].

pub mod builder;
pub mod engine;

pub use builder::{TreeBuilder, TreeMode, TreeNode};
pub use engine::{
    Connection, ConnectionKind, LayoutConfig, LayoutEngine, LayoutNode, Segment, TreeLayout,
};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::family::{PersonId, PersonStore};

/// What to lay out: the root, the direction and the generation bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutRequest {
    /// Root person. `None` picks [`PersonStore::default_root`].
    pub root: Option<PersonId>,
    pub mode: TreeMode,
    /// Generations shown in each direction, the root's included.
    pub max_generations: u32,
}

impl Default for LayoutRequest {
    fn default() -> Self {
        Self {
            root: None,
            mode: TreeMode::default(),
            max_generations: 4,
        }
    }
}

/// Build and place the tree described by `request`.
///
/// A root id that is not in the store falls back to the default root. An
/// empty store gives an empty layout. Fails only on a zero generation bound.
pub fn compute_layout(
    store: &PersonStore,
    request: &LayoutRequest,
    config: LayoutConfig,
) -> Result<TreeLayout> {
    let builder = TreeBuilder::new(store, request.mode, request.max_generations)?;

    let requested = request.root.and_then(|id| store.find_by_id(id));
    if let (Some(id), None) = (request.root, requested) {
        tracing::warn!(%id, "requested root not found, using default root");
    }

    let tree = requested
        .or_else(|| store.default_root())
        .and_then(|root| builder.build(root.id));

    Ok(LayoutEngine::new(config).layout_optional(tree.as_ref()))
}
